//! Builds FCM HTTP v1 request bodies from a [`PushMessage`] and the platform policy.

use crate::domain::model::{DeviceTarget, Platform, PushMessage};
use crate::domain::policy::{AndroidPolicy, AndroidPriority, ApnsPolicy, ANDROID_POLICY, APNS_POLICY};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FcmRequest {
    pub message: FcmMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FcmMessage {
    pub token: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apns: Option<ApnsConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AndroidConfig {
    pub priority: AndroidPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApnsConfig {
    pub headers: BTreeMap<String, String>,
    pub payload: ApnsPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aps {
    pub alert: Notification,
    #[serde(rename = "mutable-content")]
    pub mutable_content: u8,
}

/// Builds the request for `target` using the process-wide delivery policies.
pub fn build_message(target: &DeviceTarget, message: &PushMessage) -> FcmRequest {
    build_message_with(target, message, &ANDROID_POLICY, &APNS_POLICY)
}

pub fn build_message_with(
    target: &DeviceTarget,
    message: &PushMessage,
    android_policy: &AndroidPolicy,
    apns_policy: &ApnsPolicy,
) -> FcmRequest {
    let mut data = message.data.clone();
    if let Some(category) = &message.category {
        data.insert("category".to_string(), category.clone());
    }

    let alert = Notification {
        title: message.title.clone(),
        body: message.body.clone(),
    };

    let (notification, android, apns) = match target.platform {
        Platform::Android => {
            // Data-only messages carry the text in the data map for the app to render.
            let notification = if android_policy.is_data_only() {
                data.insert("title".to_string(), message.title.clone());
                data.insert("body".to_string(), message.body.clone());
                None
            } else {
                Some(alert)
            };
            let android = AndroidConfig {
                priority: android_policy.priority,
                notification,
            };
            (None, Some(android), None)
        }
        Platform::Ios => {
            let apns = ApnsConfig {
                headers: apns_policy.headers(),
                payload: ApnsPayload {
                    aps: Aps {
                        alert,
                        mutable_content: apns_policy.mutable_content_flag(),
                    },
                },
            };
            (None, None, Some(apns))
        }
        Platform::Web => (Some(alert), None, None),
    };

    FcmRequest {
        message: FcmMessage {
            token: target.token.clone(),
            data,
            notification,
            android,
            apns,
        },
    }
}
