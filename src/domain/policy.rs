//! Per-platform delivery policy applied to every outbound push.
//!
//! Android messages are sent data-only so the app always draws its own
//! notification. iOS messages are visible alerts at the highest priority and
//! marked mutable so the notification service extension can rewrite them.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AndroidPriority {
    Normal,
    High,
}

/// The `android.notification` block of an FCM message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AndroidNotificationField {
    /// Not sent at all; the message is delivered as a silent data payload.
    Omitted,
    /// Let the platform render title and body itself.
    Display,
}

impl AndroidNotificationField {
    pub fn is_omitted(&self) -> bool {
        matches!(self, AndroidNotificationField::Omitted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AndroidPolicy {
    pub priority: AndroidPriority,
    pub notification: AndroidNotificationField,
}

impl AndroidPolicy {
    pub fn is_data_only(&self) -> bool {
        self.notification.is_omitted()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApnsPushType {
    Alert,
    Background,
}

impl ApnsPushType {
    pub fn as_header_value(&self) -> &'static str {
        match self {
            ApnsPushType::Alert => "alert",
            ApnsPushType::Background => "background",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApnsPolicy {
    pub push_type: ApnsPushType,
    pub priority: u8,
    pub mutable_content: bool,
}

impl ApnsPolicy {
    pub const PUSH_TYPE_HEADER: &'static str = "apns-push-type";
    pub const PRIORITY_HEADER: &'static str = "apns-priority";

    pub fn headers(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                Self::PUSH_TYPE_HEADER.to_string(),
                self.push_type.as_header_value().to_string(),
            ),
            (Self::PRIORITY_HEADER.to_string(), self.priority.to_string()),
        ])
    }

    /// Value of `aps.mutable-content`.
    pub fn mutable_content_flag(&self) -> u8 {
        u8::from(self.mutable_content)
    }
}

pub const ANDROID_POLICY: AndroidPolicy = AndroidPolicy {
    priority: AndroidPriority::High,
    notification: AndroidNotificationField::Omitted,
};

pub const APNS_POLICY: ApnsPolicy = ApnsPolicy {
    push_type: ApnsPushType::Alert,
    priority: 10,
    mutable_content: true,
};
