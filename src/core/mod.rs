pub mod dispatcher;
pub mod fcm;
pub mod message;

pub use crate::domain::model::{DeliveryOutcome, DeliveryReport, DeviceTarget, DispatchSummary, PushMessage};
pub use crate::domain::ports::{ConfigProvider, PushTransport};
pub use crate::utils::error::Result;
