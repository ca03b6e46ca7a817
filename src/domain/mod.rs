// Domain layer: delivery policy, notification model and ports.

pub mod model;
pub mod policy;
pub mod ports;
