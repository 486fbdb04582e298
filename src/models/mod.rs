//! Records exchanged with the REST backends.

pub mod common;
pub mod product;
pub mod service;
pub mod user;

pub use common::*;
pub use product::*;
pub use service::*;
pub use user::*;

/// Appointments are opaque; only their number is shown.
pub type Appointment = serde_json::Value;
