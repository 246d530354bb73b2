//! Shared contract types for the alert rule service
//!
//! This crate defines the wire types exchanged with the remote alert rule
//! service, the condition vocabulary with its canonical encoding, and the
//! error taxonomy shared by every consumer of the API.

pub mod conditions;
pub mod error;
pub mod types;

pub use conditions::{canonicalize, decode, render_conditions, ConditionSet, RuleFields};
pub use error::ApiError;
pub use types::{AlertRule, CreateAlertRequest};
