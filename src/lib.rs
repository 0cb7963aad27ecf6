//! two-step-planner
//!
//! Merges the solutions of a two-step (local + global) routing decomposition
//! back into one route plan per vehicle.

pub mod error;
pub mod global;
pub mod ids;
pub mod integrate;
pub mod local;
pub mod mode;
pub mod options;
pub mod pipeline;
pub mod plan;
pub mod render;
pub mod schema;
pub mod time;
pub mod traits;

pub use error::{IntegrationError, SchemaError};
pub use integrate::integrate;
pub use mode::IntegrationMode;
pub use options::{InitialLocalModelGrouping, Options};
pub use plan::MergedPlan;
