//! Error types raised while reading solved models and merging them.

use thiserror::Error;

use crate::ids::{ParkingIdx, RoundKey, ShipmentIdx};
use crate::mode::IntegrationMode;
use crate::time::Timestamp;

/// Input that does not conform to the route schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Both members of a location/waypoint pair were set.
    #[error("`{first}` and `{second}` are mutually exclusive")]
    MutuallyExclusive {
        first: &'static str,
        second: &'static str,
    },
    #[error("invalid duration `{0}`: expected seconds with an `s` suffix")]
    InvalidDuration(String),
    /// A route must carry either no transitions or one more than its visits.
    #[error("route of vehicle {vehicle} has {transitions} transitions for {visits} visits")]
    TransitionCount {
        vehicle: usize,
        visits: usize,
        transitions: usize,
    },
    /// Transition durations may not be negative.
    #[error("route of vehicle {vehicle} has a transition with a negative `{field}`")]
    NegativeDuration { vehicle: usize, field: &'static str },
}

/// Reasons a merge is refused. No partial plan accompanies any of them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("{mode} requires {missing}, which {source_name} does not provide")]
    FidelityMismatch {
        mode: IntegrationMode,
        missing: &'static str,
        source_name: String,
    },

    #[error("local plan for parking {parking} uses time origin {local}, the global plan uses {global}")]
    EpochMismatch {
        parking: ParkingIdx,
        local: Timestamp,
        global: Timestamp,
    },

    #[error("referential gap: {0}")]
    ReferentialGap(String),

    #[error("{0} is visited more than once by the global solution")]
    DuplicateRound(RoundKey),

    #[error("more than one local plan was supplied for parking {0}")]
    DuplicateLocalPlan(ParkingIdx),

    #[error("shipment {0} appears more than once in the merged plan")]
    ShipmentConflict(ShipmentIdx),
}
