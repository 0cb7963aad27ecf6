//! Run parameters for the two-step planner.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How shipments at one parking location are split into local models.
///
/// Shipments always group by parking; each enabled flag refines the group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InitialLocalModelGrouping {
    /// Shipments with different time windows go to different local models.
    #[serde(default)]
    pub time_windows: bool,
    /// Shipments with different allowed-vehicle sets go to different local models.
    #[serde(default)]
    pub vehicle_allowed_indices: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    pub initial_local_model_grouping: InitialLocalModelGrouping,
    /// Fixed cost of a local-model vehicle; keeps the number of rounds low.
    #[serde(default = "default_fixed_cost")]
    pub local_model_vehicle_fixed_cost: f64,
    #[serde(default = "default_per_hour_cost")]
    pub local_model_vehicle_per_hour_cost: f64,
    #[serde(default = "default_per_km_cost")]
    pub local_model_vehicle_per_km_cost: f64,
    /// Lower bound on shipments per round when sizing local fleets.
    #[serde(default = "default_min_average_shipments_per_round")]
    pub min_average_shipments_per_round: u32,
    /// Also fill deprecated load fields of full merged routes.
    #[serde(default = "default_use_deprecated_fields")]
    pub use_deprecated_fields: bool,
    /// Write `travelMode` on merged transitions. Not part of the baseline
    /// schema; strict validators may reject the output.
    #[serde(default)]
    pub travel_mode_in_merged_transitions: bool,
}

fn default_fixed_cost() -> f64 {
    10_000.0
}

fn default_per_hour_cost() -> f64 {
    300.0
}

fn default_per_km_cost() -> f64 {
    60.0
}

fn default_min_average_shipments_per_round() -> u32 {
    1
}

fn default_use_deprecated_fields() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    #[error("`{field}` must be a finite non-negative number, got {value}")]
    InvalidCost { field: &'static str, value: f64 },
    #[error("`min_average_shipments_per_round` must be at least 1")]
    ZeroShipmentsPerRound,
}

impl Options {
    pub fn new(initial_local_model_grouping: InitialLocalModelGrouping) -> Self {
        Self {
            initial_local_model_grouping,
            local_model_vehicle_fixed_cost: default_fixed_cost(),
            local_model_vehicle_per_hour_cost: default_per_hour_cost(),
            local_model_vehicle_per_km_cost: default_per_km_cost(),
            min_average_shipments_per_round: default_min_average_shipments_per_round(),
            use_deprecated_fields: default_use_deprecated_fields(),
            travel_mode_in_merged_transitions: false,
        }
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        let costs = [
            ("local_model_vehicle_fixed_cost", self.local_model_vehicle_fixed_cost),
            ("local_model_vehicle_per_hour_cost", self.local_model_vehicle_per_hour_cost),
            ("local_model_vehicle_per_km_cost", self.local_model_vehicle_per_km_cost),
        ];
        for (field, value) in costs {
            if !value.is_finite() || value < 0.0 {
                return Err(OptionsError::InvalidCost { field, value });
            }
        }
        if self.min_average_shipments_per_round == 0 {
            return Err(OptionsError::ZeroShipmentsPerRound);
        }
        Ok(())
    }
}
