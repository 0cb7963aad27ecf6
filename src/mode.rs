//! Fidelity levels of a merged plan.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How much detail the integration engine reconstructs.
///
/// Each level is a strict superset of the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntegrationMode {
    /// Shipment and visit-request indices plus break start times.
    VisitsOnly,
    /// Adds visit start times (and vehicle start/end times).
    VisitsAndStartTimes,
    /// Adds transitions, visit detail and aggregated metrics. The result can
    /// be injected as a first solution into a new optimization request.
    FullRoutes,
}

impl IntegrationMode {
    /// Whether the merged visits carry start times.
    pub fn keeps_start_times(self) -> bool {
        match self {
            IntegrationMode::VisitsOnly => false,
            IntegrationMode::VisitsAndStartTimes | IntegrationMode::FullRoutes => true,
        }
    }

    /// Whether the merged routes carry transitions and metrics.
    pub fn keeps_transitions(self) -> bool {
        match self {
            IntegrationMode::VisitsOnly | IntegrationMode::VisitsAndStartTimes => false,
            IntegrationMode::FullRoutes => true,
        }
    }
}

impl fmt::Display for IntegrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntegrationMode::VisitsOnly => "VISITS_ONLY",
            IntegrationMode::VisitsAndStartTimes => "VISITS_AND_START_TIMES",
            IntegrationMode::FullRoutes => "FULL_ROUTES",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_nested() {
        assert!(!IntegrationMode::VisitsOnly.keeps_start_times());
        assert!(IntegrationMode::VisitsAndStartTimes.keeps_start_times());
        assert!(!IntegrationMode::VisitsAndStartTimes.keeps_transitions());
        assert!(IntegrationMode::FullRoutes.keeps_start_times());
        assert!(IntegrationMode::FullRoutes.keeps_transitions());
    }

    #[test]
    fn test_wire_name_matches_display() {
        for mode in [
            IntegrationMode::VisitsOnly,
            IntegrationMode::VisitsAndStartTimes,
            IntegrationMode::FullRoutes,
        ] {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{mode}\""));
        }
    }
}
