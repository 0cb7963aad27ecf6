//! The merged plan produced by [`crate::integrate::integrate`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ids::{ShipmentIdx, VehicleIdx};
use crate::mode::IntegrationMode;
use crate::schema::{AggregatedMetrics, ShipmentRoute, SkippedShipment, Solution};

/// One route per vehicle of the original model, plus the shipments no route
/// serves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedPlan {
    /// Fidelity the routes were built at.
    pub mode: IntegrationMode,
    pub routes: BTreeMap<VehicleIdx, ShipmentRoute>,
    /// Sorted by shipment index.
    pub skipped_shipments: Vec<SkippedShipment>,
}

impl MergedPlan {
    pub fn route(&self, vehicle: VehicleIdx) -> Option<&ShipmentRoute> {
        self.routes.get(&vehicle)
    }

    /// Shipments visited by at least one route.
    pub fn visited_shipments(&self) -> BTreeSet<ShipmentIdx> {
        self.routes
            .values()
            .flat_map(|route| route.visits.iter())
            .map(|visit| ShipmentIdx(visit.shipment_index))
            .collect()
    }

    pub fn is_skipped(&self, shipment: ShipmentIdx) -> bool {
        self.skipped_shipments
            .iter()
            .any(|skipped| skipped.index == shipment.get())
    }

    /// The plan in solution form, routes ordered by vehicle index.
    ///
    /// Built at [`IntegrationMode::FullRoutes`], this can be injected as the
    /// first solution of a new optimization request.
    pub fn to_solution(&self) -> Solution {
        let routes: Vec<ShipmentRoute> = self.routes.values().cloned().collect();
        let metrics = match self.mode {
            IntegrationMode::FullRoutes => Some(total_metrics(&routes)),
            IntegrationMode::VisitsOnly | IntegrationMode::VisitsAndStartTimes => None,
        };
        Solution {
            routes,
            skipped_shipments: self.skipped_shipments.clone(),
            metrics,
        }
    }
}

fn total_metrics(routes: &[ShipmentRoute]) -> AggregatedMetrics {
    let mut total = AggregatedMetrics::default();
    for metrics in routes.iter().filter_map(|route| route.metrics.as_ref()) {
        total.performed_shipment_count += metrics.performed_shipment_count;
        total.travel_duration += metrics.travel_duration;
        total.wait_duration += metrics.wait_duration;
        total.delay_duration += metrics.delay_duration;
        total.break_duration += metrics.break_duration;
        total.visit_duration += metrics.visit_duration;
        total.total_duration += metrics.total_duration;
        total.travel_distance_meters += metrics.travel_distance_meters;
        for (kind, load) in &metrics.max_loads {
            let max = total.max_loads.entry(kind.clone()).or_insert(*load);
            max.amount = max.amount.max(load.amount);
        }
    }
    total
}
