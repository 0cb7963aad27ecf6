//! Adapter over the solved global model.
//!
//! Global shipments are either original shipments served directly or virtual
//! shipments standing for a round from a parking location. The translation
//! table passed to [`GlobalSolutionAdapter::new`] says which is which.

use tracing::debug;

use crate::error::IntegrationError;
use crate::ids::{GlobalShipment, RoundKey, VehicleIdx};
use crate::schema::{Model, SkippedShipment, Solution};
use crate::time::Timestamp;
use crate::traits::{GlobalPlan, GlobalRoute, GlobalStop, StopVisit, route_segments};

#[derive(Debug, Clone)]
pub struct GlobalSolutionAdapter {
    epoch: Timestamp,
    vehicle_count: usize,
    routes: Vec<GlobalRoute>,
    skipped_shipments: Vec<SkippedShipment>,
    skipped_rounds: Vec<RoundKey>,
}

impl GlobalSolutionAdapter {
    /// Reads `solution`, the solved form of `model`.
    ///
    /// `shipments[i]` says what global shipment `i` stands for. Vehicle
    /// indices are shared with the original model.
    pub fn new(model: &Model, solution: &Solution, shipments: &[GlobalShipment]) -> Result<Self, IntegrationError> {
        let lookup = |index: usize| {
            shipments.get(index).copied().ok_or_else(|| {
                IntegrationError::ReferentialGap(format!("global shipment {index} is not in the translation table"))
            })
        };

        let mut routes: Vec<GlobalRoute> = Vec::with_capacity(solution.routes.len());
        for route in &solution.routes {
            let vehicle = model.vehicles.get(route.vehicle_index).ok_or_else(|| {
                IntegrationError::ReferentialGap(format!(
                    "global route uses unknown vehicle {}",
                    route.vehicle_index
                ))
            })?;
            let vehicle_idx = VehicleIdx(route.vehicle_index);
            if routes.iter().any(|existing| existing.vehicle == vehicle_idx) {
                return Err(IntegrationError::ReferentialGap(format!(
                    "vehicle {vehicle_idx} has more than one global route"
                )));
            }

            let mut stops = Vec::with_capacity(route.visits.len());
            for visit in &route.visits {
                let stop = match lookup(visit.shipment_index)? {
                    GlobalShipment::Direct(shipment) => GlobalStop::Shipment(StopVisit::from_visit(visit, shipment)),
                    GlobalShipment::Round(key) => GlobalStop::Round {
                        key,
                        start_time: visit.start_time,
                    },
                };
                stops.push(stop);
            }

            routes.push(GlobalRoute {
                vehicle: vehicle_idx,
                vehicle_label: route.vehicle_label.clone(),
                vehicle_start_time: route.vehicle_start_time,
                vehicle_end_time: route.vehicle_end_time,
                stops,
                segments: route_segments(route, vehicle.travel_mode)?,
                breaks: route.breaks.clone(),
            });
        }

        let mut skipped_shipments = Vec::new();
        let mut skipped_rounds = Vec::new();
        for skipped in &solution.skipped_shipments {
            match lookup(skipped.index)? {
                GlobalShipment::Direct(shipment) => skipped_shipments.push(SkippedShipment {
                    index: shipment.get(),
                    label: skipped.label.clone(),
                    reasons: skipped.reasons.clone(),
                }),
                GlobalShipment::Round(key) => skipped_rounds.push(key),
            }
        }

        debug!(
            routes = routes.len(),
            skipped_shipments = skipped_shipments.len(),
            skipped_rounds = skipped_rounds.len(),
            "read global solution"
        );

        Ok(Self {
            epoch: model.epoch(),
            vehicle_count: model.vehicles.len(),
            routes,
            skipped_shipments,
            skipped_rounds,
        })
    }
}

impl GlobalPlan for GlobalSolutionAdapter {
    fn epoch(&self) -> Timestamp {
        self.epoch
    }

    fn vehicle_count(&self) -> usize {
        self.vehicle_count
    }

    fn routes(&self) -> &[GlobalRoute] {
        &self.routes
    }

    fn skipped_shipments(&self) -> &[SkippedShipment] {
        &self.skipped_shipments
    }

    fn skipped_rounds(&self) -> &[RoundKey] {
        &self.skipped_rounds
    }
}
