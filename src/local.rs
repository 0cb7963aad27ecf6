//! Adapter over one solved local model.
//!
//! Each vehicle of a local model is a round: it leaves the parking location,
//! serves some of the parking's shipments and comes back. The adapter turns
//! the solved routes into [`LocalRound`]s keyed by parking and round, with
//! shipment indices translated back to the original model.

use tracing::debug;

use crate::error::IntegrationError;
use crate::ids::{ParkingIdx, RoundIdx, RoundKey, ShipmentIdx};
use crate::schema::{Model, SkippedShipment, Solution};
use crate::time::Timestamp;
use crate::traits::{LocalPlan, LocalRound, StopVisit, route_segments};

#[derive(Debug, Clone)]
pub struct LocalSolutionAdapter {
    parking: ParkingIdx,
    epoch: Timestamp,
    rounds: Vec<LocalRound>,
    skipped: Vec<SkippedShipment>,
}

impl LocalSolutionAdapter {
    /// Reads `solution`, the solved form of `model`.
    ///
    /// `shipments[i]` is the original index of local shipment `i`; visit
    /// request indices are taken to match the original shipment's.
    pub fn new(
        parking: ParkingIdx,
        model: &Model,
        solution: &Solution,
        shipments: &[ShipmentIdx],
    ) -> Result<Self, IntegrationError> {
        let original = |local: usize| {
            shipments.get(local).copied().ok_or_else(|| {
                IntegrationError::ReferentialGap(format!(
                    "local shipment {local} of parking {parking} has no original shipment"
                ))
            })
        };

        let mut rounds: Vec<LocalRound> = Vec::with_capacity(solution.routes.len());
        for route in &solution.routes {
            let vehicle = model.vehicles.get(route.vehicle_index).ok_or_else(|| {
                IntegrationError::ReferentialGap(format!(
                    "local route of parking {parking} uses unknown vehicle {}",
                    route.vehicle_index
                ))
            })?;
            let key = RoundKey::new(parking, RoundIdx(route.vehicle_index));
            if rounds.iter().any(|round| round.key == key) {
                return Err(IntegrationError::DuplicateRound(key));
            }

            let visits = route
                .visits
                .iter()
                .map(|visit| -> Result<StopVisit, IntegrationError> {
                    Ok(StopVisit::from_visit(visit, original(visit.shipment_index)?))
                })
                .collect::<Result<Vec<_>, _>>()?;

            rounds.push(LocalRound {
                key,
                vehicle_start_time: route.vehicle_start_time,
                vehicle_end_time: route.vehicle_end_time,
                visits,
                segments: route_segments(route, vehicle.travel_mode)?,
            });
        }

        let skipped = solution
            .skipped_shipments
            .iter()
            .map(|skipped| -> Result<SkippedShipment, IntegrationError> {
                Ok(SkippedShipment {
                    index: original(skipped.index)?.get(),
                    label: skipped.label.clone(),
                    reasons: skipped.reasons.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            parking = parking.get(),
            rounds = rounds.len(),
            skipped = skipped.len(),
            "read local solution"
        );

        Ok(Self {
            parking,
            epoch: model.epoch(),
            rounds,
            skipped,
        })
    }
}

impl LocalPlan for LocalSolutionAdapter {
    fn parking(&self) -> ParkingIdx {
        self.parking
    }

    fn epoch(&self) -> Timestamp {
        self.epoch
    }

    fn rounds(&self) -> &[LocalRound] {
        &self.rounds
    }

    fn skipped(&self) -> &[SkippedShipment] {
        &self.skipped
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn local_model() -> Model {
        serde_json::from_value(json!({
            "globalStartTime": "2023-11-21T00:00:00Z",
            "shipments": [{}, {}, {}],
            "vehicles": [{ "travelMode": 2 }, { "travelMode": 2 }],
        }))
        .unwrap()
    }

    #[test]
    fn test_translates_shipment_indices() {
        let solution: Solution = serde_json::from_value(json!({
            "routes": [{
                "vehicleIndex": 1,
                "vehicleStartTime": "2023-11-21T08:00:00Z",
                "visits": [
                    { "shipmentIndex": 2, "startTime": "2023-11-21T08:05:00Z" },
                    { "shipmentIndex": 0, "startTime": "2023-11-21T08:15:00Z" },
                ],
                "transitions": [
                    { "travelDuration": "300s", "totalDuration": "300s", "startTime": "2023-11-21T08:00:00Z" },
                    { "travelDuration": "240s", "totalDuration": "240s", "startTime": "2023-11-21T08:11:00Z" },
                    { "travelDuration": "60s", "totalDuration": "60s", "startTime": "2023-11-21T08:20:00Z" },
                ],
            }],
            "skippedShipments": [{ "index": 1, "label": "fragile" }],
        }))
        .unwrap();
        let shipments = [ShipmentIdx(40), ShipmentIdx(41), ShipmentIdx(42)];

        let adapter = LocalSolutionAdapter::new(ParkingIdx(5), &local_model(), &solution, &shipments).unwrap();

        assert_eq!(adapter.parking(), ParkingIdx(5));
        let round = adapter.round(RoundIdx(1)).unwrap();
        assert_eq!(round.key, RoundKey::new(ParkingIdx(5), RoundIdx(1)));
        let visited: Vec<_> = round.visits.iter().map(|visit| visit.shipment).collect();
        assert_eq!(visited, vec![ShipmentIdx(42), ShipmentIdx(40)]);
        let segments = round.segments.as_ref().unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].travel_mode, Some(2));
        assert_eq!(adapter.skipped()[0].index, 41);
        assert!(adapter.round(RoundIdx(0)).is_none());
    }

    #[test]
    fn test_unknown_local_shipment_is_a_gap() {
        let solution: Solution = serde_json::from_value(json!({
            "routes": [{ "vehicleIndex": 0, "visits": [{ "shipmentIndex": 7 }] }],
        }))
        .unwrap();

        let err = LocalSolutionAdapter::new(ParkingIdx(0), &local_model(), &solution, &[ShipmentIdx(0)]).unwrap_err();
        assert!(matches!(err, IntegrationError::ReferentialGap(_)), "{err}");
    }

    #[test]
    fn test_duplicate_round_is_rejected() {
        let solution: Solution = serde_json::from_value(json!({
            "routes": [{ "vehicleIndex": 0 }, { "vehicleIndex": 0 }],
        }))
        .unwrap();

        let err = LocalSolutionAdapter::new(ParkingIdx(2), &local_model(), &solution, &[]).unwrap_err();
        assert_eq!(
            err,
            IntegrationError::DuplicateRound(RoundKey::new(ParkingIdx(2), RoundIdx(0)))
        );
    }

    #[test]
    fn test_route_without_transitions_has_no_segments() {
        let solution: Solution = serde_json::from_value(json!({
            "routes": [{ "vehicleIndex": 0, "visits": [{ "shipmentIndex": 0 }] }],
        }))
        .unwrap();

        let adapter = LocalSolutionAdapter::new(ParkingIdx(0), &local_model(), &solution, &[ShipmentIdx(9)]).unwrap();
        assert!(adapter.rounds()[0].segments.is_none());
    }
}
