//! A small two-step delivery scenario with hand-computed timings.
//!
//! All times are minutes after 2024-03-01 08:00 UTC; every model uses
//! 2024-03-01 00:00 UTC as its time origin.
//!
//! Original shipments:
//! - 0, 1, 2 are delivered on foot from parking 0
//! - 3 is delivered on foot from parking 1
//! - 4 is delivered directly by the van
//!
//! Parking 0, round 0 (walking): start 0, walk 5 -> shipment 0 at 5 (10 min),
//! walk 4 -> shipment 1 at 19 (6 min), walk 5 back, end 30.
//! Parking 0, round 1 (walking): shipment 2. The global solve skips it.
//! Parking 1, round 0 (walking): start 0, walk 3 -> shipment 3 at 3 (5 min),
//! walk 3 back, end 11.
//!
//! Vehicle 0 (driving): start 0, drive 20 -> parking 0 at 20 (round takes
//! 30 min), drive 15 + wait 5 -> shipment 4 at 70 (10 min), drive 25, end 105.
//! Vehicle 1 (driving): start 0, drive 30 -> parking 1 at 30 (11 min), drive
//! 30, end 71.
//! Vehicle 2 is unused.

use std::collections::BTreeMap;

use chrono::TimeDelta;

use two_step_planner::global::GlobalSolutionAdapter;
use two_step_planner::ids::{GlobalShipment, ParkingIdx, RoundIdx, RoundKey, ShipmentIdx};
use two_step_planner::local::LocalSolutionAdapter;
use two_step_planner::schema::{Load, Model, Shipment, ShipmentRoute, Solution, Transition, Vehicle, Visit};
use two_step_planner::time::Timestamp;
use two_step_planner::{IntegrationError, IntegrationMode, MergedPlan, Options, integrate};

pub const DRIVING: i32 = 1;
pub const WALKING: i32 = 2;

pub fn epoch() -> Timestamp {
    "2024-03-01T00:00:00Z".parse().unwrap()
}

/// `minutes` after 08:00 UTC.
pub fn at(minutes: i64) -> Timestamp {
    epoch() + TimeDelta::hours(8) + TimeDelta::minutes(minutes)
}

pub fn minutes(m: i64) -> TimeDelta {
    TimeDelta::minutes(m)
}

/// A transition starting at `start` that travels `travel` then waits `wait`.
pub fn leg(start: i64, travel: i64, wait: i64) -> Transition {
    Transition {
        start_time: Some(at(start)),
        travel_duration: minutes(travel),
        wait_duration: minutes(wait),
        total_duration: minutes(travel + wait),
        travel_distance_meters: (travel * 250) as f64,
        ..Transition::default()
    }
}

/// Builder for solved routes.
#[derive(Debug, Clone)]
pub struct RouteBuilder {
    route: ShipmentRoute,
}

impl RouteBuilder {
    pub fn new(vehicle_index: usize) -> Self {
        Self {
            route: ShipmentRoute {
                vehicle_index,
                ..ShipmentRoute::default()
            },
        }
    }

    pub fn span(mut self, start: i64, end: i64) -> Self {
        self.route.vehicle_start_time = Some(at(start));
        self.route.vehicle_end_time = Some(at(end));
        self
    }

    pub fn visit(mut self, shipment_index: usize, start: i64) -> Self {
        self.route.visits.push(Visit {
            shipment_index,
            start_time: Some(at(start)),
            ..Visit::default()
        });
        self
    }

    pub fn delivery(mut self, shipment_index: usize, start: i64, weight: i64) -> Self {
        self.route.visits.push(Visit {
            shipment_index,
            start_time: Some(at(start)),
            load_demands: BTreeMap::from([("weight".to_string(), Load { amount: -weight })]),
            shipment_label: Some(format!("S{shipment_index}")),
            ..Visit::default()
        });
        self
    }

    /// Labels the last visit added.
    pub fn label(mut self, label: &str) -> Self {
        if let Some(visit) = self.route.visits.last_mut() {
            visit.shipment_label = Some(label.to_string());
        }
        self
    }

    pub fn leg(mut self, start: i64, travel: i64, wait: i64) -> Self {
        self.route.transitions.push(leg(start, travel, wait));
        self
    }

    pub fn build(self) -> ShipmentRoute {
        self.route
    }
}

pub fn vehicles(count: usize, travel_mode: i32) -> Vec<Vehicle> {
    (0..count)
        .map(|_| Vehicle {
            travel_mode: Some(travel_mode),
            ..Vehicle::default()
        })
        .collect()
}

pub fn model(shipments: usize, vehicles: Vec<Vehicle>) -> Model {
    Model {
        shipments: vec![Shipment::default(); shipments],
        vehicles,
        global_start_time: Some(epoch()),
        global_end_time: None,
    }
}

/// Raw inputs of one local model.
#[derive(Debug, Clone)]
pub struct LocalInput {
    pub parking: ParkingIdx,
    pub model: Model,
    pub solution: Solution,
    pub shipments: Vec<ShipmentIdx>,
}

impl LocalInput {
    pub fn adapter(&self) -> LocalSolutionAdapter {
        LocalSolutionAdapter::new(self.parking, &self.model, &self.solution, &self.shipments).unwrap()
    }

    /// Drops every transition, as if solved without transition detail.
    pub fn without_transitions(mut self) -> Self {
        for route in &mut self.solution.routes {
            route.transitions.clear();
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub locals: Vec<LocalInput>,
    pub global_model: Model,
    pub global_solution: Solution,
    pub global_shipments: Vec<GlobalShipment>,
    pub options: Options,
}

pub fn round(parking: usize, round: usize) -> RoundKey {
    RoundKey::new(ParkingIdx(parking), RoundIdx(round))
}

pub fn parking_0() -> LocalInput {
    LocalInput {
        parking: ParkingIdx(0),
        model: model(3, vehicles(2, WALKING)),
        solution: Solution {
            routes: vec![
                RouteBuilder::new(0)
                    .span(0, 30)
                    .leg(0, 5, 0)
                    .delivery(0, 5, 2)
                    .leg(15, 4, 0)
                    .delivery(1, 19, 3)
                    .leg(25, 5, 0)
                    .build(),
                RouteBuilder::new(1)
                    .span(0, 14)
                    .leg(0, 4, 0)
                    .delivery(2, 4, 1)
                    .leg(10, 4, 0)
                    .build(),
            ],
            ..Solution::default()
        },
        shipments: vec![ShipmentIdx(0), ShipmentIdx(1), ShipmentIdx(2)],
    }
}

pub fn parking_1() -> LocalInput {
    LocalInput {
        parking: ParkingIdx(1),
        model: model(1, vehicles(1, WALKING)),
        solution: Solution {
            routes: vec![
                RouteBuilder::new(0)
                    .span(0, 11)
                    .leg(0, 3, 0)
                    .delivery(0, 3, 4)
                    .label("S3")
                    .leg(8, 3, 0)
                    .build(),
            ],
            ..Solution::default()
        },
        shipments: vec![ShipmentIdx(3)],
    }
}

pub fn scenario() -> Scenario {
    let global_solution = Solution {
        routes: vec![
            RouteBuilder::new(0)
                .span(0, 105)
                .leg(0, 20, 0)
                .visit(1, 20)
                .leg(50, 15, 5)
                .delivery(0, 70, 5)
                .label("S4")
                .leg(80, 25, 0)
                .build(),
            RouteBuilder::new(1)
                .span(0, 71)
                .leg(0, 30, 0)
                .visit(3, 30)
                .leg(41, 30, 0)
                .build(),
            RouteBuilder::new(2).build(),
        ],
        skipped_shipments: vec![two_step_planner::schema::SkippedShipment {
            index: 2,
            ..Default::default()
        }],
        metrics: None,
    };

    Scenario {
        locals: vec![parking_0(), parking_1()],
        global_model: model(4, vehicles(3, DRIVING)),
        global_solution,
        global_shipments: vec![
            GlobalShipment::Direct(ShipmentIdx(4)),
            GlobalShipment::Round(round(0, 0)),
            GlobalShipment::Round(round(0, 1)),
            GlobalShipment::Round(round(1, 0)),
        ],
        options: Options::new(Default::default()),
    }
}

impl Scenario {
    pub fn global(&self) -> GlobalSolutionAdapter {
        GlobalSolutionAdapter::new(&self.global_model, &self.global_solution, &self.global_shipments).unwrap()
    }

    pub fn local_adapters(&self) -> Vec<LocalSolutionAdapter> {
        self.locals.iter().map(LocalInput::adapter).collect()
    }

    pub fn integrate(&self, mode: IntegrationMode) -> Result<MergedPlan, IntegrationError> {
        integrate(&self.global(), &self.local_adapters(), mode, &self.options)
    }
}
