//! Seams between the merge engine and the outside world.
//!
//! The engine reads solved sub-problems through [`LocalPlan`] and
//! [`GlobalPlan`], which expose routes in a canonical form: original shipment
//! indices, absolute timestamps and optional per-segment detail. The
//! sub-problem builder and the optimization engine stay external and are only
//! described by [`SubProblemBuilder`] and [`OptimizationEngine`].

use std::collections::BTreeMap;

use chrono::TimeDelta;

use crate::error::SchemaError;
use crate::ids::{ParkingIdx, RoundIdx, RoundKey, ShipmentIdx, VehicleIdx};
use crate::local::LocalSolutionAdapter;
use crate::options::Options;
use crate::pipeline::{GlobalProblem, LocalProblem};
use crate::schema::{Break, Load, Model, ShipmentRoute, SkippedShipment, Solution, Transition, Visit};
use crate::time::Timestamp;

/// A timed segment between two consecutive stops of a solved route.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start_time: Option<Timestamp>,
    pub travel_duration: TimeDelta,
    pub wait_duration: TimeDelta,
    pub delay_duration: TimeDelta,
    pub break_duration: TimeDelta,
    pub total_duration: TimeDelta,
    pub travel_distance_meters: f64,
    pub traffic_info_unavailable: bool,
    /// Travel mode of the vehicle that drove the segment.
    pub travel_mode: Option<i32>,
}

impl Segment {
    pub fn from_transition(transition: &Transition, travel_mode: Option<i32>) -> Self {
        Self {
            start_time: transition.start_time,
            travel_duration: transition.travel_duration,
            wait_duration: transition.wait_duration,
            delay_duration: transition.delay_duration,
            break_duration: transition.break_duration,
            total_duration: transition.total_duration,
            travel_distance_meters: transition.travel_distance_meters,
            traffic_info_unavailable: transition.traffic_info_unavailable,
            travel_mode,
        }
    }
}

/// A shipment visit, already translated to the original index space.
#[derive(Debug, Clone, PartialEq)]
pub struct StopVisit {
    pub shipment: ShipmentIdx,
    pub is_pickup: bool,
    pub visit_request_index: usize,
    pub start_time: Option<Timestamp>,
    pub load_demands: BTreeMap<String, Load>,
    pub detour: TimeDelta,
    pub shipment_label: Option<String>,
    pub visit_label: Option<String>,
}

impl StopVisit {
    pub fn from_visit(visit: &Visit, shipment: ShipmentIdx) -> Self {
        Self {
            shipment,
            is_pickup: visit.is_pickup,
            visit_request_index: visit.visit_request_index,
            start_time: visit.start_time,
            load_demands: visit.load_demands.clone(),
            detour: visit.detour,
            shipment_label: visit.shipment_label.clone(),
            visit_label: visit.visit_label.clone(),
        }
    }
}

/// One solved local route: a round from a parking location and back.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalRound {
    pub key: RoundKey,
    pub vehicle_start_time: Option<Timestamp>,
    pub vehicle_end_time: Option<Timestamp>,
    pub visits: Vec<StopVisit>,
    /// `visits.len() + 1` segments, or `None` when solved without transitions.
    pub segments: Option<Vec<Segment>>,
}

/// A stop of a global route.
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalStop {
    /// A shipment served directly by the vehicle.
    Shipment(StopVisit),
    /// Arrival at a parking location to perform one round.
    Round {
        key: RoundKey,
        start_time: Option<Timestamp>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalRoute {
    pub vehicle: VehicleIdx,
    pub vehicle_label: Option<String>,
    pub vehicle_start_time: Option<Timestamp>,
    pub vehicle_end_time: Option<Timestamp>,
    pub stops: Vec<GlobalStop>,
    /// `stops.len() + 1` segments, or `None` when solved without transitions.
    pub segments: Option<Vec<Segment>>,
    pub breaks: Vec<Break>,
}

/// A solved local sub-problem for one parking location.
pub trait LocalPlan: Sync {
    fn parking(&self) -> ParkingIdx;

    /// Time origin the local model was built with.
    fn epoch(&self) -> Timestamp;

    fn rounds(&self) -> &[LocalRound];

    /// Shipments the local solve could not place, in the original index space.
    fn skipped(&self) -> &[SkippedShipment];

    fn round(&self, round: RoundIdx) -> Option<&LocalRound> {
        self.rounds().iter().find(|candidate| candidate.key.round == round)
    }
}

/// The solved global sub-problem.
pub trait GlobalPlan: Sync {
    /// Time origin the global model was built with.
    fn epoch(&self) -> Timestamp;

    /// Number of vehicles of the global model (and of the original model).
    fn vehicle_count(&self) -> usize;

    fn routes(&self) -> &[GlobalRoute];

    /// Directly served shipments the global solve skipped.
    fn skipped_shipments(&self) -> &[SkippedShipment];

    /// Rounds whose parking visit the global solve skipped.
    fn skipped_rounds(&self) -> &[RoundKey];
}

/// Builds the local and global models from the original problem.
pub trait SubProblemBuilder: Sync {
    fn local_problems(&self, options: &Options) -> Vec<LocalProblem>;

    fn global_problem(&self, locals: &[LocalSolutionAdapter], options: &Options) -> GlobalProblem;
}

/// Solves one routing model.
pub trait OptimizationEngine: Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn optimize(&self, model: &Model) -> Result<Solution, Self::Error>;
}

/// Reads the transitions of a solved route.
///
/// A route solved without transition detail yields `None`; any other count
/// than one transition per visit plus the final one is malformed.
pub(crate) fn route_segments(
    route: &ShipmentRoute,
    travel_mode: Option<i32>,
) -> Result<Option<Vec<Segment>>, SchemaError> {
    if route.transitions.is_empty() {
        return Ok(None);
    }
    if route.transitions.len() != route.visits.len() + 1 {
        return Err(SchemaError::TransitionCount {
            vehicle: route.vehicle_index,
            visits: route.visits.len(),
            transitions: route.transitions.len(),
        });
    }
    Ok(Some(
        route
            .transitions
            .iter()
            .map(|transition| Segment::from_transition(transition, travel_mode))
            .collect(),
    ))
}
