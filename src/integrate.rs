//! Result integration: merges a global solution and its local solutions into
//! one route per vehicle.
//!
//! Every round stop of a global route is replaced by the visits of the
//! corresponding local round, shifted from the local round's start to the
//! time the vehicle reaches the parking. All segments between two consecutive
//! merged visits (global arrival at the parking, the local walk to the first
//! shipment, ...) are summed into a single transition, so no time is gained or
//! lost at a splice.
//!
//! The merge never reorders visits or moves them between vehicles.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::TimeDelta;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{IntegrationError, SchemaError};
use crate::ids::{ParkingIdx, RoundKey, ShipmentIdx, VehicleIdx};
use crate::mode::IntegrationMode;
use crate::options::Options;
use crate::plan::MergedPlan;
use crate::schema::{
    AggregatedMetrics, Break, CapacityQuantity, ShipmentRoute, SkipReason, SkippedShipment, Transition, Visit,
    VehicleLoad,
};
use crate::time::Timestamp;
use crate::traits::{GlobalPlan, GlobalRoute, GlobalStop, LocalPlan, LocalRound, Segment, StopVisit};

/// Skip code for shipments of a round whose parking visit the global solve skipped.
pub const STAGING_VISIT_SKIPPED: &str = "STAGING_LOCATION_VISIT_SKIPPED";

/// Skip code for shipments of a round that the global solution never mentions.
pub const ROUND_NOT_SCHEDULED: &str = "STAGING_LOCATION_ROUND_NOT_SCHEDULED";

/// Merges `global` with `locals` at the fidelity requested by `mode`.
///
/// All inputs are validated before anything is merged; on error no plan is
/// returned.
pub fn integrate<G, L>(
    global: &G,
    locals: &[L],
    mode: IntegrationMode,
    options: &Options,
) -> Result<MergedPlan, IntegrationError>
where
    G: GlobalPlan,
    L: LocalPlan,
{
    let by_parking = index_local_plans(global, locals)?;
    let scheduled = resolve_round_stops(global, &by_parking)?;
    check_route_shapes(global, &by_parking)?;
    check_fidelity(global, &by_parking, mode)?;

    let with_travel_mode = mode.keeps_transitions() && options.travel_mode_in_merged_transitions;
    if with_travel_mode {
        warn!("merged transitions carry `travelMode`; strict schema validators may reject the plan");
    }

    let routes_by_vehicle: HashMap<VehicleIdx, &GlobalRoute> =
        global.routes().iter().map(|route| (route.vehicle, route)).collect();

    let merged: Vec<ShipmentRoute> = (0..global.vehicle_count())
        .into_par_iter()
        .map(|vehicle| -> Result<ShipmentRoute, IntegrationError> {
            let vehicle = VehicleIdx(vehicle);
            let route = match routes_by_vehicle.get(&vehicle) {
                Some(route) => merge_route(route, &by_parking, with_travel_mode)?,
                None => ShipmentRoute {
                    vehicle_index: vehicle.get(),
                    ..ShipmentRoute::default()
                },
            };
            Ok(shape_route(route, mode, options))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let skipped_shipments = collect_skipped(global, locals, &by_parking, &scheduled)?;

    let routes: BTreeMap<VehicleIdx, ShipmentRoute> = merged
        .into_iter()
        .map(|route| (VehicleIdx(route.vehicle_index), route))
        .collect();
    check_shipment_uniqueness(&routes, &skipped_shipments)?;

    info!(
        %mode,
        vehicles = routes.len(),
        visits = routes.values().map(|route| route.visits.len()).sum::<usize>(),
        skipped = skipped_shipments.len(),
        "integrated local and global solutions"
    );

    Ok(MergedPlan {
        mode,
        routes,
        skipped_shipments,
    })
}

/// Indexes the local plans by parking and checks their time origins.
fn index_local_plans<'a, G, L>(global: &G, locals: &'a [L]) -> Result<HashMap<ParkingIdx, &'a L>, IntegrationError>
where
    G: GlobalPlan,
    L: LocalPlan,
{
    let epoch = global.epoch();
    let mut by_parking = HashMap::with_capacity(locals.len());
    for local in locals {
        let local_epoch = local.epoch();
        if !same_clock(&local_epoch, &epoch) {
            return Err(IntegrationError::EpochMismatch {
                parking: local.parking(),
                local: local_epoch,
                global: epoch,
            });
        }
        if by_parking.insert(local.parking(), local).is_some() {
            return Err(IntegrationError::DuplicateLocalPlan(local.parking()));
        }
    }
    Ok(by_parking)
}

/// Same instant written with the same UTC offset.
fn same_clock(a: &Timestamp, b: &Timestamp) -> bool {
    a == b && a.offset() == b.offset()
}

fn find_round<'a, L: LocalPlan>(
    by_parking: &HashMap<ParkingIdx, &'a L>,
    key: RoundKey,
) -> Result<&'a LocalRound, IntegrationError> {
    let local: &'a L = by_parking.get(&key.parking).copied().ok_or_else(|| {
        IntegrationError::ReferentialGap(format!("no local plan for parking {}", key.parking))
    })?;
    local
        .round(key.round)
        .ok_or_else(|| IntegrationError::ReferentialGap(format!("local plan has no {key}")))
}

/// Checks that every round stop and skipped round resolves to exactly one
/// local round; returns the rounds scheduled by global routes.
fn resolve_round_stops<G, L>(
    global: &G,
    by_parking: &HashMap<ParkingIdx, &L>,
) -> Result<HashSet<RoundKey>, IntegrationError>
where
    G: GlobalPlan,
    L: LocalPlan,
{
    let mut scheduled = HashSet::new();
    for route in global.routes() {
        for stop in &route.stops {
            if let GlobalStop::Round { key, .. } = stop {
                find_round(by_parking, *key)?;
                if !scheduled.insert(*key) {
                    return Err(IntegrationError::DuplicateRound(*key));
                }
            }
        }
    }
    for key in global.skipped_rounds() {
        find_round(by_parking, *key)?;
        if scheduled.contains(key) {
            return Err(IntegrationError::DuplicateRound(*key));
        }
    }
    Ok(scheduled)
}

/// Refuses modes the inputs cannot honor, before anything is merged.
fn check_fidelity<G, L>(
    global: &G,
    by_parking: &HashMap<ParkingIdx, &L>,
    mode: IntegrationMode,
) -> Result<(), IntegrationError>
where
    G: GlobalPlan,
    L: LocalPlan,
{
    let mismatch = |missing: &'static str, source_name: String| IntegrationError::FidelityMismatch {
        mode,
        missing,
        source_name,
    };

    for route in global.routes() {
        let global_name = || format!("the global route of vehicle {}", route.vehicle);
        if mode.keeps_transitions() && !route.stops.is_empty() {
            check_segments(route.segments.as_deref()).map_err(|missing| mismatch(missing, global_name()))?;
        }

        for stop in &route.stops {
            match stop {
                GlobalStop::Shipment(visit) => {
                    if mode.keeps_start_times() && visit.start_time.is_none() {
                        return Err(mismatch("visit start times", global_name()));
                    }
                }
                GlobalStop::Round { key, start_time } => {
                    if mode.keeps_start_times() && start_time.is_none() {
                        return Err(mismatch("visit start times", global_name()));
                    }
                    let round = find_round(by_parking, *key)?;
                    // An empty round has nothing to time; it only passes through.
                    if round.visits.is_empty() {
                        continue;
                    }
                    let local_name = || format!("the local plan of {key}");
                    if mode.keeps_start_times() {
                        if round.vehicle_start_time.is_none()
                            || round.visits.iter().any(|visit| visit.start_time.is_none())
                        {
                            return Err(mismatch("visit start times", local_name()));
                        }
                    }
                    if mode.keeps_transitions() {
                        check_segments(round.segments.as_deref()).map_err(|missing| mismatch(missing, local_name()))?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Checks every consumed segment list: one segment per stop plus the final
/// one, and no negative duration.
fn check_route_shapes<G, L>(global: &G, by_parking: &HashMap<ParkingIdx, &L>) -> Result<(), IntegrationError>
where
    G: GlobalPlan,
    L: LocalPlan,
{
    for route in global.routes() {
        check_segment_list(route.vehicle.get(), route.stops.len(), route.segments.as_deref())?;
        for stop in &route.stops {
            if let GlobalStop::Round { key, .. } = stop {
                let round = find_round(by_parking, *key)?;
                check_segment_list(key.round.get(), round.visits.len(), round.segments.as_deref())?;
            }
        }
    }
    Ok(())
}

fn check_segment_list(vehicle: usize, visits: usize, segments: Option<&[Segment]>) -> Result<(), SchemaError> {
    let Some(segments) = segments else {
        return Ok(());
    };
    if segments.len() != visits + 1 {
        return Err(SchemaError::TransitionCount {
            vehicle,
            visits,
            transitions: segments.len(),
        });
    }
    for segment in segments {
        let durations = [
            ("travelDuration", segment.travel_duration),
            ("waitDuration", segment.wait_duration),
            ("delayDuration", segment.delay_duration),
            ("breakDuration", segment.break_duration),
            ("totalDuration", segment.total_duration),
        ];
        if let Some((field, _)) = durations.into_iter().find(|(_, duration)| *duration < TimeDelta::zero()) {
            return Err(SchemaError::NegativeDuration { vehicle, field });
        }
    }
    Ok(())
}

fn check_segments(segments: Option<&[Segment]>) -> Result<(), &'static str> {
    match segments {
        None => Err("transitions"),
        Some(segments) if segments.iter().any(|segment| segment.start_time.is_none()) => {
            Err("transition start times")
        }
        Some(_) => Ok(()),
    }
}

/// Mix of travel modes seen while summing segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TravelModes {
    None,
    Uniform(i32),
    Mixed,
}

/// Running sum of the segments between two merged visits.
#[derive(Debug, Clone)]
struct SegmentSum {
    start_time: Option<Timestamp>,
    travel_duration: TimeDelta,
    wait_duration: TimeDelta,
    delay_duration: TimeDelta,
    break_duration: TimeDelta,
    total_duration: TimeDelta,
    travel_distance_meters: f64,
    traffic_info_unavailable: bool,
    modes: TravelModes,
}

impl SegmentSum {
    fn new() -> Self {
        Self {
            start_time: None,
            travel_duration: TimeDelta::zero(),
            wait_duration: TimeDelta::zero(),
            delay_duration: TimeDelta::zero(),
            break_duration: TimeDelta::zero(),
            total_duration: TimeDelta::zero(),
            travel_distance_meters: 0.0,
            traffic_info_unavailable: false,
            modes: TravelModes::None,
        }
    }

    /// Adds `segment`, moved in time by `offset`.
    fn add(&mut self, segment: &Segment, offset: TimeDelta) {
        if self.start_time.is_none() {
            self.start_time = segment.start_time.map(|start| start + offset);
        }
        self.travel_duration += segment.travel_duration;
        self.wait_duration += segment.wait_duration;
        self.delay_duration += segment.delay_duration;
        self.break_duration += segment.break_duration;
        self.total_duration += segment.total_duration;
        self.travel_distance_meters += segment.travel_distance_meters;
        self.traffic_info_unavailable |= segment.traffic_info_unavailable;

        let moves = !segment.travel_duration.is_zero() || segment.travel_distance_meters > 0.0;
        if let (true, Some(mode)) = (moves, segment.travel_mode) {
            self.modes = match self.modes {
                TravelModes::None => TravelModes::Uniform(mode),
                TravelModes::Uniform(current) if current == mode => TravelModes::Uniform(mode),
                _ => TravelModes::Mixed,
            };
        }
    }

    fn take(&mut self, with_travel_mode: bool) -> Transition {
        let sum = std::mem::replace(self, Self::new());
        let travel_mode = match (with_travel_mode, sum.modes) {
            (true, TravelModes::Uniform(mode)) => Some(mode),
            _ => None,
        };
        Transition {
            travel_duration: sum.travel_duration,
            travel_distance_meters: sum.travel_distance_meters,
            traffic_info_unavailable: sum.traffic_info_unavailable,
            delay_duration: sum.delay_duration,
            break_duration: sum.break_duration,
            wait_duration: sum.wait_duration,
            total_duration: sum.total_duration,
            start_time: sum.start_time,
            vehicle_loads: BTreeMap::new(),
            travel_mode,
        }
    }
}

fn to_visit(stop: &StopVisit, offset: TimeDelta) -> Visit {
    Visit {
        shipment_index: stop.shipment.get(),
        is_pickup: stop.is_pickup,
        visit_request_index: stop.visit_request_index,
        start_time: stop.start_time.map(|start| start + offset),
        load_demands: stop.load_demands.clone(),
        detour: stop.detour,
        shipment_label: stop.shipment_label.clone(),
        visit_label: stop.visit_label.clone(),
        arrival_loads: Vec::new(),
    }
}

/// Splices the local rounds into one global route, keeping every detail the
/// inputs carry. Shaping to the requested mode happens afterwards.
fn merge_route<L: LocalPlan>(
    route: &GlobalRoute,
    by_parking: &HashMap<ParkingIdx, &L>,
    with_travel_mode: bool,
) -> Result<ShipmentRoute, IntegrationError> {
    // Segment counts were checked by `check_route_shapes`.
    let global_segments = route.segments.as_deref();
    let mut visits = Vec::new();
    let mut transitions = Vec::new();
    let mut pending = SegmentSum::new();

    for (position, stop) in route.stops.iter().enumerate() {
        if let Some(segments) = global_segments {
            pending.add(&segments[position], TimeDelta::zero());
        }
        match stop {
            GlobalStop::Shipment(visit) => {
                transitions.push(pending.take(with_travel_mode));
                visits.push(to_visit(visit, TimeDelta::zero()));
            }
            GlobalStop::Round { key, start_time } => {
                let round = find_round(by_parking, *key)?;
                let offset = match (start_time, round.vehicle_start_time) {
                    (Some(arrival), Some(origin)) => *arrival - origin,
                    _ => TimeDelta::zero(),
                };
                let local_segments = round.segments.as_deref();
                for (index, visit) in round.visits.iter().enumerate() {
                    if let Some(segments) = local_segments {
                        pending.add(&segments[index], offset);
                    }
                    transitions.push(pending.take(with_travel_mode));
                    visits.push(to_visit(visit, offset));
                }
                if let Some(segments) = local_segments {
                    pending.add(&segments[round.visits.len()], offset);
                }
                debug!(
                    vehicle = route.vehicle.get(),
                    %key,
                    visits = round.visits.len(),
                    offset_secs = offset.num_seconds(),
                    "spliced round"
                );
            }
        }
    }

    if let Some(segments) = global_segments {
        pending.add(&segments[route.stops.len()], TimeDelta::zero());
        transitions.push(pending.take(with_travel_mode));
    } else {
        transitions.clear();
    }

    if let Some(position) = first_decreasing_start(&visits) {
        warn!(
            vehicle = route.vehicle.get(),
            position, "merged visit start times decrease; inputs are inconsistent"
        );
    }

    Ok(ShipmentRoute {
        vehicle_index: route.vehicle.get(),
        vehicle_label: route.vehicle_label.clone(),
        vehicle_start_time: route.vehicle_start_time,
        vehicle_end_time: route.vehicle_end_time,
        visits,
        transitions,
        breaks: route.breaks.clone(),
        metrics: None,
        end_loads: Vec::new(),
    })
}

fn first_decreasing_start(visits: &[Visit]) -> Option<usize> {
    visits
        .windows(2)
        .position(|pair| match (pair[0].start_time, pair[1].start_time) {
            (Some(earlier), Some(later)) => later < earlier,
            _ => false,
        })
        .map(|position| position + 1)
}

/// Strips or completes a merged route according to `mode`.
fn shape_route(mut route: ShipmentRoute, mode: IntegrationMode, options: &Options) -> ShipmentRoute {
    match mode {
        IntegrationMode::VisitsOnly => {
            route.vehicle_label = None;
            route.vehicle_start_time = None;
            route.vehicle_end_time = None;
            route.visits = route
                .visits
                .into_iter()
                .map(|visit| Visit {
                    shipment_index: visit.shipment_index,
                    is_pickup: visit.is_pickup,
                    visit_request_index: visit.visit_request_index,
                    ..Visit::default()
                })
                .collect();
            route.breaks = route
                .breaks
                .into_iter()
                .map(|vehicle_break| Break {
                    start_time: vehicle_break.start_time,
                    duration: TimeDelta::zero(),
                })
                .collect();
            route.transitions.clear();
        }
        IntegrationMode::VisitsAndStartTimes => {
            route.visits = route
                .visits
                .into_iter()
                .map(|visit| Visit {
                    shipment_index: visit.shipment_index,
                    is_pickup: visit.is_pickup,
                    visit_request_index: visit.visit_request_index,
                    start_time: visit.start_time,
                    ..Visit::default()
                })
                .collect();
            route.transitions.clear();
        }
        IntegrationMode::FullRoutes => complete_route(&mut route, options.use_deprecated_fields),
    }
    route
}

fn capacity_list(loads: &BTreeMap<String, i64>) -> Vec<CapacityQuantity> {
    loads
        .iter()
        .map(|(kind, value)| CapacityQuantity {
            kind: kind.clone(),
            value: *value,
        })
        .collect()
}

fn vehicle_loads(loads: &BTreeMap<String, i64>) -> BTreeMap<String, VehicleLoad> {
    loads
        .iter()
        .map(|(kind, amount)| (kind.clone(), VehicleLoad { amount: *amount }))
        .collect()
}

/// Fills vehicle loads and aggregated metrics of a full route.
///
/// Transitions are either absent (route without stops) or one per visit plus
/// the final one.
fn complete_route(route: &mut ShipmentRoute, use_deprecated_fields: bool) {
    let has_transitions = !route.transitions.is_empty();
    let mut running: BTreeMap<String, i64> = BTreeMap::new();
    let mut max_loads: BTreeMap<String, i64> = BTreeMap::new();
    let mut visit_duration = TimeDelta::zero();

    for index in 0..route.visits.len() {
        if has_transitions {
            route.transitions[index].vehicle_loads = vehicle_loads(&running);
        }
        let visit = &mut route.visits[index];
        if use_deprecated_fields {
            visit.arrival_loads = capacity_list(&running);
        }
        for (kind, demand) in &visit.load_demands {
            let load = running.entry(kind.clone()).or_insert(0);
            *load += demand.amount;
            let max = max_loads.entry(kind.clone()).or_insert(0);
            *max = (*max).max(*load);
        }

        if has_transitions {
            let departure = route.transitions[index + 1].start_time;
            if let (Some(start), Some(departure)) = (route.visits[index].start_time, departure) {
                visit_duration += (departure - start).max(TimeDelta::zero());
            }
        }
    }
    if let Some(last) = route.transitions.last_mut() {
        last.vehicle_loads = vehicle_loads(&running);
    }
    if use_deprecated_fields {
        route.end_loads = capacity_list(&running);
    }

    let mut metrics = AggregatedMetrics {
        performed_shipment_count: route
            .visits
            .iter()
            .map(|visit| visit.shipment_index)
            .collect::<BTreeSet<_>>()
            .len(),
        visit_duration,
        max_loads: vehicle_loads(&max_loads),
        ..AggregatedMetrics::default()
    };
    for transition in &route.transitions {
        metrics.travel_duration += transition.travel_duration;
        metrics.wait_duration += transition.wait_duration;
        metrics.delay_duration += transition.delay_duration;
        metrics.break_duration += transition.break_duration;
        metrics.total_duration += transition.total_duration;
        metrics.travel_distance_meters += transition.travel_distance_meters;
    }
    metrics.total_duration += visit_duration;
    route.metrics = Some(metrics);
}

fn skipped_round_shipments(round: &LocalRound, code: &str) -> Vec<SkippedShipment> {
    let mut seen = BTreeSet::new();
    round
        .visits
        .iter()
        .filter(|visit| seen.insert(visit.shipment))
        .map(|visit| SkippedShipment {
            index: visit.shipment.get(),
            label: visit.shipment_label.clone(),
            reasons: vec![SkipReason::new(code)],
        })
        .collect()
}

/// Gathers every shipment that did not make it into a route.
fn collect_skipped<G, L>(
    global: &G,
    locals: &[L],
    by_parking: &HashMap<ParkingIdx, &L>,
    scheduled: &HashSet<RoundKey>,
) -> Result<Vec<SkippedShipment>, IntegrationError>
where
    G: GlobalPlan,
    L: LocalPlan,
{
    let mut skipped: Vec<SkippedShipment> = global.skipped_shipments().to_vec();
    for local in locals {
        skipped.extend_from_slice(local.skipped());
    }

    let skipped_rounds: HashSet<RoundKey> = global.skipped_rounds().iter().copied().collect();
    for key in global.skipped_rounds() {
        let round = find_round(by_parking, *key)?;
        skipped.extend(skipped_round_shipments(round, STAGING_VISIT_SKIPPED));
    }

    for local in locals {
        for round in local.rounds() {
            if scheduled.contains(&round.key) || skipped_rounds.contains(&round.key) {
                continue;
            }
            if !round.visits.is_empty() {
                warn!(key = %round.key, "round is not mentioned by the global solution");
            }
            skipped.extend(skipped_round_shipments(round, ROUND_NOT_SCHEDULED));
        }
    }

    skipped.sort_by_key(|shipment| shipment.index);
    Ok(skipped)
}

/// Every shipment may sit in one route or in the skipped list, never both.
/// Within its route it is picked up and delivered at most once each.
fn check_shipment_uniqueness(
    routes: &BTreeMap<VehicleIdx, ShipmentRoute>,
    skipped: &[SkippedShipment],
) -> Result<(), IntegrationError> {
    let mut owner: HashMap<usize, usize> = HashMap::new();
    for route in routes.values() {
        let mut visited = HashSet::new();
        for visit in &route.visits {
            let vehicle = *owner.entry(visit.shipment_index).or_insert(route.vehicle_index);
            if vehicle != route.vehicle_index || !visited.insert((visit.shipment_index, visit.is_pickup)) {
                return Err(IntegrationError::ShipmentConflict(ShipmentIdx(visit.shipment_index)));
            }
        }
    }

    let mut seen = HashSet::new();
    for shipment in skipped {
        if owner.contains_key(&shipment.index) || !seen.insert(shipment.index) {
            return Err(IntegrationError::ShipmentConflict(ShipmentIdx(shipment.index)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Load;

    fn at(minutes: i64) -> Timestamp {
        let origin: Timestamp = "2024-03-01T08:00:00Z".parse().unwrap();
        origin + TimeDelta::minutes(minutes)
    }

    fn segment(start: i64, travel: i64, wait: i64, mode: Option<i32>) -> Segment {
        Segment {
            start_time: Some(at(start)),
            travel_duration: TimeDelta::minutes(travel),
            wait_duration: TimeDelta::minutes(wait),
            delay_duration: TimeDelta::zero(),
            break_duration: TimeDelta::zero(),
            total_duration: TimeDelta::minutes(travel + wait),
            travel_distance_meters: (travel * 100) as f64,
            traffic_info_unavailable: false,
            travel_mode: mode,
        }
    }

    #[test]
    fn test_segment_sum_adds_every_component() {
        let mut sum = SegmentSum::new();
        sum.add(&segment(0, 10, 2, Some(1)), TimeDelta::zero());
        sum.add(&segment(60, 5, 0, Some(1)), TimeDelta::minutes(-30));

        let transition = sum.take(true);
        assert_eq!(transition.start_time, Some(at(0)));
        assert_eq!(transition.travel_duration, TimeDelta::minutes(15));
        assert_eq!(transition.wait_duration, TimeDelta::minutes(2));
        assert_eq!(transition.total_duration, TimeDelta::minutes(17));
        assert_eq!(transition.travel_distance_meters, 1500.0);
        assert_eq!(transition.travel_mode, Some(1));
    }

    #[test]
    fn test_segment_sum_resets_after_take() {
        let mut sum = SegmentSum::new();
        sum.add(&segment(0, 10, 0, None), TimeDelta::zero());
        sum.take(false);

        let empty = sum.take(false);
        assert_eq!(empty, Transition::default());
    }

    #[test]
    fn test_mixed_travel_modes_are_dropped() {
        let mut sum = SegmentSum::new();
        sum.add(&segment(0, 10, 0, Some(1)), TimeDelta::zero());
        sum.add(&segment(10, 3, 0, Some(2)), TimeDelta::zero());
        assert_eq!(sum.take(true).travel_mode, None);
    }

    #[test]
    fn test_standing_segment_does_not_set_travel_mode() {
        let mut sum = SegmentSum::new();
        sum.add(&segment(0, 0, 5, Some(2)), TimeDelta::zero());
        sum.add(&segment(5, 7, 0, Some(1)), TimeDelta::zero());
        assert_eq!(sum.take(true).travel_mode, Some(1));
    }

    #[test]
    fn test_travel_mode_needs_opt_in() {
        let mut sum = SegmentSum::new();
        sum.add(&segment(0, 10, 0, Some(1)), TimeDelta::zero());
        assert_eq!(sum.take(false).travel_mode, None);
    }

    #[test]
    fn test_first_decreasing_start() {
        let visit = |minutes: i64| Visit {
            start_time: Some(at(minutes)),
            ..Visit::default()
        };
        assert_eq!(first_decreasing_start(&[visit(0), visit(5), visit(5)]), None);
        assert_eq!(first_decreasing_start(&[visit(0), visit(10), visit(5)]), Some(2));
    }

    #[test]
    fn test_same_clock_requires_same_offset() {
        let utc: Timestamp = "2024-03-01T08:00:00Z".parse().unwrap();
        let paris: Timestamp = "2024-03-01T09:00:00+01:00".parse().unwrap();
        assert_eq!(utc, paris);
        assert!(!same_clock(&utc, &paris));
        assert!(same_clock(&utc, &utc));
    }

    #[test]
    fn test_pickup_and_delivery_on_one_route_are_unique() {
        let visit = |is_pickup: bool| Visit {
            shipment_index: 3,
            is_pickup,
            ..Visit::default()
        };
        let route = |visits: Vec<Visit>| {
            BTreeMap::from([(
                VehicleIdx(0),
                ShipmentRoute {
                    visits,
                    ..ShipmentRoute::default()
                },
            )])
        };

        assert!(check_shipment_uniqueness(&route(vec![visit(true), visit(false)]), &[]).is_ok());
        assert_eq!(
            check_shipment_uniqueness(&route(vec![visit(false), visit(false)]), &[]),
            Err(IntegrationError::ShipmentConflict(ShipmentIdx(3)))
        );
    }

    #[test]
    fn test_segment_list_shape() {
        let segments = [segment(0, 5, 0, None), segment(5, 5, 0, None)];
        assert!(check_segment_list(2, 1, Some(&segments)).is_ok());
        assert!(check_segment_list(2, 0, None).is_ok());
        assert_eq!(
            check_segment_list(2, 2, Some(&segments)),
            Err(SchemaError::TransitionCount {
                vehicle: 2,
                visits: 2,
                transitions: 2,
            })
        );

        let mut late = segment(0, 5, 0, None);
        late.delay_duration = TimeDelta::seconds(-1);
        assert_eq!(
            check_segment_list(2, 0, Some(&[late])),
            Err(SchemaError::NegativeDuration {
                vehicle: 2,
                field: "delayDuration",
            })
        );
    }

    #[test]
    fn test_complete_route_tracks_loads() {
        let demand = |amount: i64| BTreeMap::from([("weight".to_string(), Load { amount })]);
        let mut route = ShipmentRoute {
            visits: vec![
                Visit {
                    shipment_index: 0,
                    is_pickup: true,
                    start_time: Some(at(10)),
                    load_demands: demand(4),
                    ..Visit::default()
                },
                Visit {
                    shipment_index: 0,
                    start_time: Some(at(30)),
                    load_demands: demand(-4),
                    ..Visit::default()
                },
            ],
            transitions: vec![
                Transition {
                    start_time: Some(at(0)),
                    travel_duration: TimeDelta::minutes(10),
                    total_duration: TimeDelta::minutes(10),
                    ..Transition::default()
                },
                Transition {
                    start_time: Some(at(15)),
                    travel_duration: TimeDelta::minutes(15),
                    total_duration: TimeDelta::minutes(15),
                    ..Transition::default()
                },
                Transition {
                    start_time: Some(at(32)),
                    ..Transition::default()
                },
            ],
            ..ShipmentRoute::default()
        };

        complete_route(&mut route, true);

        assert_eq!(route.transitions[0].vehicle_loads.get("weight"), None);
        assert_eq!(route.transitions[1].vehicle_loads["weight"].amount, 4);
        assert_eq!(route.transitions[2].vehicle_loads["weight"].amount, 0);
        assert_eq!(route.visits[1].arrival_loads[0].value, 4);
        assert_eq!(route.end_loads[0].value, 0);

        let metrics = route.metrics.unwrap();
        assert_eq!(metrics.performed_shipment_count, 1);
        assert_eq!(metrics.travel_duration, TimeDelta::minutes(25));
        assert_eq!(metrics.visit_duration, TimeDelta::minutes(7));
        assert_eq!(metrics.total_duration, TimeDelta::minutes(32));
        assert_eq!(metrics.max_loads["weight"].amount, 4);
    }
}
