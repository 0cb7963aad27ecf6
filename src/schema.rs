//! Route schema shared by solved models, adapters and merged plans.
//!
//! Field names follow the JSON wire form (`startTime`, `travelDuration`,
//! `arrivalWaypoint`, ...). Each location/waypoint pair is a single
//! [`Place`] in the typed model; a JSON object setting both members of a pair
//! is rejected while deserializing.

use std::collections::BTreeMap;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::time::{Timestamp, duration_format, unix_epoch};

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero_f64(value: &f64) -> bool {
    *value == 0.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointLocation {
    pub lat_lng: LatLng,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<WaypointLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub side_of_road: bool,
}

impl Waypoint {
    pub fn at(lat_lng: LatLng) -> Self {
        Self {
            location: Some(WaypointLocation { lat_lng, heading: None }),
            ..Self::default()
        }
    }

    pub fn place(place_id: impl Into<String>) -> Self {
        Self {
            place_id: Some(place_id.into()),
            ..Self::default()
        }
    }

    pub fn lat_lng(&self) -> Option<LatLng> {
        self.location.as_ref().map(|location| location.lat_lng)
    }
}

/// One member of a `<x>Location` / `<x>Waypoint` pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    Location(LatLng),
    Waypoint(Waypoint),
}

fn exclusive(
    location: Option<LatLng>,
    waypoint: Option<Waypoint>,
    first: &'static str,
    second: &'static str,
) -> Result<Option<Place>, SchemaError> {
    match (location, waypoint) {
        (Some(_), Some(_)) => Err(SchemaError::MutuallyExclusive { first, second }),
        (Some(location), None) => Ok(Some(Place::Location(location))),
        (None, Some(waypoint)) => Ok(Some(Place::Waypoint(waypoint))),
        (None, None) => Ok(None),
    }
}

fn split(place: Option<Place>) -> (Option<LatLng>, Option<Waypoint>) {
    match place {
        Some(Place::Location(location)) => (Some(location), None),
        Some(Place::Waypoint(waypoint)) => (None, Some(waypoint)),
        None => (None, None),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_start_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_end_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_hour_before_soft_start_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_hour_after_soft_end_time: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Load {
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleLoad {
    pub amount: i64,
}

/// Deprecated list form of a load, kept for consumers of older schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityQuantity {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawVisitRequest", into = "RawVisitRequest")]
pub struct VisitRequest {
    /// `arrivalLocation` or `arrivalWaypoint`.
    pub arrival: Option<Place>,
    /// `departureLocation` or `departureWaypoint`.
    pub departure: Option<Place>,
    pub duration: TimeDelta,
    pub time_windows: Vec<TimeWindow>,
    pub tags: Vec<String>,
    pub label: Option<String>,
    pub cost: Option<f64>,
}

impl Default for VisitRequest {
    fn default() -> Self {
        Self {
            arrival: None,
            departure: None,
            duration: TimeDelta::zero(),
            time_windows: Vec::new(),
            tags: Vec::new(),
            label: None,
            cost: None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVisitRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arrival_location: Option<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arrival_waypoint: Option<Waypoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    departure_location: Option<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    departure_waypoint: Option<Waypoint>,
    #[serde(default = "TimeDelta::zero", with = "duration_format", skip_serializing_if = "TimeDelta::is_zero")]
    duration: TimeDelta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    time_windows: Vec<TimeWindow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cost: Option<f64>,
}

impl TryFrom<RawVisitRequest> for VisitRequest {
    type Error = SchemaError;

    fn try_from(raw: RawVisitRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            arrival: exclusive(
                raw.arrival_location,
                raw.arrival_waypoint,
                "arrivalLocation",
                "arrivalWaypoint",
            )?,
            departure: exclusive(
                raw.departure_location,
                raw.departure_waypoint,
                "departureLocation",
                "departureWaypoint",
            )?,
            duration: raw.duration,
            time_windows: raw.time_windows,
            tags: raw.tags,
            label: raw.label,
            cost: raw.cost,
        })
    }
}

impl From<VisitRequest> for RawVisitRequest {
    fn from(request: VisitRequest) -> Self {
        let (arrival_location, arrival_waypoint) = split(request.arrival);
        let (departure_location, departure_waypoint) = split(request.departure);
        Self {
            arrival_location,
            arrival_waypoint,
            departure_location,
            departure_waypoint,
            duration: request.duration,
            time_windows: request.time_windows,
            tags: request.tags,
            label: request.label,
            cost: request.cost,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pickups: Vec<VisitRequest>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deliveries: Vec<VisitRequest>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub load_demands: BTreeMap<String, Load>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_vehicle_indices: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadLimit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_load: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawVehicle", into = "RawVehicle")]
pub struct Vehicle {
    /// `startLocation` or `startWaypoint`.
    pub start: Option<Place>,
    /// `endLocation` or `endWaypoint`.
    pub end: Option<Place>,
    pub travel_mode: Option<i32>,
    pub start_time_windows: Vec<TimeWindow>,
    pub end_time_windows: Vec<TimeWindow>,
    pub load_limits: BTreeMap<String, LoadLimit>,
    /// Cost fields only shape sub-problem construction; merging ignores them.
    pub fixed_cost: Option<f64>,
    pub cost_per_hour: Option<f64>,
    pub cost_per_kilometer: Option<f64>,
    pub label: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVehicle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_location: Option<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_waypoint: Option<Waypoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_location: Option<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_waypoint: Option<Waypoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    travel_mode: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    start_time_windows: Vec<TimeWindow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    end_time_windows: Vec<TimeWindow>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    load_limits: BTreeMap<String, LoadLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fixed_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cost_per_hour: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cost_per_kilometer: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl TryFrom<RawVehicle> for Vehicle {
    type Error = SchemaError;

    fn try_from(raw: RawVehicle) -> Result<Self, Self::Error> {
        Ok(Self {
            start: exclusive(raw.start_location, raw.start_waypoint, "startLocation", "startWaypoint")?,
            end: exclusive(raw.end_location, raw.end_waypoint, "endLocation", "endWaypoint")?,
            travel_mode: raw.travel_mode,
            start_time_windows: raw.start_time_windows,
            end_time_windows: raw.end_time_windows,
            load_limits: raw.load_limits,
            fixed_cost: raw.fixed_cost,
            cost_per_hour: raw.cost_per_hour,
            cost_per_kilometer: raw.cost_per_kilometer,
            label: raw.label,
        })
    }
}

impl From<Vehicle> for RawVehicle {
    fn from(vehicle: Vehicle) -> Self {
        let (start_location, start_waypoint) = split(vehicle.start);
        let (end_location, end_waypoint) = split(vehicle.end);
        Self {
            start_location,
            start_waypoint,
            end_location,
            end_waypoint,
            travel_mode: vehicle.travel_mode,
            start_time_windows: vehicle.start_time_windows,
            end_time_windows: vehicle.end_time_windows,
            load_limits: vehicle.load_limits,
            fixed_cost: vehicle.fixed_cost,
            cost_per_hour: vehicle.cost_per_hour,
            cost_per_kilometer: vehicle.cost_per_kilometer,
            label: vehicle.label,
        }
    }
}

/// A routing model as sent to the optimization engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shipments: Vec<Shipment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vehicles: Vec<Vehicle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_start_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_end_time: Option<Timestamp>,
}

impl Model {
    /// The model's time origin; the Unix epoch when `globalStartTime` is unset.
    pub fn epoch(&self) -> Timestamp {
        self.global_start_time.unwrap_or_else(unix_epoch)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    #[serde(default)]
    pub shipment_index: usize,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_pickup: bool,
    #[serde(default)]
    pub visit_request_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub load_demands: BTreeMap<String, Load>,
    #[serde(default = "TimeDelta::zero", with = "duration_format", skip_serializing_if = "TimeDelta::is_zero")]
    pub detour: TimeDelta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_label: Option<String>,
    /// Deprecated: loads on arrival, superseded by `Transition::vehicle_loads`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arrival_loads: Vec<CapacityQuantity>,
}

impl Default for Visit {
    fn default() -> Self {
        Self {
            shipment_index: 0,
            is_pickup: false,
            visit_request_index: 0,
            start_time: None,
            load_demands: BTreeMap::new(),
            detour: TimeDelta::zero(),
            shipment_label: None,
            visit_label: None,
            arrival_loads: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    #[serde(default = "TimeDelta::zero", with = "duration_format", skip_serializing_if = "TimeDelta::is_zero")]
    pub travel_duration: TimeDelta,
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub travel_distance_meters: f64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub traffic_info_unavailable: bool,
    #[serde(default = "TimeDelta::zero", with = "duration_format", skip_serializing_if = "TimeDelta::is_zero")]
    pub delay_duration: TimeDelta,
    #[serde(default = "TimeDelta::zero", with = "duration_format", skip_serializing_if = "TimeDelta::is_zero")]
    pub break_duration: TimeDelta,
    #[serde(default = "TimeDelta::zero", with = "duration_format", skip_serializing_if = "TimeDelta::is_zero")]
    pub wait_duration: TimeDelta,
    #[serde(default = "TimeDelta::zero", with = "duration_format", skip_serializing_if = "TimeDelta::is_zero")]
    pub total_duration: TimeDelta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vehicle_loads: BTreeMap<String, VehicleLoad>,
    /// Extension field, only written when explicitly enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_mode: Option<i32>,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            travel_duration: TimeDelta::zero(),
            travel_distance_meters: 0.0,
            traffic_info_unavailable: false,
            delay_duration: TimeDelta::zero(),
            break_duration: TimeDelta::zero(),
            wait_duration: TimeDelta::zero(),
            total_duration: TimeDelta::zero(),
            start_time: None,
            vehicle_loads: BTreeMap::new(),
            travel_mode: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Break {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Timestamp>,
    #[serde(default = "TimeDelta::zero", with = "duration_format", skip_serializing_if = "TimeDelta::is_zero")]
    pub duration: TimeDelta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedMetrics {
    #[serde(default)]
    pub performed_shipment_count: usize,
    #[serde(default = "TimeDelta::zero", with = "duration_format")]
    pub travel_duration: TimeDelta,
    #[serde(default = "TimeDelta::zero", with = "duration_format")]
    pub wait_duration: TimeDelta,
    #[serde(default = "TimeDelta::zero", with = "duration_format")]
    pub delay_duration: TimeDelta,
    #[serde(default = "TimeDelta::zero", with = "duration_format")]
    pub break_duration: TimeDelta,
    #[serde(default = "TimeDelta::zero", with = "duration_format")]
    pub visit_duration: TimeDelta,
    #[serde(default = "TimeDelta::zero", with = "duration_format")]
    pub total_duration: TimeDelta,
    #[serde(default)]
    pub travel_distance_meters: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub max_loads: BTreeMap<String, VehicleLoad>,
}

impl Default for AggregatedMetrics {
    fn default() -> Self {
        Self {
            performed_shipment_count: 0,
            travel_duration: TimeDelta::zero(),
            wait_duration: TimeDelta::zero(),
            delay_duration: TimeDelta::zero(),
            break_duration: TimeDelta::zero(),
            visit_duration: TimeDelta::zero(),
            total_duration: TimeDelta::zero(),
            travel_distance_meters: 0.0,
            max_loads: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRoute {
    #[serde(default)]
    pub vehicle_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_start_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_end_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub visits: Vec<Visit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breaks: Vec<Break>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<AggregatedMetrics>,
    /// Deprecated: loads at the end of the route.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub end_loads: Vec<CapacityQuantity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipReason {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_vehicle_index: Option<usize>,
}

impl SkipReason {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            example_vehicle_index: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedShipment {
    #[serde(default)]
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<SkipReason>,
}

/// A solved model: what the optimization engine returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<ShipmentRoute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_shipments: Vec<SkippedShipment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<AggregatedMetrics>,
}
