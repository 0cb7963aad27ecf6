//! Human-readable rendering of route schema fragments.
//!
//! These strings are meant for map popups and dispatch sheets. The format is
//! one-way: rendered text is not parsed back.

use crate::schema::{LatLng, Place, TimeWindow, Transition, Vehicle, VisitRequest, Waypoint};
use crate::time::{Timestamp, format_duration, format_timestamp};

pub const DEFAULT_TIME_WINDOW_SEPARATOR: &str = " | ";

const OPEN_BOUND: &str = "...";

pub fn lat_lng(lat_lng: &LatLng) -> String {
    format!("{}, {}", lat_lng.latitude, lat_lng.longitude)
}

/// The waypoint's coordinate, else its place id, else an empty string.
pub fn waypoint(waypoint: &Waypoint) -> String {
    match (waypoint.lat_lng(), &waypoint.place_id) {
        (Some(location), _) => lat_lng(&location),
        (None, Some(place_id)) => place_id.clone(),
        (None, None) => String::new(),
    }
}

pub fn place(place: Option<&Place>) -> String {
    match place {
        Some(Place::Location(location)) => lat_lng(location),
        Some(Place::Waypoint(point)) => waypoint(point),
        None => String::new(),
    }
}

pub fn vehicle_start_location(vehicle: &Vehicle) -> String {
    place(vehicle.start.as_ref())
}

pub fn vehicle_end_location(vehicle: &Vehicle) -> String {
    place(vehicle.end.as_ref())
}

pub fn arrival_location(request: &VisitRequest) -> String {
    place(request.arrival.as_ref())
}

pub fn departure_location(request: &VisitRequest) -> String {
    place(request.departure.as_ref())
}

fn bounds(start: Option<&Timestamp>, end: Option<&Timestamp>) -> Option<String> {
    if start.is_none() && end.is_none() {
        return None;
    }
    let bound = |value: Option<&Timestamp>| value.map_or_else(|| OPEN_BOUND.to_string(), format_timestamp);
    Some(format!("{} - {}", bound(start), bound(end)))
}

/// `"<start> - <end>"` for the hard bounds, `"soft: <start> - <end>"` for the
/// soft ones, both joined by a space when present.
pub fn time_window(window: &TimeWindow) -> String {
    let hard = bounds(window.start_time.as_ref(), window.end_time.as_ref());
    let soft = bounds(window.soft_start_time.as_ref(), window.soft_end_time.as_ref())
        .map(|soft| format!("soft: {soft}"));
    match (hard, soft) {
        (Some(hard), Some(soft)) => format!("{hard} {soft}"),
        (Some(only), None) | (None, Some(only)) => only,
        (None, None) => String::new(),
    }
}

pub fn time_windows(windows: &[TimeWindow], separator: &str) -> String {
    windows.iter().map(time_window).collect::<Vec<_>>().join(separator)
}

/// Non-zero travel, delay and wait durations, or `"0s"` when all are zero.
pub fn transition_duration(transition: &Transition) -> String {
    let parts: Vec<String> = [
        ("travel", transition.travel_duration),
        ("delay", transition.delay_duration),
        ("wait", transition.wait_duration),
    ]
    .into_iter()
    .filter(|(_, duration)| !duration.is_zero())
    .map(|(name, duration)| format!("{name}: {}", format_duration(duration)))
    .collect();

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(", ")
    }
}
