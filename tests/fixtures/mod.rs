//! Test fixtures for two-step-planner.
//!
//! Provides a hand-computed two-parking delivery scenario and builders for
//! solved routes.

#![allow(dead_code)]

pub mod delivery_scenario;

pub use delivery_scenario::*;
