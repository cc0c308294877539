#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reduces the parsed dashboard tables into summary metrics.
//!
//! The rankings table arrives pre-sorted (loudest first), so nothing here
//! re-ranks stations: [`metrics::aggregate`] trusts the first row and
//! averages the exceedance table, and [`metrics::location_stats`] joins the
//! three tables for a single station.

pub mod metrics;

pub use metrics::{aggregate, location_stats, weighted_violation_rate};
