//! # Domain Models
//!
//! This crate contains pure domain types with minimal dependencies (`serde`, `fxhash`).
//! Keep it lean: no I/O, networking, or heavy logic, just data and simple helpers.

pub mod config;
pub mod holding;
pub mod kingdom;

pub use holding::{HoldingSet, LandHolding, SpatialKey};
pub use kingdom::{Kingdom, KingdomId, PlayerId};
