//! Network optimization engine for a metropolitan transportation network.
//!
//! The crate is a stateless computational library: every algorithm takes a
//! [`RoadNetwork`] snapshot (or transit data) plus an explicit options value
//! and returns an owned result. Nothing is cached between calls.

pub mod design;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod interrupt;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod signals;
pub mod transit;

pub use engine::OptimizationEngine;
pub use error::Error;
pub use interrupt::Interrupt;
pub use model::{RoadNetwork, RoadId, TimeWindow};

/// Travel time in minutes
pub type Minutes = f64;
/// Distance in kilometres
pub type Kilometres = f64;
/// Signal timings are planned in whole seconds
pub type Seconds = u32;

/// Floor applied to every congestion factor so traversal times stay finite
pub const MIN_CONGESTION_FACTOR: f64 = 0.05;
