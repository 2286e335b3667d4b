//! This module is responsible for loading neighborhood, facility, road,
//! traffic and transit records and turning them into validated models.

mod builder;
mod config;
mod de;
pub mod records;
mod transit;

pub use builder::{build_road_network, create_road_network};
pub use config::NetworkConfig;
pub use de::read_records;
pub use records::NetworkRecords;
pub use transit::{BusRouteRecord, TransitRecords, load_transit_network};
