use geo::Point;
use hashbrown::{HashMap, HashSet};
use log::{info, warn};
use petgraph::graph::NodeIndex;

use super::config::NetworkConfig;
use super::de::read_records;
use super::records::{
    FacilityRecord, NeighborhoodRecord, NetworkRecords, PotentialRoadRecord, RoadRecord,
    TrafficRecord,
};
use crate::model::{
    Condition, Direction, Node, NodeKind, Road, RoadId, RoadStatus, bpr_congestion,
};
use crate::{Error, MIN_CONGESTION_FACTOR, RoadNetwork};

/// Loads every record file named by the configuration and assembles the network
///
/// # Errors
///
/// Returns an error if a file is missing or malformed, or if the records
/// describe an invalid graph
pub fn create_road_network(config: &NetworkConfig) -> Result<RoadNetwork, Error> {
    validate_config(config)?;

    info!("Loading neighborhoods: {}", config.neighborhoods_path.display());
    let neighborhoods = read_records(&config.neighborhoods_path)?;
    info!("Loading facilities: {}", config.facilities_path.display());
    let facilities = read_records(&config.facilities_path)?;
    info!("Loading roads: {}", config.roads_path.display());
    let roads = read_records(&config.roads_path)?;

    let potential_roads = match &config.potential_roads_path {
        Some(path) => {
            info!("Loading potential roads: {}", path.display());
            read_records(path)?
        }
        None => Vec::new(),
    };
    let traffic = match &config.traffic_path {
        Some(path) => {
            info!("Loading traffic flows: {}", path.display());
            read_records(path)?
        }
        None => Vec::new(),
    };

    let records = NetworkRecords {
        neighborhoods,
        facilities,
        roads,
        potential_roads,
        traffic,
    };
    let network = build_road_network(records, config.include_potential_roads)?;
    info!(
        "Road network created: {} nodes, {} roads",
        network.node_count(),
        network.road_count()
    );
    Ok(network)
}

fn validate_config(config: &NetworkConfig) -> Result<(), Error> {
    for path in config.paths() {
        if !path.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Record file not found: {}", path.display()),
            )));
        }
    }
    Ok(())
}

/// Validates records and assembles an immutable [`RoadNetwork`].
///
/// Fails fast with [`Error::InvalidInput`] on duplicate or dangling node ids,
/// non-positive distance, capacity or cost, out-of-range condition ratings,
/// and traffic records for roads that do not exist.
pub fn build_road_network(
    records: NetworkRecords,
    include_potential_roads: bool,
) -> Result<RoadNetwork, Error> {
    let nodes = collect_nodes(&records.neighborhoods, &records.facilities)?;
    let index: HashMap<&str, NodeIndex> = nodes
        .iter()
        .enumerate()
        .map(|(position, node)| (node.id.as_str(), NodeIndex::new(position)))
        .collect();

    let mut roads = Vec::with_capacity(records.roads.len() + records.potential_roads.len());
    for record in &records.roads {
        let road = existing_road(record, &index, RoadId(roads.len()))?;
        roads.push(road);
    }
    for record in &records.potential_roads {
        let road = potential_road(record, &index, RoadId(roads.len()))?;
        if include_potential_roads {
            roads.push(road);
        }
    }

    let (congestion, flows) = apply_traffic(&records.traffic, &index, &roads)?;
    // The id map borrows `nodes`, which moves into the network below
    drop(index);

    let mut touched = vec![false; nodes.len()];
    for road in &roads {
        touched[road.from.index()] = true;
        touched[road.to.index()] = true;
    }
    let isolated = touched.iter().filter(|&&t| !t).count();
    if isolated > 0 {
        warn!("{isolated} node(s) have no incident road and are unreachable for routing");
    }

    Ok(RoadNetwork::from_parts(nodes, roads, congestion, flows))
}

fn collect_nodes(
    neighborhoods: &[NeighborhoodRecord],
    facilities: &[FacilityRecord],
) -> Result<Vec<Node>, Error> {
    let mut nodes = Vec::with_capacity(neighborhoods.len() + facilities.len());
    let mut seen: HashSet<String> = HashSet::new();

    let mut register = |node: Node| -> Result<(), Error> {
        if !seen.insert(node.id.clone()) {
            return Err(Error::invalid(format!("duplicate node id '{}'", node.id)));
        }
        nodes.push(node);
        Ok(())
    };

    for record in neighborhoods {
        register(Node {
            id: record.id.clone(),
            name: record.name.clone(),
            location: location(&record.id, record.lat, record.lon)?,
            population: Some(record.population),
            kind: NodeKind::Neighborhood,
        })?;
    }
    for record in facilities {
        register(Node {
            id: record.id.clone(),
            name: record.name.clone(),
            location: location(&record.id, record.lat, record.lon)?,
            population: None,
            kind: NodeKind::Facility(record.kind),
        })?;
    }
    Ok(nodes)
}

fn location(id: &str, lat: f64, lon: f64) -> Result<Point<f64>, Error> {
    if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
        return Err(Error::invalid(format!(
            "node '{id}' has invalid coordinates ({lat}, {lon})"
        )));
    }
    Ok(Point::new(lon, lat))
}

fn endpoints(
    from: &str,
    to: &str,
    index: &HashMap<&str, NodeIndex>,
) -> Result<(NodeIndex, NodeIndex), Error> {
    let resolve = |id: &str| {
        index.get(id).copied().ok_or_else(|| {
            Error::invalid(format!("road {from}-{to} references unknown node '{id}'"))
        })
    };
    let (a, b) = (resolve(from)?, resolve(to)?);
    if a == b {
        return Err(Error::invalid(format!("road {from}-{to} is a self-loop")));
    }
    Ok((a, b))
}

fn positive(value: f64, what: &str, from: &str, to: &str) -> Result<f64, Error> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::invalid(format!(
            "road {from}-{to} has non-positive {what} ({value})"
        )))
    }
}

fn existing_road(
    record: &RoadRecord,
    index: &HashMap<&str, NodeIndex>,
    id: RoadId,
) -> Result<Road, Error> {
    let (from, to) = endpoints(&record.from, &record.to, index)?;
    Ok(Road {
        id,
        from,
        to,
        direction: if record.one_way {
            Direction::OneWay
        } else {
            Direction::TwoWay
        },
        distance: positive(record.distance, "distance", &record.from, &record.to)?,
        capacity: positive(record.capacity, "capacity", &record.from, &record.to)?,
        condition: Condition::new(record.condition).map_err(|_| {
            Error::invalid(format!(
                "road {}-{} has condition {} outside 1..=5",
                record.from, record.to, record.condition
            ))
        })?,
        construction_cost: None,
        status: RoadStatus::Existing,
    })
}

fn potential_road(
    record: &PotentialRoadRecord,
    index: &HashMap<&str, NodeIndex>,
    id: RoadId,
) -> Result<Road, Error> {
    let (from, to) = endpoints(&record.from, &record.to, index)?;
    Ok(Road {
        id,
        from,
        to,
        direction: Direction::TwoWay,
        distance: positive(record.distance, "distance", &record.from, &record.to)?,
        capacity: positive(record.capacity, "capacity", &record.from, &record.to)?,
        // A road built from scratch starts in the best condition
        condition: Condition::BEST,
        construction_cost: Some(positive(
            record.cost,
            "construction cost",
            &record.from,
            &record.to,
        )?),
        status: RoadStatus::Potential,
    })
}

type TrafficTables = (Vec<[f64; 4]>, Vec<Option<[f64; 4]>>);

fn apply_traffic(
    traffic: &[TrafficRecord],
    index: &HashMap<&str, NodeIndex>,
    roads: &[Road],
) -> Result<TrafficTables, Error> {
    let mut congestion = vec![[1.0; 4]; roads.len()];
    let mut flows: Vec<Option<[f64; 4]>> = vec![None; roads.len()];

    let mut by_endpoints: HashMap<(NodeIndex, NodeIndex), Vec<RoadId>> = HashMap::new();
    for road in roads {
        let key = (road.from.min(road.to), road.from.max(road.to));
        by_endpoints.entry(key).or_default().push(road.id);
    }

    for record in traffic {
        let (a, b) = endpoints(&record.from, &record.to, index)?;
        let matching = by_endpoints.get(&(a.min(b), a.max(b))).ok_or_else(|| {
            Error::invalid(format!(
                "traffic record for {}-{} does not match any road",
                record.from, record.to
            ))
        })?;
        let window = record.window.index();

        for &road_id in matching {
            let road = &roads[road_id.0];
            let factor = match (record.multiplier, record.flow) {
                (Some(multiplier), _) => {
                    if !(multiplier > 0.0 && multiplier <= 1.0) {
                        return Err(Error::invalid(format!(
                            "traffic multiplier for {}-{} must be within (0, 1], got {multiplier}",
                            record.from, record.to
                        )));
                    }
                    multiplier.max(MIN_CONGESTION_FACTOR)
                }
                (None, Some(flow)) => {
                    if !(flow.is_finite() && flow >= 0.0) {
                        return Err(Error::invalid(format!(
                            "traffic flow for {}-{} must be non-negative, got {flow}",
                            record.from, record.to
                        )));
                    }
                    bpr_congestion(flow, road.capacity)
                }
                (None, None) => {
                    return Err(Error::invalid(format!(
                        "traffic record for {}-{} has neither flow nor multiplier",
                        record.from, record.to
                    )));
                }
            };
            congestion[road_id.0][window] = factor;
            if let Some(flow) = record.flow {
                flows[road_id.0].get_or_insert([0.0; 4])[window] = flow;
            }
        }
    }

    Ok((congestion, flows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::records::FacilityRecord;
    use crate::model::{FacilityKind, TimeWindow};

    fn base_records() -> NetworkRecords {
        NetworkRecords {
            neighborhoods: vec![
                NeighborhoodRecord::new("1", 250_000, 29.96, 31.25),
                NeighborhoodRecord::new("2", 500_000, 30.06, 31.34),
            ],
            facilities: vec![FacilityRecord::new("F9", FacilityKind::Hospital, 30.03, 31.23)],
            roads: vec![
                RoadRecord::two_way("1", "2", 12.0, 3000.0, 4),
                RoadRecord::two_way("2", "F9", 6.0, 2000.0, 3).one_way(),
            ],
            ..NetworkRecords::default()
        }
    }

    #[test]
    fn builds_valid_records() {
        let network = build_road_network(base_records(), false).unwrap();
        assert_eq!(network.node_count(), 3);
        assert_eq!(network.road_count(), 2);
    }

    #[test]
    fn rejects_dangling_reference() {
        let mut records = base_records();
        records.roads.push(RoadRecord::two_way("1", "99", 3.0, 1000.0, 3));
        let err = build_road_network(records, false).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(msg) if msg.contains("99")));
    }

    #[test]
    fn rejects_non_positive_distance_and_capacity() {
        let mut records = base_records();
        records.roads[0].distance = 0.0;
        assert!(matches!(
            build_road_network(records, false),
            Err(Error::InvalidInput(_))
        ));

        let mut records = base_records();
        records.roads[0].capacity = -5.0;
        assert!(matches!(
            build_road_network(records, false),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_condition() {
        let mut records = base_records();
        records.roads[0].condition = 7;
        assert!(matches!(
            build_road_network(records, false),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut records = base_records();
        records
            .neighborhoods
            .push(NeighborhoodRecord::new("F9", 10, 30.0, 31.0));
        assert!(matches!(
            build_road_network(records, false),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn potential_roads_are_optional() {
        let mut records = base_records();
        records
            .potential_roads
            .push(PotentialRoadRecord::new("1", "F9", 9.0, 2500.0, 150.0));
        let without = build_road_network(records.clone(), false).unwrap();
        let with = build_road_network(records.clone(), true).unwrap();
        assert_eq!(without.road_count(), 2);
        assert_eq!(with.road_count(), 3);

        records.potential_roads[0].cost = 0.0;
        assert!(build_road_network(records, false).is_err());
    }

    #[test]
    fn one_way_has_no_reverse_entry() {
        let network = build_road_network(base_records(), false).unwrap();
        let two = network.node_index("2").unwrap();
        let hospital = network.node_index("F9").unwrap();
        assert!(network.edge_between(two, hospital).is_some());
        assert!(network.edge_between(hospital, two).is_none());
        assert_eq!(network.neighbors(hospital).count(), 0);
    }

    #[test]
    fn traffic_flow_slows_roads() {
        let mut records = base_records();
        records.traffic.push(TrafficRecord {
            from: "2".into(),
            to: "1".into(),
            window: TimeWindow::MorningPeak,
            flow: Some(3000.0),
            multiplier: None,
        });
        let network = build_road_network(records, false).unwrap();
        let road = RoadId(0);
        let peak = network.travel_time(road, TimeWindow::MorningPeak);
        let night = network.travel_time(road, TimeWindow::Night);
        assert!((network.congestion_factor(road, TimeWindow::MorningPeak) - 1.0 / 1.15).abs() < 1e-9);
        assert!(peak > night);
        assert_eq!(network.traffic_flow(road, TimeWindow::MorningPeak), Some(3000.0));
    }

    #[test]
    fn traffic_for_missing_road_is_rejected() {
        let mut records = base_records();
        records.traffic.push(TrafficRecord {
            from: "1".into(),
            to: "F9".into(),
            window: TimeWindow::Night,
            flow: None,
            multiplier: Some(0.5),
        });
        assert!(matches!(
            build_road_network(records, false),
            Err(Error::InvalidInput(_))
        ));
    }
}
