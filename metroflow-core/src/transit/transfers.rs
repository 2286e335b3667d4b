use log::{debug, trace};

use super::{TransferAdjustment, TransferReport, TransitNetwork, TransitOptions};
use crate::{Error, Interrupt};

/// Minutes a coordinated bus waits after the train arrives
pub const TRANSFER_BUFFER_MINUTES: f64 = 2.0;

/// Worst bus wait at any transfer point and the route causing it
fn bottleneck(network: &TransitNetwork, buses: &[u32]) -> Option<(usize, f64)> {
    network
        .transfer_points
        .iter()
        .flat_map(|point| &point.bus_routes)
        .filter_map(|id| network.route_position(id))
        .map(|position| (position, network.bus_routes[position].waiting(buses[position])))
        .fold(None, |worst: Option<(usize, f64)>, (position, wait)| match worst {
            Some((held, held_wait))
                if held_wait > wait || (held_wait == wait && held <= position) =>
            {
                Some((held, held_wait))
            }
            _ => Some((position, wait)),
        })
}

fn max_transfer_wait(network: &TransitNetwork, buses: &[u32]) -> f64 {
    bottleneck(network, buses).map_or(0.0, |(_, wait)| wait)
}

/// Second pass over a finished allocation: moves up to
/// `options.max_transfer_moves` buses to the route with the worst wait at an
/// interchange.
///
/// Unallocated buses are used first. Otherwise a bus is taken from the route
/// whose demand-weighted wait grows least, provided it keeps at least one bus
/// and stays within `max_waiting_time`. A move is kept only if it strictly
/// lowers the worst transfer wait, and the fleet total never grows.
pub(super) fn optimize_transfers(
    network: &TransitNetwork,
    options: &TransitOptions,
    buses: &mut [u32],
    interrupt: &Interrupt,
) -> Result<Vec<TransferAdjustment>, Error> {
    let mut adjustments = Vec::new();
    let bound = options.max_waiting_time;

    for _ in 0..options.max_transfer_moves {
        interrupt.check()?;
        let Some((receiver, before)) = bottleneck(network, buses) else {
            break;
        };
        let receiving = &network.bus_routes[receiver];
        if receiving.max_buses.is_some_and(|limit| buses[receiver] >= limit) {
            trace!("Route {} is at its fleet limit", receiving.id);
            break;
        }

        let allocated: u32 = buses.iter().sum();
        let donor = if allocated < options.total_buses {
            None
        } else {
            let donor = (0..buses.len())
                .filter(|&position| position != receiver && buses[position] > 1)
                .filter(|&position| {
                    network.bus_routes[position].waiting(buses[position] - 1) <= bound
                })
                .map(|position| {
                    let route = &network.bus_routes[position];
                    let demand = route.daily_passengers as f64;
                    let growth = (route.waiting(buses[position] - 1)
                        - route.waiting(buses[position]))
                        * demand;
                    (position, growth)
                })
                .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
            match donor {
                Some((position, _)) => Some(position),
                None => {
                    trace!("No route can spare a bus for {}", receiving.id);
                    break;
                }
            }
        };

        buses[receiver] += 1;
        if let Some(position) = donor {
            buses[position] -= 1;
        }
        let after = max_transfer_wait(network, buses);

        if after < before {
            adjustments.push(TransferAdjustment {
                route_id: receiving.id.clone(),
                donor_route_id: donor.map(|position| network.bus_routes[position].id.clone()),
                buses_after: buses[receiver],
                max_transfer_wait_before: before,
                max_transfer_wait_after: after,
            });
        } else {
            buses[receiver] -= 1;
            if let Some(position) = donor {
                buses[position] += 1;
            }
            break;
        }
    }

    debug!("Transfer pass moved {} bus(es)", adjustments.len());
    Ok(adjustments)
}

/// Coordination estimate for every transfer point under the given allocation
pub(super) fn transfer_reports(network: &TransitNetwork, buses: &[u32]) -> Vec<TransferReport> {
    network
        .transfer_points
        .iter()
        .map(|point| {
            let uncoordinated_wait = point
                .bus_routes
                .iter()
                .filter_map(|id| network.route_position(id))
                .map(|position| network.bus_routes[position].waiting(buses[position]))
                .fold(0.0, f64::max);

            let frequencies: Vec<f64> = point
                .metro_lines
                .iter()
                .filter_map(|id| network.metro_line(id))
                .map(|line| line.frequency_peak)
                .collect();
            let mean_frequency = if frequencies.is_empty() {
                0.0
            } else {
                frequencies.iter().sum::<f64>() / frequencies.len() as f64
            };
            let coordinated_wait = TRANSFER_BUFFER_MINUTES + mean_frequency / 4.0;

            let improvement_pct = if uncoordinated_wait.is_finite() && uncoordinated_wait > 0.0 {
                (uncoordinated_wait - coordinated_wait) / uncoordinated_wait * 100.0
            } else {
                0.0
            };

            TransferReport {
                station: point.station.clone(),
                metro_lines: point.metro_lines.clone(),
                bus_routes: point.bus_routes.clone(),
                uncoordinated_wait,
                coordinated_wait,
                improvement_pct,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transit::{BusRoute, MetroLine, TransferPoint, WaitingCurve, allocate_buses};

    fn interchange() -> TransitNetwork {
        let headway = |minutes| WaitingCurve::Headway {
            round_trip_minutes: minutes,
        };
        TransitNetwork {
            bus_routes: vec![
                BusRoute::new("B1", 30_000, headway(60.0)),
                BusRoute::new("B2", 20_000, headway(120.0)),
                BusRoute::new("B3", 10_000, headway(40.0)),
            ],
            metro_lines: vec![MetroLine {
                id: "M1".into(),
                name: "Line 1".into(),
                stations: vec!["Sadat".into()],
                daily_passengers: Some(1_500_000),
                frequency_peak: 4.0,
                frequency_offpeak: 8.0,
            }],
            transfer_points: vec![TransferPoint {
                station: "Sadat".into(),
                metro_lines: vec!["M1".into()],
                bus_routes: vec!["B2".into()],
            }],
        }
    }

    #[test]
    fn transfers_never_exceed_fleet() {
        let network = interchange();
        let options = TransitOptions {
            total_buses: 12,
            max_waiting_time: 15.0,
            optimize_transfers: true,
            max_transfer_moves: 3,
        };
        let plan = allocate_buses(&network, &options, &Interrupt::none()).unwrap();
        assert!(plan.total_allocated <= 12);
        for adjustment in &plan.transfer_adjustments {
            assert_eq!(adjustment.route_id, "B2");
            assert!(adjustment.max_transfer_wait_after < adjustment.max_transfer_wait_before);
        }
    }

    #[test]
    fn transfer_pass_lowers_interchange_wait() {
        let network = interchange();
        let mut buses = vec![4, 4, 2];
        let options = TransitOptions {
            total_buses: 10,
            max_waiting_time: 15.0,
            optimize_transfers: true,
            max_transfer_moves: 2,
        };
        let before = max_transfer_wait(&network, &buses);
        let moves = optimize_transfers(&network, &options, &mut buses, &Interrupt::none()).unwrap();

        assert_eq!(moves.len(), 2);
        assert_eq!(buses.iter().sum::<u32>(), 10);
        assert!(max_transfer_wait(&network, &buses) < before);
        assert!(buses.iter().all(|&b| b >= 1));
    }

    #[test]
    fn coordination_report_uses_metro_frequency() {
        let network = interchange();
        let reports = transfer_reports(&network, &[4, 4, 2]);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].uncoordinated_wait, 15.0);
        assert_eq!(reports[0].coordinated_wait, 3.0);
        assert!((reports[0].improvement_pct - 80.0).abs() < 1e-9);
    }
}
