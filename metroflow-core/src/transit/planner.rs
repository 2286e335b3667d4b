use std::cmp::Ordering;

use log::{debug, warn};

use super::transfers::{optimize_transfers, transfer_reports};
use super::{RouteAllocation, TransferAdjustment, TransitNetwork, TransitOptions, TransitPlan};
use crate::diagnostics::ConstraintViolation;
use crate::{Error, Interrupt};

/// Lexicographic objective of the allocation program: unserved routes first,
/// then routes above the waiting bound, then demand-weighted waiting time.
#[derive(Debug, Clone, Copy, Default)]
struct Score {
    unserved: u32,
    violations: u32,
    weighted_wait: f64,
}

impl Score {
    fn of(waiting: f64, bound: f64, demand: f64) -> Self {
        if waiting.is_infinite() {
            Score {
                unserved: 1,
                ..Default::default()
            }
        } else {
            Score {
                unserved: 0,
                violations: u32::from(waiting > bound),
                weighted_wait: waiting * demand,
            }
        }
    }

    fn plus(self, other: Score) -> Score {
        Score {
            unserved: self.unserved + other.unserved,
            violations: self.violations + other.violations,
            weighted_wait: self.weighted_wait + other.weighted_wait,
        }
    }

    /// Waiting totals within a relative 1e-9 count as equal, so allocations
    /// that only differ by rounding fall through to the route-order tie-break.
    fn compare(&self, other: &Score) -> Ordering {
        self.unserved
            .cmp(&other.unserved)
            .then(self.violations.cmp(&other.violations))
            .then_with(|| {
                let (a, b) = (self.weighted_wait, other.weighted_wait);
                let tolerance = 1e-9 * a.abs().max(b.abs()).max(1.0);
                if (a - b).abs() <= tolerance {
                    Ordering::Equal
                } else {
                    a.total_cmp(&b)
                }
            })
    }
}

/// Allocates the bus fleet across routes with a dynamic program over
/// `(route index, buses remaining)`.
///
/// The program never hands out more than `total_buses`. When no allocation
/// keeps every route within `max_waiting_time`, the best achievable plan is
/// returned with the offending routes listed in
/// [`TransitPlan::violations`]. Among equally good allocations, earlier
/// routes receive more buses.
pub fn allocate_buses(
    network: &TransitNetwork,
    options: &TransitOptions,
    interrupt: &Interrupt,
) -> Result<TransitPlan, Error> {
    network.validate()?;
    options.validate()?;

    let mut buses = solve(network, options, interrupt)?;

    let transfer_adjustments = if options.optimize_transfers {
        optimize_transfers(network, options, &mut buses, interrupt)?
    } else {
        Vec::new()
    };

    let plan = assemble(network, options, &buses, transfer_adjustments);
    debug!(
        "Transit plan: {} of {} buses allocated over {} routes, {} violation(s)",
        plan.total_allocated,
        options.total_buses,
        plan.allocations.len(),
        plan.violations.len()
    );
    if !plan.violations.is_empty() {
        warn!(
            "No allocation keeps every route within {} minutes; returning best effort",
            options.max_waiting_time
        );
    }
    Ok(plan)
}

/// Bottom-up table over `(route index, buses remaining)`; returns buses per route
fn solve(
    network: &TransitNetwork,
    options: &TransitOptions,
    interrupt: &Interrupt,
) -> Result<Vec<u32>, Error> {
    interrupt.check()?;
    let routes = &network.bus_routes;

    // Buses past every route's limit stay in the pool whatever the program does
    let fleet = routes
        .iter()
        .fold(0u32, |sum, route| {
            sum.saturating_add(route.bus_limit(options.total_buses))
        })
        .min(options.total_buses);
    let width = fleet as usize + 1;
    let too_large =
        || Error::invalid(format!("a fleet of {fleet} buses is too large to plan"));
    let cells = (routes.len() + 1).checked_mul(width).ok_or_else(too_large)?;

    // best[i * width + r]: optimum for routes i.. with r buses left, and the
    // buses given to route i in that optimum
    let mut best: Vec<(Score, u32)> = Vec::new();
    best.try_reserve_exact(cells).map_err(|_| too_large())?;
    best.resize(cells, (Score::default(), 0));

    for (index, route) in routes.iter().enumerate().rev() {
        let demand = route.daily_passengers as f64;
        for remaining in 0..=fleet {
            interrupt.check()?;
            let mut choice: Option<(Score, u32)> = None;

            // Larger allocations first so ties keep the larger one
            for assigned in (0..=route.bus_limit(remaining)).rev() {
                let rest = best[(index + 1) * width + (remaining - assigned) as usize].0;
                let score = Score::of(route.waiting(assigned), options.max_waiting_time, demand)
                    .plus(rest);
                if choice
                    .as_ref()
                    .is_none_or(|(current, _)| score.compare(current) == Ordering::Less)
                {
                    choice = Some((score, assigned));
                }
            }

            if let Some(choice) = choice {
                best[index * width + remaining as usize] = choice;
            }
        }
    }

    let mut remaining = fleet;
    let mut buses = Vec::with_capacity(routes.len());
    for index in 0..routes.len() {
        let assigned = best[index * width + remaining as usize].1;
        buses.push(assigned);
        remaining -= assigned;
    }
    Ok(buses)
}

fn assemble(
    network: &TransitNetwork,
    options: &TransitOptions,
    buses: &[u32],
    transfer_adjustments: Vec<TransferAdjustment>,
) -> TransitPlan {
    let bound = options.max_waiting_time;
    let mut violations = Vec::new();

    let allocations: Vec<RouteAllocation> = network
        .bus_routes
        .iter()
        .zip(buses)
        .map(|(route, &assigned)| {
            let waiting = route.waiting(assigned);
            if assigned == 0 {
                violations.push(ConstraintViolation::RouteUnserved {
                    route_id: route.id.clone(),
                });
            } else if waiting > bound {
                violations.push(ConstraintViolation::WaitingTimeExceeded {
                    route_id: route.id.clone(),
                    waiting_minutes: waiting,
                    bound_minutes: bound,
                });
            }
            RouteAllocation {
                route_id: route.id.clone(),
                buses: assigned,
                waiting_minutes: waiting,
                within_bound: waiting <= bound,
                current_buses: route.current_buses,
                current_waiting_minutes: route.current_buses.map(|current| route.waiting(current)),
                change: route
                    .current_buses
                    .map(|current| i64::from(assigned) - i64::from(current)),
            }
        })
        .collect();

    let total_allocated: u32 = buses.iter().sum();
    let average_waiting = weighted_waiting(network, buses);
    let current: Option<Vec<u32>> = network
        .bus_routes
        .iter()
        .map(|route| route.current_buses)
        .collect();
    let current_average_waiting = current
        .as_deref()
        .and_then(|current| weighted_waiting(network, current));
    let improvement_pct = match (current_average_waiting, average_waiting) {
        (Some(before), Some(after)) if before > 0.0 => Some((before - after) / before * 100.0),
        _ => None,
    };

    TransitPlan {
        transfer_reports: transfer_reports(network, buses),
        allocations,
        total_allocated,
        leftover_buses: options.total_buses - total_allocated,
        average_waiting,
        current_average_waiting,
        improvement_pct,
        transfer_adjustments,
        violations,
    }
}

/// Demand-weighted wait over routes with at least one bus
fn weighted_waiting(network: &TransitNetwork, buses: &[u32]) -> Option<f64> {
    let served: Vec<(f64, f64)> = network
        .bus_routes
        .iter()
        .zip(buses)
        .filter(|(_, assigned)| **assigned > 0)
        .map(|(route, &assigned)| (route.daily_passengers as f64, route.waiting(assigned)))
        .collect();
    let demand: f64 = served.iter().map(|(passengers, _)| passengers).sum();
    if served.is_empty() {
        None
    } else if demand > 0.0 {
        Some(served.iter().map(|(p, w)| p * w).sum::<f64>() / demand)
    } else {
        Some(served.iter().map(|(_, w)| w).sum::<f64>() / served.len() as f64)
    }
}
