use log::{debug, warn};

use super::{Intersection, PhaseFlow, PhaseTiming, SignalOptions, SignalPlan};
use crate::diagnostics::ConstraintViolation;
use crate::{Error, Interrupt, Seconds};

/// Greedy green-time allocation for one intersection.
///
/// Every phase first receives `min_green_time`; the rest of the cycle is then
/// handed out in rounds, each phase getting the floor of its weighted share of
/// what is left, until nothing is left or every phase has reached
/// `max_green_time`. Seconds lost to flooring go to the highest-flow phase
/// that is still below the cap (lowest index on ties); only when every phase
/// is capped does the busiest phase overrun it. Greens always sum to
/// `max_cycle_length`.
///
/// If the minimum greens alone do not fit in the cycle, the cycle is split
/// evenly and a [`ConstraintViolation::MinimumGreenInfeasible`] is attached.
pub fn optimize_signals(
    intersection: &Intersection,
    flows: &[PhaseFlow],
    options: &SignalOptions,
    interrupt: &Interrupt,
) -> Result<SignalPlan, Error> {
    validate(intersection, flows, options)?;

    let cycle = options.max_cycle_length;
    let phases = flows.len() as Seconds;
    let mut weights: Vec<f64> = flows.iter().map(|f| options.priority.weight(f.flow)).collect();
    let total_weight: f64 = weights.iter().sum();
    if total_weight > 0.0 {
        weights.iter_mut().for_each(|w| *w /= total_weight);
    } else {
        weights.fill(1.0 / flows.len() as f64);
    }

    let mut violations = Vec::new();
    let required = u64::from(phases) * u64::from(options.min_green_time);
    let mut greens = if required > u64::from(cycle) {
        violations.push(ConstraintViolation::MinimumGreenInfeasible {
            intersection_id: intersection.id.clone(),
            required_seconds: required,
            cycle_seconds: cycle,
        });
        vec![cycle / phases; flows.len()]
    } else {
        distribute(&weights, options, interrupt)?
    };

    let mut residual = cycle - greens.iter().sum::<Seconds>();
    if let Some(cap) = options.max_green_time {
        for i in by_flow(flows) {
            let seconds = cap.saturating_sub(greens[i]).min(residual);
            greens[i] += seconds;
            residual -= seconds;
        }
    }
    if residual > 0 {
        let busiest = busiest_phase(flows);
        greens[busiest] += residual;
        if let Some(cap) = options.max_green_time {
            violations.push(ConstraintViolation::MaximumGreenExceeded {
                intersection_id: intersection.id.clone(),
                phase: flows[busiest].phase.clone(),
                green_seconds: greens[busiest],
                cap_seconds: cap,
            });
        }
    }

    let average_wait_seconds = average_delay(flows, &greens_as_f64(&greens), cycle);
    let equal = vec![f64::from(cycle) / flows.len() as f64; flows.len()];
    let baseline_wait_seconds = average_delay(flows, &equal, cycle);
    let improvement_pct = if baseline_wait_seconds > 0.0 {
        (baseline_wait_seconds - average_wait_seconds) / baseline_wait_seconds * 100.0
    } else {
        0.0
    };

    let plan = SignalPlan {
        intersection_id: intersection.id.clone(),
        phases: flows
            .iter()
            .zip(&weights)
            .zip(&greens)
            .map(|((flow, &weight), &green)| PhaseTiming {
                phase: flow.phase.clone(),
                flow: flow.flow,
                weight,
                green_seconds: green,
                red_seconds: cycle - green,
            })
            .collect(),
        cycle_length: cycle,
        average_wait_seconds,
        baseline_wait_seconds,
        improvement_pct,
        violations,
    };

    debug!(
        "Signal plan for {}: {} phases, wait {:.1}s vs {:.1}s fixed ({:+.1}%)",
        intersection.id,
        plan.phases.len(),
        plan.average_wait_seconds,
        plan.baseline_wait_seconds,
        plan.improvement_pct
    );
    if !plan.violations.is_empty() {
        warn!(
            "Signal plan for {} is best effort: {}",
            intersection.id,
            plan.violations.len()
        );
    }
    Ok(plan)
}

fn validate(
    intersection: &Intersection,
    flows: &[PhaseFlow],
    options: &SignalOptions,
) -> Result<(), Error> {
    if flows.is_empty() {
        return Err(Error::invalid(format!(
            "intersection {} has no signal phases",
            intersection.id
        )));
    }
    if options.max_cycle_length == 0 {
        return Err(Error::invalid("cycle length must be positive"));
    }
    if let Some(flow) = flows.iter().find(|f| !(f.flow.is_finite() && f.flow >= 0.0)) {
        return Err(Error::invalid(format!(
            "phase {} at intersection {} has invalid flow {}",
            flow.phase, intersection.id, flow.flow
        )));
    }
    if let Some(cap) = options.max_green_time {
        if cap < options.min_green_time {
            return Err(Error::invalid(format!(
                "max green time {cap}s is below min green time {}s",
                options.min_green_time
            )));
        }
    }
    Ok(())
}

/// Minimum greens plus rounds of floored proportional shares
fn distribute(
    weights: &[f64],
    options: &SignalOptions,
    interrupt: &Interrupt,
) -> Result<Vec<Seconds>, Error> {
    let mut greens = vec![options.min_green_time; weights.len()];
    let minimums = u64::from(options.min_green_time) * weights.len() as u64;
    let mut remaining = Seconds::try_from(u64::from(options.max_cycle_length) - minimums)
        .map_err(|_| Error::invalid("minimum greens exceed the cycle length"))?;
    let headroom = |green: Seconds| {
        options
            .max_green_time
            .map_or(Seconds::MAX, |cap| cap.saturating_sub(green))
    };

    loop {
        interrupt.check()?;
        let open: Vec<usize> = (0..weights.len())
            .filter(|&i| headroom(greens[i]) > 0)
            .collect();
        if remaining == 0 || open.is_empty() {
            break;
        }

        let open_weight: f64 = open.iter().map(|&i| weights[i]).sum();
        let mut granted = 0;
        for &i in &open {
            let share = if open_weight > 0.0 {
                weights[i] / open_weight
            } else {
                1.0 / open.len() as f64
            };
            let seconds =
                ((f64::from(remaining) * share).floor() as Seconds).min(headroom(greens[i]));
            greens[i] += seconds;
            granted += seconds;
        }
        if granted == 0 {
            break;
        }
        remaining -= granted;
    }
    Ok(greens)
}

/// Phase indices by descending flow, lowest index first on ties
fn by_flow(flows: &[PhaseFlow]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..flows.len()).collect();
    order.sort_by(|&a, &b| flows[b].flow.total_cmp(&flows[a].flow));
    order
}

fn busiest_phase(flows: &[PhaseFlow]) -> usize {
    flows
        .iter()
        .enumerate()
        .fold(0, |best, (i, f)| if f.flow > flows[best].flow { i } else { best })
}

fn greens_as_f64(greens: &[Seconds]) -> Vec<f64> {
    greens.iter().map(|&g| f64::from(g)).collect()
}

/// Flow-weighted uniform delay `(C − g)² / 2C`
fn average_delay(flows: &[PhaseFlow], greens: &[f64], cycle: Seconds) -> f64 {
    let cycle = f64::from(cycle);
    let delay = |green: f64| (cycle - green).powi(2) / (2.0 * cycle);
    let total_flow: f64 = flows.iter().map(|f| f.flow).sum();
    if total_flow > 0.0 {
        flows
            .iter()
            .zip(greens)
            .map(|(f, &g)| f.flow * delay(g))
            .sum::<f64>()
            / total_flow
    } else {
        greens.iter().map(|&g| delay(g)).sum::<f64>() / greens.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::signals::PriorityMode;

    fn approaches(flows: &[f64]) -> Vec<PhaseFlow> {
        flows
            .iter()
            .enumerate()
            .map(|(i, &flow)| PhaseFlow::new(&format!("P{i}"), flow))
            .collect()
    }

    fn plan(flows: &[f64], options: SignalOptions) -> SignalPlan {
        optimize_signals(
            &Intersection::new("Tahrir"),
            &approaches(flows),
            &options,
            &Interrupt::none(),
        )
        .unwrap()
    }

    #[test]
    fn busier_phase_gets_more_green() {
        let plan = plan(&[1200.0, 400.0], SignalOptions::default());
        assert_eq!(plan.phases[0].green_seconds + plan.phases[1].green_seconds, 120);
        assert!(plan.phases[0].green_seconds > plan.phases[1].green_seconds);
        assert!(plan.improvement_pct > 0.0);
        assert!(plan.violations.is_empty());
    }

    #[test]
    fn residual_goes_to_busiest_phase() {
        // Shares of 100 over three equal weights floor to 33 each
        let options = SignalOptions {
            max_cycle_length: 100,
            min_green_time: 0,
            ..Default::default()
        };
        let plan = plan(&[500.0, 500.0, 500.0], options);
        let greens: Vec<Seconds> = plan.phases.iter().map(|p| p.green_seconds).collect();
        assert_eq!(greens, vec![34, 33, 33]);
    }

    #[test]
    fn balance_mode_narrows_spread() {
        let flows = [1600.0, 100.0, 400.0];
        let spread = |mode| {
            let plan = plan(
                &flows,
                SignalOptions {
                    priority: mode,
                    ..Default::default()
                },
            );
            let greens: Vec<Seconds> = plan.phases.iter().map(|p| p.green_seconds).collect();
            greens.iter().max().unwrap() - greens.iter().min().unwrap()
        };
        let balanced = spread(PriorityMode::BalanceWaitTimes);
        let proportional = spread(PriorityMode::MinimizeAverageDelay);
        let amplified = spread(PriorityMode::PrioritizeHighTraffic);
        assert!(balanced < proportional);
        assert!(proportional < amplified);
    }

    #[test]
    fn infeasible_minimums_split_evenly() {
        let options = SignalOptions {
            max_cycle_length: 60,
            min_green_time: 25,
            ..Default::default()
        };
        let plan = plan(&[300.0, 900.0, 200.0], options);
        let greens: Vec<Seconds> = plan.phases.iter().map(|p| p.green_seconds).collect();
        assert_eq!(greens, vec![20, 20, 20]);
        assert!(matches!(
            plan.violations[..],
            [ConstraintViolation::MinimumGreenInfeasible {
                required_seconds: 75,
                cycle_seconds: 60,
                ..
            }]
        ));
    }

    #[test]
    fn green_cap_is_honoured_while_possible() {
        let options = SignalOptions {
            max_cycle_length: 90,
            min_green_time: 10,
            max_green_time: Some(40),
            ..Default::default()
        };
        let plan = plan(&[2000.0, 100.0, 100.0], options);
        assert_eq!(plan.phases.iter().map(|p| p.green_seconds).sum::<Seconds>(), 90);
        assert!(plan.phases.iter().all(|p| p.green_seconds <= 40));
    }

    #[test]
    fn residual_skips_capped_phase() {
        // Flooring leaves one second over while the busiest phase sits at its cap
        let options = SignalOptions {
            max_cycle_length: 61,
            min_green_time: 10,
            max_green_time: Some(30),
            ..Default::default()
        };
        let plan = plan(&[3000.0, 100.0, 100.0], options);
        let greens: Vec<Seconds> = plan.phases.iter().map(|p| p.green_seconds).collect();
        assert_eq!(greens.iter().sum::<Seconds>(), 61);
        assert!(greens.iter().all(|&g| g <= 30));
        assert!(plan.violations.is_empty());
    }

    #[test]
    fn cap_overrun_only_when_every_phase_is_capped() {
        let options = SignalOptions {
            max_cycle_length: 100,
            min_green_time: 10,
            max_green_time: Some(30),
            ..Default::default()
        };
        let plan = plan(&[900.0, 300.0], options);
        let greens: Vec<Seconds> = plan.phases.iter().map(|p| p.green_seconds).collect();
        assert_eq!(greens, vec![70, 30]);
        assert!(matches!(
            plan.violations[..],
            [ConstraintViolation::MaximumGreenExceeded {
                green_seconds: 70,
                cap_seconds: 30,
                ..
            }]
        ));
    }

    #[test]
    fn huge_minimum_green_does_not_overflow() {
        let options = SignalOptions {
            max_cycle_length: 120,
            min_green_time: 3_000_000_000,
            ..Default::default()
        };
        let plan = plan(&[400.0, 800.0], options);
        let greens: Vec<Seconds> = plan.phases.iter().map(|p| p.green_seconds).collect();
        assert_eq!(greens.iter().sum::<Seconds>(), 120);
        assert!(matches!(
            plan.violations[..],
            [ConstraintViolation::MinimumGreenInfeasible {
                required_seconds: 6_000_000_000,
                cycle_seconds: 120,
                ..
            }]
        ));
    }

    #[test]
    fn rejects_empty_and_negative_flows() {
        let intersection = Intersection::new("X");
        let options = SignalOptions::default();
        assert!(matches!(
            optimize_signals(&intersection, &[], &options, &Interrupt::none()),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            optimize_signals(&intersection, &approaches(&[-5.0]), &options, &Interrupt::none()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn greens_sum_to_cycle_and_respect_minimum() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let count = rng.gen_range(1..=6);
            let flows: Vec<f64> = (0..count).map(|_| rng.gen_range(0.0..3000.0)).collect();
            let min_green_time = rng.gen_range(0..=15);
            let options = SignalOptions {
                max_cycle_length: rng.gen_range(count * min_green_time.max(1)..=180),
                priority: match rng.gen_range(0..3) {
                    0 => PriorityMode::MinimizeAverageDelay,
                    1 => PriorityMode::PrioritizeHighTraffic,
                    _ => PriorityMode::BalanceWaitTimes,
                },
                min_green_time,
                max_green_time: None,
            };
            let plan = plan(&flows, options);
            let total: Seconds = plan.phases.iter().map(|p| p.green_seconds).sum();
            assert_eq!(total, options.max_cycle_length);
            assert!(plan.phases.iter().all(|p| p.green_seconds >= min_green_time));
        }
    }
}
