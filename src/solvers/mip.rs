//! Mixed-integer programming backend.
//!
//! Compiles a scenario into a discrete-time 0/1 model over `good_lp`.
//! The concrete LP/MIP vendor sits behind `good_lp`'s `default_solver`,
//! selected by cargo feature.
//!
//! Formulation, per task `T` with length `p` over horizon `H`:
//! - start indicators `u[T][t]` for every admissible `t ∈ [0, H − p]`,
//!   with `Σ_t u = y_T` (`y_T` is 1, or a binary for optional tasks);
//! - assignment binaries `x[T][R]` per candidate resource, one per pair
//!   even when the pair is shared across requirement groups, with
//!   `Σ_{R ∈ group} x = k·y_T`;
//! - occupancy binaries `z[T][R][t]` linked through
//!   `z ≥ active + x − 1`, `z ≤ active`, `z ≤ x`, where `active` is the
//!   window sum of `u` placing `T` on period `t`;
//! - per resource and period, `Σ_T z ≤ size` (disjunctive when size is 1,
//!   per-period cumulative sums otherwise);
//! - precedences and bounds as big-M-relaxed linear rows, exact whenever
//!   the involved tasks are mandatory;
//! - capacity aggregates over weighted `z` windows: Sum as one row, Max
//!   per period, Diff through positive-part variables.
//!
//! Objective: `Σ delay_cost·completion + Σ schedule_cost·y +
//! Σ cost_per_period·occupancy`, minimized.

use std::collections::BTreeMap;

use good_lp::{
    constraint, default_solver, variable, variables, Expression, ResolutionError, Solution,
    SolverModel, Variable,
};
use log::{debug, info};

use crate::error::{Result, ScheduleError};
use crate::models::{Aggregate, BoundKind, Comparator, Constraint, PrecedenceKind, Scenario};
use crate::solvers::{prepare, Backend, Capability, SolveOptions};
use crate::validation::per_period_weight;

/// The MIP backend. Stateless; one value can serve many scenarios.
#[derive(Debug, Clone, Copy, Default)]
pub struct MipBackend;

impl MipBackend {
    pub fn new() -> Self {
        Self
    }
}

const SUPPORTED: &[Capability] = &[
    Capability::ResourceChoice,
    Capability::Cumulative,
    Capability::CapacitySum,
    Capability::CapacitySliced,
    Capability::CapacityMax,
    Capability::CapacityDiff,
    Capability::OptionalTasks,
    Capability::AvailabilityPeriods,
    Capability::PeriodCosts,
];

/// Per-task model variables.
struct TaskVars {
    /// Start indicators keyed by admissible start period.
    u: BTreeMap<i64, Variable>,
    /// Scheduling indicator; `None` means the task is mandatory.
    y: Option<Variable>,
}

impl TaskVars {
    fn scheduled(&self) -> Expression {
        match self.y {
            Some(y) => Expression::from(y),
            None => Expression::from(1.0),
        }
    }

    fn start(&self) -> Expression {
        self.u
            .iter()
            .fold(Expression::from(0.0), |acc, (t, u)| acc + (*t as f64) * *u)
    }

    fn completion(&self, length: i64) -> Expression {
        self.u.iter().fold(Expression::from(0.0), |acc, (t, u)| {
            acc + ((*t + length) as f64) * *u
        })
    }

    /// Start indicators that put the task on period `t`, or `None` when no
    /// admissible start covers it.
    fn active_at(&self, t: i64, length: i64) -> Option<Expression> {
        if length == 0 {
            return None;
        }
        let mut starts = self.u.range(t - length + 1..=t).peekable();
        starts.peek()?;
        Some(starts.fold(Expression::from(0.0), |acc, (_, u)| acc + *u))
    }
}

impl Backend for MipBackend {
    fn name(&self) -> &'static str {
        "mip"
    }

    fn supported(&self) -> &'static [Capability] {
        SUPPORTED
    }

    fn solve(&self, scenario: &mut Scenario, options: &SolveOptions) -> Result<bool> {
        if options.copy_scenario {
            let mut copy = scenario.clone();
            let mut inner = options.clone();
            inner.copy_scenario = false;
            return self.solve(&mut copy, &inner);
        }

        prepare(self, scenario)?;
        if options.time_limit.is_some() && options.msg {
            debug!("mip: time limit is advisory and not enforced by the bundled solver");
        }

        let horizon = scenario.horizon;
        let attached = scenario.active_constraints();

        let task_index: BTreeMap<&str, usize> = scenario
            .tasks()
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.as_str(), i))
            .collect();
        let resource_index: BTreeMap<&str, usize> = scenario
            .resources()
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name.as_str(), i))
            .collect();

        let mut vars = variables!();
        let mut rows: Vec<good_lp::Constraint> = Vec::new();

        // Start and scheduling indicators.
        let task_vars: Vec<TaskVars> = scenario
            .tasks()
            .iter()
            .map(|task| {
                let mut u = BTreeMap::new();
                for t in 0..=horizon - task.length {
                    if (t..t + task.length).all(|p| task.allows_period(p)) {
                        u.insert(t, vars.add(variable().binary()));
                    }
                }
                let y = task.is_optional().then(|| vars.add(variable().binary()));
                TaskVars { u, y }
            })
            .collect();

        for tv in &task_vars {
            let placed = tv
                .u
                .values()
                .fold(Expression::from(0.0), |acc, u| acc + *u);
            rows.push(constraint!(placed == tv.scheduled()));
        }

        // Assignment binaries, one per (task, candidate resource) pair.
        let mut assign: BTreeMap<(usize, usize), Variable> = BTreeMap::new();
        for (ti, task) in scenario.tasks().iter().enumerate() {
            for cand in task.candidate_resources() {
                let ri = resource_index[cand];
                assign
                    .entry((ti, ri))
                    .or_insert_with(|| vars.add(variable().binary()));
            }
            for req in &task.requirements {
                let mut group = Expression::from(0.0);
                for cand in &req.candidates {
                    group += assign[&(ti, resource_index[cand.as_str()])];
                }
                let needed = task_vars[ti].scheduled() * req.multiplicity as f64;
                rows.push(constraint!(group == needed));
            }
            for pin in &task.pinned {
                let x = assign[&(ti, resource_index[pin.as_str()])];
                rows.push(constraint!(x == task_vars[ti].scheduled()));
            }
        }

        // Occupancy binaries tying assignment to per-period activity.
        let mut occupancy: BTreeMap<(usize, usize), BTreeMap<i64, Variable>> = BTreeMap::new();
        for (&(ti, ri), &x) in &assign {
            let task = &scenario.tasks()[ti];
            let resource = &scenario.resources()[ri];
            let mut per_period = BTreeMap::new();
            for t in 0..horizon {
                let Some(active) = task_vars[ti].active_at(t, task.length) else {
                    continue;
                };
                if !resource.available_at(t) {
                    // The pair may not be assigned and occupy this period.
                    rows.push(constraint!(active + x <= 1.0));
                    continue;
                }
                let z = vars.add(variable().binary());
                rows.push(constraint!(z >= active.clone() + x - 1.0));
                rows.push(constraint!(z <= active));
                rows.push(constraint!(z <= x));
                per_period.insert(t, z);
            }
            occupancy.insert((ti, ri), per_period);
        }

        // Concurrency limits per resource and period.
        for (ri, resource) in scenario.resources().iter().enumerate() {
            for t in 0..horizon {
                let mut used = Expression::from(0.0);
                let mut any = false;
                for (&(_, ori), per_period) in &occupancy {
                    if ori != ri {
                        continue;
                    }
                    if let Some(z) = per_period.get(&t) {
                        used += *z;
                        any = true;
                    }
                }
                if any {
                    rows.push(constraint!(used <= resource.size as f64));
                }
            }
        }

        // Attached constraints.
        for item in &attached {
            match item {
                Constraint::Precedence {
                    left,
                    right,
                    offset,
                    kind,
                } => {
                    let li = task_index[left.as_str()];
                    let ri = task_index[right.as_str()];
                    let gap = scenario.tasks()[li].length + offset;
                    let big_m = (2 * horizon + gap.abs() + 1) as f64;
                    let slack = (Expression::from(2.0)
                        - task_vars[li].scheduled()
                        - task_vars[ri].scheduled())
                        * big_m;
                    let lead = task_vars[ri].start() - task_vars[li].start();
                    rows.push(constraint!(lead.clone() + slack.clone() >= gap as f64));
                    if *kind == PrecedenceKind::Tight {
                        rows.push(constraint!(lead - slack <= gap as f64));
                    }
                }
                Constraint::Bound { task, bound, kind } => {
                    let ti = task_index[task.as_str()];
                    let length = scenario.tasks()[ti].length;
                    let big_m = (2 * horizon + bound.abs() + length + 1) as f64;
                    let slack =
                        (Expression::from(1.0) - task_vars[ti].scheduled()) * big_m;
                    let start = task_vars[ti].start();
                    match kind {
                        BoundKind::EarliestStart => {
                            rows.push(constraint!(start + slack >= *bound as f64));
                        }
                        BoundKind::LatestEnd => {
                            rows.push(constraint!(start - slack <= (*bound - length) as f64));
                        }
                        BoundKind::ExactStart => {
                            rows.push(constraint!(
                                start.clone() + slack.clone() >= *bound as f64
                            ));
                            rows.push(constraint!(start - slack <= *bound as f64));
                        }
                        BoundKind::ExactEnd => {
                            rows.push(constraint!(
                                start.clone() + slack.clone() >= (*bound - length) as f64
                            ));
                            rows.push(constraint!(start - slack <= (*bound - length) as f64));
                        }
                    }
                }
                Constraint::Capacity(cap) => {
                    let ri = resource_index[cap.resource.as_str()];
                    let resource = &scenario.resources()[ri];
                    let (from, until) = cap.resolved_window(horizon);

                    let weighted_at = |t: i64| -> Expression {
                        let mut expr = Expression::from(0.0);
                        for (ti, task) in scenario.tasks().iter().enumerate() {
                            let weight = per_period_weight(task, &cap.attribute)
                                * resource.period_weight(&cap.attribute, t);
                            if weight == 0 {
                                continue;
                            }
                            if let Some(z) = occupancy.get(&(ti, ri)).and_then(|m| m.get(&t)) {
                                expr += (weight as f64) * *z;
                            }
                        }
                        expr
                    };

                    match cap.aggregate {
                        Aggregate::Sum => {
                            let mut total = Expression::from(0.0);
                            for t in from..until {
                                total += weighted_at(t);
                            }
                            push_comparison(&mut rows, total, cap.comparator, cap.bound);
                        }
                        Aggregate::Max => {
                            for t in from..until {
                                push_comparison(
                                    &mut rows,
                                    weighted_at(t),
                                    cap.comparator,
                                    cap.bound,
                                );
                            }
                        }
                        Aggregate::Diff => {
                            let mut total = Expression::from(0.0);
                            for t in from + 1..until {
                                let rise = vars.add(variable().min(0.0));
                                rows.push(constraint!(
                                    rise >= weighted_at(t) - weighted_at(t - 1)
                                ));
                                total += rise;
                            }
                            push_comparison(&mut rows, total, cap.comparator, cap.bound);
                        }
                    }
                }
            }
        }

        // Objective.
        let mut objective = Expression::from(0.0);
        for (ti, task) in scenario.tasks().iter().enumerate() {
            if task.delay_cost != 0 {
                objective += task_vars[ti].completion(task.length) * task.delay_cost as f64;
            }
            if let (Some(cost), Some(y)) = (task.schedule_cost, task_vars[ti].y) {
                objective += (cost as f64) * y;
            }
        }
        for (ri, resource) in scenario.resources().iter().enumerate() {
            let Some(cost) = resource.cost_per_period else {
                continue;
            };
            for (&(_, ori), per_period) in &occupancy {
                if ori != ri {
                    continue;
                }
                for z in per_period.values() {
                    objective += (cost as f64) * *z;
                }
            }
        }

        if options.msg {
            info!(
                "mip: scenario '{}' compiled into {} rows",
                scenario.name,
                rows.len()
            );
        }

        let mut problem = vars.minimise(objective).using(default_solver);
        for row in rows {
            problem = problem.with(row);
        }

        let solved = match problem.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => {
                if options.msg {
                    info!("mip: scenario '{}' proven infeasible", scenario.name);
                }
                return Ok(false);
            }
            Err(other) => {
                return Err(ScheduleError::Solver {
                    backend: self.name(),
                    message: other.to_string(),
                })
            }
        };

        // Read the full solution before mutating anything.
        let mut starts: Vec<Option<i64>> = Vec::with_capacity(scenario.tasks().len());
        let mut assigned: Vec<Option<Vec<String>>> = Vec::with_capacity(scenario.tasks().len());
        for (ti, task) in scenario.tasks().iter().enumerate() {
            let scheduled = match task_vars[ti].y {
                Some(y) => solved.value(y) > 0.5,
                None => true,
            };
            if !scheduled {
                starts.push(None);
                assigned.push(None);
                continue;
            }
            let start = task_vars[ti]
                .u
                .iter()
                .find(|(_, u)| solved.value(**u) > 0.5)
                .map(|(t, _)| *t);
            let Some(start) = start else {
                return Err(ScheduleError::Solver {
                    backend: self.name(),
                    message: format!("no start indicator set for task '{}'", task.name),
                });
            };
            let resources = task
                .candidate_resources()
                .into_iter()
                .filter(|cand| solved.value(assign[&(ti, resource_index[*cand])]) > 0.5)
                .map(str::to_string)
                .collect();
            starts.push(Some(start));
            assigned.push(Some(resources));
        }

        for ((task, start), resources) in
            scenario.tasks_mut().iter_mut().zip(starts).zip(assigned)
        {
            task.start_value = start;
            task.resources = resources;
        }

        Ok(true)
    }
}

fn push_comparison(
    rows: &mut Vec<good_lp::Constraint>,
    expr: Expression,
    comparator: Comparator,
    bound: i64,
) {
    match comparator {
        Comparator::Le => rows.push(constraint!(expr <= bound as f64)),
        Comparator::Ge => rows.push(constraint!(expr >= bound as f64)),
        Comparator::Eq => rows.push(constraint!(expr == bound as f64)),
    }
}
