//! Constraint programming backend.
//!
//! Compiles a scenario into a `pumpkin-solver` model:
//! - a bounded integer start variable in `[0, horizon − length]` per task;
//! - one performed-literal per (task, candidate resource) pair, shared by
//!   every requirement group naming that pair, with a boolean linear
//!   equality `Σ performed = multiplicity` per group;
//! - pairwise disjunctions per size-1 resource: a precedence literal
//!   `before(x, y)` implies `end(x) ≤ start(y)`, and a clause requires one
//!   of the two orders whenever both tasks are performed on the resource;
//! - the cumulative global constraint per size > 1 resource, available
//!   only when every pair on that resource is forced;
//! - whole-horizon Sum capacity constraints as weighted boolean sums.
//!
//! Minimizes `Σ delay_cost·end` through an objective variable when any
//! delay cost is set, otherwise stops at the first solution. Sliced, Max,
//! and Diff capacity constraints, optional tasks, and availability periods
//! are declared unsupported rather than approximated.

use std::collections::BTreeMap;

use log::info;
use pumpkin_solver::constraints;
use pumpkin_solver::optimisation::linear_sat_unsat::LinearSatUnsat;
use pumpkin_solver::optimisation::OptimisationDirection;
use pumpkin_solver::results::{
    OptimisationResult, ProblemSolution, SatisfactionResult, Solution, SolutionReference,
};
use pumpkin_solver::termination::{Indefinite, TerminationCondition, TimeBudget};
use pumpkin_solver::variables::{DomainId, Literal, TransformableVariable};
use pumpkin_solver::Solver;

use crate::error::{Result, ScheduleError};
use crate::models::{BoundKind, Comparator, Constraint, PrecedenceKind, Scenario};
use crate::solvers::{prepare, Backend, Capability, SolveOptions};

/// The CP backend. Stateless; one value can serve many scenarios.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpBackend;

impl CpBackend {
    pub fn new() -> Self {
        Self
    }
}

const SUPPORTED: &[Capability] = &[
    Capability::ResourceChoice,
    Capability::Cumulative,
    Capability::CapacitySum,
];

const BACKEND: &str = "cp";

fn to_i32(value: i64, backend: &'static str) -> Result<i32> {
    i32::try_from(value).map_err(|_| ScheduleError::Solver {
        backend,
        message: format!("value {value} exceeds the engine's integer range"),
    })
}

impl Backend for CpBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn supported(&self) -> &'static [Capability] {
        SUPPORTED
    }

    fn check_support(&self, scenario: &Scenario) -> Result<()> {
        crate::solvers::check_supported_set(self, scenario)?;

        // The cumulative constraint takes a fixed task set: alternative
        // choice on a size > 1 resource has no sound encoding here.
        for resource in scenario.resources() {
            if resource.size <= 1 {
                continue;
            }
            for task in scenario.tasks() {
                for req in &task.requirements {
                    if !req.is_forced() && req.candidates.iter().any(|c| c == &resource.name) {
                        return Err(ScheduleError::Unsupported {
                            backend: BACKEND,
                            capability: Capability::Cumulative,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn solve(&self, scenario: &mut Scenario, options: &SolveOptions) -> Result<bool> {
        if options.copy_scenario {
            let mut copy = scenario.clone();
            let mut inner = options.clone();
            inner.copy_scenario = false;
            return self.solve(&mut copy, &inner);
        }

        prepare(self, scenario)?;

        let horizon = to_i32(scenario.horizon, BACKEND)?;
        if scenario.tasks().iter().any(|t| t.length > scenario.horizon) {
            return Ok(false);
        }

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

        let mut solver = Solver::default();

        let starts: Vec<DomainId> = scenario
            .tasks()
            .iter()
            .map(|task| {
                let length = to_i32(task.length, BACKEND)?;
                Ok(solver.new_bounded_integer(0, horizon - length))
            })
            .collect::<Result<_>>()?;

        // One performed-literal per (task, candidate resource) pair. Pairs
        // inside a forced group (and pinned pairs) are the true literal.
        let mut performed: BTreeMap<(usize, usize), Literal> = BTreeMap::new();
        for (ti, task) in scenario.tasks().iter().enumerate() {
            let mut forced: Vec<usize> = task
                .pinned
                .iter()
                .map(|pin| resource_index[pin.as_str()])
                .collect();
            for req in &task.requirements {
                if req.is_forced() {
                    forced.extend(req.candidates.iter().map(|c| resource_index[c.as_str()]));
                }
            }
            for req in &task.requirements {
                for cand in &req.candidates {
                    let ri = resource_index[cand.as_str()];
                    if performed.contains_key(&(ti, ri)) {
                        continue;
                    }
                    let literal = if forced.contains(&ri) {
                        solver.get_true_literal()
                    } else {
                        solver.new_literal()
                    };
                    performed.insert((ti, ri), literal);
                }
            }
            for req in &task.requirements {
                if req.is_forced() {
                    continue;
                }
                let views: Vec<_> = req
                    .candidates
                    .iter()
                    .map(|cand| performed[&(ti, resource_index[cand.as_str()])].scaled(1))
                    .collect();
                let multiplicity = to_i32(req.multiplicity as i64, BACKEND)?;
                if solver
                    .add_constraint(constraints::equals(views, multiplicity))
                    .post()
                    .is_err()
                {
                    return Ok(false);
                }
            }
        }

        // Resource occupation: pairwise disjunctions or cumulative.
        let mut order: BTreeMap<(usize, usize), Literal> = BTreeMap::new();
        for (ri, resource) in scenario.resources().iter().enumerate() {
            let participants: Vec<(usize, Literal)> = scenario
                .tasks()
                .iter()
                .enumerate()
                .filter(|(_, task)| task.length > 0)
                .filter_map(|(ti, _)| performed.get(&(ti, ri)).map(|lit| (ti, *lit)))
                .collect();

            if resource.size == 1 {
                for (a, &(ti, lit_a)) in participants.iter().enumerate() {
                    for &(tj, lit_b) in participants.iter().skip(a + 1) {
                        let before_ab =
                            ensure_order_literal(&mut solver, &mut order, &starts, scenario, ti, tj)?;
                        let before_ba =
                            ensure_order_literal(&mut solver, &mut order, &starts, scenario, tj, ti)?;
                        if solver
                            .add_clause([
                                (!lit_a).get_true_predicate(),
                                (!lit_b).get_true_predicate(),
                                before_ab.get_true_predicate(),
                                before_ba.get_true_predicate(),
                            ])
                            .is_err()
                        {
                            return Ok(false);
                        }
                    }
                }
            } else if !participants.is_empty() {
                let mut cum_starts = Vec::with_capacity(participants.len());
                let mut durations = Vec::with_capacity(participants.len());
                for &(ti, _) in &participants {
                    cum_starts.push(starts[ti]);
                    durations.push(to_i32(scenario.tasks()[ti].length, BACKEND)?);
                }
                let demands = vec![1; cum_starts.len()];
                let capacity = to_i32(resource.size, BACKEND)?;
                if solver
                    .add_constraint(constraints::cumulative(
                        cum_starts, durations, demands, capacity,
                    ))
                    .post()
                    .is_err()
                {
                    return Ok(false);
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
                    let gap = to_i32(scenario.tasks()[li].length + offset, BACKEND)?;
                    let posted = match kind {
                        // start(left) + gap ≤ start(right)
                        PrecedenceKind::Lax => solver
                            .add_constraint(constraints::less_than_or_equals(
                                vec![starts[li].scaled(1), starts[ri].scaled(-1)],
                                -gap,
                            ))
                            .post(),
                        // start(right) − start(left) = gap
                        PrecedenceKind::Tight => solver
                            .add_constraint(constraints::equals(
                                vec![starts[ri].scaled(1), starts[li].scaled(-1)],
                                gap,
                            ))
                            .post(),
                    };
                    if posted.is_err() {
                        return Ok(false);
                    }
                }
                Constraint::Bound { task, bound, kind } => {
                    let ti = task_index[task.as_str()];
                    let length = scenario.tasks()[ti].length;
                    let posted = match kind {
                        BoundKind::EarliestStart => solver
                            .add_constraint(constraints::less_than_or_equals(
                                vec![starts[ti].scaled(-1)],
                                to_i32(-bound, BACKEND)?,
                            ))
                            .post(),
                        BoundKind::LatestEnd => solver
                            .add_constraint(constraints::less_than_or_equals(
                                vec![starts[ti].scaled(1)],
                                to_i32(bound - length, BACKEND)?,
                            ))
                            .post(),
                        BoundKind::ExactStart => solver
                            .add_constraint(constraints::equals(
                                vec![starts[ti].scaled(1)],
                                to_i32(*bound, BACKEND)?,
                            ))
                            .post(),
                        BoundKind::ExactEnd => solver
                            .add_constraint(constraints::equals(
                                vec![starts[ti].scaled(1)],
                                to_i32(bound - length, BACKEND)?,
                            ))
                            .post(),
                    };
                    if posted.is_err() {
                        return Ok(false);
                    }
                }
                Constraint::Capacity(cap) => {
                    let ri = resource_index[cap.resource.as_str()];
                    let mut views = Vec::new();
                    let mut negated = Vec::new();
                    for (ti, task) in scenario.tasks().iter().enumerate() {
                        if task.length == 0 {
                            continue;
                        }
                        let Some(weight) = task.attribute(&cap.attribute) else {
                            continue;
                        };
                        let Some(lit) = performed.get(&(ti, ri)) else {
                            continue;
                        };
                        let weight = to_i32(weight, BACKEND)?;
                        views.push(lit.scaled(weight));
                        negated.push(lit.scaled(-weight));
                    }
                    let bound = to_i32(cap.bound, BACKEND)?;
                    if views.is_empty() {
                        let holds = match cap.comparator {
                            Comparator::Le => 0 <= bound,
                            Comparator::Ge => 0 >= bound,
                            Comparator::Eq => bound == 0,
                        };
                        if !holds {
                            return Ok(false);
                        }
                        continue;
                    }
                    let posted = match cap.comparator {
                        Comparator::Le => solver
                            .add_constraint(constraints::less_than_or_equals(views, bound))
                            .post(),
                        Comparator::Ge => solver
                            .add_constraint(constraints::less_than_or_equals(negated, -bound))
                            .post(),
                        Comparator::Eq => solver
                            .add_constraint(constraints::equals(views, bound))
                            .post(),
                    };
                    if posted.is_err() {
                        return Ok(false);
                    }
                }
            }
        }

        // Objective: minimize Σ delay_cost·end through one variable.
        let mut objective = None;
        if scenario.tasks().iter().any(|t| t.delay_cost != 0) {
            let mut low = 0i64;
            let mut high = 0i64;
            let mut constant = 0i64;
            let mut views = Vec::new();
            for (ti, task) in scenario.tasks().iter().enumerate() {
                if task.delay_cost == 0 {
                    continue;
                }
                let earliest = task.delay_cost * task.length;
                let latest = task.delay_cost * scenario.horizon;
                low += earliest.min(latest);
                high += earliest.max(latest);
                constant += task.delay_cost * task.length;
                views.push(starts[ti].scaled(to_i32(task.delay_cost, BACKEND)?));
            }
            let variable =
                solver.new_bounded_integer(to_i32(low, BACKEND)?, to_i32(high, BACKEND)?);
            views.push(variable.scaled(-1));
            if solver
                .add_constraint(constraints::equals(views, to_i32(-constant, BACKEND)?))
                .post()
                .is_err()
            {
                return Ok(false);
            }
            objective = Some(variable);
        }

        if options.msg {
            info!(
                "cp: scenario '{}' compiled with {} tasks, {} performed pairs",
                scenario.name,
                scenario.tasks().len(),
                performed.len()
            );
        }

        let outcome = match options.time_limit {
            Some(limit) => run(
                &mut solver,
                objective,
                &mut TimeBudget::starting_now(limit),
            ),
            None => run(&mut solver, objective, &mut Indefinite),
        };
        let Some(solution) = outcome else {
            if options.msg {
                info!("cp: no solution collected for scenario '{}'", scenario.name);
            }
            return Ok(false);
        };

        // Read the full solution before mutating anything.
        let mut starts_out = Vec::with_capacity(scenario.tasks().len());
        let mut assigned = Vec::with_capacity(scenario.tasks().len());
        for (ti, task) in scenario.tasks().iter().enumerate() {
            starts_out.push(i64::from(solution.get_integer_value(starts[ti])));
            let resources: Vec<String> = task
                .candidate_resources()
                .into_iter()
                .filter(|cand| {
                    solution.get_literal_value(performed[&(ti, resource_index[*cand])])
                })
                .map(str::to_string)
                .collect();
            assigned.push(resources);
        }

        for ((task, start), resources) in scenario
            .tasks_mut()
            .iter_mut()
            .zip(starts_out)
            .zip(assigned)
        {
            task.start_value = Some(start);
            task.resources = Some(resources);
        }

        Ok(true)
    }
}

/// Gets or creates the literal implying `start(left) + length(left) ≤
/// start(right)`.
fn ensure_order_literal(
    solver: &mut Solver,
    order: &mut BTreeMap<(usize, usize), Literal>,
    starts: &[DomainId],
    scenario: &Scenario,
    left: usize,
    right: usize,
) -> Result<Literal> {
    if let Some(literal) = order.get(&(left, right)) {
        return Ok(*literal);
    }
    let literal = solver.new_literal();
    let length = to_i32(scenario.tasks()[left].length, BACKEND)?;
    // Root conflicts cannot arise from a half-reified constraint, but the
    // poster result is checked all the same.
    if solver
        .add_constraint(constraints::less_than_or_equals(
            vec![starts[left].scaled(1), starts[right].scaled(-1)],
            -length,
        ))
        .implied_by(literal)
        .is_err()
    {
        return Err(ScheduleError::Solver {
            backend: BACKEND,
            message: "failed to post an order literal".into(),
        });
    }
    order.insert((left, right), literal);
    Ok(literal)
}

fn run(
    solver: &mut Solver,
    objective: Option<DomainId>,
    termination: &mut impl TerminationCondition,
) -> Option<Solution> {
    let mut brancher = solver.default_brancher();
    match objective {
        Some(objective) => {
            let callback = |_: &Solver, _: SolutionReference| {};
            match solver.optimise(
                &mut brancher,
                termination,
                LinearSatUnsat::new(OptimisationDirection::Minimise, objective, callback),
            ) {
                OptimisationResult::Optimal(solution)
                | OptimisationResult::Satisfiable(solution) => Some(solution),
                OptimisationResult::Unsatisfiable | OptimisationResult::Unknown => None,
            }
        }
        None => match solver.satisfy(&mut brancher, termination) {
            SatisfactionResult::Satisfiable(solution) => Some(solution),
            SatisfactionResult::Unsatisfiable | SatisfactionResult::Unknown => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CapacityBound, Resource, ResourceRequirement, Task};

    fn solve(scenario: &mut Scenario) -> bool {
        CpBackend::new()
            .solve(scenario, &SolveOptions::new())
            .unwrap()
    }

    fn rendered(scenario: &Scenario) -> Vec<String> {
        scenario.solution().iter().map(|e| e.to_string()).collect()
    }

    fn two_task_scenario() -> Scenario {
        let mut s = Scenario::new("two_tasks", 10);
        s.add_resource(Resource::new("R1")).unwrap();
        s.add_task(
            Task::new("T1")
                .with_length(1)
                .with_delay_cost(2)
                .with_resource("R1"),
        )
        .unwrap();
        s.add_task(
            Task::new("T2")
                .with_length(2)
                .with_delay_cost(1)
                .with_resource("R1"),
        )
        .unwrap();
        s
    }

    #[test]
    fn test_unique_optimum() {
        let mut s = two_task_scenario();
        assert!(solve(&mut s));
        assert_eq!(rendered(&s), vec!["(T1, R1, 0, 1)", "(T2, R1, 1, 3)"]);
    }

    #[test]
    fn test_lax_precedence_flips_order() {
        let mut s = Scenario::new("prec", 10);
        s.add_resource(Resource::new("R1")).unwrap();
        s.add_task(
            Task::new("T1")
                .with_length(1)
                .with_delay_cost(2)
                .with_resource("R1"),
        )
        .unwrap();
        s.add_task(
            Task::new("T2")
                .with_length(1)
                .with_delay_cost(1)
                .with_resource("R1"),
        )
        .unwrap();
        s.add_constraint(Constraint::precedence_lax("T2", "T1", 0));
        assert!(solve(&mut s));
        assert_eq!(rendered(&s), vec!["(T2, R1, 0, 1)", "(T1, R1, 1, 2)"]);
    }

    #[test]
    fn test_tight_precedence_with_offset() {
        let mut s = Scenario::new("tight", 10);
        s.add_resource(Resource::new("R1")).unwrap();
        s.add_resource(Resource::new("R2")).unwrap();
        s.add_task(
            Task::new("A")
                .with_length(2)
                .with_delay_cost(1)
                .with_resource("R1"),
        )
        .unwrap();
        s.add_task(
            Task::new("B")
                .with_length(1)
                .with_delay_cost(1)
                .with_resource("R2"),
        )
        .unwrap();
        s.add_constraint(Constraint::precedence_tight("A", "B", 3));
        assert!(solve(&mut s));

        let a = s.task("A").unwrap();
        let b = s.task("B").unwrap();
        assert_eq!(b.start_value.unwrap(), a.end_value().unwrap() + 3);
    }

    #[test]
    fn test_earliest_start_bound() {
        let mut s = two_task_scenario();
        s.add_constraint(Constraint::earliest_start("T1", 3));
        assert!(solve(&mut s));
        assert!(s.task("T1").unwrap().start_value.unwrap() >= 3);
        assert_eq!(s.task("T2").unwrap().start_value, Some(0));
    }

    #[test]
    fn test_no_overlap_on_unit_resource() {
        let mut s = Scenario::new("disjoint", 10);
        s.add_resource(Resource::new("R1")).unwrap();
        s.add_task(Task::new("A").with_resource("R1")).unwrap();
        s.add_task(Task::new("B").with_resource("R1")).unwrap();
        assert!(solve(&mut s));

        let a = s.task("A").unwrap().start_value.unwrap();
        let b = s.task("B").unwrap().start_value.unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_zero_length_task_resolves_resources() {
        let mut s = Scenario::new("zero", 10);
        s.add_resource(Resource::new("R1")).unwrap();
        s.add_task(
            Task::new("T1")
                .with_length(0)
                .with_delay_cost(2)
                .with_resource("R1"),
        )
        .unwrap();
        s.add_task(
            Task::new("T2")
                .with_length(1)
                .with_delay_cost(1)
                .with_resource("R1"),
        )
        .unwrap();
        assert!(solve(&mut s));
        assert_eq!(rendered(&s), vec!["(T1, R1, 0, 0)", "(T2, R1, 0, 1)"]);
    }

    #[test]
    fn test_alternative_resources() {
        let mut s = Scenario::new("alt", 10);
        s.add_resource(Resource::new("R1")).unwrap();
        s.add_resource(Resource::new("R2")).unwrap();
        for name in ["T1", "T2"] {
            s.add_task(
                Task::new(name)
                    .with_delay_cost(1)
                    .with_requirement(ResourceRequirement::one_of(vec![
                        "R1".into(),
                        "R2".into(),
                    ])),
            )
            .unwrap();
        }
        assert!(solve(&mut s));

        let t1 = s.task("T1").unwrap();
        let t2 = s.task("T2").unwrap();
        assert_eq!(t1.start_value, Some(0));
        assert_eq!(t2.start_value, Some(0));
        assert_eq!(t1.resources.as_ref().unwrap().len(), 1);
        assert_ne!(t1.resources, t2.resources);
    }

    #[test]
    fn test_multiplicity_resolves_two_resources() {
        let mut s = Scenario::new("pick2", 10);
        s.add_resource(Resource::new("R1")).unwrap();
        s.add_resource(Resource::new("R2")).unwrap();
        s.add_resource(Resource::new("R3")).unwrap();
        s.add_task(
            Task::new("T")
                .with_delay_cost(1)
                .with_requirement(ResourceRequirement::choose(
                    vec!["R1".into(), "R2".into(), "R3".into()],
                    2,
                )),
        )
        .unwrap();
        assert!(solve(&mut s));
        assert_eq!(s.task("T").unwrap().resources.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_whole_horizon_capacity_forces_one_resource() {
        // Occupying R2 at all is forbidden, so both tasks queue on R1.
        let mut s = Scenario::new("cap", 10);
        s.add_resource(Resource::new("R1")).unwrap();
        s.add_resource(Resource::new("R2")).unwrap();
        for (name, cost) in [("T1", 2), ("T2", 1)] {
            s.add_task(
                Task::new(name)
                    .with_delay_cost(cost)
                    .with_requirement(ResourceRequirement::one_of(vec![
                        "R1".into(),
                        "R2".into(),
                    ])),
            )
            .unwrap();
        }
        s.add_constraint(CapacityBound::sum("R2", "length").at_most(0));
        assert!(solve(&mut s));
        assert_eq!(rendered(&s), vec!["(T1, R1, 0, 1)", "(T2, R1, 1, 2)"]);
    }

    #[test]
    fn test_cumulative_resource() {
        let mut s = Scenario::new("cumul", 10);
        s.add_resource(Resource::new("R1").with_size(2)).unwrap();
        for name in ["A", "B"] {
            s.add_task(
                Task::new(name)
                    .with_length(2)
                    .with_delay_cost(1)
                    .with_resource("R1"),
            )
            .unwrap();
        }
        assert!(solve(&mut s));
        assert_eq!(s.task("A").unwrap().start_value, Some(0));
        assert_eq!(s.task("B").unwrap().start_value, Some(0));
    }

    #[test]
    fn test_cumulative_with_choice_is_unsupported() {
        let mut s = Scenario::new("cumul_alt", 10);
        s.add_resource(Resource::new("R1").with_size(2)).unwrap();
        s.add_resource(Resource::new("R2")).unwrap();
        s.add_task(
            Task::new("T").with_requirement(ResourceRequirement::one_of(vec![
                "R1".into(),
                "R2".into(),
            ])),
        )
        .unwrap();

        let err = CpBackend::new()
            .solve(&mut s, &SolveOptions::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::Unsupported {
                backend: "cp",
                capability: Capability::Cumulative,
            }
        ));
    }

    #[test]
    fn test_sliced_capacity_is_unsupported() {
        let mut s = two_task_scenario();
        s.add_constraint(CapacityBound::sum("R1", "length").window(0, 3).at_most(1));
        let err = CpBackend::new()
            .solve(&mut s, &SolveOptions::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::Unsupported {
                capability: Capability::CapacitySliced,
                ..
            }
        ));
    }

    #[test]
    fn test_optional_task_is_unsupported() {
        let mut s = Scenario::new("optional", 10);
        s.add_resource(Resource::new("R1")).unwrap();
        s.add_task(
            Task::new("T")
                .with_schedule_cost(-1)
                .with_resource("R1"),
        )
        .unwrap();
        let err = CpBackend::new()
            .solve(&mut s, &SolveOptions::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::Unsupported {
                capability: Capability::OptionalTasks,
                ..
            }
        ));
    }

    #[test]
    fn test_infeasible_leaves_scenario_untouched() {
        let mut s = two_task_scenario();
        s.add_constraint(Constraint::exact_start("T1", 2));
        s.add_constraint(Constraint::exact_start("T1", 5));
        assert!(!solve(&mut s));
        assert!(s.task("T1").unwrap().start_value.is_none());
        assert!(s.task("T2").unwrap().start_value.is_none());
    }

    #[test]
    fn test_copy_scenario_isolation() {
        let mut s = two_task_scenario();
        let ok = CpBackend::new()
            .solve(&mut s, &SolveOptions::new().with_copy_scenario())
            .unwrap();
        assert!(ok);
        assert!(s.task("T1").unwrap().start_value.is_none());
    }

    #[test]
    fn test_readback_within_horizon() {
        let mut s = two_task_scenario();
        assert!(solve(&mut s));
        for task in s.tasks() {
            let start = task.start_value.unwrap();
            assert!(start >= 0);
            assert!(start + task.length <= s.horizon);
        }
    }
}
