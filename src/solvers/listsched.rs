//! Incremental list scheduling.
//!
//! Scales to scenarios whose full constraint set is too costly to solve in
//! one shot by exploiting a partial precedence order: tasks are added in
//! batches to a working scenario, each batch is solved with a supplied
//! backend-shaped callable, and solved start times are frozen with exact
//! start bounds so later batches cannot move them. There is no cross-batch
//! backtracking: one infeasible batch fails the whole run.
//!
//! The task order is topological over the lax-precedence graph, ties
//! broken by definition order, unless an explicit order is supplied.

use std::collections::BTreeSet;

use log::{info, warn};
use petgraph::graph::DiGraph;
use petgraph::Direction;

use crate::error::{Result, ScheduleError};
use crate::models::{Constraint, PrecedenceKind, Scenario};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Batched list scheduler over any backend-shaped solve callable.
#[derive(Debug, Clone)]
pub struct IncrementalScheduler {
    batch_size: usize,
    task_order: Option<Vec<String>>,
    msg: bool,
}

impl Default for IncrementalScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl IncrementalScheduler {
    /// A scheduler placing one task per batch.
    pub fn new() -> Self {
        Self {
            batch_size: 1,
            task_order: None,
            msg: false,
        }
    }

    /// Sets how many tasks each batch integrates.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Supplies the task order explicitly instead of sorting by
    /// precedence. The order must list every task exactly once.
    pub fn with_task_order(mut self, order: Vec<String>) -> Self {
        self.task_order = Some(order);
        self
    }

    /// Enables diagnostic logging.
    pub fn with_msg(mut self) -> Self {
        self.msg = true;
        self
    }

    /// Solves the scenario batch by batch.
    ///
    /// `solve_fn` is any backend-shaped callable: it receives each working
    /// scenario and reports success as `Ok(true)`. The caller's scenario is
    /// only written once every batch has been placed.
    pub fn solve<F>(&self, scenario: &mut Scenario, solve_fn: F) -> Result<bool>
    where
        F: FnMut(&mut Scenario) -> Result<bool>,
    {
        self.solve_observed(scenario, solve_fn, |_| {})
    }

    /// Like [`solve`](Self::solve), additionally reporting every solved
    /// working scenario to `observer` (for plotting or progress output).
    pub fn solve_observed<F, O>(
        &self,
        scenario: &mut Scenario,
        mut solve_fn: F,
        mut observer: O,
    ) -> Result<bool>
    where
        F: FnMut(&mut Scenario) -> Result<bool>,
        O: FnMut(&Scenario),
    {
        let order = match &self.task_order {
            Some(order) => {
                self.check_explicit_order(scenario, order)?;
                order.clone()
            }
            None => match precedence_order(scenario) {
                Some(order) => order,
                None => {
                    warn!(
                        "listsched: scenario '{}' has cyclic lax precedences",
                        scenario.name
                    );
                    return Ok(false);
                }
            },
        };

        let mut placed: Vec<crate::models::Task> = Vec::new();
        let mut freezes: Vec<Constraint> = Vec::new();

        for batch in order.chunks(self.batch_size) {
            if self.msg {
                info!("listsched: integrating batch {}", batch.join(","));
            }

            let mut working = Scenario::new(scenario.name.clone(), scenario.horizon);
            for resource in scenario.resources() {
                working.add_resource(resource.clone())?;
            }
            for task in &placed {
                working.add_task(task.clone())?;
            }
            for name in batch {
                let Some(task) = scenario.task(name) else {
                    continue;
                };
                let mut task = task.clone();
                task.start_value = None;
                task.resources = None;
                working.add_task(task)?;
            }

            let present: BTreeSet<&str> =
                working.tasks().iter().map(|t| t.name.as_str()).collect();
            let applicable: Vec<Constraint> = scenario
                .constraints()
                .iter()
                .filter(|c| c.task_refs().iter().all(|name| present.contains(name)))
                .cloned()
                .collect();
            for constraint in applicable {
                working.add_constraint(constraint);
            }
            for freeze in &freezes {
                working.add_constraint(freeze.clone());
            }

            if !solve_fn(&mut working)? {
                if self.msg {
                    info!(
                        "listsched: batch {} is infeasible, giving up",
                        batch.join(",")
                    );
                }
                return Ok(false);
            }
            observer(&working);

            for task in working.tasks() {
                if batch.iter().any(|name| *name == task.name) {
                    if let Some(start) = task.start_value {
                        freezes.push(Constraint::exact_start(task.name.clone(), start));
                    }
                }
            }
            placed = working.tasks().to_vec();
        }

        for solved in placed {
            if let Some(task) = scenario.task_mut(&solved.name) {
                task.start_value = solved.start_value;
                task.resources = solved.resources;
            }
        }
        Ok(true)
    }

    fn check_explicit_order(&self, scenario: &Scenario, order: &[String]) -> Result<()> {
        let mut errors = Vec::new();
        let mut seen = BTreeSet::new();
        for name in order {
            if scenario.task(name).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTask,
                    format!("task order names unknown task '{name}'"),
                ));
            }
            if !seen.insert(name.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTask,
                    format!("task order repeats task '{name}'"),
                ));
            }
        }
        for task in scenario.tasks() {
            if !seen.contains(task.name.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTask,
                    format!("task order misses task '{}'", task.name),
                ));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ScheduleError::Invalid { errors })
        }
    }
}

/// Topological order over the lax-precedence graph, ties broken by
/// definition order. `None` when the precedences are cyclic.
fn precedence_order(scenario: &Scenario) -> Option<Vec<String>> {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<_> = (0..scenario.tasks().len())
        .map(|i| graph.add_node(i))
        .collect();

    let index_of = |name: &str| scenario.tasks().iter().position(|t| t.name == name);
    for constraint in scenario.active_constraints() {
        if let Constraint::Precedence {
            left,
            right,
            kind: PrecedenceKind::Lax,
            ..
        } = constraint
        {
            if let (Some(li), Some(ri)) = (index_of(left), index_of(right)) {
                graph.add_edge(nodes[li], nodes[ri], ());
            }
        }
    }

    let mut indegree: Vec<usize> = nodes
        .iter()
        .map(|&n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();
    let mut ready: BTreeSet<usize> = indegree
        .iter()
        .enumerate()
        .filter(|(_, &d)| d == 0)
        .map(|(i, _)| i)
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(&next) = ready.iter().next() {
        ready.remove(&next);
        order.push(scenario.tasks()[next].name.clone());
        for succ in graph.neighbors_directed(nodes[next], Direction::Outgoing) {
            let si = graph[succ];
            indegree[si] -= 1;
            if indegree[si] == 0 {
                ready.insert(si);
            }
        }
    }

    (order.len() == nodes.len()).then_some(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Resource, Task};
    use crate::solvers::{Backend, CpBackend, MipBackend, SolveOptions};

    fn chain_scenario(n: usize) -> Scenario {
        let mut s = Scenario::new("chain", 20);
        s.add_resource(Resource::new("R1")).unwrap();
        let names = s
            .add_tasks("T", n, Task::new("t").with_delay_cost(1).with_resource("R1"))
            .unwrap();
        for pair in names.windows(2) {
            s.add_constraint(Constraint::precedence_lax(
                pair[0].clone(),
                pair[1].clone(),
                0,
            ));
        }
        s
    }

    fn mip_solve(s: &mut Scenario) -> Result<bool> {
        MipBackend::new().solve(s, &SolveOptions::new())
    }

    #[test]
    fn test_precedence_order_ties_by_definition() {
        let mut s = Scenario::new("order", 10);
        s.add_resource(Resource::new("R1")).unwrap();
        for name in ["C", "A", "B"] {
            s.add_task(Task::new(name).with_resource("R1")).unwrap();
        }
        s.add_constraint(Constraint::precedence_lax("B", "C", 0));

        let order = precedence_order(&s).unwrap();
        assert_eq!(order, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_cycle_fails_the_solve() {
        let mut s = Scenario::new("cycle", 10);
        s.add_resource(Resource::new("R1")).unwrap();
        s.add_task(Task::new("A").with_resource("R1")).unwrap();
        s.add_task(Task::new("B").with_resource("R1")).unwrap();
        s.add_constraint(Constraint::precedence_lax("A", "B", 0));
        s.add_constraint(Constraint::precedence_lax("B", "A", 0));

        let ok = IncrementalScheduler::new()
            .solve(&mut s, mip_solve)
            .unwrap();
        assert!(!ok);
        assert!(s.task("A").unwrap().start_value.is_none());
    }

    #[test]
    fn test_matches_single_shot_solve() {
        let mut incremental = chain_scenario(5);
        let ok = IncrementalScheduler::new()
            .solve(&mut incremental, mip_solve)
            .unwrap();
        assert!(ok);

        let mut single_shot = chain_scenario(5);
        assert!(mip_solve(&mut single_shot).unwrap());

        assert_eq!(incremental.solution(), single_shot.solution());
    }

    #[test]
    fn test_batched_solve_places_everything() {
        let mut s = chain_scenario(6);
        let ok = IncrementalScheduler::new()
            .with_batch_size(2)
            .solve(&mut s, mip_solve)
            .unwrap();
        assert!(ok);

        let mut single_shot = chain_scenario(6);
        assert!(mip_solve(&mut single_shot).unwrap());
        assert_eq!(s.solution(), single_shot.solution());
    }

    #[test]
    fn test_cp_backend_under_list_scheduling() {
        let mut s = chain_scenario(3);
        let ok = IncrementalScheduler::new()
            .solve(&mut s, |w| CpBackend::new().solve(w, &SolveOptions::new()))
            .unwrap();
        assert!(ok);

        let starts: Vec<_> = s.tasks().iter().map(|t| t.start_value.unwrap()).collect();
        assert_eq!(starts, vec![0, 1, 2]);
    }

    #[test]
    fn test_explicit_order() {
        let mut s = Scenario::new("explicit", 10);
        s.add_resource(Resource::new("R1")).unwrap();
        s.add_task(Task::new("A").with_delay_cost(1).with_resource("R1"))
            .unwrap();
        s.add_task(Task::new("B").with_delay_cost(1).with_resource("R1"))
            .unwrap();

        let ok = IncrementalScheduler::new()
            .with_task_order(vec!["B".into(), "A".into()])
            .solve(&mut s, mip_solve)
            .unwrap();
        assert!(ok);

        // B was integrated (and therefore frozen) first.
        assert_eq!(s.task("B").unwrap().start_value, Some(0));
        assert_eq!(s.task("A").unwrap().start_value, Some(1));
    }

    #[test]
    fn test_explicit_order_must_cover_all_tasks() {
        let mut s = chain_scenario(3);
        let err = IncrementalScheduler::new()
            .with_task_order(vec!["T0".into()])
            .solve(&mut s, mip_solve)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::Invalid { .. }));
    }

    #[test]
    fn test_infeasible_batch_fails_without_mutation() {
        let mut s = chain_scenario(4);
        // The chain needs 4 periods; capping the last task at 2 is hopeless.
        s.add_constraint(Constraint::latest_end("T3", 2));

        let ok = IncrementalScheduler::new()
            .solve(&mut s, mip_solve)
            .unwrap();
        assert!(!ok);
        for task in s.tasks() {
            assert!(task.start_value.is_none());
        }
    }

    #[test]
    fn test_observer_sees_every_batch() {
        let mut s = chain_scenario(4);
        let mut seen = Vec::new();
        let ok = IncrementalScheduler::new()
            .with_batch_size(2)
            .solve_observed(&mut s, mip_solve, |w| seen.push(w.tasks().len()))
            .unwrap();
        assert!(ok);
        assert_eq!(seen, vec![2, 4]);
    }
}
