//! Integration tests for assignment strategies on loaded and generated problems

use cosynth::problem::{GenerationConfig, Problem, seeded_rng};
use cosynth::{Resource, Scheduler, Strategy, TaskId};
use std::collections::BTreeMap;

fn generated(task_count: usize, seed: u64) -> Problem {
    let config = GenerationConfig {
        task_count,
        core_count: 2,
        unit_count: 2,
        ..GenerationConfig::default()
    };
    Problem::generate(&config, &mut seeded_rng(Some(seed))).unwrap()
}

/// How many assignments each task appears in
fn memberships(scheduler: &Scheduler) -> BTreeMap<TaskId, usize> {
    let mut counts = BTreeMap::new();
    for assignment in scheduler.assignments() {
        for &task in assignment.tasks() {
            *counts.entry(task).or_insert(0) += 1;
        }
    }
    counts
}

#[test]
fn test_fastest_scenario_from_file() {
    let problem: Problem = "@tasks 2\n@proc 2\n@times\n5 9\n3 7\n@cost\n1 1\n1 1\n"
        .parse()
        .unwrap();
    let mut scheduler = Scheduler::new();

    let summary = scheduler.apply(Strategy::Fastest, &problem);

    assert_eq!(summary.allocated, 2);
    assert_eq!(scheduler.assignment_count(), 1);
    let assignment = scheduler.assignments().next().unwrap();
    assert_eq!(assignment.resource(), &Resource::worker(0, 0));
    assert!(assignment.contains(0) && assignment.contains(1));
}

#[test]
fn test_cheapest_scenario_from_file() {
    let problem: Problem = "@tasks 2\n@proc 2\n@times\n5 9\n3 7\n@cost\n10 2\n10 2\n"
        .parse()
        .unwrap();
    let mut scheduler = Scheduler::new();

    let summary = scheduler.apply(Strategy::Cheapest, &problem);

    assert_eq!(summary.estimated_cost, 4);
    assert_eq!(scheduler.assignment_count(), 1);
    assert_eq!(
        scheduler.assignments().next().unwrap().resource(),
        &Resource::worker(0, 1)
    );
}

#[test]
fn test_whole_task_strategies_cover_every_task_once() {
    for seed in [1, 2, 3] {
        let problem = generated(20, seed);
        let mut scheduler = Scheduler::new();

        scheduler.apply(Strategy::Fastest, &problem);
        assert!(scheduler.assignment_count() <= problem.resources().len());
        let counts = memberships(&scheduler);
        assert_eq!(counts.len(), 20);
        assert!(counts.values().all(|&count| count == 1));

        scheduler.apply(Strategy::Cheapest, &problem);
        assert_eq!(scheduler.assignment_count(), 1);
        let counts = memberships(&scheduler);
        assert_eq!(counts.len(), 20);
        assert!(counts.values().all(|&count| count == 1));
    }
}

#[test]
fn test_distribution_places_every_subtask() {
    let problem = generated(15, 8);
    let first = problem.resources()[0];
    let expected: usize = (0..problem.task_count())
        .map(|task| problem.costs().times(task, &first).len().max(1))
        .sum();

    for strategy in [Strategy::DistributeTime, Strategy::DistributeCost] {
        let mut scheduler = Scheduler::new();
        let summary = scheduler.apply(strategy, &problem);

        assert_eq!(summary.allocated, 15);
        assert_eq!(scheduler.assignment_count(), expected);
        assert!(scheduler.assignments().all(|a| a.len() == 1));
        for task in 0..problem.task_count() {
            assert!(scheduler.assignment_for(task).is_some());
        }
    }
}

#[test]
fn test_assignments_are_sorted() {
    let problem = generated(25, 4);
    let mut scheduler = Scheduler::new();
    scheduler.apply(Strategy::DistributeTime, &problem);

    let keys: Vec<_> = scheduler.assignments().map(|a| a.key()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}
