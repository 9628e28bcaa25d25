//! Integration tests for the problem file format
//!
//! Loading, saving and re-reading problem files through the public API.

use cosynth::model::{CostMatrix, Resource, ResourceCategory, tokenize_row};
use cosynth::problem::{GenerationConfig, LoadError, Problem, seeded_rng};
use std::fs;
use tempfile::TempDir;

const PROBLEM: &str = "\
@tasks 4
T0 2 1(3) 2(5)
T1 1 3(2)
T2 1 3(1)
T3 0
@proc 3
4 1 0
2 1 1
1 2 0
@times
10 [4 6] 12
[3 3] 5 9
7 7 [1 2]
2 2 2
@cost
1 [2 2] 3
[1 1] 4 1
5 5 [3 3]
1 1 1
";

#[test]
fn test_load_save_load_is_stable() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("source.txt");
    let copy = temp_dir.path().join("copy.txt");
    fs::write(&source, PROBLEM).unwrap();

    let problem = Problem::load(&source).expect("Should load problem file");
    problem.save(&copy).expect("Should save problem file");
    let reloaded = Problem::load(&copy).expect("Should reload saved file");

    assert_eq!(problem, reloaded);
    assert_eq!(
        fs::read_to_string(&copy).unwrap(),
        reloaded.to_string(),
        "Saving twice should produce identical text"
    );
}

#[test]
fn test_loaded_structure() {
    let problem: Problem = PROBLEM.parse().unwrap();

    assert_eq!(problem.task_count(), 4);
    assert_eq!(problem.graph().edge_count(), 4);
    assert_eq!(problem.graph().out_neighbors(0), vec![1, 2]);
    assert_eq!(problem.graph().edge_weight(0, 2), 5);

    let names: Vec<String> = problem.resources().iter().map(ToString::to_string).collect();
    assert_eq!(names, vec!["HC0", "HC1", "PE0"]);

    let hc1 = Resource::new(2, ResourceCategory::Core, 1);
    assert_eq!(problem.costs().times(0, &hc1), &[4, 6]);
    assert_eq!(problem.costs().costs(0, &hc1), &[2, 2]);

    for task in 0..problem.task_count() {
        for entry in problem.costs().row(task) {
            assert_eq!(entry.times().len(), entry.costs().len());
        }
    }

    let paths = problem.graph().dfs(0, 3);
    assert_eq!(paths, vec![vec![0, 1, 3], vec![0, 2, 3]]);
    assert_eq!(problem.graph().bfs(), vec![0, 1, 2, 3]);
}

#[test]
fn test_matrix_show_round_trip() {
    let problem: Problem = PROBLEM.parse().unwrap();
    let shown = problem.costs().to_string();

    let mut lines = shown.lines();
    assert_eq!(lines.next(), Some("@times"));
    let times: Vec<Vec<String>> = lines
        .by_ref()
        .take_while(|line| *line != "@cost")
        .map(|line| tokenize_row(line).unwrap())
        .collect();
    let costs: Vec<Vec<String>> = lines.map(|line| tokenize_row(line).unwrap()).collect();

    let mut matrix = CostMatrix::new();
    matrix.load_resources(problem.resources());
    matrix.set_times_matrix(&times).unwrap();
    matrix.set_costs_matrix(&costs).unwrap();

    assert_eq!(&matrix, problem.costs());
}

#[test]
fn test_generated_problem_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("generated.txt");

    let config = GenerationConfig {
        task_count: 30,
        ..GenerationConfig::default()
    };
    let mut rng = seeded_rng(Some(2024));
    let mut problem = Problem::generate(&config, &mut rng).unwrap();
    problem.add_random_compound_task(2, 5, &mut rng).unwrap();
    problem.save(&path).unwrap();

    let loaded = Problem::load(&path).unwrap();
    assert_eq!(loaded.task_count(), 31);
    assert_eq!(loaded, problem);
}

#[test]
fn test_failed_load_reports_line() {
    let broken = PROBLEM.replace("T1 1 3(2)", "T1 1 3[2]");
    let error = Problem::parse(&broken).unwrap_err();

    match &error {
        LoadError::Parse { line, text, .. } => {
            assert_eq!(*line, 3);
            assert_eq!(text, "T1 1 3[2]");
        }
        other => panic!("Expected parse error, got {:?}", other),
    }
    assert!(error.to_string().contains("line 3"));
}

#[test]
fn test_mismatched_cost_section_is_rejected() {
    let broken = PROBLEM.replace("1 [2 2] 3", "1 [2 2 2] 3");
    match Problem::parse(&broken) {
        Err(LoadError::Parse { line, text, .. }) => {
            assert_eq!(line, 16);
            assert_eq!(text, "1 [2 2 2] 3");
        }
        other => panic!("Expected parse error, got {:?}", other),
    }

    let truncated = PROBLEM.trim_end().rsplit_once('\n').unwrap().0.to_string();
    match Problem::parse(&truncated) {
        Err(LoadError::Parse { line, text, .. }) => {
            assert_eq!(line, 15);
            assert_eq!(text, "@cost");
        }
        other => panic!("Expected parse error, got {:?}", other),
    }
}
