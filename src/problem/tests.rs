#[cfg(test)]
mod tests {
    use crate::model::*;
    use crate::problem::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
// two cores, three tasks
@tasks 3
T0 2 1(4) 2(0)
T1 0
T2 0
@proc 2
3 1 0
2 2 0
@times
5 [2 7]
4 6
1 1
@cost
10 [1 1]
3 3
2 2
@comm
anything goes here
";

    fn small_config(seed: u64) -> GenerationConfig {
        GenerationConfig {
            task_count: 8,
            core_count: 2,
            unit_count: 1,
            seed: Some(seed),
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn test_generate_is_deterministic_for_a_seed() {
        let config = small_config(7);
        let a = Problem::generate(&config, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = Problem::generate(&config, &mut StdRng::seed_from_u64(7)).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.task_count(), 8);
        assert_eq!(a.resources().len(), 3);
        assert_eq!(a.costs().task_count(), 8);
    }

    #[test]
    fn test_generated_graph_reaches_every_task() {
        let mut rng = StdRng::seed_from_u64(42);
        for n in [2, 5, 13, 40] {
            let graph = random_task_graph(n, true, &mut rng);
            let mut order = graph.bfs();
            order.sort_unstable();
            assert_eq!(order, (0..n).collect::<Vec<_>>());
            assert!(graph.check_edge(0, 1));
        }
    }

    #[test]
    fn test_unweighted_graph_uses_unit_weights() {
        let graph = random_task_graph(12, false, &mut StdRng::seed_from_u64(3));
        for vertex in 0..graph.vertex_count() {
            assert!(graph.edges_from(vertex).iter().all(|edge| edge.weight == 1));
        }
    }

    #[test]
    fn test_degenerate_graph_sizes() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(random_task_graph(0, true, &mut rng).vertex_count(), 0);
        let single = random_task_graph(1, true, &mut rng);
        assert_eq!(single.vertex_count(), 1);
        assert_eq!(single.edge_count(), 0);
    }

    #[test]
    fn test_random_resources_layout() {
        let resources = random_resources(2, 3, &mut StdRng::seed_from_u64(1)).unwrap();
        let names: Vec<String> = resources.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["HC0", "HC1", "PE0", "PE1", "PE2"]);
        assert!(
            resources
                .iter()
                .all(|r| (1..=MAX_BASE_COST).contains(&r.base_cost()))
        );
    }

    #[test]
    fn test_random_resources_rejects_empty_category() {
        let result = random_resources(0, 2, &mut StdRng::seed_from_u64(1));
        assert!(matches!(
            result,
            Err(GenerationError::InvalidResourceCounts { cores: 0, units: 2 })
        ));
    }

    #[test]
    fn test_parse_sample() {
        let problem = Problem::parse(SAMPLE).unwrap();

        assert_eq!(problem.task_count(), 3);
        assert_eq!(problem.graph().edge_weight(0, 1), 4);
        // weight 0 is normalized to 1
        assert_eq!(problem.graph().edge_weight(0, 2), 1);

        let core = Resource::new(3, ResourceCategory::Core, 0);
        let unit = Resource::new(2, ResourceCategory::Processing, 0);
        assert_eq!(problem.resources(), &[core, unit]);

        assert_eq!(problem.costs().times(0, &unit), &[2, 7]);
        assert_eq!(problem.costs().costs(0, &unit), &[1, 1]);
        assert_eq!(problem.costs().times(1, &core), &[4]);
        assert_eq!(problem.costs().costs(2, &unit), &[2]);
    }

    #[test]
    fn test_parse_count_only_variant_with_workers() {
        let text = "@tasks 2\n@proc 2\n@times\n5 9\n3 7\n@cost\n10 2\n10 2\n";
        let problem = Problem::parse(text).unwrap();

        assert_eq!(problem.task_count(), 2);
        assert_eq!(problem.graph().edge_count(), 0);
        assert_eq!(
            problem.resources(),
            &[Resource::worker(0, 0), Resource::worker(0, 1)]
        );
        assert_eq!(problem.costs().times(1, &Resource::worker(0, 1)), &[7]);
    }

    #[test]
    fn test_parse_worker_lines() {
        let text = "@tasks 1\n@proc 2\n4 7\n1 9\n@times\n1 2\n@cost\n3 4\n";
        let problem = Problem::parse(text).unwrap();
        let ids: Vec<u32> = problem.resources().iter().map(Resource::id).collect();
        assert_eq!(ids, vec![7, 9]);
        assert!(problem.resources().iter().all(|r| r.category().is_none()));
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let text = "@tasks 2\nT0 2 1(3)\n";
        match Problem::parse(text) {
            Err(LoadError::Parse { line, text, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(text, "T0 2 1(3)");
            }
            other => panic!("expected parse error, got {:?}", other),
        }

        let text = "5 9\n@tasks 1\n";
        assert!(matches!(
            Problem::parse(text),
            Err(LoadError::Parse { line: 1, .. })
        ));

        let text = "@tasks\n";
        assert!(matches!(
            Problem::parse(text),
            Err(LoadError::Parse { line: 1, .. })
        ));

        let text = "@tasks 1\n@proc 1\n@times\n[1 x]\n";
        assert!(matches!(
            Problem::parse(text),
            Err(LoadError::Parse { line: 4, .. })
        ));
    }

    #[test]
    fn test_parse_dimension_errors() {
        fn error_line(text: &str) -> (usize, String) {
            match Problem::parse(text) {
                Err(LoadError::Parse { line, text, .. }) => (line, text),
                other => panic!("expected a line-numbered error, got {:?}", other),
            }
        }

        // cost row count differs from times
        let text = "@tasks 2\n@proc 1\n@times\n1\n2\n@cost\n1\n";
        assert_eq!(error_line(text), (6, "@cost".to_string()));

        // @proc count does not match the listed resources
        let text = "@tasks 1\n@proc 2\n1 1 0\n@times\n1 1\n@cost\n1 1\n";
        assert_eq!(error_line(text), (2, "@proc 2".to_string()));

        // times rows do not match the task count
        let text = "@tasks 2\n@proc 1\n@times\n1\n@cost\n1\n";
        assert_eq!(error_line(text), (3, "@times".to_string()));

        // column count
        let text = "@tasks 1\n@proc 2\n@times\n1\n@cost\n1\n";
        assert_eq!(error_line(text), (4, "1".to_string()));

        // cost token length differs from times token length
        let text = "@tasks 1\n@proc 1\n@times\n[1 2]\n@cost\n3\n";
        assert_eq!(error_line(text), (6, "3".to_string()));

        // no header to point at
        let text = "@tasks 1\n@times\n1\n@cost\n1\n";
        assert!(matches!(
            Problem::parse(text),
            Err(LoadError::Dimension { .. })
        ));
    }

    #[test]
    fn test_wide_times_row_reports_its_line() {
        let text = "@tasks 2\n@proc 2\n1 0\n1 1\n@times\n1 2\n3 4 5\n@cost\n1 1\n1 1\n";
        let error = Problem::parse(text).unwrap_err();

        match &error {
            LoadError::Parse { line, text, reason } => {
                assert_eq!(*line, 7);
                assert_eq!(text, "3 4 5");
                assert!(reason.contains("3 columns"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
        assert!(error.to_string().contains("line 7"));
    }

    #[test]
    fn test_parse_duplicate_resource() {
        let text = "@tasks 1\n@proc 2\n1 1 0\n2 1 0\n";
        match Problem::parse(text) {
            Err(LoadError::DuplicateResource { line, resource }) => {
                assert_eq!(line, 4);
                assert_eq!(resource, "HC0");
            }
            other => panic!("expected duplicate resource, got {:?}", other),
        }
    }

    #[test]
    fn test_display_round_trip() {
        let problem = Problem::parse(SAMPLE).unwrap();
        let text = problem.to_string();

        assert!(text.starts_with("@tasks 3\nT0 2 1(4) 2(1)\nT1 0\n"));
        assert!(text.contains("@proc 2\n3 1 0\n2 2 0\n"));

        let reparsed: Problem = text.parse().unwrap();
        assert_eq!(reparsed, problem);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("problem.txt");

        let config = small_config(11);
        let problem = Problem::generate(&config, &mut StdRng::seed_from_u64(11)).unwrap();
        problem.save(&path).unwrap();

        let loaded = Problem::load(&path).unwrap();
        assert_eq!(loaded, problem);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = Problem::load(dir.path().join("absent.txt"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_add_random_compound_task() {
        let mut problem = Problem::parse(SAMPLE).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        let task = problem
            .add_random_compound_task(2, 5, &mut rng)
            .unwrap()
            .unwrap();

        assert_eq!(task, 3);
        assert_eq!(problem.task_count(), 4);
        assert_eq!(problem.costs().task_count(), 4);
        assert!(problem.graph().edges_from(task).is_empty());

        let first = problem.costs().row(task)[0].len();
        assert!((2..=5).contains(&first));
        for entry in problem.costs().row(task) {
            assert_eq!(entry.len(), first);
            assert_eq!(entry.times().len(), entry.costs().len());
        }
    }

    #[test]
    fn test_compound_task_needs_tasks_and_resources() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut empty = Problem::default();
        assert_eq!(empty.add_random_compound_task(2, 5, &mut rng).unwrap(), None);

        let mut problem = Problem::parse(SAMPLE).unwrap();
        assert!(problem.add_random_compound_task(3, 2, &mut rng).is_err());
    }
}
