use anyhow::{Context, Result};
use cosynth::cli::{Args, Commands, ConfigDiscovery, CosynthConfig, GenerateOptions, SimulationOptions};
use cosynth::problem::seeded_rng;
use cosynth::{AllocationSummary, ExecutionSimulator, Problem, Scheduler, SimulationReport, Strategy};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // -v wins over RUST_LOG
    let filter = if args.verbose {
        EnvFilter::new(args.log_filter())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let command = args.command().map_err(anyhow::Error::msg)?;
    if let Commands::ShowConfig = command {
        ConfigDiscovery::show_discovery_info();
        return Ok(());
    }

    let config = ConfigDiscovery::load(args.config.as_deref())?;

    match command {
        Commands::Generate { output, options } => generate(&config, options, output),
        Commands::Show { file } => {
            print!("{}", load(file)?);
            Ok(())
        }
        Commands::Assign {
            file,
            strategy,
            json,
        } => assign(&config, file, *strategy, *json),
        Commands::Run {
            file,
            strategy,
            simulation,
            json,
        } => run(&config, file, *strategy, simulation, *json).await,
        Commands::Paths { file, from, to } => paths(file, *from, *to),
        Commands::Bfs { file } => {
            let order = load(file)?.graph().bfs();
            println!("{}", join(&order, " "));
            Ok(())
        }
        Commands::AddCompound {
            file,
            output,
            min_subtasks,
            max_subtasks,
            seed,
        } => add_compound(file, output.as_deref(), *min_subtasks, *max_subtasks, *seed),
        Commands::ShowConfig => Ok(()),
    }
}

fn load(path: &Path) -> Result<Problem> {
    Problem::load(path).with_context(|| format!("Failed to load problem {:?}", path))
}

fn generate(config: &CosynthConfig, options: &GenerateOptions, output: &Path) -> Result<()> {
    let mut generation = config.generation.clone();
    options.apply(&mut generation);

    let mut rng = seeded_rng(generation.seed);
    let problem = Problem::generate(&generation, &mut rng)?;
    problem
        .save(output)
        .with_context(|| format!("Failed to write {:?}", output))?;

    println!(
        "Wrote {} tasks and {} resources to {:?}",
        problem.task_count(),
        problem.resources().len(),
        output
    );
    Ok(())
}

/// Apply the requested strategy, or the configured default
fn schedule(
    config: &CosynthConfig,
    problem: &Problem,
    strategy: Option<Strategy>,
) -> (Strategy, Scheduler, AllocationSummary) {
    let strategy = strategy.unwrap_or(config.scheduling.strategy);
    info!("Applying strategy {}", strategy);

    let mut scheduler = Scheduler::new();
    let summary = scheduler.apply(strategy, problem);
    (strategy, scheduler, summary)
}

fn assign(config: &CosynthConfig, file: &Path, strategy: Option<Strategy>, json: bool) -> Result<()> {
    let problem = load(file)?;
    let (strategy, scheduler, summary) = schedule(config, &problem, strategy);

    if json {
        let output = serde_json::json!({
            "strategy": strategy,
            "summary": summary,
            "assignments": scheduler.assignments().collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", summary);
    for assignment in scheduler.assignments() {
        let tasks: Vec<String> = assignment.tasks().iter().map(|t| format!("T{}", t)).collect();
        match assignment.subtask() {
            Some(subtask) => println!("{} (subtask {}): {}", assignment, subtask, tasks.join(" ")),
            None => println!("{}: {}", assignment, tasks.join(" ")),
        }
    }
    Ok(())
}

async fn run(
    config: &CosynthConfig,
    file: &Path,
    strategy: Option<Strategy>,
    options: &SimulationOptions,
    json: bool,
) -> Result<()> {
    let problem = load(file)?;
    let (_, scheduler, _) = schedule(config, &problem, strategy);

    let mut simulation = config.simulation.clone();
    options.apply(&mut simulation);

    let run = ExecutionSimulator::new(simulation).run(&problem, &scheduler).await;
    let report = SimulationReport::build(&problem, &scheduler, &run);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}

fn paths(file: &Path, from: usize, to: usize) -> Result<()> {
    let problem = load(file)?;
    let paths = problem.graph().dfs(from, to);

    if paths.is_empty() {
        println!("No path from {} to {}", from, to);
    }
    for path in paths {
        println!("{}", join(&path, " -> "));
    }
    Ok(())
}

fn add_compound(
    file: &Path,
    output: Option<&Path>,
    min_subtasks: usize,
    max_subtasks: usize,
    seed: Option<u64>,
) -> Result<()> {
    let mut problem = load(file)?;
    let mut rng = seeded_rng(seed);

    let Some(task) = problem.add_random_compound_task(min_subtasks, max_subtasks, &mut rng)? else {
        println!("Nothing added: the problem has no tasks or no resources");
        return Ok(());
    };

    let target = output.unwrap_or(file);
    problem
        .save(target)
        .with_context(|| format!("Failed to write {:?}", target))?;
    println!("Added compound task T{} to {:?}", task, target);
    Ok(())
}

fn join(values: &[usize], separator: &str) -> String {
    values
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}
