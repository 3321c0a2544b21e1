//! Command handlers for the controller and the guided programs

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, instrument};

use crate::application::reward::reward;
use crate::application::{run_guided, IoResultExt};
use crate::application::services::{EpisodeRunner, Explorer};
use crate::application::shapes::ShapeAnalyzer;
use crate::cli::args::{BstArgs, Cli, Commands, ConfigCommands, TreeArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{parse_tree, CallPath, TreeParams};
use crate::frame;
use crate::infrastructure::{GuidedProcess, ProgramSpec, StateDict};

/// RNG from an explicit seed, or a fresh random one. The seed is logged so a
/// run can be reproduced.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(rand::random);
    info!(seed, "rng seeded");
    StdRng::seed_from_u64(seed)
}

/// Entry point of the `bst` program.
pub fn run_bst(args: &BstArgs, path: &CallPath) -> CliResult<()> {
    run_program(TreeParams::bst(), args.seed, &path.with(frame!("run_bst")))
}

/// Entry point of the `tree` program.
pub fn run_tree(args: &TreeArgs, path: &CallPath) -> CliResult<()> {
    run_program(args.params(), args.seed, &path.with(frame!("run_tree")))
}

#[instrument(skip(path))]
fn run_program(params: TreeParams, seed: Option<u64>, path: &CallPath) -> CliResult<()> {
    let mut rng = seeded_rng(seed);
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_guided(params, &path.with(frame!("run_program")), &mut rng, stdin.lock(), stdout.lock())?;
    Ok(())
}

/// Dispatch a controller command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Run {
            episodes,
            action_space,
            seed,
            state_dict,
            timeout,
            verbose,
            show_stderr,
            program,
        } => {
            let mut settings = load_settings(cli)?;
            if let Some(n) = episodes {
                settings.episodes = *n;
            }
            if let Some(n) = action_space {
                settings.action_space = *n;
            }
            if let Some(path) = state_dict {
                settings.state_dict = path.clone();
            }
            if let Some(secs) = timeout {
                settings.read_timeout_secs = *secs;
            }
            _run(&settings, *seed, *verbose, *show_stderr, program)
        }
        Commands::Explore {
            iterations,
            action_space,
            explore_steps,
            seed,
            program_seed,
            state_dict,
            timeout,
            verbose,
            show_stderr,
            program,
        } => {
            let mut settings = load_settings(cli)?;
            if let Some(n) = iterations {
                settings.iterations = *n;
            }
            if let Some(n) = action_space {
                settings.action_space = *n;
            }
            if let Some(n) = explore_steps {
                settings.explore_steps = *n;
            }
            if let Some(path) = state_dict {
                settings.state_dict = path.clone();
            }
            if let Some(secs) = timeout {
                settings.read_timeout_secs = *secs;
            }
            _explore(&settings, *seed, *program_seed, *verbose, *show_stderr, program)
        }
        Commands::Analyze { file } => _analyze(file),
        Commands::Show { tree } => _show(tree),
        Commands::Config { command } => match command {
            ConfigCommands::Show => _config_show(cli),
            ConfigCommands::Path => _config_path(cli),
            ConfigCommands::Template => {
                output::info(&Settings::template());
                Ok(())
            }
        },
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

fn config_dir(cli: &Cli) -> PathBuf {
    cli.config_dir.clone().unwrap_or_else(|| PathBuf::from("."))
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    Ok(Settings::load(Some(config_dir(cli).as_path()))?)
}

#[instrument(skip(settings))]
fn _run(settings: &Settings, seed: Option<u64>, verbose: bool, show_stderr: bool, program: &[String]) -> CliResult<()> {
    if settings.action_space == 0 {
        return Err(CliError::InvalidArgs("action space must be at least 1".into()));
    }
    let Some((name, args)) = program.split_first() else {
        return Err(CliError::Usage("missing guided program".into()));
    };
    debug!(?settings, "effective settings");

    let states = StateDict::open(&settings.state_dict)?;
    let mut spec = ProgramSpec::new(name.clone(), args.to_vec());
    spec.inherit_stderr = show_stderr;
    let mut env = GuidedProcess::new(spec, states, settings.read_timeout());
    let mut runner = EpisodeRunner::new(settings.action_space, seeded_rng(seed));

    let summary = runner.run(&mut env, settings.episodes)?;

    for (n, episode) in summary.episodes.iter().enumerate() {
        if verbose {
            for line in &episode.transcript {
                output::detail(line);
            }
        }
        output::episode(n + 1, episode.steps, episode.reward, &episode.tree);
    }
    output::header("Summary");
    output::action("episodes", &summary.episodes.len());
    output::action("valid", &summary.valid);
    output::action("invalid", &summary.invalid);
    output::action("max reward", &summary.max_reward);
    output::action("states", &summary.states_seen);
    if let Some(path) = env.states().path() {
        output::action("state dictionary", &path.display());
    }
    Ok(())
}

#[instrument(skip(settings))]
fn _explore(
    settings: &Settings,
    seed: Option<u64>,
    program_seed: u64,
    verbose: bool,
    show_stderr: bool,
    program: &[String],
) -> CliResult<()> {
    if settings.action_space == 0 || settings.explore_steps == 0 {
        return Err(CliError::InvalidArgs(
            "action space and explore steps must be at least 1".into(),
        ));
    }
    let Some((name, args)) = program.split_first() else {
        return Err(CliError::Usage("missing guided program".into()));
    };
    debug!(?settings, program_seed, "effective settings");

    let states = StateDict::open(&settings.state_dict)?;
    let mut spec = ProgramSpec::new(name.clone(), args.to_vec());
    spec.inherit_stderr = show_stderr;
    spec.env.push(("GUIDETREE_SEED".into(), program_seed.to_string()));
    let mut env = GuidedProcess::new(spec, states, settings.read_timeout());
    let mut explorer = Explorer::new(settings.action_space, settings.explore_steps, seeded_rng(seed));

    let summary = explorer.explore(&mut env, settings.iterations)?;

    if verbose {
        output::header("Archive");
        for (id, cell) in explorer.archive() {
            output::detail(&format!(
                "{id:>5}  seen {:>5}  chosen {:>4}  actions {:?}",
                cell.times_seen, cell.times_chosen, cell.trajectory
            ));
        }
    }
    output::header("Exploration");
    output::action("iterations", &summary.iterations);
    output::action("cells", &summary.cells);
    output::action("actions", &summary.frames);
    output::action("episodes", &summary.episodes);
    output::action("states", &summary.states_seen);
    match &summary.best {
        Some(best) => {
            output::action("max reward", &best.reward);
            output::action("best tree", &best.tree);
            output::action("best actions", &format!("{:?}", best.trajectory));
        }
        None => output::action("max reward", "no episode finished"),
    }
    if let Some(path) = env.states().path() {
        output::action("state dictionary", &path.display());
    }
    Ok(())
}

#[instrument]
fn _analyze(file: &Path) -> CliResult<()> {
    if !file.exists() {
        return Err(CliError::NoInput(file.to_path_buf()));
    }
    let text = std::fs::read_to_string(file).with_path_context("read tree log", file)?;

    let mut analyzer = ShapeAnalyzer::new();
    analyzer.add_text(&text);
    let report = analyzer.report();

    for shape in &report.shapes {
        output::header(&format!("{}  ({})", shape.shape, shape.total));
        for (tree, count) in &shape.trees {
            output::detail(&format!("{count:>6}  {tree}"));
        }
    }
    output::header("Trees by node count");
    for (nodes, count) in report.by_size.iter().enumerate().filter(|(_, c)| **c > 0) {
        output::detail(&format!("{nodes:>3} nodes  {count}"));
    }
    output::action("trees", &report.trees());
    Ok(())
}

#[instrument]
fn _show(text: &str) -> CliResult<()> {
    let tree = parse_tree(text.trim()).map_err(crate::application::ApplicationError::from)?;
    match &tree {
        Some(node) => {
            output::info(&output::tree_view(node));
            output::action("nodes", &node.len());
            output::action("depth", &node.depth());
        }
        None => output::info("(empty tree)"),
    }
    output::action("reward", &reward(tree.as_ref()));
    Ok(())
}

fn _config_show(cli: &Cli) -> CliResult<()> {
    let settings = load_settings(cli)?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn _config_path(cli: &Cli) -> CliResult<()> {
    let mark = |p: &Path| if p.exists() { "exists" } else { "not found" };
    match global_config_path() {
        Some(path) => output::action("global", &format!("{} ({})", path.display(), mark(path.as_path()))),
        None => output::action("global", "no config directory on this platform"),
    }
    let local = local_config_path(&config_dir(cli));
    output::action("local", &format!("{} ({})", local.display(), mark(local.as_path())));
    Ok(())
}
