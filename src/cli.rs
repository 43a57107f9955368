//! The command line interface.
use crate::dispatch::HighsSolver;
use crate::executor::TaskExecutor;
use crate::input::candidate::CANDIDATES_FILE_NAME;
use crate::input::{load_model, read_candidates};
use crate::log;
use crate::objective::ObjectivePair;
use crate::output::metadata::write_metadata;
use crate::output::{DataWriter, create_output_directory, get_output_dir};
use crate::population::PopulationEvaluator;
use crate::search::non_dominated;
use crate::settings::Settings;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the program.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the evaluate command
#[derive(Args, Default)]
pub struct EvaluateOpts {
    /// CSV file of candidates [default: candidates.csv in the model directory]
    #[arg(long)]
    pub candidates: Option<PathBuf>,
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// Whether to write dispatch and net load data for every candidate
    #[arg(long)]
    pub debug_model: bool,
    /// Number of candidates to evaluate in parallel (0 = one per CPU)
    #[arg(long)]
    pub threads: Option<usize>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Evaluate the objectives of a population of candidates.
    Evaluate {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// Other evaluation options
        #[command(flatten)]
        opts: EvaluateOpts,
    },
    /// Validate a model.
    Validate {
        /// The path to the model directory.
        model_dir: PathBuf,
    },
    /// Manage program settings.
    Settings {
        /// The subcommands for managing settings.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Evaluate { model_dir, opts } => handle_evaluate_command(&model_dir, &opts, None),
            Self::Validate { model_dir } => handle_validate_command(&model_dir, None),
            Self::Settings { subcommand } => {
                subcommand.execute();
                Ok(())
            }
        }
    }
}

/// Parse CLI arguments and run the requested command
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ mgsizing --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load program settings, if not provided
fn load_settings(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Handle the `evaluate` command.
pub fn handle_evaluate_command(
    model_path: &Path,
    opts: &EvaluateOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;

    // Command-line arguments take precedence over settings
    let debug_model = opts.debug_model || settings.debug_model;
    let allow_overwrite = opts.overwrite || settings.overwrite;
    let num_threads = opts.threads.unwrap_or(settings.num_threads);

    let output_path = match &opts.output_dir {
        Some(path) => path.clone(),
        None => get_output_dir(model_path)?,
    };
    let overwritten = create_output_directory(&output_path, allow_overwrite).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_path.display()
        )
    })?;

    log::init(Some(settings.log_level.as_str()), Some(&output_path))
        .context("Failed to initialise logging.")?;

    // NB: We have to wait until the logger is initialised to display this warning
    if overwritten {
        warn!("Output folder was overwritten");
    }

    let model = load_model(model_path).context("Failed to load model.")?;
    info!("Loaded model from {}", model_path.display());
    info!("Output folder: {}", output_path.display());

    let candidates_path = opts
        .candidates
        .clone()
        .unwrap_or_else(|| model_path.join(CANDIDATES_FILE_NAME));
    let population = read_candidates(&candidates_path, &model.parameters.capacity_bounds)
        .context("Failed to load candidates.")?;
    info!(
        "Loaded {} candidates from {}",
        population.len(),
        candidates_path.display()
    );

    let executor = TaskExecutor::new(num_threads)?;
    let evaluator = PopulationEvaluator::new(&model, &HighsSolver, &executor);
    let mut writer = DataWriter::create(&output_path, debug_model)?;
    let objectives = if debug_model {
        let mut objectives = Vec::with_capacity(population.len());
        for (candidate, evaluation) in evaluator.evaluate_detailed(&population).iter().enumerate()
        {
            match evaluation {
                Ok(evaluation) => {
                    writer.write_debug_info(candidate, evaluation)?;
                    objectives.push(evaluation.objectives);
                }
                Err(err) => {
                    warn!("Candidate {candidate} is infeasible: {err:#}");
                    objectives.push(ObjectivePair::INFEASIBLE);
                }
            }
        }
        objectives
    } else {
        evaluator.evaluate(&population)
    };

    writer.write_objectives(&population, &objectives)?;
    writer.flush()?;
    write_metadata(
        &output_path,
        model_path,
        population.len(),
        executor.num_threads(),
    )
    .context("Failed to save metadata.")?;

    let num_feasible = objectives.iter().filter(|obj| obj.is_feasible()).count();
    let front_size = non_dominated(&objectives).into_iter().filter(|&f| f).count();
    info!(
        "Evaluation complete: {num_feasible} of {} candidates feasible, {front_size} on the \
        Pareto front",
        population.len()
    );

    Ok(())
}

/// Handle the `validate` command.
///
/// The candidates file in the model directory is also checked if present.
pub fn handle_validate_command(model_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = load_settings(settings)?;

    // We won't save log files when running the validate command
    log::init(Some(settings.log_level.as_str()), None).context("Failed to initialise logging.")?;

    let model = load_model(model_path).context("Failed to validate model.")?;
    let candidates_path = model_path.join(CANDIDATES_FILE_NAME);
    if candidates_path.is_file() {
        let population = read_candidates(&candidates_path, &model.parameters.capacity_bounds)
            .context("Failed to validate candidates.")?;
        info!("Found {} valid candidates", population.len());
    }
    info!("Model validation successful!");

    Ok(())
}
