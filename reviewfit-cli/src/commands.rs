//! Subcommand handlers.

use crate::{Commands, ConfigAction, RunArgs};
use reviewfit_ml::config::{PipelineConfig, load_config, workspace_config_path};
use reviewfit_ml::{PipelineOutcome, TracingSink, TrainingPipeline};
use std::path::Path;

/// Handle a CLI subcommand.
pub fn handle_command(
    command: Commands,
    workspace: &Path,
    config_file: Option<&Path>,
    quiet: bool,
) -> anyhow::Result<()> {
    match command {
        Commands::Run(args) => {
            let outcome = run_pipeline(&args, workspace, config_file)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print!("{}", render_outcome(&outcome, quiet));
            }
            Ok(())
        }
        Commands::Config { action } => handle_config(action, workspace, config_file),
    }
}

fn resolve_config(workspace: &Path, config_file: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    load_config(Some(workspace), config_file)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))
}

/// Apply command-line overrides on top of the layered configuration.
fn apply_overrides(config: &mut PipelineConfig, args: &RunArgs) {
    if let Some(data) = &args.data {
        config.data.path = Some(data.clone());
    }
    if let Some(model) = &args.model {
        config.model.name = model.clone();
    }
    if let Some(seed) = args.seed {
        config.split.seed = seed;
    }
    if let Some(test_size) = args.test_size {
        config.split.test_size = test_size;
    }
    if let Some(mode) = args.metric_mode {
        config.evaluation.metric_mode = mode;
    }
}

fn run_pipeline(
    args: &RunArgs,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<PipelineOutcome> {
    let mut config = resolve_config(workspace, config_file)?;
    apply_overrides(&mut config, args);

    let Some(path) = config.data.path.clone() else {
        anyhow::bail!("No data file given. Pass one to `reviewfit run` or set data.path");
    };
    // Relative data paths in config files are taken from the workspace.
    let path = if path.is_relative() && args.data.is_none() {
        workspace.join(path)
    } else {
        path
    };

    let pipeline = TrainingPipeline::new(config);
    let outcome = pipeline.run_on(&path, &mut TracingSink)?;
    Ok(outcome)
}

fn render_outcome(outcome: &PipelineOutcome, quiet: bool) -> String {
    let m = &outcome.metrics;
    let mut out = String::new();
    if !quiet {
        out.push_str(&format!(
            "Run {} ({}, seed {})\n",
            outcome.run.id, outcome.run.model, outcome.run.seed
        ));
        out.push_str(&format!(
            "  rows: {} train / {} test\n",
            outcome.train_rows, outcome.test_rows
        ));
        if let Some(secs) = outcome.run.duration_secs() {
            out.push_str(&format!("  took: {:.2}s\n", secs));
        }
    }
    out.push_str(&format!("MSE:  {:.6}\n", m.mse));
    out.push_str(&format!("R2:   {:.6}\n", m.r2));
    out.push_str(&format!("RMSE: {:.6}\n", m.rmse));
    out
}

fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = workspace_config_path(workspace);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }
            if let Some(dir) = config_path.parent() {
                std::fs::create_dir_all(dir)?;
            }

            let toml_str = toml::to_string_pretty(&PipelineConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = resolve_config(workspace, config_file)?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}
