use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "layermint", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the collection: images, per-edition metadata and `_metadata.json`.
    Generate(GenerateArgs),
    /// Rewrite name, description and image URI of an already generated collection.
    UpdateInfo(UpdateInfoArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Generator config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Seed for a reproducible run (overrides the config).
    #[arg(long)]
    seed: Option<u64>,

    /// Shuffle edition numbers; `--shuffle=false` turns off a configured shuffle.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    shuffle: Option<bool>,

    /// Debug logging; `--debug=false` turns off configured debug logs.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    debug: Option<bool>,
}

#[derive(Parser, Debug)]
struct UpdateInfoArgs {
    /// Generator config JSON holding the new name prefix, description and base URI.
    #[arg(long)]
    config: PathBuf,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::UpdateInfo(args) => cmd_update_info(args),
    }
}

fn init_logging(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<ExitCode> {
    let mut config = layermint::GeneratorConfig::from_path(&args.config)
        .with_context(|| format!("load config '{}'", args.config.display()))?;
    apply_overrides(&mut config, &args);
    init_logging(config.debug_logs);

    let mut generator = layermint::Generator::new(config)?;
    match generator.run() {
        Ok(report) => {
            eprintln!(
                "created {} editions: {:?}",
                report.editions.len(),
                report.edition_numbers()
            );
            eprintln!("duplicate DNA rejected: {}", report.duplicate_failures);
            eprintln!("images in {}", generator.config().images_dir().display());
            eprintln!("wrote {}", report.index_path.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(layermint::MintError::Exhausted {
            tier,
            requested,
            achieved,
            failures,
        }) => {
            eprintln!(
                "aborted in tier {tier}: {achieved} of {requested} editions produced \
                 ({} short) after {failures} duplicate DNA",
                requested - achieved
            );
            eprintln!("you need more layers or elements to grow your edition to {requested}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn apply_overrides(config: &mut layermint::GeneratorConfig, args: &GenerateArgs) {
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(shuffle) = args.shuffle {
        config.shuffle_layer_configurations = shuffle;
    }
    if let Some(debug) = args.debug {
        config.debug_logs = debug;
    }
}

fn cmd_update_info(args: UpdateInfoArgs) -> anyhow::Result<ExitCode> {
    let config = layermint::GeneratorConfig::from_path(&args.config)
        .with_context(|| format!("load config '{}'", args.config.display()))?;
    init_logging(config.debug_logs);

    let template = config.metadata_template();
    let records = layermint::refresh_metadata(&config.json_dir(), &template)?;

    eprintln!("updated {} records", records.len());
    eprintln!("base uri:    {}", template.base_uri);
    eprintln!("description: {}", template.description);
    eprintln!("name prefix: {}", template.name_prefix);
    Ok(ExitCode::SUCCESS)
}
