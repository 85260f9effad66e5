use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use roundel::{
    FinishOptions, GenerateOptions, Generator, OutputPaths, PreviewLayout, Roster, Thresholds,
    pipeline,
};

#[derive(Parser, Debug)]
#[command(name = "roundel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate every roster avatar from a remote model endpoint.
    Generate(GenerateArgs),
    /// Re-run background removal over existing avatars.
    Reprocess(ReprocessArgs),
    /// Apply the circular theme-color composite to existing avatars.
    Circle(CircleArgs),
    /// Assemble a preview sheet from existing avatars.
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Output directory for all generated files.
    #[arg(long, default_value = "public/avatars")]
    out_dir: PathBuf,

    /// Roster JSON overriding the built-in agent table.
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Inference endpoint base URL.
    #[arg(long, default_value = roundel::generate::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Candidate model id; repeat the flag to add fallbacks, tried in order.
    #[arg(long = "model")]
    models: Vec<String>,

    /// Bearer token (falls back to the HF_TOKEN environment variable).
    #[arg(long)]
    token: Option<String>,

    /// Generated image width and height in pixels.
    #[arg(long, default_value_t = 256)]
    size: u32,

    /// Pause between roster items, in milliseconds (endpoint rate limit).
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,

    /// Bob-cycle frame count.
    #[arg(long, default_value_t = 8)]
    frames: u32,

    /// Bob-cycle per-frame delay in milliseconds.
    #[arg(long, default_value_t = 120)]
    frame_delay_ms: u32,
}

#[derive(Parser, Debug)]
struct ReprocessArgs {
    /// Directory holding the `<name>.png` inputs (outputs land there too).
    #[arg(long, default_value = "public/avatars")]
    out_dir: PathBuf,

    /// Roster JSON overriding the built-in agent table.
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Resize inputs to this square size before processing.
    #[arg(long)]
    resize: Option<u32>,

    /// Distance below which a pixel is fully transparent.
    #[arg(long, default_value_t = 35.0)]
    full_threshold: f32,

    /// Distance below which alpha ramps linearly from the full threshold.
    #[arg(long, default_value_t = 60.0)]
    feather_threshold: f32,

    /// Distance bound for the bright-background rule.
    #[arg(long, default_value_t = 50.0)]
    bright_distance: f32,

    /// Minimum mean brightness for the bright-background rule.
    #[arg(long, default_value_t = 200.0)]
    bright_floor: f32,

    /// Bob-cycle frame count.
    #[arg(long, default_value_t = 8)]
    frames: u32,

    /// Bob-cycle per-frame delay in milliseconds.
    #[arg(long, default_value_t = 120)]
    frame_delay_ms: u32,
}

#[derive(Parser, Debug)]
struct CircleArgs {
    /// Directory holding the `<name>.png` inputs (rewritten in place).
    #[arg(long, default_value = "public/avatars")]
    out_dir: PathBuf,

    /// Roster JSON overriding the built-in agent table.
    #[arg(long)]
    roster: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Directory holding the `<name>.png` inputs.
    #[arg(long, default_value = "public/avatars")]
    out_dir: PathBuf,

    /// Roster JSON overriding the built-in agent table.
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Grid column count.
    #[arg(long, default_value_t = 4)]
    columns: u32,

    /// Expected per-cell avatar size in pixels.
    #[arg(long, default_value_t = 256)]
    cell: u32,

    /// Margin between and around cells in pixels.
    #[arg(long, default_value_t = 10)]
    margin: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Reprocess(args) => cmd_reprocess(args),
        Command::Circle(args) => cmd_circle(args),
        Command::Preview(args) => cmd_preview(args),
    }
}

fn load_roster(path: Option<&PathBuf>) -> anyhow::Result<Roster> {
    let roster = match path {
        Some(path) => Roster::from_json_file(path)?,
        None => Roster::builtin(),
    };
    roster.validate()?;
    Ok(roster)
}

fn report(summary: roundel::BatchSummary) {
    eprintln!(
        "{} processed, {} skipped, {} failed",
        summary.processed, summary.skipped, summary.failed
    );
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let roster = load_roster(args.roster.as_ref())?;

    let token = match args.token {
        Some(token) => token,
        None => std::env::var("HF_TOKEN")
            .context("no --token given and HF_TOKEN is not set in the environment")?,
    };

    let models = if args.models.is_empty() {
        roundel::generate::DEFAULT_MODELS
            .iter()
            .map(|m| m.to_string())
            .collect()
    } else {
        args.models
    };

    let generator = Generator::new(
        args.endpoint,
        token,
        models,
        GenerateOptions {
            width: args.size,
            height: args.size,
        },
    )?;

    let paths = OutputPaths::new(args.out_dir);
    let opts = FinishOptions {
        frames: args.frames,
        delay_ms: args.frame_delay_ms,
    };
    let summary = pipeline::run_generate(
        &roster,
        &generator,
        &paths,
        &opts,
        Duration::from_millis(args.delay_ms),
    )?;
    report(summary);
    Ok(())
}

fn cmd_reprocess(args: ReprocessArgs) -> anyhow::Result<()> {
    let roster = load_roster(args.roster.as_ref())?;
    let thresholds = Thresholds {
        full: args.full_threshold,
        feather: args.feather_threshold,
        bright_distance: args.bright_distance,
        bright_floor: args.bright_floor,
    };
    thresholds.validate()?;

    let paths = OutputPaths::new(args.out_dir);
    let opts = FinishOptions {
        frames: args.frames,
        delay_ms: args.frame_delay_ms,
    };
    let summary = pipeline::run_reprocess(&roster, &paths, &thresholds, args.resize, &opts)?;
    report(summary);
    Ok(())
}

fn cmd_circle(args: CircleArgs) -> anyhow::Result<()> {
    let roster = load_roster(args.roster.as_ref())?;
    let paths = OutputPaths::new(args.out_dir);
    let summary = pipeline::run_circle(&roster, &paths)?;
    report(summary);
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let roster = load_roster(args.roster.as_ref())?;
    let paths = OutputPaths::new(args.out_dir);
    let layout = PreviewLayout {
        columns: args.columns,
        cell: args.cell,
        margin: args.margin,
    };
    layout.validate()?;
    let summary = pipeline::run_preview(&roster, &paths, &layout)?;
    report(summary);
    Ok(())
}
