//! HSI link - compress, protect, transmit and validate hyperspectral cubes
//!
//! This is the main entry point for running the pipeline on synthetic cubes

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use hsi_core::cube::SampleCube;
use hsi_core::predictor::PredictorStrategy;
use hsi_core::ACTIVE_BANDS;
use hsi_frame::link::LINK_BLOCK_BITS;
use hsi_tools::metrics::{MAX_BER_AFTER, MAX_NS_PER_PIXEL, MIN_COMPRESSION_RATIO};
use hsi_tools::{compare_predictors, report, synth, ConfigArgs, Pipeline};

/// Hyperspectral compression and FEC link simulator
#[derive(Parser)]
#[command(name = "hsi")]
#[command(about = "Hyperspectral compression over a CRC + Hamming(7,4) link")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline once
    Run(RunArgs),
    /// Compare predictor strategies on one cube
    Compare(CubeArgs),
    /// Show capabilities
    Info,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    cube: CubeArgs,

    #[command(flatten)]
    config: ConfigArgs,

    /// Print the metrics as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Synthetic {
    Ramp,
    Gradient,
    Constant,
}

#[derive(Args)]
struct CubeArgs {
    /// Synthetic cube generator
    #[arg(long, value_enum, default_value = "gradient")]
    synthetic: Synthetic,

    /// Cube dimensions as ROWS,COLS,BANDS
    #[arg(long, default_value = "64,64,10")]
    dims: String,

    /// Sample value of the constant cube
    #[arg(long, default_value = "1000")]
    value: i32,

    /// Seed for the gradient noise
    #[arg(long)]
    cube_seed: Option<u64>,
}

impl CubeArgs {
    fn dimensions(&self) -> Result<(usize, usize, usize)> {
        let parts: Vec<usize> = self
            .dims
            .split(',')
            .map(|part| part.trim().parse::<usize>())
            .collect::<std::result::Result<_, _>>()
            .with_context(|| format!("Invalid dimensions: {}", self.dims))?;

        match parts.as_slice() {
            &[rows, cols, bands] => Ok((rows, cols, bands)),
            _ => bail!("Dimensions must be ROWS,COLS,BANDS, got {}", self.dims),
        }
    }

    fn build(&self) -> Result<SampleCube> {
        let (rows, cols, bands) = self.dimensions()?;
        let cube = match self.synthetic {
            Synthetic::Ramp => synth::linear_ramp(rows, cols, bands),
            Synthetic::Gradient => synth::gradient(rows, cols, bands, self.cube_seed),
            Synthetic::Constant => synth::constant(rows, cols, bands, self.value),
        }
        .context("Failed to create sample cube")?;

        info!(
            "Created {:?} cube {}x{}x{}, {} bits per sample",
            self.synthetic,
            rows,
            cols,
            bands,
            cube.bit_depth()
        );
        Ok(cube)
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let config = args.config.resolve()?;
    let cube = args.cube.build()?;

    info!(
        "Running with {} predictor, CRC {}, error rate {}",
        config.predictor,
        if config.use_crc { "on" } else { "off" },
        config.error_rate
    );

    let mut pipeline = Pipeline::new(config)?;
    let report = pipeline.run(&cube)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.metrics)?);
    } else {
        print!("{}", report::render(&report.metrics));
    }
    Ok(())
}

fn compare(args: &CubeArgs) -> Result<()> {
    let cube = args.build()?;
    let results = compare_predictors(&cube)?;
    print!("{}", report::render_comparison(&results));
    Ok(())
}

fn show_info() {
    println!("\n=== HSI Link ===");
    println!("Version: 0.1.0");

    println!("\n=== Predictors ===");
    for strategy in PredictorStrategy::ALL {
        println!("  • {}", strategy);
    }

    println!("\n=== Link Modes ===");
    println!("  • crc-hamming  - 13 payload bits + 3-bit CRC, {} bits on air per block", LINK_BLOCK_BITS);
    println!("  • hamming-only - Hamming(7,4) on every nibble, no erasure");

    println!("\n=== Acceptance ===");
    println!("  • Compression ratio > 1:{}", MIN_COMPRESSION_RATIO);
    println!("  • BER after correction < {:e}", MAX_BER_AFTER);
    println!("  • Time per pixel <= {} ns", MAX_NS_PER_PIXEL);
    println!("  • First {} bands are compressed", ACTIVE_BANDS);

    println!("\n=== Example Usage ===");
    println!("  Run:      hsi run --synthetic ramp --dims 4,4,6 --error-rate 1000 --seed 1");
    println!("  No CRC:   hsi run --no-crc --error-rate 500");
    println!("  Compare:  hsi compare --dims 32,32,8");
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match &cli.command {
        Commands::Run(args) => run(args)?,
        Commands::Compare(args) => compare(args)?,
        Commands::Info => show_info(),
    }

    Ok(())
}
