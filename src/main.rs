use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use ftir_analyzer::deduction::{spawn_deduction, CommandDeducer, DeductionOutcome};
use ftir_analyzer::report::{self, ReportFormat};
use ftir_analyzer::{data, Catalog, Pipeline, Settings};

#[derive(Parser)]
#[command(name = "ftir-analyzer")]
#[command(author, version, about = "FTIR spectrum analyzer", long_about = None)]
struct Cli {
    /// Enable verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON settings file (pipeline, deduction, catalog paths)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Functional group table (JSON), replaces the built-in one
    #[arg(long, global = true)]
    groups: Option<PathBuf>,

    /// Compound signature table (JSON), replaces the built-in one
    #[arg(long, global = true)]
    compounds: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a spectrum file (.csv, .json, .parquet)
    Analyze {
        /// Input file with Wavelength and Absorbance columns
        input: PathBuf,

        /// Minimum peak height (processed absorbance)
        #[arg(long)]
        min_height: Option<f64>,

        /// Minimum peak width in samples
        #[arg(long)]
        min_width: Option<usize>,

        /// Smoothing window (odd number of samples)
        #[arg(long)]
        smooth_window: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Write raw, corrected and smoothed signals to this CSV file
        #[arg(long)]
        export_signal: Option<PathBuf>,

        /// Ask an external program about the identified groups (prompt on stdin)
        #[arg(long, num_args = 1.., allow_hyphen_values = true, value_name = "PROGRAM [ARGS]")]
        deduce_cmd: Option<Vec<String>>,

        /// Timeout for the deduction program in milliseconds
        #[arg(long)]
        deduce_timeout_ms: Option<u64>,
    },

    /// Print the active functional group and compound tables
    Catalog,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if cli.groups.is_some() {
        settings.functional_groups = cli.groups.clone();
    }
    if cli.compounds.is_some() {
        settings.compounds = cli.compounds.clone();
    }

    let catalog = Catalog::load(
        settings.functional_groups.as_deref(),
        settings.compounds.as_deref(),
    )
    .context("loading catalog")?;

    match cli.command {
        Commands::Catalog => {
            print_catalog(&catalog);
            Ok(())
        }
        Commands::Analyze {
            input,
            min_height,
            min_width,
            smooth_window,
            format,
            export_signal,
            deduce_cmd,
            deduce_timeout_ms,
        } => {
            if let Some(v) = min_height {
                settings.pipeline.peak_min_height = v;
            }
            if let Some(v) = min_width {
                settings.pipeline.peak_min_width = v;
            }
            if let Some(v) = smooth_window {
                settings.pipeline.smooth_window = v;
            }
            if let Some(v) = deduce_timeout_ms {
                settings.deduction.timeout_ms = v;
            }

            let pipeline = Pipeline::new(&settings.pipeline)?;
            let spectrum = data::loader::load_file(&input)?;
            let analysis = pipeline
                .run(&spectrum, &catalog)
                .with_context(|| format!("analyzing {}", input.display()))?;

            println!("{}", report::render(&analysis, format)?);

            if let Some(path) = export_signal {
                let file = std::fs::File::create(&path)
                    .with_context(|| format!("creating {}", path.display()))?;
                report::write_signals(&analysis, file)?;
                log::info!("Wrote processed signals to {}", path.display());
            }

            if let Some(mut argv) = deduce_cmd {
                let program = argv.remove(0);
                let service = Arc::new(CommandDeducer::new(program, argv));
                let groups = analysis.distinct_groups();
                let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
                let outcome = runtime.block_on(async {
                    let task = spawn_deduction(service, &groups, &settings.deduction);
                    let abort = task.abort_handle();
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {
                            abort.abort();
                            DeductionOutcome::Cancelled
                        }
                        outcome = task.outcome() => outcome,
                    }
                });
                print_deduction(&outcome);
            }
            Ok(())
        }
    }
}

fn print_catalog(catalog: &Catalog) {
    println!("Functional groups ({}):", catalog.groups.len());
    for g in &catalog.groups {
        println!("  {:>6.0} – {:<6.0} {}", g.min, g.max, g.name);
    }
    println!("\nCompounds ({}):", catalog.compounds.len());
    for c in &catalog.compounds {
        let groups: Vec<&str> = c.required_groups.iter().map(String::as_str).collect();
        println!("  {}: {}", c.name, groups.join(" + "));
    }
    for err in &catalog.rejected {
        println!("  skipped: {err}");
    }
    for (compound, group) in catalog.unknown_groups() {
        println!("  unreachable: {compound} (unknown group '{group}')");
    }
}

fn print_deduction(outcome: &DeductionOutcome) {
    match outcome {
        DeductionOutcome::Answer(text) => println!("\nPossible molecule (speculative):\n{text}"),
        DeductionOutcome::Failed(e) => eprintln!("\nDeduction unavailable: {e}"),
        DeductionOutcome::TimedOut(after) => eprintln!("\nDeduction timed out after {after:?}"),
        DeductionOutcome::Cancelled => eprintln!("\nDeduction cancelled"),
        DeductionOutcome::Skipped => eprintln!("\nDeduction skipped: no functional groups identified"),
    }
}
