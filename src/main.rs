use anyhow::Context;
use clap::{Parser, Subcommand};

use ferrous_seed::core::io::match_output::open_output;
use ferrous_seed::core::io::{MatchWriter, SequenceSet};
use ferrous_seed::core::seed::{weight_range, SeedPattern};
use ferrous_seed::pipelines::linear::{run_seed_extend, DebugWriter};
use ferrous_seed::seed_opt::ExtendCliOptions;

#[derive(Parser)]
#[command(name = "ferrous-seed")]
#[command(about = "FerrousSeed - spaced-seed filtering, chaining and verification of DNA sequences", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find local similarities between two sequence sets (or within one)
    Extend(ExtendCliOptions),

    /// Show the weight range and the selected seed pattern for a span
    Pattern {
        /// Seed span
        #[arg(short = 'k', long = "seedlength", value_name = "INT")]
        span: usize,

        /// Number of care positions [middle of the valid range]
        #[arg(long, value_name = "INT")]
        weight: Option<usize>,
    },
}

/// Map verbosity (1=error, 2=warning, 3=message, 4=debug, 5+=trace) to log levels
fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        v if v <= 1 => log::LevelFilter::Error,
        2 => log::LevelFilter::Warn,
        3 => log::LevelFilter::Info,
        4 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace, // 5+ = trace
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None) // Don't show timestamps
        .format_target(false) // Don't show module names
        .init();
}

fn configure_threads(requested: usize) -> usize {
    let mut num_threads = requested;
    if num_threads < 1 {
        log::warn!("Invalid thread count {}, using 1 thread", num_threads);
        num_threads = 1;
    }

    // Reasonable upper bound to prevent accidental resource exhaustion
    let max_threads = num_cpus::get() * 2;
    if num_threads > max_threads {
        log::warn!(
            "Thread count {} exceeds recommended maximum {}, capping at {}",
            num_threads,
            max_threads,
            max_threads
        );
        num_threads = max_threads;
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        Ok(_) => {
            log::debug!(
                "Successfully built global Rayon thread pool with {} threads",
                num_threads
            );
        }
        Err(e) => {
            log::warn!(
                "Failed to configure thread pool: {} (may already be initialized)",
                e
            );
        }
    }

    let thread_word = if num_threads == 1 {
        "thread"
    } else {
        "threads"
    };
    log::info!("Using {} {}", num_threads, thread_word);
    num_threads
}

fn run_extend(cli: &ExtendCliOptions) -> anyhow::Result<()> {
    let mut opt = cli.to_opt();
    if let Err(errors) = opt.validate() {
        for e in &errors {
            log::error!("{}", e);
        }
        anyhow::bail!("invalid options ({} problems)", errors.len());
    }
    opt.n_threads = configure_threads(opt.n_threads);

    log::info!("Loading sequences from {}", cli.aseq.display());
    let aset = SequenceSet::from_fasta(&cli.aseq)
        .with_context(|| format!("failed to load {}", cli.aseq.display()))?;
    let bset = match &cli.bseq {
        Some(path) => {
            log::info!("Loading sequences from {}", path.display());
            Some(
                SequenceSet::from_fasta(path)
                    .with_context(|| format!("failed to load {}", path.display()))?,
            )
        }
        None => {
            log::info!("No second file given, comparing A with itself");
            None
        }
    };

    let params = opt.resolve_defaults(&aset, bset.as_ref())?;
    let run = run_seed_extend(&aset, bset.as_ref(), &params)?;

    let mut out = open_output(cli.output.as_deref()).context("failed to open output")?;
    if !run.debug.is_empty() {
        let mut debug = DebugWriter::new(&mut out);
        debug.write_lists(&run.debug)?;
        log::info!("Wrote {} debug lines", debug.written());
    }
    let mut writer = MatchWriter::new(out);
    if cli.header {
        writer.write_header()?;
    }
    for m in &run.matches {
        writer.write_match(m)?;
    }
    writer.flush().context("failed to flush output")?;
    if params.only_seeds {
        log::info!("Wrote {} unverified chained links", writer.written());
    } else {
        log::info!("Wrote {} matches", writer.written());
    }
    Ok(())
}

fn run_pattern(span: usize, weight: Option<usize>) -> anyhow::Result<()> {
    let (min, max) = weight_range(span)?;
    let weight = weight.unwrap_or((min + max) / 2);
    let pattern = SeedPattern::from_span_weight(span, weight)?;
    println!("span\t{}", span);
    println!("weight range\t[{}, {}]", min, max);
    println!("weight\t{}", pattern.weight());
    println!("pattern\t{}", pattern);
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Extend(opts) => {
            init_logging(opts.verbosity);
            run_extend(opts)
        }
        Commands::Pattern { span, weight } => {
            init_logging(ferrous_seed::defaults::VERBOSITY);
            run_pattern(*span, *weight)
        }
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
