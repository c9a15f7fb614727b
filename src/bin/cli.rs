use bloomfold::{
    BenchmarkConfigBuilder, BloomFilterConfigBuilder, BloomParams,
    CompressibleBloomFilter, DEFAULT_ROW_SIZE_BITS,
    common::bits2hr,
    workload::{
        generate_outliers, load_word_list, purify_outliers,
        run_compression_schedule, run_seed_rounds,
    },
};
use clap::{Parser, Subcommand};
use comfy_table::{
    Cell, CellAlignment, ContentArrangement, Table,
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the parameters derived for a capacity and false positive rate
    Params {
        /// Expected number of elements
        #[arg(short, long, default_value = "10000")]
        capacity: usize,

        /// False positive rate (between 0 and 1)
        #[arg(short, long, default_value = "0.01")]
        fpr: f64,

        /// Seed for the hash salts
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Row width of the compressible variant, in bits
        #[arg(long, default_value_t = DEFAULT_ROW_SIZE_BITS)]
        row_size: usize,
    },

    /// Measure the false positive rate of many seeded filters over a word list
    Rounds {
        /// Word list, one word per line
        #[arg(short, long)]
        words: PathBuf,

        /// Number of seeded filters to build
        #[arg(short, long, default_value = "1000")]
        rounds: u64,

        /// Seed of the first round
        #[arg(short, long, default_value = "0")]
        start_seed: u64,

        /// Target false positive rate, 1 / word count when omitted
        #[arg(short, long)]
        fpr: Option<f64>,

        /// Print one table row every N rounds
        #[arg(long, default_value = "100")]
        report_every: u64,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Compress one filter step by step and measure it after every fold
    Compress {
        /// Word list, one word per line
        #[arg(short, long)]
        words: PathBuf,

        /// Seed of the filter
        #[arg(short, long, default_value_t = 0xA57E_C3B2)]
        seed: u64,

        /// Target false positive rate, 1 / word count when omitted
        #[arg(short, long)]
        fpr: Option<f64>,

        /// Percentage to shrink by on every step
        #[arg(long, default_value = "5.0")]
        shrink: f64,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn header(table: &mut Table, names: &[&str]) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            names
                .iter()
                .map(|name| Cell::new(name).set_alignment(CellAlignment::Center))
                .collect::<Vec<_>>(),
        );
}

fn load_workload(
    words: &Path,
    outlier_seed: u64,
) -> Result<(Vec<String>, Vec<String>), Box<dyn std::error::Error>> {
    let words = load_word_list(words)?;
    let outliers = purify_outliers(&words, generate_outliers(&words, outlier_seed));
    info!(words = words.len(), outliers = outliers.len(), "workload ready");
    Ok((words, outliers))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Params {
            capacity,
            fpr,
            seed,
            row_size,
        } => {
            let config = BloomFilterConfigBuilder::default()
                .capacity(capacity)
                .false_positive_rate(fpr)
                .seed(seed)
                .build()?;
            let params = BloomParams::try_from(&config)?;
            let compressible =
                CompressibleBloomFilter::with_row_size(config, row_size)?;

            let mut table = Table::new();
            header(&mut table, &["Parameter", "Standard", "Compressible"]);
            table.add_row(vec![
                Cell::new("Bits"),
                Cell::new(params.bit_vector_size),
                Cell::new(compressible.params().bit_vector_size),
            ]);
            table.add_row(vec![
                Cell::new("Memory"),
                Cell::new(bits2hr(params.bit_vector_size)),
                Cell::new(bits2hr(compressible.params().bit_vector_size)),
            ]);
            table.add_row(vec![
                Cell::new("Hashes"),
                Cell::new(params.num_hashes),
                Cell::new(compressible.params().num_hashes),
            ]);
            table.add_row(vec![
                Cell::new("Predicted FPR"),
                Cell::new(format!("{:.6}", params.predicted_fpr)),
                Cell::new(format!("{:.6}", compressible.predicted_fpr())),
            ]);
            table.add_row(vec![
                Cell::new("Rows"),
                Cell::new("-"),
                Cell::new(format!(
                    "{} x {} bits",
                    compressible.row_count(),
                    compressible.row_size_bits()
                )),
            ]);
            println!("{table}");
        }

        Commands::Rounds {
            words,
            rounds,
            start_seed,
            fpr,
            report_every,
            json,
        } => {
            let mut builder = BenchmarkConfigBuilder::default()
                .rounds(rounds)
                .start_seed(start_seed);
            if let Some(fpr) = fpr {
                builder = builder.false_positive_rate(fpr);
            }
            let config = builder.build()?;
            let (words, outliers) = load_workload(&words, config.outlier_seed)?;
            let results = run_seed_rounds(&words, &outliers, &config)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
                return Ok(());
            }

            let mut table = Table::new();
            header(
                &mut table,
                &[
                    "Round",
                    "Total queries",
                    "False positives",
                    "Target FPR",
                    "Observed FPR",
                    "PFP (all queries)",
                    "Deviation",
                ],
            );
            let every = report_every.max(1);
            for round in results.iter().filter(|r| {
                (r.round + 1) % every == 0 || r.round + 1 == rounds
            }) {
                table.add_row(vec![
                    Cell::new(round.round + 1),
                    Cell::new(round.total_queries),
                    Cell::new(round.false_positives),
                    Cell::new(format!("{:.8}", round.target_fpr)),
                    Cell::new(format!("{:.8}", round.observed_fpr)),
                    Cell::new(format!("{:.8}", round.observed_fpr_all_queries)),
                    Cell::new(format!("{:+.8}", round.deviation)),
                ]);
            }
            println!("{table}");
        }

        Commands::Compress {
            words,
            seed,
            fpr,
            shrink,
            json,
        } => {
            let mut builder = BenchmarkConfigBuilder::default()
                .compression_seed(seed)
                .shrink_percentage(shrink);
            if let Some(fpr) = fpr {
                builder = builder.false_positive_rate(fpr);
            }
            let config = builder.build()?;
            let (words, outliers) = load_workload(&words, config.outlier_seed)?;
            let steps = run_compression_schedule(&words, &outliers, &config)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&steps)?);
                return Ok(());
            }

            let mut table = Table::new();
            header(
                &mut table,
                &["Step", "Filter size", "Rows", "EFPP", "OFPP", "PFP", "Diff"],
            );
            for step in &steps {
                table.add_row(vec![
                    Cell::new(step.step),
                    Cell::new(bits2hr(step.size_bits)),
                    Cell::new(step.active_rows),
                    Cell::new(format!("{:.8}", step.effective_fpp)),
                    Cell::new(format!("{:.8}", step.observed_fpr)),
                    Cell::new(format!("{:.8}", step.observed_fpr_all_queries)),
                    Cell::new(format!("{:.2}%", step.ratio_pct)),
                ]);
            }
            println!("{table}");
            println!("Filter cannot be compressed any further.");
        }
    }

    Ok(())
}
