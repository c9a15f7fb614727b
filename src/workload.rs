//! Measurement harness: word lists, adversarial outliers that are guaranteed
//! absent from the list, and the two false positive experiments (many seeds
//! at full size, one filter across a compression schedule).
use crate::bloom::{BloomError, BloomFilter, BloomFilterOps, BloomFilterStats};
use crate::compressible::CompressibleBloomFilter;
use derive_builder::Builder;
use rand::{Rng, SeedableRng, distr::Alphanumeric, rngs::StdRng};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const OUTLIER_TOKEN_COUNT: usize = 120;
const OUTLIER_TOKEN_LEN: usize = 5;

pub type WorkloadResult<T> = std::result::Result<T, WorkloadError>;

#[derive(Error, Debug)]
pub enum WorkloadError {
    #[error("Failed to read word list {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Word list {0:?} contains no words")]
    EmptyWordList(PathBuf),

    #[error("Inserted key not found: {0}")]
    FalseNegative(String),

    #[error(transparent)]
    Filter(#[from] BloomError),
}

#[derive(Clone, Debug, Builder)]
#[builder(pattern = "owned")]
pub struct BenchmarkConfig {
    /// Number of seeded filters built by [`run_seed_rounds`]
    #[builder(default = "1000")]
    pub rounds: u64,

    /// Seed of the first round, incremented per round
    #[builder(default = "0")]
    pub start_seed: u64,

    /// Target false positive rate, `1 / word count` when unset
    #[builder(setter(strip_option), default)]
    pub false_positive_rate: Option<f64>,

    /// Percentage passed to every `compress` call
    #[builder(default = "5.0")]
    pub shrink_percentage: f64,

    /// Seed of the compressible filter
    #[builder(default = "0xA57E_C3B2")]
    pub compression_seed: u64,

    /// Seed of the random outlier tokens
    #[builder(default = "0x5EED")]
    pub outlier_seed: u64,
}

impl BenchmarkConfig {
    pub fn target_fpr(&self, word_count: usize) -> f64 {
        self.false_positive_rate
            .unwrap_or_else(|| 1.0 / word_count.max(1) as f64)
    }
}

/// Cumulative results after one seeded round.
#[derive(Debug, Clone, Serialize)]
pub struct FprRound {
    pub round: u64,
    pub seed: u64,
    pub total_queries: usize,
    pub false_positives: usize,
    pub target_fpr: f64,
    pub predicted_fpr: f64,
    /// False positives over outlier queries
    pub observed_fpr: f64,
    /// False positives over every query, words included
    pub observed_fpr_all_queries: f64,
    pub deviation: f64,
}

/// State of the compressible filter before one `compress` call.
#[derive(Debug, Clone, Serialize)]
pub struct CompressionStep {
    pub step: usize,
    pub size_bits: usize,
    pub active_rows: usize,
    pub effective_fpp: f64,
    pub observed_fpr: f64,
    pub observed_fpr_all_queries: f64,
    /// Observed over effective, in percent
    pub ratio_pct: f64,
}

/// Reads one word per line, trimmed; blank lines are skipped.
pub fn load_word_list(path: impl AsRef<Path>) -> WorkloadResult<Vec<String>> {
    let path = path.as_ref();
    let contents =
        std::fs::read_to_string(path).map_err(|source| WorkloadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let words: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect();

    if words.is_empty() {
        return Err(WorkloadError::EmptyWordList(path.to_path_buf()));
    }
    debug!(count = words.len(), ?path, "word list loaded");
    Ok(words)
}

fn reversed(s: &str) -> String {
    s.chars().rev().collect()
}

fn swap_odd_case(s: &str) -> String {
    s.chars()
        .enumerate()
        .map(|(i, c)| {
            if i % 2 == 1 && c.is_ascii_lowercase() {
                c.to_ascii_uppercase()
            } else if i % 2 == 1 && c.is_ascii_uppercase() {
                c.to_ascii_lowercase()
            } else {
                c
            }
        })
        .collect()
}

/// Builds strings that resemble the words without being drawn from them:
/// reversals and doublings of every word, a case-swapped variant, and
/// concatenations of seeded random tokens. Sorted and deduplicated; may
/// still contain words until passed through [`purify_outliers`].
pub fn generate_outliers(words: &[String], seed: u64) -> Vec<String> {
    let mut outliers = Vec::with_capacity(words.len() * 4);

    for word in words {
        let rev = reversed(word);
        if *word != rev {
            outliers.push(format!("{word}{rev}"));
            outliers.push(format!("{word}{word}"));
            outliers.push(format!("{rev}{word}{rev}"));
        }
        outliers.push(swap_odd_case(word));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let tokens: Vec<String> = (0..OUTLIER_TOKEN_COUNT)
        .map(|_| {
            (&mut rng)
                .sample_iter(Alphanumeric)
                .take(OUTLIER_TOKEN_LEN)
                .map(char::from)
                .collect()
        })
        .collect();

    let n = tokens.len();
    for i in 0..n {
        let s = |k: usize| tokens[(i + k) % n].as_str();
        let combos = [
            s(0).to_owned(),
            [s(0), s(1)].concat(),
            [s(0), s(2), s(4)].concat(),
            [s(0), s(1), s(3)].concat(),
            [s(0), s(1), s(2), s(3), s(4), s(5)].concat(),
        ];
        for combo in combos {
            outliers.push(reversed(&combo));
            outliers.push(combo);
        }
    }

    outliers.sort_unstable();
    outliers.dedup();
    outliers
}

/// Drops every outlier that also appears in `words`.
pub fn purify_outliers(words: &[String], outliers: Vec<String>) -> Vec<String> {
    let known: HashSet<&str> = words.iter().map(String::as_str).collect();
    let before = outliers.len();
    let purified: Vec<String> = outliers
        .into_iter()
        .filter(|outlier| !known.contains(outlier.as_str()))
        .collect();
    debug!(removed = before - purified.len(), "outliers purified");
    purified
}

fn count_false_positives<F: BloomFilterOps>(
    filter: &F,
    outliers: &[String],
) -> usize {
    outliers
        .iter()
        .filter(|outlier| filter.contains(outlier.as_bytes()))
        .count()
}

/// Builds one filter per seed, inserts every word, checks for false
/// negatives and counts outlier hits. Figures are cumulative over rounds;
/// the observed rate is false positives over outlier queries.
pub fn run_seed_rounds(
    words: &[String],
    outliers: &[String],
    config: &BenchmarkConfig,
) -> WorkloadResult<Vec<FprRound>> {
    let target_fpr = config.target_fpr(words.len());
    let mut rounds = Vec::new();
    let mut total_queries = 0usize;
    let mut negative_queries = 0usize;
    let mut false_positives = 0usize;

    for round in 0..config.rounds {
        let seed = config.start_seed.wrapping_add(round);
        let mut filter = BloomFilter::new(words.len(), target_fpr, seed)?;
        for word in words {
            filter.insert(word.as_bytes());
        }

        if let Some(missing) = filter.contains_all(words) {
            return Err(WorkloadError::FalseNegative(missing.clone()));
        }

        false_positives += count_false_positives(&filter, outliers);
        total_queries += words.len() + outliers.len();
        negative_queries += outliers.len();

        let observed_fpr = if negative_queries == 0 {
            0.0
        } else {
            false_positives as f64 / negative_queries as f64
        };

        let report = FprRound {
            round,
            seed,
            total_queries,
            false_positives,
            target_fpr,
            predicted_fpr: filter.predicted_fpr(),
            observed_fpr,
            observed_fpr_all_queries: false_positives as f64
                / total_queries.max(1) as f64,
            deviation: observed_fpr - target_fpr,
        };
        debug!(
            round,
            total_queries,
            false_positives,
            observed_fpr,
            deviation = report.deviation,
            "round complete"
        );
        rounds.push(report);
    }

    Ok(rounds)
}

/// Inserts every word into one compressible filter, then alternates
/// measurement and `compress` until the filter refuses to shrink.
pub fn run_compression_schedule(
    words: &[String],
    outliers: &[String],
    config: &BenchmarkConfig,
) -> WorkloadResult<Vec<CompressionStep>> {
    let mut filter = CompressibleBloomFilter::new(
        words.len(),
        config.target_fpr(words.len()),
        config.compression_seed,
    )?;
    for word in words {
        filter.insert(word.as_bytes());
    }

    let mut steps = Vec::new();
    let mut total_queries = 0usize;
    let mut negative_queries = 0usize;
    let mut false_positives = 0usize;

    loop {
        if let Some(missing) = filter.contains_all(words) {
            return Err(WorkloadError::FalseNegative(missing.clone()));
        }

        false_positives += count_false_positives(&filter, outliers);
        total_queries += words.len() + outliers.len();
        negative_queries += outliers.len();

        let effective_fpp = filter.effective_fpp();
        let observed_fpr = if negative_queries == 0 {
            0.0
        } else {
            false_positives as f64 / negative_queries as f64
        };
        let ratio_pct = if effective_fpp > 0.0 {
            100.0 * observed_fpr / effective_fpp
        } else {
            0.0
        };

        let step = CompressionStep {
            step: steps.len(),
            size_bits: filter.size(),
            active_rows: filter.active_row_count(),
            effective_fpp,
            observed_fpr,
            observed_fpr_all_queries: false_positives as f64
                / total_queries.max(1) as f64,
            ratio_pct,
        };
        info!(
            size_bits = step.size_bits,
            effective_fpp, observed_fpr, ratio_pct, "compression step"
        );
        steps.push(step);

        if !filter.compress(config.shrink_percentage) {
            info!("filter cannot be compressed any further");
            break;
        }
    }

    Ok(steps)
}
