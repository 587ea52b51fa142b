use clap::Args;
use std::path::PathBuf;

use crate::core::io::SequenceSet;
use crate::core::seed::{weight_range, SeedPattern};
use crate::defaults;
use crate::error::{Result, SeedError};
use crate::pipelines::linear::verify::VerifyParams;

// ferrous-seed/src/seed_opt.rs
//
// Options of the seed-extend pipeline

/// Seed-extend options as given by the user; unset values are derived from
/// the input by `resolve_defaults`.
#[derive(Debug, Clone)]
pub struct SeedExtendOpt {
    // Seeding parameters
    pub seed_length: Option<usize>,  // Span of the seed pattern (-k)
    pub weight: Option<usize>,       // Care positions of the seed pattern
    pub seed_pattern: Option<String>, // Explicit pattern, e.g. "1101011"
    pub max_freq: usize,             // Skip k-mers occurring more often
    pub memlimit: Option<u64>,       // Bytes available for seed pairs
    pub overlapping_seeds: bool,     // Allow overlapping seeds in self-comparison
    pub verify_seeds: bool,          // Check every seed pair against the sequences

    // Filtering parameters
    pub log_diagbandwidth: u32,      // log2 of the diagonal band width
    pub min_coverage: Option<u32>,   // Minimum band coverage of a promising seed
    pub max_chain_links: Option<usize>, // Verify at most this many links per chain

    // Verification parameters
    pub min_identity: u32,           // Minimum percent identity of a match
    pub min_alignment_len: Option<u32>, // Minimum length of a match

    // Strands
    pub forward: bool,
    pub reverse: bool,

    // Diagnostics
    pub debug_kmer: bool,     // Keep the k-mer lists of the run
    pub debug_seedpair: bool, // Keep the seed pairs of every strand
    pub only_seeds: bool,     // Report chained links without verification

    // Processing parameters
    pub n_threads: usize,
}

/// Parameters for the seeding stage (k-mer lists and seed pairs)
#[derive(Debug, Clone)]
pub struct SeedingParams {
    pub pattern: SeedPattern,
    pub max_freq: usize,
    pub memlimit: Option<u64>,
    pub overlapping_seeds: bool,
    pub verify_seeds: bool,
    pub debug_kmer: bool,
    pub debug_seedpair: bool,
}

/// Parameters for the filtering stage (band table and chaining)
#[derive(Debug, Clone)]
pub struct FilterParams {
    pub log_diagbandwidth: u32,
    pub min_coverage: u32,
    pub max_chain_links: Option<usize>,
}

/// Fully resolved parameters of one seed-extend run
#[derive(Debug, Clone)]
pub struct SeedExtendParams {
    pub seeding: SeedingParams,
    pub filter: FilterParams,
    pub verify: VerifyParams,
    pub forward: bool,
    pub reverse: bool,
    /// Stop after chaining; links are reported unverified
    pub only_seeds: bool,
}

impl SeedExtendParams {
    #[inline]
    pub fn span(&self) -> usize {
        self.seeding.pattern.span()
    }

    /// Fewest seed pairs a sequence pair needs to reach `min_coverage`.
    pub fn min_segment_len(&self) -> usize {
        (self.filter.min_coverage as usize).saturating_sub(1) / self.span() + 1
    }
}

#[derive(Debug, Clone, Args)]
pub struct ExtendCliOptions {
    /// First sequence file (FASTA, optionally gzip/BGZF compressed)
    #[arg(value_name = "A.FA")]
    pub aseq: PathBuf,

    /// Second sequence file; compare A against itself if absent
    #[arg(value_name = "B.FA")]
    pub bseq: Option<PathBuf>,

    // ===== Seeding Options =====
    /// Seed length (span of the seed pattern) [log4 of the mean input length]
    #[arg(short = 'k', long = "seedlength", value_name = "INT")]
    pub seed_length: Option<usize>,

    /// Number of care positions of the seed pattern [middle of the valid range]
    #[arg(long, value_name = "INT")]
    pub weight: Option<usize>,

    /// Explicit seed pattern such as 1101011 (overrides -k and --weight)
    #[arg(long, value_name = "PATTERN")]
    pub seed_pattern: Option<String>,

    /// Skip k-mers occurring more than INT times
    #[arg(long = "maxfreq", value_name = "INT")]
    pub max_freq: Option<usize>,

    /// Maximum memory for seed pairs, e.g. 512MB or 2GB
    #[arg(long, value_name = "SIZE", value_parser = parse_memlimit)]
    pub memlimit: Option<u64>,

    /// Allow overlapping seeds in self-comparison
    #[arg(long = "overlappingseeds")]
    pub overlapping_seeds: bool,

    /// Check that every seed pair matches on its care positions
    #[arg(long = "verify")]
    pub verify_seeds: bool,

    // ===== Filtering Options =====
    /// Log2 of the diagonal band width (0..=10)
    #[arg(long = "diagbandwidth", value_name = "INT", default_value_t = defaults::LOG_DIAGBAND_WIDTH)]
    pub log_diagbandwidth: u32,

    /// Minimum band coverage of a promising seed [2.5 x seed length]
    #[arg(long = "mincoverage", value_name = "INT")]
    pub min_coverage: Option<u32>,

    /// Verify at most INT links of each chain [all]
    #[arg(long, value_name = "INT")]
    pub max_chain_links: Option<usize>,

    // ===== Verification Options =====
    /// Minimum percent identity of a match (70..=99)
    #[arg(long = "minidentity", value_name = "INT", default_value_t = defaults::MIN_IDENTITY)]
    pub min_identity: u32,

    /// Minimum length of a match [minimum coverage]
    #[arg(short = 'l', long = "minlen", value_name = "INT")]
    pub min_alignment_len: Option<u32>,

    /// Do not compare with the reverse complement of B
    #[arg(long)]
    pub no_reverse: bool,

    /// Do not compare with the forward strand of B
    #[arg(long)]
    pub no_forward: bool,

    // ===== Diagnostic Options =====
    /// Print the k-mer lists before the matches
    #[arg(long)]
    pub debug_kmer: bool,

    /// Print the seed pairs of every strand before the matches
    #[arg(long)]
    pub debug_seedpair: bool,

    /// Compute seeds and chains, report chained links without extending them
    #[arg(long)]
    pub only_seeds: bool,

    // ===== I/O Options =====
    /// Output file (default: stdout)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print a header line naming the output fields
    #[arg(long)]
    pub header: bool,

    /// Verbose level: 1=error, 2=warning, 3=message, 4=debug, 5+=trace
    #[arg(short = 'v', long, value_name = "INT", default_value_t = defaults::VERBOSITY)]
    pub verbosity: u8,

    // ===== Processing Options =====
    /// Number of threads (default: all available cores)
    #[arg(short = 't', long, value_name = "INT")]
    pub threads: Option<usize>,
}

impl ExtendCliOptions {
    /// Build the library options from the command line.
    pub fn to_opt(&self) -> SeedExtendOpt {
        SeedExtendOpt {
            seed_length: self.seed_length,
            weight: self.weight,
            seed_pattern: self.seed_pattern.clone(),
            max_freq: self.max_freq.unwrap_or(defaults::MAX_FREQUENCY),
            memlimit: self.memlimit,
            overlapping_seeds: self.overlapping_seeds,
            verify_seeds: self.verify_seeds,
            log_diagbandwidth: self.log_diagbandwidth,
            min_coverage: self.min_coverage,
            max_chain_links: self.max_chain_links,
            min_identity: self.min_identity,
            min_alignment_len: self.min_alignment_len,
            forward: !self.no_forward,
            reverse: !self.no_reverse,
            debug_kmer: self.debug_kmer,
            debug_seedpair: self.debug_seedpair,
            only_seeds: self.only_seeds,
            n_threads: self.threads.unwrap_or_else(num_cpus::get),
        }
    }
}

/// Parse a memory size such as `512MB`, `2GB` or `64KB` into bytes.
pub fn parse_memlimit(s: &str) -> std::result::Result<u64, String> {
    let upper = s.trim().to_ascii_uppercase();
    let (digits, shift) = if let Some(n) = upper.strip_suffix("GB") {
        (n, 30)
    } else if let Some(n) = upper.strip_suffix("MB") {
        (n, 20)
    } else if let Some(n) = upper.strip_suffix("KB") {
        (n, 10)
    } else {
        return Err(format!(
            "Invalid memory limit '{}': expected a size with unit KB, MB or GB",
            s
        ));
    };
    let value = digits
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("Invalid memory limit '{}'", s))?;
    if value == 0 {
        return Err(format!("Memory limit must be positive, got '{}'", s));
    }
    value
        .checked_mul(1u64 << shift)
        .ok_or_else(|| format!("Memory limit '{}' is too large", s))
}

/// `max(2, round(log4(mean_len)))`, capped at the largest supported span.
pub fn default_seed_length(mean_len: f64) -> usize {
    if mean_len <= 1.0 {
        return defaults::MIN_SEED_LENGTH;
    }
    let k = (mean_len.ln() / 4f64.ln()).round() as usize;
    k.clamp(defaults::MIN_SEED_LENGTH, defaults::MAX_SEED_LENGTH)
}

impl Default for SeedExtendOpt {
    fn default() -> Self {
        SeedExtendOpt {
            seed_length: None,
            weight: None,
            seed_pattern: None,
            max_freq: defaults::MAX_FREQUENCY,
            memlimit: None,
            overlapping_seeds: false,
            verify_seeds: false,
            log_diagbandwidth: defaults::LOG_DIAGBAND_WIDTH,
            min_coverage: None,
            max_chain_links: None,
            min_identity: defaults::MIN_IDENTITY,
            min_alignment_len: None,
            forward: true,
            reverse: true,
            debug_kmer: false,
            debug_seedpair: false,
            only_seeds: false,
            n_threads: 1,
        }
    }
}

impl SeedExtendOpt {
    /// Validate parameters for consistency across stages
    /// Returns Ok(()) if valid, or Err with description of issues
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        // Seeding validation
        if let Some(k) = self.seed_length {
            if !(1..=defaults::MAX_SEED_LENGTH).contains(&k) {
                errors.push(format!(
                    "seed length must be in [1, {}], got {}",
                    defaults::MAX_SEED_LENGTH,
                    k
                ));
            }
        }
        if self.seed_pattern.is_some() && self.weight.is_some() {
            errors.push("options --seed-pattern and --weight exclude each other".to_string());
        }
        if let (Some(k), Some(w)) = (self.seed_length, self.weight) {
            if let Ok((min, max)) = weight_range(k) {
                if w < min || w > max {
                    errors.push(format!(
                        "weight must be in [{}, {}] for seed length {}, got {}",
                        min, max, k, w
                    ));
                }
            }
        }
        if self.max_freq < 1 {
            errors.push(format!("maxfreq must be >= 1, got {}", self.max_freq));
        }
        if self.memlimit == Some(0) {
            errors.push("memlimit must be positive".to_string());
        }

        // Filtering validation
        if self.log_diagbandwidth > defaults::MAX_LOG_DIAGBAND_WIDTH {
            errors.push(format!(
                "diagbandwidth must be in [0, {}], got {}",
                defaults::MAX_LOG_DIAGBAND_WIDTH,
                self.log_diagbandwidth
            ));
        }
        if self.min_coverage == Some(0) {
            errors.push("mincoverage must be >= 1".to_string());
        }
        if self.max_chain_links == Some(0) {
            errors.push("max-chain-links must be >= 1".to_string());
        }

        // Verification validation
        if !(defaults::MIN_IDENTITY_LOWER..=defaults::MIN_IDENTITY_UPPER)
            .contains(&self.min_identity)
        {
            errors.push(format!(
                "minidentity must be in [{}, {}], got {}",
                defaults::MIN_IDENTITY_LOWER,
                defaults::MIN_IDENTITY_UPPER,
                self.min_identity
            ));
        }
        if !self.forward && !self.reverse {
            errors.push("options --no-forward and --no-reverse exclude each other".to_string());
        }

        // Processing validation
        if self.n_threads < 1 {
            errors.push(format!("threads must be >= 1, got {}", self.n_threads));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Seed pattern for the given inputs: the explicit pattern, or the
    /// pre-tuned pattern for the (possibly derived) span and weight.
    pub fn seed_pattern_for(&self, aset: &SequenceSet, bset: Option<&SequenceSet>) -> Result<SeedPattern> {
        if let Some(s) = &self.seed_pattern {
            let pattern: SeedPattern = s.parse()?;
            if let Some(k) = self.seed_length {
                if k != pattern.span() {
                    return Err(SeedError::InvalidOption(format!(
                        "seed length {} differs from the span {} of pattern {}",
                        k,
                        pattern.span(),
                        s
                    )));
                }
            }
            return Ok(pattern);
        }

        let span = match self.seed_length {
            Some(k) => k,
            None => {
                let atotal = aset.total_len() as f64;
                let btotal = bset.map_or(atotal, |b| b.total_len() as f64);
                let k = default_seed_length((atotal + btotal) / 2.0);
                log::info!("Derived seed length {} from the input size", k);
                k
            }
        };
        let (min, max) = weight_range(span)?;
        let weight = self.weight.unwrap_or((min + max) / 2);
        SeedPattern::from_span_weight(span, weight)
    }

    /// Fill in every unset value and bundle the stage parameters.
    pub fn resolve_defaults(
        &self,
        aset: &SequenceSet,
        bset: Option<&SequenceSet>,
    ) -> Result<SeedExtendParams> {
        if let Err(errors) = self.validate() {
            return Err(SeedError::InvalidOption(errors.join("; ")));
        }

        let pattern = self.seed_pattern_for(aset, bset)?;
        let min_coverage = self
            .min_coverage
            .unwrap_or((defaults::MIN_COVERAGE_FACTOR * pattern.span() as f64) as u32);
        let min_length = self.min_alignment_len.unwrap_or(min_coverage);

        Ok(SeedExtendParams {
            seeding: SeedingParams {
                pattern,
                max_freq: self.max_freq,
                memlimit: self.memlimit,
                overlapping_seeds: self.overlapping_seeds,
                verify_seeds: self.verify_seeds,
                debug_kmer: self.debug_kmer,
                debug_seedpair: self.debug_seedpair,
            },
            filter: FilterParams {
                log_diagbandwidth: self.log_diagbandwidth,
                min_coverage,
                max_chain_links: self.max_chain_links,
            },
            verify: VerifyParams {
                error_percentage: 100 - self.min_identity,
                min_identity: self.min_identity as f64,
                min_length,
            },
            forward: self.forward,
            reverse: self.reverse,
            only_seeds: self.only_seeds,
        })
    }
}
