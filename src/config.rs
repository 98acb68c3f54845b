use crate::address::GeneratorKind;
use crate::cache::{CacheGeometry, Organization, Replacement};
use crate::error::{Error, Result};
use crate::{ITERATIONS, LINE_SIZES, SIZE_CACHE};
use clap::Parser;
use std::env;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Estimate cache hit ratios over synthetic address streams", long_about = None)]
pub struct Config {
    /// Number of addresses fed to every cache configuration
    #[arg(long, default_value_t = env_or_default_u64("SIM_ITERATIONS", ITERATIONS))]
    pub iterations: u64,

    /// Total cache capacity in bytes
    #[arg(long, default_value_t = env_or_default_u32("SIM_CACHE_SIZE", SIZE_CACHE))]
    pub cache_size: u32,

    /// Cache line sizes in bytes, comma separated
    #[arg(long, env = "SIM_LINE_SIZES", value_delimiter = ',', default_values_t = LINE_SIZES)]
    pub line_sizes: Vec<u32>,

    /// Address generators, comma separated
    #[arg(long, env = "SIM_GENERATORS", value_enum, value_delimiter = ',', default_values_t = GeneratorKind::SYNTHETIC)]
    pub generators: Vec<GeneratorKind>,

    /// Cache organizations, comma separated
    #[arg(long, env = "SIM_ORGANIZATIONS", value_enum, value_delimiter = ',', default_values_t = Organization::ALL)]
    pub organizations: Vec<Organization>,

    /// Victim selection for the fully associative cache
    #[arg(long, env = "SIM_REPLACEMENT", value_enum, default_value_t = Replacement::Random)]
    pub replacement: Replacement,

    /// Rewind the rng and generator cursors before every run
    #[arg(long, default_value_t = env_or_default_bool("SIM_RESET_GENERATORS", false))]
    pub reset_generators: bool,

    /// Text file of addresses to replay as an extra generator
    #[arg(long, env = "SIM_FILE_TRACE")]
    pub trace: Option<PathBuf>,

    /// Print a generator by line size table per organization after all runs
    #[arg(long)]
    pub summary: bool,

    /// Show a progress bar on stderr
    #[arg(long)]
    pub progress: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Check the configuration for values that would make the simulation meaningless or divide
    /// by zero.
    ///
    /// # Errors
    ///
    /// Every list must be non-empty, the iteration count non-zero, and the cache capacity a
    /// positive multiple of every line size. Selecting the trace generator requires a trace file.
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::ZeroIterations);
        }
        if self.line_sizes.is_empty() {
            return Err(Error::NoLineSizes);
        }
        if self.generators.is_empty() && self.trace.is_none() {
            return Err(Error::NoGenerators);
        }
        if self.organizations.is_empty() {
            return Err(Error::NoOrganizations);
        }
        if self.generators.contains(&GeneratorKind::Trace) && self.trace.is_none() {
            return Err(Error::MissingTrace);
        }
        self.line_sizes
            .iter()
            .try_for_each(|line_size| self.geometry(*line_size).map(|_| ()))
    }

    /// Selected generators in run order. A trace file adds the trace generator at the end unless
    /// it was already listed.
    pub fn generator_kinds(&self) -> Vec<GeneratorKind> {
        let mut kinds = self.generators.clone();
        if self.trace.is_some() && !kinds.contains(&GeneratorKind::Trace) {
            kinds.push(GeneratorKind::Trace);
        }
        kinds
    }

    pub fn geometry(&self, line_size: u32) -> Result<CacheGeometry> {
        CacheGeometry::build(self.cache_size, line_size)
    }

    pub fn display(&self) {
        println!("simulation configuration values: ");
        println!("{:#?}", self);
    }
}

fn env_or_default_u32(varname: &str, default: u32) -> u32 {
    match env::var(varname) {
        Ok(val) => val.trim().parse().unwrap_or_else(|_| {
            eprintln!("expected unsigned int for env var: '{}', using {}", varname, default);
            default
        }),
        _ => default,
    }
}

fn env_or_default_u64(varname: &str, default: u64) -> u64 {
    match env::var(varname) {
        Ok(val) => val.trim().parse().unwrap_or_else(|_| {
            eprintln!("expected unsigned int for env var: '{}', using {}", varname, default);
            default
        }),
        _ => default,
    }
}

fn env_or_default_bool(varname: &str, default: bool) -> bool {
    match env::var(varname) {
        Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                eprintln!("expected boolean for env var: '{}', using {}", varname, default);
                default
            }
        },
        _ => default,
    }
}
