pub mod address;
pub mod cache;
pub mod config;
pub mod error;
pub mod report;
pub mod rng;
pub mod stattrack;

use address::{AddressGenerator, AddressTrace, GeneratorKind};
use cache::{Cache, CacheGeometry, Organization, Replacement};
use config::Config;
use error::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use report::{format_percent, Report, RunKey};
use rng::MwcRng;
use stattrack::StatTracker;

/// Size of the simulated DRAM address space in bytes.
pub const SIZE_DRAM: u32 = 64 * 1024 * 1024;
/// Default total cache capacity in bytes.
pub const SIZE_CACHE: u32 = 64 * 1024;
/// Default number of addresses fed to each cache configuration.
pub const ITERATIONS: u64 = 1_000_000;
/// Default cache line sizes in bytes.
pub const LINE_SIZES: [u32; 4] = [16, 32, 64, 128];

/// Whether generator and rng state carries over from one run to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResetPolicy {
    /// one rng and one set of generator cursors for the whole simulation
    #[default]
    Preserve,
    /// rng and every cursor rewound before each run
    PerRun,
}

/// A structure which contains the core elements required to run a simulation. Generators and the
/// rng live as long as the `Simulation`; caches are built fresh for every run and dropped when
/// the run finishes.
pub struct Simulation {
    rng: MwcRng,
    generators: Vec<AddressGenerator>,
    geometries: Vec<CacheGeometry>,
    organizations: Vec<Organization>,
    iterations: u64,
    replacement: Replacement,
    reset: ResetPolicy,
}

impl Simulation {
    /// Create a simulation over both organizations with random replacement and carried-over
    /// generator state.
    ///
    /// # Arguments
    ///
    /// * `capacity` - total cache size in bytes, shared by every configuration.
    /// * `line_sizes` - line sizes to try, in run order.
    /// * `generators` - address generators to try, in run order.
    /// * `iterations` - number of addresses per run.
    ///
    /// # Errors
    ///
    /// Fails if any list is empty, `iterations` is zero, or `capacity` is not a positive multiple
    /// of every line size.
    pub fn build(
        capacity: u32,
        line_sizes: &[u32],
        generators: Vec<AddressGenerator>,
        iterations: u64,
    ) -> Result<Self> {
        if iterations == 0 {
            return Err(Error::ZeroIterations);
        }
        if line_sizes.is_empty() {
            return Err(Error::NoLineSizes);
        }
        if generators.is_empty() {
            return Err(Error::NoGenerators);
        }
        let geometries = line_sizes
            .iter()
            .map(|line_size| CacheGeometry::build(capacity, *line_size))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rng: MwcRng::new(),
            generators,
            geometries,
            organizations: Organization::ALL.to_vec(),
            iterations,
            replacement: Replacement::default(),
            reset: ResetPolicy::default(),
        })
    }

    /// Build a simulation from validated command-line configuration, loading the trace file if
    /// one was given.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let trace = match &config.trace {
            Some(path) => Some(AddressTrace::load(path)?),
            None => None,
        };
        let generators = config
            .generator_kinds()
            .into_iter()
            .map(|kind| match (kind, &trace) {
                (GeneratorKind::Trace, Some(trace)) => AddressGenerator::replay(trace.clone()),
                _ => AddressGenerator::build(kind),
            })
            .collect::<Result<Vec<_>>>()?;

        let reset = match config.reset_generators {
            true => ResetPolicy::PerRun,
            false => ResetPolicy::Preserve,
        };
        Ok(
            Self::build(config.cache_size, &config.line_sizes, generators, config.iterations)?
                .with_organizations(&config.organizations)?
                .with_replacement(config.replacement)
                .with_reset_policy(reset),
        )
    }

    /// Restrict the simulation to the given organizations. They still run in the order
    /// direct-mapped first, then fully associative.
    pub fn with_organizations(mut self, organizations: &[Organization]) -> Result<Self> {
        let selected: Vec<Organization> = Organization::ALL
            .into_iter()
            .filter(|organization| organizations.contains(organization))
            .collect();
        match selected.is_empty() {
            true => Err(Error::NoOrganizations),
            false => {
                self.organizations = selected;
                Ok(self)
            }
        }
    }

    pub fn with_replacement(mut self, replacement: Replacement) -> Self {
        self.replacement = replacement;
        self
    }

    pub fn with_reset_policy(mut self, reset: ResetPolicy) -> Self {
        self.reset = reset;
        self
    }

    /// Total number of runs `run` will perform.
    pub fn run_count(&self) -> usize {
        self.organizations.len() * self.generators.len() * self.geometries.len()
    }

    /// Feed `iterations` addresses from one generator into a fresh cache and count the hits.
    fn run_one(
        &mut self,
        organization: Organization,
        generator: usize,
        geometry: CacheGeometry,
    ) -> StatTracker {
        if self.reset == ResetPolicy::PerRun {
            self.rng.reset();
            self.generators[generator].reset();
        }
        let mut cache = Cache::build(organization, geometry, self.replacement);
        let mut stats = StatTracker::new();
        for _ in 0..self.iterations {
            let address = self.generators[generator].next(&mut self.rng);
            stats.record(cache.access(address, &mut self.rng));
        }
        stats
    }

    /// Run every organization, generator and line size combination: all direct-mapped runs
    /// first, then all fully associative ones, each ordered by generator and then line size.
    /// `on_run` sees each result as soon as its run completes.
    pub fn run<F>(&mut self, mut on_run: F) -> Report
    where
        F: FnMut(&RunKey, &StatTracker),
    {
        let mut report = Report::new();
        for organization in self.organizations.clone() {
            for generator in 0..self.generators.len() {
                for geometry in self.geometries.clone() {
                    let key = RunKey {
                        organization,
                        generator: self.generators[generator].kind(),
                        line_size: geometry.line_size(),
                    };
                    info!(
                        "{} cache, {} lines of {} bytes, {}",
                        organization,
                        geometry.line_count(),
                        geometry.line_size(),
                        key.generator
                    );
                    let stats = self.run_one(organization, generator, geometry);
                    debug!("{} hits, {} misses", stats.hits, stats.misses);
                    on_run(&key, &stats);
                    report.insert(key, stats);
                }
            }
        }
        report
    }
}

fn progress_bar(enabled: bool, runs: usize) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(runs as u64);
    if let Ok(style) = ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
    {
        bar.set_style(style);
    }
    bar
}

/// Build the simulation described by `config`, print each run's hit ratio as it finishes, and
/// return the collected report.
pub fn run_simulation(config: Config) -> Result<Report> {
    let mut simulation = Simulation::from_config(&config)?;
    let progress = progress_bar(config.progress, simulation.run_count());

    let report = simulation.run(|key, stats| {
        progress.suspend(|| {
            println!("{}", key.heading());
            println!("Hit ratio = {}%", format_percent(stats.hit_ratio()));
        });
        progress.inc(1);
    });
    progress.finish_with_message("done");

    if config.summary {
        for organization in Organization::ALL {
            if let Some(table) = report.summary(organization) {
                println!();
                println!("{}", table);
                println!("{}", report.totals(organization));
            }
        }
    }
    Ok(report)
}
