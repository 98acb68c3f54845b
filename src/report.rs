use crate::address::GeneratorKind;
use crate::cache::Organization;
use crate::stattrack::StatTracker;
use linked_hash_map::LinkedHashMap;
use std::fmt;

/// Significant digits printed for a hit ratio.
const PRECISION: usize = 6;

/// Identity of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunKey {
    pub organization: Organization,
    pub generator: GeneratorKind,
    pub line_size: u32,
}

impl RunKey {
    /// Header line printed before a run's hit ratio.
    pub fn heading(&self) -> String {
        format!(
            "{} Cache Simulator for Cache Line Size: {} bytes, Memory Generator: {}",
            self.organization, self.line_size, self.generator
        )
    }
}

/// Render a percentage with up to six significant digits and no trailing zeros.
pub fn format_percent(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{}", value);
    }
    let magnitude = value.abs().log10().floor() as i64;
    let decimals = (PRECISION as i64 - 1 - magnitude).max(0) as usize;
    let text = format!("{:.*}", decimals, value);
    match text.contains('.') {
        true => text.trim_end_matches('0').trim_end_matches('.').to_string(),
        false => text,
    }
}

/// The `Report` struct collects the counters of every run in the order the runs happened. A
/// `LinkedHashMap` gives both that order and lookup by `RunKey` for the summary tables.
#[derive(Debug, Default)]
pub struct Report {
    runs: LinkedHashMap<RunKey, StatTracker>,
}

impl Report {
    pub fn new() -> Self {
        Self {
            runs: LinkedHashMap::new(),
        }
    }

    /// Store a run's counters. A repeated key replaces the earlier entry and moves to the back.
    pub fn insert(&mut self, key: RunKey, stats: StatTracker) {
        self.runs.insert(key, stats);
    }

    pub fn get(&self, key: &RunKey) -> Option<&StatTracker> {
        self.runs.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RunKey, &StatTracker)> {
        self.runs.iter()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Sum of every run made with `organization`.
    pub fn totals(&self, organization: Organization) -> StatTracker {
        self.runs
            .iter()
            .filter(|(key, _)| key.organization == organization)
            .fold(StatTracker::new(), |acc, (_, stats)| acc + *stats)
    }

    /// Generator by line size matrix of hit ratios for one organization, or `None` if that
    /// organization never ran.
    pub fn summary(&self, organization: Organization) -> Option<String> {
        let mut generators: Vec<GeneratorKind> = Vec::new();
        let mut line_sizes: Vec<u32> = Vec::new();
        self.runs
            .keys()
            .filter(|key| key.organization == organization)
            .for_each(|key| {
                if !generators.contains(&key.generator) {
                    generators.push(key.generator);
                }
                if !line_sizes.contains(&key.line_size) {
                    line_sizes.push(key.line_size);
                }
            });
        if generators.is_empty() {
            return None;
        }

        let mut table = format!("{} hit ratio (%)\n{:<10}", organization, "generator");
        line_sizes
            .iter()
            .for_each(|size| table.push_str(&format!("{:>10}", size)));
        for generator in generators {
            table.push_str(&format!("\n{:<10}", generator.label()));
            for line_size in &line_sizes {
                let key = RunKey {
                    organization,
                    generator,
                    line_size: *line_size,
                };
                let cell = match self.runs.get(&key) {
                    Some(stats) => format_percent(stats.hit_ratio()),
                    None => String::from("-"),
                };
                table.push_str(&format!("{:>10}", cell));
            }
        }
        Some(table)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, stats) in self.runs.iter() {
            writeln!(f, "{}", key.heading())?;
            writeln!(f, "Hit ratio = {}%", format_percent(stats.hit_ratio()))?;
        }
        Ok(())
    }
}
