use crate::error::{Error, Result};
use crate::rng::MwcRng;
use crate::SIZE_DRAM;
use clap::ValueEnum;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const SPAN_RANDOM_NARROW: u32 = 24 * 1024;
const SPAN_SEQUENTIAL_4K: u32 = 4 * 1024;
const SPAN_SEQUENTIAL_64K: u32 = 64 * 1024;
const SPAN_STRIDED: u32 = 64 * 4 * 1024;
const STRIDE: u32 = 32;

/// `GeneratorKind` names an access pattern without carrying any of its state. It is the value
/// users select on the command line; the driver turns each selected kind into an
/// `AddressGenerator` once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum GeneratorKind {
    /// walk the whole simulated DRAM one byte at a time
    #[value(name = "sequential-full")]
    SequentialFull,
    /// uniform random addresses within the first 24 KiB
    #[value(name = "random-narrow")]
    RandomNarrow,
    /// uniform random addresses across the whole simulated DRAM
    #[value(name = "random-full")]
    RandomFull,
    /// walk the first 4 KiB one byte at a time
    #[value(name = "sequential-4k")]
    Sequential4K,
    /// walk the first 64 KiB one byte at a time
    #[value(name = "sequential-64k")]
    Sequential64K,
    /// walk the first 256 KiB in 32-byte steps
    #[value(name = "strided")]
    Strided,
    /// replay the addresses of a trace file
    #[value(name = "trace")]
    Trace,
}

impl GeneratorKind {
    /// The six synthetic generators, in reporting order.
    pub const SYNTHETIC: [GeneratorKind; 6] = [
        GeneratorKind::SequentialFull,
        GeneratorKind::RandomNarrow,
        GeneratorKind::RandomFull,
        GeneratorKind::Sequential4K,
        GeneratorKind::Sequential64K,
        GeneratorKind::Strided,
    ];

    /// Name used in the per-run report line.
    pub fn label(&self) -> &'static str {
        match self {
            GeneratorKind::SequentialFull => "memGen1",
            GeneratorKind::RandomNarrow => "memGen2",
            GeneratorKind::RandomFull => "memGen3",
            GeneratorKind::Sequential4K => "memGen4",
            GeneratorKind::Sequential64K => "memGen5",
            GeneratorKind::Strided => "memGen6",
            GeneratorKind::Trace => "trace",
        }
    }
}

impl std::fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// `AddressTrace` holds the full list of addresses read from a trace file. Future users should
/// ensure the file contains only address numbers (no header information), one per line, in
/// decimal or `0x`-prefixed hexadecimal. Blank lines are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressTrace(Vec<u32>);

impl AddressTrace {
    /// Read every address in the file at `path` into memory.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or read, if any line is not a valid 32-bit address, or
    /// if the file holds no addresses at all.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Same as `load`, but reading from any buffered source.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut addresses = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                Some(hex) => u32::from_str_radix(hex, 16),
                None => text.parse::<u32>(),
            };
            match parsed {
                Ok(address) => addresses.push(address),
                Err(_) => {
                    return Err(Error::TraceParse {
                        line: index + 1,
                        value: text.to_string(),
                    })
                }
            }
        }
        match addresses.is_empty() {
            true => Err(Error::EmptyTrace),
            false => Ok(Self(addresses)),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u32>> for AddressTrace {
    fn from(value: Vec<u32>) -> Self {
        Self(value)
    }
}

/// An `AddressGenerator` produces the next simulated memory address each time `next` is called.
/// Sequential variants own a private cursor that keeps advancing for as long as the generator
/// lives; random variants hold no state of their own and draw from the shared `MwcRng` instead.
/// Generators never observe cache state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressGenerator {
    SequentialFull { cursor: u32 },
    RandomNarrow,
    RandomFull,
    Sequential4K { cursor: u32 },
    Sequential64K { cursor: u32 },
    Strided { cursor: u32 },
    Trace { trace: AddressTrace, cursor: usize },
}

impl AddressGenerator {
    /// Create a generator of the given kind with its cursor at zero.
    ///
    /// # Errors
    ///
    /// `GeneratorKind::Trace` needs addresses to replay; use `AddressGenerator::replay` instead.
    pub fn build(kind: GeneratorKind) -> Result<Self> {
        Ok(match kind {
            GeneratorKind::SequentialFull => Self::SequentialFull { cursor: 0 },
            GeneratorKind::RandomNarrow => Self::RandomNarrow,
            GeneratorKind::RandomFull => Self::RandomFull,
            GeneratorKind::Sequential4K => Self::Sequential4K { cursor: 0 },
            GeneratorKind::Sequential64K => Self::Sequential64K { cursor: 0 },
            GeneratorKind::Strided => Self::Strided { cursor: 0 },
            GeneratorKind::Trace => return Err(Error::MissingTrace),
        })
    }

    /// Create a generator that cycles through the addresses of `trace`.
    ///
    /// # Errors
    ///
    /// An empty trace has nothing to replay and is rejected.
    pub fn replay(trace: AddressTrace) -> Result<Self> {
        match trace.is_empty() {
            true => Err(Error::EmptyTrace),
            false => Ok(Self::Trace { trace, cursor: 0 }),
        }
    }

    pub fn kind(&self) -> GeneratorKind {
        match self {
            Self::SequentialFull { .. } => GeneratorKind::SequentialFull,
            Self::RandomNarrow => GeneratorKind::RandomNarrow,
            Self::RandomFull => GeneratorKind::RandomFull,
            Self::Sequential4K { .. } => GeneratorKind::Sequential4K,
            Self::Sequential64K { .. } => GeneratorKind::Sequential64K,
            Self::Strided { .. } => GeneratorKind::Strided,
            Self::Trace { .. } => GeneratorKind::Trace,
        }
    }

    /// Produce the next address. Wrapping at the end of a pattern's span is silent.
    ///
    /// # Arguments
    ///
    /// * `rng` - the shared random source, consumed only by the random variants.
    ///
    pub fn next(&mut self, rng: &mut MwcRng) -> u32 {
        match self {
            Self::SequentialFull { cursor } => post_increment(cursor) % SIZE_DRAM,
            Self::RandomNarrow => rng.next_u32() % SPAN_RANDOM_NARROW,
            Self::RandomFull => rng.next_u32() % SIZE_DRAM,
            Self::Sequential4K { cursor } => post_increment(cursor) % SPAN_SEQUENTIAL_4K,
            Self::Sequential64K { cursor } => post_increment(cursor) % SPAN_SEQUENTIAL_64K,
            Self::Strided { cursor } => {
                *cursor = cursor.wrapping_add(STRIDE);
                *cursor % SPAN_STRIDED
            }
            Self::Trace { trace, cursor } => {
                let address = trace.0.get(*cursor).copied().unwrap_or_default();
                *cursor = (*cursor + 1) % trace.0.len().max(1);
                address
            }
        }
    }

    /// Rewind the cursor to zero. Random variants are unaffected; their state lives in the rng.
    pub fn reset(&mut self) {
        match self {
            Self::SequentialFull { cursor }
            | Self::Sequential4K { cursor }
            | Self::Sequential64K { cursor }
            | Self::Strided { cursor } => *cursor = 0,
            Self::Trace { cursor, .. } => *cursor = 0,
            Self::RandomNarrow | Self::RandomFull => {}
        }
    }
}

fn post_increment(cursor: &mut u32) -> u32 {
    let value = *cursor;
    *cursor = cursor.wrapping_add(1);
    value
}
