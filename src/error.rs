use thiserror::Error;

/// Type Alias: A rebranding of the `Result` enum from the standard library which focuses on errors
/// that may result from improper configuration of the simulation.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cache line size must be a non-zero number of bytes")]
    ZeroLineSize,
    #[error("cache capacity must be a non-zero number of bytes")]
    ZeroCapacity,
    #[error("cache capacity {capacity} is not a multiple of line size {line_size}")]
    CapacityNotMultiple { capacity: u32, line_size: u32 },
    #[error("at least one cache line size is required")]
    NoLineSizes,
    #[error("at least one address generator is required")]
    NoGenerators,
    #[error("at least one cache organization is required")]
    NoOrganizations,
    #[error("iteration count must be non-zero")]
    ZeroIterations,
    #[error("trace generator selected but no trace file was given")]
    MissingTrace,
    #[error("failed to read trace file: {0}")]
    TraceIo(#[from] std::io::Error),
    #[error("trace line {line}: `{value}` is not a 32-bit address")]
    TraceParse { line: usize, value: String },
    #[error("trace file contains no addresses")]
    EmptyTrace,
}
