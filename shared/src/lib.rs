/*!
# Shared Types and Utilities

This crate contains the sample math and line format used by the angle sweeper.
It has no I/O of its own beyond writing into any [`std::io::Write`] sink.

## Core Types

- [`AngleSample`] - cosine/sine pair for one integer degree
- [`SampleFormat`] - fixed-point rendering of a sample as a text line
- [`Sweep`] - the 360 samples of one full rotation

## Modules

- [`sample`] - sample computation and line rendering
- [`sweep`] - sweep iteration
- [`error`] - Common error types
*/

pub mod error;
pub mod sample;
pub mod sweep;

// Re-export commonly used types
pub use error::{SharedError, Result};
pub use sample::{AngleSample, SampleFormat};
pub use sweep::Sweep;

/// Version information for the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Line protocol constants
pub mod protocol {
    /// Number of samples (degrees) in one sweep
    pub const DEGREES_PER_SWEEP: u16 = 360;

    /// Separator between the fields of a line
    pub const FIELD_SEPARATOR: char = '\t';

    /// Line terminator
    pub const LINE_TERMINATOR: char = '\n';

    /// Constant third field of every line
    pub const SAMPLE_MARKER: u8 = 1;

    /// Default number of fractional digits for cos/sin
    pub const DEFAULT_PRECISION: usize = 6;

    /// Largest precision accepted; f64 carries no more significant digits past this
    pub const MAX_PRECISION: usize = 17;

    /// Default serial baud rate
    pub const DEFAULT_BAUD_RATE: u32 = 9600;

    /// Bits on the wire per transmitted byte (8N1: start + 8 data + stop)
    pub const BITS_PER_BYTE: u32 = 10;
}
