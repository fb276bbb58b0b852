//! Assembly of downloaded parts into one output artifact.
//!
//! - [`AssemblyPipeline`] - single-part move or tool-driven concatenation
//! - [`Toolchain`] - startup-time discovery of the required external tools
//! - [`Concatenator`] / [`PageConverter`] - narrow tool seams with test
//!   doubles substitutable

mod error;
mod pipeline;
mod tools;

pub use error::{AssemblyError, ConfigError};
pub use pipeline::AssemblyPipeline;
pub use tools::{
    Concatenator, MagickConverter, PageConverter, PdftkConcatenator, StaplerConcatenator,
    Toolchain, find_concatenator,
};
