mod normalized;
mod raw;

pub use normalized::{LinkerFlags, NormalizedLinkerConfig};
pub use raw::RawLinkerConfig;
