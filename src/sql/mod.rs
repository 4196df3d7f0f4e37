//! Safe SQL builder: identifiers from schemas only, values as named parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
