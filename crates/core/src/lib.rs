//! EO Protocol Core - error type and packet identifiers

mod error;
mod types;

pub use error::*;
pub use types::*;
