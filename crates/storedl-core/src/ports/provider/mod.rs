//! Content provider port definitions.
//!
//! The HTTP implementation lives in `storedl-provider`.

mod client;
mod error;

pub use client::{PayloadStream, ProviderClientPort};
pub use error::{ProviderError, ProviderResult};
