//! HTTP adapter for the content provider.
//!
//! Implements [`storedl_core::ProviderClientPort`] on top of reqwest. The
//! provider exposes one JSON manifest per version and serves each payload
//! file as a plain byte stream; both require a bearer session token.
//!
//! ```text
//! GET {base}/versions/{version}/manifest?mode=download|verify
//! GET {file.url}   (relative URLs resolve against {base})
//! ```
#![deny(unsafe_code)]
// ProviderClient<B> is meant to be used through ProviderClientPort, not its
// generic structure
#![allow(private_interfaces)]

mod client;
mod config;
mod endpoints;
mod error;
mod http;
mod models;
mod port;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::HttpProviderClient;

// Configuration
pub use config::ProviderClientConfig;

// Construction errors
pub use error::ProviderHttpError;
