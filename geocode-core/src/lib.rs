//! Core library for the `geocode` CLI.
//!
//! This crate defines:
//! - A Geoapify forward-geocoding client
//! - Credential and configuration handling
//! - Shared domain models (queries, results) and the error taxonomy
//!
//! It is used by `geocode-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;

pub use config::{API_KEY_ENV, Config, Credential};
pub use error::{GeocodeError, Result};
pub use model::{GeocodeResult, Place, Query, SearchOptions};
pub use provider::{Geocoder, geoapify::GeoapifyClient, geocoder_from_config};

/// One-shot lookup against the public Geoapify endpoint.
///
/// The credential is checked before the query, and both before any request is made.
pub async fn geocode(query: &str, credential: &str) -> Result<GeocodeResult> {
    let credential = Credential::new(credential)?;
    let query = Query::new(query)?;

    GeoapifyClient::new(credential).geocode(&query).await
}
