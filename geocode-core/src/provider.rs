use crate::{
    Config, GeocodeResult, Query, SearchOptions, error::Result,
    provider::geoapify::GeoapifyClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod geoapify;

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn geocode(&self, query: &Query, options: &SearchOptions) -> Result<GeocodeResult>;
}

/// Construct the Geoapify geocoder from config.
///
/// `env_key` is the value of `GEOAPIFY_KEY` read at process start; it takes
/// precedence over the key stored in the config file.
pub fn geocoder_from_config(config: &Config, env_key: Option<String>) -> Result<Box<dyn Geocoder>> {
    let credential = config.resolve_credential(env_key)?;

    let mut client = GeoapifyClient::new(credential);
    if let Some(base_url) = &config.base_url {
        client = client.with_base_url(base_url.clone());
    }
    if let Some(timeout) = config.timeout() {
        client = client.with_timeout(timeout);
    }

    Ok(Box::new(client))
}
