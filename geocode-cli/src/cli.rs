use anyhow::Context;
use clap::{Parser, Subcommand};
use geocode_core::{
    API_KEY_ENV, Config, Credential, GeocodeResult, Place, Query, SearchOptions,
    geocoder_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "geocode", version, about = "Geoapify geocoding CLI")]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides this).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store a Geoapify API key in the config file.
    Configure,

    /// Print the location of the config file.
    ConfigPath,

    /// Geocode a free-text place description.
    Search {
        /// Place description, e.g. "New York".
        query: String,

        /// Maximum number of results.
        #[arg(long)]
        limit: Option<u32>,

        /// Response language, e.g. "en".
        #[arg(long)]
        lang: Option<String>,

        /// Request timeout in seconds; overrides the config file.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,

        /// Print one line per place instead of the raw JSON response.
        #[arg(long)]
        summary: bool,
    },
}

impl Cli {
    /// `env_key` is `GEOAPIFY_KEY` as read at process start.
    pub async fn run(self, env_key: Option<String>) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
            Command::Search { query, limit, lang, timeout, summary } => {
                let mut config = search_config(Config::load(), env_key.as_deref())?;
                if timeout.is_some() {
                    config.timeout_secs = timeout;
                }

                let geocoder = geocoder_from_config(&config, env_key)?;
                let query = Query::new(query)?;
                let options = SearchOptions { limit, lang };

                let result = geocoder
                    .geocode(&query, &options)
                    .await
                    .with_context(|| format!("Geocoding '{query}' failed"))?;

                if summary {
                    print_summary(&result);
                } else {
                    let json = serde_json::to_string_pretty(result.as_json())
                        .context("Failed to format Geoapify response")?;
                    println!("{json}");
                }

                Ok(())
            }
        }
    }
}

/// A usable `GEOAPIFY_KEY` wins over the file, so an unreadable file only
/// fails the lookup when the key would have to come from it.
fn search_config(
    loaded: geocode_core::Result<Config>,
    env_key: Option<&str>,
) -> anyhow::Result<Config> {
    match loaded {
        Ok(config) => Ok(config),
        Err(err) if env_key.is_some_and(|k| !k.trim().is_empty()) => {
            tracing::warn!(error = %err, "ignoring config file, using {API_KEY_ENV}");
            Ok(Config::default())
        }
        Err(err) => Err(err.into()),
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = inquire::Password::new("Geoapify API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    // Validate before persisting.
    Credential::new(key.trim())?;
    config.set_api_key(key.trim().to_string());
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

fn print_summary(result: &GeocodeResult) {
    let places = result.places();
    if places.is_empty() {
        println!("No results.");
        return;
    }

    for place in &places {
        println!("{}", format_place(place));
    }
}

fn format_place(place: &Place) -> String {
    let mut line = format!("{} ({:.6}, {:.6})", place.formatted, place.lat, place.lon);

    match (&place.result_type, place.confidence) {
        (Some(kind), Some(c)) => line.push_str(&format!(" [{kind}, confidence {c:.2}]")),
        (Some(kind), None) => line.push_str(&format!(" [{kind}]")),
        (None, Some(c)) => line.push_str(&format!(" [confidence {c:.2}]")),
        (None, None) => {}
    }

    line
}
