//! Binary crate for the `geocode` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Printing the geocoding response

use clap::Parser;
use geocode_core::API_KEY_ENV;

mod cli;
mod logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cmd = cli::Cli::parse();
    logger::init(cmd.verbose);

    // Read once; the client gets the key explicitly from here on.
    let env_key = std::env::var(API_KEY_ENV).ok();

    cmd.run(env_key).await
}
