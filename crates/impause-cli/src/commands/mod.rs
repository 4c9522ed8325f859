pub mod auth;
pub mod buddy;
pub mod config;
pub mod history;
pub mod reflect;
pub mod wrapped;

use impause_core::Config;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// HTTP client honouring the configured timeout.
pub fn http_client(config: &Config) -> Result<reqwest::Client, Box<dyn std::error::Error>> {
    Ok(config.http.client()?)
}
