use std::time::Duration;

use log::warn;
use reqwest::Client;

pub const API_BASE: &str = "https://api.skirmishproject.org/v1";

/// Shared HTTP client for the map, mod and featured-mode services.
#[derive(Clone)]
pub struct NetworkClient {
    client: Client,
}

impl NetworkClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|err| {
                warn!("network client: falling back to default HTTP client configuration ({err})");
                Client::new()
            });
        Self { client }
    }

    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

impl Default for NetworkClient {
    fn default() -> Self {
        Self::new()
    }
}
