//! Relay configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`):
//!
//! | Variable                   | Default                                |
//! |----------------------------|----------------------------------------|
//! | `PORT`                     | `4000`                                 |
//! | `HOST`                     | `0.0.0.0`                              |
//! | `CLIENT_URL`               | `https://v0-dealsfinder221.vercel.app` |
//! | `OUTBOUND_BUFFER_CAPACITY` | `256`                                  |

use std::net::{IpAddr, SocketAddr};

/// Origin allowed when `CLIENT_URL` is not set.
pub const DEFAULT_CLIENT_URL: &str = "https://v0-dealsfinder221.vercel.app";

/// Origins allowed in addition to `CLIENT_URL`.
pub const EXTRA_ALLOWED_ORIGINS: [&str; 2] =
    ["http://localhost:3000", "https://dealsfinder221.vercel.app"];

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to.
    pub listen_addr: SocketAddr,

    /// Origins allowed through the cross-origin gate. `CLIENT_URL` first.
    pub allowed_origins: Vec<String>,

    /// Events buffered per connection before new ones are dropped.
    pub outbound_buffer_capacity: usize,
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` or `HOST` is set but cannot be parsed.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` or `HOST` is present but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT").filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => raw.trim().parse()?,
            None => 4000,
        };
        let host: IpAddr = match lookup("HOST").filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => raw.trim().parse()?,
            None => IpAddr::from([0, 0, 0, 0]),
        };

        let client_url = lookup("CLIENT_URL")
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_CLIENT_URL.to_string());
        let mut allowed_origins = vec![client_url];
        allowed_origins.extend(EXTRA_ALLOWED_ORIGINS.iter().map(ToString::to_string));

        let outbound_buffer_capacity = parse_or(&lookup, "OUTBOUND_BUFFER_CAPACITY", 256);

        Ok(Self {
            listen_addr: SocketAddr::new(host, port),
            allowed_origins,
            outbound_buffer_capacity,
        })
    }
}

/// Parses `key` as `T`, returning `default` on missing or invalid values.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
