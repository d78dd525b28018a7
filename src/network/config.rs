//! Network Configuration
//!
//! Endpoint, chain id and timing knobs for the gateway. Defaults target the
//! Sepolia test network; every field can be overridden from the environment.

use std::env;
use std::time::Duration;
use url::Url;

use crate::error::{OnyxError, OnyxResult};

/// Sepolia chain id
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

pub const DEFAULT_RPC_URL: &str = "https://ethereum-sepolia.publicnode.com";

pub const ENV_RPC_URL: &str = "ONYX_RPC_URL";
pub const ENV_CHAIN_ID: &str = "ONYX_CHAIN_ID";
pub const ENV_POLL_INTERVAL_MS: &str = "ONYX_POLL_INTERVAL_MS";
pub const ENV_CONFIRMATION_TIMEOUT_SECS: &str = "ONYX_CONFIRMATION_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    /// Delay between receipt polls while awaiting confirmation
    pub poll_interval: Duration,
    /// Upper bound on the whole confirmation wait
    pub confirmation_timeout: Duration,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: SEPOLIA_CHAIN_ID,
            poll_interval: Duration::from_secs(4),
            confirmation_timeout: Duration::from_secs(180),
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl NetworkConfig {
    pub fn new(rpc_url: impl Into<String>, chain_id: u64) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id,
            ..Self::default()
        }
    }

    /// Defaults overridden by `ONYX_*` environment variables
    pub fn from_env() -> OnyxResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var(ENV_RPC_URL) {
            config.rpc_url = url;
        }
        if let Some(chain_id) = parse_env_u64(ENV_CHAIN_ID)? {
            config.chain_id = chain_id;
        }
        if let Some(ms) = parse_env_u64(ENV_POLL_INTERVAL_MS)? {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_env_u64(ENV_CONFIRMATION_TIMEOUT_SECS)? {
            config.confirmation_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject endpoints that would leak requests in cleartext or timing
    /// values that make confirmation impossible
    pub fn validate(&self) -> OnyxResult<()> {
        let parsed = Url::parse(&self.rpc_url)?;

        match parsed.scheme() {
            "https" => {}
            "http" if is_loopback(&parsed) => {}
            "http" => {
                return Err(OnyxError::network_error("HTTPS required for remote endpoints")
                    .with_details(self.rpc_url.clone()))
            }
            other => {
                return Err(OnyxError::network_error(format!("Unsupported URL scheme: {}", other)))
            }
        }

        if self.chain_id == 0 {
            return Err(OnyxError::network_error("Chain id must be non-zero"));
        }
        if self.poll_interval.is_zero() || self.poll_interval >= self.confirmation_timeout {
            return Err(OnyxError::network_error(
                "Poll interval must be positive and shorter than the confirmation timeout",
            ));
        }
        Ok(())
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host_str() {
        Some(host) => host == "localhost" || host == "127.0.0.1" || host == "[::1]",
        None => false,
    }
}

fn parse_env_u64(name: &str) -> OnyxResult<Option<u64>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| OnyxError::network_error(format!("{} must be an unsigned integer, got {:?}", name, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_sepolia() {
        let config = NetworkConfig::default();
        assert_eq!(config.chain_id, 11155111);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_https_required_for_remote() {
        assert!(NetworkConfig::new("http://rpc.example.org", 1).validate().is_err());
        assert!(NetworkConfig::new("http://127.0.0.1:8545", 31337).validate().is_ok());
        assert!(NetworkConfig::new("http://localhost:8545", 31337).validate().is_ok());
        assert!(NetworkConfig::new("ws://127.0.0.1:8546", 1).validate().is_err());
        assert!(NetworkConfig::new("not a url", 1).validate().is_err());
    }

    #[test]
    fn test_timing_sanity() {
        let mut config = NetworkConfig::default();
        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        config.poll_interval = config.confirmation_timeout;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        // Only this test touches these variables
        env::set_var(ENV_CHAIN_ID, "31337");
        env::set_var(ENV_RPC_URL, "http://127.0.0.1:8545");
        env::set_var(ENV_POLL_INTERVAL_MS, "250");
        let config = NetworkConfig::from_env().unwrap();
        assert_eq!(config.chain_id, 31337);
        assert_eq!(config.poll_interval, Duration::from_millis(250));

        env::set_var(ENV_CHAIN_ID, "sepolia");
        assert!(NetworkConfig::from_env().is_err());

        for name in [ENV_CHAIN_ID, ENV_RPC_URL, ENV_POLL_INTERVAL_MS] {
            env::remove_var(name);
        }
    }
}
