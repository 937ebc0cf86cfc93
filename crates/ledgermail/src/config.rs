//! Startup configuration for a session.
//!
//! Every field is independently overridable; the defaults target a local
//! development stack (ledger node and blob gateway on loopback).

use ledgermail_core::Address;

/// Default ledger RPC endpoint.
pub const DEFAULT_LEDGER_ENDPOINT: &str = "http://127.0.0.1:8545";

/// Default blob gateway host.
pub const DEFAULT_GATEWAY_HOST: &str = "127.0.0.1";

/// Default blob gateway port.
pub const DEFAULT_GATEWAY_PORT: u16 = 5001;

/// Default blob gateway protocol.
pub const DEFAULT_GATEWAY_PROTOCOL: &str = "http";

/// Location of the blob-store gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobGateway {
    pub host: String,
    pub port: u16,
    pub protocol: String,
}

impl BlobGateway {
    /// Render as a base URL.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

impl Default for BlobGateway {
    fn default() -> Self {
        Self {
            host: DEFAULT_GATEWAY_HOST.to_string(),
            port: DEFAULT_GATEWAY_PORT,
            protocol: DEFAULT_GATEWAY_PROTOCOL.to_string(),
        }
    }
}

/// On-ledger registry contract addresses, one per event family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryAddresses {
    pub accounts: Address,
    pub channels: Address,
    pub documents: Address,
}

impl Default for RegistryAddresses {
    fn default() -> Self {
        // Deterministic dev-chain deployment addresses
        Self {
            accounts: Address::from_bytes([0x0a; 20]),
            channels: Address::from_bytes([0x0b; 20]),
            documents: Address::from_bytes([0x0c; 20]),
        }
    }
}

/// Configuration for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Ledger RPC endpoint.
    pub ledger_endpoint: String,
    /// Blob-store gateway location.
    pub gateway: BlobGateway,
    /// Registry contract addresses.
    pub registries: RegistryAddresses,
}

impl SessionConfig {
    /// Override the ledger endpoint.
    pub fn with_ledger_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.ledger_endpoint = endpoint.into();
        self
    }

    /// Override the blob gateway.
    pub fn with_gateway(mut self, gateway: BlobGateway) -> Self {
        self.gateway = gateway;
        self
    }

    /// Override the registry addresses.
    pub fn with_registries(mut self, registries: RegistryAddresses) -> Self {
        self.registries = registries;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ledger_endpoint: DEFAULT_LEDGER_ENDPOINT.to_string(),
            gateway: BlobGateway::default(),
            registries: RegistryAddresses::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.ledger_endpoint, DEFAULT_LEDGER_ENDPOINT);
        assert_eq!(config.gateway.base_url(), "http://127.0.0.1:5001");
    }

    #[test]
    fn test_independent_overrides() {
        let config = SessionConfig::default()
            .with_ledger_endpoint("https://ledger.example:8546")
            .with_gateway(BlobGateway {
                host: "blobs.example".into(),
                port: 443,
                protocol: "https".into(),
            });

        assert_eq!(config.ledger_endpoint, "https://ledger.example:8546");
        assert_eq!(config.gateway.base_url(), "https://blobs.example:443");
        // Untouched field keeps its default
        assert_eq!(config.registries, RegistryAddresses::default());
    }
}
