mod config;

pub use config::{ClientConfig, ClientOptions, CredentialMaterial, DEFAULT_HOST, DEFAULT_PORT};
