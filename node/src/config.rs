//! Node configuration with TOML file support.

use crate::NodeError;
use serde::{Deserialize, Serialize};
use sidequest_crypto::keypair_from_seed;
use sidequest_types::{Address, KeyPair, ProtocolParams};

/// Configuration for a Sidequest node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// JSON-RPC endpoint of the ledger node.
    #[serde(default = "default_ledger_rpc_url")]
    pub ledger_rpc_url: String,

    /// The escrow program's address.
    #[serde(default = "default_program_address")]
    pub program_address: String,

    /// The protocol treasury token account.
    #[serde(default = "default_treasury_address")]
    pub treasury_address: String,

    /// Hex-encoded 32-byte seed for the settlement identity keypair.
    #[serde(default = "default_settlement_key_hex")]
    pub settlement_key_hex: String,

    /// Shared secret for webhook re-trigger signatures.
    #[serde(default = "default_webhook_secret")]
    pub webhook_secret: String,

    /// Speech-to-text collaborator endpoint, key, and model.
    #[serde(default = "default_ai_endpoint")]
    pub stt_endpoint: String,
    #[serde(default)]
    pub stt_api_key: String,
    #[serde(default = "default_stt_model")]
    pub stt_model: String,

    /// Multimodal analysis collaborator endpoint, key, and model.
    #[serde(default = "default_ai_endpoint")]
    pub analysis_endpoint: String,
    #[serde(default)]
    pub analysis_api_key: String,
    #[serde(default = "default_analysis_model")]
    pub analysis_model: String,

    /// Public URL prefix the media store resolves keys against.
    #[serde(default = "default_media_public_url")]
    pub media_public_url: String,

    /// Seconds between crank runs.
    #[serde(default = "default_crank_interval_secs")]
    pub crank_interval_secs: u64,

    /// Hard timeout on each settlement submission.
    #[serde(default = "default_settlement_timeout_secs")]
    pub settlement_timeout_secs: u64,

    /// Verification attempts before a job is dead-lettered.
    #[serde(default = "default_max_job_attempts")]
    pub max_job_attempts: u32,

    /// Verification jobs processed concurrently.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Protocol policy parameters (governed, not read from TOML).
    #[serde(skip)]
    pub params: ProtocolParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_ledger_rpc_url() -> String {
    "http://127.0.0.1:8899".to_string()
}

fn default_program_address() -> String {
    "sq_devprogram".to_string()
}

fn default_treasury_address() -> String {
    "sq_devtreasury".to_string()
}

fn default_settlement_key_hex() -> String {
    // Dev-only identity; operators must override in production.
    "01".repeat(32)
}

fn default_webhook_secret() -> String {
    "dev-webhook-secret".to_string()
}

fn default_ai_endpoint() -> String {
    "https://api.openai.com".to_string()
}

fn default_stt_model() -> String {
    "whisper-1".to_string()
}

fn default_analysis_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_media_public_url() -> String {
    "http://127.0.0.1:9000/media".to_string()
}

fn default_crank_interval_secs() -> u64 {
    60
}

fn default_settlement_timeout_secs() -> u64 {
    30
}

fn default_max_job_attempts() -> u32 {
    3
}

fn default_max_concurrent_jobs() -> usize {
    8
}

fn default_log_format() -> String {
    "human".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("NodeConfig is always serializable to TOML")
    }

    /// The settlement identity, reconstructed from the configured seed.
    pub fn settlement_keypair(&self) -> Result<KeyPair, NodeError> {
        let bytes = hex::decode(&self.settlement_key_hex)
            .map_err(|e| NodeError::Config(format!("settlement_key_hex: {e}")))?;
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| NodeError::Config("settlement_key_hex must be 32 bytes".into()))?;
        Ok(keypair_from_seed(&seed))
    }

    pub fn program(&self) -> Address {
        Address::new(self.program_address.clone())
    }

    pub fn treasury(&self) -> Address {
        Address::new(self.treasury_address.clone())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            ledger_rpc_url: default_ledger_rpc_url(),
            program_address: default_program_address(),
            treasury_address: default_treasury_address(),
            settlement_key_hex: default_settlement_key_hex(),
            webhook_secret: default_webhook_secret(),
            stt_endpoint: default_ai_endpoint(),
            stt_api_key: String::new(),
            stt_model: default_stt_model(),
            analysis_endpoint: default_ai_endpoint(),
            analysis_api_key: String::new(),
            analysis_model: default_analysis_model(),
            media_public_url: default_media_public_url(),
            crank_interval_secs: default_crank_interval_secs(),
            settlement_timeout_secs: default_settlement_timeout_secs(),
            max_job_attempts: default_max_job_attempts(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
            log_format: default_log_format(),
            params: ProtocolParams::default(),
        }
    }
}
