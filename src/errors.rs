use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::error_messages;

/// Plugin Error Types
///
/// Every public operation of the retriever and the plugin returns these.
/// Nothing is retried automatically; the caller decides what to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginError {
    /// `create` was called without a chain in the context
    ChainNotProvided,

    /// Chain is outside the configured support set
    UnsupportedChain { supported: Vec<String> },

    /// No snaps-capable wallet provider was detected
    ProviderNotFound,

    /// A provider request was attempted without a provider handle
    ProviderRequest(String),

    /// The provider rejected a request
    ProviderRejected { method: String, message: String },

    /// Provider is present but the snap is not installed
    SnapNotInstalled(String),

    /// Provider or snap returned a payload of the wrong shape
    InvalidResponse(String),

    /// Snap returned something that is not an Antelope public key
    InvalidPublicKey(String),

    /// Chain id is not a 32-byte hex checksum
    InvalidChainId(String),

    /// Account creation service answered with an error payload
    RemoteService(String),

    /// Account creation flow failed before the service answered
    AccountCreation(String),
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginError::ChainNotProvided => f.write_str(error_messages::CHAIN_NOT_PROVIDED),
            PluginError::UnsupportedChain { supported } => write!(
                f,
                "Chain not supported. This plugin only supports {}",
                supported.join(", ")
            ),
            PluginError::ProviderNotFound => f.write_str(error_messages::PROVIDER_NOT_FOUND),
            PluginError::ProviderRequest(msg) => write!(f, "Provider request failed: {}", msg),
            PluginError::ProviderRejected { method, message } => {
                write!(f, "Provider rejected {}: {}", method, message)
            }
            PluginError::SnapNotInstalled(origin) => {
                write!(f, "Snap {} is not installed", origin)
            }
            PluginError::InvalidResponse(msg) => write!(f, "Invalid provider response: {}", msg),
            PluginError::InvalidPublicKey(msg) => write!(f, "Invalid public key: {}", msg),
            PluginError::InvalidChainId(msg) => write!(f, "Invalid chain id: {}", msg),
            PluginError::RemoteService(msg) => write!(f, "{}", msg),
            PluginError::AccountCreation(msg) => write!(f, "Account creation failed: {}", msg),
        }
    }
}

impl std::error::Error for PluginError {}

#[cfg(target_arch = "wasm32")]
impl From<PluginError> for wasm_bindgen::JsValue {
    fn from(err: PluginError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}

// Result type alias for convenience
pub type PluginResult<T> = Result<T, PluginError>;

impl PluginError {
    pub fn rejected(method: &str, message: impl Into<String>) -> Self {
        PluginError::ProviderRejected {
            method: method.to_string(),
            message: message.into(),
        }
    }
}
