/// Configuration constants for the MetaMask account creation plugin
///
/// Defaults, wire method names and query field names live here so the
/// retriever, the plugin and the wasm bindings agree on them.
use serde::{Deserialize, Serialize};

// === LOGGING CONFIGURATION ===

/// Log level for the plugin
/// Change this constant and recompile to adjust logging verbosity
/// Available levels: Error, Warn, Info, Debug, Trace
pub const CURRENT_LOG_LEVEL: log::Level = log::Level::Info;

// === PLUGIN IDENTITY ===

pub const PLUGIN_ID: &str = "account-creation-plugin-metamask";
pub const PLUGIN_NAME: &str = "Account Creation Plugin Metamask";
pub const PLUGIN_DESCRIPTION: &str = "Plugin to create EOS accounts using Metamask public key.";

// === DEFAULTS ===

pub const ACCOUNT_CREATION_SERVICE_URL: &str = "https://eos.account.unicove.com/buy";
pub const DEFAULT_SETUP_PAGE: &str = "https://unicove.com/eos/metamask";
pub const DEFAULT_SNAP_ORIGIN: &str = "npm:@greymass/eos-wallet";

/// Scope reported to the account creator when the host app has no name
pub const DEFAULT_ACCOUNT_SCOPE: &str = "Antelope App";

/// Number of times initialization re-checks the snap after an install request.
/// One retry: a second failed installation ends initialization.
pub const MAX_INSTALL_RETRIES: usize = 1;

// === PROVIDER METHODS ===

/// Outer provider methods used to reach the snap
pub mod provider_methods {
    pub const GET_SNAPS: &str = "wallet_getSnaps";
    pub const REQUEST_SNAPS: &str = "wallet_requestSnaps";
    pub const INVOKE_SNAP: &str = "wallet_invokeSnap";
    pub const CLIENT_VERSION: &str = "web3_clientVersion";
}

/// Methods served by the Antelope snap itself
pub mod snap_methods {
    pub const GET_PUBLIC_KEY: &str = "antelope_getPublicKey";
    pub const GET_OWNER_PUBLIC_KEY: &str = "antelope_getOwnerPublicKey";
    pub const GET_ACTIVE_PUBLIC_KEY: &str = "antelope_getActivePublicKey";
}

// === JSON / QUERY FIELD NAMES ===

pub mod snap_request_fields {
    pub const SNAP_ID: &str = "snapId";
    pub const REQUEST: &str = "request";
    pub const METHOD: &str = "method";
    pub const PARAMS: &str = "params";
    pub const CHAIN_ID: &str = "chainId";
    pub const VERSION: &str = "version";
}

/// Query string fields understood by the account creation service
pub mod query_fields {
    pub const SUPPORTED_CHAINS: &str = "supported_chains";
    pub const SCOPE: &str = "scope";
    pub const OWNER_KEY: &str = "owner_key";
    pub const ACTIVE_KEY: &str = "active_key";
}

// === SETUP PROMPT ===

pub mod setup_prompt {
    pub const TITLE: &str = "Antelope Snap Setup Required";
    pub const BODY: &str = "It looks like the Antelope snap for MetaMask isn't installed yet.\n\nClick the button below to go to our setup page:";
    pub const BUTTON_LABEL: &str = "Go to Setup Page";
}

// === ERROR MESSAGES ===

pub mod error_messages {
    pub const CHAIN_NOT_PROVIDED: &str = "Chain not provided";
    pub const PROVIDER_NOT_FOUND: &str = "Metamask not found";
    pub const SNAP_PROVIDER_NOT_FOUND: &str = "Snap provider not found";
}

// === RUNTIME CONFIGURATION ===

/// Which snap methods are used to obtain account keys
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    /// One key from `antelope_getPublicKey`, used for both owner and active
    Single,
    /// Separate owner and active keys
    #[default]
    Dual,
}

/// What initialization does when the snap is not installed
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SetupStrategy {
    /// Ask the host UI to show the setup page prompt
    #[default]
    Prompt,
    /// Ask the provider to install the snap directly
    Install,
}

/// Plugin configuration as accepted from JS (`camelCase` keys, all optional)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginConfig {
    pub account_creation_service_url: String,
    pub snap_origin: String,
    pub setup_page_url: String,
    pub key_mode: KeyMode,
    pub setup_strategy: SetupStrategy,
    /// Version range forwarded to `wallet_requestSnaps`
    pub snap_version: Option<String>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            account_creation_service_url: ACCOUNT_CREATION_SERVICE_URL.to_string(),
            snap_origin: DEFAULT_SNAP_ORIGIN.to_string(),
            setup_page_url: DEFAULT_SETUP_PAGE.to_string(),
            key_mode: KeyMode::default(),
            setup_strategy: SetupStrategy::default(),
            snap_version: None,
        }
    }
}

impl PluginConfig {
    /// Replace empty strings with defaults, mirroring `value || DEFAULT` on the JS side.
    pub fn normalized(mut self) -> Self {
        if self.account_creation_service_url.is_empty() {
            self.account_creation_service_url = ACCOUNT_CREATION_SERVICE_URL.to_string();
        }
        if self.snap_origin.is_empty() {
            self.snap_origin = DEFAULT_SNAP_ORIGIN.to_string();
        }
        if self.setup_page_url.is_empty() {
            self.setup_page_url = DEFAULT_SETUP_PAGE.to_string();
        }
        if self.snap_version.as_deref() == Some("") {
            self.snap_version = None;
        }
        self
    }
}
