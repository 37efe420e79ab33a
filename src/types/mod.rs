use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::chains::ChainDefinition;
use crate::config::snap_request_fields;

pub mod prompt;

pub use prompt::*;

// === SNAP TYPES ===

/// Installed snap descriptor as reported by `wallet_getSnaps` / `wallet_requestSnaps`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snap {
    pub id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub initial_permissions: Value,
}

/// Snap id -> descriptor
pub type GetSnapsResponse = BTreeMap<String, Snap>;

/// Inner request routed to a snap through `wallet_invokeSnap`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InvokeSnapParams {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl InvokeSnapParams {
    pub fn new(method: &str, params: Option<Value>) -> Self {
        Self {
            method: method.to_string(),
            params,
        }
    }

    /// `{ snapId, request: { method, params } }`
    pub fn to_provider_params(&self, snap_id: &str) -> Value {
        let mut request = Map::new();
        request.insert(
            snap_request_fields::METHOD.to_string(),
            Value::String(self.method.clone()),
        );
        if let Some(params) = &self.params {
            request.insert(snap_request_fields::PARAMS.to_string(), params.clone());
        }

        let mut outer = Map::new();
        outer.insert(
            snap_request_fields::SNAP_ID.to_string(),
            Value::String(snap_id.to_string()),
        );
        outer.insert(
            snap_request_fields::REQUEST.to_string(),
            Value::Object(request),
        );
        Value::Object(outer)
    }
}

/// `{ <snapId>: { version? } }` for `wallet_requestSnaps`
pub fn request_snaps_params(snap_id: &str, version: Option<&str>) -> Value {
    let mut options = Map::new();
    if let Some(version) = version {
        options.insert(
            snap_request_fields::VERSION.to_string(),
            Value::String(version.to_string()),
        );
    }
    let mut outer = Map::new();
    outer.insert(snap_id.to_string(), Value::Object(options));
    Value::Object(outer)
}

// === PLUGIN TYPES ===

/// Host-facing plugin configuration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountCreationPluginConfig {
    pub requires_chain_select: bool,
    pub supported_chains: Vec<ChainDefinition>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PluginMetadata {
    pub name: String,
    pub description: String,
}

/// Context handed to `create` / `initialize` by the host
#[derive(Clone, Default)]
pub struct CreateAccountContext {
    pub chain: Option<ChainDefinition>,
    pub app_name: Option<String>,
    pub ui: Option<Rc<dyn UserInterface>>,
}

impl CreateAccountContext {
    pub fn for_chain(chain: ChainDefinition) -> Self {
        Self {
            chain: Some(chain),
            ..Self::default()
        }
    }

    pub fn with_app_name(mut self, app_name: &str) -> Self {
        self.app_name = Some(app_name.to_string());
        self
    }

    pub fn with_ui(mut self, ui: Rc<dyn UserInterface>) -> Self {
        self.ui = Some(ui);
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountResponse {
    pub account_name: String,
    pub chain: ChainDefinition,
}
