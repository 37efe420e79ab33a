use log::{debug, info, warn};
use serde_json::{json, Value};

use crate::chains::Checksum256;
use crate::config::{
    error_messages, provider_methods, snap_methods, snap_request_fields, PluginConfig,
    SetupStrategy, MAX_INSTALL_RETRIES,
};
use crate::errors::{PluginError, PluginResult};
use crate::keys::{PublicKey, PublicKeyPair};
use crate::provider::{check_is_flask, discover_snaps_provider, ProviderDiscovery, SnapsProvider};
use crate::types::{
    request_snaps_params, GetSnapsResponse, InvokeSnapParams, PromptArgs, Snap, UserInterface,
};

// === SNAP KEY RETRIEVER ===

/// Owns the connection to the wallet provider and the Antelope snap inside it.
///
/// State is the provider handle and the installed-snap record. Both are only
/// touched from this instance's own call chain; concurrent callers on separate
/// instances are not coordinated.
pub struct SnapKeyRetriever<D: ProviderDiscovery> {
    discovery: D,
    provider: Option<D::Provider>,
    installed_snap: Option<Snap>,
    is_flask: bool,
    snap_origin: String,
    snap_version: Option<String>,
    setup_page_url: String,
    setup_strategy: SetupStrategy,
}

impl<D: ProviderDiscovery> SnapKeyRetriever<D> {
    pub fn new(discovery: D, config: &PluginConfig) -> Self {
        Self {
            discovery,
            provider: None,
            installed_snap: None,
            is_flask: false,
            snap_origin: config.snap_origin.clone(),
            snap_version: config.snap_version.clone(),
            setup_page_url: config.setup_page_url.clone(),
            setup_strategy: config.setup_strategy,
        }
    }

    pub fn provider(&self) -> Option<&D::Provider> {
        self.provider.as_ref()
    }

    pub fn installed_snap(&self) -> Option<&Snap> {
        self.installed_snap.as_ref()
    }

    pub fn is_flask(&self) -> bool {
        self.is_flask
    }

    pub fn snap_origin(&self) -> &str {
        &self.snap_origin
    }

    /// Discover the provider and make sure the snap is installed.
    ///
    /// Idempotent: once a snap is recorded no further requests are made.
    /// A missing provider is not an error. With the install strategy the
    /// check runs once more after an install request and then gives up.
    pub async fn initialize(&mut self, ui: Option<&dyn UserInterface>) -> PluginResult<()> {
        for attempt in 0..=MAX_INSTALL_RETRIES {
            if self.provider.is_none() {
                self.provider = discover_snaps_provider(&self.discovery).await;
            }
            let Some(provider) = self.provider.as_ref() else {
                debug!("No snaps provider detected");
                return Ok(());
            };
            if self.installed_snap.is_some() {
                return Ok(());
            }
            if attempt == 0 {
                self.is_flask = check_is_flask(provider).await;
                debug!("Snaps provider found (flask: {})", self.is_flask);
            }

            self.list_installed().await?;
            if let Some(snap) = &self.installed_snap {
                info!("Snap {} {} is installed", snap.id, snap.version);
                return Ok(());
            }

            match self.setup_strategy {
                SetupStrategy::Prompt => {
                    debug!("Snap {} missing, asking host to show setup", self.snap_origin);
                    if let Some(ui) = ui {
                        ui.prompt(PromptArgs::snap_setup(&self.setup_page_url));
                    }
                    return Ok(());
                }
                SetupStrategy::Install => {
                    let version = self.snap_version.clone();
                    if let Err(e) = self.request_install(None, version.as_deref()).await {
                        warn!("Snap install attempt {} failed: {}", attempt + 1, e);
                    }
                }
            }
        }

        if self.installed_snap.is_none() {
            warn!(
                "Snap {} still not installed after {} install attempt(s)",
                self.snap_origin,
                MAX_INSTALL_RETRIES + 1
            );
        }
        Ok(())
    }

    /// Single key from `antelope_getPublicKey`
    pub async fn retrieve_public_key(&mut self, chain_id: &Checksum256) -> PluginResult<PublicKey> {
        self.ensure_ready().await?;
        let value = self
            .invoke_snap(snap_methods::GET_PUBLIC_KEY, Some(chain_params(chain_id)), None)
            .await?;
        parse_public_key(snap_methods::GET_PUBLIC_KEY, value)
    }

    /// Owner and active keys from their dedicated snap methods
    pub async fn retrieve_public_keys(
        &mut self,
        chain_id: &Checksum256,
    ) -> PluginResult<PublicKeyPair> {
        self.ensure_ready().await?;
        let owner = self
            .invoke_snap(
                snap_methods::GET_OWNER_PUBLIC_KEY,
                Some(chain_params(chain_id)),
                None,
            )
            .await?;
        let owner_public_key = parse_public_key(snap_methods::GET_OWNER_PUBLIC_KEY, owner)?;
        let active = self
            .invoke_snap(
                snap_methods::GET_ACTIVE_PUBLIC_KEY,
                Some(chain_params(chain_id)),
                None,
            )
            .await?;
        let active_public_key = parse_public_key(snap_methods::GET_ACTIVE_PUBLIC_KEY, active)?;
        Ok(PublicKeyPair {
            owner_public_key,
            active_public_key,
        })
    }

    /// Fails with `SnapNotInstalled` up front rather than invoking a missing snap
    async fn ensure_ready(&mut self) -> PluginResult<()> {
        self.initialize(None).await?;
        if self.provider.is_none() {
            return Err(PluginError::ProviderNotFound);
        }
        if self.installed_snap.is_none() {
            return Err(PluginError::SnapNotInstalled(self.snap_origin.clone()));
        }
        Ok(())
    }

    /// Route `method`/`params` into a snap through `wallet_invokeSnap`
    pub async fn invoke_snap(
        &self,
        method: &str,
        params: Option<Value>,
        snap_id: Option<&str>,
    ) -> PluginResult<Option<Value>> {
        let snap_id = snap_id.unwrap_or(self.snap_origin.as_str());
        debug!("Invoking {} on {}", method, snap_id);
        let request = InvokeSnapParams::new(method, params);
        self.request(
            provider_methods::INVOKE_SNAP,
            Some(request.to_provider_params(snap_id)),
        )
        .await
    }

    /// Refresh the installed-snap record from `wallet_getSnaps`
    pub async fn list_installed(&mut self) -> PluginResult<GetSnapsResponse> {
        let response = self
            .request(provider_methods::GET_SNAPS, Some(json!({})))
            .await?;
        let snaps = parse_snaps(provider_methods::GET_SNAPS, response)?;
        self.installed_snap = snaps.get(&self.snap_origin).cloned();
        Ok(snaps)
    }

    /// Ask the provider to install (or upgrade) a snap
    pub async fn request_install(
        &mut self,
        snap_id: Option<&str>,
        version: Option<&str>,
    ) -> PluginResult<Option<Snap>> {
        let snap_id = snap_id.unwrap_or(self.snap_origin.as_str()).to_string();
        info!("Requesting install of snap {}", snap_id);
        let response = self
            .request(
                provider_methods::REQUEST_SNAPS,
                Some(request_snaps_params(&snap_id, version)),
            )
            .await?;
        let snaps = parse_snaps(provider_methods::REQUEST_SNAPS, response)?;
        self.installed_snap = snaps.get(&snap_id).cloned();
        Ok(self.installed_snap.clone())
    }

    /// Raw provider request; `null` results come back as `None`
    pub async fn request(&self, method: &str, params: Option<Value>) -> PluginResult<Option<Value>> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            PluginError::ProviderRequest(error_messages::SNAP_PROVIDER_NOT_FOUND.to_string())
        })?;
        let result = provider
            .request(method, params)
            .await
            .map_err(|e| PluginError::rejected(method, e))?;
        Ok(result.filter(|v| !v.is_null()))
    }
}

fn chain_params(chain_id: &Checksum256) -> Value {
    json!({ (snap_request_fields::CHAIN_ID): chain_id.to_hex() })
}

/// Entries that fail to parse (e.g. per-snap install errors) are skipped
fn parse_snaps(method: &str, response: Option<Value>) -> PluginResult<GetSnapsResponse> {
    let entries = match response {
        None => return Ok(GetSnapsResponse::new()),
        Some(Value::Object(entries)) => entries,
        Some(other) => {
            return Err(PluginError::InvalidResponse(format!(
                "{} returned {}, expected an object",
                method, other
            )))
        }
    };

    let mut snaps = GetSnapsResponse::new();
    for (id, entry) in entries {
        match serde_json::from_value::<Snap>(entry) {
            Ok(snap) => {
                snaps.insert(id, snap);
            }
            Err(e) => debug!("Skipping snap entry {}: {}", id, e),
        }
    }
    Ok(snaps)
}

fn parse_public_key(method: &str, value: Option<Value>) -> PluginResult<PublicKey> {
    match value {
        Some(Value::String(key)) => key.parse(),
        Some(other) => Err(PluginError::InvalidResponse(format!(
            "{} returned {}, expected a public key string",
            method, other
        ))),
        None => Err(PluginError::InvalidResponse(format!(
            "{} returned nothing",
            method
        ))),
    }
}
