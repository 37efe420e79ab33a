use log::{debug, warn};
use serde_json::Value;

use crate::config::provider_methods;

/// Request channel of an injected wallet provider (`provider.request({ method, params })`).
///
/// Resolves to `None` when the provider answers `null`/`undefined`.
/// A rejected request yields the provider's error message.
#[allow(async_fn_in_trait)]
pub trait SnapsProvider {
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Option<Value>, String>;
}

/// Source of candidate providers, in preference order
#[allow(async_fn_in_trait)]
pub trait ProviderDiscovery {
    type Provider: SnapsProvider;

    async fn candidates(&self) -> Vec<Self::Provider>;
}

/// A provider supports snaps if `wallet_getSnaps` does not reject
pub async fn has_snaps_support<P: SnapsProvider>(provider: &P) -> bool {
    match provider.request(provider_methods::GET_SNAPS, None).await {
        Ok(_) => true,
        Err(e) => {
            debug!("Provider has no snaps support: {}", e);
            false
        }
    }
}

/// Flask builds report `.../flask` in `web3_clientVersion`
pub async fn check_is_flask<P: SnapsProvider>(provider: &P) -> bool {
    match provider.request(provider_methods::CLIENT_VERSION, None).await {
        Ok(Some(Value::String(version))) => version.to_lowercase().contains("flask"),
        Ok(_) => false,
        Err(e) => {
            warn!("Failed to read client version: {}", e);
            false
        }
    }
}

/// First candidate that supports snaps, if any
pub async fn discover_snaps_provider<D: ProviderDiscovery>(discovery: &D) -> Option<D::Provider> {
    let candidates = discovery.candidates().await;
    debug!("Probing {} provider candidate(s) for snaps support", candidates.len());
    for candidate in candidates {
        if has_snaps_support(&candidate).await {
            return Some(candidate);
        }
    }
    None
}
