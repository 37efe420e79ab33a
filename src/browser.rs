//! Browser bindings: the injected `window.ethereum` provider, EIP-6963
//! discovery and a JS callback UI.

use js_sys::{Array, Function, Object, Promise, Reflect};
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CustomEvent, Event, Window};

use crate::provider::{ProviderDiscovery, SnapsProvider};
use crate::types::{PromptArgs, UserInterface};

const EIP6963_ANNOUNCE_EVENT: &str = "eip6963:announceProvider";
const EIP6963_REQUEST_EVENT: &str = "eip6963:requestProvider";
const METAMASK_RDNS_PREFIX: &str = "io.metamask";

/// Serialize for JS with plain objects instead of `Map`s
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, String> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| format!("Failed to serialize value for JS: {}", e))
}

/// Provider errors are usually `{ code, message }` objects
fn js_error_message(err: &JsValue) -> String {
    if let Some(s) = err.as_string() {
        return s;
    }
    Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}

fn is_object(value: &JsValue) -> bool {
    value.is_object() && !value.is_null()
}

// === INJECTED PROVIDER ===

/// An EIP-1193 provider object injected by the wallet extension
#[derive(Clone, Debug)]
pub struct InjectedProvider {
    inner: JsValue,
}

impl InjectedProvider {
    pub fn new(inner: JsValue) -> Self {
        Self { inner }
    }
}

impl SnapsProvider for InjectedProvider {
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Option<Value>, String> {
        let args = Object::new();
        Reflect::set(&args, &JsValue::from_str("method"), &JsValue::from_str(method))
            .map_err(|_| "Failed to set request.method".to_string())?;
        if let Some(params) = params {
            Reflect::set(&args, &JsValue::from_str("params"), &to_js(&params)?)
                .map_err(|_| "Failed to set request.params".to_string())?;
        }

        let request_fn: Function = Reflect::get(&self.inner, &JsValue::from_str("request"))
            .map_err(|_| "provider.request not available".to_string())?
            .dyn_into()
            .map_err(|_| "provider.request is not a function".to_string())?;
        let promise: Promise = request_fn
            .call1(&self.inner, &args)
            .map_err(|e| js_error_message(&e))?
            .dyn_into()
            .map_err(|_| "provider.request did not return a Promise".to_string())?;

        let result = JsFuture::from(promise)
            .await
            .map_err(|e| js_error_message(&e))?;
        if result.is_null() || result.is_undefined() {
            return Ok(None);
        }
        serde_wasm_bindgen::from_value(result)
            .map(Some)
            .map_err(|e| format!("Failed to deserialize {} result: {}", method, e))
    }
}

// === DISCOVERY ===

/// Candidates from `window.ethereum` (and its multi-wallet lists) plus EIP-6963 announcements
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserProviderDiscovery;

impl ProviderDiscovery for BrowserProviderDiscovery {
    type Provider = InjectedProvider;

    async fn candidates(&self) -> Vec<InjectedProvider> {
        let Some(window) = web_sys::window() else {
            return Vec::new();
        };

        let mut candidates = Vec::new();
        let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum"))
            .unwrap_or(JsValue::UNDEFINED);
        if is_object(&ethereum) {
            candidates.push(InjectedProvider::new(ethereum.clone()));
            for list_key in ["detected", "providers"] {
                let list = Reflect::get(&ethereum, &JsValue::from_str(list_key))
                    .unwrap_or(JsValue::UNDEFINED);
                if Array::is_array(&list) {
                    candidates.extend(
                        Array::from(&list)
                            .iter()
                            .filter(is_object)
                            .map(InjectedProvider::new),
                    );
                }
            }
        }
        candidates.extend(eip6963_metamask_providers(&window));
        debug!("Found {} provider candidate(s)", candidates.len());
        candidates
    }
}

/// Wallets answer the request event synchronously, so no waiting is needed
fn eip6963_metamask_providers(window: &Window) -> Vec<InjectedProvider> {
    let found: Rc<RefCell<Vec<InjectedProvider>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = found.clone();
    let on_announce = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(event) = event.dyn_ref::<CustomEvent>() else {
            return;
        };
        let detail = event.detail();
        let rdns = Reflect::get(&detail, &JsValue::from_str("info"))
            .and_then(|info| Reflect::get(&info, &JsValue::from_str("rdns")))
            .ok()
            .and_then(|rdns| rdns.as_string())
            .unwrap_or_default();
        if !rdns.starts_with(METAMASK_RDNS_PREFIX) {
            return;
        }
        if let Ok(provider) = Reflect::get(&detail, &JsValue::from_str("provider")) {
            if is_object(&provider) {
                sink.borrow_mut().push(InjectedProvider::new(provider));
            }
        }
    });

    if window
        .add_event_listener_with_callback(EIP6963_ANNOUNCE_EVENT, on_announce.as_ref().unchecked_ref())
        .is_err()
    {
        return Vec::new();
    }
    match Event::new(EIP6963_REQUEST_EVENT) {
        Ok(request) => {
            let _ = window.dispatch_event(&request);
        }
        Err(e) => warn!("Failed to create {} event: {:?}", EIP6963_REQUEST_EVENT, e),
    }
    let _ = window.remove_event_listener_with_callback(
        EIP6963_ANNOUNCE_EVENT,
        on_announce.as_ref().unchecked_ref(),
    );

    let providers = found.borrow().clone();
    providers
}

// === UI ===

/// Forwards setup prompts to a JS callback as plain objects
pub struct JsCallbackUi {
    callback: Function,
}

impl JsCallbackUi {
    pub fn new(callback: Function) -> Self {
        Self { callback }
    }
}

impl UserInterface for JsCallbackUi {
    fn prompt(&self, args: PromptArgs) {
        let value = match to_js(&args) {
            Ok(value) => value,
            Err(e) => {
                warn!("{}", e);
                return;
            }
        };
        if let Err(e) = self.callback.call1(&JsValue::NULL, &value) {
            warn!("Setup prompt callback failed: {}", js_error_message(&e));
        }
    }
}
