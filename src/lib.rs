mod account_creator;
mod chains;
mod config;
mod errors;
mod keys;
mod plugin;
mod provider;
mod query;
mod retriever;
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
mod slot;
mod types;

#[cfg(target_arch = "wasm32")]
mod browser;


// Re-export important types and functions
pub use account_creator::{AccountCreationRequest, AccountCreationResponse, AccountCreator};
pub use chains::*;
pub use config::*;
pub use errors::*;
pub use keys::*;
pub use plugin::*;
pub use provider::*;
pub use query::QueryString;
pub use retriever::SnapKeyRetriever;
pub use types::*;

#[cfg(target_arch = "wasm32")]
pub use account_creator::PopupAccountCreator;
#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserProviderDiscovery, InjectedProvider, JsCallbackUi};

#[cfg(target_arch = "wasm32")]
pub use wasm_api::*;

// === WASM EXPORTS ===

#[cfg(target_arch = "wasm32")]
mod wasm_api {
    use js_sys::Function;
    use log::debug;
    use serde::Serialize;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use crate::browser::{to_js, BrowserProviderDiscovery, JsCallbackUi};
    use crate::slot::PluginSlot;
    use crate::{
        AccountCreationPlugin, AccountCreationPluginConfig, AccountCreationPluginMetamask,
        ChainDefinition, Checksum256, CreateAccountContext, PluginConfig, PluginMetadata,
        PopupAccountCreator, UserInterface, CURRENT_LOG_LEVEL,
    };

    type BrowserPlugin = AccountCreationPluginMetamask<BrowserProviderDiscovery, PopupAccountCreator>;

    // === GLOBAL STATE ===

    thread_local! {
        static PLUGIN: RefCell<PluginSlot<BrowserPlugin>> =
            RefCell::new(PluginSlot::new(PluginConfig::default()));
    }

    #[wasm_bindgen(start)]
    pub fn main() {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::new(CURRENT_LOG_LEVEL));
        debug!("MetaMask account creation plugin starting up...");
    }

    fn take_plugin() -> (u64, BrowserPlugin) {
        PLUGIN.with(|slot| {
            slot.borrow_mut().take(|config| {
                AccountCreationPluginMetamask::new(
                    BrowserProviderDiscovery,
                    PopupAccountCreator,
                    config.clone(),
                )
            })
        })
    }

    fn put_back(generation: u64, plugin: BrowserPlugin) {
        PLUGIN.with(|slot| slot.borrow_mut().put_back(generation, plugin));
    }

    fn callback_ui(callback: Option<Function>) -> Option<Rc<dyn UserInterface>> {
        callback.map(|f| Rc::new(JsCallbackUi::new(f)) as Rc<dyn UserInterface>)
    }

    fn parse_chain_id(chain_id: &str) -> Result<Checksum256, JsValue> {
        chain_id.parse::<Checksum256>().map_err(JsValue::from)
    }

    /// Replace the plugin configuration; the next call starts from a fresh plugin
    #[wasm_bindgen]
    pub fn configure_plugin(config: JsValue) -> Result<(), JsValue> {
        let config: PluginConfig = if config.is_undefined() || config.is_null() {
            PluginConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid plugin config: {}", e)))?
        };
        PLUGIN.with(|slot| slot.borrow_mut().configure(config.normalized()));
        Ok(())
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct PluginInfo<'a> {
        id: &'a str,
        name: &'a str,
        metadata: &'a PluginMetadata,
        config: &'a AccountCreationPluginConfig,
    }

    #[wasm_bindgen]
    pub fn plugin_info() -> Result<JsValue, JsValue> {
        let (generation, plugin) = take_plugin();
        let info = to_js(&PluginInfo {
            id: plugin.id(),
            name: plugin.name(),
            metadata: plugin.metadata(),
            config: plugin.config(),
        });
        put_back(generation, plugin);
        info.map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = initialize)]
    pub async fn initialize_plugin(on_setup_required: Option<Function>) -> Result<(), JsValue> {
        let (generation, mut plugin) = take_plugin();
        let context = CreateAccountContext {
            ui: callback_ui(on_setup_required),
            ..CreateAccountContext::default()
        };
        let result = plugin.initialize(Some(&context)).await;
        put_back(generation, plugin);
        result.map_err(JsValue::from)
    }

    #[wasm_bindgen]
    pub async fn retrieve_public_key(chain_id: String) -> Result<String, JsValue> {
        let chain_id = parse_chain_id(&chain_id)?;
        let (generation, mut plugin) = take_plugin();
        let result = plugin.retrieve_public_key(&chain_id).await;
        put_back(generation, plugin);
        Ok(result?.to_string())
    }

    #[wasm_bindgen]
    pub async fn retrieve_public_keys(chain_id: String) -> Result<JsValue, JsValue> {
        let chain_id = parse_chain_id(&chain_id)?;
        let (generation, mut plugin) = take_plugin();
        let result = plugin.retrieve_public_keys(&chain_id).await;
        put_back(generation, plugin);
        to_js(&result?).map_err(|e| JsValue::from_str(&e))
    }

    /// `chain` is a `{ id, url, name }` object; `undefined` means no chain was selected
    #[wasm_bindgen]
    pub async fn create_account(
        chain: JsValue,
        app_name: Option<String>,
        on_setup_required: Option<Function>,
    ) -> Result<JsValue, JsValue> {
        let chain: Option<ChainDefinition> = if chain.is_undefined() || chain.is_null() {
            None
        } else {
            Some(
                serde_wasm_bindgen::from_value(chain)
                    .map_err(|e| JsValue::from_str(&format!("Invalid chain: {}", e)))?,
            )
        };
        let context = CreateAccountContext {
            chain,
            app_name,
            ui: callback_ui(on_setup_required),
        };

        let (generation, mut plugin) = take_plugin();
        let result = match plugin.validate_context(&context) {
            Ok(_) => match plugin.initialize(Some(&context)).await {
                Ok(()) => plugin.create(&context).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        put_back(generation, plugin);
        to_js(&result?).map_err(|e| JsValue::from_str(&e))
    }
}
