use serde::{Deserialize, Serialize};

/// What the account creation service needs to start a creation flow
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountCreationRequest {
    pub supported_chains: Vec<String>,
    /// Service URL with the query string already attached
    pub full_creation_service_url: String,
    pub scope: String,
}

/// Reply posted back by the account creation service
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum AccountCreationResponse {
    Created {
        #[serde(rename = "sa")]
        account_name: String,
        /// Opaque value echoed by the service alongside the account name
        #[serde(rename = "sp")]
        service_payload: String,
    },
    Failed {
        error: String,
    },
}

/// Runs the remote account creation flow. Transport is up to the implementation.
#[allow(async_fn_in_trait)]
pub trait AccountCreator {
    async fn create_account(
        &self,
        request: &AccountCreationRequest,
    ) -> Result<AccountCreationResponse, String>;
}

// === POPUP FLOW (browser only) ===

#[cfg(target_arch = "wasm32")]
pub use popup::PopupAccountCreator;

#[cfg(target_arch = "wasm32")]
mod popup {
    use super::*;
    use js_sys::{Function, Promise};
    use log::{debug, warn};
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{MessageEvent, Url};

    /// How often the popup is checked for being closed by the user (ms)
    const POPUP_CLOSED_POLL_MS: i32 = 500;

    /// Opens the creation service in a popup and waits for its `postMessage` reply
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PopupAccountCreator;

    /// Origin the browser will report on the service's `postMessage` reply.
    /// Opaque origins (`data:`, `blob:` without host) can never match one.
    pub(crate) fn service_origin(url: &str) -> Result<String, String> {
        let origin = Url::new(url)
            .map_err(|_| format!("Invalid service URL: {}", url))?
            .origin();
        if origin == "null" {
            return Err(format!("Service URL has no origin: {}", url));
        }
        Ok(origin)
    }

    #[derive(Default)]
    struct Settle {
        resolve: Option<Function>,
        reject: Option<Function>,
    }

    impl Settle {
        fn resolve(&mut self, value: &JsValue) {
            if let Some(resolve) = self.resolve.take() {
                self.reject = None;
                let _ = resolve.call1(&JsValue::NULL, value);
            }
        }

        fn reject(&mut self, reason: &str) {
            if let Some(reject) = self.reject.take() {
                self.resolve = None;
                let _ = reject.call1(&JsValue::NULL, &JsValue::from_str(reason));
            }
        }
    }

    impl AccountCreator for PopupAccountCreator {
        async fn create_account(
            &self,
            request: &AccountCreationRequest,
        ) -> Result<AccountCreationResponse, String> {
            let window = web_sys::window().ok_or_else(|| "No browser window".to_string())?;
            let expected_origin = service_origin(&request.full_creation_service_url)?;

            debug!("Opening account creation window for scope {}", request.scope);
            let popup = window
                .open_with_url_and_target(&request.full_creation_service_url, "_blank")
                .map_err(|e| format!("Failed to open account creation window: {:?}", e))?
                .ok_or_else(|| "Account creation window was blocked".to_string())?;

            let settle = Rc::new(RefCell::new(Settle::default()));
            let settle_init = settle.clone();
            let promise = Promise::new(&mut |resolve, reject| {
                let mut slot = settle_init.borrow_mut();
                slot.resolve = Some(resolve);
                slot.reject = Some(reject);
            });

            let on_message_settle = settle.clone();
            let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
                if event.origin() != expected_origin {
                    return;
                }
                on_message_settle.borrow_mut().resolve(&event.data());
            });

            let poll_settle = settle.clone();
            let poll_popup = popup.clone();
            let on_poll = Closure::<dyn FnMut()>::new(move || {
                if poll_popup.closed().unwrap_or(false) {
                    poll_settle
                        .borrow_mut()
                        .reject("Account creation window closed");
                }
            });

            window
                .add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())
                .map_err(|e| format!("Failed to listen for messages: {:?}", e))?;
            let interval = window
                .set_interval_with_callback_and_timeout_and_arguments_0(
                    on_poll.as_ref().unchecked_ref(),
                    POPUP_CLOSED_POLL_MS,
                )
                .map_err(|e| format!("Failed to watch account creation window: {:?}", e))?;

            let outcome = JsFuture::from(promise).await;

            window.clear_interval_with_handle(interval);
            let _ = window
                .remove_event_listener_with_callback("message", on_message.as_ref().unchecked_ref());
            if let Err(e) = popup.close() {
                warn!("Failed to close account creation window: {:?}", e);
            }

            let data = outcome.map_err(|e| e.as_string().unwrap_or_else(|| format!("{:?}", e)))?;
            serde_wasm_bindgen::from_value(data)
                .map_err(|e| format!("Unexpected account creation response: {}", e))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use wasm_bindgen_test::*;

        wasm_bindgen_test_configure!(run_in_browser);

        #[wasm_bindgen_test]
        fn service_origin_matches_message_event_origin() {
            assert_eq!(
                service_origin("https://eos.account.unicove.com:443/buy?scope=Test+App"),
                Ok("https://eos.account.unicove.com".to_string())
            );
            assert_eq!(
                service_origin("HTTP://user:pw@LOCALHOST:8080#frag"),
                Ok("http://localhost:8080".to_string())
            );
            assert_eq!(
                service_origin("http://localhost:80/buy"),
                Ok("http://localhost".to_string())
            );
            assert!(service_origin("/relative/path").is_err());
            assert!(service_origin("data:text/html,hi").is_err());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_replies() {
        let created: AccountCreationResponse =
            serde_json::from_str(r#"{"sa":"newaccount11","sp":"eos"}"#).unwrap();
        assert_eq!(
            created,
            AccountCreationResponse::Created {
                account_name: "newaccount11".to_string(),
                service_payload: "eos".to_string(),
            }
        );

        let failed: AccountCreationResponse =
            serde_json::from_str(r#"{"error":"Payment cancelled"}"#).unwrap();
        assert_eq!(
            failed,
            AccountCreationResponse::Failed {
                error: "Payment cancelled".to_string()
            }
        );

        // An account name without its companion field is not a success
        assert!(serde_json::from_str::<AccountCreationResponse>(r#"{"sa":"x"}"#).is_err());
    }
}
