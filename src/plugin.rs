use log::{debug, info};

use crate::account_creator::{AccountCreationRequest, AccountCreationResponse, AccountCreator};
use crate::chains::{ChainDefinition, Chains, Checksum256};
use crate::config::{
    query_fields, KeyMode, PluginConfig, DEFAULT_ACCOUNT_SCOPE, PLUGIN_DESCRIPTION, PLUGIN_ID,
    PLUGIN_NAME,
};
use crate::errors::{PluginError, PluginResult};
use crate::keys::{PublicKey, PublicKeyPair};
use crate::provider::ProviderDiscovery;
use crate::query::QueryString;
use crate::retriever::SnapKeyRetriever;
use crate::types::{
    AccountCreationPluginConfig, CreateAccountContext, CreateAccountResponse, PluginMetadata,
};

/// Interface a session kit uses to drive account creation strategies generically
#[allow(async_fn_in_trait)]
pub trait AccountCreationPlugin {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn config(&self) -> &AccountCreationPluginConfig;
    fn metadata(&self) -> &PluginMetadata;

    async fn create(&mut self, context: &CreateAccountContext)
        -> PluginResult<CreateAccountResponse>;

    async fn initialize(&mut self, context: Option<&CreateAccountContext>) -> PluginResult<()>;
}

/// Creates Antelope accounts from keys held by the MetaMask snap
pub struct AccountCreationPluginMetamask<D: ProviderDiscovery, C: AccountCreator> {
    settings: PluginConfig,
    config: AccountCreationPluginConfig,
    metadata: PluginMetadata,
    retriever: SnapKeyRetriever<D>,
    creator: C,
}

impl<D: ProviderDiscovery, C: AccountCreator> AccountCreationPluginMetamask<D, C> {
    pub fn new(discovery: D, creator: C, settings: PluginConfig) -> Self {
        let settings = settings.normalized();
        Self {
            retriever: SnapKeyRetriever::new(discovery, &settings),
            settings,
            config: AccountCreationPluginConfig {
                requires_chain_select: true,
                supported_chains: Chains::all(),
            },
            metadata: PluginMetadata {
                name: PLUGIN_NAME.to_string(),
                description: PLUGIN_DESCRIPTION.to_string(),
            },
            creator,
        }
    }

    pub fn settings(&self) -> &PluginConfig {
        &self.settings
    }

    pub fn retriever(&self) -> &SnapKeyRetriever<D> {
        &self.retriever
    }

    pub fn retriever_mut(&mut self) -> &mut SnapKeyRetriever<D> {
        &mut self.retriever
    }

    /// Supported chain with the same name as `chain`
    pub fn supported_chain(&self, chain: &ChainDefinition) -> Option<&ChainDefinition> {
        self.config
            .supported_chains
            .iter()
            .find(|supported| supported.name == chain.name)
    }

    fn unsupported_chain(&self) -> PluginError {
        PluginError::UnsupportedChain {
            supported: self
                .config
                .supported_chains
                .iter()
                .map(|chain| chain.name.clone())
                .collect(),
        }
    }

    /// Chain checks `create` performs before any provider interaction
    pub fn validate_context(&self, context: &CreateAccountContext) -> PluginResult<ChainDefinition> {
        let chain = context.chain.as_ref().ok_or(PluginError::ChainNotProvided)?;
        self.supported_chain(chain)
            .cloned()
            .ok_or_else(|| self.unsupported_chain())
    }

    fn check_chain_id(&self, chain_id: &Checksum256) -> PluginResult<()> {
        if self
            .config
            .supported_chains
            .iter()
            .any(|chain| &chain.id == chain_id)
        {
            Ok(())
        } else {
            Err(self.unsupported_chain())
        }
    }

    /// Single snap key for a supported chain
    pub async fn retrieve_public_key(&mut self, chain_id: &Checksum256) -> PluginResult<PublicKey> {
        self.check_chain_id(chain_id)?;
        self.retriever.retrieve_public_key(chain_id).await
    }

    /// Owner/active snap keys for a supported chain
    pub async fn retrieve_public_keys(
        &mut self,
        chain_id: &Checksum256,
    ) -> PluginResult<PublicKeyPair> {
        self.check_chain_id(chain_id)?;
        self.retriever.retrieve_public_keys(chain_id).await
    }

    async fn account_keys(&mut self, chain_id: &Checksum256) -> PluginResult<PublicKeyPair> {
        match self.settings.key_mode {
            KeyMode::Single => self
                .retriever
                .retrieve_public_key(chain_id)
                .await
                .map(PublicKeyPair::from_single),
            KeyMode::Dual => self.retriever.retrieve_public_keys(chain_id).await,
        }
    }
}

impl<D: ProviderDiscovery, C: AccountCreator> AccountCreationPlugin
    for AccountCreationPluginMetamask<D, C>
{
    fn id(&self) -> &str {
        PLUGIN_ID
    }

    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn config(&self) -> &AccountCreationPluginConfig {
        &self.config
    }

    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn create(
        &mut self,
        context: &CreateAccountContext,
    ) -> PluginResult<CreateAccountResponse> {
        let current_chain = self.validate_context(context)?;
        let app_name = context.app_name.as_deref().filter(|name| !name.is_empty());

        let mut qs = QueryString::new();
        qs.set(query_fields::SUPPORTED_CHAINS, current_chain.id.to_hex());
        if let Some(app_name) = app_name {
            qs.set(query_fields::SCOPE, app_name);
        }

        let keys = self.account_keys(&current_chain.id).await?;
        qs.set(query_fields::OWNER_KEY, keys.owner_public_key.to_string());
        qs.set(query_fields::ACTIVE_KEY, keys.active_public_key.to_string());

        let request = AccountCreationRequest {
            supported_chains: vec![current_chain.id.to_hex()],
            full_creation_service_url: qs.append_to(&self.settings.account_creation_service_url),
            scope: app_name.unwrap_or(DEFAULT_ACCOUNT_SCOPE).to_string(),
        };
        debug!("Account creation URL: {}", request.full_creation_service_url);

        let response = self
            .creator
            .create_account(&request)
            .await
            .map_err(PluginError::AccountCreation)?;

        match response {
            AccountCreationResponse::Created { account_name, .. } => {
                info!("Created account {} on {}", account_name, current_chain.name);
                Ok(CreateAccountResponse {
                    account_name,
                    chain: context.chain.clone().unwrap_or(current_chain),
                })
            }
            AccountCreationResponse::Failed { error } => Err(PluginError::RemoteService(error)),
        }
    }

    async fn initialize(&mut self, context: Option<&CreateAccountContext>) -> PluginResult<()> {
        let ui = context.and_then(|ctx| ctx.ui.as_deref());
        self.retriever.initialize(ui).await
    }
}
