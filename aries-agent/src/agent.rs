use rst_common::with_errors::thiserror::{self, Error};
use rst_common::with_logging::log::{debug, info};
use rstdev_storage::engine::rocksdb::db::DB;

use prople_aries_core::identity::connection::types::{TransportBuilder, WalletBuilder};
use prople_aries_core::identity::connection::usecase::Usecase as ConnectionUsecase;
use prople_aries_core::provisioning::types::{PoolProviderBuilder, WalletProviderBuilder};
use prople_aries_core::provisioning::{open_or_create_pool, open_or_create_wallet};

use crate::apps::{ConnectionRepository, DbBuilder, DbRunner};
use crate::common::helpers;
use crate::Config;

#[derive(Debug, PartialEq, Error, Clone)]
pub enum AgentError {
    #[error("config error: {0}")]
    ConfigError(String),

    #[error("provisioning error: {0}")]
    ProvisioningError(String),

    #[error("db error: {0}")]
    DbError(String),
}

/// `Agent` owns the lifecycle of the external resources used by the agent
///
/// The wallet and pool handles are only available between [`Agent::open`] and
/// [`Agent::close`], the pool is opened only when the `[ledger]` section is configured
pub struct Agent<TWalletProvider, TPoolProvider>
where
    TWalletProvider: WalletProviderBuilder,
    TPoolProvider: PoolProviderBuilder,
{
    config: Config,
    wallet_provider: TWalletProvider,
    pool_provider: TPoolProvider,
    wallet: Option<TWalletProvider::Handle>,
    pool: Option<TPoolProvider::Handle>,
}

impl<TWalletProvider, TPoolProvider> Agent<TWalletProvider, TPoolProvider>
where
    TWalletProvider: WalletProviderBuilder,
    TPoolProvider: PoolProviderBuilder,
{
    pub fn new(
        config: Config,
        wallet_provider: TWalletProvider,
        pool_provider: TPoolProvider,
    ) -> Self {
        Self {
            config,
            wallet_provider,
            pool_provider,
            wallet: None,
            pool: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn wallet(&self) -> Option<&TWalletProvider::Handle> {
        self.wallet.as_ref()
    }

    pub fn pool(&self) -> Option<&TPoolProvider::Handle> {
        self.pool.as_ref()
    }

    /// `open` validates the configuration then open (or create) the wallet and the
    /// configured ledger pool. Calling it on an opened agent is a no-op
    pub async fn open(&mut self) -> Result<(), AgentError> {
        helpers::validate(self.config.to_owned())
            .map_err(|err| AgentError::ConfigError(err.to_string()))?;

        let agent = self.config.agent();
        if self.wallet.is_none() {
            let handle = open_or_create_wallet(
                &self.wallet_provider,
                &agent.get_wallet_config(),
                &agent.get_wallet_credentials(),
            )
            .await
            .map_err(|err| AgentError::ProvisioningError(err.to_string()))?;

            self.wallet = Some(handle);
        }

        if let Some(ledger) = self.config.ledger() {
            if self.pool.is_none() {
                let (ledger_name, genesis_path) = ledger.get();
                let handle = open_or_create_pool(&self.pool_provider, &ledger_name, &genesis_path)
                    .await
                    .map_err(|err| AgentError::ProvisioningError(err.to_string()))?;

                self.pool = Some(handle);
            }
        }

        info!("[agent:open] agent opened: {}", agent.get_agent_id());
        Ok(())
    }

    /// `close` closes the pool first and then the wallet, closing a closed agent is a no-op
    pub async fn close(&mut self) -> Result<(), AgentError> {
        if let Some(pool) = self.pool.take() {
            debug!("[agent:close] closing ledger pool");
            self.pool_provider
                .close_pool(pool)
                .await
                .map_err(|err| AgentError::ProvisioningError(err.to_string()))?;
        }

        if let Some(wallet) = self.wallet.take() {
            debug!("[agent:close] closing wallet");
            self.wallet_provider
                .close_wallet(wallet)
                .await
                .map_err(|err| AgentError::ProvisioningError(err.to_string()))?;
        }

        Ok(())
    }

    /// `delete` closes the agent and removes its wallet
    pub async fn delete(&mut self) -> Result<(), AgentError> {
        self.close().await?;

        let agent = self.config.agent();
        self.wallet_provider
            .delete_wallet(&agent.get_wallet_config(), &agent.get_wallet_credentials())
            .await
            .map_err(|err| AgentError::ProvisioningError(err.to_string()))?;

        info!("[agent:delete] wallet deleted: {}", agent.get_agent_id());
        Ok(())
    }

    /// `build_db` opens the connection record storage from the `[connection_store]` section
    pub fn build_db(&self) -> Result<DbRunner<DB>, AgentError> {
        DbBuilder::new(self.config.connection_store().to_owned())
            .build()
            .map_err(|err| AgentError::DbError(err.to_string()))
    }

    /// `connection` builds the connection protocol usecase on top of the given record storage,
    /// our own label is taken from the `[agent]` section
    pub fn connection<TWallet, TTransport>(
        &self,
        db: DbRunner<DB>,
        wallet: TWallet,
        transport: TTransport,
    ) -> ConnectionUsecase<ConnectionRepository, TWallet, TTransport>
    where
        TWallet: WalletBuilder,
        TTransport: TransportBuilder,
    {
        ConnectionUsecase::new(
            ConnectionRepository::new(db),
            wallet,
            transport,
            self.config.agent().get_label(),
        )
    }
}
