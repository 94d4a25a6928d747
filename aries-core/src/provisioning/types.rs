use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::with_errors::thiserror::{self, Error};

/// ProvisioningError is a base error types for the `Provisioning` domain
#[derive(Debug, PartialEq, Error, Clone)]
pub enum ProvisioningError {
    #[error("wallet open error: {0}")]
    WalletOpenError(String),

    #[error("wallet create error: {0}")]
    WalletCreateError(String),

    #[error("wallet close error: {0}")]
    WalletCloseError(String),

    #[error("wallet delete error: {0}")]
    WalletDeleteError(String),

    #[error("wallet not found after create: {0}")]
    WalletVanished(String),

    #[error("pool open error: {0}")]
    PoolOpenError(String),

    #[error("pool create error: {0}")]
    PoolCreateError(String),

    #[error("pool close error: {0}")]
    PoolCloseError(String),

    #[error("pool config not found after create: {0}")]
    PoolVanished(String),
}

/// `WalletConfig` identifies the wallet, the `id` is the agent id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct WalletConfig {
    pub id: String,
}

impl WalletConfig {
    pub fn new(id: String) -> Self {
        Self { id }
    }
}

/// `WalletCredentials` contains the key used to unlock the wallet
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct WalletCredentials {
    pub key: String,
}

impl WalletCredentials {
    pub fn new(key: String) -> Self {
        Self { key }
    }
}

impl std::fmt::Debug for WalletCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletCredentials")
            .field("key", &"***")
            .finish()
    }
}

/// `PoolConfig` is the ledger pool configuration, `genesis_txn` is the genesis file location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct PoolConfig {
    pub genesis_txn: String,
}

impl PoolConfig {
    pub fn new(genesis_txn: String) -> Self {
        Self { genesis_txn }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WalletOpenStatus<THandle> {
    Opened(THandle),
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WalletCreateStatus {
    Created,
    AlreadyExists,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PoolOpenStatus<THandle> {
    Opened(THandle),
    LedgerConfigNotFound,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PoolCreateStatus {
    Created,
    AlreadyExists,
    Failed(String),
}

/// `WalletProviderBuilder` is the credential store provider abstraction
///
/// The open and create operations report their outcome through an explicit status,
/// a missing wallet is an expected outcome, not an error
#[async_trait]
pub trait WalletProviderBuilder: Clone + Sync + Send {
    type Handle: Clone + Send + Sync;

    async fn open_wallet(
        &self,
        config: &WalletConfig,
        credentials: &WalletCredentials,
    ) -> WalletOpenStatus<Self::Handle>;

    async fn create_wallet(
        &self,
        config: &WalletConfig,
        credentials: &WalletCredentials,
    ) -> WalletCreateStatus;

    async fn close_wallet(&self, handle: Self::Handle) -> Result<(), ProvisioningError>;

    async fn delete_wallet(
        &self,
        config: &WalletConfig,
        credentials: &WalletCredentials,
    ) -> Result<(), ProvisioningError>;
}

/// `PoolProviderBuilder` is the ledger pool client provider abstraction
#[async_trait]
pub trait PoolProviderBuilder: Clone + Sync + Send {
    type Handle: Clone + Send + Sync;

    async fn open_pool(&self, ledger_name: &str) -> PoolOpenStatus<Self::Handle>;

    async fn create_pool_config(&self, ledger_name: &str, config: &PoolConfig)
        -> PoolCreateStatus;

    async fn close_pool(&self, handle: Self::Handle) -> Result<(), ProvisioningError>;
}
