use rst_common::with_logging::log::{debug, error, info};

use super::types::{
    PoolConfig, PoolCreateStatus, PoolOpenStatus, PoolProviderBuilder, ProvisioningError,
};

/// `open_or_create_pool` opens the ledger pool, registering its configuration from the
/// genesis file first when the ledger is unknown to the pool client
pub async fn open_or_create_pool<TProvider>(
    provider: &TProvider,
    ledger_name: &str,
    genesis_path: &str,
) -> Result<TProvider::Handle, ProvisioningError>
where
    TProvider: PoolProviderBuilder,
{
    debug!("[provisioning:pool] opening ledger pool: {}", ledger_name);
    match provider.open_pool(ledger_name).await {
        PoolOpenStatus::Opened(handle) => {
            info!("[provisioning:pool] ledger {}: opened", ledger_name);
            return Ok(handle);
        }
        PoolOpenStatus::Failed(reason) => {
            error!("[provisioning:pool] failed to open ledger pool: {}", reason);
            return Err(ProvisioningError::PoolOpenError(reason));
        }
        PoolOpenStatus::LedgerConfigNotFound => {
            debug!("[provisioning:pool] ledger config not found: {}", ledger_name)
        }
    }

    let config = PoolConfig::new(genesis_path.to_string());
    match provider.create_pool_config(ledger_name, &config).await {
        PoolCreateStatus::Created => info!("[provisioning:pool] ledger {}: created", ledger_name),
        PoolCreateStatus::AlreadyExists => {
            debug!("[provisioning:pool] ledger config already exists: {}", ledger_name)
        }
        PoolCreateStatus::Failed(reason) => {
            error!("[provisioning:pool] failed to create ledger config: {}", reason);
            return Err(ProvisioningError::PoolCreateError(reason));
        }
    }

    match provider.open_pool(ledger_name).await {
        PoolOpenStatus::Opened(handle) => {
            info!("[provisioning:pool] ledger {}: opened", ledger_name);
            Ok(handle)
        }
        PoolOpenStatus::LedgerConfigNotFound => {
            Err(ProvisioningError::PoolVanished(ledger_name.to_string()))
        }
        PoolOpenStatus::Failed(reason) => Err(ProvisioningError::PoolOpenError(reason)),
    }
}
