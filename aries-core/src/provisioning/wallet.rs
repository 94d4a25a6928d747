use rst_common::with_logging::log::{debug, error, info};

use super::types::{
    ProvisioningError, WalletConfig, WalletCreateStatus, WalletCredentials, WalletOpenStatus,
    WalletProviderBuilder,
};

/// `open_or_create_wallet` opens the wallet, creating it first when it doesn't exist yet
///
/// The create step is attempted at most once. A concurrent creator winning the race
/// ([`WalletCreateStatus::AlreadyExists`]) is fine, the wallet is simply reopened. A wallet
/// still missing after a successful create is a fatal inconsistency
pub async fn open_or_create_wallet<TProvider>(
    provider: &TProvider,
    config: &WalletConfig,
    credentials: &WalletCredentials,
) -> Result<TProvider::Handle, ProvisioningError>
where
    TProvider: WalletProviderBuilder,
{
    debug!("[provisioning:wallet] opening wallet: {}", config.id);
    match provider.open_wallet(config, credentials).await {
        WalletOpenStatus::Opened(handle) => {
            info!("[provisioning:wallet] wallet opened: {}", config.id);
            return Ok(handle);
        }
        WalletOpenStatus::Failed(reason) => {
            error!("[provisioning:wallet] failed to open wallet: {}", reason);
            return Err(ProvisioningError::WalletOpenError(reason));
        }
        WalletOpenStatus::NotFound => {
            debug!("[provisioning:wallet] wallet not found: {}", config.id)
        }
    }

    match provider.create_wallet(config, credentials).await {
        WalletCreateStatus::Created => info!("[provisioning:wallet] wallet created: {}", config.id),
        WalletCreateStatus::AlreadyExists => {
            debug!("[provisioning:wallet] wallet already exists: {}", config.id)
        }
        WalletCreateStatus::Failed(reason) => {
            error!("[provisioning:wallet] failed to create wallet: {}", reason);
            return Err(ProvisioningError::WalletCreateError(reason));
        }
    }

    debug!("[provisioning:wallet] retrying to open wallet: {}", config.id);
    match provider.open_wallet(config, credentials).await {
        WalletOpenStatus::Opened(handle) => {
            info!("[provisioning:wallet] wallet opened: {}", config.id);
            Ok(handle)
        }
        WalletOpenStatus::NotFound => Err(ProvisioningError::WalletVanished(config.id.to_owned())),
        WalletOpenStatus::Failed(reason) => Err(ProvisioningError::WalletOpenError(reason)),
    }
}
