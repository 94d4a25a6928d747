use rst_common::standard::serde::{self, Deserialize};

use prople_aries_core::provisioning::types::{WalletConfig, WalletCredentials};

use crate::common::types::{CommonError, ToValidate};

/// `AgentSettings` is the `[agent]` section, the agent id is also used as the wallet id
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(crate = "self::serde")]
pub struct AgentSettings {
    pub(super) agent_id: String,
    pub(super) wallet_key: String,
    pub(super) label: String,
}

impl AgentSettings {
    pub fn get_agent_id(&self) -> String {
        self.agent_id.to_owned()
    }

    pub fn get_label(&self) -> String {
        self.label.to_owned()
    }

    pub fn get_wallet_config(&self) -> WalletConfig {
        WalletConfig::new(self.agent_id.to_owned())
    }

    pub fn get_wallet_credentials(&self) -> WalletCredentials {
        WalletCredentials::new(self.wallet_key.to_owned())
    }
}

impl ToValidate for AgentSettings {
    fn validate(&self) -> Result<(), CommonError> {
        if self.agent_id.is_empty() {
            return Err(CommonError::ValidationError(
                "config: agent:agent_id is missing".to_string(),
            ));
        }

        if self.wallet_key.is_empty() {
            return Err(CommonError::ValidationError(
                "config: agent:wallet_key is missing".to_string(),
            ));
        }

        if self.label.is_empty() {
            return Err(CommonError::ValidationError(
                "config: agent:label is missing".to_string(),
            ));
        }

        Ok(())
    }
}
