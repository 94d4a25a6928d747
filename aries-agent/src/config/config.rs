use rst_common::standard::serde::{self, Deserialize};

use crate::common::types::{CommonError, ToValidate};

use super::{AgentSettings, ConnectionStorage, Ledger};

/// `Config` is the agent configuration, the `[ledger]` section is optional
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(crate = "self::serde")]
pub struct Config {
    pub(super) agent: AgentSettings,
    pub(super) ledger: Option<Ledger>,
    pub(super) connection_store: ConnectionStorage,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent(&self) -> &AgentSettings {
        &self.agent
    }

    pub fn ledger(&self) -> Option<&Ledger> {
        self.ledger.as_ref()
    }

    pub fn connection_store(&self) -> &ConnectionStorage {
        &self.connection_store
    }
}

impl ToValidate for Config {
    fn validate(&self) -> Result<(), CommonError> {
        self.agent.validate()?;
        if let Some(ledger) = self.ledger.as_ref() {
            ledger.validate()?;
        }

        self.connection_store.validate()?;
        Ok(())
    }
}
