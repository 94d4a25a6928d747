use rst_common::standard::serde::{self, Deserialize};

use crate::common::types::{CommonError, ToValidate};

/// `Ledger` is the optional `[ledger]` section, the pool is only opened when it's configured
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(crate = "self::serde")]
pub struct Ledger {
    pub(super) ledger_name: String,
    pub(super) genesis_file_location: String,
}

impl Ledger {
    pub fn get(&self) -> (String, String) {
        (
            self.ledger_name.to_owned(),
            self.genesis_file_location.to_owned(),
        )
    }
}

impl ToValidate for Ledger {
    fn validate(&self) -> Result<(), CommonError> {
        if self.ledger_name.is_empty() {
            return Err(CommonError::ValidationError(
                "config: ledger:ledger_name is missing".to_string(),
            ));
        }

        if self.genesis_file_location.is_empty() {
            return Err(CommonError::ValidationError(
                "config: ledger:genesis_file_location is missing".to_string(),
            ));
        }

        Ok(())
    }
}
