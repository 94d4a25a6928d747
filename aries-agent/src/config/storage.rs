use rst_common::standard::serde::{self, Deserialize};

use crate::common::types::{CommonError, ToValidate};

fn default_create_if_missing() -> bool {
    true
}

/// `ConnectionStorage` is the `[connection_store]` section, the `RocksDB` instance holding
/// the connection records
///
/// The records live in a single column family. An existing store is always reopened,
/// it's only created when `create_if_missing` is enabled (the default)
#[derive(Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
pub struct ConnectionStorage {
    pub(super) path: String,
    pub(super) column_family: String,

    #[serde(default)]
    pub(super) wal_dir: Option<String>,

    #[serde(default = "default_create_if_missing")]
    pub(super) create_if_missing: bool,
}

impl ConnectionStorage {
    pub fn get_path(&self) -> String {
        self.path.to_owned()
    }

    pub fn get_column_family(&self) -> String {
        self.column_family.to_owned()
    }

    /// `get_wal_dir` is `None` when the write ahead log stays inside the store path
    pub fn get_wal_dir(&self) -> Option<String> {
        self.wal_dir.to_owned()
    }

    pub fn get_create_if_missing(&self) -> bool {
        self.create_if_missing
    }
}

impl Default for ConnectionStorage {
    fn default() -> Self {
        Self {
            path: "".to_string(),
            column_family: "".to_string(),
            wal_dir: None,
            create_if_missing: default_create_if_missing(),
        }
    }
}

impl ToValidate for ConnectionStorage {
    fn validate(&self) -> Result<(), CommonError> {
        if self.path.is_empty() {
            return Err(CommonError::ValidationError(
                "config: connection_store:path is missing".to_string(),
            ));
        }

        if self.column_family.is_empty() {
            return Err(CommonError::ValidationError(
                "config: connection_store:column_family is missing".to_string(),
            ));
        }

        match self.wal_dir.as_deref() {
            Some("") => Err(CommonError::ValidationError(
                "config: connection_store:wal_dir must not be empty".to_string(),
            )),
            Some(dir) if dir == self.path => Err(CommonError::ValidationError(
                "config: connection_store:wal_dir must differ from path".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstdev_config::format::use_toml;
    use rstdev_config::parser::from_file;
    use rstdev_config::{types::ConfigError, Builder};
    use table_test::table_test;

    use crate::common::helpers::{self, testdb};

    #[test]
    fn test_parse_connection_store() -> Result<(), ConfigError> {
        let toml_file = testdb::fixture_path("config_store.toml");
        let storage: ConnectionStorage =
            Builder::new(from_file(toml_file)).fetch()?.parse(use_toml)?;

        assert_eq!(storage.get_path(), "./connection-storage");
        assert_eq!(storage.get_column_family(), "connection-cf");
        assert_eq!(storage.get_wal_dir(), Some("./connection-db-wal".to_string()));
        assert!(storage.get_create_if_missing());
        Ok(())
    }

    #[test]
    fn test_defaults() {
        let storage: ConnectionStorage = toml::from_str(
            r#"
            path = "./store"
            column_family = "records"
            "#,
        )
        .unwrap();

        assert!(storage.get_wal_dir().is_none());
        assert!(storage.get_create_if_missing());
        assert!(helpers::validate(storage).is_ok())
    }

    #[test]
    fn test_validation() {
        let valid = ConnectionStorage {
            path: "./store".to_string(),
            column_family: "records".to_string(),
            wal_dir: Some("./wal".to_string()),
            create_if_missing: true,
        };

        let table = vec![
            (
                ConnectionStorage {
                    path: "".to_string(),
                    ..valid.clone()
                },
                Some("config: connection_store:path is missing".to_string()),
            ),
            (
                ConnectionStorage {
                    column_family: "".to_string(),
                    ..valid.clone()
                },
                Some("config: connection_store:column_family is missing".to_string()),
            ),
            (
                ConnectionStorage {
                    wal_dir: Some("".to_string()),
                    ..valid.clone()
                },
                Some("config: connection_store:wal_dir must not be empty".to_string()),
            ),
            (
                ConnectionStorage {
                    wal_dir: Some("./store".to_string()),
                    ..valid.clone()
                },
                Some("config: connection_store:wal_dir must differ from path".to_string()),
            ),
            (valid.clone(), None),
        ];

        for (validator, input, expected) in table_test!(table) {
            let output = helpers::validate(input)
                .err()
                .map(|err| err.to_string().replace("validation error: ", ""));

            validator
                .given(&format!("{:?}", expected))
                .when("validate")
                .then("it should match the expected error")
                .assert_eq(expected, output);
        }
    }
}
