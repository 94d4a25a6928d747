use rst_common::with_tokio::tokio::task::spawn_blocking;
use rstdev_storage::engine::rocksdb::db::DB;
use rstdev_storage::types::Storage;

use crate::apps::types::AppError;

use super::types::{Instruction, OutputOpts};

/// `Runner` executes storage instructions on the blocking thread pool, `RocksDB` calls
/// must not block the async runtime
#[derive(Clone)]
pub struct Runner<TStorage>
where
    TStorage: Storage<Instance = DB>,
{
    instance: TStorage,
    column_family: String,
}

impl<TStorage> Runner<TStorage>
where
    TStorage: Storage<Instance = DB>,
{
    pub fn new(instance: TStorage, column_family: String) -> Self {
        Self {
            instance,
            column_family,
        }
    }

    pub fn get_column_family(&self) -> String {
        self.column_family.to_owned()
    }
}

impl Runner<DB> {
    pub async fn exec(&self, instruction: Instruction) -> Result<OutputOpts, AppError> {
        let instance = self.instance.clone().get_instance();

        let db_instance = instance
            .db
            .clone()
            .ok_or(AppError::DbError("db instance is missing".to_string()))?;

        let cf_def = self.get_column_family();

        match instruction {
            Instruction::SaveCf { key, value } => {
                spawn_blocking(move || {
                    let cf = db_instance
                        .cf_handle(cf_def.as_str())
                        .ok_or(AppError::DbError("cf handler failed".to_string()))?;

                    db_instance
                        .put_cf(cf, key, value)
                        .map_err(|err| AppError::DbError(err.to_string()))
                })
                .await
                .map_err(|err| AppError::DbError(err.to_string()))??;

                Ok(OutputOpts::None)
            }
            Instruction::GetCf { key } => {
                let value = spawn_blocking(move || {
                    let cf = db_instance
                        .cf_handle(cf_def.as_str())
                        .ok_or(AppError::DbError("cf handler failed".to_string()))?;

                    db_instance
                        .get_cf(cf, key)
                        .map_err(|err| AppError::DbError(err.to_string()))
                })
                .await
                .map_err(|err| AppError::DbError(err.to_string()))??;

                Ok(OutputOpts::SingleByte { value })
            }
        }
    }
}
