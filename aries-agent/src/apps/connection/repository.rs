use std::convert::TryInto;

use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::debug;
use rstdev_storage::engine::rocksdb::db::DB;

use prople_aries_core::identity::connection::types::{
    ConnectionEntityAccessor, ConnectionError, RepoBuilder, RECORD_TYPE_CONNECTION,
};
use prople_aries_core::identity::connection::ConnectionRecord;

use crate::apps::types::AppError;
use crate::apps::{DbInstruction, DbRunner};

/// `Repository` stores the connection records, each record is saved under the
/// `{record_type}:{id}` key
#[derive(Clone)]
pub struct Repository {
    db: DbRunner<DB>,
}

impl Repository {
    pub fn new(db: DbRunner<DB>) -> Self {
        Self { db }
    }

    fn build_record_key(&self, record_type: &str, id: &str) -> String {
        format!("{}:{}", record_type, id)
    }

    async fn fetch(&self, key: String) -> Result<Option<Vec<u8>>, AppError> {
        let output = self.db.exec(DbInstruction::GetCf { key }).await?;
        Ok(output.into_value())
    }

    async fn store(&self, key: String, record: &ConnectionRecord) -> Result<(), ConnectionError> {
        let record_bytes: Vec<u8> = record.to_owned().try_into()?;

        self.db
            .exec(DbInstruction::SaveCf {
                key,
                value: record_bytes,
            })
            .await
            .map_err(|err| ConnectionError::RepoError(err.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl RepoBuilder for Repository {
    type EntityAccessor = ConnectionRecord;

    async fn save_record(&self, record: &Self::EntityAccessor) -> Result<(), ConnectionError> {
        let key = self.build_record_key(RECORD_TYPE_CONNECTION, &record.get_id());
        let existing = self
            .fetch(key.clone())
            .await
            .map_err(|err| ConnectionError::RepoError(err.to_string()))?;

        if existing.is_some() {
            return Err(ConnectionError::RecordExists(record.get_id()));
        }

        debug!("[connection:repository] save record: {}", key);
        self.store(key, record).await
    }

    async fn update_record(&self, record: &Self::EntityAccessor) -> Result<(), ConnectionError> {
        let key = self.build_record_key(RECORD_TYPE_CONNECTION, &record.get_id());
        let existing = self
            .fetch(key.clone())
            .await
            .map_err(|err| ConnectionError::RepoError(err.to_string()))?;

        if existing.is_none() {
            return Err(ConnectionError::RecordNotFound(record.get_id()));
        }

        debug!("[connection:repository] update record: {}", key);
        self.store(key, record).await
    }

    async fn get_record(
        &self,
        record_type: String,
        id: String,
    ) -> Result<Self::EntityAccessor, ConnectionError> {
        let key = self.build_record_key(&record_type, &id);
        let value = self
            .fetch(key)
            .await
            .map_err(|err| ConnectionError::RepoError(err.to_string()))?
            .ok_or(ConnectionError::RecordNotFound(id))?;

        ConnectionRecord::try_from(value)
    }
}
