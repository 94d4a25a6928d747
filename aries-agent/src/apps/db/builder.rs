use rstdev_storage::engine::rocksdb::db::DB;
use rstdev_storage::engine::rocksdb::options::Options;

use crate::common::types::CommonError;
use crate::config::ConnectionStorage;

use super::Runner;

/// `Builder` opens the `RocksDB` instance described by a [`ConnectionStorage`] section
pub struct Builder {
    storage: ConnectionStorage,
}

impl Builder {
    pub fn new(storage: ConnectionStorage) -> Self {
        Self { storage }
    }

    pub fn build(&self) -> Result<Runner<DB>, CommonError> {
        let column_family = self.storage.get_column_family();
        let create_if_missing = self.storage.get_create_if_missing();
        let wal_dir = self.storage.get_wal_dir();

        let mut db_opts = Options::new(self.storage.get_path(), column_family.to_owned());
        db_opts.build_default_opts().set_db_opts(move |opt| {
            opt.create_if_missing(create_if_missing);
            opt.create_missing_column_families(true);
            opt.set_error_if_exists(false);

            if let Some(dir) = wal_dir.as_deref() {
                opt.set_wal_dir(dir);
            }

            opt
        });

        let mut db = DB::new(db_opts).map_err(|err| CommonError::DBError(err.to_string()))?;
        db.build()
            .map_err(|err| CommonError::DBError(err.to_string()))?;

        Ok(Runner::new(db, column_family))
    }
}
