use rstdev_storage::engine::rocksdb::db::DB;
use rstdev_storage::engine::rocksdb::executor::Executor;
use rstdev_storage::engine::rocksdb::options::Options;

use rst_common::with_logging::log::info;

use crate::common::types::CommonError;
use crate::config::Relay;

use super::merge_operators::{merge_bucket, MERGE_BUCKET_ID};

/// `Builder` opens the relay database described by `[database.relay]`
///
/// The column family always carries the bucket merge operator, the identity index
/// is only ever grown through it
pub struct Builder {
    cfg: Relay,
}

impl Builder {
    pub fn new(cfg: Relay) -> Self {
        Self { cfg }
    }

    pub fn build(&self) -> Result<Executor, CommonError> {
        let relay = self.cfg.clone();
        let cf_name = relay.get_column_family();

        let mut db_opts = Options::new(relay.get_path(), cf_name.clone());
        db_opts
            .build_default_opts()
            .set_db_opts(move |opt| {
                opt.create_if_missing(relay.create_if_missing());
                opt.create_missing_column_families(true);
                opt.set_error_if_exists(relay.error_if_exists());
                opt.set_wal_dir(relay.get_wal_dir());
                opt.set_paranoid_checks(relay.paranoid_checks());
                opt.set_bytes_per_sync(relay.get_bytes_per_sync());

                opt
            })
            .set_cf_opts(|opt| {
                opt.set_merge_operator_associative(MERGE_BUCKET_ID, merge_bucket);

                opt
            });

        let mut db = DB::new(db_opts).map_err(|err| CommonError::DbError(err.to_string()))?;
        let db_instance = db
            .build()
            .map_err(|err| CommonError::DbError(err.to_string()))?;

        db.set_db(db_instance);
        info!("[db:build] relay storage ready, cf: {}", cf_name);

        Ok(Executor::new(db, cf_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::env;
    use std::path::PathBuf;

    use rst_common::with_tokio::tokio;

    use rstdev_config::format::use_toml;
    use rstdev_config::parser::from_file;
    use rstdev_config::{types::ConfigError, Builder as ConfigBuilder};
    use rstdev_storage::engine::rocksdb::types::{
        Instruction as DbInstruction, OutputOpts as DbOutput,
    };

    use crate::config::Database;
    use crate::rpc::shared::db::{Bucket as DbBucket, MERGE_NAMES_PREFIX};

    fn merge_db_config() -> Result<Relay, ConfigError> {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("src/config/fixtures");

        let toml_file = format!("{}/config_db_merge.toml", path.display());
        let database: Database = ConfigBuilder::new(from_file(toml_file))
            .fetch()?
            .parse(use_toml)?;

        Ok(database.relay)
    }

    #[tokio::test]
    async fn test_build_registers_bucket_merge() {
        let relay = merge_db_config();
        assert!(!relay.is_err());

        let executor = Builder::new(relay.unwrap()).build();
        assert!(!executor.is_err());

        let executor = executor.unwrap();
        let index_key = format!("{}:builder_index", MERGE_NAMES_PREFIX);
        for name in ["alice", "bob", "alice"] {
            let merged = executor
                .exec(DbInstruction::MergeCf {
                    key: index_key.clone(),
                    value: name.as_bytes().to_vec(),
                })
                .await;
            assert!(!merged.is_err());
        }

        let output = executor
            .exec(DbInstruction::GetCf { key: index_key })
            .await
            .unwrap();

        let bytes = match output {
            DbOutput::SingleByte { value } => value,
            _ => None,
        };
        assert!(bytes.is_some());

        let bucket: DbBucket<String> = DbBucket::try_from(bytes.unwrap()).unwrap();
        let names = bucket.items();
        assert!(names.contains(&"alice".to_string()));
        assert!(names.contains(&"bob".to_string()));
        assert_eq!(names.iter().filter(|name| *name == "alice").count(), 1);
    }
}
