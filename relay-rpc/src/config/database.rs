use rst_common::standard::serde::{self, Deserialize};

use crate::common::types::{CommonError, ToValidate};

fn enabled() -> bool {
    true
}

fn default_bytes_per_sync_kb() -> u64 {
    1024
}

/// `Relay` is the RocksDB instance behind the correlation store
///
/// Identities, the identity index, trusted issuers and verified data share one column
/// family and are told apart by their key prefix. Verified data is the only copy the
/// relay keeps of what an agent returned, so integrity checks are on unless disabled
#[derive(Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
pub struct Relay {
    pub(super) path: String,
    pub(super) column_family: String,
    pub(super) wal_dir: String,

    #[serde(default = "enabled")]
    pub(super) create_if_missing: bool,

    #[serde(default)]
    pub(super) error_if_exists: bool,

    #[serde(default = "enabled")]
    pub(super) paranoid_checks: bool,

    #[serde(default = "default_bytes_per_sync_kb")]
    pub(super) bytes_per_sync_kb: u64,
}

impl Relay {
    pub fn get_path(&self) -> String {
        self.path.to_owned()
    }

    pub fn get_column_family(&self) -> String {
        self.column_family.to_owned()
    }

    pub fn get_wal_dir(&self) -> String {
        self.wal_dir.to_owned()
    }

    pub fn create_if_missing(&self) -> bool {
        self.create_if_missing
    }

    pub fn error_if_exists(&self) -> bool {
        self.error_if_exists
    }

    pub fn paranoid_checks(&self) -> bool {
        self.paranoid_checks
    }

    /// `get_bytes_per_sync` is zero when incremental syncing is off
    pub fn get_bytes_per_sync(&self) -> u64 {
        self.bytes_per_sync_kb * 1024
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self {
            path: "./relay-storage".to_string(),
            column_family: "relay".to_string(),
            wal_dir: "".to_string(),
            create_if_missing: enabled(),
            error_if_exists: false,
            paranoid_checks: enabled(),
            bytes_per_sync_kb: default_bytes_per_sync_kb(),
        }
    }
}

impl ToValidate for Relay {
    fn validate(&self) -> Result<(), CommonError> {
        let required = [
            ("path", &self.path),
            ("column_family", &self.column_family),
            ("wal_dir", &self.wal_dir),
        ];

        for (field, value) in required {
            if value.is_empty() {
                return Err(CommonError::ValidationError(format!(
                    "config: database:relay:{} is missing",
                    field
                )));
            }
        }

        if self.wal_dir == self.path {
            return Err(CommonError::ValidationError(
                "config: database:relay:wal_dir must differ from path".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(crate = "self::serde")]
pub struct Database {
    pub relay: Relay,
}

impl ToValidate for Database {
    fn validate(&self) -> Result<(), CommonError> {
        self.relay.validate()
    }
}
