use rstdev_storage::engine::rocksdb::lib::rust_rocksdb::merge_operator::MergeOperands;

use super::{Bucket as DbBucket, DbError};

pub const MERGE_BUCKET_ID: &str = "merge_bucket";
pub const MERGE_NAMES_PREFIX: &str = "merge_names";

fn merge_names(existing: Option<&[u8]>, operands: &MergeOperands) -> Option<Vec<u8>> {
    let mut bucket: DbBucket<String> = match existing {
        Some(val) => DbBucket::try_from(val.to_vec()).ok()?,
        None => DbBucket::new(),
    };

    for op in operands {
        if let Ok(name) = String::from_utf8(op.to_vec()) {
            bucket.add(name);
        }
    }

    let output: Result<Vec<u8>, DbError> = bucket.try_into();
    output.ok()
}

/// `merge_bucket` appends the operands into the bucket stored under a `merge_names` key,
/// any other key keeps its existing value
pub fn merge_bucket(
    new_key: &[u8],
    existing: Option<&[u8]>,
    operands: &MergeOperands,
) -> Option<Vec<u8>> {
    let key = String::from_utf8(new_key.to_vec()).ok()?;

    match key.split(':').next() {
        Some(MERGE_NAMES_PREFIX) => merge_names(existing, operands),
        _ => existing.map(|val| val.to_vec()),
    }
}
