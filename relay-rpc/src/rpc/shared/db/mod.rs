mod bucket;
mod builder;
mod merge_operators;
mod types;

pub use bucket::Bucket;
pub use builder::Builder;
pub use merge_operators::MERGE_NAMES_PREFIX;
pub use types::DbError;
