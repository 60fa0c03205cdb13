use rst_common::standard::serde::de::DeserializeOwned;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use super::types::DbError;

/// `Bucket` keeps a small collection under a single key, values are kept unique
/// and in insertion order
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(crate = "self::serde")]
pub struct Bucket<T>
where
    T: Serialize + PartialEq,
{
    collections: Vec<T>,
}

impl<T> Bucket<T>
where
    T: Serialize + DeserializeOwned + PartialEq + Clone,
{
    pub fn new() -> Self {
        Self {
            collections: Vec::new(),
        }
    }

    /// `add` returns false when the value is already part of the bucket
    pub fn add(&mut self, val: T) -> bool {
        if self.collections.contains(&val) {
            return false;
        }

        self.collections.push(val);
        true
    }

    pub fn contains(&self, val: &T) -> bool {
        self.collections.contains(val)
    }

    pub fn items(&self) -> Vec<T> {
        self.collections.clone()
    }
}

impl<T> FromIterator<T> for Bucket<T>
where
    T: Serialize + DeserializeOwned + PartialEq + Clone,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut bucket = Bucket::new();
        for val in iter {
            bucket.add(val);
        }

        bucket
    }
}

impl<T> TryInto<Vec<u8>> for Bucket<T>
where
    T: Serialize + PartialEq,
{
    type Error = DbError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(&self).map_err(|err| DbError::EncodeError(err.to_string()))
    }
}

impl<T> TryFrom<Vec<u8>> for Bucket<T>
where
    T: Serialize + DeserializeOwned + PartialEq,
{
    type Error = DbError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        serde_json::from_slice(&value).map_err(|err| DbError::DecodeError(err.to_string()))
    }
}

impl<T> ToJSON for Bucket<T>
where
    T: Serialize + PartialEq,
{
    fn to_json(&self) -> Result<String, BaseError> {
        serde_json::to_string(&self).map_err(|err| BaseError::ToJSONError(err.to_string()))
    }
}
