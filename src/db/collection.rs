use std::marker::PhantomData;

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::AppError;

/// A record stored in its own sled tree, keyed by id.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Name of the sled tree holding this record type.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Typed view over one sled tree. Values are MessagePack with named fields.
#[derive(Clone)]
pub struct Collection<T> {
    tree: sled::Tree,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Collection<T> {
    /// Open or create the tree for `T` in `db`
    pub fn open(db: &sled::Db) -> Result<Self> {
        let tree = db.open_tree(T::COLLECTION)?;
        Ok(Self {
            tree,
            _record: PhantomData,
        })
    }

    /// Insert a new record, failing if the id is already taken
    pub fn insert(&self, record: &T) -> Result<(), AppError> {
        let bytes = rmp_serde::to_vec_named(record)?;
        let swapped = self
            .tree
            .compare_and_swap(record.id().as_bytes(), None as Option<&[u8]>, Some(bytes))?;
        if swapped.is_err() {
            return Err(AppError::Conflict(format!(
                "{} record already exists: {}",
                T::COLLECTION,
                record.id()
            )));
        }
        self.tree.flush()?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<T>> {
        if let Some(value) = self.tree.get(id.as_bytes())? {
            Ok(Some(rmp_serde::from_slice(&value)?))
        } else {
            Ok(None)
        }
    }

    /// Like `get`, but a missing record is a `NotFound` error
    pub fn require(&self, id: &str) -> Result<T, AppError> {
        self.get(id)?
            .ok_or_else(|| AppError::NotFound(format!("{} record {}", T::COLLECTION, id)))
    }

    pub fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.tree.contains_key(id.as_bytes())?)
    }

    /// Replace an existing record
    pub fn update(&self, record: &T) -> Result<(), AppError> {
        if !self.contains(record.id())? {
            return Err(AppError::NotFound(format!(
                "{} record {}",
                T::COLLECTION,
                record.id()
            )));
        }
        let bytes = rmp_serde::to_vec_named(record)?;
        self.tree.insert(record.id().as_bytes(), bytes)?;
        self.tree.flush()?;
        Ok(())
    }

    /// Remove a record, returning it
    pub fn delete(&self, id: &str) -> Result<T, AppError> {
        let removed = self
            .tree
            .remove(id.as_bytes())?
            .ok_or_else(|| AppError::NotFound(format!("{} record {}", T::COLLECTION, id)))?;
        self.tree.flush()?;
        Ok(rmp_serde::from_slice(&removed)?)
    }

    /// Up to `limit` records in key (creation) order
    pub fn list(&self, limit: usize) -> Result<Vec<T>> {
        let mut result = Vec::new();
        for item in self.tree.iter().take(limit) {
            let (_key, value) = item?;
            result.push(rmp_serde::from_slice(&value)?);
        }
        Ok(result)
    }

    /// The newest `limit` records, returned in key (creation) order
    pub fn latest(&self, limit: usize) -> Result<Vec<T>> {
        let mut result = Vec::new();
        for item in self.tree.iter().rev().take(limit) {
            let (_key, value) = item?;
            result.push(rmp_serde::from_slice(&value)?);
        }
        result.reverse();
        Ok(result)
    }

    /// Records matching `predicate`, scanning the whole tree and keeping at most `limit`
    pub fn find(&self, limit: usize, predicate: impl Fn(&T) -> bool) -> Result<Vec<T>> {
        let mut result = Vec::new();
        for item in self.tree.iter() {
            if result.len() >= limit {
                break;
            }
            let (_key, value) = item?;
            let record: T = rmp_serde::from_slice(&value)?;
            if predicate(&record) {
                result.push(record);
            }
        }
        Ok(result)
    }

    pub fn any(&self, predicate: impl Fn(&T) -> bool) -> Result<bool> {
        Ok(!self.find(1, predicate)?.is_empty())
    }

    pub fn count(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}
