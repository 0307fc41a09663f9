//! Common controller interface
//!
//! Each resource kind implements [`ResourceController`]; the driver only talks
//! to this trait. Kinds differ in their match predicate, in what happens when
//! adopting finds nothing, and in whether anything can change in place.

use super::model::{Managed, ResourceKind};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Difference between a record and its declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    None,
    /// The listed fields can be changed with an update call
    InPlace(Vec<&'static str>),
    /// The listed fields can only change by destroying and recreating
    Replace(Vec<&'static str>),
}

impl Change {
    /// Replacement wins over in-place changes
    pub fn classify(in_place: Vec<&'static str>, replace: Vec<&'static str>) -> Self {
        if !replace.is_empty() {
            Change::Replace(replace)
        } else if !in_place.is_empty() {
            Change::InPlace(in_place)
        } else {
            Change::None
        }
    }
}

#[async_trait]
pub trait ResourceController: Send + Sync {
    type Declaration: Send + Sync;
    type Record: Managed + Send + Sync;

    fn kind(&self) -> ResourceKind;

    /// Unmanaged record for a declaration
    fn desired(&self, declared: &Self::Declaration) -> Result<Self::Record>;

    /// Compare a managed record against its current declaration
    fn diff(&self, record: &Self::Record, declared: &Self::Declaration) -> Change;

    /// Provision the remote resource, then read back its computed fields
    ///
    /// The identifier is set as soon as the remote create succeeds, so a
    /// failing read-back still leaves a managed record behind.
    async fn create(&self, record: &mut Self::Record) -> Result<()>;

    /// Refresh computed fields from the remote resource
    ///
    /// A resource that no longer exists is an error, never an empty record.
    async fn read(&self, record: &mut Self::Record) -> Result<()>;

    /// Apply in-place changes, then read back
    ///
    /// Kinds without mutable fields keep this default, which refuses without
    /// calling the remote API.
    async fn update(&self, record: &mut Self::Record, declared: &Self::Declaration) -> Result<()> {
        let _ = (record, declared);
        Err(Error::UpdateUnsupported { kind: self.kind() })
    }

    /// Destroy the remote resource and clear the identifier
    async fn delete(&self, record: &mut Self::Record) -> Result<()>;

    /// Link an existing remote resource to a new record without changing it
    ///
    /// Candidates whose id is in `claimed` already back another record and
    /// are never matched.
    async fn adopt(
        &self,
        declared: &Self::Declaration,
        claimed: &BTreeSet<String>,
    ) -> Result<Option<Self::Record>>;
}

/// Fail unless the record has a remote identifier
pub(crate) fn ensure_managed<R: Managed>(kind: ResourceKind, record: &R) -> Result<()> {
    if record.is_managed() {
        Ok(())
    } else {
        Err(Error::Unmanaged { kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_wins() {
        assert_eq!(
            Change::classify(vec!["plan"], vec!["app"]),
            Change::Replace(vec!["app"])
        );
        assert_eq!(
            Change::classify(vec!["plan"], vec![]),
            Change::InPlace(vec!["plan"])
        );
        assert_eq!(Change::classify(vec![], vec![]), Change::None);
    }
}
