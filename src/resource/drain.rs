//! Log drain controller

use super::controller::{ensure_managed, Change, ResourceController};
use super::matcher::{find_match, OnMiss, UrlMatch};
use super::model::{DrainDeclaration, DrainRecord, ResourceKind};
use crate::error::{Error, Result};
use crate::heroku::drains::{LogDrainApi, LogDrainCreateOpts};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Reconciles log drains
///
/// Drains have no mutable fields: any change replaces the drain. Adopting a
/// drain that does not exist adopts nothing rather than failing.
pub struct DrainController {
    client: Arc<dyn LogDrainApi>,
}

impl DrainController {
    const ON_MISS: OnMiss = OnMiss::Ignore;

    pub fn new(client: Arc<dyn LogDrainApi>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceController for DrainController {
    type Declaration = DrainDeclaration;
    type Record = DrainRecord;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Drain
    }

    fn desired(&self, declared: &DrainDeclaration) -> Result<DrainRecord> {
        Ok(DrainRecord::declared(declared))
    }

    fn diff(&self, record: &DrainRecord, declared: &DrainDeclaration) -> Change {
        let mut replace = Vec::new();
        if record.app != declared.app {
            replace.push("app");
        }
        if record.url != declared.url {
            replace.push("url");
        }
        Change::classify(Vec::new(), replace)
    }

    async fn create(&self, record: &mut DrainRecord) -> Result<()> {
        tracing::debug!("Drain create configuration: app={}, url={}", record.app, record.url);

        let opts = LogDrainCreateOpts {
            url: record.url.clone(),
        };
        let drain = self
            .client
            .log_drain_create(&record.app, &opts)
            .await
            .map_err(|e| Error::remote("creating drain", e))?;

        record.id = drain.id;
        record.url = drain.url;
        record.token = drain.token;
        tracing::info!("Drain ID: {}", record.id);

        self.read(record).await
    }

    async fn read(&self, record: &mut DrainRecord) -> Result<()> {
        ensure_managed(self.kind(), record)?;

        let drain = self
            .client
            .log_drain_info(&record.app, &record.id)
            .await
            .map_err(|e| Error::remote("retrieving drain", e))?;

        record.url = drain.url;
        record.token = drain.token;
        Ok(())
    }

    async fn delete(&self, record: &mut DrainRecord) -> Result<()> {
        ensure_managed(self.kind(), record)?;
        tracing::info!("Deleting drain: {}", record.id);

        self.client
            .log_drain_delete(&record.app, &record.id)
            .await
            .map_err(|e| Error::remote("deleting drain", e))?;

        record.id.clear();
        Ok(())
    }

    async fn adopt(
        &self,
        declared: &DrainDeclaration,
        claimed: &BTreeSet<String>,
    ) -> Result<Option<DrainRecord>> {
        let mut drains = self
            .client
            .log_drain_list(&declared.app)
            .await
            .map_err(|e| Error::remote("listing drains", e))?;
        drains.retain(|drain| !claimed.contains(&drain.id));

        let policy = UrlMatch::new(&declared.url);
        let found = Self::ON_MISS.resolve(self.kind(), &policy, find_match(&drains, &policy))?;

        Ok(found.map(|drain| {
            tracing::info!("Adopted drain {} for {}", drain.id, declared.url);
            DrainRecord {
                id: drain.id.clone(),
                ..DrainRecord::declared(declared)
            }
        }))
    }
}
