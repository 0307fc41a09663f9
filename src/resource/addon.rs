//! Add-on controller

use super::controller::{ensure_managed, Change, ResourceController};
use super::flatten;
use super::gate::SerializationGate;
use super::matcher::{find_match, OnMiss, PlanMatch};
use super::model::{AddonDeclaration, AddonRecord, ResourceKind};
use super::plan_name::normalize_plan;
use crate::error::{Error, Result};
use crate::heroku::addons::{AddonApi, AddonCreateOpts, AddonUpdateOpts};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Reconciles add-ons
///
/// Creation runs inside the account's [`SerializationGate`]; reads, updates,
/// deletes and adoption do not.
pub struct AddonController {
    client: Arc<dyn AddonApi>,
    gate: Arc<SerializationGate>,
}

impl AddonController {
    const ON_MISS: OnMiss = OnMiss::Fail;

    pub fn new(client: Arc<dyn AddonApi>, gate: Arc<SerializationGate>) -> Self {
        Self { client, gate }
    }

    fn plan_changed(record: &AddonRecord, declared: &AddonDeclaration) -> bool {
        normalize_plan(&declared.plan, &record.plan) != declared.plan
    }
}

#[async_trait]
impl ResourceController for AddonController {
    type Declaration = AddonDeclaration;
    type Record = AddonRecord;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Addon
    }

    fn desired(&self, declared: &AddonDeclaration) -> Result<AddonRecord> {
        AddonRecord::declared(declared)
    }

    fn diff(&self, record: &AddonRecord, declared: &AddonDeclaration) -> Change {
        let mut replace = Vec::new();
        if record.app != declared.app {
            replace.push("app");
        }
        match declared.flat_config() {
            Ok(config) if config == record.config => {}
            _ => replace.push("config"),
        }

        let mut in_place = Vec::new();
        if Self::plan_changed(record, declared) {
            in_place.push("plan");
        }

        Change::classify(in_place, replace)
    }

    async fn create(&self, record: &mut AddonRecord) -> Result<()> {
        let addon = {
            let _pass = self.gate.enter().await;

            let opts = AddonCreateOpts {
                plan: record.plan.clone(),
                config: record.config.as_ref().map(flatten::unflatten),
            };
            tracing::debug!(
                "Addon create configuration: app={}, plan={}, config keys={:?}",
                record.app,
                opts.plan,
                opts.config.as_ref().map(|c| c.keys().collect::<Vec<_>>())
            );

            self.client
                .addon_create(&record.app, &opts)
                .await
                .map_err(|e| Error::remote("creating addon", e))?
        };

        record.id = addon.id;
        tracing::info!("Addon ID: {}", record.id);

        self.read(record).await
    }

    async fn read(&self, record: &mut AddonRecord) -> Result<()> {
        ensure_managed(self.kind(), record)?;

        let addon = self
            .client
            .addon_info(&record.app, &record.id)
            .await
            .map_err(|e| Error::remote("retrieving addon", e))?;

        // An unqualified declared plan accepts whatever plan Heroku picked
        record.plan = normalize_plan(&record.plan, &addon.plan.name);
        record.name = addon.name;
        record.provider_id = addon.provider_id;

        let names: BTreeMap<String, String> = addon
            .config_vars
            .into_iter()
            .map(|name| (name.clone(), name))
            .collect();
        record.config_vars = vec![names];

        Ok(())
    }

    async fn update(&self, record: &mut AddonRecord, declared: &AddonDeclaration) -> Result<()> {
        ensure_managed(self.kind(), record)?;

        if Self::plan_changed(record, declared) {
            let opts = AddonUpdateOpts {
                plan: declared.plan.clone(),
            };
            let addon = self
                .client
                .addon_update(&record.app, &record.id, &opts)
                .await
                .map_err(|e| Error::remote("updating addon", e))?;

            if addon.id != record.id {
                tracing::info!("Addon {} is now {}", record.id, addon.id);
            }
            record.id = addon.id;
            record.plan = declared.plan.clone();
        }

        self.read(record).await
    }

    async fn delete(&self, record: &mut AddonRecord) -> Result<()> {
        ensure_managed(self.kind(), record)?;
        tracing::info!("Deleting Addon: {}", record.id);

        self.client
            .addon_delete(&record.app, &record.id)
            .await
            .map_err(|e| Error::remote("deleting addon", e))?;

        record.id.clear();
        Ok(())
    }

    async fn adopt(
        &self,
        declared: &AddonDeclaration,
        claimed: &BTreeSet<String>,
    ) -> Result<Option<AddonRecord>> {
        let mut addons = self
            .client
            .addon_list(&declared.app)
            .await
            .map_err(|e| Error::remote("listing addons", e))?;
        addons.retain(|addon| !claimed.contains(&addon.id));

        let policy = PlanMatch::new(&declared.plan);
        let found = Self::ON_MISS.resolve(self.kind(), &policy, find_match(&addons, &policy))?;
        let Some(addon) = found else {
            return Ok(None);
        };

        let mut record = AddonRecord::declared(declared)?;
        record.id = addon.id.clone();
        tracing::info!("Adopted addon {} for plan {}", record.id, declared.plan);

        Ok(Some(record))
    }
}
