//! Apply
//!
//! Drives the controllers over a manifest and the stored state. Every address
//! of a kind is reconciled concurrently; the controllers themselves decide
//! what must be serialized.

use crate::manifest::Manifest;
use crate::resource::{
    AddonController, Change, DrainController, Managed, ResourceController, ResourceKind,
};
use crate::state::{State, StoredResource};
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// What happened to one address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Created,
    Adopted,
    Updated,
    Replaced,
    Unchanged,
    Deleted,
    /// Adoption found nothing to link
    NotFound,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Created => "created",
            Action::Adopted => "adopted",
            Action::Updated => "updated",
            Action::Replaced => "replaced",
            Action::Unchanged => "unchanged",
            Action::Deleted => "deleted",
            Action::NotFound => "nothing found",
        };
        f.write_str(s)
    }
}

/// Result of reconciling one address
#[derive(Debug)]
pub struct Outcome {
    pub kind: ResourceKind,
    pub address: String,
    /// What to persist for this address afterwards, `None` to forget it
    pub stored: Option<StoredResource>,
    pub result: crate::Result<Action>,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(action) => write!(f, "{}.{}: {}", self.kind, self.address, action),
            Err(err) => write!(f, "{}.{}: failed: {}", self.kind, self.address, err),
        }
    }
}

/// Outcomes of a run together with the state to persist
#[derive(Debug)]
pub struct Report {
    pub state: State,
    pub outcomes: Vec<Outcome>,
}

impl Report {
    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }
}

fn keep<R: Managed>(record: &R) -> Option<StoredResource> {
    record.is_managed().then(|| StoredResource::from_record(record))
}

/// Reconcile one address from its stored and declared state
pub async fn reconcile_one<C: ResourceController>(
    controller: &C,
    stored: Option<StoredResource>,
    declared: Option<&C::Declaration>,
) -> (Option<StoredResource>, crate::Result<Action>) {
    match (stored, declared) {
        (None, None) => (None, Ok(Action::Unchanged)),

        (None, Some(declared)) => {
            let mut record = match controller.desired(declared) {
                Ok(record) => record,
                Err(e) => return (None, Err(e)),
            };
            let result = controller.create(&mut record).await.map(|_| Action::Created);
            (keep(&record), result)
        }

        (Some(stored), None) => {
            let mut record: C::Record = match stored.to_record() {
                Ok(record) => record,
                Err(e) => return (Some(stored), Err(e)),
            };
            match controller.delete(&mut record).await {
                Ok(()) => (None, Ok(Action::Deleted)),
                Err(e) => (Some(stored), Err(e)),
            }
        }

        (Some(stored), Some(declared)) => {
            let mut record: C::Record = match stored.to_record() {
                Ok(record) => record,
                Err(e) => return (Some(stored), Err(e)),
            };
            if let Err(e) = controller.read(&mut record).await {
                return (Some(stored), Err(e));
            }

            match controller.diff(&record, declared) {
                Change::None => (keep(&record), Ok(Action::Unchanged)),
                Change::InPlace(fields) => {
                    tracing::info!("{} changes in place: {:?}", controller.kind(), fields);
                    let result = controller
                        .update(&mut record, declared)
                        .await
                        .map(|_| Action::Updated);
                    (keep(&record), result)
                }
                Change::Replace(fields) => {
                    tracing::info!("{} must be replaced: {:?}", controller.kind(), fields);
                    let mut replacement = match controller.desired(declared) {
                        Ok(replacement) => replacement,
                        Err(e) => return (keep(&record), Err(e)),
                    };
                    if let Err(e) = controller.delete(&mut record).await {
                        return (keep(&record), Err(e));
                    }
                    let result = controller
                        .create(&mut replacement)
                        .await
                        .map(|_| Action::Replaced);
                    (keep(&replacement), result)
                }
            }
        }
    }
}

/// Reconcile every stored or declared address of one kind
pub async fn reconcile_kind<C: ResourceController>(
    controller: &C,
    stored: &BTreeMap<String, StoredResource>,
    declared: &BTreeMap<String, C::Declaration>,
) -> Vec<Outcome> {
    let addresses: BTreeSet<&String> = stored.keys().chain(declared.keys()).collect();

    let pending = addresses.into_iter().map(|address| async move {
        let (stored, result) =
            reconcile_one(controller, stored.get(address).cloned(), declared.get(address)).await;
        Outcome {
            kind: controller.kind(),
            address: address.clone(),
            stored,
            result,
        }
    });

    join_all(pending).await
}

/// Adopt declared addresses that are not tracked yet
///
/// With `only`, just that address is considered. Addresses are adopted one
/// after another so a remote resource already tracked, or adopted earlier in
/// the run, is never linked to a second address.
pub async fn adopt_kind<C: ResourceController>(
    controller: &C,
    stored: &BTreeMap<String, StoredResource>,
    declared: &BTreeMap<String, C::Declaration>,
    only: Option<&str>,
) -> Vec<Outcome> {
    let mut claimed: BTreeSet<String> = stored.values().map(|s| s.id.clone()).collect();
    let mut outcomes = Vec::new();

    let pending = declared
        .iter()
        .filter(|(address, _)| !stored.contains_key(*address))
        .filter(|(address, _)| only.map_or(true, |only| only == address.as_str()));

    for (address, declaration) in pending {
        let (kept, result) = match controller.adopt(declaration, &claimed).await {
            Ok(Some(mut record)) => {
                claimed.insert(record.id().to_string());
                let result = controller.read(&mut record).await.map(|_| Action::Adopted);
                (keep(&record), result)
            }
            Ok(None) => (None, Ok(Action::NotFound)),
            Err(e) => (None, Err(e)),
        };
        outcomes.push(Outcome {
            kind: controller.kind(),
            address: address.clone(),
            stored: kept,
            result,
        });
    }

    outcomes
}

/// The controllers a run needs
pub struct Controllers {
    pub addons: AddonController,
    pub drains: DrainController,
}

fn collect(outcomes: &[Outcome], kind: ResourceKind) -> BTreeMap<String, StoredResource> {
    outcomes
        .iter()
        .filter(|o| o.kind == kind)
        .filter_map(|o| o.stored.clone().map(|s| (o.address.clone(), s)))
        .collect()
}

/// Bring remote resources in line with the manifest
pub async fn apply(controllers: &Controllers, manifest: &Manifest, state: &State) -> Report {
    let (addons, drains) = futures::join!(
        reconcile_kind(&controllers.addons, &state.addons, &manifest.addons),
        reconcile_kind(&controllers.drains, &state.drains, &manifest.drains),
    );

    let outcomes: Vec<Outcome> = addons.into_iter().chain(drains).collect();
    let state = State {
        addons: collect(&outcomes, ResourceKind::Addon),
        drains: collect(&outcomes, ResourceKind::Drain),
    };

    Report { state, outcomes }
}

/// Destroy everything in the state
pub async fn destroy(controllers: &Controllers, state: &State) -> Report {
    apply(controllers, &Manifest::default(), state).await
}

/// Link existing remote resources to untracked manifest addresses
pub async fn import(
    controllers: &Controllers,
    manifest: &Manifest,
    state: &State,
    only: Option<&str>,
) -> Report {
    let (addons, drains) = futures::join!(
        adopt_kind(&controllers.addons, &state.addons, &manifest.addons, only),
        adopt_kind(&controllers.drains, &state.drains, &manifest.drains, only),
    );

    let outcomes: Vec<Outcome> = addons.into_iter().chain(drains).collect();
    let mut merged = state.clone();
    merged.addons.extend(collect(&outcomes, ResourceKind::Addon));
    merged.drains.extend(collect(&outcomes, ResourceKind::Drain));

    Report {
        state: merged,
        outcomes,
    }
}
