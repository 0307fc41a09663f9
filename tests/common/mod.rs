//! In-memory Heroku used by the integration tests
//!
//! Behaves like the Platform API where the controllers care: unqualified plans
//! are qualified on the server, switching an add-on to another service
//! provisions a new add-on id, and create calls take a while so overlapping
//! calls can be observed.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use hrec::heroku::addons::{Addon, AddonApi, AddonCreateOpts, AddonUpdateOpts, PlanRef};
use hrec::heroku::drains::{LogDrain, LogDrainApi, LogDrainCreateOpts};
use hrec::resource::plan_name::{is_qualified, service_name};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Tracks how many calls are running at once
#[derive(Debug, Default)]
pub struct Flight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Flight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct FakeHeroku {
    addons: Mutex<BTreeMap<(String, String), Addon>>,
    drains: Mutex<BTreeMap<(String, String), LogDrain>>,
    create_delay: Duration,
    pub addon_creates: Flight,
    pub drain_creates: Flight,
    pub update_calls: AtomicUsize,
}

fn not_found() -> anyhow::Error {
    anyhow!("API request failed: 404 (not_found)")
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn qualify(plan: &str) -> String {
    if is_qualified(plan) {
        plan.to_string()
    } else {
        format!("{plan}:hobby-dev")
    }
}

fn config_var_for(plan: &str) -> String {
    format!("{}_URL", service_name(plan).to_uppercase().replace('-', "_"))
}

impl FakeHeroku {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create calls take this long to answer
    pub fn with_create_delay(delay: Duration) -> Self {
        Self {
            create_delay: delay,
            ..Self::default()
        }
    }

    /// Put an add-on in place as if it had been created outside hrec
    pub fn seed_addon(&self, app: &str, plan: &str) -> Addon {
        let addon = Addon {
            id: new_id(),
            name: format!("{}-seeded", service_name(plan)),
            plan: PlanRef {
                id: new_id(),
                name: qualify(plan),
            },
            provider_id: format!("resource-{}@heroku.com", new_id()),
            config_vars: vec![config_var_for(plan)],
        };
        self.addons
            .lock()
            .unwrap()
            .insert((app.to_string(), addon.id.clone()), addon.clone());
        addon
    }

    pub fn seed_drain(&self, app: &str, url: &str) -> LogDrain {
        let drain = LogDrain {
            id: new_id(),
            url: url.to_string(),
            token: format!("d.{}", new_id()),
        };
        self.drains
            .lock()
            .unwrap()
            .insert((app.to_string(), drain.id.clone()), drain.clone());
        drain
    }

    pub fn addon_count(&self) -> usize {
        self.addons.lock().unwrap().len()
    }

    pub fn drain_count(&self) -> usize {
        self.drains.lock().unwrap().len()
    }
}

#[async_trait]
impl AddonApi for FakeHeroku {
    async fn addon_create(&self, app: &str, opts: &AddonCreateOpts) -> Result<Addon> {
        self.addon_creates.enter();
        tokio::time::sleep(self.create_delay).await;
        self.addon_creates.leave();

        if opts.plan.contains("invalid") {
            return Err(anyhow!("API request failed: 422 (invalid_params)"));
        }

        let addon = Addon {
            id: new_id(),
            name: format!("{}-{}", service_name(&opts.plan), self.addon_count()),
            plan: PlanRef {
                id: new_id(),
                name: qualify(&opts.plan),
            },
            provider_id: format!("resource-{}@heroku.com", new_id()),
            config_vars: vec![config_var_for(&opts.plan)],
        };
        self.addons
            .lock()
            .unwrap()
            .insert((app.to_string(), addon.id.clone()), addon.clone());
        Ok(addon)
    }

    async fn addon_info(&self, app: &str, id: &str) -> Result<Addon> {
        self.addons
            .lock()
            .unwrap()
            .get(&(app.to_string(), id.to_string()))
            .cloned()
            .ok_or_else(not_found)
    }

    async fn addon_update(&self, app: &str, id: &str, opts: &AddonUpdateOpts) -> Result<Addon> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut addons = self.addons.lock().unwrap();
        let mut addon = addons
            .remove(&(app.to_string(), id.to_string()))
            .ok_or_else(not_found)?;

        if service_name(&addon.plan.name) != service_name(&opts.plan) {
            addon.id = new_id();
            addon.config_vars = vec![config_var_for(&opts.plan)];
        }
        addon.plan.name = qualify(&opts.plan);

        addons.insert((app.to_string(), addon.id.clone()), addon.clone());
        Ok(addon)
    }

    async fn addon_delete(&self, app: &str, id: &str) -> Result<()> {
        self.addons
            .lock()
            .unwrap()
            .remove(&(app.to_string(), id.to_string()))
            .map(|_| ())
            .ok_or_else(not_found)
    }

    async fn addon_list(&self, app: &str) -> Result<Vec<Addon>> {
        Ok(self
            .addons
            .lock()
            .unwrap()
            .iter()
            .filter(|((owner, _), _)| owner == app)
            .map(|(_, addon)| addon.clone())
            .collect())
    }
}

#[async_trait]
impl LogDrainApi for FakeHeroku {
    async fn log_drain_create(&self, app: &str, opts: &LogDrainCreateOpts) -> Result<LogDrain> {
        self.drain_creates.enter();
        tokio::time::sleep(self.create_delay).await;
        self.drain_creates.leave();

        let drain = LogDrain {
            id: new_id(),
            url: opts.url.clone(),
            token: format!("d.{}", new_id()),
        };
        self.drains
            .lock()
            .unwrap()
            .insert((app.to_string(), drain.id.clone()), drain.clone());
        Ok(drain)
    }

    async fn log_drain_info(&self, app: &str, id: &str) -> Result<LogDrain> {
        self.drains
            .lock()
            .unwrap()
            .get(&(app.to_string(), id.to_string()))
            .cloned()
            .ok_or_else(not_found)
    }

    async fn log_drain_delete(&self, app: &str, id: &str) -> Result<()> {
        self.drains
            .lock()
            .unwrap()
            .remove(&(app.to_string(), id.to_string()))
            .map(|_| ())
            .ok_or_else(not_found)
    }

    async fn log_drain_list(&self, app: &str) -> Result<Vec<LogDrain>> {
        Ok(self
            .drains
            .lock()
            .unwrap()
            .iter()
            .filter(|((owner, _), _)| owner == app)
            .map(|(_, drain)| drain.clone())
            .collect())
    }
}
