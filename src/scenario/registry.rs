//! Scenario registry
//!
//! Scenarios are registered as factories. The registry builds one throwaway
//! instance at registration time to learn the name and validate the schema,
//! then creates the live instance lazily on first lookup and hands out that
//! same instance from then on.

use crate::scenario::{
    AcademicCollector, DocsArchiver, EcommerceMonitor, NewsCrawler, Scenario, TableExtractor,
    TemplateScenario,
};
use crate::template::ExtractionTemplate;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Name prefix marking user-defined scenarios
const CUSTOM_PREFIX: &str = "custom_";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("Scenario '{0}' is already registered")]
    DuplicateName(String),

    #[error("Scenario '{name}' failed validation: {reason}")]
    InvalidScenario { name: String, reason: String },
}

type Factory = Box<dyn Fn() -> Arc<dyn Scenario> + Send + Sync>;

struct Entry {
    factory: Factory,
    instance: Option<Arc<dyn Scenario>>,
}

impl Entry {
    fn instance(&mut self) -> Arc<dyn Scenario> {
        self.instance
            .get_or_insert_with(|| (self.factory)())
            .clone()
    }
}

#[derive(Default)]
struct Inner {
    /// Names in registration order
    order: Vec<String>,
    entries: HashMap<String, Entry>,
}

/// Name-keyed collection of scenario factories
///
/// All methods take `&self`; the state sits behind a mutex so a registry can
/// be shared across tasks.
#[derive(Default)]
pub struct ScenarioRegistry {
    inner: Mutex<Inner>,
}

impl ScenarioRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in scenarios
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let registry = Self::new();
        registry.register(|| NewsCrawler)?;
        registry.register(|| DocsArchiver)?;
        registry.register(|| EcommerceMonitor)?;
        registry.register(|| AcademicCollector)?;
        registry.register(|| TableExtractor)?;
        Ok(registry)
    }

    /// Registers a scenario factory and returns the scenario's name
    ///
    /// # Errors
    ///
    /// - [`RegistryError::DuplicateName`] if the name is taken; the existing
    ///   entry is left untouched
    /// - [`RegistryError::InvalidScenario`] if the scenario fails
    ///   [`Scenario::validate`]
    pub fn register<F, S>(&self, factory: F) -> Result<String, RegistryError>
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: Scenario + 'static,
    {
        let probe = factory();
        let name = catch_unwind(AssertUnwindSafe(|| probe.schema().name)).map_err(|_| {
            RegistryError::InvalidScenario {
                name: String::new(),
                reason: "schema construction panicked".to_string(),
            }
        })?;

        let mut inner = self.lock();
        if inner.entries.contains_key(&name) {
            tracing::warn!("Rejected duplicate scenario registration '{}'", name);
            return Err(RegistryError::DuplicateName(name));
        }

        probe
            .validate()
            .map_err(|reason| RegistryError::InvalidScenario {
                name: name.clone(),
                reason,
            })?;

        inner.entries.insert(
            name.clone(),
            Entry {
                factory: Box::new(move || Arc::new(factory()) as Arc<dyn Scenario>),
                instance: None,
            },
        );
        inner.order.push(name.clone());

        tracing::info!("Registered scenario '{}'", name);
        Ok(name)
    }

    /// Registers a custom template as a [`TemplateScenario`]
    pub fn register_template(&self, template: ExtractionTemplate) -> Result<String, RegistryError> {
        self.register(move || TemplateScenario::new(template.clone()))
    }

    /// Returns the live instance for `name`, creating it on first use
    pub fn get(&self, name: &str) -> Option<Arc<dyn Scenario>> {
        self.lock().entries.get_mut(name).map(Entry::instance)
    }

    /// Returns the schema of every scenario, in registration order
    pub fn list_all(&self) -> Vec<ExtractionTemplate> {
        let mut inner = self.lock();
        let Inner { order, entries } = &mut *inner;

        order
            .iter()
            .filter_map(|name| entries.get_mut(name).map(|entry| entry.instance().schema()))
            .collect()
    }

    /// Returns schemas whose scenario name matches `category`
    ///
    /// Matching is by name prefix: `"custom"` selects names starting with
    /// `custom_`, `"builtin"` selects every other name, and any other
    /// category selects names starting with `"{category}_"`.
    pub fn list_by_category(&self, category: &str) -> Vec<ExtractionTemplate> {
        let prefix = format!("{category}_");

        self.list_all()
            .into_iter()
            .filter(|schema| match category {
                "custom" => schema.name.starts_with(CUSTOM_PREFIX),
                "builtin" => !schema.name.starts_with(CUSTOM_PREFIX),
                _ => schema.name.starts_with(&prefix),
            })
            .collect()
    }

    /// Removes a scenario and its live instance
    pub fn unregister(&self, name: &str) -> bool {
        let mut inner = self.lock();
        if inner.entries.remove(name).is_none() {
            return false;
        }
        inner.order.retain(|n| n != name);
        tracing::info!("Unregistered scenario '{}'", name);
        true
    }

    /// Removes every scenario
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
        tracing::info!("Cleared scenario registry");
    }

    pub fn count(&self) -> usize {
        self.lock().order.len()
    }

    /// Registered names, in registration order
    pub fn names(&self) -> Vec<String> {
        self.lock().order.clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().entries.contains_key(name)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
