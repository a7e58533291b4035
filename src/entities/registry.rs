// 📚 Entity Registry - entity name → factory
//
// The host owns its entities; the registry only knows how to build one on
// demand. Exports read the registry, they never change it.

use crate::entities::entity::Entity;
use crate::error::{ExportError, ExportResult};
use std::collections::BTreeMap;
use std::fmt;

/// Zero-argument constructor for one entity
pub type EntityFactory<V> = Box<dyn Fn() -> ExportResult<Entity<V>> + Send + Sync>;

/// Registry of entity factories, iterated in key order
pub struct EntityRegistry<V> {
    factories: BTreeMap<String, EntityFactory<V>>,
}

impl<V> EntityRegistry<V> {
    pub fn new() -> Self {
        EntityRegistry {
            factories: BTreeMap::new(),
        }
    }

    /// Register a factory under `key`, replacing any previous one
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn() -> ExportResult<Entity<V>> + Send + Sync + 'static,
    {
        self.factories.insert(key.into(), Box::new(factory));
    }

    /// Register a key whose factory is absent; building it fails with MissingEntity
    pub fn register_missing(&mut self, key: impl Into<String>)
    where
        V: 'static,
    {
        let key = key.into();
        let name = key.clone();
        self.register(key, move || -> ExportResult<Entity<V>> {
            Err(ExportError::MissingEntity(name.clone()))
        });
    }

    /// Build the entity registered under `key`
    pub fn instantiate(&self, key: &str) -> ExportResult<Entity<V>> {
        let factory = self
            .factories
            .get(key)
            .ok_or_else(|| ExportError::MissingEntity(key.to_string()))?;
        factory()
    }

    /// Registry keys and their factories, in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityFactory<V>)> {
        self.factories.iter().map(|(k, f)| (k.as_str(), f))
    }

    pub fn keys(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl<V> EntityRegistry<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Register a fixed entity under its own name; the factory hands out clones
    pub fn register_entity(&mut self, entity: Entity<V>) -> ExportResult<()> {
        let key = entity.require_name("<unnamed>")?.to_string();
        self.register(key, move || Ok(entity.clone()));
        Ok(())
    }
}

impl<V> Default for EntityRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for EntityRegistry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("keys", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
