// 🗂️ Entity Catalog - JSON dump of the host's entities → EntityRegistry
//
// Catalog shape: { "<registry key>": <entity> | null, ... }
// A null entry is a registry key without a factory.

use crate::entities::{Entity, EntityRegistry};
use crate::error::{ExportError, ExportResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Parse a catalog into a registry for the view shape `V`
pub fn load_catalog<V>(json: &str) -> ExportResult<EntityRegistry<V>>
where
    V: DeserializeOwned + Clone + Send + Sync + 'static,
{
    let raw: serde_json::Map<String, Value> = serde_json::from_str(json)
        .map_err(|e| ExportError::catalog(format!("expected a JSON object of entities: {}", e)))?;

    let mut registry = EntityRegistry::new();

    for (key, value) in raw {
        if value.is_null() {
            debug!(key = %key, "Catalog entry has no entity");
            registry.register_missing(key);
            continue;
        }

        let entity: Entity<V> = serde_json::from_value(value)
            .map_err(|e| ExportError::catalog(format!("entry '{}': {}", key, e)))?;

        registry.register(key, move || Ok(entity.clone()));
    }

    debug!(entries = registry.len(), "Loaded entity catalog");
    Ok(registry)
}

/// Read and parse a catalog file
pub fn load_catalog_file<V>(path: &Path) -> ExportResult<EntityRegistry<V>>
where
    V: DeserializeOwned + Clone + Send + Sync + 'static,
{
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ExportError::catalog(format!("{}: {}", path.display(), e)))?;
    load_catalog(&contents)
}
