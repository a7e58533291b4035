// 🧍 Entity - a named thing with one height per view
//
// Entities are produced by the host's registry factories. The crate never
// mutates them; it only reads the name and the views.

use crate::entities::view::HeightSource;
use crate::error::{ExportError, ExportResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entity as exposed by the host, generic over the view shape `V`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity<V> {
    /// Display name; becomes the top-level key of an export
    #[serde(default)]
    pub name: Option<String>,

    /// Views by name ("front", "side", ...)
    #[serde(default = "BTreeMap::new")]
    pub views: BTreeMap<String, V>,
}

impl<V> Entity<V> {
    /// Create an entity with no views
    pub fn new(name: impl Into<String>) -> Self {
        Entity {
            name: Some(name.into()),
            views: BTreeMap::new(),
        }
    }

    /// Builder: add a view
    pub fn with_view(mut self, name: impl Into<String>, view: V) -> Self {
        self.views.insert(name.into(), view);
        self
    }

    /// Name of the entity, or MissingName tagged with the registry key it came from
    pub fn require_name(&self, registry_key: &str) -> ExportResult<&str> {
        self.name
            .as_deref()
            .ok_or_else(|| ExportError::MissingName(registry_key.to_string()))
    }
}

impl<V: HeightSource> Entity<V> {
    /// Height of every view, in meters
    ///
    /// Fails on the first view without a usable height.
    pub fn view_heights(&self, entity_name: &str) -> ExportResult<BTreeMap<String, f64>> {
        self.views
            .iter()
            .map(|(view_name, view)| -> ExportResult<(String, f64)> {
                let meters = view
                    .height_in_meters()
                    .map_err(|e| e.at(entity_name, view_name))?;
                Ok((view_name.clone(), meters))
            })
            .collect()
    }
}
