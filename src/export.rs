// 📤 Height Export - registry → { entity: { view: meters } } → JSON
//
// One synchronous pass:
// 1. Build every registry entry once
// 2. Key each entity's record by its name
// 3. Read each view's height in meters
// 4. Serialize with 4-space indentation
//
// Any failure aborts the export before anything is serialized.

use crate::catalog::load_catalog;
use crate::entities::{EntityRegistry, HeightSource, SchemaVersion, ViewV1, ViewV2};
use crate::error::{ExportError, ExportResult};
use crate::jsonfmt::{to_host_json, to_host_json_pretty};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// entity name → view name → height in meters
pub type HeightTable = BTreeMap<String, BTreeMap<String, f64>>;

// ============================================================================
// CORE OPERATION
// ============================================================================

/// Build every entity in the registry and collect its view heights
pub fn collect_heights<V: HeightSource>(registry: &EntityRegistry<V>) -> ExportResult<HeightTable> {
    let mut table = HeightTable::new();

    for (key, factory) in registry.iter() {
        let entity = factory()?;
        let name = entity.require_name(key)?;

        if table.contains_key(name) {
            return Err(ExportError::DuplicateEntity(name.to_string()));
        }

        let heights = entity.view_heights(name)?;
        debug!(entity = %name, views = heights.len(), "Collected view heights");

        table.insert(name.to_string(), heights);
    }

    Ok(table)
}

/// Export the registry as 4-space indented JSON
pub fn export_heights<V: HeightSource>(registry: &EntityRegistry<V>) -> ExportResult<String> {
    let table = collect_heights(registry)?;
    let json = to_json_pretty(&table)?;

    info!(
        entities = table.len(),
        views = table.values().map(|views| views.len()).sum::<usize>(),
        "Exported entity heights"
    );

    Ok(json)
}

// ============================================================================
// SERIALIZATION
// ============================================================================

/// Serialize a height table as 4-space indented JSON
///
/// Numbers are written the way the host writes them: whole-meter heights as
/// integers ("2", not "2.0"), up to 1e21.
pub fn to_json_pretty(table: &HeightTable) -> ExportResult<String> {
    check_finite(table)?;
    to_host_json_pretty(table)
}

/// Serialize any payload that carries a height table (API responses)
/// with the same number formatting as `to_json_pretty`, on one line
pub fn to_json_compact<T: Serialize>(value: &T) -> ExportResult<String> {
    to_host_json(value)
}

/// Parse an exported height table back
pub fn read_heights(json: &str) -> ExportResult<HeightTable> {
    Ok(serde_json::from_str(json)?)
}

/// serde_json would write NaN and infinities as null
fn check_finite(table: &HeightTable) -> ExportResult<()> {
    let bad = table
        .values()
        .flat_map(|views| views.values())
        .find(|meters| !meters.is_finite());

    match bad {
        Some(meters) => Err(ExportError::conversion(meters, "meters")),
        None => Ok(()),
    }
}

// ============================================================================
// HEIGHT EXPORTER
// ============================================================================

/// Exporter bound to one view schema, for catalogs read at runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct HeightExporter {
    schema: SchemaVersion,
}

impl HeightExporter {
    pub fn new(schema: SchemaVersion) -> Self {
        HeightExporter { schema }
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    /// Collect heights from a JSON entity catalog using this exporter's schema
    pub fn collect_catalog(&self, catalog_json: &str) -> ExportResult<HeightTable> {
        debug!(schema = %self.schema, "Reading entity catalog");

        match self.schema {
            SchemaVersion::V1 => collect_heights(&load_catalog::<ViewV1>(catalog_json)?),
            SchemaVersion::V2 => collect_heights(&load_catalog::<ViewV2>(catalog_json)?),
        }
    }

    /// Export a JSON entity catalog as 4-space indented JSON
    pub fn export_catalog(&self, catalog_json: &str) -> ExportResult<String> {
        let table = self.collect_catalog(catalog_json)?;
        let json = to_json_pretty(&table)?;

        info!(schema = %self.schema, entities = table.len(), "Exported catalog heights");
        Ok(json)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Entity;
    use crate::units::{Measurement, Unit};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn box_registry() -> EntityRegistry<ViewV2> {
        let mut registry = EntityRegistry::new();
        registry.register("Box", || {
            Ok(Entity::new("Box").with_view("front", ViewV2::new(Measurement::meters(2.0))))
        });
        registry
    }

    #[test]
    fn test_box_scenario() {
        let json = export_heights(&box_registry()).unwrap();
        assert_eq!(json, "{\n    \"Box\": {\n        \"front\": 2\n    }\n}");
    }

    #[test]
    fn test_empty_registry_exports_empty_object() {
        let registry: EntityRegistry<ViewV1> = EntityRegistry::new();
        assert_eq!(export_heights(&registry).unwrap(), "{}");
    }

    #[test]
    fn test_one_key_per_entity_and_view() {
        let mut registry = EntityRegistry::new();
        registry.register("tower", || {
            Ok(Entity::new("Tower")
                .with_view("front", ViewV1::new(Measurement::new(300.0, Unit::Meter)))
                .with_view("side", ViewV1::new(Measurement::new(0.5, Unit::Kilometer))))
        });
        registry.register("person", || {
            Ok(Entity::new("Person").with_view("front", ViewV1::new(Measurement::new(6.0, Unit::Foot))))
        });

        let table = collect_heights(&registry).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table["Tower"].len(), 2);
        assert_eq!(table["Tower"]["side"], 500.0);
        assert_eq!(table["Person"].len(), 1);
        assert!((table["Person"]["front"] - 1.8288).abs() < 1e-9);
    }

    #[test]
    fn test_output_keyed_by_entity_name_not_registry_key() {
        let mut registry = EntityRegistry::new();
        registry.register("box-factory", || {
            Ok(Entity::new("Box").with_view("front", ViewV2::new(Measurement::meters(1.0))))
        });

        let table = collect_heights(&registry).unwrap();
        assert!(table.contains_key("Box"));
        assert!(!table.contains_key("box-factory"));
    }

    #[test]
    fn test_each_factory_invoked_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = EntityRegistry::new();

        for name in ["A", "B", "C"] {
            let calls = Arc::clone(&calls);
            registry.register(name, move || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Entity::new(name).with_view("front", ViewV2::new(Measurement::meters(1.0))))
            });
        }

        export_heights(&registry).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_missing_height_aborts_export() {
        let mut registry = box_registry();
        registry.register("Broken", || {
            Ok(Entity::new("Broken").with_view("front", ViewV2::default()))
        });

        let err = export_heights(&registry).unwrap_err();
        assert!(matches!(
            err,
            ExportError::MissingHeight { ref entity, ref view, path: "height" }
                if entity == "Broken" && view == "front"
        ));
    }

    #[test]
    fn test_missing_name_aborts_export() {
        let mut registry: EntityRegistry<ViewV2> = EntityRegistry::new();
        registry.register("anon", || {
            Ok(Entity {
                name: None,
                views: BTreeMap::new(),
            })
        });

        assert!(matches!(
            export_heights(&registry),
            Err(ExportError::MissingName(key)) if key == "anon"
        ));
    }

    #[test]
    fn test_missing_factory_aborts_export() {
        let mut registry = box_registry();
        registry.register_missing("Ghost");

        assert!(matches!(
            export_heights(&registry),
            Err(ExportError::MissingEntity(key)) if key == "Ghost"
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = box_registry();
        registry.register("Box copy", || {
            Ok(Entity::new("Box").with_view("back", ViewV2::new(Measurement::meters(3.0))))
        });

        assert!(matches!(
            export_heights(&registry),
            Err(ExportError::DuplicateEntity(name)) if name == "Box"
        ));
    }

    #[test]
    fn test_non_finite_height_rejected() {
        let mut table = HeightTable::new();
        table.insert("Void".to_string(), BTreeMap::from([("front".to_string(), f64::NAN)]));

        assert!(matches!(
            to_json_pretty(&table),
            Err(ExportError::UnitConversion { .. })
        ));
    }

    #[test]
    fn test_unit_conversion_failure_aborts_export() {
        let mut registry = box_registry();
        registry.register("Giant", || {
            Ok(Entity::new("Giant").with_view("front", ViewV2::new(Measurement::new(f64::MAX, Unit::LightYear))))
        });

        assert!(matches!(
            export_heights(&registry),
            Err(ExportError::UnitConversion { .. })
        ));
    }

    #[test]
    fn test_unit_conversion_failure_aborts_catalog_export() {
        let catalog = r#"{
            "Box": {"name": "Box", "views": {"front": {"height": 2}}},
            "Giant": {"name": "Giant", "views": {"front": {"height": {"value": 1.7976931348623157e308, "unit": "light-years"}}}}
        }"#;

        assert!(matches!(
            HeightExporter::new(SchemaVersion::V2).export_catalog(catalog),
            Err(ExportError::UnitConversion { .. })
        ));
    }

    #[test]
    fn test_large_whole_heights_written_as_integers() {
        let mut registry = EntityRegistry::new();
        registry.register("Galaxy", || {
            Ok(Entity::new("Galaxy")
                .with_view("front", ViewV2::new(Measurement::new(1.0, Unit::LightYear)))
                .with_view("side", ViewV2::new(Measurement::meters(1e20)))
                .with_view("top", ViewV2::new(Measurement::meters(1e21))))
        });

        let json = export_heights(&registry).unwrap();
        assert!(json.contains("\"front\": 9460730472580800"));
        assert!(json.contains("\"side\": 100000000000000000000"));
        assert!(json.contains("\"top\": 1e+21"));
        assert_eq!(read_heights(&json).unwrap(), collect_heights(&registry).unwrap());
    }

    #[test]
    fn test_compact_payload_uses_integer_heights() {
        #[derive(Serialize)]
        struct Response<'a> {
            success: bool,
            data: &'a HeightTable,
        }

        let table = collect_heights(&box_registry()).unwrap();
        let json = to_json_compact(&Response { success: true, data: &table }).unwrap();
        assert_eq!(json, r#"{"success":true,"data":{"Box":{"front":2}}}"#);
    }

    #[test]
    fn test_fractional_heights_keep_precision() {
        let mut table = HeightTable::new();
        table.insert("Cat".to_string(), BTreeMap::from([("side".to_string(), 0.25)]));

        let json = to_json_pretty(&table).unwrap();
        assert!(json.contains("\"side\": 0.25"));
    }

    #[test]
    fn test_output_round_trips() {
        let mut registry = EntityRegistry::new();
        registry.register("Person", || {
            Ok(Entity::new("Person")
                .with_view("front", ViewV2::new(Measurement::new(175.0, Unit::Centimeter)))
                .with_view("back", ViewV2::new(Measurement::meters(2.0))))
        });

        let json = export_heights(&registry).unwrap();
        let parsed = read_heights(&json).unwrap();
        assert_eq!(parsed, collect_heights(&registry).unwrap());
        assert_eq!(to_json_pretty(&parsed).unwrap(), json);
    }

    #[test]
    fn test_exporter_selects_schema() {
        let v1_catalog = r#"{
            "Box": {"name": "Box", "views": {"front": {"attributes": {"height": {"base": {"value": 2, "unit": "meters"}}}}}}
        }"#;

        let json = HeightExporter::new(SchemaVersion::V1)
            .export_catalog(v1_catalog)
            .unwrap();
        assert_eq!(json, "{\n    \"Box\": {\n        \"front\": 2\n    }\n}");

        // Same data read with the v2 accessor has no height
        let err = HeightExporter::new(SchemaVersion::V2)
            .export_catalog(v1_catalog)
            .unwrap_err();
        assert!(matches!(err, ExportError::MissingHeight { path: "height", .. }));
    }
}
