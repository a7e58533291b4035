// 🔭 Macrovision Scenes - exported heights → shareable scene URL
//
// An exported height table tells us how tall each model is at scale 1.
// To show an entity at a given height we scale its model by
// height / model height, lay entities out left to right and encode the
// scene as base64 JSON in the URL.
//
// Scales and offsets are computed in decimal so the link matches the one
// sizebot produces for the same inputs, digit for digit.

use crate::error::{ExportError, ExportResult};
use crate::export::{read_heights, HeightTable};
use crate::jsonfmt::to_python_json;
use crate::units::{Measurement, Unit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Scene format version understood by macrovision
pub const SCENE_VERSION: u32 = 3;

// ============================================================================
// MODEL HEIGHTS
// ============================================================================

/// Reference heights of every model view, as produced by an export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelHeights {
    table: HeightTable,
}

impl ModelHeights {
    pub fn new(table: HeightTable) -> Self {
        ModelHeights { table }
    }

    pub fn from_json(json: &str) -> ExportResult<Self> {
        Ok(ModelHeights::new(read_heights(json)?))
    }

    /// Height of `model` seen from `view` at scale 1, in meters
    pub fn reference_height(&self, model: &str, view: &str) -> ExportResult<f64> {
        let views = self
            .table
            .get(model)
            .ok_or_else(|| ExportError::UnknownModel(model.to_string()))?;

        views
            .get(view)
            .copied()
            .ok_or_else(|| ExportError::UnknownView {
                model: model.to_string(),
                view: view.to_string(),
            })
    }

    /// Scale that makes `model` seen from `view` stand `height` meters tall
    pub fn model_scale(&self, model: &str, view: &str, height: f64) -> ExportResult<f64> {
        let reference = self.reference_height(model, view)?;

        let scale = to_decimal(height)?
            .checked_div(to_decimal(reference)?)
            .ok_or_else(|| {
                ExportError::conversion(format!("{} m against a {} m model", height, reference), "a scale")
            })?;

        to_f64(scale)
    }

    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }
}

// ============================================================================
// SCENE ENTITIES
// ============================================================================

/// Someone or something to place in a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacrovisionEntity {
    /// Label shown under the model
    pub name: String,
    pub model: String,
    pub view: String,
    /// Height in meters
    pub height: f64,
}

impl MacrovisionEntity {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        view: impl Into<String>,
        height: f64,
    ) -> Self {
        MacrovisionEntity {
            name: name.into(),
            model: model.into(),
            view: view.into(),
            height,
        }
    }
}

impl FromStr for MacrovisionEntity {
    type Err = ExportError;

    /// "name:model:view:height", height being any measurement ("1.8m", "5'11\"")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(4, ':').collect();
        let [name, model, view, height] = parts.as_slice() else {
            return Err(ExportError::InvalidSpec(format!(
                "expected name:model:view:height, got '{}'",
                s
            )));
        };

        let height: Measurement = height.parse()?;
        Ok(MacrovisionEntity::new(*name, *model, *view, height.to_unit(Unit::Meter)?))
    }
}

// ============================================================================
// SCENE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneEntity {
    /// Model name
    pub name: String,
    pub custom_name: String,
    pub scale: f64,
    pub view: String,
    pub x: String,
    pub y: String,
    pub priority: i32,
    pub brightness: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneWorld {
    pub height: f64,
    pub unit: String,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub entities: Vec<SceneEntity>,
    pub world: SceneWorld,
    pub version: u32,
}

impl Scene {
    /// Lay entities out tallest first, each a quarter of its height right of the last
    pub fn build(heights: &ModelHeights, mut entities: Vec<MacrovisionEntity>) -> ExportResult<Scene> {
        if entities.is_empty() {
            return Err(ExportError::EmptyScene);
        }

        entities.sort_by(|a, b| b.height.total_cmp(&a.height));
        let world_height = entities[0].height;

        let mut x_offset = Decimal::ZERO;
        let mut offsets = Vec::with_capacity(entities.len());
        for entity in &entities {
            offsets.push(x_offset);
            let step = to_decimal(entity.height)?
                .checked_div(Decimal::from(4))
                .map(|step| step.normalize())
                .ok_or_else(|| ExportError::conversion(entity.height, "an x offset"))?;
            x_offset = x_offset
                .checked_add(step)
                .ok_or_else(|| ExportError::conversion(entity.height, "an x offset"))?;
        }

        let scene_entities = entities
            .into_iter()
            .zip(offsets)
            .map(|(e, x)| -> ExportResult<SceneEntity> {
                let scale = heights.model_scale(&e.model, &e.view, e.height)?;
                Ok(SceneEntity {
                    name: e.model,
                    custom_name: e.name,
                    scale,
                    view: e.view,
                    x: x.to_string(),
                    y: "0".to_string(),
                    priority: 0,
                    brightness: 1,
                })
            })
            .collect::<ExportResult<Vec<_>>>()?;

        debug!(entities = scene_entities.len(), world_height, "Built scene");

        Ok(Scene {
            entities: scene_entities,
            world: SceneWorld {
                height: world_height,
                unit: Unit::Meter.name().to_string(),
                x: 0,
                y: 0,
            },
            version: SCENE_VERSION,
        })
    }

    /// Scene JSON (json.dumps layout), base64 encoded
    pub fn encode(&self) -> ExportResult<String> {
        let json = to_python_json(self)?;
        Ok(BASE64.encode(json.as_bytes()))
    }

    /// Shareable URL for this scene
    pub fn url(&self, base_url: &str) -> ExportResult<String> {
        Ok(format!("{}?scene={}", base_url, self.encode()?))
    }
}

/// Build a scene and return its URL
pub fn scene_url(
    heights: &ModelHeights,
    entities: Vec<MacrovisionEntity>,
    base_url: &str,
) -> ExportResult<String> {
    Scene::build(heights, entities)?.url(base_url)
}

// ============================================================================
// DECIMALS
// ============================================================================

/// Decimal with the shortest digits that round-trip to `value`
fn to_decimal(value: f64) -> ExportResult<Decimal> {
    Decimal::from_str(&value.to_string()).map_err(|_| ExportError::conversion(value, "a decimal"))
}

fn to_f64(value: Decimal) -> ExportResult<f64> {
    value
        .to_string()
        .parse()
        .map_err(|_| ExportError::conversion(value, "a float"))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn heights() -> ModelHeights {
        ModelHeights::from_json(
            r#"{
                "Human": {"front": 2, "side": 1.6},
                "Dragon": {"front": 10}
            }"#,
        )
        .unwrap()
    }

    fn decode(url: &str) -> Value {
        let encoded = url.split("?scene=").nth(1).unwrap();
        let bytes = BASE64.decode(encoded).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_model_scale() {
        let heights = heights();
        assert_eq!(heights.model_scale("Human", "front", 1.0).unwrap(), 0.5);
        assert_eq!(heights.model_scale("Dragon", "front", 20.0).unwrap(), 2.0);
    }

    #[test]
    fn test_model_scale_unknown_model_or_view() {
        let heights = heights();
        assert!(matches!(
            heights.model_scale("Robot", "front", 1.0),
            Err(ExportError::UnknownModel(m)) if m == "Robot"
        ));
        assert!(matches!(
            heights.model_scale("Dragon", "side", 1.0),
            Err(ExportError::UnknownView { .. })
        ));
    }

    #[test]
    fn test_model_scale_zero_reference() {
        let heights = ModelHeights::from_json(r#"{"Flat": {"top": 0}}"#).unwrap();
        assert!(heights.model_scale("Flat", "top", 1.0).is_err());
    }

    #[test]
    fn test_empty_scene_rejected() {
        assert!(matches!(
            Scene::build(&heights(), vec![]),
            Err(ExportError::EmptyScene)
        ));
    }

    #[test]
    fn test_scene_layout() {
        let entities = vec![
            MacrovisionEntity::new("Alice", "Human", "front", 1.0),
            MacrovisionEntity::new("Smaug", "Dragon", "front", 20.0),
            MacrovisionEntity::new("Bob", "Human", "side", 2.0),
        ];

        let scene = Scene::build(&heights(), entities).unwrap();

        let names: Vec<&str> = scene.entities.iter().map(|e| e.custom_name.as_str()).collect();
        assert_eq!(names, vec!["Smaug", "Bob", "Alice"]);

        let xs: Vec<&str> = scene.entities.iter().map(|e| e.x.as_str()).collect();
        assert_eq!(xs, vec!["0", "5", "5.5"]);

        assert_eq!(scene.world.height, 20.0);
        assert_eq!(scene.world.unit, "meters");
        assert_eq!(scene.version, 3);
        assert_eq!(scene.entities[1].scale, 1.25);
    }

    #[test]
    fn test_scene_url_payload() {
        let url = scene_url(
            &heights(),
            vec![MacrovisionEntity::new("Alice", "Human", "front", 1.0)],
            "https://macrovision.crux.sexy/",
        )
        .unwrap();

        assert!(url.starts_with("https://macrovision.crux.sexy/?scene="));
        assert_eq!(
            decode(&url),
            json!({
                "entities": [{
                    "name": "Human",
                    "customName": "Alice",
                    "scale": 0.5,
                    "view": "front",
                    "x": "0",
                    "y": "0",
                    "priority": 0,
                    "brightness": 1
                }],
                "world": {"height": 1.0, "unit": "meters", "x": 0, "y": 0},
                "version": 3
            })
        );
    }

    #[test]
    fn test_scene_url_matches_sizebot_link() {
        let heights = ModelHeights::from_json(r#"{"Human": {"male": 1.8034, "female": 1.7018}}"#).unwrap();
        let entities = vec![
            MacrovisionEntity::new(r"r'(?<!\.)[.?!](?!\.)', z [1.22m]", "Human", "male", 1.219),
            MacrovisionEntity::new("Natalie", "Human", "female", 0.1524),
        ];

        let url = scene_url(&heights, entities, "https://macrovision.crux.sexy/").unwrap();

        let json = String::from_utf8(BASE64.decode(url.split("?scene=").nth(1).unwrap()).unwrap()).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"entities": [{"name": "Human", "customName": "r'(?<!\\.)[.?!](?!\\.)', z [1.22m]", "#,
                r#""scale": 0.675945436397915, "view": "male", "x": "0", "y": "0", "priority": 0, "brightness": 1}, "#,
                r#"{"name": "Human", "customName": "Natalie", "scale": 0.08955223880597014, "view": "female", "#,
                r#""x": "0.30475", "y": "0", "priority": 0, "brightness": 1}], "#,
                r#""world": {"height": 1.219, "unit": "meters", "x": 0, "y": 0}, "version": 3}"#,
            )
        );
        assert_eq!(
            url,
            concat!(
                "https://macrovision.crux.sexy/?scene=",
                "eyJlbnRpdGllcyI6IFt7Im5hbWUiOiAiSHVtYW4iLCAiY3VzdG9tTmFtZSI6ICJyJyg/PCFcXC4pWy4/IV0oPyFcXC4pJywgeiBbMS4yMm1dIiwgInNjYWxlIjogMC42NzU5NDU0MzYzOTc5MTUsICJ2aWV3IjogIm1hbGUiLCAieCI6ICIwIiwgInkiOiAiMCIsICJwcmlvcml0eSI6IDAsICJicmlnaHRuZXNzIjogMX0sIHsibmFtZSI6ICJIdW1hbiIsICJjdXN0b21OYW1lIjogIk5hdGFsaWUiLCAic2NhbGUiOiAwLjA4OTU1MjIzODgwNTk3MDE0LCAidmlldyI6ICJmZW1hbGUiLCAieCI6ICIwLjMwNDc1IiwgInkiOiAiMCIsICJwcmlvcml0eSI6IDAsICJicmlnaHRuZXNzIjogMX1dLCAid29ybGQiOiB7ImhlaWdodCI6IDEuMjE5LCAidW5pdCI6ICJtZXRlcnMiLCAieCI6IDAsICJ5IjogMH0sICJ2ZXJzaW9uIjogM30=",
            )
        );
    }

    #[test]
    fn test_scene_offsets_are_exact_decimals() {
        let heights = ModelHeights::from_json(r#"{"Cube": {"front": 0.4}}"#).unwrap();
        let entities = (0..4)
            .map(|i| MacrovisionEntity::new(format!("Cube {}", i), "Cube", "front", 0.4))
            .collect();

        let scene = Scene::build(&heights, entities).unwrap();

        let xs: Vec<&str> = scene.entities.iter().map(|e| e.x.as_str()).collect();
        assert_eq!(xs, vec!["0", "0.1", "0.2", "0.3"]);
        assert!(scene.entities.iter().all(|e| e.scale == 1.0));
    }

    #[test]
    fn test_parse_entity_spec() {
        let entity: MacrovisionEntity = "Alice:Human:front:170cm".parse().unwrap();
        assert_eq!(entity.name, "Alice");
        assert_eq!(entity.model, "Human");
        assert_eq!(entity.view, "front");
        assert!((entity.height - 1.7).abs() < 1e-9);

        assert!("Alice:Human:170cm".parse::<MacrovisionEntity>().is_err());
        assert!("Alice:Human:front:tall".parse::<MacrovisionEntity>().is_err());
    }
}
