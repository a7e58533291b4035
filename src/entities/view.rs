// 🪟 Views - where a view keeps its height
//
// The host's view shape changed between versions:
// - v1: view.attributes.height.base
// - v2: view.height
//
// Both shapes sit behind the HeightSource trait. The schema in use is chosen
// explicitly (SchemaVersion), never guessed from which fields are present.

use crate::error::{ExportError, ExportResult};
use crate::units::{Measurement, Unit};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// HEIGHT SOURCE
// ============================================================================

/// HeightSource - the one capability an export needs from a view
pub trait HeightSource {
    /// Where this view shape keeps its height, for error messages
    const ACCESSOR: &'static str;

    /// The raw height measurement, if present at the accessor path
    fn height(&self) -> Option<&Measurement>;

    /// Height converted to meters
    ///
    /// A missing height is reported without entity/view names; callers that
    /// know them attach them with `ExportError::at`.
    fn height_in_meters(&self) -> ExportResult<f64> {
        let height = self
            .height()
            .ok_or_else(|| ExportError::missing_height("", "", Self::ACCESSOR))?;
        height.to_unit(Unit::Meter)
    }
}

// ============================================================================
// SCHEMA VERSION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// view.attributes.height.base
    V1,
    /// view.height
    #[default]
    V2,
}

impl SchemaVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "v1",
            SchemaVersion::V2 => "v2",
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaVersion {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v1" | "1" => Ok(SchemaVersion::V1),
            "v2" | "2" => Ok(SchemaVersion::V2),
            other => Err(ExportError::catalog(format!("unknown schema version '{}'", other))),
        }
    }
}

// ============================================================================
// V1 - attributes.height.base
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewHeight {
    #[serde(default)]
    pub base: Option<Measurement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewAttributes {
    #[serde(default)]
    pub height: Option<ViewHeight>,
}

/// View shape with the height nested under its attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewV1 {
    #[serde(default)]
    pub attributes: Option<ViewAttributes>,
}

impl ViewV1 {
    pub fn new(height: Measurement) -> Self {
        ViewV1 {
            attributes: Some(ViewAttributes {
                height: Some(ViewHeight { base: Some(height) }),
            }),
        }
    }
}

impl HeightSource for ViewV1 {
    const ACCESSOR: &'static str = "attributes.height.base";

    fn height(&self) -> Option<&Measurement> {
        self.attributes
            .as_ref()?
            .height
            .as_ref()?
            .base
            .as_ref()
    }
}

// ============================================================================
// V2 - height
// ============================================================================

/// View shape with the height directly on the view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewV2 {
    #[serde(default)]
    pub height: Option<Measurement>,
}

impl ViewV2 {
    pub fn new(height: Measurement) -> Self {
        ViewV2 { height: Some(height) }
    }
}

impl HeightSource for ViewV2 {
    const ACCESSOR: &'static str = "height";

    fn height(&self) -> Option<&Measurement> {
        self.height.as_ref()
    }
}

// ============================================================================
// TESTS
// ============================================================================
