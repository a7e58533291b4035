// Height Export - Core Library
// Exposes all modules for use in the CLI, the API server, and host embedding

pub mod error;
pub mod units;
pub mod entities;
pub mod catalog;
pub mod jsonfmt;
pub mod export;
pub mod macrovision;
pub mod config;

// Re-export commonly used types
pub use error::{ExportError, ExportResult};
pub use units::{Measurement, Unit};
pub use entities::{
    Entity, EntityFactory, EntityRegistry,
    HeightSource, SchemaVersion,
    ViewV1, ViewV2, ViewAttributes, ViewHeight,
};
pub use catalog::{load_catalog, load_catalog_file};
pub use export::{
    collect_heights, export_heights, read_heights, to_json_compact, to_json_pretty,
    HeightExporter, HeightTable,
};
pub use jsonfmt::{js_number, python_float, HostFormatter, PythonFormatter};
pub use macrovision::{scene_url, MacrovisionEntity, ModelHeights, Scene, SCENE_VERSION};
pub use config::{load_config, Config, ExportConfig, MacrovisionConfig, ServerConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
