// Entity Models - the host's entities as this crate reads them
//
// Each entity has:
// - A name (the top-level key of an export)
// - Named views, each carrying a height measurement
// - A registry of factories producing entity instances on demand

pub mod entity;
pub mod view;
pub mod registry;

pub use entity::Entity;
pub use view::{HeightSource, SchemaVersion, ViewAttributes, ViewHeight, ViewV1, ViewV2};
pub use registry::{EntityFactory, EntityRegistry};
