//! Entity metadata for model-backed triggers.
//!
//! The entity branch of the trigger compiler needs three strings from the
//! model layer: the table the trigger fires on, and the application label /
//! object name used to reimport the model class inside the embedded
//! interpreter. Model layers plug in by implementing [`Entity`].

/// Metadata describing one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMeta {
    /// Table backing the entity.
    pub db_table: String,
    /// Class name usable for import/reconstruction.
    pub object_name: String,
    /// Application label the class is registered under.
    pub app_label: String,
}

impl EntityMeta {
    pub fn new(
        db_table: impl Into<String>,
        object_name: impl Into<String>,
        app_label: impl Into<String>,
    ) -> Self {
        Self {
            db_table: db_table.into(),
            object_name: object_name.into(),
            app_label: app_label.into(),
        }
    }
}

/// A type whose rows can back a trigger routine.
pub trait Entity {
    fn meta() -> EntityMeta;
}
