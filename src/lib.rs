//! # plgen — PL/Python routines from typed definitions
//!
//! plgen turns typed routine definitions into PostgreSQL server-side
//! stored functions and row-level triggers, installing them by generating
//! and executing SQL.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use plgen::prelude::*;
//!
//! let pl_max = FunctionDef::new("pl_max", r#"
//! def pl_max(a, b):
//!     if a > b:
//!         return a
//!     return b
//! "#)
//! .param("a", PlType::Integer)
//! .param("b", PlType::Integer)
//! .returns(PlType::Integer);
//!
//! // Compile to SQL
//! let sql = plgen::compile_function(&pl_max)?;
//! // => "CREATE OR REPLACE FUNCTION pl_max(a integer, b integer) RETURNS integer ..."
//!
//! // Or install directly
//! let db = PlGenDB::connect("postgres://localhost/mydb").await?;
//! db.install(&pl_max).await?;
//! ```
//!
//! Triggers wrap a function definition with row-level wiring; the entity
//! branch marshals the transition record into a typed model instance for
//! the body and writes its fields back afterwards:
//!
//! ```rust,ignore
//! let trigger = TriggerDef::new(f, TriggerEvent::Insert, TriggerWhen::Before)
//!     .on_entity::<Book>();
//! db.install_trigger(&trigger).await?;
//! ```

pub mod bootstrap;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod registry;
pub mod routine;
pub mod source;
pub mod types;

pub mod prelude {
    pub use crate::compiler::ToSql;
    pub use crate::config::Settings;
    pub use crate::engine::PlGenDB;
    pub use crate::entity::{Entity, EntityMeta};
    pub use crate::error::{PlGenError, PlGenResult};
    pub use crate::registry::Registry;
    pub use crate::routine::{FunctionDef, Param, TriggerDef, TriggerEvent, TriggerWhen};
    pub use crate::types::{PlType, TypeMapper};
}

use compiler::ToSql;

/// Compile a plain function definition with the default type table.
///
/// # Example
///
/// ```
/// use plgen::prelude::*;
///
/// let f = FunctionDef::new("pl_one", "def pl_one():\n    return 1")
///     .returns(PlType::Integer);
/// let sql = plgen::compile_function(&f).unwrap();
/// assert!(sql.starts_with("CREATE OR REPLACE FUNCTION pl_one() RETURNS integer"));
/// ```
pub fn compile_function(function: &routine::FunctionDef) -> error::PlGenResult<String> {
    function.to_sql(&types::TypeMapper::new())
}

/// Compile a trigger definition with the default type table.
pub fn compile_trigger(trigger: &routine::TriggerDef) -> error::PlGenResult<String> {
    trigger.to_sql(&types::TypeMapper::new())
}
