//! Routine descriptors.
//!
//! A [`FunctionDef`] is the typed description of a stored routine: its name,
//! ordered parameter list, return tag, and the Python source block to embed.
//! A [`TriggerDef`] wraps a function definition with the row-level trigger
//! wiring (event, timing, and the table or entity it fires on).
//!
//! Descriptors are plain values built with chained constructors; they are
//! derived fresh per compile and never persisted.

use std::fmt;

use crate::entity::{Entity, EntityMeta};
use crate::types::PlType;

/// A single routine parameter: a name and an optional type tag.
///
/// `ty: None` marks an opaque convention parameter (the trigger transition
/// record and the `plpy` helper); plain functions require every parameter
/// to carry a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: Option<PlType>,
}

/// A plain stored-routine definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    name: String,
    module: Option<String>,
    params: Vec<Param>,
    returns: Option<PlType>,
    source: String,
}

impl FunctionDef {
    /// Create a definition from a routine name and its Python source block.
    ///
    /// The source may still carry the registration decorator line; it is
    /// stripped at compile time.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: None,
            params: Vec::new(),
            returns: None,
            source: source.into(),
        }
    }

    /// Append a typed parameter. Order is preserved: it determines both the
    /// SQL parameter list and the forwarding call's argument order.
    pub fn param(mut self, name: impl Into<String>, ty: PlType) -> Self {
        self.params.push(Param {
            name: name.into(),
            ty: Some(ty),
        });
        self
    }

    /// Append an opaque convention parameter (no type tag).
    pub fn param_untyped(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            ty: None,
        });
        self
    }

    /// Set the return tag. Unset maps to void at compile time.
    pub fn returns(mut self, ty: PlType) -> Self {
        self.returns = Some(ty);
        self
    }

    /// Set the module qualifier used for registry keys.
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn return_type(&self) -> Option<&PlType> {
        self.returns.as_ref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Registry key: `module.name` when a module qualifier is set.
    pub fn qualified_name(&self) -> String {
        match &self.module {
            Some(module) => format!("{}.{}", module, self.name),
            None => self.name.clone(),
        }
    }
}

/// Row-level trigger event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerEvent::Insert => write!(f, "INSERT"),
            TriggerEvent::Update => write!(f, "UPDATE"),
            TriggerEvent::Delete => write!(f, "DELETE"),
        }
    }
}

/// Row-level trigger timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerWhen {
    Before,
    After,
}

impl fmt::Display for TriggerWhen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerWhen::Before => write!(f, "BEFORE"),
            TriggerWhen::After => write!(f, "AFTER"),
        }
    }
}

/// A trigger-routine definition: the wrapped function plus its wiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerDef {
    function: FunctionDef,
    event: TriggerEvent,
    when: TriggerWhen,
    table: Option<String>,
    entity: Option<EntityMeta>,
}

impl TriggerDef {
    /// Wrap a function definition with trigger wiring. Exactly one of
    /// [`on_table`](Self::on_table) / [`on_entity`](Self::on_entity) must
    /// follow; the compiler rejects anything else.
    pub fn new(function: FunctionDef, event: TriggerEvent, when: TriggerWhen) -> Self {
        Self {
            function,
            event,
            when,
            table: None,
            entity: None,
        }
    }

    /// Fire on a raw table: the body receives `TD` and `plpy` directly.
    pub fn on_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Fire on an entity's table: the body receives marshalled `new`/`old`
    /// instances ahead of `TD` and `plpy`.
    pub fn on_entity<E: Entity>(self) -> Self {
        self.on_entity_meta(E::meta())
    }

    /// Same as [`on_entity`](Self::on_entity), from metadata held by value.
    pub fn on_entity_meta(mut self, meta: EntityMeta) -> Self {
        self.entity = Some(meta);
        self
    }

    pub fn function(&self) -> &FunctionDef {
        &self.function
    }

    pub fn event(&self) -> TriggerEvent {
        self.event
    }

    pub fn when(&self) -> TriggerWhen {
        self.when
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn entity(&self) -> Option<&EntityMeta> {
        self.entity.as_ref()
    }

    /// Name of the trigger bound to the generated routine.
    pub fn trigger_name(&self) -> String {
        format!("{}_trigger", self.function.name())
    }

    pub fn qualified_name(&self) -> String {
        self.function.qualified_name()
    }
}
