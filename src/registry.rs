//! Process-level routine registry.
//!
//! Registration is an explicit call made at composition time; the registry
//! is a plain value handed by reference to whichever component performs
//! bulk installation. Keys are qualified names; registering under a name
//! that is already present overwrites the prior entry. There is no removal.

use std::collections::BTreeMap;

use crate::routine::{FunctionDef, TriggerDef};

/// Two mappings keyed by qualified name: plain functions and triggers.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    functions: BTreeMap<String, FunctionDef>,
    triggers: BTreeMap<String, TriggerDef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plain function. Last registration wins.
    pub fn add_function(&mut self, function: FunctionDef) {
        self.functions.insert(function.qualified_name(), function);
    }

    /// Register a trigger definition. Last registration wins.
    pub fn add_trigger(&mut self, trigger: TriggerDef) {
        self.triggers.insert(trigger.qualified_name(), trigger);
    }

    pub fn function(&self, qualified_name: &str) -> Option<&FunctionDef> {
        self.functions.get(qualified_name)
    }

    pub fn trigger(&self, qualified_name: &str) -> Option<&TriggerDef> {
        self.triggers.get(qualified_name)
    }

    /// Registered plain functions, in deterministic name order.
    pub fn functions(&self) -> impl Iterator<Item = (&str, &FunctionDef)> {
        self.functions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Registered triggers, in deterministic name order.
    pub fn triggers(&self) -> impl Iterator<Item = (&str, &TriggerDef)> {
        self.triggers.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.triggers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.functions.len() + self.triggers.len()
    }
}
