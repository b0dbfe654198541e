//! SQL compiler for routine definitions.
//!
//! Converts [`FunctionDef`]/[`TriggerDef`] descriptors into executable
//! PL/Python routine SQL. All configuration checks (identifier whitelist,
//! annotation completeness, trigger target) run before any SQL text is
//! assembled, so a failing definition never produces a partial script.

use crate::entity::EntityMeta;
use crate::error::{PlGenError, PlGenResult};
use crate::routine::{FunctionDef, TriggerDef};
use crate::source::{extract_body, FUNCTION_MARKER, TRIGGER_MARKER};
use crate::types::{PlType, TypeMapper};

/// Trait for compiling definitions to SQL.
pub trait ToSql {
    /// Compile this definition to a SQL script.
    fn to_sql(&self, mapper: &TypeMapper) -> PlGenResult<String>;
}

/// Whitelist check for names interpolated into SQL: `[A-Za-z_][A-Za-z0-9_]*`.
fn check_identifier(name: &str) -> PlGenResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(PlGenError::InvalidIdentifier(name.to_string()))
    }
}

impl ToSql for FunctionDef {
    fn to_sql(&self, mapper: &TypeMapper) -> PlGenResult<String> {
        check_identifier(self.name())?;

        let mut args = Vec::with_capacity(self.params().len());
        for param in self.params() {
            let tag = param
                .ty
                .as_ref()
                .ok_or_else(|| PlGenError::missing_annotation(self.name(), &param.name))?;
            args.push(format!("{} {}", param.name, mapper.resolve(tag)?));
        }
        let returns = mapper.resolve(self.return_type().unwrap_or(&PlType::Void))?;

        let body = extract_body(self.source(), FUNCTION_MARKER);
        let forwarded: Vec<&str> = self.params().iter().map(|p| p.name.as_str()).collect();

        Ok(format!(
            "CREATE OR REPLACE FUNCTION {name}({args}) RETURNS {returns}\n\
             AS $$\n\
             {body}\n\
             return {name}({forwarded})\n\
             $$ LANGUAGE plpython3u\n",
            name = self.name(),
            args = args.join(", "),
            returns = returns,
            body = body,
            forwarded = forwarded.join(", "),
        ))
    }
}

impl ToSql for TriggerDef {
    fn to_sql(&self, mapper: &TypeMapper) -> PlGenResult<String> {
        let name = self.function().name();
        check_identifier(name)?;

        let table = match (self.table(), self.entity()) {
            (Some(table), None) => table.to_string(),
            (None, Some(meta)) => meta.db_table.clone(),
            _ => return Err(PlGenError::TriggerTarget(name.to_string())),
        };
        check_identifier(&table)?;

        // Typed parameters must still resolve; opaque convention parameters
        // (transition record, plpy helper, marshalled instances) are exempt.
        for param in self.function().params() {
            if let Some(tag) = &param.ty {
                mapper.resolve(tag)?;
            }
        }

        let (marshal_in, call, marshal_out) = match self.entity() {
            Some(meta) => entity_shim(name, meta),
            None => (String::new(), format!("{}(TD, plpy)\n", name), String::new()),
        };

        let body = extract_body(self.function().source(), TRIGGER_MARKER);

        Ok(format!(
            "BEGIN;\n\
             CREATE OR REPLACE FUNCTION {name}() RETURNS TRIGGER\n\
             AS $$\n\
             {marshal_in}\
             {body}\n\
             {call}\
             {marshal_out}\
             return 'MODIFY'\n\
             $$ LANGUAGE plpython3u;\n\
             \n\
             DROP TRIGGER IF EXISTS {trigger} ON {table} CASCADE;\n\
             CREATE TRIGGER {trigger}\n\
             {when} {event} ON {table}\n\
             FOR EACH ROW\n\
             EXECUTE PROCEDURE {name}();\n\
             END;\n",
            name = name,
            marshal_in = marshal_in,
            body = body,
            call = call,
            marshal_out = marshal_out,
            trigger = self.trigger_name(),
            table = table,
            when = self.when(),
            event = self.event(),
        ))
    }
}

/// Python shim marshalling the transition record into a typed instance and
/// back. `old` is absent on INSERT, hence the conditional construction and
/// write-back.
fn entity_shim(name: &str, meta: &EntityMeta) -> (String, String, String) {
    let marshal_in = format!(
        "from django.apps import apps\n\
         from django.forms.models import model_to_dict\n\
         {object} = apps.get_model('{app}', '{object}')\n\
         new = {object}(**TD['new'])\n\
         old = {object}(**TD['old']) if TD['old'] else None\n",
        object = meta.object_name,
        app = meta.app_label,
    );
    let call = format!("{}(new, old, TD, plpy)\n", name);
    let marshal_out = "TD['new'].update(model_to_dict(new))\n\
                       if TD['old']:\n    TD['old'].update(model_to_dict(old))\n"
        .to_string();
    (marshal_in, call, marshal_out)
}
