//! Database installation engine.
//!
//! [`PlGenDB`] wraps a PostgreSQL connection pool and installs compiled
//! routine definitions. Each install compiles fresh SQL from the current
//! definition and executes it on one scoped pooled connection; database
//! errors propagate unmodified and nothing is retried.

use std::collections::HashMap;

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Column, Executor, PgPool, Row, TypeInfo};

use crate::compiler::ToSql;
use crate::error::{PlGenError, PlGenResult};
use crate::registry::Registry;
use crate::routine::{FunctionDef, TriggerDef};
use crate::types::TypeMapper;

/// A database handle for installing PL/Python routines.
#[derive(Clone)]
pub struct PlGenDB {
    pool: PgPool,
    mapper: TypeMapper,
}

impl PlGenDB {
    /// Connect to a database using a `postgres://` connection URL.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let db = PlGenDB::connect("postgres://localhost/mydb").await?;
    /// ```
    pub async fn connect(url: &str) -> PlGenResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| PlGenError::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            mapper: TypeMapper::new(),
        })
    }

    /// Build a handle from an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            mapper: TypeMapper::new(),
        }
    }

    /// Replace the type table used when compiling definitions.
    pub fn with_mapper(mut self, mapper: TypeMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn mapper(&self) -> &TypeMapper {
        &self.mapper
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Compile and install a plain function. Re-installing the same name is
    /// idempotent (`CREATE OR REPLACE`).
    pub async fn install(&self, function: &FunctionDef) -> PlGenResult<()> {
        let sql = function.to_sql(&self.mapper)?;
        self.execute(&sql).await
    }

    /// Compile and install a trigger routine plus its trigger binding.
    /// Re-installing replaces the prior trigger (`DROP TRIGGER IF EXISTS`).
    pub async fn install_trigger(&self, trigger: &TriggerDef) -> PlGenResult<()> {
        let sql = trigger.to_sql(&self.mapper)?;
        self.execute(&sql).await
    }

    /// Install everything a registry holds: plain functions first, then
    /// triggers, each in name order.
    pub async fn install_all(&self, registry: &Registry) -> PlGenResult<()> {
        for (_, function) in registry.functions() {
            self.install(function).await?;
        }
        for (_, trigger) in registry.triggers() {
            self.install_trigger(trigger).await?;
        }
        Ok(())
    }

    /// Execute a SQL script on one scoped pooled connection.
    ///
    /// The script may contain multiple statements (trigger installs do).
    pub async fn execute(&self, sql: &str) -> PlGenResult<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| PlGenError::Connection(e.to_string()))?;
        (&mut *conn)
            .execute(sql)
            .await
            .map_err(|e| PlGenError::Execution(e.to_string()))?;
        Ok(())
    }

    /// Fetch a single result row as a JSON-like map.
    pub async fn fetch_one(&self, sql: &str) -> PlGenResult<HashMap<String, serde_json::Value>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| PlGenError::Connection(e.to_string()))?;
        let row: PgRow = (&mut *conn)
            .fetch_one(sql)
            .await
            .map_err(|e| PlGenError::Execution(e.to_string()))?;
        Ok(row_to_map(&row))
    }
}

/// Convert a PgRow to a HashMap.
fn row_to_map(row: &PgRow) -> HashMap<String, serde_json::Value> {
    let mut map = HashMap::new();

    for (i, column) in row.columns().iter().enumerate() {
        let name = column.name().to_string();
        let type_name = column.type_info().name();

        let value: serde_json::Value = match type_name {
            "BOOL" => row
                .try_get::<bool, _>(i)
                .map(serde_json::Value::Bool)
                .unwrap_or(serde_json::Value::Null),
            "INT2" => row
                .try_get::<i16, _>(i)
                .map(|v| serde_json::Value::Number(v.into()))
                .unwrap_or(serde_json::Value::Null),
            "INT4" => row
                .try_get::<i32, _>(i)
                .map(|v| serde_json::Value::Number(v.into()))
                .unwrap_or(serde_json::Value::Null),
            "INT8" => row
                .try_get::<i64, _>(i)
                .map(|v| serde_json::Value::Number(v.into()))
                .unwrap_or(serde_json::Value::Null),
            "FLOAT4" => row
                .try_get::<f32, _>(i)
                .ok()
                .and_then(|v| serde_json::Number::from_f64(v as f64))
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            "FLOAT8" => row
                .try_get::<f64, _>(i)
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            _ => row
                .try_get::<String, _>(i)
                .map(serde_json::Value::String)
                .unwrap_or(serde_json::Value::Null),
        };

        map.insert(name, value);
    }

    map
}
