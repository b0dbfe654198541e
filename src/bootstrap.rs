//! Built-in bootstrap routines.
//!
//! Three installable functions prepare the embedded interpreter: one
//! extends its module search path, one initializes Django inside it, and
//! one reports its version. The loaders install them and call them with
//! values taken verbatim from [`Settings`].

use serde::Serialize;

use crate::config::Settings;
use crate::engine::PlGenDB;
use crate::error::{PlGenError, PlGenResult};
use crate::registry::Registry;
use crate::routine::FunctionDef;
use crate::types::PlType;

const MODULE: &str = "plgen.bootstrap";

const PL_LOAD_PATH_SRC: &str = "\
def pl_load_path(syspath: str):
    import sys
    sys.path.append(syspath)";

const PL_LOAD_DJANGO_SRC: &str = "\
def pl_load_django(project_dir: str, django_settings_module: str):
    import os, sys
    from django.core.wsgi import get_wsgi_application
    os.environ.setdefault('DJANGO_SETTINGS_MODULE', django_settings_module)
    sys.path.append(project_dir)
    get_wsgi_application()";

const PL_PYTHON_VERSION_SRC: &str = "\
def pl_python_version() -> str:
    from platform import python_version
    return python_version()";

/// Append a directory to the embedded interpreter's `sys.path`.
pub fn pl_load_path() -> FunctionDef {
    FunctionDef::new("pl_load_path", PL_LOAD_PATH_SRC)
        .module(MODULE)
        .param("syspath", PlType::Text)
}

/// Initialize Django inside the embedded interpreter.
pub fn pl_load_django() -> FunctionDef {
    FunctionDef::new("pl_load_django", PL_LOAD_DJANGO_SRC)
        .module(MODULE)
        .param("project_dir", PlType::Text)
        .param("django_settings_module", PlType::Text)
}

/// Report the embedded interpreter's version.
pub fn pl_python_version() -> FunctionDef {
    FunctionDef::new("pl_python_version", PL_PYTHON_VERSION_SRC)
        .module(MODULE)
        .returns(PlType::Text)
}

/// Register the built-in routines with a registry.
pub fn register(registry: &mut Registry) {
    registry.add_function(pl_load_path());
    registry.add_function(pl_load_django());
    registry.add_function(pl_python_version());
}

/// Install `pl_load_path` and point it at the interpreter's library path.
pub async fn load_env(db: &PlGenDB, settings: &Settings) -> PlGenResult<()> {
    db.install(&pl_load_path()).await?;
    db.execute(&format!("select pl_load_path('{}')", settings.python_lib))
        .await
}

/// Install `pl_load_path` and point it at the project base directory.
pub async fn load_project(db: &PlGenDB, settings: &Settings) -> PlGenResult<()> {
    db.install(&pl_load_path()).await?;
    db.execute(&format!("select pl_load_path('{}')", settings.base_dir))
        .await
}

/// Full Django bootstrap: library path, project path, then framework
/// initialization with the configured settings module.
pub async fn load_django(db: &PlGenDB, settings: &Settings) -> PlGenResult<()> {
    load_env(db, settings).await?;
    load_project(db, settings).await?;
    db.install(&pl_load_django()).await?;
    let module = settings
        .django_settings_module
        .as_deref()
        .ok_or_else(|| PlGenError::config("django_settings_module is not set"))?;
    db.execute(&format!(
        "select pl_load_django('{}', '{}')",
        settings.base_dir, module
    ))
    .await
}

/// Embedded interpreter facts reported by [`python_info`].
#[derive(Debug, Clone, Serialize)]
pub struct PythonInfo {
    pub version: String,
}

/// Install and call `pl_python_version`.
pub async fn python_info(db: &PlGenDB) -> PlGenResult<PythonInfo> {
    db.install(&pl_python_version()).await?;
    let row = db.fetch_one("select pl_python_version()").await?;
    let version = row
        .get("pl_python_version")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    Ok(PythonInfo { version })
}
