//! plgen — the plgen CLI
//!
//! Install PL/Python bootstrap routines and inspect generated SQL.
//!
//! # Usage
//!
//! ```bash
//! # Print the SQL a registered routine compiles to
//! plgen show pl_load_path
//!
//! # Install the interpreter bootstrap routines
//! plgen bootstrap
//!
//! # Show what bootstrap would run, without touching the database
//! plgen bootstrap --dry-run
//!
//! # Report the embedded interpreter version
//! plgen info
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use plgen::prelude::*;
use plgen::{bootstrap, compile_function};

#[derive(Parser)]
#[command(name = "plgen")]
#[command(version)]
#[command(about = "Generate and install PL/Python routines on PostgreSQL", long_about = None)]
struct Cli {
    /// Database connection URL
    #[arg(long, env = "PLGEN_DATABASE_URL")]
    database_url: Option<String>,

    /// Don't execute, just show the generated SQL
    #[arg(short, long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the generated SQL for a registered routine
    Show {
        /// Qualified or bare routine name
        name: String,
    },
    /// Install the interpreter bootstrap routines (library + project path)
    Bootstrap {
        /// Also initialize Django with this settings module
        #[arg(long)]
        django: Option<String>,
    },
    /// Report the embedded interpreter version
    Info {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Show { name } => show_routine(name),
        Commands::Bootstrap { django } => run_bootstrap(&cli, django.clone()).await,
        Commands::Info { format } => show_info(&cli, format).await,
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Built-in routines available to `show` and `bootstrap`.
fn builtin_registry() -> Registry {
    let mut registry = Registry::new();
    bootstrap::register(&mut registry);
    registry
}

fn show_routine(name: &str) -> Result<()> {
    let registry = builtin_registry();
    let mapper = TypeMapper::new();

    let found = registry
        .functions()
        .find(|(key, _)| *key == name || key.ends_with(&format!(".{}", name)));
    let sql = match found {
        Some((_, function)) => function.to_sql(&mapper)?,
        None => match registry
            .triggers()
            .find(|(key, _)| *key == name || key.ends_with(&format!(".{}", name)))
        {
            Some((_, trigger)) => trigger.to_sql(&mapper)?,
            None => {
                let known: Vec<String> = registry
                    .functions()
                    .map(|(key, _)| key.to_string())
                    .collect();
                bail!("unknown routine '{}'. Known: {}", name, known.join(", "));
            }
        },
    };

    println!("{}", "Generated SQL:".green().bold());
    println!("{}", sql.white());
    Ok(())
}

async fn run_bootstrap(cli: &Cli, django: Option<String>) -> Result<()> {
    let mut settings = Settings::load().context("loading plgen.toml")?;
    if django.is_some() {
        settings.django_settings_module = django;
    }

    if cli.dry_run {
        println!("{}", "DRY-RUN MODE - Generated SQL:".yellow().bold());
        println!("{}", compile_function(&bootstrap::pl_load_path())?.white());
        println!("select pl_load_path('{}')", settings.python_lib);
        println!("select pl_load_path('{}')", settings.base_dir);
        if let Some(module) = &settings.django_settings_module {
            println!();
            println!("{}", compile_function(&bootstrap::pl_load_django())?.white());
            println!(
                "select pl_load_django('{}', '{}')",
                settings.base_dir, module
            );
        }
        println!("\n{}", "No changes made.".yellow());
        return Ok(());
    }

    let db = connect(cli, Some(&settings)).await?;
    if settings.django_settings_module.is_some() {
        bootstrap::load_django(&db, &settings).await?;
        println!("{} Django initialized in the embedded interpreter", "✓".green());
    } else {
        bootstrap::load_env(&db, &settings).await?;
        bootstrap::load_project(&db, &settings).await?;
        println!("{} Interpreter search path extended", "✓".green());
    }
    Ok(())
}

async fn show_info(cli: &Cli, format: &OutputFormat) -> Result<()> {
    let settings = Settings::load().ok();
    let db = connect(cli, settings.as_ref()).await?;
    let info = bootstrap::python_info(&db).await?;

    match format {
        OutputFormat::Table => {
            println!("{} {}", "python version:".cyan(), info.version.white())
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
    }
    Ok(())
}

async fn connect(cli: &Cli, settings: Option<&Settings>) -> Result<PlGenDB> {
    let url = cli
        .database_url
        .clone()
        .or_else(|| settings.and_then(|s| s.database_url()));
    let Some(url) = url else {
        bail!("no database URL. Use --database-url, set PLGEN_DATABASE_URL, or add it to plgen.toml");
    };

    if cli.verbose {
        println!("{} {}", "Connecting to:".dimmed(), url);
    }
    Ok(PlGenDB::connect(&url).await?)
}
