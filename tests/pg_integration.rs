//! Live-database tests for routine installation.
//!
//! Requires a PostgreSQL server with the plpython3u extension available.
//! Run: `PLGEN_TEST_DATABASE_URL=postgres://... cargo test --test pg_integration -- --ignored`

use plgen::prelude::*;

const URL_VAR: &str = "PLGEN_TEST_DATABASE_URL";

async fn connect() -> PlGenDB {
    let url = std::env::var(URL_VAR).unwrap_or_else(|_| panic!("set {}", URL_VAR));
    let db = PlGenDB::connect(&url).await.expect("connect");
    db.execute("CREATE EXTENSION IF NOT EXISTS plpython3u")
        .await
        .expect("plpython3u extension");
    db
}

fn pl_max() -> FunctionDef {
    FunctionDef::new(
        "pl_max",
        "@plfunction\n\
         def pl_max(a, b):\n    if a > b:\n        return a\n    return b",
    )
    .param("a", PlType::Integer)
    .param("b", PlType::Integer)
    .returns(PlType::Integer)
}

/// Round trip: the installed routine returns what the definition's body
/// returns for the same inputs.
#[tokio::test]
#[ignore = "Requires PostgreSQL with plpython3u - set PLGEN_TEST_DATABASE_URL"]
async fn test_function_round_trip() {
    let db = connect().await;
    db.install(&pl_max()).await.expect("install");

    let row = db.fetch_one("select pl_max(10, 20)").await.expect("call");
    assert_eq!(row["pl_max"], serde_json::json!(20));
}

/// Installing the same routine twice succeeds and behaves identically.
#[tokio::test]
#[ignore = "Requires PostgreSQL with plpython3u - set PLGEN_TEST_DATABASE_URL"]
async fn test_double_install_is_idempotent() {
    let db = connect().await;
    db.install(&pl_max()).await.expect("first install");
    db.install(&pl_max()).await.expect("second install");

    let row = db.fetch_one("select pl_max(7, 3)").await.expect("call");
    assert_eq!(row["pl_max"], serde_json::json!(7));
}

/// A definition with an unannotated parameter fails before any SQL runs.
#[tokio::test]
#[ignore = "Requires PostgreSQL with plpython3u - set PLGEN_TEST_DATABASE_URL"]
async fn test_unannotated_parameter_never_reaches_the_database() {
    let db = connect().await;
    let broken = FunctionDef::new("pl_broken", "def pl_broken(a, b):\n    return a")
        .param("a", PlType::Integer)
        .param_untyped("b");

    let err = db.install(&broken).await.unwrap_err();
    assert!(matches!(err, PlGenError::MissingAnnotation { .. }));
}

/// A void routine (no return annotation) installs and is callable.
#[tokio::test]
#[ignore = "Requires PostgreSQL with plpython3u - set PLGEN_TEST_DATABASE_URL"]
async fn test_void_function_is_callable() {
    let db = connect().await;
    let f = FunctionDef::new(
        "pl_touch_path",
        "def pl_touch_path(syspath):\n    import sys\n    sys.path.append(syspath)",
    )
    .param("syspath", PlType::Text);

    db.install(&f).await.expect("install");
    db.execute("select pl_touch_path('/tmp')").await.expect("call");
}

/// Raw-branch trigger: mutations of TD['new'] land on the persisted row,
/// including an aggregate computed inside the trigger body.
#[tokio::test]
#[ignore = "Requires PostgreSQL with plpython3u - set PLGEN_TEST_DATABASE_URL"]
async fn test_raw_trigger_rewrites_the_row() {
    let db = connect().await;
    db.execute("DROP TABLE IF EXISTS books_raw CASCADE").await.unwrap();
    db.execute("CREATE TABLE books_raw (name varchar(20), amount_sold integer)")
        .await
        .unwrap();

    let f = FunctionDef::new(
        "pl_count_trigger",
        "def pl_count_trigger(td, plpy):\n    \
         td['new']['name'] = td['new']['name'] + 'test'\n    \
         td['new']['amount_sold'] = plpy.execute(\"SELECT count(*) FROM books_raw\")[0]['count']",
    );
    let trigger = TriggerDef::new(f, TriggerEvent::Insert, TriggerWhen::Before)
        .on_table("books_raw");
    db.install_trigger(&trigger).await.expect("install trigger");

    db.execute("INSERT INTO books_raw (name, amount_sold) VALUES ('book', 1)")
        .await
        .expect("insert");

    let row = db
        .fetch_one("select name, amount_sold from books_raw")
        .await
        .expect("fetch");
    assert_eq!(row["name"], serde_json::json!("booktest"));
    // BEFORE INSERT: the new row is not visible to the count yet
    assert_eq!(row["amount_sold"], serde_json::json!(0));
}

/// Re-installing a trigger of the same name replaces it instead of erroring.
#[tokio::test]
#[ignore = "Requires PostgreSQL with plpython3u - set PLGEN_TEST_DATABASE_URL"]
async fn test_trigger_reinstall_replaces() {
    let db = connect().await;
    db.execute("DROP TABLE IF EXISTS books_replace CASCADE").await.unwrap();
    db.execute("CREATE TABLE books_replace (name varchar(20))")
        .await
        .unwrap();

    let suffix_trigger = |suffix: &str| {
        let f = FunctionDef::new(
            "pl_suffix_trigger",
            format!(
                "def pl_suffix_trigger(td, plpy):\n    td['new']['name'] = td['new']['name'] + '{}'",
                suffix
            ),
        );
        TriggerDef::new(f, TriggerEvent::Insert, TriggerWhen::Before).on_table("books_replace")
    };

    db.install_trigger(&suffix_trigger("test")).await.expect("first install");
    db.install_trigger(&suffix_trigger("more")).await.expect("reinstall");

    db.execute("INSERT INTO books_replace (name) VALUES ('book')")
        .await
        .expect("insert");
    let row = db.fetch_one("select name from books_replace").await.expect("fetch");
    assert_eq!(row["name"], serde_json::json!("bookmore"));
}

struct Book;

impl Entity for Book {
    fn meta() -> EntityMeta {
        EntityMeta::new("triggers_book", "Book", "triggers")
    }
}

/// Entity-branch trigger: the body mutates a typed instance and the change
/// propagates to the persisted row via the transition-record write-back.
#[tokio::test]
#[ignore = "Requires a Django project bootstrapped via plgen.toml (triggers app with a Book model)"]
async fn test_entity_trigger_rewrites_the_row() {
    let db = connect().await;
    let settings = Settings::load().expect("plgen.toml");
    plgen::bootstrap::load_django(&db, &settings)
        .await
        .expect("django bootstrap");

    let f = FunctionDef::new(
        "pl_model_trigger",
        "def pl_model_trigger(new, old, td, plpy):\n    new.name = new.name + 'test'",
    );
    let trigger = TriggerDef::new(f, TriggerEvent::Insert, TriggerWhen::Before)
        .on_entity::<Book>();
    db.install_trigger(&trigger).await.expect("install trigger");

    db.execute("DELETE FROM triggers_book").await.unwrap();
    db.execute("INSERT INTO triggers_book (name, amount_stock, amount_sold) VALUES ('book', 20, 10)")
        .await
        .expect("insert");
    let row = db.fetch_one("select name from triggers_book").await.expect("fetch");
    assert_eq!(row["name"], serde_json::json!("booktest"));
}

/// Bulk install through a registry: every registered routine is callable.
#[tokio::test]
#[ignore = "Requires PostgreSQL with plpython3u - set PLGEN_TEST_DATABASE_URL"]
async fn test_install_all_from_registry() {
    let db = connect().await;
    let mut registry = Registry::new();
    registry.add_function(pl_max());
    registry.add_function(
        FunctionDef::new("pl_square", "def pl_square(a):\n    return a * a")
            .param("a", PlType::Integer)
            .returns(PlType::Integer),
    );

    db.install_all(&registry).await.expect("install all");

    let row = db.fetch_one("select pl_square(20)").await.expect("call");
    assert_eq!(row["pl_square"], serde_json::json!(400));
    let row = db.fetch_one("select pl_max(10, 20)").await.expect("call");
    assert_eq!(row["pl_max"], serde_json::json!(20));
}
