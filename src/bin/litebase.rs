use litebase::config::{load_config, Config, DatabaseConfig};
use litebase::core::db::{Driver, SqliteConnection};
use litebase::core::{LitebaseError, Result};
use litebase::logging;
use litebase::toolbar::{Collector, DatabaseCollector};
use serde_json::{json, Value};
use std::process::ExitCode;
use tracing::info;

const USAGE: &str = "\
Usage: litebase <database|config.toml> <command> [args]

Commands:
  tables [--prefixed]    list user tables
  columns <table>        list column names
  fields <table>         describe columns
  indexes <table>        list indexes and their columns
  foreign-keys <table>   list foreign keys
  exec <sql>             run one statement
  version                print the SQLite library version
  toolbar <sql>...       run statements and print the database collector";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    }

    let config = match open_config(&args[0]) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init_logging(config.log_filter());
    info!(database = %config.database.database, command = %args[1], "starting litebase");

    match run(config.database, &args[1], &args[2..]) {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", LitebaseError::from(e));
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// A `.toml` argument is a config file; anything else is a database path.
fn open_config(target: &str) -> Result<Config> {
    if target.ends_with(".toml") {
        return load_config(target);
    }
    let mut database = DatabaseConfig::new(target);
    // the CLI opens exactly what it was given
    if !database.is_memory() && !target.contains(std::path::MAIN_SEPARATOR) {
        database.writable_path = std::env::current_dir()?;
    }
    Ok(Config {
        database,
        logging: None,
    })
}

fn required<'a>(args: &'a [String], what: &str) -> Result<&'a str> {
    args.first()
        .map(String::as_str)
        .ok_or_else(|| LitebaseError::Config(format!("missing {what}\n\n{USAGE}")))
}

fn run(config: DatabaseConfig, command: &str, args: &[String]) -> Result<Value> {
    let mut conn = SqliteConnection::open(config)?;

    let output = match command {
        "tables" => {
            let prefixed = args.iter().any(|a| a == "--prefixed");
            json!(conn.list_tables(prefixed)?)
        }
        "columns" => json!(conn.list_columns(required(args, "table")?)?),
        "fields" => serde_json::to_value(conn.field_data(required(args, "table")?)?)?,
        "indexes" => serde_json::to_value(conn.index_data(required(args, "table")?)?)?,
        "foreign-keys" => serde_json::to_value(conn.foreign_key_data(required(args, "table")?)?)?,
        "version" => json!(conn.version()),
        "exec" => {
            let outcome = conn.execute(required(args, "statement")?)?;
            match outcome.into_rows() {
                Some(rows) => json!({ "columns": rows.columns, "rows": rows.to_json() }),
                None => json!({
                    "affected_rows": conn.affected_rows()?,
                    "insert_id": conn.insert_id(),
                }),
            }
        }
        "toolbar" => {
            for sql in args {
                // failures are part of what the toolbar shows
                let _ = conn.execute(sql);
            }
            serde_json::to_value(DatabaseCollector::new(conn.query_log()).snapshot())?
        }
        other => {
            return Err(LitebaseError::Config(format!(
                "unknown command '{other}'\n\n{USAGE}"
            )))
        }
    };

    conn.close()?;
    Ok(output)
}
