//! addonkit - command-line front end
//!
//! Loads a JSON array of records into a table, optionally filters it
//! through a view, and prints the rows or the tagged serialized table.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use addonkit::codec::Node;
use addonkit::data::DataTable;
use addonkit::runtime::{Runtime, RuntimeConfig};
use addonkit::view::DataSource;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

struct Options {
    input: Option<PathBuf>,
    keys: Vec<String>,
    name: Option<String>,
    filter: Option<String>,
    json: bool,
    pretty: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let mut options = Options {
        input: None,
        keys: Vec::new(),
        name: None,
        filter: None,
        json: false,
        pretty: false,
    };
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-i" | "--input" => {
                i += 1;
                if i < args.len() {
                    options.input = Some(PathBuf::from(&args[i]));
                }
            }
            "-k" | "--key" => {
                i += 1;
                if i < args.len() {
                    options.keys.push(args[i].clone());
                }
            }
            "-n" | "--name" => {
                i += 1;
                if i < args.len() {
                    options.name = Some(args[i].clone());
                }
            }
            "-f" | "--filter" => {
                i += 1;
                if i < args.len() {
                    options.filter = Some(args[i].clone());
                }
            }
            "--json" => {
                options.json = true;
            }
            "--pretty" => {
                options.json = true;
                options.pretty = true;
            }
            "-v" | "--verbose" => {
                verbose = true;
            }
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "--version" => {
                println!("addonkit v{}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            arg => {
                if !arg.starts_with('-') && options.input.is_none() {
                    options.input = Some(PathBuf::from(arg));
                } else {
                    eprintln!("Unknown option: {}", arg);
                    return ExitCode::FAILURE;
                }
            }
        }
        i += 1;
    }

    if verbose {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("addonkit=trace"))
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let runtime = Runtime::start_with_config(RuntimeConfig::new().pretty(options.pretty));
    match run(&runtime, &options) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("addonkit - load, filter and serialize change-tracked tables");
    println!();
    println!("Usage: addonkit [OPTIONS] [FILE]");
    println!();
    println!("Reads a JSON array of records from FILE (or stdin).");
    println!();
    println!("Options:");
    println!("  -i, --input FILE       JSON file to load (default: stdin)");
    println!("  -k, --key FIELD        Primary key field, repeatable (none: one row kept)");
    println!("  -n, --name NAME        Table name (default: table)");
    println!("  -f, --filter EXPR      Keep rows matching EXPR, e.g. \"row.v > 1\"");
    println!("      --json             Print the tagged serialized table");
    println!("      --pretty           Like --json, pretty-printed");
    println!("  -v, --verbose          Log to stderr");
    println!("  -h, --help             Show this help message");
    println!("  --version              Show version");
    println!();
    println!("Examples:");
    println!("  addonkit people.json -k id                 Print the table");
    println!("  addonkit people.json -k id -f \"age >= 18\"  Print matching rows");
    println!("  addonkit -i people.json -k id --pretty     Print the serialized table");
}

fn run(runtime: &Runtime, options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    let text = match &options.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    let records: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text)?
    };

    let name = options.name.as_deref();
    let Some(table) = runtime.convert_table(&records, name, &options.keys)? else {
        println!("(no data)");
        return Ok(());
    };

    let table = match &options.filter {
        Some(filter) => {
            let view = runtime.view(Arc::new(table.clone()), filter)?;
            let rows = Value::Array(view.get_data_list());
            runtime
                .convert_table(&rows, Some(table.name()), table.primary_key_fields())?
                .unwrap_or_else(|| DataTable::new(table.name()))
        }
        None => table,
    };

    if options.json {
        println!("{}", runtime.serialize(&Node::typed(table))?);
    } else {
        print_rows(&DataSource::get_data_list(&table));
    }
    Ok(())
}

fn print_rows(rows: &[Value]) {
    let Some(first) = rows.first().and_then(Value::as_object) else {
        println!("(0 rows)");
        return;
    };

    let columns: Vec<&String> = first.keys().collect();
    println!("{}", columns.iter().map(|s| s.as_str()).collect::<Vec<_>>().join("\t"));

    for row in rows {
        let values: Vec<String> = columns
            .iter()
            .map(|col| row.get(col.as_str()).map(format_value).unwrap_or_default())
            .collect();
        println!("{}", values.join("\t"));
    }
    println!("({} rows)", rows.len());
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}
