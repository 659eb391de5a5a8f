use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum, ValueHint};

use csv2sqlite::data::loader::{LoadOptions, load_table};
use csv2sqlite::error::ImportError;
use csv2sqlite::report::ImportReport;
use csv2sqlite::store::verify::verify_table;
use csv2sqlite::store::writer::{IfExists, write_table};

#[derive(Parser, Debug)]
#[command(
    name = "csv2sqlite",
    version,
    about = "Import a CSV into SQLite as a single table, inferring numeric columns"
)]
struct Cli {
    #[arg(
        long = "csv",
        default_value = "team_data_combined/plays.csv",
        help = "Path to the input CSV",
        value_hint = ValueHint::FilePath
    )]
    csv_path: PathBuf,

    #[arg(
        long = "db",
        default_value = "plays.db",
        help = "Output SQLite database path",
        value_hint = ValueHint::FilePath
    )]
    db_path: PathBuf,

    #[arg(long = "table", default_value = "plays", help = "SQLite table name")]
    table_name: String,

    #[arg(
        long,
        value_enum,
        default_value = "replace",
        help = "What to do when the table already exists"
    )]
    if_exists: IfExists,

    #[arg(
        long,
        default_value = ",",
        value_parser = parse_delimiter,
        help = "Field delimiter (single ASCII character)"
    )]
    delimiter: u8,

    #[arg(long, value_enum, default_value = "text", help = "Report format")]
    format: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_delimiter(s: &str) -> Result<u8, ImportError> {
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ if s == "\\t" => Ok(b'\t'),
        _ => Err(ImportError::InvalidDelimiter(s.to_string())),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    if !cli.csv_path.exists() {
        return Err(ImportError::InputNotFound(cli.csv_path.clone()).into());
    }
    let text = cli.format == OutputFormat::Text;

    if text {
        println!("Reading CSV: {}", cli.csv_path.display());
    }
    let options = LoadOptions {
        delimiter: cli.delimiter,
    };
    let table = load_table(&cli.csv_path, &options)?;

    if text {
        println!(
            "Writing SQLite DB: {} (table: {})",
            cli.db_path.display(),
            cli.table_name
        );
    }
    let written = write_table(&table, &cli.db_path, &cli.table_name, cli.if_exists)?;
    let verification = verify_table(&cli.db_path, &cli.table_name)?;
    if verification.row_count as usize != table.len() && cli.if_exists != IfExists::Append {
        log::warn!(
            "row count mismatch: loaded {} rows, table holds {}",
            table.len(),
            verification.row_count
        );
    }

    let report = ImportReport::new(
        &cli.csv_path,
        &cli.db_path,
        cli.if_exists,
        &table,
        written,
        verification,
    );
    match cli.format {
        OutputFormat::Text => println!("{report}"),
        OutputFormat::Json => println!("{}", report.render_json()?),
    }
    Ok(())
}
