//! tablekit CLI
//!
//! Command-line tool for converting typed CSV tables to table assets and back.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tablekit_core::{
    check_files, decode_with, encode, find_table_files, to_plain_csv, CoercionPolicy,
    DecodeOptions, MissingNameRow, Table, TableAsset,
};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "tablekit")]
#[command(about = "Typed CSV table converter", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Decoder flags shared by every command that reads a table document
#[derive(clap::Args)]
struct DecodeArgs {
    /// Fail when the document ends before its header or type row
    #[arg(long)]
    strict: bool,

    /// Fail on unparsable numbers instead of substituting zero
    #[arg(long)]
    fail_on_bad_number: bool,

    /// What to do when the first line is not a '#' name row
    #[arg(long, value_enum, default_value = "consume")]
    name_row: NameRowArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum NameRowArg {
    /// Skip the line and expect headers on the next one
    Consume,
    /// Read the line as the header row
    AsHeader,
}

impl DecodeArgs {
    fn options(&self) -> DecodeOptions {
        let coercion = if self.fail_on_bad_number {
            CoercionPolicy::Fail
        } else {
            CoercionPolicy::DefaultZero
        };
        let missing_name_row = match self.name_row {
            NameRowArg::Consume => MissingNameRow::Consume,
            NameRowArg::AsHeader => MissingNameRow::AsHeader,
        };
        DecodeOptions::new()
            .with_coercion(coercion)
            .with_missing_name_row(missing_name_row)
            .with_strict_structure(self.strict)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Load a table CSV and save it as an asset (JSON)
    Import {
        /// Table CSV to read
        #[arg(short, long)]
        input: PathBuf,

        /// Asset file to write
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// Save an asset (JSON) as a table CSV
    Export {
        /// Asset file to read
        #[arg(short, long)]
        input: PathBuf,

        /// Table CSV to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Create an empty asset file
    Create {
        /// Asset file to write
        #[arg(short, long)]
        output: PathBuf,

        /// Table name
        #[arg(short, long, default_value = "")]
        name: String,
    },

    /// Decode and display a table CSV
    Show {
        /// Table CSV to read
        #[arg(short, long)]
        file: PathBuf,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// Decode every table CSV under the given directories
    Check {
        /// Root directories to scan
        #[arg(short, long, required = true)]
        root: Vec<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// Convert a table CSV to plain CSV (single header row, no markers)
    Flatten {
        /// Table CSV to read
        #[arg(short, long)]
        input: PathBuf,

        /// Plain CSV to write
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        decode: DecodeArgs,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let failed = match run(cli.command) {
        Ok(failed) => failed,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if failed {
        std::process::exit(2);
    }
}

/// Console logging; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns `true` when a batch command finished with failures
fn run(command: Commands) -> tablekit_core::Result<bool> {
    match command {
        Commands::Import {
            input,
            output,
            decode,
        } => cmd_import(&input, &output, &decode.options()).map(|_| false),
        Commands::Export { input, output } => cmd_export(&input, &output).map(|_| false),
        Commands::Create { output, name } => cmd_create(&output, &name).map(|_| false),
        Commands::Show {
            file,
            limit,
            decode,
        } => cmd_show(&file, limit, &decode.options()).map(|_| false),
        Commands::Check { root, json, decode } => cmd_check(&root, json, &decode.options()),
        Commands::Flatten {
            input,
            output,
            decode,
        } => cmd_flatten(&input, &output, &decode.options()).map(|_| false),
    }
}

fn read_table(path: &Path, options: &DecodeOptions) -> tablekit_core::Result<Table> {
    debug!(path = %path.display(), "reading table document");
    let text = fs::read_to_string(path).map_err(|e| tablekit_core::Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    decode_with(&text, options)
}

fn cmd_import(input: &Path, output: &Path, options: &DecodeOptions) -> tablekit_core::Result<()> {
    let table = read_table(input, options)?;
    let asset = TableAsset::from_table(&table);
    asset.save(output)?;

    info!(table = %asset.table_name, "asset written");
    println!(
        "Imported '{}' ({} columns, {} rows) to {}",
        asset.table_name,
        asset.column_count(),
        asset.row_count(),
        output.display()
    );
    Ok(())
}

fn cmd_export(input: &Path, output: &Path) -> tablekit_core::Result<()> {
    let asset = TableAsset::load(input)?;
    let table = asset.to_table()?;
    fs::write(output, encode(&table))?;

    println!("Exported {} rows to {}", table.row_count(), output.display());
    Ok(())
}

fn cmd_create(output: &Path, name: &str) -> tablekit_core::Result<()> {
    TableAsset::new(name).save(output)?;
    println!("Created asset file: {}", output.display());
    Ok(())
}

fn cmd_show(file: &Path, limit: Option<usize>, options: &DecodeOptions) -> tablekit_core::Result<()> {
    let table = read_table(file, options)?;

    println!("File: {}", file.display());
    println!("Table: {}", table.name);
    println!("Columns: {}", table.column_count());
    println!("Rows: {}", table.row_count());
    println!();

    // Print header
    let header: Vec<String> = table
        .columns()
        .map(|c| format!("{}:{}", c.name, c.ty))
        .collect();
    println!("{}", header.join("\t"));
    println!("{}", "-".repeat(header.len() * 12));

    // Print rows
    let row_limit = limit.unwrap_or(table.row_count());
    for row in table.rows().iter().take(row_limit) {
        let values: Vec<String> = table
            .columns()
            .map(|c| row.get(&c.name).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        println!("{}", values.join("\t"));
    }

    if table.row_count() > row_limit {
        println!("... ({} more rows)", table.row_count() - row_limit);
    }

    Ok(())
}

fn cmd_check(roots: &[PathBuf], json: bool, options: &DecodeOptions) -> tablekit_core::Result<bool> {
    let files = find_table_files(roots)?;
    let reports = check_files(&files, options);
    let failures = reports.iter().filter(|r| !r.is_ok()).count();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(failures > 0);
    }

    for report in &reports {
        match &report.outcome {
            Ok(summary) => println!(
                "ok    {} ('{}', {} columns, {} rows)",
                report.path.display(),
                summary.name,
                summary.columns,
                summary.rows
            ),
            Err(message) => println!("FAIL  {}: {}", report.path.display(), message),
        }
    }

    println!();
    println!(
        "Checked {} files: {} ok, {} failed",
        reports.len(),
        reports.len() - failures,
        failures
    );

    Ok(failures > 0)
}

fn cmd_flatten(input: &Path, output: &Path, options: &DecodeOptions) -> tablekit_core::Result<()> {
    let table = read_table(input, options)?;
    fs::write(output, to_plain_csv(&table)?)?;

    println!("Flattened {} rows to {}", table.row_count(), output.display());
    Ok(())
}
