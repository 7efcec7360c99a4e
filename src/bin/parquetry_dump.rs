//! A small inspector binary: prints a Parquet file's footer metadata or
//! its reconstructed schema tree. Debugging aid only; it has no bearing
//! on the library's read path.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use parquetry::schema::SchemaNode;
use parquetry::FileReader;

#[derive(Parser)]
#[command(name = "parquetry-dump", author, version, about = "Inspects Apache Parquet file metadata")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print row count, row-group count, and per-column physical type and codec.
    Meta {
        #[arg(long)]
        path: PathBuf,
    },
    /// Print the reconstructed schema tree.
    Schema {
        #[arg(long)]
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Meta { path } => print_meta(&path),
        Command::Schema { path } => print_schema(&path),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_meta(path: &PathBuf) -> parquetry::Result<()> {
    let reader = FileReader::open(path)?;
    let metadata = reader.metadata();
    println!("file: {}", path.display());
    println!("version: {}", metadata.version);
    if let Some(created_by) = &metadata.created_by {
        println!("created by: {}", created_by);
    }
    println!("rows: {}", metadata.num_rows);
    println!("row groups: {}", metadata.row_groups.len());
    println!("columns:");
    for column in &reader.schema().columns {
        let row_group = metadata.row_groups.first();
        let codec = row_group
            .and_then(|rg| rg.columns.get(column.column_index))
            .map(|c| format!("{:?}", c.meta_data.codec))
            .unwrap_or_else(|| "?".to_string());
        println!(
            "  {} ({:?}, codec={})",
            column.dotted_path(),
            column.physical_type,
            codec
        );
    }
    Ok(())
}

fn print_schema(path: &PathBuf) -> parquetry::Result<()> {
    let reader = FileReader::open(path)?;
    println!("{}", path.display());
    if let Some(root) = reader.schema().root.as_group() {
        let count = root.fields.len();
        for (index, field) in root.fields.iter().enumerate() {
            print_node(field, "", index + 1 == count);
        }
    }
    Ok(())
}

fn print_node(node: &SchemaNode, prefix: &str, is_last: bool) {
    let connector = if is_last { "└─ " } else { "├─ " };
    match node {
        SchemaNode::Primitive(leaf) => {
            println!(
                "{}{}{} ({:?}, {:?})",
                prefix, connector, leaf.name, leaf.repetition, leaf.physical_type
            );
        }
        SchemaNode::Group(group) => {
            println!("{}{}{} ({:?}, {:?})", prefix, connector, group.name, group.repetition, group.kind);
            let child_prefix = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
            let count = group.fields.len();
            for (index, field) in group.fields.iter().enumerate() {
                print_node(field, &child_prefix, index + 1 == count);
            }
        }
    }
}
