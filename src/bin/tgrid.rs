//! tgrid CLI - inspect, repair and edit tables in the JSON exchange format

#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use tablegrid::{
    diagnostics::{check_table, format_diagnostics},
    typst::{table_to_typst, typst_to_table},
    Document, MergeDirection, NodeId, SplitAxis, TableCommand, TableData, TableError, TableGrid,
    TableOptions,
};
#[cfg(feature = "cli")]
use tracing::{debug, info};
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "tgrid")]
#[command(version)]
#[command(about = "tgrid - structural table editing over the JSON exchange format", long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Options file (TOML) for the table engine
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct Io {
    /// Input file path (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct CellRef {
    /// Logical row of the cell
    #[arg(long)]
    row: usize,

    /// Logical column of the cell
    #[arg(long)]
    column: usize,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Report invariant violations without changing anything
    Check {
        /// Input file path (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Repair a table and print the normalized JSON
    Fix {
        #[command(flatten)]
        io: Io,
    },

    /// Render a table
    Render {
        #[command(flatten)]
        io: Io,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Typst)]
        format: Format,
    },

    /// Read a Typst #table(...) and print it as JSON
    Import {
        #[command(flatten)]
        io: Io,
    },

    /// Insert a row at a logical index
    InsertRow {
        #[command(flatten)]
        io: Io,

        /// Logical row index of the new row
        #[arg(long)]
        at: usize,

        /// Row whose cell widths the new row copies
        #[arg(long)]
        copy_from: Option<usize>,
    },

    /// Insert a column at a logical index
    InsertColumn {
        #[command(flatten)]
        io: Io,

        /// Logical column index of the new column
        #[arg(long)]
        at: usize,
    },

    /// Remove logical rows
    RemoveRow {
        #[command(flatten)]
        io: Io,

        /// Rows to remove
        #[arg(long, value_delimiter = ',', required = true)]
        rows: Vec<usize>,
    },

    /// Remove logical columns
    RemoveColumn {
        #[command(flatten)]
        io: Io,

        /// Columns to remove
        #[arg(long, value_delimiter = ',', required = true)]
        columns: Vec<usize>,
    },

    /// Merge a cell with its neighbour, or every cell of a rectangle
    Merge {
        #[command(flatten)]
        io: Io,

        #[command(flatten)]
        cell: CellRef,

        /// Neighbour to merge with
        #[arg(short, long, value_enum, conflicts_with_all = ["to_row", "to_column"])]
        direction: Option<Side>,

        /// Last row of the rectangle to merge
        #[arg(long, requires = "to_column")]
        to_row: Option<usize>,

        /// Last column of the rectangle to merge
        #[arg(long, requires = "to_row")]
        to_column: Option<usize>,
    },

    /// Split a merged cell in two
    Split {
        #[command(flatten)]
        io: Io,

        #[command(flatten)]
        cell: CellRef,

        /// Split axis
        #[arg(short, long, value_enum)]
        axis: Axis,
    },

    /// Set the heading row and/or column count
    Heading {
        #[command(flatten)]
        io: Io,

        /// Heading rows
        #[arg(long)]
        rows: Option<usize>,

        /// Heading columns
        #[arg(long)]
        columns: Option<usize>,
    },
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Typst,
    Grid,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Up,
    Down,
    Left,
    Right,
}

#[cfg(feature = "cli")]
impl From<Side> for MergeDirection {
    fn from(side: Side) -> Self {
        match side {
            Side::Up => MergeDirection::Up,
            Side::Down => MergeDirection::Down,
            Side::Left => MergeDirection::Left,
            Side::Right => MergeDirection::Right,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum Axis {
    Vertical,
    Horizontal,
}

#[cfg(feature = "cli")]
impl From<Axis> for SplitAxis {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::Vertical => SplitAxis::Vertical,
            Axis::Horizontal => SplitAxis::Horizontal,
        }
    }
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        std::process::exit(2);
    }
}

#[cfg(feature = "cli")]
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn load_options(path: Option<&PathBuf>) -> CliResult<TableOptions> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            let options: TableOptions = toml::from_str(&text)?;
            debug!(path = %path.display(), "loaded options");
            Ok(options)
        }
        None => Ok(TableOptions::default()),
    }
}

#[cfg(feature = "cli")]
fn read_input(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

#[cfg(feature = "cli")]
fn write_output(path: Option<&PathBuf>, text: &str) -> io::Result<()> {
    match path {
        Some(path) => {
            let mut file = fs::File::create(path)?;
            writeln!(file, "{}", text.trim_end())?;
            eprintln!("✓ Output written to: {}", path.display());
        }
        None => println!("{}", text.trim_end()),
    }
    Ok(())
}

/// Load the input table into a fresh document
#[cfg(feature = "cli")]
fn load(io: &Io, options: TableOptions) -> CliResult<(Document, NodeId)> {
    let input = read_input(io.input.as_ref())?;
    let data = TableData::from_json(&input)?;
    let mut doc = Document::with_options(options);
    let table = data.insert_into(&mut doc, 0)?;
    Ok((doc, table))
}

#[cfg(feature = "cli")]
fn cell_at(doc: &Document, table: NodeId, at: &CellRef) -> CliResult<NodeId> {
    TableGrid::project(doc, table)
        .cell_at(at.row, at.column)
        .map(|slot| slot.cell)
        .ok_or_else(|| format!("no cell at row {}, column {}", at.row, at.column).into())
}

/// Run one editing command against the input table and print the result
#[cfg(feature = "cli")]
fn edit(
    io: &Io,
    options: TableOptions,
    command: impl FnOnce(&Document, NodeId) -> CliResult<Vec<TableCommand>>,
) -> CliResult<()> {
    let (mut doc, table) = load(io, options)?;
    for command in command(&doc, table)? {
        let output = doc.execute(&command)?;
        info!(command = command.name(), table = %output.table, "applied");
    }
    let data = TableData::from_table(&doc, table)?;
    write_output(io.output.as_ref(), &data.to_json()?)?;
    Ok(())
}

#[cfg(feature = "cli")]
fn run(cli: Cli) -> CliResult<()> {
    let options = load_options(cli.config.as_ref())?;

    match cli.command {
        Commands::Check { input, no_color } => {
            let text = read_input(input.as_ref())?;
            let data = TableData::from_json(&text)?;
            let mut doc = Document::with_options(TableOptions::raw());
            let table = data.insert_into(&mut doc, 0)?;

            let result = check_table(&doc, table)?;
            println!("{}", format_diagnostics(&result, !no_color));
            if result.has_errors() {
                std::process::exit(1);
            }
        }

        Commands::Fix { io } => {
            let (mut doc, table) = load(&io, TableOptions { run_post_fixers: false, ..options })?;
            let changed = doc.normalize(table)?;
            if !changed {
                eprintln!("table is already well-formed");
            }
            let data = TableData::from_table(&doc, table)?;
            write_output(io.output.as_ref(), &data.to_json()?)?;
        }

        Commands::Render { io, format } => {
            let (doc, table) = load(&io, options)?;
            let text = match format {
                Format::Typst => table_to_typst(&doc, table)?,
                Format::Grid => render_grid(&doc, table),
                Format::Json => TableData::from_table(&doc, table)?.to_json()?,
            };
            write_output(io.output.as_ref(), &text)?;
        }

        Commands::Import { io } => {
            let input = read_input(io.input.as_ref())?;
            let data = typst_to_table(&input)?;
            let mut doc = Document::with_options(options);
            let table = data.insert_into(&mut doc, 0)?;
            let data = TableData::from_table(&doc, table)?;
            write_output(io.output.as_ref(), &data.to_json()?)?;
        }

        Commands::InsertRow { io, at, copy_from } => edit(&io, options, |_, table| {
            Ok(vec![TableCommand::InsertRow {
                table,
                at,
                copy_structure_from: copy_from,
            }])
        })?,

        Commands::InsertColumn { io, at } => edit(&io, options, |_, table| {
            Ok(vec![TableCommand::InsertColumn { table, at }])
        })?,

        Commands::RemoveRow { io, rows } => edit(&io, options, |_, table| {
            Ok(vec![TableCommand::RemoveRows { table, rows }])
        })?,

        Commands::RemoveColumn { io, columns } => edit(&io, options, |_, table| {
            Ok(vec![TableCommand::RemoveColumns { table, columns }])
        })?,

        Commands::Merge {
            io,
            cell,
            direction,
            to_row,
            to_column,
        } => edit(&io, options, |doc, table| {
            let first = cell_at(doc, table, &cell)?;
            let command = match (direction, to_row, to_column) {
                (Some(side), _, _) => TableCommand::MergeCell {
                    cell: first,
                    direction: side.into(),
                },
                (None, Some(row), Some(column)) => {
                    let grid = TableGrid::project(doc, table);
                    let mut cells = Vec::new();
                    for r in cell.row.min(row)..=cell.row.max(row) {
                        for c in cell.column.min(column)..=cell.column.max(column) {
                            let slot = grid
                                .cell_at(r, c)
                                .ok_or_else(|| TableError::out_of_range("slot", r, grid.row_count()))?;
                            if !cells.contains(&slot.cell) {
                                cells.push(slot.cell);
                            }
                        }
                    }
                    TableCommand::MergeRange { cells }
                }
                _ => return Err("merge needs --direction or --to-row/--to-column".into()),
            };
            Ok(vec![command])
        })?,

        Commands::Split { io, cell, axis } => edit(&io, options, |doc, table| {
            Ok(vec![TableCommand::SplitCell {
                cell: cell_at(doc, table, &cell)?,
                axis: axis.into(),
            }])
        })?,

        Commands::Heading { io, rows, columns } => edit(&io, options, |_, table| {
            let mut commands = Vec::new();
            if let Some(count) = rows {
                commands.push(TableCommand::SetHeadingRows { table, count });
            }
            if let Some(count) = columns {
                commands.push(TableCommand::SetHeadingColumns { table, count });
            }
            if commands.is_empty() {
                return Err("heading needs --rows and/or --columns".into());
            }
            Ok(commands)
        })?,
    }

    Ok(())
}

/// Plain-text view of the logical grid.
///
/// Anchor slots show the first line of the cell; slots covered by a span
/// show `^` (from above) or `<` (from the left).
#[cfg(feature = "cli")]
fn render_grid(doc: &Document, table: NodeId) -> String {
    let grid = TableGrid::project(doc, table);
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(grid.row_count());
    for r in 0..grid.row_count() {
        let mut row = Vec::with_capacity(grid.column_count());
        for c in 0..grid.column_count() {
            let text = match grid.slot(r, c) {
                Some(slot) if slot.is_anchor => doc
                    .block_texts(slot.cell.cell)
                    .first()
                    .cloned()
                    .unwrap_or_default(),
                Some(slot) if slot.cell.row < r => "^".to_string(),
                Some(_) => "<".to_string(),
                None => String::new(),
            };
            row.push(text);
        }
        rows.push(row);
    }

    let widths: Vec<usize> = (0..grid.column_count())
        .map(|c| {
            rows.iter()
                .map(|row| row[c].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut output = String::new();
    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(text, &width)| format!("{:width$}", text, width = width))
            .collect();
        output.push_str("| ");
        output.push_str(&line.join(" | "));
        output.push_str(" |\n");
    }
    output
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install tablegrid --features cli");
    eprintln!("  tgrid <COMMAND> [INPUT]");
}
