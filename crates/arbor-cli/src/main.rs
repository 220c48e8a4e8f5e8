use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use arbor_core::SearchMode;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "arbor", version, about = "Arbor column browser CLI")]
struct Cli {
    /// Console configuration (YAML). Built-in defaults apply when omitted.
    #[arg(long, short = 'c', global = true, env = "ARBOR_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set, e.g. "debug" or "arbor_query=trace".
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the schema -> table -> column tree of a metadata file.
    Tree {
        /// Metadata rows (JSON array of TABLE_SCHEMA/TABLE_NAME/COLUMN_NAME/DATA_TYPE objects)
        metadata: PathBuf,

        /// Case-insensitive search string
        #[arg(long, short = 's', default_value = "")]
        search: String,

        /// What the search matches: tables-and-columns, tables-only or columns-only
        #[arg(long, default_value = "tables-and-columns")]
        mode: SearchMode,

        /// Expand a table (repeatable)
        #[arg(long = "expand", value_name = "TABLE")]
        expand: Vec<String>,

        /// Only print the tables of this schema
        #[arg(long)]
        schema: Option<String>,

        /// Print the tree as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Derive the "Show: <column>" query.
    ShowColumn {
        metadata: PathBuf,

        /// Table as "schema.table" or a bare table name
        table: String,

        column: String,

        /// Query currently in the editor
        #[arg(long, short = 'q')]
        query: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Run a table menu entry (select-columns, select-star, count, min-max-time,
    /// replace-from, left-join, inner-join, remove-join, aggregate-count, copy).
    TableAction {
        metadata: PathBuf,

        table: String,

        action: String,

        #[arg(long, short = 'q')]
        query: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Run a column menu entry (show, copy, sum, min, max, avg, count-distinct,
    /// approx-count-distinct[-hll|-theta], approx-median, latest-hour|day|week,
    /// remove-filter).
    ColumnAction {
        metadata: PathBuf,

        table: String,

        column: String,

        action: String,

        #[arg(long, short = 'q')]
        query: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List the entries of a table menu, or of a column menu with --column.
    Menu {
        metadata: PathBuf,

        table: String,

        #[arg(long)]
        column: Option<String>,

        #[arg(long, short = 'q')]
        query: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Build an explain request body, or read a plan back with --plan.
    Explain {
        /// SQL to explain
        sql: Option<String>,

        /// Query context (JSON object)
        #[arg(long)]
        context: Option<String>,

        /// Context entries that always apply (JSON object)
        #[arg(long)]
        mandatory_context: Option<String>,

        /// Outer row limit of the query being explained
        #[arg(long)]
        wrap_limit: Option<u64>,

        /// Result rows of an explain query (JSON file) to print
        #[arg(long, conflicts_with = "sql")]
        plan: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    match cli.cmd {
        Command::Tree {
            metadata,
            search,
            mode,
            expand,
            schema,
            json,
        } => commands::tree::run(
            &metadata,
            config,
            commands::tree::TreeOptions {
                search,
                mode,
                expand,
                schema,
                json,
            },
        )?,

        Command::ShowColumn {
            metadata,
            table,
            column,
            query,
            json,
        } => commands::query::column_action(
            &metadata,
            config,
            &table,
            &column,
            "show",
            query.as_deref(),
            json,
        )?,

        Command::TableAction {
            metadata,
            table,
            action,
            query,
            json,
        } => commands::query::table_action(
            &metadata,
            config,
            &table,
            &action,
            query.as_deref(),
            json,
        )?,

        Command::ColumnAction {
            metadata,
            table,
            column,
            action,
            query,
            json,
        } => commands::query::column_action(
            &metadata,
            config,
            &table,
            &column,
            &action,
            query.as_deref(),
            json,
        )?,

        Command::Menu {
            metadata,
            table,
            column,
            query,
            json,
        } => commands::query::menu(
            &metadata,
            config,
            &table,
            column.as_deref(),
            query.as_deref(),
            json,
        )?,

        Command::Explain {
            sql,
            context,
            mandatory_context,
            wrap_limit,
            plan,
        } => match plan {
            Some(plan) => commands::explain::print_plan(&plan)?,
            None => commands::explain::payload(
                sql.as_deref(),
                context.as_deref(),
                mandatory_context.as_deref(),
                wrap_limit,
            )?,
        },
    }

    Ok(())
}
