//! CLI command definitions and handlers

use clap::{Parser, Subcommand, ValueEnum};

use crate::lookup::TargetKind;
use crate::output::export::ExportFormat;

pub mod db;
pub mod history;
pub mod init;
pub mod lookup;
pub mod operator;
pub mod status;

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored field-per-line output
    #[default]
    Pretty,
    /// Bordered table
    Table,
    /// Pretty-printed JSON
    Json,
}

/// How to classify the lookup target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Detect from the target's shape
    #[default]
    Auto,
    Phone,
    Nik,
}

impl KindArg {
    pub fn to_target_kind(self) -> Option<TargetKind> {
        match self {
            KindArg::Auto => None,
            KindArg::Phone => Some(TargetKind::Phone),
            KindArg::Nik => Some(TargetKind::Nik),
        }
    }
}

/// Lacak CLI - phone number and national ID lookup
#[derive(Parser, Debug)]
#[command(name = "lacak")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "LACAK_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "LACAK_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "LACAK_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Bypass the result cache, always query the tiers afresh
    #[arg(long, global = true, env = "LACAK_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize lacak configuration
    Init,

    /// Show configuration status
    Status,

    /// Look up a phone number or NIK
    Lookup {
        /// Phone number (08...) or 16-digit NIK
        target: String,

        /// Force the target classification
        #[arg(long, default_value = "auto")]
        kind: KindArg,

        /// Export the result to a file in the given format
        #[arg(long)]
        export: Option<ExportFormat>,
    },

    /// Look up every target listed in a file, one per line
    Batch {
        /// Path to the target list
        file: String,

        /// Export each result to a file in the given format
        #[arg(long)]
        export: Option<ExportFormat>,
    },

    /// Carrier prefix tools
    #[command(subcommand)]
    Operator(OperatorCommands),

    /// Manage the local database
    #[command(subcommand)]
    Db(DbCommands),

    /// View and manage search history
    #[command(subcommand)]
    History(HistoryCommands),
}

/// Carrier prefix subcommands
#[derive(Subcommand, Debug)]
pub enum OperatorCommands {
    /// Resolve the carrier for a phone number
    Check {
        /// Phone number (08...)
        phone: String,
    },

    /// List the known carrier prefixes
    List,
}

/// Local database subcommands
#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Create the database file and schema
    Init,

    /// Insert or replace a phone record
    AddPhone {
        /// Phone number (08...)
        number: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        province: Option<String>,

        #[arg(long)]
        operator: Option<String>,
    },

    /// Insert or replace a NIK record
    AddNik {
        /// 16-digit NIK
        nik: String,

        #[arg(long)]
        name: Option<String>,

        /// Birth date as YYYY-MM-DD
        #[arg(long)]
        birth_date: Option<String>,

        #[arg(long)]
        gender: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        province: Option<String>,
    },

    /// Show the stored record for a target, without touching the API
    Get {
        /// Phone number (08...) or 16-digit NIK
        target: String,
    },

    /// Bulk-import phone records from a JSON array or a headered CSV file
    Import {
        /// Path to the .json or .csv file
        file: String,
    },

    /// List stored phone records
    List {
        /// Show at most this many records
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Delete the stored record for a target
    Delete {
        /// Phone number (08...) or 16-digit NIK
        target: String,
    },
}

/// Search history subcommands
#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List past searches, oldest first
    List {
        /// Show at most this many entries, keeping the most recent
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Summarize past searches
    Stats,

    /// Delete all history entries
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
