//! Lacak CLI - phone number and national ID lookup

use clap::Parser;

mod cli;
mod client;
mod config;
mod error;
mod lookup;
mod output;
mod store;

use cli::{Cli, Commands, DbCommands, HistoryCommands, OperatorCommands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.debug {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    match cli.command {
        Commands::Init => cli::init::run(cli.config.as_deref()),
        Commands::Status => cli::status::run(cli.config.as_deref()),
        Commands::Lookup {
            target,
            kind,
            export,
        } => {
            cli::lookup::run(
                &target,
                kind,
                export,
                cli.format,
                cli.config.as_deref(),
                cli.no_cache,
            )
            .await
        }
        Commands::Batch { file, export } => {
            cli::lookup::batch(&file, export, cli.format, cli.config.as_deref(), cli.no_cache)
                .await
        }
        Commands::Operator(operator_cmd) => match operator_cmd {
            OperatorCommands::Check { phone } => {
                cli::operator::check(&phone, cli.config.as_deref()).await
            }
            OperatorCommands::List => cli::operator::list(cli.format),
        },
        Commands::Db(db_cmd) => match db_cmd {
            DbCommands::Init => cli::db::init(cli.config.as_deref()),
            DbCommands::AddPhone {
                number,
                name,
                address,
                city,
                province,
                operator,
            } => cli::db::add_phone(
                number,
                name,
                address,
                city,
                province,
                operator,
                cli.config.as_deref(),
            ),
            DbCommands::AddNik {
                nik,
                name,
                birth_date,
                gender,
                address,
                city,
                province,
            } => cli::db::add_nik(
                nik,
                name,
                birth_date,
                gender,
                address,
                city,
                province,
                cli.config.as_deref(),
            ),
            DbCommands::Get { target } => cli::db::get(&target, cli.config.as_deref()),
            DbCommands::Import { file } => cli::db::import(&file, cli.config.as_deref()),
            DbCommands::List { limit } => {
                cli::db::list(limit, cli.format, cli.config.as_deref())
            }
            DbCommands::Delete { target } => cli::db::delete(&target, cli.config.as_deref()),
        },
        Commands::History(history_cmd) => match history_cmd {
            HistoryCommands::List { limit } => {
                cli::history::list(limit, cli.format, cli.config.as_deref())
            }
            HistoryCommands::Stats => cli::history::stats(cli.config.as_deref()),
            HistoryCommands::Clear { yes } => cli::history::clear(yes, cli.config.as_deref()),
        },
    }
}
