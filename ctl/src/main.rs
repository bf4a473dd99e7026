use allerta_db::storage::mongodb::MongoDBStorage;
use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::commands::CreateUserParams;

mod commands;

#[derive(Parser)]
#[command(name = "allertactl", about = "Administrative tasks for an Allerta deployment")]
pub struct Args {
    #[clap(subcommand)]
    command: Command,

    #[clap(
        short = 'D',
        long,
        env = "ALLERTA_API_MONGODB_URI",
        default_value = "mongodb://localhost:27017/allerta"
    )]
    db_url: String,
}

#[derive(Clone, Subcommand)]
pub enum Command {
    /// Create a user directly in the database, e.g. the first operator.
    #[command(name = "create-user")]
    CreateUser(CreateUserParams),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let stg = MongoDBStorage::new(&args.db_url)
        .await
        .context("Failed to connect to MongoDB")?;

    match args.command {
        Command::CreateUser(params) => commands::create_user(&stg, params)
            .await
            .context("Failed to create user"),
    }
}
