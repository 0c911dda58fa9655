#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::{io::Write, process};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::{debug, error};
use tracing_subscriber::{
    prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use ::buddy::{
    assistant, config::AmadeusConfig, format_search, index_page, ingest, ingest::into_chunks,
    Amadeus, Config, FlightQuery, FlightSearch, History,
};

const DEFAULT_URL: &str =
    "https://phet-dev.colorado.edu/html/build-an-atom/0.0.0-3/simple-text-only-test-page.html";
const EXIT_COMMAND: &str = "exit";
const ASSISTANT_LABEL: &str = "buddy:";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Chat about a web page, or ask for "flight options".
    Chat {
        #[arg(default_value = DEFAULT_URL)]
        url: String,
    },
    /// Search flight offers directly.
    Flights {
        origin: String,
        destination: String,
        departure_date: String,
    },
    /// Fetch a page and print its chunks as JSON.
    Ingest { url: String },
    /// Print the chunks of a page most relevant to a query.
    Query { url: String, query: String },
    /// Split a local text file into chunks.
    Split { path: String },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "cli=info,buddy=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run(cli.command).await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Chat { url } => {
            let config = Config::from_env()?;
            let index = index_page(&url, &config).await?;
            debug!("Indexed {} chunks from {url}", index.len());

            chat(&config, assistant(&config, index)).await?;
        }
        Commands::Flights {
            origin,
            destination,
            departure_date,
        } => {
            let amadeus = Amadeus::new(AmadeusConfig::from_env()?);
            let search = amadeus
                .search(&FlightQuery::new(origin, destination, departure_date))
                .await;

            println!("{}", format_search(&search));
        }
        Commands::Ingest { url } => {
            let chunks = ingest(&url, &buddy::config::IngestConfig::from_env()).await?;

            println!("{}", serde_json::to_string_pretty(&chunks)?);
        }
        Commands::Query { url, query } => {
            let config = Config::from_env()?;
            let index = index_page(&url, &config).await?;
            let results = index.search(&query, config.chat.top_k).await?;

            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::Split { path } => {
            let text = std::fs::read_to_string(&path)?;

            println!("{}", serde_json::to_string_pretty(&into_chunks(&path, &text))?);
        }
    }

    Ok(())
}

async fn chat(config: &Config, assistant: buddy::Assistant) -> Result<()> {
    let mut history = History::new(config.chat.history_max_exchanges);
    let mut lines = BufReader::new(io::stdin()).lines();

    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(input) = lines.next_line().await? else {
            break;
        };
        let input = input.trim();

        if input.eq_ignore_ascii_case(EXIT_COMMAND) {
            break;
        }
        if input.is_empty() {
            continue;
        }

        match assistant.respond(input, &history).await {
            Ok(response) => {
                println!("{ASSISTANT_LABEL} {response}");
                history.push_exchange(input, response);
            }
            Err(err) => {
                error!("Failed to answer: {err:#}");
                println!("{ASSISTANT_LABEL} Sorry, something went wrong. Please try again.");
            }
        }
    }

    Ok(())
}
