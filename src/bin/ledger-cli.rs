use std::time::Duration;

use clap::{Parser, Subcommand};
use sdk_rust::LedgerClient;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "ledger-cli")]
#[command(about = "Inspect and call a route-ledger service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Path the service publishes its API document on
    #[arg(long, default_value = "/openapi.json")]
    spec_path: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the API document
    Spec,
    /// List documented operations
    Routes,
    /// Call an endpoint
    Call {
        /// HTTP method (GET, POST, ...)
        method: String,
        /// Concrete path, e.g. /pets/fluffy
        path: String,
        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .build()?;
    let client = LedgerClient::with_client(http, &cli.url).spec_path(&cli.spec_path);

    match cli.command {
        Commands::Spec => {
            let document = client.fetch_document().await?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Commands::Routes => {
            for (method, path) in client.list_operations().await? {
                println!("{:<7} {}", method, path);
            }
        }
        Commands::Call { method, path, data } => {
            let body: Option<Value> = data.as_deref().map(serde_json::from_str).transpose()?;
            let response = client.invoke(&method, &path, body.as_ref()).await?;
            if !response.is_success() {
                eprintln!("Error: service returned status {}", response.status);
            }
            println!("{}", serde_json::to_string_pretty(&response.body)?);
        }
    }

    Ok(())
}
