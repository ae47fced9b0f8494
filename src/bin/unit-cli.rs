use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "unit-cli")]
#[command(about = "Send requests to units on a running durable-unit host", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8787")]
    url: String,

    /// Unit name; the host derives the unit id from it.
    #[arg(short = 'n', long, default_value = "default")]
    unit: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the counter
    Get,
    /// Add to the counter
    Post {
        #[arg(default_value_t = 1, allow_negative_numbers = true)]
        increment: i64,
    },
    /// Clear the counter
    Delete,
    /// Send an arbitrary request to the unit
    Fetch {
        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
        /// Path inside the unit, e.g. /count
        path: String,
        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = format!("{}/{}", cli.url.trim_end_matches('/'), cli.unit);

    let res = match cli.command {
        Commands::Get => client.get(format!("{}/count", base)).send().await?,
        Commands::Post { increment } => {
            client
                .post(format!("{}/count", base))
                .json(&serde_json::json!({ "increment": increment }))
                .send()
                .await?
        }
        Commands::Delete => client.delete(format!("{}/count", base)).send().await?,
        Commands::Fetch { method, path, data } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let path = if path.starts_with('/') { path } else { format!("/{}", path) };
            let mut req = client.request(method, format!("{}{}", base, path));
            if let Some(data) = data {
                let body: Value = serde_json::from_str(&data)?;
                req = req.json(&body);
            }
            req.send().await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: unit returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
