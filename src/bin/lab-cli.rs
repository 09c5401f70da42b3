use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "lab-cli")]
#[command(about = "Command-line client for the API lab engine", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:7878")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Engine liveness
    Health,
    /// List registered sources with availability
    Sources,
    /// Show the current source
    Current,
    /// Switch the current source
    Use { key: String },
    /// Route a request through the current source
    Send {
        method: String,
        url: String,
        /// `Name: value`, repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        /// JSON body
        #[arg(short, long)]
        body: Option<String>,
        /// Task id for solution and attempt notifications
        #[arg(short, long)]
        task: Option<String>,
    },
    /// Verify a request JSON file against a solution descriptor file
    CheckRequest { descriptor: PathBuf, request: PathBuf },
    /// Verify a response JSON file, optionally against an expected-response descriptor
    CheckResponse {
        response: PathBuf,
        #[arg(short, long)]
        descriptor: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", cli.url)).send().await?,
        Commands::Sources => client.get(format!("{}/sources", cli.url)).send().await?,
        Commands::Current => client.get(format!("{}/sources/current", cli.url)).send().await?,
        Commands::Use { key } => {
            client
                .put(format!("{}/sources/current", cli.url))
                .json(&json!({ "key": key }))
                .send()
                .await?
        }
        Commands::Send {
            method,
            url,
            headers,
            body,
            task,
        } => {
            let body = body.map(|b| serde_json::from_str::<Value>(&b)).transpose()?;
            let request = json!({
                "method": method.to_uppercase(),
                "url": url,
                "headers": parse_headers(&headers)?,
                "body": body,
            });
            client
                .post(format!("{}/route", cli.url))
                .json(&json!({ "taskId": task, "request": request }))
                .send()
                .await?
        }
        Commands::CheckRequest { descriptor, request } => {
            client
                .post(format!("{}/check/request", cli.url))
                .json(&json!({
                    "descriptor": read_json(&descriptor)?,
                    "request": read_json(&request)?,
                }))
                .send()
                .await?
        }
        Commands::CheckResponse { response, descriptor } => {
            let descriptor = descriptor.as_deref().map(read_json).transpose()?;
            client
                .post(format!("{}/check/response", cli.url))
                .json(&json!({
                    "descriptor": descriptor,
                    "response": read_json(&response)?,
                }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

fn parse_headers(raw: &[String]) -> Result<Value, Box<dyn std::error::Error>> {
    let mut headers = serde_json::Map::new();
    for header in raw {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("header must look like `Name: value`, got `{}`", header))?;
        headers.insert(name.trim().to_string(), Value::String(value.trim().to_string()));
    }
    Ok(Value::Object(headers))
}

fn read_json(path: &std::path::Path) -> Result<Value, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: lab API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
