//! `restlink` command-line client.
//!
//! Sends one request (or `--repeat N` of them) through a configured
//! `Resource` and prints status, transport status and decoded payload.
//! Repeating a GET shows the conditional cache at work: the second call
//! reads `304` on the wire and `200` to the caller.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use restlink::config::{load_config, validate_config, ClientConfig, ConfigError};
use restlink::observability::logging;
use restlink::{Method, ResourceBuilder, Response, Shutdown};

#[derive(Parser)]
#[command(name = "restlink")]
#[command(about = "REST client with ETag revalidation and server failover", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server base URL; repeat for a pool. Replaces `servers` from the config.
    #[arg(short, long = "server")]
    servers: Vec<String>,

    /// GET, POST, PUT, PATCH or DELETE.
    verb: String,

    /// Path or URL merged onto the selected server.
    url: String,

    /// Request body.
    #[arg(short, long)]
    body: Option<String>,

    /// Number of times to send the request.
    #[arg(short, long, default_value_t = 1)]
    repeat: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if !cli.servers.is_empty() {
        config.servers = cli.servers.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability.log_level);

    let method: Method = cli.verb.parse()?;

    let resource = ResourceBuilder::from_config(&config)?.build();

    let shutdown = Arc::new(Shutdown::new());
    let signal = shutdown.trigger_on_ctrl_c();
    let tasks = resource.spawn_health_policy(&config.health, &shutdown);

    tracing::info!(
        servers = config.servers.len(),
        method = method.as_str(),
        url = %cli.url,
        "restlink starting"
    );

    let mut failed = false;
    for attempt in 1..=cli.repeat.max(1) {
        if shutdown.is_triggered() {
            break;
        }
        let body = cli.body.clone().map(String::into_bytes);
        match resource.call(method, &cli.url, body).await {
            Ok(response) => print_response(attempt, &response)?,
            Err(e) => {
                eprintln!("[{attempt}] error: {e}");
                failed = true;
            }
        }
    }

    shutdown.trigger();
    signal.abort();
    for task in tasks {
        let _ = task.await;
    }
    resource.save_cache_snapshot()?;

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn print_response(attempt: u32, response: &Response) -> Result<(), serde_json::Error> {
    println!(
        "[{attempt}] status {} (transport {}){}",
        response.status(),
        response.transport_status(),
        if response.from_cache() { " from cache" } else { "" }
    );
    match response.payload() {
        Some(payload) => println!("{}", serde_json::to_string_pretty(payload)?),
        None if !response.body().is_empty() => {
            println!("{}", String::from_utf8_lossy(response.body()))
        }
        None => {}
    }
    Ok(())
}
