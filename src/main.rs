use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use apicmd::ApiConfig;
use apicmd::cli::Cli;

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays pipeable JSON
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "apicmd=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ApiConfig::new(cli.url.as_str())?.with_cache(cli.cache_config());
    config.validate()?;

    let mut command = config.command("", cli.method);
    for (key, value) in cli.typed_params() {
        command.set_param(key, value);
    }

    let uri = command.request_uri();
    command
        .execute()
        .await
        .with_context(|| format!("{} {} failed", cli.method, uri))?;

    let output = match &cli.field {
        Some(field) => command
            .get_data(field)
            .ok_or_else(|| anyhow!("field '{}' not present in response", field))?,
        None => command.data(),
    };

    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}
