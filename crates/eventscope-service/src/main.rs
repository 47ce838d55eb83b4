//! eventscope CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use eventscope_core::{CustomerEvent, TracingConfig, TracingOutputFormat, init_tracing, time};
use eventscope_providers::{ProviderError, ProviderResult};
use eventscope_service::cli::{Cli, Command};
use eventscope_service::{CallbackParams, EventScope, ServiceConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let format = if cli.json_logs {
        TracingOutputFormat::Json
    } else {
        TracingOutputFormat::Compact
    };
    if let Err(e) = init_tracing(
        TracingConfig::default()
            .with_level(level)
            .with_format(format),
    ) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ProviderResult<()> {
    let config = ServiceConfig::from_env(&cli.data_dir);
    let scope = EventScope::new(&config)?;

    match cli.command {
        Command::Login { service } => {
            println!("{}", scope.start_login(&service)?);
        }
        Command::Callback {
            service,
            code,
            error,
            error_description,
        } => {
            let params = CallbackParams {
                code,
                error,
                error_description,
            };
            let record = scope.handle_callback(&service, params).await?;
            match record.expires_in() {
                Some(secs) => println!("{service}: authorized, token expires in {secs}s"),
                None => println!("{service}: authorized"),
            }
        }
        Command::Status { service } => {
            let names: Vec<String> = match service {
                Some(service) => vec![service],
                None => scope.service_names().iter().map(|s| s.to_string()).collect(),
            };
            for name in names {
                let status = scope.auth_status(&name)?;
                let rendered = serde_json::to_string(&status).map_err(|e| {
                    ProviderError::internal(format!("failed to render status: {e}"))
                })?;
                println!("{name}: {rendered}");
            }
        }
        Command::Logout { service } => {
            if scope.logout(&service)? {
                println!("{service}: logged out");
            } else {
                println!("{service}: no stored grant");
            }
        }
        Command::Find {
            service,
            location,
            category,
            query,
            start,
            end,
        } => {
            let mut event = CustomerEvent::new(&location, &category);
            if let Some(query) = query {
                event = event.with_query(query);
            }
            if let Some(ref raw) = start {
                let instant = time::parse_instant(raw).ok_or_else(|| {
                    ProviderError::bad_request(format!("unrecognized start time: {raw}"))
                })?;
                event = event.with_start(instant);
            }
            if let Some(ref raw) = end {
                let instant = time::parse_instant(raw).ok_or_else(|| {
                    ProviderError::bad_request(format!("unrecognized end time: {raw}"))
                })?;
                event = event.with_end(instant);
            }

            let events = scope.find_related_events(&service, &event).await?;
            let rendered = serde_json::to_string_pretty(&events)
                .map_err(|e| ProviderError::internal(format!("failed to render events: {e}")))?;
            println!("{rendered}");
        }
    }

    Ok(())
}
