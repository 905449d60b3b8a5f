use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use std::process::ExitCode;

use my_package::config::{AppSettings, CliArgs, SettingsError, load_app_settings};
use my_package::fetch::fetch;
use my_package::logging::setup_logging;
use my_package::process::process_data_util;

fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let settings = match load_app_settings(cli.env_file.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            report_settings_error(err);
            return ExitCode::FAILURE;
        }
    };

    if cli.print_settings {
        return match serde_json::to_string_pretty(&settings) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("failed to serialize settings: {err}");
                ExitCode::FAILURE
            }
        };
    }

    let _logging = setup_logging(&settings.core);
    settings.log_startup_summary();

    // Fetch failures are reported, not fatal.
    if let Err(err) = run(&settings) {
        tracing::error!(error = ?err, "unexpected error while fetching or processing data");
    }
    ExitCode::SUCCESS
}

fn run(settings: &AppSettings) -> Result<()> {
    let url = settings.fetch_url();
    let data = fetch(&url, settings.request_timeout())
        .with_context(|| format!("failed to fetch {url}"))?;

    if settings.mypackage.debug_mode {
        println!("Raw payload: {}", Value::Object(data.clone()));
    }

    let summary = process_data_util(&data);
    println!("Fetched data: {summary}");
    tracing::info!(summary = %summary, "run finished");
    Ok(())
}

fn report_settings_error(err: SettingsError) {
    match err {
        SettingsError::Validation(_) => {
            eprintln!("CRITICAL ERROR: Settings validation failed:");
            eprintln!("{}", err.to_json());
        }
        other => {
            eprintln!("CRITICAL ERROR: Failed to initialize settings: {other}");
            eprintln!("{:?}", anyhow::Error::new(other));
        }
    }
}
