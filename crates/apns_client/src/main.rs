/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use anyhow::{anyhow, Context, Result};
use apns_client::{
    action::push::{push_to_all, BatchPolicy},
    common::utils::{build_payload, decode_device_tokens},
    environment::{read_config, AppConfig, AppState},
    tools::{logger::setup_tracing, prometheus::gather_metrics},
};
use clap::Parser;
use std::{env::var, path::PathBuf};
use tracing::*;

const SAMPLE_FILE: &str = r#"Sample JSON file:
  {
    "payload": {
      "aps": {
        "alert": "message",
        "badge": 0
      }
    }
  }"#;

/// Send Apple Push notification
#[derive(Parser, Debug)]
#[command(name = "apns-push", after_help = SAMPLE_FILE)]
struct Cli {
    /// Push certificate (PKCS#12) [default: cert.p12]
    #[arg(short = 'c', long = "certificate", value_name = "FILE")]
    certificate: Option<PathBuf>,

    /// Certificate password
    #[arg(short = 'p', long)]
    password: Option<String>,

    /// Use production service, `--production=false` forces the sandbox
    #[arg(
        short = 'a',
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    production: Option<bool>,

    /// JSON file with push message
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    file: Option<PathBuf>,

    /// Message text
    #[arg(short = 't', long = "text", default_value = "Hello!")]
    text: String,

    /// Badge number
    #[arg(short = 'b', long, default_value_t = 0)]
    badge: u32,

    /// Topic for certificates covering several apps
    #[arg(long)]
    topic: Option<String>,

    /// Send with priority 5, `--low-priority=false` overrides the config
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    low_priority: Option<bool>,

    /// Keep sending to the remaining tokens after a failure, `=false` overrides the config
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    continue_on_error: Option<bool>,

    /// Dhall configuration file, DHALL_CONFIG is used when unset
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print metrics once done
    #[arg(long)]
    metrics: bool,

    /// Hex device tokens
    #[arg(required = true, value_name = "TOKEN")]
    tokens: Vec<String>,
}

impl Cli {
    fn app_config(&self) -> Result<AppConfig> {
        let dhall_config_path = self
            .config
            .clone()
            .or_else(|| var("DHALL_CONFIG").ok().map(PathBuf::from));

        let app_config = match dhall_config_path {
            Some(path) => read_config(&path)
                .with_context(|| format!("Error loading config {}", path.display()))?,
            None => AppConfig::default(),
        };

        Ok(self.override_config(app_config))
    }

    /// Flags given on the command line win over the config file, in both directions.
    fn override_config(&self, mut app_config: AppConfig) -> AppConfig {
        if let Some(certificate) = &self.certificate {
            app_config.certificate_path = certificate.display().to_string();
        }
        if let Some(password) = &self.password {
            app_config.certificate_password = password.to_owned();
        }
        if self.topic.is_some() {
            app_config.topic = self.topic.to_owned();
        }
        if let Some(production) = self.production {
            app_config.production = production;
        }
        if let Some(low_priority) = self.low_priority {
            app_config.low_priority = low_priority;
        }
        if let Some(continue_on_error) = self.continue_on_error {
            app_config.continue_on_error = continue_on_error;
        }

        app_config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let app_config = cli.app_config()?;

    let _guard = setup_tracing(app_config.logger_cfg.to_owned());

    let tokens = decode_device_tokens(&cli.tokens)?;
    let payload = build_payload(cli.file.as_deref(), &cli.text, cli.badge)?;

    let app_state = AppState::new(app_config).context("Error loading certificate")?;
    info!(
        tag = "[PUSH]",
        url = app_state.apns_service.url(),
        tokens = tokens.len(),
        policy = %app_state.batch_policy,
        "Sending"
    );

    let outcomes = push_to_all(
        &app_state.apns_service,
        &tokens,
        &payload,
        Some(&app_state.push_options),
        app_state.batch_policy,
    )
    .await;

    if cli.metrics {
        println!("{}", gather_metrics()?);
    }

    let failed = outcomes.iter().filter(|outcome| !outcome.is_delivered()).count();
    if failed > 0 {
        if app_state.batch_policy == BatchPolicy::HaltOnError {
            warn!(tag = "[PUSH]", "Stopped at the first failed token");
        }
        return Err(anyhow!("{failed} notification(s) failed"));
    }

    info!(tag = "[PUSH]", "Complete!");
    Ok(())
}
