/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    action::push::BatchPolicy,
    common::types::{Endpoint, PushOptions},
    outbound::external::ApnsService,
    tools::{certificate::load_certificate, error::PushError, logger::LoggerConfig},
};
use serde::Deserialize;
use std::{path::Path, time::Duration};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub certificate_path: String,
    pub certificate_password: String,
    pub production: bool,
    pub topic: Option<String>,
    pub low_priority: bool,
    pub continue_on_error: bool,
    pub request_timeout_seconds: Option<u64>,
    pub logger_cfg: LoggerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            certificate_path: "cert.p12".to_string(),
            certificate_password: String::new(),
            production: false,
            topic: None,
            low_priority: false,
            continue_on_error: false,
            request_timeout_seconds: None,
            logger_cfg: LoggerConfig::default(),
        }
    }
}

pub fn read_config(dhall_config_path: impl AsRef<Path>) -> Result<AppConfig, serde_dhall::Error> {
    serde_dhall::from_file(dhall_config_path).parse::<AppConfig>()
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub apns_service: ApnsService,
    pub push_options: PushOptions,
    pub batch_policy: BatchPolicy,
}

impl AppState {
    pub fn new(app_config: AppConfig) -> Result<AppState, PushError> {
        let credential = load_certificate(
            &app_config.certificate_path,
            &app_config.certificate_password,
        )?;

        let apns_service = ApnsService::with_timeout(
            &Endpoint::from_production_flag(app_config.production),
            &credential,
            app_config.request_timeout_seconds.map(Duration::from_secs),
        )?;

        Ok(AppState {
            apns_service,
            push_options: PushOptions {
                topic: app_config.topic,
                low_priority: app_config.low_priority,
                ..Default::default()
            },
            batch_policy: BatchPolicy::from_continue_flag(app_config.continue_on_error),
        })
    }
}
