/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::fixtures::*;
use apns_client::{
    action::push::BatchPolicy,
    environment::{read_config, AppConfig, AppState},
    CertificateError, PushError,
};

#[test]
fn reads_dev_dhall_config() -> anyhow::Result<()> {
    let dhall_config_path = "../../dhall-configs/dev/apns_client.dhall".to_string();
    let app_config = read_config(dhall_config_path)?;

    assert_eq!(app_config.certificate_path, "./cert.p12");
    assert!(!app_config.production);
    assert_eq!(app_config.topic, None);
    assert_eq!(app_config.request_timeout_seconds, Some(30));
    assert_eq!(app_config.logger_cfg.level, "info");

    Ok(())
}

#[test]
fn app_state_builds_service_from_config() -> anyhow::Result<()> {
    let (_, p12) = self_signed_pkcs12("Apple Production IOS Push Services: com.example.app")?;
    let dir = tempfile::tempdir()?;
    let certificate_path = dir.path().join("cert.p12");
    std::fs::write(&certificate_path, p12)?;

    let app_state = AppState::new(AppConfig {
        certificate_path: certificate_path.display().to_string(),
        certificate_password: PASSWORD.to_string(),
        production: true,
        topic: Some("com.example.app".to_string()),
        continue_on_error: true,
        ..Default::default()
    })?;

    assert_eq!(
        app_state.apns_service.url(),
        "https://api.push.apple.com/3/device/"
    );
    assert_eq!(app_state.push_options.topic.as_deref(), Some("com.example.app"));
    assert!(!app_state.push_options.low_priority);
    assert_eq!(app_state.batch_policy, BatchPolicy::ContinueOnError);

    Ok(())
}

#[test]
fn app_state_surfaces_missing_certificate() {
    let result = AppState::new(AppConfig {
        certificate_path: "/nonexistent/cert.p12".to_string(),
        ..Default::default()
    });

    assert!(matches!(
        result,
        Err(PushError::Certificate(CertificateError::Read { .. }))
    ));
}
