/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use super::types::ApnsErrorResponse;
use crate::{
    call_apns,
    common::types::{ApnsId, DeviceToken, Endpoint, Payload, PushOptions, APNS_ID},
    tools::{
        certificate::Credential,
        error::PushError,
        prometheus::{DELIVERED_NOTIFICATIONS, REJECTED_NOTIFICATIONS, TOTAL_NOTIFICATIONS},
    },
};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Response, StatusCode,
};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Sends notifications to one APNs environment over a certificate-authenticated client.
///
/// Cloning is cheap and clones share the connection pool.
#[derive(Clone, Debug)]
pub struct ApnsService {
    url: String,
    client: Client,
}

impl ApnsService {
    pub fn new(endpoint: &Endpoint, credential: &Credential) -> Result<Self, PushError> {
        Self::with_timeout(endpoint, credential, None)
    }

    /// Like [`ApnsService::new`], with a deadline applied to every request.
    pub fn with_timeout(
        endpoint: &Endpoint,
        credential: &Credential,
        timeout: Option<Duration>,
    ) -> Result<Self, PushError> {
        let mut builder = Client::builder()
            .use_rustls_tls()
            .identity(credential.identity()?);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(PushError::Client)?;

        Ok(Self {
            url: format!("{}/3/device/", endpoint.base_url().trim_end_matches('/')),
            client,
        })
    }

    /// Device endpoint prefix; the hex token is appended per push.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Serializes `payload` as JSON and pushes it.
    pub async fn push_json<T: Serialize + ?Sized>(
        &self,
        token: &DeviceToken,
        payload: &T,
        options: Option<&PushOptions>,
    ) -> Result<ApnsId, PushError> {
        let payload = Payload::structured(payload)?;
        self.push(token, payload, options).await
    }

    /// Delivers one notification and returns the id APNs assigned to it.
    ///
    /// Any status other than 200 comes back as [`PushError::Rejected`], with the
    /// status kept even if the body could not be decoded.
    pub async fn push(
        &self,
        token: &DeviceToken,
        payload: impl Into<Payload>,
        options: Option<&PushOptions>,
    ) -> Result<ApnsId, PushError> {
        let body = payload.into().into_body()?;
        let header_map = request_headers(options)?;
        let url = format!("{}{}", self.url, token.to_hex());

        let start_time = Instant::now();
        TOTAL_NOTIFICATIONS.inc();

        let resp = self
            .client
            .post(url.as_str())
            .headers(header_map.to_owned())
            .body(body)
            .send()
            .await;

        match resp {
            Ok(resp) => {
                let status = resp.status();
                call_apns!(status.as_str(), start_time);

                if status == StatusCode::OK {
                    let apns_id = resp
                        .headers()
                        .get(APNS_ID)
                        .and_then(|id| id.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    drain(resp).await;

                    info!(tag = "[OUTGOING APNS]", request_method = "POST", request_url = %url, request_headers = format!("{:?}", header_map), apns_id = %apns_id, latency = format!("{:?}ms", start_time.elapsed().as_millis()));
                    DELIVERED_NOTIFICATIONS.inc();

                    Ok(ApnsId(apns_id))
                } else {
                    let response = decode_rejection(resp).await;

                    error!(tag = "[OUTGOING APNS - ERROR]", request_method = "POST", request_url = %url, request_headers = format!("{:?}", header_map), status = response.code, reason = %response.reason, latency = format!("{:?}ms", start_time.elapsed().as_millis()));
                    REJECTED_NOTIFICATIONS
                        .with_label_values(&[rejection_label(&response).as_str()])
                        .inc();

                    Err(PushError::Rejected(response))
                }
            }
            Err(err) => {
                call_apns!("UNKNOWN", start_time);
                error!(tag = "[OUTGOING APNS - ERROR]", request_method = "POST", request_url = %url, request_headers = format!("{:?}", header_map), error = format!("{:?}", err), latency = format!("{:?}ms", start_time.elapsed().as_millis()));

                Err(PushError::Transport(err))
            }
        }
    }
}

fn request_headers(options: Option<&PushOptions>) -> Result<HeaderMap, PushError> {
    let mut header_map = HeaderMap::new();
    header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (header, value) in options.map(PushOptions::to_headers).unwrap_or_default() {
        let header_value = HeaderValue::from_str(&value).map_err(|err| PushError::Header {
            header,
            message: err.to_string(),
        })?;
        header_map.insert(header, header_value);
    }

    Ok(header_map)
}

/// Reads the rejection body. A body that is missing or not the documented
/// JSON still yields the response status, with an empty reason.
async fn decode_rejection(resp: Response) -> ApnsErrorResponse {
    let code = resp.status().as_u16();

    let mut response = match resp.bytes().await {
        Ok(body) => serde_json::from_slice::<ApnsErrorResponse>(&body).unwrap_or_else(|err| {
            warn!(tag = "[OUTGOING APNS]", status = code, error = %err, "Undecodable error body");
            ApnsErrorResponse::default()
        }),
        Err(err) => {
            warn!(tag = "[OUTGOING APNS]", status = code, error = %err, "Failed to read error body");
            ApnsErrorResponse::default()
        }
    };
    response.code = code;

    response
}

/// Metric label for a rejection. Undocumented reasons share one label.
fn rejection_label(response: &ApnsErrorResponse) -> String {
    response
        .reason_kind()
        .map(|reason| reason.to_string())
        .unwrap_or_else(|| "Other".to_string())
}

/// Reads the body to the end so the connection can go back to the pool.
async fn drain(resp: Response) {
    if let Err(err) = resp.bytes().await {
        warn!(tag = "[OUTGOING APNS]", error = %err, "Failed to drain response body");
    }
}
