/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::{DeviceToken, Notification, Payload};
use anyhow::{anyhow, Context, Result};
use std::path::Path;

/// Decodes every hex token up front, so a bad one stops the run before anything is sent.
pub fn decode_device_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<DeviceToken>> {
    if tokens.is_empty() {
        return Err(anyhow!("no tokens"));
    }
    tokens
        .iter()
        .map(|token| {
            DeviceToken::from_hex(token.as_ref())
                .with_context(|| format!("Bad token: {}", token.as_ref()))
        })
        .collect()
}

/// A push file is either `{"payload": {...}}` or the notification document itself.
pub fn decode_push_file(data: &[u8]) -> Result<Payload> {
    let document = serde_json::from_slice::<serde_json::Value>(data)
        .context("Error parsing push file")?;

    let payload = match document {
        serde_json::Value::Object(mut object) => match object.remove("payload") {
            Some(payload) => payload,
            None => serde_json::Value::Object(object),
        },
        _ => return Err(anyhow!("Error parsing push file: expected a JSON object")),
    };

    Ok(Payload::Structured(payload))
}

pub fn read_push_file(path: &Path) -> Result<Payload> {
    let data = std::fs::read(path)
        .with_context(|| format!("Error loading push file {}", path.display()))?;
    decode_push_file(&data)
}

/// Payload for a CLI run: the push file when given, otherwise an alert with the text and badge.
pub fn build_payload(file: Option<&Path>, text: &str, badge: u32) -> Result<Payload> {
    match file {
        Some(path) => read_push_file(path),
        None if !text.is_empty() => Ok(Payload::structured(&Notification::alert(text, badge))?),
        None => Err(anyhow!("Nothing to send")),
    }
}
