/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::tools::error::TokenError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Sandbox APNs host.
pub const DEVELOPMENT: &str = "https://api.development.push.apple.com";
/// Production APNs host.
pub const PRODUCTION: &str = "https://api.push.apple.com";

pub const DEVICE_TOKEN_LENGTH: usize = 32;

pub const APNS_ID: &str = "apns-id";
pub const APNS_EXPIRATION: &str = "apns-expiration";
pub const APNS_PRIORITY: &str = "apns-priority";
pub const APNS_TOPIC: &str = "apns-topic";

const LOW_PRIORITY: &str = "5";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Sandbox,
    Production,
    /// Any other base url, e.g. a local mock or an egress proxy.
    Custom(String),
}

impl Endpoint {
    pub fn from_production_flag(production: bool) -> Self {
        if production {
            Endpoint::Production
        } else {
            Endpoint::Sandbox
        }
    }

    pub fn base_url(&self) -> &str {
        match self {
            Endpoint::Sandbox => DEVELOPMENT,
            Endpoint::Production => PRODUCTION,
            Endpoint::Custom(url) => url.as_str(),
        }
    }
}

/// Binary device token issued by the OS for one app installation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DeviceToken([u8; DEVICE_TOKEN_LENGTH]);

impl DeviceToken {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TokenError> {
        let token: [u8; DEVICE_TOKEN_LENGTH] =
            bytes.try_into().map_err(|_| TokenError::InvalidLength {
                expected: DEVICE_TOKEN_LENGTH,
                actual: bytes.len(),
            })?;
        Ok(Self(token))
    }

    pub fn from_hex(token: &str) -> Result<Self, TokenError> {
        let bytes = hex::decode(token).map_err(|err| TokenError::InvalidHex(err.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for DeviceToken {
    type Err = TokenError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::from_hex(token)
    }
}

impl fmt::Display for DeviceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Message identifier, either assigned by APNs or chosen by the caller.
#[derive(Deserialize, Serialize, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ApnsId(pub String);

impl ApnsId {
    /// Canonical upper-case UUID, the form APNs itself hands out.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().hyphenated().to_string().to_uppercase())
    }

    pub fn inner(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApnsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ApnsId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Optional delivery settings. Every unset field leaves the server default in place.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PushOptions {
    pub id: Option<ApnsId>,
    /// Deliver until this instant. The Unix epoch means a single attempt with no storing.
    pub expiration: Option<DateTime<Utc>>,
    /// Priority 5. When false no priority header is sent and APNs uses 10.
    pub low_priority: bool,
    pub topic: Option<String>,
}

impl PushOptions {
    pub fn with_id(mut self, id: ApnsId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn with_low_priority(mut self) -> Self {
        self.low_priority = true;
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Request headers for the options that are actually set.
    pub fn to_headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = Vec::new();
        if let Some(id) = self.id.as_ref().filter(|id| !id.inner().is_empty()) {
            headers.push((APNS_ID, id.inner().to_string()));
        }
        if let Some(expiration) = self.expiration {
            headers.push((APNS_EXPIRATION, expiration.timestamp().to_string()));
        }
        if self.low_priority {
            headers.push((APNS_PRIORITY, LOW_PRIORITY.to_string()));
        }
        if let Some(topic) = self.topic.as_ref().filter(|topic| !topic.is_empty()) {
            headers.push((APNS_TOPIC, topic.to_string()));
        }
        headers
    }
}

/// Notification body, either already encoded or still to be encoded as JSON.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    PreEncoded(Vec<u8>),
    Structured(serde_json::Value),
}

impl Payload {
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Payload::Structured)
    }

    pub fn into_body(self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Payload::PreEncoded(bytes) => Ok(bytes),
            Payload::Structured(value) => serde_json::to_vec(&value),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::PreEncoded(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::PreEncoded(bytes.to_vec())
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::Structured(value)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Alert {
    Text(String),
    Fields(AlertFields),
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct AlertFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Aps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(
        rename = "content-available",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_available: Option<u8>,
}

/// The conventional `{"aps": {...}, ...custom}` notification document.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Notification {
    pub aps: Aps,
    #[serde(flatten)]
    pub custom: serde_json::Map<String, serde_json::Value>,
}

impl Notification {
    pub fn alert(text: impl Into<String>, badge: u32) -> Self {
        Self {
            aps: Aps {
                alert: Some(Alert::Text(text.into())),
                badge: Some(badge),
                ..Default::default()
            },
            custom: serde_json::Map::new(),
        }
    }

    pub fn with_custom(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.custom.insert(key.into(), value);
        self
    }
}
