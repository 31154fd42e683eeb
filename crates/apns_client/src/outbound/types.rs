/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use chrono::{DateTime, TimeZone, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// A rejected push: the HTTP status plus the decoded `{"reason", "timestamp"}` body.
#[derive(Deserialize, Serialize, Clone, Debug, Default, Eq, PartialEq, Error)]
#[error("[{code}] {reason}")]
pub struct ApnsErrorResponse {
    #[serde(skip)]
    pub code: u16,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub timestamp: i64,
}

impl ApnsErrorResponse {
    pub fn status(&self) -> u16 {
        self.code
    }

    pub fn status_text(&self) -> Option<&'static str> {
        StatusCode::from_u16(self.code)
            .ok()
            .and_then(|status| status.canonical_reason())
    }

    /// When APNs says the failure happened. Out-of-range timestamps map to the Unix epoch.
    pub fn time(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.timestamp, 0)
            .single()
            .unwrap_or_default()
    }

    pub fn reason_kind(&self) -> Option<ApnsReason> {
        ApnsReason::from_str(&self.reason).ok()
    }
}

/// Reason strings documented for APNs error responses.
#[derive(Debug, Clone, Copy, EnumString, Display, Eq, Hash, PartialEq)]
pub enum ApnsReason {
    BadCollapseId,
    BadDeviceToken,
    BadExpirationDate,
    BadMessageId,
    BadPriority,
    BadTopic,
    DeviceTokenNotForTopic,
    DuplicateHeaders,
    IdleTimeout,
    InvalidPushType,
    MissingDeviceToken,
    MissingTopic,
    PayloadEmpty,
    TopicDisallowed,
    BadCertificate,
    BadCertificateEnvironment,
    ExpiredProviderToken,
    Forbidden,
    InvalidProviderToken,
    MissingProviderToken,
    BadPath,
    MethodNotAllowed,
    Unregistered,
    PayloadTooLarge,
    TooManyProviderTokenUpdates,
    TooManyRequests,
    InternalServerError,
    ServiceUnavailable,
    Shutdown,
}
