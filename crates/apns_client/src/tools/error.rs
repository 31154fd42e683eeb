/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::outbound::types::ApnsErrorResponse;
use openssl::error::ErrorStack;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("failed to read certificate file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed PKCS#12 container: {0}")]
    Malformed(ErrorStack),
    #[error("failed to decode PKCS#12 container (wrong password?): {0}")]
    Decode(ErrorStack),
    #[error("PKCS#12 container has no private key")]
    MissingKey,
    #[error("PKCS#12 container has no certificate")]
    MissingCertificate,
    #[error("certificate verification failed: {0}")]
    Verification(String),
    #[error("failed to prepare trust store: {0}")]
    TrustStore(ErrorStack),
    #[error("failed to encode credential: {0}")]
    Encode(ErrorStack),
    #[error("failed to build TLS identity: {0}")]
    Identity(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("device token is not valid hex: {0}")]
    InvalidHex(String),
    #[error("device token must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error("failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid value for header {header}: {message}")]
    Header {
        header: &'static str,
        message: String,
    },
    #[error(transparent)]
    Certificate(#[from] CertificateError),
    #[error("failed to build https client: {0}")]
    Client(reqwest::Error),
    #[error("apns request failed: {0}")]
    Transport(reqwest::Error),
    #[error(transparent)]
    Rejected(#[from] ApnsErrorResponse),
}

impl PushError {
    /// The server's rejection, when the request reached APNs and was refused.
    pub fn rejection(&self) -> Option<&ApnsErrorResponse> {
        match self {
            PushError::Rejected(response) => Some(response),
            _ => None,
        }
    }
}
