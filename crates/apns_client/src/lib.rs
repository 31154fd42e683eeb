/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

//! Client for the Apple Push Notification service over HTTP/2.
//!
//! Load a PKCS#12 push certificate with [`tools::certificate::load_certificate`],
//! build an [`outbound::external::ApnsService`] for the sandbox or production
//! endpoint, and call `push` once per device token.

pub mod action {
    pub mod push;
}

pub mod common {
    pub mod types;
    pub mod utils;
}

pub mod environment;

pub mod outbound {
    pub mod external;
    pub mod types;
}

pub mod tools {
    pub mod certificate;
    pub mod error;
    pub mod logger;
    pub mod prometheus;
}

pub use common::types::{ApnsId, DeviceToken, Endpoint, Payload, PushOptions};
pub use outbound::{external::ApnsService, types::ApnsErrorResponse};
pub use tools::{
    certificate::{load_certificate, load_certificate_from_bytes, Credential},
    error::{CertificateError, PushError, TokenError},
};
