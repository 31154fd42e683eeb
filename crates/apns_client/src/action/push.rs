/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    common::types::{ApnsId, DeviceToken, Payload, PushOptions},
    outbound::external::ApnsService,
    tools::error::PushError,
};
use serde::Deserialize;
use strum_macros::{Display, EnumString};
use tracing::*;

/// What to do with the remaining tokens once one push fails.
#[derive(Debug, Clone, Copy, Default, Deserialize, EnumString, Display, Eq, PartialEq)]
pub enum BatchPolicy {
    #[default]
    HaltOnError,
    ContinueOnError,
}

impl BatchPolicy {
    pub fn from_continue_flag(continue_on_error: bool) -> Self {
        if continue_on_error {
            BatchPolicy::ContinueOnError
        } else {
            BatchPolicy::HaltOnError
        }
    }
}

#[derive(Debug)]
pub struct PushOutcome {
    pub token: DeviceToken,
    pub result: Result<ApnsId, PushError>,
}

impl PushOutcome {
    pub fn is_delivered(&self) -> bool {
        self.result.is_ok()
    }
}

/// Pushes `payload` to each token in turn. Tokens after a failure are skipped
/// under [`BatchPolicy::HaltOnError`] and get no outcome.
pub async fn push_to_all(
    apns_service: &ApnsService,
    tokens: &[DeviceToken],
    payload: &Payload,
    options: Option<&PushOptions>,
    policy: BatchPolicy,
) -> Vec<PushOutcome> {
    let mut outcomes = Vec::with_capacity(tokens.len());

    for token in tokens {
        let result = apns_service.push(token, payload.to_owned(), options).await;

        match &result {
            Ok(apns_id) => info!(tag = "[PUSH]", token = %token, "Sent: {}", apns_id),
            Err(err) => error!(tag = "[PUSH]", token = %token, "Error: {}", err),
        }

        let failed = result.is_err();
        outcomes.push(PushOutcome {
            token: *token,
            result,
        });

        if failed && policy == BatchPolicy::HaltOnError {
            warn!(
                tag = "[PUSH]",
                skipped = tokens.len() - outcomes.len(),
                "Stopping after failed push"
            );
            break;
        }
    }

    outcomes
}
