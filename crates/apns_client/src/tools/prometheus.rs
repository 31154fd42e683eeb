/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Once;

pub static REGISTRY: once_cell::sync::Lazy<Registry> = once_cell::sync::Lazy::new(Registry::new);

pub static CALL_APNS: once_cell::sync::Lazy<HistogramVec> = once_cell::sync::Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("apns_request_duration", "Outgoing APNs requests"),
        &["status"],
    )
    .expect("Failed to create call APNs metrics")
});

pub static TOTAL_NOTIFICATIONS: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        IntCounter::new("apns_total_notifications", "Total Notifications")
            .expect("Failed to create total notifications metrics")
    });

pub static DELIVERED_NOTIFICATIONS: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        IntCounter::new("apns_delivered_notifications", "Delivered Notifications")
            .expect("Failed to create delivered notifications metrics")
    });

pub static REJECTED_NOTIFICATIONS: once_cell::sync::Lazy<IntCounterVec> =
    once_cell::sync::Lazy::new(|| {
        IntCounterVec::new(
            Opts::new("apns_rejected_notifications", "Rejected Notifications"),
            &["reason"],
        )
        .expect("Failed to create rejected notifications metrics")
    });

#[macro_export]
macro_rules! call_apns {
    ($status:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        $crate::tools::prometheus::CALL_APNS
            .with_label_values(&[$status])
            .observe(duration);
    };
}

static REGISTER: Once = Once::new();

pub fn register_custom_metrics() {
    REGISTER.call_once(|| {
        REGISTRY
            .register(Box::new(CALL_APNS.to_owned()))
            .expect("`CALL_APNS` collector couldn't be registered");

        REGISTRY
            .register(Box::new(TOTAL_NOTIFICATIONS.to_owned()))
            .expect("`TOTAL_NOTIFICATIONS` collector couldn't be registered");

        REGISTRY
            .register(Box::new(DELIVERED_NOTIFICATIONS.to_owned()))
            .expect("`DELIVERED_NOTIFICATIONS` collector couldn't be registered");

        REGISTRY
            .register(Box::new(REJECTED_NOTIFICATIONS.to_owned()))
            .expect("`REJECTED_NOTIFICATIONS` collector couldn't be registered");
    });
}

/// Text exposition of every push metric.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    register_custom_metrics();

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
