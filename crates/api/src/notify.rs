// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Best-effort notifications for PIREP activity.
//!
//! Delivery happens after the transition has committed. A failing sink is
//! logged and otherwise ignored.

use thiserror::Error;
use tracing::{info, warn};
use va_career_domain::{Money, PilotId, PirepId, PirepStatus};

/// Something worth telling the outside world about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CareerNotification {
    /// A pilot filed a report.
    PirepFiled {
        /// The new report.
        pirep_id: PirepId,
        /// The filing pilot.
        pilot_id: PilotId,
        /// The pilot's callsign at filing time.
        callsign: String,
        /// The flight flown.
        flight_number: String,
        /// The claimed earnings.
        grand_total: Money,
    },
    /// A reviewer approved or rejected a report.
    PirepReviewed {
        /// The reviewed report.
        pirep_id: PirepId,
        /// The filing pilot.
        pilot_id: PilotId,
        /// The outcome.
        status: PirepStatus,
    },
}

/// Errors a sink may report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// The receiving end could not be reached or refused the message.
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Outbound channel for career notifications.
pub trait NotificationSink: Send + Sync {
    /// Delivers one notification.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails.
    fn notify(&self, notification: &CareerNotification) -> Result<(), NotificationError>;
}

/// Sink that writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: &CareerNotification) -> Result<(), NotificationError> {
        match notification {
            CareerNotification::PirepFiled {
                pirep_id,
                pilot_id,
                callsign,
                flight_number,
                grand_total,
            } => info!(
                pirep = %pirep_id,
                pilot = %pilot_id,
                callsign,
                flight_number,
                grand_total = %grand_total,
                "PIREP filed"
            ),
            CareerNotification::PirepReviewed {
                pirep_id,
                pilot_id,
                status,
            } => info!(pirep = %pirep_id, pilot = %pilot_id, status = %status, "PIREP reviewed"),
        }
        Ok(())
    }
}

/// Hands a notification to the sink, logging and swallowing any failure.
pub fn deliver(sink: &dyn NotificationSink, notification: &CareerNotification) {
    if let Err(err) = sink.notify(notification) {
        warn!(error = %err, ?notification, "Dropped career notification");
    }
}
