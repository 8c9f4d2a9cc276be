//! Booking lifecycle rules.
//!
//! Status ids match the `booking_status` seed data (1 incomplete,
//! 2 scheduled, 3 cancelled, 4 completed). The transition table and the
//! duration rule live here, away from any database dependency, so the
//! repository layer and unit tests share one source of truth.

use crate::types::Timestamp;

/// State machine over raw booking status ids.
///
/// The ids are duplicated from the `db` crate's `BookingStatus` enum on
/// purpose: this crate has zero internal dependencies.
pub mod state_machine {
    /// Returns the set of valid target status ids reachable from `from_status`.
    ///
    /// Cancel is reachable from every status, including the terminal ones
    /// (re-cancelling a cancelled booking is a no-op transition, and a
    /// completed booking can still be voided without clearing its time and
    /// room data). Completed is reachable only from scheduled.
    pub fn valid_transitions(from_status: i16) -> &'static [i16] {
        match from_status {
            // Incomplete -> Scheduled (confirm), Cancelled
            1 => &[2, 3],
            // Scheduled -> Cancelled, Completed
            2 => &[3, 4],
            // Cancelled -> Cancelled (idempotent)
            3 => &[3],
            // Completed -> Cancelled
            4 => &[3],
            // Unknown status: no transitions allowed
            _ => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: i16, to: i16) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a state transition, returning a message for invalid ones.
    pub fn validate_transition(from: i16, to: i16) -> Result<(), String> {
        if can_transition(from, to) {
            Ok(())
        } else {
            let from_name = status_name(from);
            let to_name = status_name(to);
            Err(format!(
                "Invalid transition: {from_name} ({from}) -> {to_name} ({to})"
            ))
        }
    }

    /// Human-readable name for a status id (for error messages).
    fn status_name(id: i16) -> &'static str {
        match id {
            1 => "Incomplete",
            2 => "Scheduled",
            3 => "Cancelled",
            4 => "Completed",
            _ => "Unknown",
        }
    }
}

/// Minutes a confirmed booking occupies its room: the per-booking override
/// wins over the script estimate.
pub fn effective_minutes(duration_override: Option<i32>, estimated_minutes: i32) -> i32 {
    duration_override.unwrap_or(estimated_minutes)
}

/// End of the occupied window: `start_at + minutes`.
pub fn end_at(start_at: Timestamp, minutes: i32) -> Timestamp {
    start_at + chrono::Duration::minutes(i64::from(minutes))
}
