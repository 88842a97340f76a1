use std::fmt;

use serde::Serialize;

use crate::models::bookings::BookingStatus;

/// Actions a host or guest can take against a booking. Drives which controls
/// the dashboard enables, so it has to be a pure lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingAction {
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: BookingStatus,
    pub to: BookingStatus,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal booking transition: {} -> {}", self.from, self.to)
    }
}

impl std::error::Error for InvalidTransition {}

pub struct BookingStatusPolicy;

impl BookingStatusPolicy {
    /// Actions legal from a given status.
    ///
    /// `cancelled` is terminal and `unknown` marks malformed stored data;
    /// neither permits anything.
    pub fn allowed_actions(status: BookingStatus) -> &'static [BookingAction] {
        match status {
            BookingStatus::Pending => &[BookingAction::Confirm, BookingAction::Cancel],
            BookingStatus::Confirmed => &[BookingAction::Cancel],
            BookingStatus::Cancelled | BookingStatus::Unknown => &[],
        }
    }

    pub fn can_transition(from: BookingStatus, to: BookingStatus) -> bool {
        matches!(
            (from, to),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }

    /// Gate a status mutation before it touches storage. This policy only
    /// describes legal transitions; the actual write happens in the booking
    /// routes.
    pub fn check_transition(
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<(), InvalidTransition> {
        if Self::can_transition(from, to) {
            Ok(())
        } else {
            Err(InvalidTransition { from, to })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Unknown,
    ];

    #[test]
    fn pending_allows_confirm_and_cancel() {
        let actions = BookingStatusPolicy::allowed_actions(BookingStatus::Pending);
        assert!(actions.contains(&BookingAction::Confirm));
        assert!(actions.contains(&BookingAction::Cancel));
    }

    #[test]
    fn confirmed_allows_cancel_only() {
        let actions = BookingStatusPolicy::allowed_actions(BookingStatus::Confirmed);
        assert!(!actions.contains(&BookingAction::Confirm));
        assert!(actions.contains(&BookingAction::Cancel));
    }

    #[test]
    fn cancelled_and_unknown_allow_nothing() {
        assert!(BookingStatusPolicy::allowed_actions(BookingStatus::Cancelled).is_empty());
        assert!(BookingStatusPolicy::allowed_actions(BookingStatus::Unknown).is_empty());
    }

    #[test]
    fn cancelled_is_terminal() {
        for to in ALL {
            assert!(!BookingStatusPolicy::can_transition(BookingStatus::Cancelled, to));
        }
    }

    #[test]
    fn no_transition_leaves_unknown() {
        for to in ALL {
            assert!(!BookingStatusPolicy::can_transition(BookingStatus::Unknown, to));
        }
    }

    #[test]
    fn legal_transitions_exactly() {
        let mut legal = Vec::new();
        for from in ALL {
            for to in ALL {
                if BookingStatusPolicy::can_transition(from, to) {
                    legal.push((from, to));
                }
            }
        }
        assert_eq!(
            legal,
            vec![
                (BookingStatus::Pending, BookingStatus::Confirmed),
                (BookingStatus::Pending, BookingStatus::Cancelled),
                (BookingStatus::Confirmed, BookingStatus::Cancelled),
            ]
        );
    }

    #[test]
    fn check_transition_reports_both_ends() {
        let err = BookingStatusPolicy::check_transition(
            BookingStatus::Cancelled,
            BookingStatus::Confirmed,
        )
        .unwrap_err();
        assert_eq!(err.from, BookingStatus::Cancelled);
        assert_eq!(err.to, BookingStatus::Confirmed);
        assert_eq!(
            err.to_string(),
            "illegal booking transition: cancelled -> confirmed"
        );
    }
}
