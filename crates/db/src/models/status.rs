//! Booking status ids mapping to the `booking_status` lookup table.

/// Status id type matching SMALLINT in the database.
pub type StatusId = i16;

/// Booking lifecycle status. Discriminants match the seed data.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Incomplete = 1,
    Scheduled = 2,
    Cancelled = 3,
    Completed = 4,
}

impl BookingStatus {
    /// Return the database status id.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Look up a status by its database id.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(BookingStatus::Incomplete),
            2 => Some(BookingStatus::Scheduled),
            3 => Some(BookingStatus::Cancelled),
            4 => Some(BookingStatus::Completed),
            _ => None,
        }
    }
}

impl From<BookingStatus> for StatusId {
    fn from(value: BookingStatus) -> Self {
        value as StatusId
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ids_match_seed_data() {
        assert_eq!(BookingStatus::Incomplete.id(), 1);
        assert_eq!(BookingStatus::Scheduled.id(), 2);
        assert_eq!(BookingStatus::Cancelled.id(), 3);
        assert_eq!(BookingStatus::Completed.id(), 4);
    }

    #[test]
    fn from_id_round_trips() {
        for status in [
            BookingStatus::Incomplete,
            BookingStatus::Scheduled,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert_eq!(BookingStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(BookingStatus::from_id(9), None);
    }
}
