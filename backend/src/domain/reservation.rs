//! Reservations: a room booked by a user over a half-open time window.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

pub use super::ids::ReservationId;
use super::{RoomId, UserId};

/// Error raised when a window does not start strictly before it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("La date de début doit précéder la date de fin")]
pub struct InvalidTimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Half-open interval `[start, end)` with `start < end`.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use roombook::domain::TimeWindow;
///
/// let start = Utc.with_ymd_and_hms(2026, 2, 1, 10, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2026, 2, 1, 11, 0, 0).unwrap();
/// assert!(TimeWindow::new(start, end).is_ok());
/// assert!(TimeWindow::new(end, start).is_err());
/// assert!(TimeWindow::new(start, start).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Construct a window, rejecting empty or inverted intervals.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidTimeWindow> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(InvalidTimeWindow { start, end })
        }
    }

    /// Inclusive lower bound.
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive upper bound.
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether two windows share at least one instant.
    ///
    /// Windows that merely touch (one ends exactly where the other starts)
    /// do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Reservation status. Cancellation deletes the row, so only confirmed
/// reservations are ever persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservationStatus {
    Confirmed,
}

impl ReservationStatus {
    /// Lower-case representation used on the wire and in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when a stored status is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reservation status: {0}")]
pub struct UnknownReservationStatus(pub String);

impl FromStr for ReservationStatus {
    type Err = UnknownReservationStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            other => Err(UnknownReservationStatus(other.to_owned())),
        }
    }
}

/// A booking of a room by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: ReservationId,
    pub room_id: RoomId,
    pub user_id: UserId,
    pub window: TimeWindow,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Build a new confirmed reservation.
    pub fn confirmed(
        room_id: RoomId,
        user_id: UserId,
        window: TimeWindow,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ReservationId::random(),
            room_id,
            user_id,
            window,
            status: ReservationStatus::Confirmed,
            created_at,
        }
    }

    /// Inclusive start instant.
    pub const fn start_time(&self) -> DateTime<Utc> {
        self.window.start()
    }

    /// Exclusive end instant.
    pub const fn end_time(&self) -> DateTime<Utc> {
        self.window.end()
    }

    /// Whether the reservation blocks its room for other bookings.
    pub const fn is_confirmed(&self) -> bool {
        matches!(self.status, ReservationStatus::Confirmed)
    }
}

/// Sort reservations into creation order: `created_at`, then id.
pub fn sort_in_creation_order(reservations: &mut [Reservation]) {
    reservations.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, hour, minute, 0)
            .single()
            .expect("valid timestamp")
    }

    fn window(start: (u32, u32), end: (u32, u32)) -> TimeWindow {
        TimeWindow::new(at(start.0, start.1), at(end.0, end.1)).expect("valid window")
    }

    #[rstest]
    #[case::touching_after(window((10, 0), (11, 0)), window((11, 0), (12, 0)), false)]
    #[case::touching_before(window((11, 0), (12, 0)), window((10, 0), (11, 0)), false)]
    #[case::contained(window((10, 0), (11, 0)), window((10, 30), (10, 45)), true)]
    #[case::containing(window((10, 30), (10, 45)), window((10, 0), (11, 0)), true)]
    #[case::partial(window((10, 0), (11, 0)), window((10, 59), (12, 0)), true)]
    #[case::identical(window((10, 0), (11, 0)), window((10, 0), (11, 0)), true)]
    #[case::disjoint(window((8, 0), (9, 0)), window((10, 0), (11, 0)), false)]
    fn overlap_uses_half_open_intervals(
        #[case] a: TimeWindow,
        #[case] b: TimeWindow,
        #[case] expected: bool,
    ) {
        assert_eq!(a.overlaps(&b), expected);
        assert_eq!(b.overlaps(&a), expected);
    }

    #[rstest]
    fn window_rejects_empty_interval() {
        let err = TimeWindow::new(at(10, 0), at(10, 0)).expect_err("empty window");
        assert!(err.to_string().contains("date"));
    }

    #[rstest]
    fn status_round_trips_through_text() {
        assert_eq!("confirmed".parse(), Ok(ReservationStatus::Confirmed));
        assert_eq!(ReservationStatus::Confirmed.to_string(), "confirmed");
        assert!("cancelled".parse::<ReservationStatus>().is_err());
    }

    #[rstest]
    fn creation_order_breaks_ties_by_id() {
        let created = at(9, 0);
        let room = RoomId::random();
        let user = UserId::random();
        let mut first = Reservation::confirmed(room, user, window((10, 0), (11, 0)), created);
        let mut second = first.clone();
        first.id = ReservationId::from_uuid(uuid::Uuid::from_u128(2));
        second.id = ReservationId::from_uuid(uuid::Uuid::from_u128(1));
        let mut third = Reservation::confirmed(room, user, window((12, 0), (13, 0)), at(8, 0));
        third.id = ReservationId::from_uuid(uuid::Uuid::from_u128(3));

        let mut all = vec![first.clone(), second.clone(), third.clone()];
        sort_in_creation_order(&mut all);

        assert_eq!(all, vec![third, second, first]);
    }
}
