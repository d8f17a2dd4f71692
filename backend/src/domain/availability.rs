//! Room availability checks.
//!
//! Pure functions over reservation snapshots. Services call them before
//! writing; the persistence adapter repeats the check atomically.

use super::{Reservation, RoomId, TimeWindow};

/// Whether `room_id` is free for `candidate` given `existing` reservations.
///
/// Only confirmed reservations for the same room are considered, so callers
/// may pass an unfiltered list.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use roombook::domain::{Reservation, RoomId, TimeWindow, UserId, is_room_available};
///
/// let at = |h, m| Utc.with_ymd_and_hms(2026, 2, 1, h, m, 0).unwrap();
/// let room = RoomId::random();
/// let booked = Reservation::confirmed(
///     room,
///     UserId::random(),
///     TimeWindow::new(at(10, 0), at(11, 0)).unwrap(),
///     at(8, 0),
/// );
///
/// let inside = TimeWindow::new(at(10, 30), at(10, 45)).unwrap();
/// let after = TimeWindow::new(at(11, 0), at(12, 0)).unwrap();
/// assert!(!is_room_available(&room, &inside, &[booked.clone()]));
/// assert!(is_room_available(&room, &after, &[booked]));
/// ```
pub fn is_room_available(room_id: &RoomId, candidate: &TimeWindow, existing: &[Reservation]) -> bool {
    first_conflict(room_id, candidate, existing).is_none()
}

/// The first reservation blocking `candidate`, if any.
pub fn first_conflict<'a>(
    room_id: &RoomId,
    candidate: &TimeWindow,
    existing: &'a [Reservation],
) -> Option<&'a Reservation> {
    existing.iter().find(|reservation| {
        reservation.room_id == *room_id
            && reservation.is_confirmed()
            && reservation.window.overlaps(candidate)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::{fixture, rstest};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, hour, minute, 0)
            .single()
            .expect("valid timestamp")
    }

    fn window(start: (u32, u32), end: (u32, u32)) -> TimeWindow {
        TimeWindow::new(at(start.0, start.1), at(end.0, end.1)).expect("valid window")
    }

    struct Booked {
        room: RoomId,
        reservations: Vec<Reservation>,
    }

    #[fixture]
    fn room_a_booked_ten_to_eleven() -> Booked {
        let room = RoomId::random();
        let reservation =
            Reservation::confirmed(room, UserId::random(), window((10, 0), (11, 0)), at(8, 0));
        Booked {
            room,
            reservations: vec![reservation],
        }
    }

    #[rstest]
    #[case::inside(window((10, 30), (10, 45)), false)]
    #[case::straddles_start(window((9, 30), (10, 30)), false)]
    #[case::straddles_end(window((10, 59), (11, 30)), false)]
    #[case::ends_at_start(window((9, 0), (10, 0)), true)]
    #[case::starts_at_end(window((11, 0), (12, 0)), true)]
    fn availability_around_a_booked_hour(
        room_a_booked_ten_to_eleven: Booked,
        #[case] candidate: TimeWindow,
        #[case] expected: bool,
    ) {
        let Booked { room, reservations } = room_a_booked_ten_to_eleven;
        assert_eq!(is_room_available(&room, &candidate, &reservations), expected);
    }

    #[rstest]
    fn other_rooms_do_not_block(room_a_booked_ten_to_eleven: Booked) {
        let other = RoomId::random();
        let candidate = window((10, 0), (11, 0));
        assert!(is_room_available(
            &other,
            &candidate,
            &room_a_booked_ten_to_eleven.reservations
        ));
    }

    #[rstest]
    fn empty_schedule_is_available() {
        assert!(is_room_available(
            &RoomId::random(),
            &window((10, 0), (11, 0)),
            &[]
        ));
    }

    #[rstest]
    fn first_conflict_names_the_blocking_reservation(room_a_booked_ten_to_eleven: Booked) {
        let Booked { room, reservations } = room_a_booked_ten_to_eleven;
        let conflict = first_conflict(&room, &window((10, 15), (10, 20)), &reservations)
            .expect("conflict expected");
        assert_eq!(conflict.start_time(), at(10, 0));
    }
}
