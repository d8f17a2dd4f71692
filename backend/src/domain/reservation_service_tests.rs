//! Tests for the reservation command service.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::rstest;

use super::*;
use crate::domain::ports::{MockReservationRepository, MockRoomRepository};
use crate::domain::{ErrorCode, Principal, ReservationId, Role, Room, RoomDraft, RoomId, UserId};

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        at(8, 0)
    }
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 1, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

fn room() -> Room {
    let draft = RoomDraft::try_from_parts("Salle A", 6, &["écran"]).expect("valid draft");
    Room::create(RoomId::random(), draft, at(7, 0))
}

fn booked(room_id: RoomId, start: DateTime<Utc>, end: DateTime<Utc>) -> Reservation {
    Reservation::confirmed(
        room_id,
        UserId::random(),
        TimeWindow::new(start, end).expect("valid window"),
        at(7, 30),
    )
}

fn make_service(
    rooms: MockRoomRepository,
    reservations: MockReservationRepository,
) -> ReservationCommandService<MockRoomRepository, MockReservationRepository> {
    ReservationCommandService::new(Arc::new(rooms), Arc::new(reservations), Arc::new(FixtureClock))
}

fn rooms_with(room: Room) -> MockRoomRepository {
    let mut rooms = MockRoomRepository::new();
    rooms
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(room)));
    rooms
}

fn create_request(
    room_id: RoomId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> CreateReservationRequest {
    CreateReservationRequest {
        requester: Some(UserId::random()),
        room_id,
        start,
        end,
    }
}

#[rstest]
#[case(at(11, 0), at(12, 0))]
#[case(at(9, 0), at(10, 0))]
#[tokio::test]
async fn create_accepts_windows_touching_an_existing_booking(
    #[case] start: DateTime<Utc>,
    #[case] end: DateTime<Utc>,
) {
    let room = room();
    let room_id = room.id;
    let mut reservations = MockReservationRepository::new();
    reservations
        .expect_list_for_room()
        .return_once(move |_| Ok(vec![booked(room_id, at(10, 0), at(11, 0))]));
    reservations
        .expect_insert_if_available()
        .withf(move |reservation| {
            reservation.room_id == room_id
                && reservation.is_confirmed()
                && reservation.created_at == at(8, 0)
        })
        .times(1)
        .return_once(|_| Ok(()));

    let request = create_request(room_id, start, end);
    let requester = request.requester;
    let reservation = make_service(rooms_with(room), reservations)
        .create(request)
        .await
        .expect("reservation created");

    assert_eq!(Some(reservation.user_id), requester);
    assert_eq!(reservation.start_time(), start);
    assert_eq!(reservation.end_time(), end);
}

#[tokio::test]
async fn create_rejects_overlap_without_writing() {
    let room = room();
    let room_id = room.id;
    let mut reservations = MockReservationRepository::new();
    reservations
        .expect_list_for_room()
        .return_once(move |_| Ok(vec![booked(room_id, at(10, 0), at(11, 0))]));
    reservations.expect_insert_if_available().times(0);

    let error = make_service(rooms_with(room), reservations)
        .create(create_request(room_id, at(10, 30), at(10, 45)))
        .await
        .expect_err("overlap");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), crate::domain::error::ROOM_UNAVAILABLE_MESSAGE);
}

#[tokio::test]
async fn create_maps_storage_overlap_to_conflict() {
    let room = room();
    let room_id = room.id;
    let mut reservations = MockReservationRepository::new();
    reservations.expect_list_for_room().return_once(|_| Ok(Vec::new()));
    reservations
        .expect_insert_if_available()
        .return_once(|_| Err(ReservationRepositoryError::overlap()));

    let error = make_service(rooms_with(room), reservations)
        .create(create_request(room_id, at(10, 0), at(11, 0)))
        .await
        .expect_err("racing insert");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn create_requires_an_identity() {
    let mut rooms = MockRoomRepository::new();
    rooms.expect_find_by_id().times(0);

    let mut request = create_request(RoomId::random(), at(10, 0), at(11, 0));
    request.requester = None;
    let error = make_service(rooms, MockReservationRepository::new())
        .create(request)
        .await
        .expect_err("missing identity");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert!(error.message().to_lowercase().contains("utilisateur"));
}

#[rstest]
#[case(at(11, 0), at(10, 0))]
#[case(at(10, 0), at(10, 0))]
#[tokio::test]
async fn create_rejects_empty_or_reversed_windows(
    #[case] start: DateTime<Utc>,
    #[case] end: DateTime<Utc>,
) {
    let mut rooms = MockRoomRepository::new();
    rooms.expect_find_by_id().times(0);

    let error = make_service(rooms, MockReservationRepository::new())
        .create(create_request(RoomId::random(), start, end))
        .await
        .expect_err("invalid window");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert!(error.message().contains("date"));
}

#[tokio::test]
async fn create_for_missing_room_is_not_found() {
    let mut rooms = MockRoomRepository::new();
    rooms.expect_find_by_id().return_once(|_| Ok(None));

    let error = make_service(rooms, MockReservationRepository::new())
        .create(create_request(RoomId::random(), at(10, 0), at(11, 0)))
        .await
        .expect_err("missing room");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert!(error.message().to_lowercase().contains("salle"));
}

fn cancel_service(
    existing: Option<Reservation>,
    expect_delete: bool,
) -> ReservationCommandService<MockRoomRepository, MockReservationRepository> {
    let mut reservations = MockReservationRepository::new();
    reservations
        .expect_find_by_id()
        .return_once(move |_| Ok(existing));
    reservations
        .expect_delete()
        .times(usize::from(expect_delete))
        .return_once(|_| Ok(true));
    make_service(MockRoomRepository::new(), reservations)
}

#[rstest]
#[case(Role::User, true)]
#[case(Role::Admin, false)]
#[tokio::test]
async fn owners_and_admins_may_cancel(#[case] role: Role, #[case] is_owner: bool) {
    let reservation = booked(RoomId::random(), at(10, 0), at(11, 0));
    let requester = Principal {
        user_id: if is_owner {
            reservation.user_id
        } else {
            UserId::random()
        },
        role,
    };
    let reservation_id = reservation.id;

    cancel_service(Some(reservation), true)
        .cancel(CancelReservationRequest {
            requester: Some(requester),
            reservation_id,
        })
        .await
        .expect("cancellation succeeds");
}

#[tokio::test]
async fn strangers_cannot_cancel() {
    let reservation = booked(RoomId::random(), at(10, 0), at(11, 0));
    let reservation_id = reservation.id;

    let error = cancel_service(Some(reservation), false)
        .cancel(CancelReservationRequest {
            requester: Some(Principal {
                user_id: UserId::random(),
                role: Role::User,
            }),
            reservation_id,
        })
        .await
        .expect_err("not the owner");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn cancelling_unknown_reservation_is_not_found() {
    let error = cancel_service(None, false)
        .cancel(CancelReservationRequest {
            requester: Some(Principal {
                user_id: UserId::random(),
                role: Role::Admin,
            }),
            reservation_id: ReservationId::random(),
        })
        .await
        .expect_err("missing reservation");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case::deleted_room(crate::domain::ports::ROOM_REFERENCE, ErrorCode::NotFound, "salle")]
#[case::deleted_user(crate::domain::ports::USER_REFERENCE, ErrorCode::InvalidRequest, "utilisateur")]
#[tokio::test]
async fn create_names_the_vanished_reference(
    #[case] constraint: &'static str,
    #[case] code: ErrorCode,
    #[case] keyword: &str,
) {
    let room = room();
    let room_id = room.id;
    let mut reservations = MockReservationRepository::new();
    reservations.expect_list_for_room().return_once(|_| Ok(Vec::new()));
    reservations
        .expect_insert_if_available()
        .return_once(move |_| Err(ReservationRepositoryError::missing_reference(constraint)));

    let error = make_service(rooms_with(room), reservations)
        .create(create_request(room_id, at(10, 0), at(11, 0)))
        .await
        .expect_err("dangling reference");

    assert_eq!(error.code(), code);
    assert!(error.message().to_lowercase().contains(keyword));
}
