//! Reservation listings by user, by start date, by room and unfiltered.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    ListReservationsFromRequest, ListRoomReservationsRequest, ListUserReservationsRequest,
    ReservationQuery, ReservationRepository,
};
use crate::domain::room_service::map_reservation_error;
use crate::domain::{Error, Reservation, parse_start_bound, sort_in_creation_order};

fn in_creation_order(mut reservations: Vec<Reservation>) -> Vec<Reservation> {
    sort_in_creation_order(&mut reservations);
    reservations
}

/// Service implementing [`ReservationQuery`].
#[derive(Clone)]
pub struct ReservationQueryService<B> {
    reservations: Arc<B>,
}

impl<B> ReservationQueryService<B> {
    /// Create the query service over a reservation repository.
    pub fn new(reservations: Arc<B>) -> Self {
        Self { reservations }
    }
}

#[async_trait]
impl<B> ReservationQuery for ReservationQueryService<B>
where
    B: ReservationRepository,
{
    async fn list_for_user(
        &self,
        request: ListUserReservationsRequest,
    ) -> Result<Vec<Reservation>, Error> {
        let user_id = request.requester.ok_or_else(Error::no_user)?;
        self.reservations
            .list_for_user(&user_id)
            .await
            .map(in_creation_order)
            .map_err(map_reservation_error)
    }

    async fn list_starting_from(
        &self,
        request: ListReservationsFromRequest,
    ) -> Result<Vec<Reservation>, Error> {
        let user_id = request.requester.ok_or_else(Error::no_user)?;
        let from =
            parse_start_bound(&request.date).ok_or_else(|| Error::invalid_date(&request.date))?;
        self.reservations
            .list_for_user_starting_from(&user_id, from)
            .await
            .map(in_creation_order)
            .map_err(map_reservation_error)
    }

    async fn list_for_room(
        &self,
        request: ListRoomReservationsRequest,
    ) -> Result<Vec<Reservation>, Error> {
        let room_id = request.room_id.ok_or_else(Error::no_room)?;
        self.reservations
            .list_for_room(&room_id)
            .await
            .map(in_creation_order)
            .map_err(map_reservation_error)
    }

    async fn list_all(&self) -> Result<Vec<Reservation>, Error> {
        self.reservations
            .list_all()
            .await
            .map(in_creation_order)
            .map_err(map_reservation_error)
    }
}

#[cfg(test)]
mod tests {
    //! Query semantics: identity checks, date parsing and ordering.
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::ports::{MockReservationRepository, ReservationRepositoryError};
    use crate::domain::{ErrorCode, RoomId, TimeWindow, UserId};

    fn day(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, month, day, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn reservation_for(
        user_id: UserId,
        start: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Reservation {
        Reservation::confirmed(
            RoomId::random(),
            user_id,
            TimeWindow::new(start, start + chrono::Duration::hours(1)).expect("valid window"),
            created_at,
        )
    }

    fn service(
        repo: MockReservationRepository,
    ) -> ReservationQueryService<MockReservationRepository> {
        ReservationQueryService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn list_for_user_requires_an_identity() {
        let mut repo = MockReservationRepository::new();
        repo.expect_list_for_user().times(0);

        let error = service(repo)
            .list_for_user(ListUserReservationsRequest { requester: None })
            .await
            .expect_err("missing identity");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert!(error.message().to_lowercase().contains("utilisateur"));
    }

    #[tokio::test]
    async fn list_for_user_returns_creation_order() {
        let user_id = UserId::random();
        let later = reservation_for(user_id, day(2, 1), day(1, 20));
        let earlier = reservation_for(user_id, day(3, 1), day(1, 10));
        let expected = vec![earlier.id, later.id];
        let mut repo = MockReservationRepository::new();
        repo.expect_list_for_user()
            .withf(move |id| *id == user_id)
            .return_once(move |_| Ok(vec![later, earlier]));

        let listed = service(repo)
            .list_for_user(ListUserReservationsRequest {
                requester: Some(user_id),
            })
            .await
            .expect("listing succeeds");

        assert_eq!(listed.iter().map(|r| r.id).collect::<Vec<_>>(), expected);
    }

    #[tokio::test]
    async fn empty_listing_is_not_an_error() {
        let mut repo = MockReservationRepository::new();
        repo.expect_list_all().return_once(|| Ok(Vec::new()));

        let listed = service(repo).list_all().await.expect("listing succeeds");

        assert!(listed.is_empty());
    }

    #[rstest]
    #[case("2026-02-10", day(2, 10) - chrono::Duration::hours(9))]
    #[case("2026-02-10T09:00:00Z", day(2, 10))]
    #[case("2026-02-10T09:00:00", day(2, 10))]
    #[tokio::test]
    async fn list_starting_from_parses_the_bound(
        #[case] raw: &str,
        #[case] expected: DateTime<Utc>,
    ) {
        let user_id = UserId::random();
        let mut repo = MockReservationRepository::new();
        repo.expect_list_for_user_starting_from()
            .withf(move |id, from| *id == user_id && *from == expected)
            .times(1)
            .return_once(|_, _| Ok(Vec::new()));

        service(repo)
            .list_starting_from(ListReservationsFromRequest {
                requester: Some(user_id),
                date: raw.to_owned(),
            })
            .await
            .expect("listing succeeds");
    }

    #[tokio::test]
    async fn list_starting_from_rejects_unparseable_dates() {
        let mut repo = MockReservationRepository::new();
        repo.expect_list_for_user_starting_from().times(0);

        let error = service(repo)
            .list_starting_from(ListReservationsFromRequest {
                requester: Some(UserId::random()),
                date: "le dix février".to_owned(),
            })
            .await
            .expect_err("invalid date");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert!(error.message().contains("date"));
        assert_eq!(
            error.details(),
            Some(&json!({ "code": "invalid_date", "value": "le dix février" }))
        );
    }

    #[tokio::test]
    async fn identity_is_checked_before_the_date() {
        let error = service(MockReservationRepository::new())
            .list_starting_from(ListReservationsFromRequest {
                requester: None,
                date: "garbage".to_owned(),
            })
            .await
            .expect_err("missing identity");

        assert!(error.message().to_lowercase().contains("utilisateur"));
    }

    #[tokio::test]
    async fn list_for_room_requires_a_room() {
        let error = service(MockReservationRepository::new())
            .list_for_room(ListRoomReservationsRequest { room_id: None })
            .await
            .expect_err("missing room");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert!(error.message().to_lowercase().contains("salle"));
    }

    #[rstest]
    #[case(ReservationRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(ReservationRepositoryError::query("bad sql"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn repository_failures_are_mapped(
        #[case] failure: ReservationRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let mut repo = MockReservationRepository::new();
        repo.expect_list_for_room().return_once(move |_| Err(failure));

        let error = service(repo)
            .list_for_room(ListRoomReservationsRequest {
                room_id: Some(RoomId::random()),
            })
            .await
            .expect_err("repository failure");

        assert_eq!(error.code(), expected);
    }
}
