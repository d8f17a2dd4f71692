//! Reservation booking, cancellation and listing handlers.
//!
//! ```text
//! GET    /api/reservation                   caller's reservations
//! GET    /api/reservation/all               every reservation
//! GET    /api/reservation/room/{roomId}     one room's reservations (admin)
//! GET    /api/reservation/{date}            caller's reservations starting on or after date
//! POST   /api/reservation                   {"roomId":"...","startTime":"...","endTime":"..."}
//! DELETE /api/reservation/{id}
//! ```
//!
//! `all` and `room/...` must be registered before `{date}`; see
//! [`configure`].

use actix_web::{HttpResponse, delete, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{
    CancelReservationRequest, CreateReservationRequest, ListReservationsFromRequest,
    ListRoomReservationsRequest, ListUserReservationsRequest,
};
use crate::domain::{Reservation, RoomId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthContext;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, decoded, parse_reservation_id, parse_rfc3339_timestamp, parse_room_id,
};

/// Booking request body for `POST /api/reservation`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationBody {
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    #[schema(example = "2026-02-01T10:00:00Z")]
    pub start_time: String,
    #[serde(default)]
    #[schema(example = "2026-02-01T11:00:00Z")]
    pub end_time: String,
}

/// Reservation as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub id: Uuid,
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[schema(example = "confirmed")]
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(reservation: Reservation) -> Self {
        Self {
            id: *reservation.id.as_uuid(),
            room_id: *reservation.room_id.as_uuid(),
            user_id: *reservation.user_id.as_uuid(),
            start_time: reservation.start_time(),
            end_time: reservation.end_time(),
            status: reservation.status.as_str().to_owned(),
            created_at: reservation.created_at,
        }
    }
}

type ReservationList = web::Json<Vec<ReservationResponse>>;

fn to_response(reservations: Vec<Reservation>) -> ReservationList {
    web::Json(
        reservations
            .into_iter()
            .map(ReservationResponse::from)
            .collect(),
    )
}

/// Register the reservation routes in matching order.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_all_reservations)
        .service(list_room_reservations)
        .service(
            web::resource(["/reservation/room", "/reservation/room/"])
                .route(web::get().to(missing_room_id)),
        )
        .service(list_my_reservations)
        .service(create_reservation)
        .service(list_reservations_from)
        .service(cancel_reservation);
}

/// The caller's reservations in creation order.
#[utoipa::path(
    get,
    path = "/api/reservation",
    responses(
        (status = 200, description = "Caller's reservations", body = [ReservationResponse]),
        (status = 400, description = "Missing user identity", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "listMyReservations"
)]
#[get("/reservation")]
pub async fn list_my_reservations(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<ReservationList> {
    let reservations = state
        .reservations_query
        .list_for_user(ListUserReservationsRequest {
            requester: auth.user_id(),
        })
        .await?;
    Ok(to_response(reservations))
}

/// Every reservation in storage, whoever made it.
#[utoipa::path(
    get,
    path = "/api/reservation/all",
    responses(
        (status = 200, description = "All reservations", body = [ReservationResponse]),
        (status = 400, description = "Missing user identity", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "listAllReservations"
)]
#[get("/reservation/all")]
pub async fn list_all_reservations(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<ReservationList> {
    auth.require_user()?;
    let reservations = state.reservations_query.list_all().await?;
    Ok(to_response(reservations))
}

/// One room's reservations. Administrators only.
#[utoipa::path(
    get,
    path = "/api/reservation/room/{room_id}",
    params(("room_id" = Uuid, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Room reservations", body = [ReservationResponse]),
        (status = 400, description = "Missing identity or room id", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "listRoomReservations"
)]
#[get("/reservation/room/{room_id}")]
pub async fn list_room_reservations(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<ReservationList> {
    auth.require_admin()?;
    let room_id = RoomId::new(path.into_inner()).ok();
    let reservations = state
        .reservations_query
        .list_for_room(ListRoomReservationsRequest { room_id })
        .await?;
    Ok(to_response(reservations))
}

/// `GET /api/reservation/room` without an id.
async fn missing_room_id(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<ReservationList> {
    auth.require_admin()?;
    let reservations = state
        .reservations_query
        .list_for_room(ListRoomReservationsRequest { room_id: None })
        .await?;
    Ok(to_response(reservations))
}

/// The caller's reservations starting on or after `date`.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS` (UTC) and `YYYY-MM-DD`
/// (midnight UTC).
#[utoipa::path(
    get,
    path = "/api/reservation/{date}",
    params(("date" = String, Path, description = "Lower bound on start time", example = "2026-02-10")),
    responses(
        (status = 200, description = "Matching reservations", body = [ReservationResponse]),
        (status = 400, description = "Missing identity or invalid date", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "listReservationsFrom"
)]
#[get("/reservation/{date}")]
pub async fn list_reservations_from(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<ReservationList> {
    let reservations = state
        .reservations_query
        .list_starting_from(ListReservationsFromRequest {
            requester: auth.user_id(),
            date: path.into_inner(),
        })
        .await?;
    Ok(to_response(reservations))
}

/// Book a room over `[startTime, endTime)`.
#[utoipa::path(
    post,
    path = "/api/reservation",
    request_body = CreateReservationBody,
    responses(
        (status = 201, description = "Reservation confirmed", body = ReservationResponse),
        (status = 400, description = "Missing identity or invalid window", body = ErrorSchema),
        (status = 404, description = "No such room", body = ErrorSchema),
        (status = 409, description = "Room already booked over the window", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "createReservation"
)]
#[post("/reservation")]
pub async fn create_reservation(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: Result<web::Json<CreateReservationBody>, actix_web::Error>,
) -> ApiResult<HttpResponse> {
    let principal = auth.require_user()?;
    let CreateReservationBody {
        room_id,
        start_time,
        end_time,
    } = decoded(payload)?.into_inner();

    let request = CreateReservationRequest {
        requester: Some(principal.user_id),
        room_id: parse_room_id(&room_id, FieldName::new("roomId"))?,
        start: parse_rfc3339_timestamp(&start_time, FieldName::new("startTime"))?,
        end: parse_rfc3339_timestamp(&end_time, FieldName::new("endTime"))?,
    };
    let reservation = state.reservations.create(request).await?;
    Ok(HttpResponse::Created().json(ReservationResponse::from(reservation)))
}

/// Cancel (delete) a reservation. Owners and administrators only.
#[utoipa::path(
    delete,
    path = "/api/reservation/{id}",
    params(("id" = Uuid, Path, description = "Reservation identifier")),
    responses(
        (status = 204, description = "Reservation cancelled"),
        (status = 400, description = "Missing identity or malformed id", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "No such reservation", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "cancelReservation"
)]
#[delete("/reservation/{id}")]
pub async fn cancel_reservation(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let principal = auth.require_user()?;
    let reservation_id = parse_reservation_id(&path.into_inner(), FieldName::new("id"))?;
    state
        .reservations
        .cancel(CancelReservationRequest {
            requester: Some(principal),
            reservation_id,
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "reservations_tests.rs"]
mod tests;
