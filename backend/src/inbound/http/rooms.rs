//! Room catalogue and availability handlers.
//!
//! ```text
//! GET    /api/rooms
//! POST   /api/rooms                  {"name":"Turing","capacity":12,"equipment":["projecteur"]}
//! GET    /api/rooms/{id}
//! PUT    /api/rooms/{id}
//! DELETE /api/rooms/{id}
//! GET    /api/rooms/{id}/availability?start=2026-02-01T10:00:00Z&end=2026-02-01T11:00:00Z
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::RoomAvailability;
use crate::domain::{Error, Room, RoomDraft, RoomId, TimeWindow};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthContext;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, decoded, parse_rfc3339_timestamp, room_validation_error,
};

/// Room attributes for creation and full replacement.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    #[serde(default)]
    #[schema(example = "Salle Turing")]
    pub name: String,
    #[serde(default)]
    #[schema(example = 12)]
    pub capacity: i64,
    #[serde(default)]
    #[schema(example = json!(["projecteur", "visio"]))]
    pub equipment: Vec<String>,
}

impl TryFrom<RoomRequest> for RoomDraft {
    type Error = Error;

    fn try_from(value: RoomRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.name, value.capacity, &value.equipment)
            .map_err(|err| room_validation_error(&err))
    }
}

/// Room as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub id: Uuid,
    pub name: String,
    pub capacity: u32,
    pub equipment: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            id: *room.id.as_uuid(),
            name: room.name.as_ref().to_owned(),
            capacity: room.capacity.get(),
            equipment: room.equipment.as_slice().to_vec(),
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}

/// Query string of the availability endpoint.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct AvailabilityParams {
    /// Window start, RFC 3339.
    pub start: String,
    /// Window end (exclusive), RFC 3339.
    pub end: String,
}

/// Availability verdict for one room and window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub room_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
}

impl From<RoomAvailability> for AvailabilityResponse {
    fn from(value: RoomAvailability) -> Self {
        Self {
            room_id: *value.room_id.as_uuid(),
            start: value.window.start(),
            end: value.window.end(),
            available: value.available,
        }
    }
}

fn room_id_from_path(raw: &str) -> Result<RoomId, Error> {
    RoomId::new(raw).map_err(|_| Error::no_room())
}

/// List every room, ordered by name.
#[utoipa::path(
    get,
    path = "/api/rooms",
    responses(
        (status = 200, description = "Rooms", body = [RoomResponse]),
        (status = 400, description = "Missing user identity", body = ErrorSchema)
    ),
    tags = ["rooms"],
    operation_id = "listRooms"
)]
#[get("/rooms")]
pub async fn list_rooms(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<Vec<RoomResponse>>> {
    auth.require_user()?;
    let rooms = state.rooms_query.list_rooms().await?;
    Ok(web::Json(rooms.into_iter().map(RoomResponse::from).collect()))
}

/// Create a room. Administrators only.
#[utoipa::path(
    post,
    path = "/api/rooms",
    request_body = RoomRequest,
    responses(
        (status = 201, description = "Room created", body = RoomResponse),
        (status = 400, description = "Missing identity or invalid field", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema)
    ),
    tags = ["rooms"],
    operation_id = "createRoom"
)]
#[post("/rooms")]
pub async fn create_room(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: Result<web::Json<RoomRequest>, actix_web::Error>,
) -> ApiResult<HttpResponse> {
    auth.require_admin()?;
    let draft = RoomDraft::try_from(decoded(payload)?.into_inner())?;
    let room = state.rooms.create_room(draft).await?;
    Ok(HttpResponse::Created().json(RoomResponse::from(room)))
}

/// Fetch one room.
#[utoipa::path(
    get,
    path = "/api/rooms/{id}",
    params(("id" = Uuid, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Room", body = RoomResponse),
        (status = 400, description = "Missing identity or malformed id", body = ErrorSchema),
        (status = 404, description = "No such room", body = ErrorSchema)
    ),
    tags = ["rooms"],
    operation_id = "getRoom"
)]
#[get("/rooms/{id}")]
pub async fn get_room(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<RoomResponse>> {
    auth.require_user()?;
    let id = room_id_from_path(&path.into_inner())?;
    let room = state.rooms_query.get_room(id).await?;
    Ok(web::Json(room.into()))
}

/// Replace a room's attributes. Administrators only.
#[utoipa::path(
    put,
    path = "/api/rooms/{id}",
    params(("id" = Uuid, Path, description = "Room identifier")),
    request_body = RoomRequest,
    responses(
        (status = 200, description = "Updated room", body = RoomResponse),
        (status = 400, description = "Missing identity or invalid field", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "No such room", body = ErrorSchema)
    ),
    tags = ["rooms"],
    operation_id = "updateRoom"
)]
#[put("/rooms/{id}")]
pub async fn update_room(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
    payload: Result<web::Json<RoomRequest>, actix_web::Error>,
) -> ApiResult<web::Json<RoomResponse>> {
    auth.require_admin()?;
    let id = room_id_from_path(&path.into_inner())?;
    let draft = RoomDraft::try_from(decoded(payload)?.into_inner())?;
    let room = state.rooms.update_room(id, draft).await?;
    Ok(web::Json(room.into()))
}

/// Delete a room and every reservation made for it. Administrators only.
#[utoipa::path(
    delete,
    path = "/api/rooms/{id}",
    params(("id" = Uuid, Path, description = "Room identifier")),
    responses(
        (status = 204, description = "Room deleted"),
        (status = 400, description = "Missing identity or malformed id", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "No such room", body = ErrorSchema)
    ),
    tags = ["rooms"],
    operation_id = "deleteRoom"
)]
#[delete("/rooms/{id}")]
pub async fn delete_room(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    auth.require_admin()?;
    let id = room_id_from_path(&path.into_inner())?;
    state.rooms.delete_room(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Whether the room is free over `[start, end)`.
#[utoipa::path(
    get,
    path = "/api/rooms/{id}/availability",
    params(("id" = Uuid, Path, description = "Room identifier"), AvailabilityParams),
    responses(
        (status = 200, description = "Availability verdict", body = AvailabilityResponse),
        (status = 400, description = "Missing identity or invalid window", body = ErrorSchema),
        (status = 404, description = "No such room", body = ErrorSchema)
    ),
    tags = ["rooms"],
    operation_id = "roomAvailability"
)]
#[get("/rooms/{id}/availability")]
pub async fn room_availability(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
    params: Result<web::Query<AvailabilityParams>, actix_web::Error>,
) -> ApiResult<web::Json<AvailabilityResponse>> {
    auth.require_user()?;
    let id = room_id_from_path(&path.into_inner())?;
    let AvailabilityParams { start, end } = decoded(params)?.into_inner();
    let start = parse_rfc3339_timestamp(&start, FieldName::new("start"))?;
    let end = parse_rfc3339_timestamp(&end, FieldName::new("end"))?;
    let window = TimeWindow::new(start, end).map_err(|_| Error::invalid_window())?;

    let verdict = state.rooms_query.availability(id, window).await?;
    Ok(web::Json(verdict.into()))
}

#[cfg(test)]
#[path = "rooms_tests.rs"]
mod tests;
