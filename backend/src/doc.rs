//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (auth, users,
//!   rooms, reservations, health)
//! - **Schemas**: request and response DTOs plus the domain error wrappers
//!   ([`ErrorSchema`], [`ErrorCodeSchema`]) that keep domain types free of
//!   utoipa
//! - **Security**: bearer JWT authentication scheme
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::reservations::{CreateReservationBody, ReservationResponse};
use crate::inbound::http::rooms::{AvailabilityResponse, RoomRequest, RoomResponse};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{
    LoginRequest, LoginResponse, ProfileUpdateRequest, SignupRequest, UserResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme in the generated document.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /api/auth."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Roombook backend API",
        description = "Room booking: accounts, the room catalogue and reservations.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::signup,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::rooms::list_rooms,
        crate::inbound::http::rooms::create_room,
        crate::inbound::http::rooms::get_room,
        crate::inbound::http::rooms::update_room,
        crate::inbound::http::rooms::delete_room,
        crate::inbound::http::rooms::room_availability,
        crate::inbound::http::reservations::list_my_reservations,
        crate::inbound::http::reservations::list_all_reservations,
        crate::inbound::http::reservations::list_room_reservations,
        crate::inbound::http::reservations::list_reservations_from,
        crate::inbound::http::reservations::create_reservation,
        crate::inbound::http::reservations::cancel_reservation,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        LoginRequest,
        LoginResponse,
        SignupRequest,
        ProfileUpdateRequest,
        UserResponse,
        RoomRequest,
        RoomResponse,
        AvailabilityResponse,
        CreateReservationBody,
        ReservationResponse
    )),
    tags(
        (name = "auth", description = "Bearer token issuance"),
        (name = "users", description = "Account registration and administration"),
        (name = "rooms", description = "Room catalogue and availability"),
        (name = "reservations", description = "Booking and cancelling rooms"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure and registration.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // Note: utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn error_schema_uses_the_wire_field_names() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "error");
        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[rstest]
    #[case("/api/auth")]
    #[case("/api/users/me")]
    #[case("/api/rooms/{id}/availability")]
    #[case("/api/reservation/room/{room_id}")]
    #[case("/api/reservation/{date}")]
    #[case("/health/ready")]
    fn endpoints_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");

        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
    }
}
