//! HTTP inbound adapter exposing the REST endpoints under `/api`.

pub mod auth;
pub mod error;
pub mod health;
pub mod reservations;
pub mod rooms;
pub mod schemas;
pub mod state;
pub mod users;
pub mod validation;

use actix_web::web;
use tracing::debug;

use crate::domain::Error;

pub use error::ApiResult;

/// Message returned when a JSON body cannot be decoded.
pub const INVALID_BODY_MESSAGE: &str = "Corps de requête JSON invalide";
/// Message returned when a query string cannot be decoded.
pub const INVALID_QUERY_MESSAGE: &str = "Paramètres de requête invalides";

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        debug!(error = %err, "rejecting undecodable JSON body");
        Error::invalid_request(INVALID_BODY_MESSAGE).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        debug!(error = %err, "rejecting undecodable query string");
        Error::invalid_request(INVALID_QUERY_MESSAGE).into()
    })
}

/// Mount every `/api` route on `cfg`.
///
/// Handlers expect `web::Data<HttpState>` in the application data.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use roombook::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(users::login)
        .service(users::signup)
        .service(users::current_user)
        .service(users::update_profile)
        .service(users::list_users)
        .service(users::delete_user)
        .service(rooms::list_rooms)
        .service(rooms::create_room)
        .service(rooms::room_availability)
        .service(rooms::get_room)
        .service(rooms::update_room)
        .service(rooms::delete_room)
        .configure(reservations::configure);
}
