//! Login and user account handlers.
//!
//! ```text
//! POST   /api/auth        {"email":"ada@example.org","password":"..."}
//! POST   /api/users       {"email":"...","name":"...","password":"..."}
//! GET    /api/users/me
//! PUT    /api/users/me    {"name":"..."}
//! GET    /api/users
//! DELETE /api/users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{
    DeleteUserRequest, LoginOutcome, RegisterUserRequest, UpdateProfileRequest,
};
use crate::domain::{Email, LoginCredentials, Password, PersonName, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthContext;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, decoded, login_validation_error, parse_user_id, user_validation_error,
};

/// Login request body for `POST /api/auth`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Account as returned by the API. The password hash is never included.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "ada@example.org")]
    pub email: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "USER")]
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            email: user.email.as_ref().to_owned(),
            name: user.name.as_ref().to_owned(),
            role: user.role.as_str().to_owned(),
            created_at: user.created_at,
        }
    }
}

/// Successful login: the bearer token and the authenticated account.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            token: outcome.token.as_str().to_owned(),
            expires_at: outcome.token.expires_at(),
            user: outcome.user.into(),
        }
    }
}

/// Signup request body for `POST /api/users`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
}

impl TryFrom<SignupRequest> for RegisterUserRequest {
    type Error = crate::domain::Error;

    fn try_from(value: SignupRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            email: Email::new(&value.email).map_err(|err| user_validation_error(&err))?,
            name: PersonName::new(&value.name).map_err(|err| user_validation_error(&err))?,
            password: Password::new(&value.password).map_err(|err| user_validation_error(&err))?,
        })
    }
}

/// Profile update body for `PUT /api/users/me`. Absent fields are unchanged.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Exchange credentials for a bearer token.
///
/// Unknown accounts and wrong passwords both answer 401 with the same body.
#[utoipa::path(
    post,
    path = "/api/auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Blank e-mail or password", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&email, &password)
        .map_err(|err| login_validation_error(&err))?;
    let outcome = state.login.login(&credentials).await?;
    Ok(web::Json(outcome.into()))
}

/// Open a new `USER` account.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid field", body = ErrorSchema),
        (status = 409, description = "E-mail already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "signup",
    security([])
)]
#[post("/users")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let request = RegisterUserRequest::try_from(payload.into_inner())?;
    let user = state.accounts.register(request).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// The caller's own profile.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Caller profile", body = UserResponse),
        (status = 400, description = "Missing user identity", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.accounts_query.profile(auth.user_id()).await?;
    Ok(web::Json(user.into()))
}

/// Update the caller's name, e-mail or password.
#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Missing identity or invalid field", body = ErrorSchema),
        (status = 409, description = "E-mail already registered", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[put("/users/me")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: Result<web::Json<ProfileUpdateRequest>, actix_web::Error>,
) -> ApiResult<web::Json<UserResponse>> {
    let principal = auth.require_user()?;
    let ProfileUpdateRequest {
        email,
        name,
        password,
    } = decoded(payload)?.into_inner();

    let request = UpdateProfileRequest {
        requester: Some(principal.user_id),
        email: email
            .as_deref()
            .map(Email::new)
            .transpose()
            .map_err(|err| user_validation_error(&err))?,
        name: name
            .as_deref()
            .map(PersonName::new)
            .transpose()
            .map_err(|err| user_validation_error(&err))?,
        password: password
            .as_deref()
            .map(Password::new)
            .transpose()
            .map_err(|err| user_validation_error(&err))?,
    };
    let user = state.accounts.update_profile(request).await?;
    Ok(web::Json(user.into()))
}

/// List every account in creation order. Administrators only.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Accounts", body = [UserResponse]),
        (status = 400, description = "Missing user identity", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    auth.require_admin()?;
    let users = state.accounts_query.list_users().await?;
    Ok(web::Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Delete an account and its reservations. Administrators only, and never
/// their own account.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "Account to delete")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 400, description = "Invalid id or self-deletion", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "No such account", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let requester = auth.require_admin()?;
    let user_id = parse_user_id(&path.into_inner(), FieldName::new("id"))?;
    state
        .accounts
        .delete_user(DeleteUserRequest { requester, user_id })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests;
