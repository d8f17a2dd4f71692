//! Test utilities for the backend crate.
//!
//! In-memory adapters for every driven port plus a ready-wired
//! [`TestBackend`], shared by unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests and behind the `test-support` feature.
//!
//! The in-memory repositories share one set of tables so cascading deletes
//! behave like the PostgreSQL schema: removing a room or a user removes their
//! reservations.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{
    LoginAttemptLimiter, PasswordHashError, PasswordHasher, ROOM_REFERENCE, RegisterUserRequest,
    ReservationRepository, ReservationRepositoryError, RoomRepository, RoomRepositoryError,
    TokenService, USER_REFERENCE, UserAccountCommand, UserPersistenceError, UserRepository,
};
use crate::domain::{
    BootstrapAdmin, Email, Password, PasswordHash, PasswordLoginService, PersonName, Principal,
    Reservation, ReservationCommandService, ReservationId, ReservationQueryService, Room,
    RoomDraft, RoomId, RoomService, StoredUser, TimeWindow, User, UserAccountService, UserId,
    UserUpdate, sort_in_creation_order,
};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::middleware::Trace;
use crate::outbound::security::{
    InMemoryLoginAttemptLimiter, JwtTokenService, LoginThrottlePolicy,
};

/// Signing secret used by [`TestBackend`].
pub const TEST_JWT_SECRET: &[u8] = b"roombook-test-secret-0123456789abcdef";

#[derive(Default)]
struct Tables {
    users: Vec<StoredUser>,
    rooms: Vec<Room>,
    reservations: Vec<Reservation>,
}

/// Shared in-memory tables. Hand out repository views with [`Self::users`],
/// [`Self::rooms`] and [`Self::reservations`].
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// User repository view.
    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            store: self.clone(),
        }
    }

    /// Room repository view.
    pub fn rooms(&self) -> InMemoryRoomRepository {
        InMemoryRoomRepository {
            store: self.clone(),
        }
    }

    /// Reservation repository view.
    pub fn reservations(&self) -> InMemoryReservationRepository {
        InMemoryReservationRepository {
            store: self.clone(),
        }
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    /// Number of stored rooms.
    pub fn room_count(&self) -> usize {
        self.lock().rooms.len()
    }

    /// Number of stored reservations.
    pub fn reservation_count(&self) -> usize {
        self.lock().reservations.len()
    }

    /// Insert a room directly, bypassing the services.
    pub fn insert_room(&self, room: Room) {
        self.lock().rooms.push(room);
    }

    /// Insert a reservation directly, bypassing overlap checks.
    pub fn insert_reservation(&self, reservation: Reservation) {
        self.lock().reservations.push(reservation);
    }
}

/// In-memory [`UserRepository`].
#[derive(Clone)]
pub struct InMemoryUserRepository {
    store: InMemoryStore,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &StoredUser) -> Result<(), UserPersistenceError> {
        let mut tables = self.store.lock();
        if tables
            .users
            .iter()
            .any(|existing| existing.user.email == user.user.email)
        {
            return Err(UserPersistenceError::duplicate_email(
                user.user.email.as_ref(),
            ));
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .store
            .lock()
            .users
            .iter()
            .find(|stored| &stored.user.id == id)
            .map(|stored| stored.user.clone()))
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        Ok(self
            .store
            .lock()
            .users
            .iter()
            .find(|stored| &stored.user.email == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut users: Vec<User> = self
            .store
            .lock()
            .users
            .iter()
            .map(|stored| stored.user.clone())
            .collect();
        users.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(users)
    }

    async fn update(
        &self,
        id: &UserId,
        changes: &UserUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut tables = self.store.lock();
        if let Some(email) = &changes.email
            && tables
                .users
                .iter()
                .any(|stored| &stored.user.email == email && &stored.user.id != id)
        {
            return Err(UserPersistenceError::duplicate_email(email.as_ref()));
        }
        let Some(stored) = tables.users.iter_mut().find(|stored| &stored.user.id == id) else {
            return Ok(None);
        };
        if let Some(email) = &changes.email {
            stored.user.email = email.clone();
        }
        if let Some(name) = &changes.name {
            stored.user.name = name.clone();
        }
        if let Some(hash) = &changes.password_hash {
            stored.password_hash = hash.clone();
        }
        Ok(Some(stored.user.clone()))
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut tables = self.store.lock();
        let before = tables.users.len();
        tables.users.retain(|stored| &stored.user.id != id);
        let deleted = tables.users.len() < before;
        if deleted {
            tables.reservations.retain(|r| &r.user_id != id);
        }
        Ok(deleted)
    }
}

/// In-memory [`RoomRepository`].
#[derive(Clone)]
pub struct InMemoryRoomRepository {
    store: InMemoryStore,
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create(&self, room: &Room) -> Result<(), RoomRepositoryError> {
        self.store.lock().rooms.push(room.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &RoomId) -> Result<Option<Room>, RoomRepositoryError> {
        Ok(self
            .store
            .lock()
            .rooms
            .iter()
            .find(|room| &room.id == id)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Room>, RoomRepositoryError> {
        let mut rooms = self.store.lock().rooms.clone();
        rooms.sort_by(|a, b| (a.name.as_ref(), a.id).cmp(&(b.name.as_ref(), b.id)));
        Ok(rooms)
    }

    async fn update(&self, room: &Room) -> Result<bool, RoomRepositoryError> {
        let mut tables = self.store.lock();
        match tables.rooms.iter_mut().find(|existing| existing.id == room.id) {
            Some(existing) => {
                *existing = room.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &RoomId) -> Result<bool, RoomRepositoryError> {
        let mut tables = self.store.lock();
        let before = tables.rooms.len();
        tables.rooms.retain(|room| &room.id != id);
        let deleted = tables.rooms.len() < before;
        if deleted {
            tables.reservations.retain(|r| &r.room_id != id);
        }
        Ok(deleted)
    }
}

/// In-memory [`ReservationRepository`]. The overlap check and the insert
/// happen under one lock, mirroring the serializable transaction.
#[derive(Clone)]
pub struct InMemoryReservationRepository {
    store: InMemoryStore,
}

impl InMemoryReservationRepository {
    fn select<F>(&self, keep: F) -> Vec<Reservation>
    where
        F: Fn(&Reservation) -> bool,
    {
        let mut selected: Vec<Reservation> = self
            .store
            .lock()
            .reservations
            .iter()
            .filter(|r| keep(r))
            .cloned()
            .collect();
        sort_in_creation_order(&mut selected);
        selected
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn insert_if_available(
        &self,
        reservation: &Reservation,
    ) -> Result<(), ReservationRepositoryError> {
        let mut tables = self.store.lock();
        if !tables.rooms.iter().any(|room| room.id == reservation.room_id) {
            return Err(ReservationRepositoryError::missing_reference(ROOM_REFERENCE));
        }
        if !tables
            .users
            .iter()
            .any(|stored| stored.user.id == reservation.user_id)
        {
            return Err(ReservationRepositoryError::missing_reference(USER_REFERENCE));
        }
        let clash = tables.reservations.iter().any(|existing| {
            existing.room_id == reservation.room_id
                && existing.is_confirmed()
                && existing.window.overlaps(&reservation.window)
        });
        if clash {
            return Err(ReservationRepositoryError::overlap());
        }
        tables.reservations.push(reservation.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ReservationId,
    ) -> Result<Option<Reservation>, ReservationRepositoryError> {
        Ok(self
            .store
            .lock()
            .reservations
            .iter()
            .find(|r| &r.id == id)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Reservation>, ReservationRepositoryError> {
        Ok(self.select(|_| true))
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError> {
        Ok(self.select(|r| &r.user_id == user_id))
    }

    async fn list_for_user_starting_from(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError> {
        Ok(self.select(|r| &r.user_id == user_id && r.start_time() >= from))
    }

    async fn list_for_room(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError> {
        Ok(self.select(|r| &r.room_id == room_id))
    }

    async fn delete(&self, id: &ReservationId) -> Result<bool, ReservationRepositoryError> {
        let mut tables = self.store.lock();
        let before = tables.reservations.len();
        tables.reservations.retain(|r| &r.id != id);
        Ok(tables.reservations.len() < before)
    }
}

/// Password "hasher" storing a prefixed copy of the password.
///
/// Argon2 is deliberately slow; tests that do not exercise hashing itself
/// use this instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextPasswordHasher;

const PLAIN_PREFIX: &str = "plain$";

impl PasswordHasher for PlainTextPasswordHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError> {
        Ok(PasswordHash::new(format!("{PLAIN_PREFIX}{}", password.expose())))
    }

    fn verify(&self, candidate: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        hash.as_str()
            .strip_prefix(PLAIN_PREFIX)
            .map(|stored| stored == candidate)
            .ok_or_else(|| PasswordHashError::malformed_hash("missing plain$ prefix"))
    }
}

/// Clock advancing one second on every reading, so successive records get
/// strictly increasing timestamps.
#[derive(Debug)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl SteppingClock {
    /// Clock whose first reading is `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start,
            ticks: AtomicI64::new(0),
        }
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self::starting_at(fixed_instant())
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::seconds(tick)
    }
}

/// Fully wired services over an [`InMemoryStore`].
#[derive(Clone)]
pub struct TestBackend {
    pub store: InMemoryStore,
    pub state: HttpState,
    pub tokens: Arc<JwtTokenService>,
    pub accounts: Arc<UserAccountService<InMemoryUserRepository>>,
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBackend {
    /// Wire every service over a fresh store.
    ///
    /// # Panics
    /// Never in practice: [`TEST_JWT_SECRET`] satisfies the minimum length.
    pub fn new() -> Self {
        Self::with_login_throttle(LoginThrottlePolicy::default())
    }

    /// Wire every service, throttling failed logins with `policy`.
    ///
    /// # Panics
    /// Never in practice: [`TEST_JWT_SECRET`] satisfies the minimum length.
    pub fn with_login_throttle(policy: LoginThrottlePolicy) -> Self {
        let store = InMemoryStore::new();
        let clock: Arc<dyn Clock> = Arc::new(SteppingClock::default());
        let hasher: Arc<dyn PasswordHasher> = Arc::new(PlainTextPasswordHasher);
        let limiter: Arc<dyn LoginAttemptLimiter> =
            Arc::new(InMemoryLoginAttemptLimiter::new(policy, clock.clone()));
        let tokens = Arc::new(
            JwtTokenService::new(TEST_JWT_SECRET, Duration::days(30), clock.clone())
                .unwrap_or_else(|err| panic!("test token service: {err}")),
        );

        let users = Arc::new(store.users());
        let rooms = Arc::new(store.rooms());
        let reservations = Arc::new(store.reservations());
        let accounts = Arc::new(UserAccountService::new(
            users.clone(),
            hasher.clone(),
            clock.clone(),
        ));
        let room_service = Arc::new(RoomService::new(
            rooms.clone(),
            reservations.clone(),
            clock.clone(),
        ));

        let state = HttpState::new(HttpStatePorts {
            login: Arc::new(PasswordLoginService::new(
                users,
                hasher,
                tokens.clone(),
                limiter,
            )),
            tokens: tokens.clone(),
            accounts: accounts.clone(),
            accounts_query: accounts.clone(),
            rooms: room_service.clone(),
            rooms_query: room_service,
            reservations: Arc::new(ReservationCommandService::new(
                rooms,
                reservations.clone(),
                clock,
            )),
            reservations_query: Arc::new(ReservationQueryService::new(reservations)),
        });

        Self {
            store,
            state,
            tokens,
            accounts,
        }
    }

    /// Ensure an administrator exists and return it.
    ///
    /// # Panics
    /// When the e-mail, name or password fail validation.
    pub async fn seed_admin(&self, email: &str, password: &str) -> User {
        let admin = BootstrapAdmin {
            email: Email::new(email).unwrap_or_else(|err| panic!("admin e-mail: {err}")),
            name: PersonName::new("Administrateur")
                .unwrap_or_else(|err| panic!("admin name: {err}")),
            password: Password::new(password)
                .unwrap_or_else(|err| panic!("admin password: {err}")),
        };
        self.accounts
            .ensure_bootstrap_admin(admin)
            .await
            .unwrap_or_else(|err| panic!("bootstrap admin: {err}"))
    }

    /// Register a `USER` account and return it.
    ///
    /// # Panics
    /// When a value fails validation or the e-mail is taken.
    pub async fn seed_user(&self, email: &str, name: &str, password: &str) -> User {
        let request = RegisterUserRequest {
            email: Email::new(email).unwrap_or_else(|err| panic!("user e-mail: {err}")),
            name: PersonName::new(name).unwrap_or_else(|err| panic!("user name: {err}")),
            password: Password::new(password)
                .unwrap_or_else(|err| panic!("user password: {err}")),
        };
        self.accounts
            .register(request)
            .await
            .unwrap_or_else(|err| panic!("register user: {err}"))
    }

    /// Store a room directly and return it.
    ///
    /// # Panics
    /// When the attributes fail validation.
    pub fn seed_room(&self, name: &str, capacity: i64) -> Room {
        let draft = RoomDraft::try_from_parts(name, capacity, &["projecteur"])
            .unwrap_or_else(|err| panic!("room draft: {err}"));
        let room = Room::create(RoomId::random(), draft, fixed_instant());
        self.store.insert_room(room.clone());
        room
    }

    /// Store a confirmed reservation directly and return it.
    ///
    /// # Panics
    /// When `end` does not follow `start`.
    pub fn seed_reservation(
        &self,
        room: &Room,
        user: &User,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Reservation {
        let window =
            TimeWindow::new(start, end).unwrap_or_else(|err| panic!("reservation window: {err}"));
        let reservation = Reservation::confirmed(room.id, user.id, window, start);
        self.store.insert_reservation(reservation.clone());
        reservation
    }

    /// Issue a bearer token for `user` without going through login.
    ///
    /// # Panics
    /// When signing fails.
    pub fn token_for(&self, user: &User) -> String {
        let principal = Principal {
            user_id: user.id,
            role: user.role,
        };
        self.tokens
            .issue(&principal)
            .map(|token| token.as_str().to_owned())
            .unwrap_or_else(|err| panic!("issue token: {err}"))
    }

    /// `Authorization` header value for `user`.
    pub fn bearer_for(&self, user: &User) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token_for(user)))
    }
}

fn fixed_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Actix app serving the API under `/api` behind the trace middleware, the
/// way the server mounts it.
pub fn api_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(web::scope("/api").configure(configure_api))
}

/// HTTP state over an empty store, with a custom token service.
pub fn http_state_with_tokens(tokens: Arc<dyn TokenService>) -> HttpState {
    let backend = TestBackend::new();
    HttpState {
        tokens,
        ..backend.state
    }
}
