//! Live server harness for reservation booking scenarios.
//!
//! Actix drives the server future with `spawn_local`, so the world owns a
//! current-thread Tokio runtime plus a `LocalSet` and runs every request
//! through them. Dropping the [`WorldFixture`] stops the server.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::TcpListener;
use std::rc::Rc;

use actix_web::HttpServer;
use actix_web::dev::ServerHandle;
use actix_web::http::Method;
use awc::Client;
use roombook::domain::Room;
use roombook::test_support::{TestBackend, api_app};
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

/// Accounts seeded for every scenario, keyed by first name.
pub(crate) const ACCOUNTS: [&str; 2] = ["grace", "alan"];

pub(crate) fn password_for(name: &str) -> String {
    format!("{name}-password-1")
}

pub(crate) struct BookingWorld {
    pub(crate) runtime: Runtime,
    pub(crate) local: LocalSet,
    pub(crate) base_url: String,
    pub(crate) server: ServerHandle,
    pub(crate) room: Room,
    pub(crate) tokens: HashMap<String, String>,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_body: Option<Value>,
    pub(crate) last_reservation_id: Option<String>,
}

pub(crate) type SharedWorld = Rc<RefCell<BookingWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        let ctx = self.world.borrow();
        let server = ctx.server.clone();
        ctx.local.block_on(&ctx.runtime, async move {
            server.stop(true).await;
        });
    }
}

pub(crate) fn with_world_async<R, F>(world: &SharedWorld, operation: impl FnOnce(String) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let base_url = ctx.base_url.clone();
    ctx.local.block_on(&ctx.runtime, operation(base_url))
}

async fn spawn_server(backend: &TestBackend) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let state = backend.state.clone();

    let server = HttpServer::new(move || api_app(state.clone()))
        .disable_signals()
        .workers(1)
        .listen(listener)
        .map_err(|err| err.to_string())?
        .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok((format!("http://{addr}"), handle))
}

/// Build a world with one room and the seeded [`ACCOUNTS`], served over HTTP.
pub(crate) fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();

    let backend = TestBackend::new();
    let room = backend.seed_room("Salle Turing", 12);
    let (base_url, server) = local.block_on(&runtime, async {
        for name in ACCOUNTS {
            backend
                .seed_user(&format!("{name}@example.org"), name, &password_for(name))
                .await;
        }
        spawn_server(&backend).await.expect("booking server")
    });

    WorldFixture {
        world: Rc::new(RefCell::new(BookingWorld {
            runtime,
            local,
            base_url,
            server,
            room,
            tokens: HashMap::new(),
            last_status: None,
            last_body: None,
            last_reservation_id: None,
        })),
    }
}

/// A request issued against the live server.
pub(crate) struct JsonRequest<'a> {
    pub(crate) method: Method,
    pub(crate) path: &'a str,
    pub(crate) token: Option<String>,
    pub(crate) payload: Option<Value>,
}

/// Send `request` and record its status and JSON body, if any.
pub(crate) fn perform_json_request(world: &SharedWorld, request: JsonRequest<'_>) {
    let JsonRequest {
        method,
        path,
        token,
        payload,
    } = request;
    let (status, body) = with_world_async(world, |base_url| async move {
        let mut request = Client::default().request(method, format!("{base_url}{path}"));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let mut response = match payload {
            Some(payload) => request.send_json(&payload).await,
            None => request.send().await,
        }
        .expect("booking request");
        let status = response.status().as_u16();
        let bytes = response.body().await.expect("response body");
        let body = (!bytes.is_empty())
            .then(|| serde_json::from_slice::<Value>(&bytes).expect("JSON body"));
        (status, body)
    });

    let mut ctx = world.borrow_mut();
    ctx.last_status = Some(status);
    ctx.last_body = body;
}
