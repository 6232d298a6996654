#![allow(dead_code)]

// std
use std::{
	collections::HashMap,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::Notify;
use url::Url;
// self
use atestado_client::{
	auth::TokenSecret,
	client::{ApiClient, REFRESH_PATH},
	config::ClientConfig,
	error::TransportError,
	http::{ApiRequest, ApiResponse, ApiTransport, Method, TransportFuture},
	store::{CredentialStore, MemoryStore},
};

/// Storage key used by every test client.
pub const TOKEN_KEY: &str = "@demarco.token";
/// Always answers 500.
pub const BOOM_PATH: &str = "/boom";
/// Always answers 401 with a non-expiry message.
pub const BAD_SIGNATURE_PATH: &str = "/bad-signature";
/// Always answers 401 with the expiry message.
pub const ALWAYS_EXPIRED_PATH: &str = "/always-expired";
/// Answers 200 whether or not a credential is attached.
pub const PUBLIC_PATH: &str = "/public";

pub type ScriptedClient = ApiClient<ScriptedTransport>;

/// One call observed by [`ScriptedTransport`].
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
	pub method: Method,
	pub path: String,
	pub bearer: Option<String>,
	pub body: Option<Value>,
}

/// In-process API fake.
///
/// A request carrying the currently valid credential succeeds; any other credential is answered
/// with `401 jwt expired`. Refresh calls optionally park on a gate until the test releases them.
#[derive(Debug)]
pub struct ScriptedTransport {
	valid: Mutex<String>,
	calls: Mutex<Vec<Call>>,
	routes: Mutex<HashMap<String, Value>>,
	public_routes: Mutex<HashMap<String, Value>>,
	refresh_reply: Mutex<Result<ApiResponse, TransportError>>,
	refresh_gate: Option<Arc<Notify>>,
	request_gate: Mutex<Option<(String, Arc<Notify>)>>,
}
impl ScriptedTransport {
	pub fn new(valid: &str) -> Self {
		Self {
			valid: Mutex::new(valid.to_owned()),
			calls: Mutex::default(),
			routes: Mutex::default(),
			public_routes: Mutex::default(),
			refresh_reply: Mutex::new(Ok(ApiResponse::json_body(200, &json!({ "token": valid })))),
			refresh_gate: None,
			request_gate: Mutex::default(),
		}
	}

	pub fn with_refresh_gate(mut self, gate: Arc<Notify>) -> Self {
		self.refresh_gate = Some(gate);

		self
	}

	/// Replaces the refresh reply; a successful reply makes its token the valid credential.
	pub fn set_refresh_reply(&self, reply: ApiResponse) {
		*self.refresh_reply.lock() = Ok(reply);
	}

	/// Makes the refresh call fail below HTTP, as a dropped connection would.
	pub fn fail_refresh_transport(&self) {
		*self.refresh_reply.lock() =
			Err(std::io::Error::other("connection reset by peer").into());
	}

	/// Parks the first call to `path` until `gate` is notified.
	pub fn hold_first_call(&self, path: &str, gate: Arc<Notify>) {
		*self.request_gate.lock() = Some((path.to_owned(), gate));
	}

	/// Body returned on success for `path` instead of the default echo.
	pub fn route(&self, path: &str, body: Value) {
		self.routes.lock().insert(path.to_owned(), body);
	}

	/// Body returned for `path` regardless of the attached credential.
	pub fn public_route(&self, path: &str, body: Value) {
		self.public_routes.lock().insert(path.to_owned(), body);
	}

	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().clone()
	}

	pub fn calls_to(&self, path: &str) -> Vec<Call> {
		self.calls().into_iter().filter(|call| call.path == path).collect()
	}

	pub fn refresh_calls(&self) -> usize {
		self.calls_to(REFRESH_PATH).len()
	}

	fn refresh(&self) -> Result<ApiResponse, TransportError> {
		let reply = self.refresh_reply.lock().clone()?;

		if reply.is_success() {
			if let Some(token) = reply
				.json::<Value>()
				.ok()
				.and_then(|body| body.get("token").and_then(Value::as_str).map(ToOwned::to_owned))
			{
				*self.valid.lock() = token;
			}
		}

		Ok(reply)
	}

	fn answer(&self, call: &Call) -> ApiResponse {
		match call.path.as_str() {
			BOOM_PATH => return ApiResponse::json_body(500, &json!({ "message": "boom" })),
			BAD_SIGNATURE_PATH =>
				return ApiResponse::json_body(401, &json!({ "message": "invalid signature" })),
			ALWAYS_EXPIRED_PATH => return expired(),
			PUBLIC_PATH => return ApiResponse::json_body(200, &json!({ "public": true })),
			_ => {},
		}

		if let Some(body) = self.public_routes.lock().get(&call.path) {
			return ApiResponse::json_body(200, body);
		}

		let valid = self.valid.lock().clone();

		match call.bearer.as_deref() {
			Some(bearer) if bearer == valid => {
				let body = self
					.routes
					.lock()
					.get(&call.path)
					.cloned()
					.unwrap_or_else(|| json!({ "path": call.path, "token": bearer }));

				ApiResponse::json_body(200, &body)
			},
			Some(_) => expired(),
			None => ApiResponse::json_body(401, &json!({ "message": "jwt must be provided" })),
		}
	}
}
impl ApiTransport for ScriptedTransport {
	fn execute<'a>(&'a self, url: Url, request: ApiRequest) -> TransportFuture<'a> {
		Box::pin(async move {
			let call = Call {
				method: request.method,
				path: url.path().to_owned(),
				bearer: request.authorization.as_ref().map(|token| token.expose().to_owned()),
				body: request.body.clone(),
			};

			self.calls.lock().push(call.clone());

			if call.path == REFRESH_PATH {
				if let Some(gate) = &self.refresh_gate {
					gate.notified().await;
				}

				return self.refresh();
			}

			let held = {
				let mut gate = self.request_gate.lock();

				if gate.as_ref().is_some_and(|(path, _)| *path == call.path) {
					gate.take().map(|(_, gate)| gate)
				} else {
					None
				}
			};

			if let Some(gate) = held {
				gate.notified().await;
			}

			Ok(self.answer(&call))
		})
	}
}

pub fn expired() -> ApiResponse {
	ApiResponse::json_body(401, &json!({ "message": "jwt expired" }))
}

pub fn test_config(base_url: &str) -> ClientConfig {
	ClientConfig::builder(Url::parse(base_url).expect("Test base URL should parse."))
		.token_key(TOKEN_KEY)
		.build()
		.expect("Test client config should build.")
}

pub fn scripted_client(transport: ScriptedTransport) -> (ScriptedClient, MemoryStore) {
	let store = MemoryStore::default();
	let client = ApiClient::with_transport(
		test_config("http://api.test/"),
		Arc::new(store.clone()) as Arc<dyn CredentialStore>,
		transport,
	);

	(client, store)
}

pub async fn seed_token<T>(client: &ApiClient<T>, token: &str)
where
	T: ?Sized + ApiTransport,
{
	client.store_token(TokenSecret::new(token)).await.expect("Seeding the credential should succeed.");
}

/// Subscribes a counting sign-out callback.
pub fn count_sign_outs<T>(
	client: &ApiClient<T>,
) -> (Arc<AtomicUsize>, atestado_client::auth::SignOutSubscription)
where
	T: ?Sized + ApiTransport,
{
	let count = Arc::new(AtomicUsize::new(0));
	let counter = count.clone();
	let subscription = client.subscribe_sign_out(move || {
		counter.fetch_add(1, Ordering::SeqCst);
	});

	(count, subscription)
}

pub fn sign_outs(count: &AtomicUsize) -> usize {
	count.load(Ordering::SeqCst)
}

pub fn user_json() -> Value {
	json!({
		"_id": "u1",
		"fullname": "Ana Souza",
		"email": "ana@example.com",
		"cpf": "52998224725",
		"role": "admin",
		"isActive": true,
		"createdAt": "2025-03-01T12:00:00.000Z"
	})
}

pub fn colaborator_json(id: &str) -> Value {
	json!({
		"_id": id,
		"fullname": "Ana Souza",
		"companyId": "acme",
		"cpf": "52998224725",
		"birthdate": "1990-04-07",
		"role": "Analyst",
		"status": "active",
		"createdAt": "2025-01-02T03:04:05.000Z"
	})
}

/// Client talking to a real HTTP server through the default reqwest transport.
#[cfg(feature = "reqwest")]
pub fn reqwest_client(base_url: &str) -> (atestado_client::client::ReqwestApiClient, MemoryStore) {
	let store = MemoryStore::default();
	let client = ApiClient::new(test_config(base_url), Arc::new(store.clone()))
		.expect("Reqwest client should build.");

	(client, store)
}
