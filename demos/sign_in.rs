//! Demonstrates signing in against a mock API, letting the client refresh an expired credential
//! transparently, and reacting to sign-out notifications.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use atestado_client::{
	auth::Credentials,
	client::ApiClient,
	config::ClientConfig,
	store::{CredentialStore, MemoryStore},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let user = json!({
		"_id": "u1",
		"fullname": "Ana Souza",
		"email": "ana@example.com",
		"cpf": "52998224725",
		"role": "admin"
	});
	let auth_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "user": user.clone(), "access_token": "demo-issued" }));
		})
		.await;
	let expired_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/cids/J11").header("authorization", "Bearer demo-issued");
			then.status(401)
				.header("content-type", "application/json")
				.json_body(json!({ "message": "jwt expired" }));
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/user/refresh-token");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "token": "demo-refreshed" }));
		})
		.await;
	let cid_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/cids/J11").header("authorization", "Bearer demo-refreshed");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "cid": { "code": "J11", "description": "Influenza" } }));
		})
		.await;
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let config = ClientConfig::builder(Url::parse(&server.base_url())?).build()?;
	let client = ApiClient::new(config, store)?;
	let _subscription = client.subscribe_sign_out(|| println!("Session ended."));
	let sign_in = client.sign_in(&Credentials::new("ana@example.com", "demo-password")).await?;

	println!("Signed in as {}.", sign_in.user.fullname);

	let cid = client.find_cid("J11").await?;

	println!("{}: {}.", cid.code, cid.description);
	println!("Refresh cycles: {}.", client.refresh_metrics().successes());

	client.sign_out().await?;

	auth_mock.assert_async().await;
	expired_mock.assert_async().await;
	refresh_mock.assert_async().await;
	cid_mock.assert_async().await;

	Ok(())
}
