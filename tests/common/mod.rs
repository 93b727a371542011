//! Helpers shared by the integration tests.

#![allow(dead_code)]

// std
use std::time::Duration;
// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use memberpress_sdk::{ClientConfig, ReqwestMemberPressClient, config::ClientConfigBuilder};

pub const API_KEY: &str = "mp-test-key";
pub const BEARER: &str = "Bearer mp-test-key";

pub fn config_builder(server: &MockServer) -> ClientConfigBuilder {
	ClientConfig::builder().api_key(API_KEY).base_url(server.url("/wp-json/mp/v1"))
}

pub fn client(server: &MockServer) -> ReqwestMemberPressClient {
	client_with(config_builder(server))
}

pub fn client_with(builder: ClientConfigBuilder) -> ReqwestMemberPressClient {
	let config = builder.build().expect("Test configuration should be valid.");

	ReqwestMemberPressClient::new(&config).expect("Client should build inside the test runtime.")
}

pub fn client_with_ttl(server: &MockServer, ttl: Duration) -> ReqwestMemberPressClient {
	client_with(config_builder(server).cache_timeout(ttl))
}

pub fn api_path(path: &str) -> String {
	format!("/wp-json/mp/v1{path}")
}

pub fn member_json(id: u64, first_name: &str) -> Value {
	json!({
		"id": id,
		"email": format!("member-{id}@example.com"),
		"firstName": first_name,
		"lastName": "User",
		"status": "active",
		"subscriptions": [],
		"createdAt": "2024-02-20T00:00:00Z",
		"updatedAt": "2024-02-21T08:30:00Z"
	})
}

pub fn subscription_json(id: u64, status: &str) -> Value {
	json!({
		"id": id,
		"memberId": 1,
		"planId": 1,
		"status": status,
		"startDate": "2024-01-01T00:00:00Z",
		"paymentMethod": { "id": 4, "type": "card", "lastFour": "4242" }
	})
}

pub fn transaction_json(id: u64, kind: &str, amount: f64) -> Value {
	json!({
		"id": id,
		"memberId": 1,
		"subscriptionId": 1,
		"amount": amount,
		"currency": "USD",
		"status": "completed",
		"type": kind,
		"createdAt": "2024-02-20T00:00:00Z"
	})
}
