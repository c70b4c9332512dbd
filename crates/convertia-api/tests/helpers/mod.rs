//! Test helpers: build AppState and router for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use convertia_api::auth::StaticCredentials;
use convertia_api::setup::routes;
use convertia_api::state::AppState;
use convertia_core::Config;

pub const TEST_USERNAME: &str = "alice";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn test_server() -> TestServer {
    test_server_with_config(Config::default())
}

pub fn test_server_with_config(config: Config) -> TestServer {
    let (server, _) = test_server_with_state(config);
    server
}

/// Variant that also hands back the state so tests can inspect the
/// trackers behind the endpoints.
pub fn test_server_with_state(config: Config) -> (TestServer, AppState) {
    let credentials = Arc::new(StaticCredentials::new(TEST_USERNAME, TEST_PASSWORD));
    let state = AppState::new(config, credentials);
    let router = routes::build_router(state.clone()).expect("build router");
    let server = TestServer::new(router).expect("start test server");
    (server, state)
}

/// Multipart form with a single `file` field.
pub fn file_form(filename: &str, bytes: Vec<u8>, mime: &str) -> MultipartForm {
    let part = Part::bytes(bytes).file_name(filename).mime_type(mime);
    MultipartForm::new().add_part("file", part)
}
