pub mod aws_clients;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod startup;
pub mod storage;

use service::MemeService;

/// AppState holds shared resources for the web server.
#[derive(Clone)]
pub struct AppState {
    pub service: MemeService,
}
