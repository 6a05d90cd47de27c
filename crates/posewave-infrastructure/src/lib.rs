// Infrastructure layer - HTTP clients, persistence, logging
// Implements the domain ports against the hosted services and SQLite

pub mod camera;
pub mod config;
pub mod events;
pub mod http;
pub mod logging;
pub mod persistence;
pub mod remote;
