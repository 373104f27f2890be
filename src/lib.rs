// src/lib.rs

pub mod client;
pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod menu;
pub mod middleware;
pub mod models;
pub mod notify;
pub mod payments;
pub mod routes;
pub mod services;
pub mod session;
