pub mod auth;
pub mod billing_service;
pub mod menu_service;
