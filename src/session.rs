// src/session.rs

pub mod subscription;

pub use subscription::{Phase, SessionUser, SubscriptionApi, SubscriptionContext};
