// /commerce/services/commerce-service/src/middleware/mod.rs

pub mod auth;
pub mod security;
