// /commerce/services/commerce-service/src/api/mod.rs

pub mod handlers;
pub mod routes;
