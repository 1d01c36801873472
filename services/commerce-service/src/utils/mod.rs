// /commerce/services/commerce-service/src/utils/mod.rs
pub mod error;
pub mod validator;
pub mod constants;
pub mod logger;
pub mod cors;
pub mod scheduler;
pub mod banner;

pub use constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
