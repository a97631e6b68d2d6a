//! Remote collaborator implementations

pub mod advice;
pub mod exchange_rate_api;
