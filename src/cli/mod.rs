//! Terminal presentation views

pub mod chart;
pub mod convert;
pub mod dashboard;
pub mod rates;
pub mod setup;
pub mod ui;
