pub mod api;
pub mod app;
pub mod auth;
pub mod calendar;
pub mod cli;
pub mod core;
pub mod leads;
