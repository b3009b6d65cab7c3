pub mod app;
pub mod atis;
pub mod briefing;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod logging;
pub mod metar;
pub mod models;
pub mod simbrief;
pub mod ui;
