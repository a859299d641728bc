//! HireWave job-board client: session handling, one-time-code sign-in,
//! role routing, dashboard tables and the REST client behind them.

pub mod api_client;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod features;
pub mod models;
pub mod routing;
pub mod session;
pub mod table;
