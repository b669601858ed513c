//! record-service: stores caller-supplied JSON records in MongoDB and returns
//! them unchanged.
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
