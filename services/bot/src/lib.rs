pub mod adapters;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod web;
