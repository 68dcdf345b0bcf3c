pub mod cli;
pub mod config;
pub mod error;
pub mod items;
pub mod logging;
pub mod prices;
pub mod web;
