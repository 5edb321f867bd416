pub mod config;
pub mod connections;
pub mod health;
pub mod monitor;
pub mod notifications;
pub mod storages;
