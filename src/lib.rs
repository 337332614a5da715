pub mod analytics;
pub mod api;
pub mod auth;
pub mod booking;
pub mod config;
pub mod db;
pub mod documents;
pub mod inventory;
pub mod models;
