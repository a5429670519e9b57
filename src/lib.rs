pub mod cache;
pub mod config;
pub mod database;
pub mod entities;
pub mod errors;
pub mod geohash;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod services;
pub mod utils;
pub mod web;
