pub mod attendance;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod job_controller;
pub mod reports;
pub mod services;
pub mod students;
