pub mod app;
pub mod backend;
pub mod config;
pub mod db;
pub mod protocol;
