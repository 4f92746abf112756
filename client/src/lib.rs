pub mod booking;
pub mod config;
pub mod connectivity;
pub mod contract;
pub mod error;
pub mod provider;
pub mod service;
pub mod state;
