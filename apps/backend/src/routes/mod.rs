//! HTTP route handlers

pub mod achievements;
pub mod captures;
pub mod community;
pub mod connection;
pub mod identity;
pub mod stats;
pub mod tasks;
