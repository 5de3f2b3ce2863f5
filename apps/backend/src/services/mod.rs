//! Services shared by the route handlers.

pub mod stats_feed;
