//! Port traits: the seams between the domain and the outside world.

pub mod config_port;
pub mod feed_port;
pub mod trade_log_port;
