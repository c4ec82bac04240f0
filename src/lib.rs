pub mod evaluate;
pub mod fake_feed;
pub mod lineup_fetch;
pub mod monitor;
pub mod registry;
pub mod state;
pub mod stats_normalize;
