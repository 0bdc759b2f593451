pub mod api;
pub mod config;
pub mod error;
pub mod http_cache;
pub mod http_client;
pub mod model;
pub mod positions;
pub mod provider;
pub mod session;
pub mod sortable;
pub mod stat_ranker;
pub mod state;
