pub mod cache;
pub mod charts;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod riot_api;
pub mod store;
