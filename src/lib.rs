pub mod aggregate;
pub mod cfbd;
pub mod charts;
pub mod config;
pub mod extract;
pub mod http_client;
pub mod ingest;
pub mod logging;
pub mod merge;
pub mod model;
pub mod report;
pub mod store;
pub mod venues;
pub mod weather;
