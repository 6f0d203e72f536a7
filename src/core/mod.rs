pub mod context;
pub mod graph;
pub mod models;
pub mod schedule;
pub mod types;
