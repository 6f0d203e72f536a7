pub mod config;
pub mod core;
pub mod docker;
pub mod errors;
pub mod extensions;
pub mod llm;
pub mod logging;
pub mod prompter;
pub mod scope;
pub mod store;
pub mod ui;
