pub mod cli;
pub mod completion;
pub mod config;
pub mod errors;
pub mod extract;
pub mod fallback;
pub mod log;
pub mod plan;
pub mod profile;
pub mod prompt;
pub mod provider;
pub mod retry;
pub mod sanitize;
pub mod service;
pub mod ux;
