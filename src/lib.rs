pub mod config;
pub mod error;
pub mod llm;
pub mod routes;
pub mod server;
pub mod state;
pub mod translate;
