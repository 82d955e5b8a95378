pub mod command;
pub mod config;
pub mod events;
pub mod runtime;
pub mod stage;
pub mod timeline;
