pub mod components;
pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod net;
pub mod page;
pub mod render;
pub mod viewport;
