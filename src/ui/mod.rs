//! Terminal chat view

pub mod app;
pub mod conversation;

pub use app::run;
