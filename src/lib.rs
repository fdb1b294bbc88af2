pub mod config;
pub mod dispatch;
pub mod document;
pub mod errors;
pub mod identity;
pub mod outcome;
pub mod preview;
pub mod store;

pub mod services;
