pub mod billing;
pub mod error;
pub mod push;
pub mod schedule;
pub mod services;
pub mod traits;
