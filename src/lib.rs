pub mod config;
pub mod enums;
pub mod error;
pub mod rules;
pub mod db;
pub mod providers;
pub mod checkers;
pub mod services;
pub mod api;
pub mod scheduler;
pub mod alert_checker;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use enums::{ NewsWindow, RuleKind, RuleType };
pub use error::{ AppError, Result };
