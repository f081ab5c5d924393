//! Infrastructure services

mod console_service;

pub use console_service::{ActionOutcome, ConsoleService, ConsoleServiceConfig};
