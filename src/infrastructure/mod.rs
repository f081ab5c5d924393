//! Infrastructure layer - Backend transport, clipboard and services

pub mod backend;
pub mod clipboard;
pub mod logging;
pub mod services;
