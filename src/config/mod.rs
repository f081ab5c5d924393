//! Configuration loading

mod app_config;

pub use app_config::{
    ApiConfig, AppConfig, ConsoleConfig, LogFormat, LoggingConfig, API_URL_ENV,
};
