use dotenvy::dotenv;
use serde::Deserialize;
use validator::Validate;

use crate::model::{AnalyzerLimits, MAX_BUFFER_BYTES, MAX_STREAM_BYTES, MAX_TRIANGLES};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Prd,
}

impl Environment {
    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

fn default_max_buffer_bytes() -> u64 {
    MAX_BUFFER_BYTES
}

fn default_max_stream_bytes() -> u64 {
    MAX_STREAM_BYTES
}

fn default_max_triangles() -> u32 {
    MAX_TRIANGLES
}

fn default_request_timeout_secs() -> u64 {
    10 * 60
}

#[derive(Debug, Validate, Deserialize)]
pub struct Env {
    #[validate(range(min = 8080, max = 8090, message = "must be between 8080 and 8090"))]
    pub port: u16,

    #[serde(default)]
    pub environment: Environment,

    #[validate(range(min = 84, message = "MAX_BUFFER_BYTES must hold at least an STL header"))]
    #[serde(default = "default_max_buffer_bytes")]
    pub max_buffer_bytes: u64,

    #[validate(range(min = 84, message = "MAX_STREAM_BYTES must hold at least an STL header"))]
    #[serde(default = "default_max_stream_bytes")]
    pub max_stream_bytes: u64,

    #[validate(range(min = 1, message = "MAX_TRIANGLES must be positive"))]
    #[serde(default = "default_max_triangles")]
    pub max_triangles: u32,

    #[validate(range(min = 1, message = "REQUEST_TIMEOUT_SECS must be positive"))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Env {
    /// Reads and validates the process environment (and `.env`, if present).
    /// Exits the process on invalid configuration.
    pub fn new() -> Self {
        let _ = dotenv();

        let env: Self = envy::from_env().unwrap_or_else(|e| {
            log::error!("{}, exiting ... ", e);
            std::process::exit(1);
        });

        env.validate().unwrap_or_else(|e| {
            let message = e
                .field_errors()
                .values()
                .flat_map(|e| e.iter())
                .filter_map(|err| {
                    err.message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .or(Some(String::from("invalid value")))
                })
                .next()
                .unwrap_or(String::from("invalid value"));

            log::error!("Environment variable error: {}, exiting ... ", message);
            std::process::exit(1);
        });

        env
    }

    pub fn limits(&self) -> AnalyzerLimits {
        AnalyzerLimits {
            max_buffer_bytes: self.max_buffer_bytes,
            max_stream_bytes: self.max_stream_bytes,
            max_triangles: self.max_triangles,
        }
    }
}
