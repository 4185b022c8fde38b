use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    /// Amazon S3 or an S3-compatible endpoint
    Aws,
    /// In-process fake, for local runs
    Memory,
}

#[derive(Debug, Parser)]
#[command(name = "s3driver", version, about = "Stateless S3 bucket resource driver")]
pub struct Cli {
    #[arg(long, env = "S3DRIVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Default tracing directive; RUST_LOG takes precedence when set.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[arg(long, env = "S3DRIVER_STORAGE", value_enum, default_value_t = StorageKind::Aws)]
    pub storage: StorageKind,

    #[arg(long, env = "S3DRIVER_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    #[arg(long, env = "S3DRIVER_BUCKET_WAIT_SECS", default_value_t = 60)]
    pub bucket_wait_secs: u64,

    #[arg(long, env = "S3DRIVER_REQUEST_TIMEOUT_SECS", default_value_t = 120)]
    pub request_timeout_secs: u64,

    #[arg(long, env = "S3DRIVER_SPEC_PATH", default_value = "./openapi/spec.json")]
    pub spec_path: PathBuf,
}

impl Cli {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn bucket_wait(&self) -> Duration {
        Duration::from_secs(self.bucket_wait_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
