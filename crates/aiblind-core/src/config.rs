//! Configuration module
//!
//! Server, directory layout, external protection tool and retention settings,
//! loaded from the environment (and an optional `.env` file).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const SERVER_PORT: u16 = 3000;
const CLEANUP_DELAY_SECS: u64 = 30 * 60;
const MAX_UPLOAD_SIZE_MB: usize = 20;
const UPLOADS_DIR: &str = "uploads";
const PROCESSED_DIR: &str = "processed";
const PROTECTOR_COMMAND: &str = "./venv/bin/python3 fawkes.py";

/// Output format of the log subscriber
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, anyhow::Error> {
        match value.trim().to_lowercase().as_str() {
            "text" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                other
            )),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Staged uploads and published copies (served under `/uploads`)
    pub uploads_dir: PathBuf,
    /// Raw outputs of the protection tool (served under `/processed`)
    pub processed_dir: PathBuf,
    /// Program of the external protection tool
    pub protector_program: String,
    /// Arguments placed before `<input> <output>` on the tool command line
    pub protector_args: Vec<String>,
    pub cleanup_delay: Duration,
    pub max_upload_size_bytes: usize,
    pub client_build_dir: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let (protector_program, protector_args) = parse_command(
            &env::var("PROTECTOR_COMMAND").unwrap_or_else(|_| PROTECTOR_COMMAND.to_string()),
        )?;

        let cleanup_delay_secs = env::var("CLEANUP_DELAY_SECS")
            .unwrap_or_else(|_| CLEANUP_DELAY_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("CLEANUP_DELAY_SECS must be a whole number of seconds"))?;

        let max_upload_size_bytes = parse_upload_size(
            &env::var("MAX_UPLOAD_SIZE_MB").unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string()),
        )?;

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            uploads_dir: env::var("UPLOADS_DIR")
                .unwrap_or_else(|_| UPLOADS_DIR.to_string())
                .into(),
            processed_dir: env::var("PROCESSED_DIR")
                .unwrap_or_else(|_| PROCESSED_DIR.to_string())
                .into(),
            protector_program,
            protector_args,
            cleanup_delay: Duration::from_secs(cleanup_delay_secs),
            max_upload_size_bytes,
            client_build_dir: env::var("CLIENT_BUILD_DIR").ok().map(PathBuf::from),
            log_format: LogFormat::parse(&env::var("LOG_FORMAT").unwrap_or_default())?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.uploads_dir == self.processed_dir {
            return Err(anyhow::anyhow!(
                "UPLOADS_DIR and PROCESSED_DIR must be different directories"
            ));
        }

        if self.cleanup_delay.is_zero() {
            return Err(anyhow::anyhow!("CLEANUP_DELAY_SECS must be greater than zero"));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than zero"));
        }

        Ok(())
    }
}

/// Parse a size in megabytes into bytes.
pub fn parse_upload_size(value: &str) -> Result<usize, anyhow::Error> {
    let megabytes = value
        .trim()
        .parse::<usize>()
        .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be a whole number of megabytes"))?;
    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large"))
}

/// Split a command line into program and leading arguments.
pub fn parse_command(command: &str) -> Result<(String, Vec<String>), anyhow::Error> {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts
        .next()
        .ok_or_else(|| anyhow::anyhow!("PROTECTOR_COMMAND must not be empty"))?;
    Ok((program, parts.collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            server_port: 3000,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            uploads_dir: "uploads".into(),
            processed_dir: "processed".into(),
            protector_program: "python3".to_string(),
            protector_args: vec!["fawkes.py".to_string()],
            cleanup_delay: Duration::from_secs(1800),
            max_upload_size_bytes: 1024,
            client_build_dir: None,
            log_format: LogFormat::Text,
        }
    }

    #[test]
    fn test_parse_command_splits_program_and_args() {
        let (program, args) = parse_command("./venv/bin/python3  fawkes.py --fast").unwrap();
        assert_eq!(program, "./venv/bin/python3");
        assert_eq!(args, vec!["fawkes.py", "--fast"]);
    }

    #[test]
    fn test_parse_upload_size() {
        assert_eq!(parse_upload_size("20").unwrap(), 20 * 1024 * 1024);
        assert_eq!(parse_upload_size(" 1 ").unwrap(), 1024 * 1024);
        assert!(parse_upload_size("twenty").is_err());
        assert!(parse_upload_size("-5").is_err());
        assert!(parse_upload_size(&usize::MAX.to_string()).is_err());
    }

    #[test]
    fn test_parse_command_rejects_empty() {
        assert!(parse_command("   ").is_err());
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let mut config = test_config();
        assert!(config.validate().is_ok());

        config.environment = "Production".to_string();
        assert!(config.is_production());
        assert!(config.validate().is_err());

        config.cors_origins = vec!["https://aiblind.example".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_same_directories_rejected() {
        let mut config = test_config();
        config.processed_dir = config.uploads_dir.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("").unwrap(), LogFormat::Text);
        assert_eq!(LogFormat::parse("JSON").unwrap(), LogFormat::Json);
        assert!(LogFormat::parse("yaml").is_err());
    }
}
