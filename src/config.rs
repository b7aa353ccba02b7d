use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::info;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{Result, SessionError};

pub const STORAGE_ENV: &str = "FITARCH_STORAGE";
pub const JWT_SECRET_ENV: &str = "FITARCH_JWT_SECRET";
pub const TOKEN_DAYS_ENV: &str = "FITARCH_TOKEN_DAYS";

pub const DEFAULT_STORAGE_PATH: &str = "fitarch-storage.json";
pub const DEFAULT_TOKEN_DAYS: u64 = 1;

/// Runtime settings for the command-line driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	pub storage_path: PathBuf,
	pub jwt_secret: String,
	pub token_days: u64,
}

impl Config {
	/// Build the configuration from command-line arguments (program name
	/// already removed) and an environment lookup. Returns the remaining
	/// arguments, which form the command.
	pub fn load<F>(args: &[String], env: F) -> Result<(Config, Vec<String>)>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut storage_path = env(STORAGE_ENV).map(PathBuf::from);
		let mut rest = Vec::new();

		let mut iter = args.iter();
		while let Some(arg) = iter.next() {
			if arg == "--storage" {
				let path = iter
					.next()
					.ok_or_else(|| SessionError::Config("--storage requires a path".to_string()))?;
				storage_path = Some(PathBuf::from(path));
			} else if let Some(path) = arg.strip_prefix("--storage=") {
				storage_path = Some(PathBuf::from(path));
			} else {
				rest.push(arg.clone());
			}
		}

		let token_days = match env(TOKEN_DAYS_ENV) {
			Some(days) => days.trim().parse::<u64>().map_err(|e| {
				SessionError::Config(format!("{} must be a whole number of days: {}", TOKEN_DAYS_ENV, e))
			})?,
			None => DEFAULT_TOKEN_DAYS,
		};

		let jwt_secret = match env(JWT_SECRET_ENV) {
			Some(secret) if !secret.trim().is_empty() => secret,
			_ => {
				let secret = generate_secret()?;
				info!("Generated signing secret for this run: {}", secret);
				secret
			}
		};

		let config = Config {
			storage_path: storage_path.unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH)),
			jwt_secret,
			token_days,
		};
		Ok((config, rest))
	}
}

/// Random 32-byte secret, base64 encoded.
pub fn generate_secret() -> Result<String> {
	let mut secret = [0u8; 32];
	SystemRandom::new()
		.fill(&mut secret)
		.map_err(|e| SessionError::Config(format!("Failed to generate secure secret: {:?}", e)))?;
	Ok(STANDARD.encode(secret))
}
