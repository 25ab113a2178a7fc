//! Main entry point for the atelier service.
//!
//! This binary wires the order workflow engine to its configured store and
//! directory backends and exposes the role-gated dispatcher over HTTP. It
//! uses a modular architecture with pluggable implementations selected by
//! name from the configuration file.

use atelier_config::Config;
use atelier_core::WorkflowEngine;
use atelier_directory::DirectoryService;
use atelier_store::StoreService;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

/// Command-line arguments for the atelier service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the atelier service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the workflow engine with the configured backends
/// 5. Serves the HTTP dispatcher until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.init();

	tracing::info!("Started atelier");

	// Load configuration
	let config_path = args
		.config
		.to_str()
		.ok_or("configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.workshop.id);

	let engine = Arc::new(build_engine(&config)?);

	match config.api {
		Some(api) if api.enabled => {
			server::start_server(api, engine).await?;
		}
		_ => {
			tracing::warn!("API is disabled in the configuration - nothing to serve");
		}
	}

	tracing::info!("Stopped atelier");
	Ok(())
}

/// Builds the workflow engine from the configured backend implementations.
fn build_engine(config: &Config) -> Result<WorkflowEngine, Box<dyn std::error::Error>> {
	// Create the order store backend
	let store_factory = atelier_store::get_all_implementations()
		.into_iter()
		.find(|(name, _)| *name == config.store.primary)
		.map(|(_, factory)| factory)
		.ok_or_else(|| format!("unknown store implementation '{}'", config.store.primary))?;
	let store_config = config
		.store
		.implementations
		.get(&config.store.primary)
		.cloned()
		.ok_or_else(|| format!("missing configuration for store '{}'", config.store.primary))?;
	let store_backend = store_factory(&store_config)?;
	tracing::info!(component = "store", implementation = %config.store.primary, "Loaded");

	// Create the craftsman directory backend
	let directory_factory = atelier_directory::get_all_implementations()
		.into_iter()
		.find(|(name, _)| *name == config.directory.primary)
		.map(|(_, factory)| factory)
		.ok_or_else(|| {
			format!(
				"unknown directory implementation '{}'",
				config.directory.primary
			)
		})?;
	let directory_config = config
		.directory
		.implementations
		.get(&config.directory.primary)
		.cloned()
		.ok_or_else(|| {
			format!(
				"missing configuration for directory '{}'",
				config.directory.primary
			)
		})?;
	let directory_backend = directory_factory(&directory_config)?;
	tracing::info!(component = "directory", implementation = %config.directory.primary, "Loaded");

	Ok(WorkflowEngine::new(
		Arc::new(StoreService::new(store_backend)),
		Arc::new(DirectoryService::new(directory_backend)),
	))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn builds_engine_from_memory_config() {
		let config: Config = r#"
[workshop]
id = "atelier-test"

[store]
primary = "memory"
[store.implementations.memory]

[directory]
primary = "memory"
[directory.implementations.memory]
[[directory.implementations.memory.partners]]
id = 1
bp_code = "BP01"
business_name = "Silverline"
full_name = "A. Smith"
role = "CRAFTSMAN"
"#
		.parse()
		.unwrap();

		let engine = build_engine(&config).unwrap();
		let craftsmen = engine.available_craftsmen().await.unwrap();
		assert_eq!(craftsmen.len(), 1);
		assert_eq!(craftsmen[0].bp_code, "BP01-Silverline");
	}

	#[test]
	fn unknown_backend_is_rejected() {
		let config: Config = r#"
[workshop]
id = "atelier-test"

[store]
primary = "memory"
[store.implementations.memory]

[directory]
primary = "memory"
[directory.implementations.memory]
"#
		.parse()
		.unwrap();

		let mut broken = config.clone();
		broken.store.primary = "postgres".to_string();
		broken
			.store
			.implementations
			.insert("postgres".to_string(), toml::Value::Table(Default::default()));
		assert!(build_engine(&broken).is_err());
	}
}
