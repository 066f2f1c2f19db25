use std::{io, path::Path};

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Per-root configuration file consumed (never produced) by this core.
pub const ROOT_CONFIG_FILENAME: &str = ".watchmanconfig";

/// Parsed per-root configuration mapping.
pub type RootConfig = Map<String, Value>;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("failed to read '{}': {source}", path.display())]
	Read {
		path: Box<Path>,
		#[source]
		source: io::Error,
	},
	#[error("invalid JSON in '{}': {source}", path.display())]
	Parse {
		path: Box<Path>,
		#[source]
		source: serde_json::Error,
	},
	#[error("expected a JSON object in '{}'", path.display())]
	NotAnObject { path: Box<Path> },
}

/// Looks up the per-root config mapping, returning an empty mapping when the
/// file does not exist.
pub async fn get_config(root: impl AsRef<Path>) -> Result<RootConfig, ConfigError> {
	let path = root.as_ref().join(ROOT_CONFIG_FILENAME);

	let bytes = match fs::read(&path).await {
		Ok(bytes) => bytes,
		Err(source) if source.kind() == io::ErrorKind::NotFound => {
			debug!(path = %path.display(), "no root config present");
			return Ok(RootConfig::new());
		}
		Err(source) => {
			return Err(ConfigError::Read {
				path: path.into_boxed_path(),
				source,
			})
		}
	};

	match serde_json::from_slice::<Value>(&bytes) {
		Ok(Value::Object(config)) => Ok(config),
		Ok(_) => Err(ConfigError::NotAnObject {
			path: path.into_boxed_path(),
		}),
		Err(source) => Err(ConfigError::Parse {
			path: path.into_boxed_path(),
			source,
		}),
	}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use tempfile::tempdir;

	use super::*;

	#[tokio::test]
	async fn absent_config_is_an_empty_mapping() {
		let root = tempdir().unwrap();

		let config = get_config(root.path()).await.unwrap();

		assert!(config.is_empty());
	}

	#[tokio::test]
	async fn present_config_is_returned_verbatim() {
		let root = tempdir().unwrap();
		tokio::fs::write(
			root.path().join(ROOT_CONFIG_FILENAME),
			br#"{"test-key": "test-value"}"#,
		)
		.await
		.unwrap();

		let config = get_config(root.path()).await.unwrap();

		assert_eq!(
			config.get("test-key").and_then(Value::as_str),
			Some("test-value")
		);
	}

	#[tokio::test]
	async fn malformed_config_is_a_structured_error() {
		let root = tempdir().unwrap();
		tokio::fs::write(root.path().join(ROOT_CONFIG_FILENAME), b"not json")
			.await
			.unwrap();

		assert!(matches!(
			get_config(root.path()).await.unwrap_err(),
			ConfigError::Parse { .. }
		));
	}

	#[tokio::test]
	async fn non_object_config_is_rejected() {
		let root = tempdir().unwrap();
		tokio::fs::write(root.path().join(ROOT_CONFIG_FILENAME), b"[1, 2, 3]")
			.await
			.unwrap();

		assert!(matches!(
			get_config(root.path()).await.unwrap_err(),
			ConfigError::NotAnObject { .. }
		));
	}
}
