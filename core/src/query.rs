use async_trait::async_trait;
use lookout_query::{Expression, QueryParseError, TrackedEntry, WatchScope};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Fields a query may project for each matched entry.
const SUPPORTED_FIELDS: &[&str] = &["name", "depth"];

#[derive(Error, Debug)]
pub enum QueryError {
	#[error(transparent)]
	Parse(#[from] QueryParseError),
	#[error("unknown field name '{0}'")]
	UnknownField(String),
	#[error("relative_root '{0}' must name a subdirectory of the watch root")]
	InvalidRelativeRoot(String),
	#[error("failed to enumerate tracked entries: {0}")]
	EntrySource(String),
}

/// Snapshot interface to the watch subsystem.
///
/// Implementations return every entry currently tracked under the watch
/// root, as paths relative to that root. The snapshot is treated as an
/// immutable view for the duration of one query.
#[async_trait]
pub trait EntrySource: Send + Sync {
	async fn list_entries(&self) -> Result<Vec<TrackedEntry>, QueryError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryOptions {
	/// Raw expression term; a missing expression matches every entry.
	#[serde(default)]
	pub expression: Option<Value>,
	#[serde(default = "default_fields")]
	pub fields: Vec<String>,
	/// Subdirectory of the watch root that narrows visibility and re-bases
	/// wholename comparisons for this query.
	#[serde(default)]
	pub relative_root: Option<String>,
}

impl Default for QueryOptions {
	fn default() -> Self {
		Self {
			expression: None,
			fields: default_fields(),
			relative_root: None,
		}
	}
}

fn default_fields() -> Vec<String> {
	vec!["name".to_string()]
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
	pub files: Vec<Value>,
}

/// Runs one query against the entry snapshot.
///
/// Compilation and validation happen once up front; any failure aborts the
/// query with no partial results. Scope filtering is applied before the
/// expression ever sees an entry, so entries outside an active
/// `relative_root` never match regardless of the expression.
pub async fn run_query(
	source: &dyn EntrySource,
	options: &QueryOptions,
) -> Result<QueryResponse, QueryError> {
	let scope = options
		.relative_root
		.as_deref()
		.map(parse_relative_root)
		.transpose()?
		.map_or_else(WatchScope::root, WatchScope::with_relative_root);

	let expression = options
		.expression
		.as_ref()
		.map(Expression::parse)
		.transpose()?;

	for field in &options.fields {
		if !SUPPORTED_FIELDS.contains(&field.as_str()) {
			return Err(QueryError::UnknownField(field.clone()));
		}
	}

	let entries = source.list_entries().await?;
	let total = entries.len();

	let files = entries
		.iter()
		.filter_map(|entry| scope.rebase(entry))
		.filter(|entry| {
			expression
				.as_ref()
				.map_or(true, |expression| expression.matches(entry))
		})
		.map(|entry| project(&entry, &options.fields))
		.collect::<Vec<_>>();

	debug!(total, matched = files.len(), "query evaluated");

	Ok(QueryResponse { files })
}

/// A `relative_root` must be a relative path strictly inside the watch root.
fn parse_relative_root(raw: &str) -> Result<Vec<String>, QueryError> {
	let invalid = || QueryError::InvalidRelativeRoot(raw.to_string());

	if raw.is_empty() || raw.starts_with('/') {
		return Err(invalid());
	}

	raw.split('/')
		.map(|segment| match segment {
			"" | "." | ".." => Err(invalid()),
			_ => Ok(segment.to_string()),
		})
		.collect()
}

fn project(entry: &TrackedEntry, fields: &[String]) -> Value {
	// A bare "name" projection keeps the compact wire shape of a plain
	// string list.
	if matches!(fields, [field] if field == "name") {
		return Value::String(entry.wholename());
	}

	Value::Object(
		fields
			.iter()
			.map(|field| {
				let value = match field.as_str() {
					"name" => Value::String(entry.wholename()),
					// Validated in `run_query`.
					_ => Value::from(entry.parent_segments().len()),
				};
				(field.clone(), value)
			})
			.collect::<Map<_, _>>(),
	)
}
