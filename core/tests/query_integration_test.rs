use async_trait::async_trait;
use lookout_core::{
	capability_check, run_query, version, CapabilityOptions, CapabilityRegistry, EntrySource,
	FileType, QueryError, QueryOptions, TrackedEntry,
};
use serde_json::json;
use tracing_test::traced_test;

struct SnapshotSource(Vec<TrackedEntry>);

#[async_trait]
impl EntrySource for SnapshotSource {
	async fn list_entries(&self) -> Result<Vec<TrackedEntry>, QueryError> {
		Ok(self.0.clone())
	}
}

fn snapshot(wholenames: &[&str]) -> SnapshotSource {
	SnapshotSource(
		wholenames
			.iter()
			.map(|wholename| TrackedEntry::from_wholename(wholename).expect("valid test path"))
			.collect(),
	)
}

fn expression_query(expression: serde_json::Value) -> QueryOptions {
	QueryOptions {
		expression: Some(expression),
		..Default::default()
	}
}

async fn matched_names(source: &SnapshotSource, options: &QueryOptions) -> Vec<String> {
	run_query(source, options)
		.await
		.expect("query should succeed")
		.files
		.iter()
		.map(|file| file.as_str().expect("name projection").to_string())
		.collect()
}

#[tokio::test]
#[traced_test]
async fn dirname_and_name_conjunction_selects_nested_entry() {
	let source = snapshot(&["a", "0/a", "0/0/a"]);

	let names = matched_names(
		&source,
		&expression_query(json!([
			"allof",
			["dirname", "0", ["depth", "gt", 0]],
			["name", "a"]
		])),
	)
	.await;

	assert_eq!(names, ["0/0/a"]);
	assert!(logs_contain("query evaluated"));
}

#[tokio::test]
async fn dirname_depth_ladder() {
	// One entry named "a" at every level of a five-deep chain of "1"s.
	let source = snapshot(&["a", "1/a", "1/1/a", "1/1/1/a", "1/1/1/1/a", "1/1/1/1/1/a"]);

	let ladder: &[(i64, &[&str])] = &[
		(0, &["1/1/a", "1/1/1/a", "1/1/1/1/a", "1/1/1/1/1/a"]),
		(1, &["1/1/1/a", "1/1/1/1/a", "1/1/1/1/1/a"]),
		(2, &["1/1/1/1/a", "1/1/1/1/1/a"]),
		(3, &["1/1/1/1/1/a"]),
		(4, &[]),
	];

	for (depth, expect) in ladder {
		let names = matched_names(
			&source,
			&expression_query(json!([
				"allof",
				["dirname", "1", ["depth", "gt", depth]],
				["name", "a"]
			])),
		)
		.await;

		assert_eq!(&names, expect, "depth gt {depth}");
	}

	// No depth clause means any depth under the prefix.
	let names = matched_names(&source, &expression_query(json!(["dirname", "1"]))).await;
	assert_eq!(
		names,
		["1/a", "1/1/a", "1/1/1/a", "1/1/1/1/a", "1/1/1/1/1/a"]
	);
}

#[tokio::test]
async fn type_term_selects_tagged_entries() {
	let source = SnapshotSource(vec![
		TrackedEntry::from_wholename("src")
			.expect("valid test path")
			.with_file_type(FileType::Directory),
		TrackedEntry::from_wholename("src/main.rs")
			.expect("valid test path")
			.with_file_type(FileType::Regular),
		TrackedEntry::from_wholename("src/lib.rs")
			.expect("valid test path")
			.with_file_type(FileType::Regular),
	]);

	let names = matched_names(&source, &expression_query(json!(["type", "d"]))).await;
	assert_eq!(names, ["src"]);

	let names = matched_names(
		&source,
		&expression_query(json!(["allof", ["type", "f"], ["dirname", "src"]])),
	)
	.await;
	assert_eq!(names, ["src/main.rs", "src/lib.rs"]);
}

#[tokio::test]
async fn absent_pattern_yields_empty_result_not_error() {
	let source = snapshot(&["foo.c", "subdir/bar.txt"]);

	let names = matched_names(&source, &expression_query(json!(["name", "nope.c"]))).await;

	assert!(names.is_empty());
}

#[tokio::test]
async fn entries_outside_relative_root_never_match() {
	let source = snapshot(&["foo.c", "subdir/bar.txt", "other/foo.c"]);

	// Even a basename match cannot surface an out-of-scope entry.
	let options = QueryOptions {
		expression: Some(json!(["name", "foo.c"])),
		relative_root: Some("subdir".to_string()),
		..Default::default()
	};

	let names = matched_names(&source, &options).await;
	assert!(names.is_empty());
}

#[tokio::test]
async fn version_command_round_trip() {
	let registry = CapabilityRegistry::new();

	let response = version(&registry, "4.9", None);
	let encoded = serde_json::to_value(&response).expect("serializable");
	assert_eq!(encoded, json!({"version": "4.9"}));

	let options = CapabilityOptions {
		required: vec!["term-name".to_string()],
		optional: vec!["will-never-exist".to_string()],
	};
	let response = version(&registry, "4.9", Some(&options));
	let encoded = serde_json::to_value(&response).expect("serializable");
	assert_eq!(
		encoded,
		json!({
			"version": "4.9",
			"capabilities": {"term-name": true, "will-never-exist": false}
		})
	);

	let failing = CapabilityOptions {
		required: vec!["will-never-exist".to_string()],
		optional: vec![],
	};
	let result = capability_check(&registry, "4.9", &failing);
	assert_eq!(
		result.error.as_deref(),
		Some("client required capability `will-never-exist` is not supported by this server")
	);
	assert_eq!(result.capabilities.get("will-never-exist"), Some(&false));
}
