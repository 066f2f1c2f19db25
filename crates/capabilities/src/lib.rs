#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::unnecessary_cast,
	clippy::dbg_macro,
	clippy::deprecated_cfg_attr,
	deprecated
)]
#![forbid(deprecated_in_future)]

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

mod version;

pub use version::Version;

/// Expression terms and field projections the server always implements;
/// these resolve `true` for any server version.
///
/// Watchman advertises `term-match` as its always-true marker; this server
/// does not implement the `match` term, so it advertises one marker per term
/// it actually evaluates instead.
const BASELINE_CAPABILITIES: &[&str] = &[
	"term-name",
	"term-iname",
	"term-dirname",
	"term-idirname",
	"term-type",
	"term-allof",
	"field-name",
];

/// Features that appeared at a specific server version.
const VERSIONED_CAPABILITIES: &[(&str, &str)] = &[
	("cmd-watch-project", "3.1"),
	("cmd-watch-del-all", "3.1.1"),
	("relative_root", "3.3"),
	("glob_generator", "3.13"),
];

/// How one capability name resolves against a server version.
#[derive(Debug, Clone)]
enum Resolver {
	/// Unconditionally available.
	Supported,
	/// Available from this server version onwards.
	SinceVersion(Version),
}

/// Immutable mapping from capability name to its resolution strategy.
///
/// Built once at process start and shared read-only between query-serving
/// threads; resolution never mutates it and never fails.
#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
	resolvers: HashMap<&'static str, Resolver>,
}

impl Default for CapabilityRegistry {
	fn default() -> Self {
		let mut resolvers = HashMap::with_capacity(
			BASELINE_CAPABILITIES.len() + VERSIONED_CAPABILITIES.len(),
		);

		for name in BASELINE_CAPABILITIES {
			resolvers.insert(*name, Resolver::Supported);
		}

		for (name, min_version) in VERSIONED_CAPABILITIES {
			resolvers.insert(*name, Resolver::SinceVersion(Version::parse(min_version)));
		}

		Self { resolvers }
	}
}

impl CapabilityRegistry {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Resolves one capability name against `server_version`.
	///
	/// Unrecognized names resolve `false`; asking about a capability the
	/// server has never heard of is not an error.
	#[must_use]
	pub fn resolve(&self, name: &str, server_version: &str) -> bool {
		match self.resolvers.get(name) {
			None => false,
			Some(Resolver::Supported) => true,
			Some(Resolver::SinceVersion(min_version)) => {
				&Version::parse(server_version) >= min_version
			}
		}
	}

	/// Resolves every capability the client asked about and reports whether
	/// all required ones are available.
	///
	/// The capability map preserves client declaration order, required names
	/// first, each name appearing once even if listed in both sets. A failing
	/// required capability sets `error` but never suppresses the map; only
	/// the first failure is reported.
	#[must_use]
	pub fn negotiate(
		&self,
		server_version: &str,
		required: &[String],
		optional: &[String],
	) -> NegotiationResult {
		let mut capabilities = IndexMap::with_capacity(required.len() + optional.len());

		for name in required.iter().chain(optional) {
			if !capabilities.contains_key(name.as_str()) {
				capabilities.insert(name.clone(), self.resolve(name, server_version));
			}
		}

		let error = required
			.iter()
			.find(|name| capabilities.get(name.as_str()) == Some(&false))
			.map(|name| {
				format!("client required capability `{name}` is not supported by this server")
			});

		if let Some(error) = &error {
			warn!(server_version, %error, "capability negotiation failed");
		} else {
			debug!(
				server_version,
				resolved = capabilities.len(),
				"capability negotiation succeeded"
			);
		}

		NegotiationResult {
			version: server_version.to_string(),
			capabilities,
			error,
		}
	}
}

/// Outcome of one capability negotiation, constructed once per request and
/// never mutated after return.
#[derive(Debug, Clone, Serialize)]
pub struct NegotiationResult {
	pub version: String,
	pub capabilities: IndexMap<String, bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}
