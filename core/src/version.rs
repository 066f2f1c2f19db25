use indexmap::IndexMap;
use lookout_capabilities::{CapabilityRegistry, NegotiationResult};
use serde::{Deserialize, Serialize};

/// Capability lists a client may attach to a `version` request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapabilityOptions {
	#[serde(default)]
	pub required: Vec<String>,
	#[serde(default)]
	pub optional: Vec<String>,
}

/// Response of the `version` command.
///
/// `capabilities` and `error` only appear when the client attached
/// capability lists; a plain version request answers with the bare version
/// string.
#[derive(Debug, Clone, Serialize)]
pub struct VersionResponse {
	pub version: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub capabilities: Option<IndexMap<String, bool>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

/// Answers a `version` request, negotiating capabilities when asked.
///
/// A failing required capability is advisory here: the response still
/// carries the full capability map and the caller decides whether to treat
/// the error as fatal.
#[must_use]
pub fn version(
	registry: &CapabilityRegistry,
	server_version: &str,
	options: Option<&CapabilityOptions>,
) -> VersionResponse {
	match options {
		None => VersionResponse {
			version: server_version.to_string(),
			capabilities: None,
			error: None,
		},
		Some(options) => {
			let NegotiationResult {
				version,
				capabilities,
				error,
			} = capability_check(registry, server_version, options);

			VersionResponse {
				version,
				capabilities: Some(capabilities),
				error,
			}
		}
	}
}

/// Convenience call resolving the same lists as [`version`] and returning
/// the bare negotiation result.
#[must_use]
pub fn capability_check(
	registry: &CapabilityRegistry,
	server_version: &str,
	options: &CapabilityOptions,
) -> NegotiationResult {
	registry.negotiate(server_version, &options.required, &options.optional)
}
