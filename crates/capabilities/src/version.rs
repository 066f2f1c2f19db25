use std::cmp::Ordering;

/// Dotted numeric server version, totally ordered by componentwise numeric
/// comparison with missing components treated as zero (`"3.3" == "3.3.0"`).
///
/// Parsing never fails: non-numeric components compare as zero, so capability
/// resolution stays deterministic for any input string.
#[derive(Debug, Clone)]
pub struct Version(Vec<u64>);

impl Version {
	#[must_use]
	pub fn parse(version: &str) -> Self {
		Self(
			version
				.split('.')
				.map(|component| component.parse().unwrap_or(0))
				.collect(),
		)
	}

	fn component(&self, index: usize) -> u64 {
		self.0.get(index).copied().unwrap_or(0)
	}
}

impl PartialEq for Version {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other).is_eq()
	}
}

impl Eq for Version {}

impl Ord for Version {
	fn cmp(&self, other: &Self) -> Ordering {
		(0..self.0.len().max(other.0.len()))
			.map(|index| self.component(index).cmp(&other.component(index)))
			.find(|ordering| ordering.is_ne())
			.unwrap_or(Ordering::Equal)
	}
}

impl PartialOrd for Version {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
