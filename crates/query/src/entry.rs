use serde::{Deserialize, Serialize};

/// File type tag the change-detection layer may attach to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
	BlockDevice,
	CharDevice,
	Directory,
	Regular,
	Symlink,
	Fifo,
	Socket,
	Door,
}

impl FileType {
	/// Maps the single-letter tag used by `type` expression terms.
	#[must_use]
	pub const fn from_tag(tag: char) -> Option<Self> {
		match tag {
			'b' => Some(Self::BlockDevice),
			'c' => Some(Self::CharDevice),
			'd' => Some(Self::Directory),
			'f' => Some(Self::Regular),
			'l' => Some(Self::Symlink),
			'p' => Some(Self::Fifo),
			's' => Some(Self::Socket),
			'D' => Some(Self::Door),
			_ => None,
		}
	}
}

/// One filesystem item known to a watch, as a non-empty sequence of path
/// segments relative to the watch root (or to the active relative root once
/// re-based through [`WatchScope::rebase`]), plus an optional file type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedEntry {
	segments: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	file_type: Option<FileType>,
}

impl TrackedEntry {
	/// Returns `None` when `segments` is empty or any segment is empty.
	pub fn new(segments: impl IntoIterator<Item = impl Into<String>>) -> Option<Self> {
		let segments = segments
			.into_iter()
			.map(Into::into)
			.collect::<Vec<String>>();

		(!segments.is_empty() && segments.iter().all(|segment| !segment.is_empty())).then_some(
			Self {
				segments,
				file_type: None,
			},
		)
	}

	/// Builds an entry from a `/`-joined path relative to the watch root.
	pub fn from_wholename(wholename: &str) -> Option<Self> {
		Self::new(wholename.split('/'))
	}

	/// Attaches the file type reported by the watch for this entry.
	#[must_use]
	pub fn with_file_type(mut self, file_type: FileType) -> Self {
		self.file_type = Some(file_type);
		self
	}

	#[must_use]
	pub const fn file_type(&self) -> Option<FileType> {
		self.file_type
	}

	#[must_use]
	pub fn segments(&self) -> &[String] {
		&self.segments
	}

	/// Last path segment.
	#[must_use]
	pub fn basename(&self) -> &str {
		self.segments.last().map_or("", String::as_str)
	}

	/// The entry's path relative to the active scope, joined with `/`.
	#[must_use]
	pub fn wholename(&self) -> String {
		self.segments.join("/")
	}

	/// Segments of the entry's containing directory, which is empty for
	/// entries sitting directly under the scope root.
	#[must_use]
	pub fn parent_segments(&self) -> &[String] {
		self.segments
			.split_last()
			.map_or(&[][..], |(_, parent)| parent)
	}
}

/// The root directory under observation, optionally narrowed to a
/// subdirectory for one query.
///
/// When a relative root is set, entries outside that subtree are invisible
/// and all path comparisons use paths relative to the subtree. Filtering
/// happens before expression evaluation, never inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchScope {
	relative_root: Option<Vec<String>>,
}

impl WatchScope {
	#[must_use]
	pub const fn root() -> Self {
		Self {
			relative_root: None,
		}
	}

	#[must_use]
	pub const fn with_relative_root(segments: Vec<String>) -> Self {
		Self {
			relative_root: Some(segments),
		}
	}

	/// Re-bases `entry` onto this scope, returning `None` for entries that
	/// fall outside an active relative root. An entry whose path equals the
	/// relative root itself is also excluded, as the scope names its
	/// containing directory.
	#[must_use]
	pub fn rebase(&self, entry: &TrackedEntry) -> Option<TrackedEntry> {
		let Some(prefix) = &self.relative_root else {
			return Some(entry.clone());
		};

		let segments = entry.segments();
		(segments.len() > prefix.len() && segments[..prefix.len()] == prefix[..]).then(|| {
			TrackedEntry {
				segments: segments[prefix.len()..].to_vec(),
				file_type: entry.file_type,
			}
		})
	}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;

	#[test]
	fn entry_invariants() {
		assert!(TrackedEntry::new(Vec::<String>::new()).is_none());
		assert!(TrackedEntry::from_wholename("a//b").is_none());

		let entry = TrackedEntry::from_wholename("sub/dir/file.txt").unwrap();
		assert_eq!(entry.basename(), "file.txt");
		assert_eq!(entry.wholename(), "sub/dir/file.txt");
		assert_eq!(entry.parent_segments(), ["sub", "dir"]);

		let top = TrackedEntry::from_wholename("file.txt").unwrap();
		assert!(top.parent_segments().is_empty());
	}

	#[test]
	fn rebase_at_watch_root_is_identity() {
		let entry = TrackedEntry::from_wholename("sub/file.txt").unwrap();
		assert_eq!(WatchScope::root().rebase(&entry), Some(entry));
	}

	#[test]
	fn file_type_tag_is_optional_and_survives_rebase() {
		let untyped = TrackedEntry::from_wholename("sub/file.txt").unwrap();
		assert_eq!(untyped.file_type(), None);

		let scope = WatchScope::with_relative_root(vec!["sub".to_string()]);
		let typed = untyped.with_file_type(FileType::Regular);
		let rebased = scope.rebase(&typed).unwrap();

		assert_eq!(rebased.wholename(), "file.txt");
		assert_eq!(rebased.file_type(), Some(FileType::Regular));
	}

	#[test]
	fn rebase_strips_relative_root() {
		let scope = WatchScope::with_relative_root(vec!["sub".to_string()]);

		let inside = TrackedEntry::from_wholename("sub/dir/file.txt").unwrap();
		assert_eq!(
			scope.rebase(&inside),
			TrackedEntry::from_wholename("dir/file.txt")
		);

		let outside = TrackedEntry::from_wholename("other/file.txt").unwrap();
		assert_eq!(scope.rebase(&outside), None);

		// The subtree root itself is not a member of the scope.
		let root_itself = TrackedEntry::from_wholename("sub").unwrap();
		assert_eq!(scope.rebase(&root_itself), None);

		// "subdir" must not be mistaken for "sub/dir".
		let sibling = TrackedEntry::from_wholename("subdir/file.txt").unwrap();
		assert_eq!(scope.rebase(&sibling), None);
	}
}
