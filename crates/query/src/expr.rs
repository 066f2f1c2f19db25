use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::{FileType, QueryParseError, TrackedEntry};

/// Label used by error messages shared between the case sensitive and
/// insensitive spellings of a term family.
const NAME_LABEL: &str = "i?name";
const DIRNAME_LABEL: &str = "i?dirname";

/// Which entry path a `name` pattern is compared against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathScope {
	#[default]
	Basename,
	Wholename,
}

/// Comparison operator of a `depth` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
	Eq,
	Ne,
	Gt,
	Ge,
	Lt,
	Le,
}

impl RelOp {
	fn parse(operator: &str) -> Option<Self> {
		match operator {
			"eq" => Some(Self::Eq),
			"ne" => Some(Self::Ne),
			"gt" => Some(Self::Gt),
			"ge" => Some(Self::Ge),
			"lt" => Some(Self::Lt),
			"le" => Some(Self::Le),
			_ => None,
		}
	}

	const fn compare(self, lhs: i64, rhs: i64) -> bool {
		match self {
			Self::Eq => lhs == rhs,
			Self::Ne => lhs != rhs,
			Self::Gt => lhs > rhs,
			Self::Ge => lhs >= rhs,
			Self::Lt => lhs < rhs,
			Self::Le => lhs <= rhs,
		}
	}
}

/// Constraint on the number of directory levels between a `dirname` prefix
/// and an entry's containing directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthClause {
	pub op: RelOp,
	pub value: i64,
}

/// A compiled query expression.
///
/// Validation happens exactly once, in [`Expression::parse`]; evaluating a
/// compiled expression against any number of entries is infallible and
/// touches no filesystem state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
	Name {
		patterns: HashSet<String>,
		scope: PathScope,
		case_sensitive: bool,
	},
	DirName {
		prefix: Vec<String>,
		depth: Option<DepthClause>,
		case_sensitive: bool,
	},
	Type(FileType),
	AllOf(Vec<Expression>),
}

impl Expression {
	/// Compiles a raw JSON expression term.
	pub fn parse(term: &Value) -> Result<Self, QueryParseError> {
		match term {
			// A bare string names a term with no arguments; the term
			// parsers reject the non-array shape with their own message.
			Value::String(name) => Self::parse_term(name, term),
			Value::Array(items) => {
				let name = items
					.first()
					.and_then(Value::as_str)
					.ok_or(QueryParseError::MissingTermName)?;
				Self::parse_term(name, term)
			}
			_ => Err(QueryParseError::InvalidTermShape),
		}
	}

	fn parse_term(name: &str, term: &Value) -> Result<Self, QueryParseError> {
		match name {
			"name" => Self::parse_name(term, true),
			"iname" => Self::parse_name(term, false),
			"dirname" => Self::parse_dirname(term, true),
			"idirname" => Self::parse_dirname(term, false),
			"type" => Self::parse_type(term),
			"allof" => Self::parse_allof(term),
			unknown => Err(QueryParseError::UnknownTerm(unknown.to_string())),
		}
	}

	fn parse_name(term: &Value, case_sensitive: bool) -> Result<Self, QueryParseError> {
		let Value::Array(args) = term else {
			return Err(QueryParseError::ExpectedArray(NAME_LABEL));
		};

		if !(2..=3).contains(&args.len()) {
			return Err(QueryParseError::InvalidArgumentCount(NAME_LABEL));
		}

		let patterns_arg_error = QueryParseError::InvalidArgument {
			position: 2,
			term: NAME_LABEL,
			expected: "either a string or an array of string",
		};

		let patterns = match &args[1] {
			Value::String(pattern) => vec![pattern.clone()],
			Value::Array(patterns) => patterns
				.iter()
				.map(|pattern| {
					pattern
						.as_str()
						.map(str::to_owned)
						.ok_or_else(|| patterns_arg_error.clone())
				})
				.collect::<Result<_, _>>()?,
			_ => return Err(patterns_arg_error),
		};

		let scope = match args.get(2) {
			None => PathScope::default(),
			Some(Value::String(scope)) => match scope.as_str() {
				"basename" => PathScope::Basename,
				"wholename" => PathScope::Wholename,
				invalid => {
					return Err(QueryParseError::InvalidScope {
						term: NAME_LABEL,
						scope: invalid.to_string(),
					})
				}
			},
			Some(_) => {
				return Err(QueryParseError::InvalidArgument {
					position: 3,
					term: NAME_LABEL,
					expected: "a string",
				})
			}
		};

		// Case folding is done once here so evaluation only folds the
		// candidate string.
		let patterns = if case_sensitive {
			patterns.into_iter().collect()
		} else {
			patterns
				.into_iter()
				.map(|pattern| pattern.to_lowercase())
				.collect()
		};

		Ok(Self::Name {
			patterns,
			scope,
			case_sensitive,
		})
	}

	fn parse_dirname(term: &Value, case_sensitive: bool) -> Result<Self, QueryParseError> {
		let Value::Array(args) = term else {
			return Err(QueryParseError::ExpectedArray(DIRNAME_LABEL));
		};

		if !(2..=3).contains(&args.len()) {
			return Err(QueryParseError::InvalidArgumentCount(DIRNAME_LABEL));
		}

		let Value::String(dir) = &args[1] else {
			return Err(QueryParseError::InvalidArgument {
				position: 2,
				term: DIRNAME_LABEL,
				expected: "a string",
			});
		};

		// The empty prefix matches every entry under the scope root.
		let prefix = if dir.is_empty() {
			Vec::new()
		} else {
			dir.split('/')
				.map(|segment| {
					if case_sensitive {
						segment.to_string()
					} else {
						segment.to_lowercase()
					}
				})
				.collect()
		};

		let depth = args.get(2).map(Self::parse_depth_clause).transpose()?;

		Ok(Self::DirName {
			prefix,
			depth,
			case_sensitive,
		})
	}

	fn parse_depth_clause(clause: &Value) -> Result<DepthClause, QueryParseError> {
		let Value::Array(parts) = clause else {
			return Err(QueryParseError::InvalidDepthClause);
		};

		if parts.len() != 3 || parts.first().and_then(Value::as_str) != Some("depth") {
			return Err(QueryParseError::InvalidDepthClause);
		}

		let Some(operator) = parts[1].as_str() else {
			return Err(QueryParseError::InvalidArgument {
				position: 2,
				term: "depth",
				expected: "a string",
			});
		};

		let op = RelOp::parse(operator)
			.ok_or_else(|| QueryParseError::InvalidDepthOperator(operator.to_string()))?;

		let value = parts[2]
			.as_i64()
			.ok_or(QueryParseError::InvalidArgument {
				position: 3,
				term: "depth",
				expected: "an integer",
			})?;

		Ok(DepthClause { op, value })
	}

	fn parse_type(term: &Value) -> Result<Self, QueryParseError> {
		let Value::Array(args) = term else {
			return Err(QueryParseError::TypeRequiresString);
		};

		let Some(tag) = args.get(1).and_then(Value::as_str) else {
			return Err(QueryParseError::TypeParameterNotString);
		};

		// Exactly one recognized tag letter.
		let mut tags = tag.chars();
		let file_type = match (tags.next(), tags.next()) {
			(Some(tag), None) => FileType::from_tag(tag),
			_ => None,
		}
		.ok_or_else(|| QueryParseError::InvalidTypeString(tag.to_string()))?;

		Ok(Self::Type(file_type))
	}

	fn parse_allof(term: &Value) -> Result<Self, QueryParseError> {
		let Value::Array(args) = term else {
			return Err(QueryParseError::ExpectedArray("allof"));
		};

		if args.len() < 2 {
			return Err(QueryParseError::InvalidArgumentCount("allof"));
		}

		let children = args[1..]
			.iter()
			.map(Self::parse)
			.collect::<Result<Vec<_>, _>>()?;

		debug!(terms = children.len(), "compiled 'allof' expression");

		Ok(Self::AllOf(children))
	}

	/// Evaluates this expression against one tracked entry.
	///
	/// The entry is expected to already be re-based onto the active scope;
	/// see [`crate::WatchScope::rebase`].
	#[must_use]
	pub fn matches(&self, entry: &TrackedEntry) -> bool {
		match self {
			Self::Name {
				patterns,
				scope,
				case_sensitive,
			} => {
				let candidate = match scope {
					PathScope::Basename => entry.basename().to_string(),
					PathScope::Wholename => entry.wholename(),
				};

				let candidate = if *case_sensitive {
					candidate
				} else {
					candidate.to_lowercase()
				};

				patterns.contains(&candidate)
			}

			Self::DirName {
				prefix,
				depth,
				case_sensitive,
			} => {
				let parent = entry.parent_segments();
				if parent.len() < prefix.len() {
					return false;
				}

				let prefix_matches =
					prefix
						.iter()
						.zip(parent)
						.all(|(prefix_segment, parent_segment)| {
							if *case_sensitive {
								prefix_segment == parent_segment
							} else {
								*prefix_segment == parent_segment.to_lowercase()
							}
						});
				if !prefix_matches {
					return false;
				}

				// Zero for entries sitting directly under the prefix, one
				// more for each additional nesting level.
				#[allow(clippy::cast_possible_wrap)]
				let entry_depth = (parent.len() - prefix.len()) as i64;

				depth.map_or(true, |DepthClause { op, value }| {
					op.compare(entry_depth, value)
				})
			}

			// Entries with no recorded file type never satisfy a type term.
			Self::Type(file_type) => entry.file_type() == Some(*file_type),

			Self::AllOf(children) => children.iter().all(|child| child.matches(entry)),
		}
	}
}
