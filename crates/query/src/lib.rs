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
	clippy::cast_lossless,
	clippy::cast_possible_truncation,
	clippy::cast_possible_wrap,
	clippy::cast_precision_loss,
	clippy::cast_sign_loss,
	clippy::dbg_macro,
	clippy::deprecated_cfg_attr,
	clippy::separated_literal_suffix,
	deprecated
)]
#![forbid(deprecated_in_future)]
#![allow(clippy::missing_errors_doc)]

use thiserror::Error;

pub mod entry;
pub mod expr;

pub use entry::{FileType, TrackedEntry, WatchScope};
pub use expr::{DepthClause, Expression, PathScope, RelOp};

/// Structural or type violations found while compiling a query expression.
///
/// Every failure is reported at compile time, before any entry is examined;
/// a compiled [`Expression`] never fails during evaluation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryParseError {
	#[error("Expected array for '{0}' term")]
	ExpectedArray(&'static str),
	#[error("Invalid number of arguments for '{0}' term")]
	InvalidArgumentCount(&'static str),
	#[error("Argument {position} to '{term}' must be {expected}")]
	InvalidArgument {
		position: u8,
		term: &'static str,
		expected: &'static str,
	},
	#[error("Invalid scope '{scope}' for {term} expression")]
	InvalidScope { term: &'static str, scope: String },
	#[error("Argument 3 to 'i?dirname' must be an array of the form [\"depth\", \"<operator>\", <depth>]")]
	InvalidDepthClause,
	#[error("Invalid operator '{0}' for 'depth' term")]
	InvalidDepthOperator(String),
	#[error("\"type\" term requires a type string parameter")]
	TypeRequiresString,
	#[error("First parameter to \"type\" term must be a type string")]
	TypeParameterNotString,
	#[error("invalid type string '{0}'")]
	InvalidTypeString(String),
	#[error("First item in an expression must be a term name")]
	MissingTermName,
	#[error("Expected a string or array for expression term")]
	InvalidTermShape,
	#[error("unknown expression term '{0}'")]
	UnknownTerm(String),
}
