//! cldrparse - CLDR-style XML flattener
//!
//! Parses locale-data XML documents into nested insertion-ordered maps.
//! Sibling elements sharing a tag name are disambiguated by folding their
//! distinguishing attributes into the key, so downstream consumers can
//! address data with stable paths such as
//! `dates/calendars/calendar[@type="gregorian"]/months`.
//!
//! # Quick Start
//!
//! ```
//! use cldrparse::from_str;
//! # fn main() -> Result<(), cldrparse::Error> {
//! let value = from_str(r#"<dates><calendar type="gregorian">g</calendar></dates>"#)?;
//! let leaf = value
//!     .find("dates/calendar[@type=\"gregorian\"]")
//!     .and_then(|v| v.as_str());
//! assert_eq!(leaf, Some("g"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

use tracing::debug;

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod cursor;
pub use cursor::Cursor;

pub mod input;
pub use input::Input;

pub mod markup;
pub use markup::{Config, Document, Node, Parser};

pub mod value;
pub use value::{Map, Value};

pub mod flatten;
pub use flatten::{flatten, flatten_node, merge, synthesized_key, DISTINGUISHING_ATTRIBUTES};

pub mod render;
pub use render::{to_json, to_json_pretty};

/// Parse a document from a string and flatten it
pub fn from_str(s: &str) -> Result<Value> {
    let input = Input::from_str(s);
    from_input(&input, Config::default())
}

/// Parse a document from bytes and flatten it
pub fn from_bytes(bytes: &[u8]) -> Result<Value> {
    let input = Input::from_bytes(bytes);
    from_input(&input, Config::default())
}

/// Parse and flatten with a custom parser configuration
pub fn from_str_with_config(s: &str, config: Config) -> Result<Value> {
    let input = Input::from_str(s);
    from_input(&input, config)
}

/// Parse a document into its raw markup tree without flattening
pub fn parse_document(s: &str) -> Result<Document> {
    let input = Input::from_str(s);
    let mut parser = Parser::new(input.as_bytes());
    parser.parse()
}

fn from_input(input: &Input<'_>, config: Config) -> Result<Value> {
    debug!(len = input.len(), "parsing document");
    let mut parser = Parser::with_config(input.as_bytes(), config);
    let doc = parser.parse()?;
    let value = flatten(&doc);
    debug!(root = %doc.root.name, "document flattened");
    Ok(value)
}
