//! Markup tokenizer module

pub mod model;
pub mod parser;

pub use model::{Document, Node};
pub use parser::{Config, Parser};
