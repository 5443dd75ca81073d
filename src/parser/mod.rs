pub mod query_parser;
pub use query_parser::*;

pub mod parse_error;
pub use parse_error::*;

pub mod word_comparer;
pub use word_comparer::*;

pub mod query_comparers;
pub use query_comparers::*;

pub mod token;
pub use token::*;

pub mod lexer;
pub use lexer::*;

pub mod node;
pub use node::*;

pub mod phase;
pub use phase::*;

pub mod tree_parser;
pub use tree_parser::*;

pub mod walker;
pub use walker::*;
