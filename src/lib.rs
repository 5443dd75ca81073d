pub mod parser;

pub mod listener;

pub mod error;
pub use error::{ConfigError, RewriteError, WalkError};

pub mod options;
pub use options::{DimensionTransform, WalkerOptions};

pub mod config;
pub use config::{FieldAlias, RewriteConfig};

pub mod rewrite;
pub use rewrite::{parse_sql, rewrite, Rewrite};
