use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::error::RewriteError;
use crate::listener;
use crate::options::WalkerOptions;
use crate::parser::TreeParser;

/// Rewritten SQL plus the output names reported for field validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rewrite {
    pub sql: String,
    pub ignore_fields: Vec<String>,
}

/// Rewrites a Doris query, resolving field names through the options'
/// transform and applying its literal overrides.
pub fn parse_sql(query: &str, options: &WalkerOptions) -> Result<String, RewriteError> {
    rewrite(query, options).map(|rewrite| rewrite.sql)
}

pub fn rewrite(query: &str, options: &WalkerOptions) -> Result<Rewrite, RewriteError> {
    let result = rewrite_query(query, options);
    match &result {
        Ok(rewrite) => debug!(query, sql = %rewrite.sql, "rewrote doris sql"),
        Err(err) => warn!(query, detail = err.detail(), "doris sql rewrite failed"),
    }
    result
}

fn rewrite_query(query: &str, options: &WalkerOptions) -> Result<Rewrite, RewriteError> {
    let tree = TreeParser::parse(query).map_err(|err| RewriteError::parse_failure(query, err.to_string()))?;

    let walked = panic::catch_unwind(AssertUnwindSafe(|| listener::walk(&tree, options)));

    let output = match walked {
        Ok(Ok(output)) => output,
        Ok(Err(err)) => return Err(RewriteError::parse_failure(query, err.to_string())),
        Err(payload) => return Err(RewriteError::walk_panic(query, panic_message(payload.as_ref()))),
    };

    if output.walked == 0 {
        return Err(RewriteError::parse_failure(query, "no clause rendered"));
    }

    Ok(Rewrite {
        sql: output.sql(),
        ignore_fields: output.ignore_fields,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return message.to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "walk panicked".to_string()
}
