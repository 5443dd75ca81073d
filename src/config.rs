use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::options::{DimensionTransform, WalkerOptions};

/// Field alias map: user-facing name to storage path. A mapped name keeps
/// its user-facing name as the suggested column alias.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldAlias {
    aliases: IndexMap<String, String>,
}

impl FieldAlias {
    pub fn new(aliases: IndexMap<String, String>) -> Self {
        Self { aliases }
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn resolve(&self, name: &str) -> (String, Option<String>) {
        match self.aliases.get(name) {
            Some(path) => (path.clone(), Some(name.to_string())),
            None => (name.to_string(), None),
        }
    }

    pub fn into_transform(self) -> DimensionTransform {
        Arc::new(move |name: &str| self.resolve(name))
    }
}

/// Serialisable form of `WalkerOptions`.
///
/// ```json
/// {
///   "field_alias": { "pod_namespace": "__ext.io_kubernetes_pod_namespace" },
///   "tables": ["db.logs"],
///   "where": "dtEventTimeStamp >= 1",
///   "limit": 1000
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    pub field_alias: FieldAlias,
    pub tables: Vec<String>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    pub add_ignore_field: bool,
    pub trace: bool,
}

impl RewriteConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RewriteConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(table) = self.tables.iter().find(|table| table.trim().is_empty()) {
            return Err(ConfigError::new(format!("invalid table name '{}'", table)));
        }
        if let Some((name, _)) = self
            .field_alias
            .aliases
            .iter()
            .find(|(name, path)| name.trim().is_empty() || path.trim().is_empty())
        {
            return Err(ConfigError::new(format!("invalid field alias for '{}'", name)));
        }
        Ok(())
    }

    pub fn to_options(&self) -> WalkerOptions {
        let mut options = WalkerOptions::new().with_tables(self.tables.iter().cloned());
        if !self.field_alias.is_empty() {
            options = options.with_dimension_transform(self.field_alias.clone().into_transform());
        }
        if let Some(where_clause) = &self.where_clause {
            options = options.with_where(where_clause);
        }
        options.limit = self.limit;
        options.offset = self.offset;
        options.add_ignore_field = self.add_ignore_field;
        options.trace = self.trace;
        options
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::config::*;
    use crate::rewrite::parse_sql;

    #[test]
    pub fn test_config_from_json() {
        let json = json!({
            "field_alias": { "serverIp": "test_server_ip" },
            "tables": ["db.logs"],
            "where": "dtEventTimeStamp >= 1",
            "limit": 1000,
            "add_ignore_field": true
        });

        let config = RewriteConfig::from_json(&json.to_string()).expect("Failed to read config");
        assert_eq!(config.tables, vec!["db.logs"]);
        assert_eq!(config.where_clause.as_deref(), Some("dtEventTimeStamp >= 1"));
        assert_eq!(config.limit, Some(1000));
        assert_eq!(config.offset, None);
        assert!(config.add_ignore_field);
        assert!(!config.trace);

        let options = config.to_options();
        let sql = parse_sql("SELECT serverIp WHERE a = 1", &options).expect("Failed to rewrite");
        assert_eq!(
            sql,
            "SELECT test_server_ip AS serverIp FROM db.logs WHERE dtEventTimeStamp >= 1 AND ( a = 1 ) LIMIT 1000"
        );
    }

    #[test]
    pub fn test_config_defaults() {
        let config = RewriteConfig::from_json("{}").expect("Failed to read config");
        assert_eq!(config, RewriteConfig::default());

        let options = config.to_options();
        assert!(options.dimension_transform.is_none());
        assert!(options.tables.is_empty());
    }

    #[test]
    pub fn test_config_keeps_alias_order() {
        let config = RewriteConfig::from_json(r#"{"field_alias": {"b": "x.b", "a": "x.a"}}"#)
            .expect("Failed to read config");
        let serialized = serde_json::to_string(&config).expect("Failed to serialize config");
        assert!(serialized.starts_with(r#"{"field_alias":{"b":"x.b","a":"x.a"}"#));
        assert_eq!(config.field_alias.resolve("a"), ("x.a".to_string(), Some("a".to_string())));
        assert_eq!(config.field_alias.resolve("c"), ("c".to_string(), None));
    }

    #[test]
    pub fn test_config_errors() {
        for json in [
            r#"{"limit": -1}"#,
            r#"{"tables": "db.logs"}"#,
            r#"{"tables": [" "]}"#,
            r#"{"field_alias": {"a": ""}}"#,
            "not json",
        ] {
            match RewriteConfig::from_json(json) {
                Ok(config) => panic!("{json} should fail, got {config:?}"),
                Err(err) => assert!(err.to_string().starts_with("ConfigError: ")),
            }
        }
    }
}
