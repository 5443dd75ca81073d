use std::fmt::Debug;
use std::sync::Arc;

/// Maps a user-facing column name to `(storage path, suggested alias)`.
pub type DimensionTransform = Arc<dyn Fn(&str) -> (String, Option<String>) + Send + Sync>;

/// Per-call options for the rewriter. Literal overrides replace or merge
/// with what the query itself says.
#[derive(Clone, Default)]
pub struct WalkerOptions {
    pub dimension_transform: Option<DimensionTransform>,
    pub add_ignore_field: bool,
    pub tables: Vec<String>,
    pub where_clause: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub trace: bool,
}

impl WalkerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str) -> (String, Option<String>) + Send + Sync + 'static,
    {
        self.dimension_transform = Some(Arc::new(transform));
        self
    }

    pub fn with_dimension_transform(mut self, transform: DimensionTransform) -> Self {
        self.dimension_transform = Some(transform);
        self
    }

    pub fn with_ignore_fields(mut self) -> Self {
        self.add_ignore_field = true;
        self
    }

    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = tables.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_where(mut self, where_clause: &str) -> Self {
        self.where_clause = Some(where_clause.to_string());
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_trace(mut self) -> Self {
        self.trace = true;
        self
    }

    pub fn transform(&self) -> Option<DimensionTransform> {
        self.dimension_transform.clone()
    }
}

impl Debug for WalkerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkerOptions")
            .field("dimension_transform", &self.dimension_transform.is_some())
            .field("add_ignore_field", &self.add_ignore_field)
            .field("tables", &self.tables)
            .field("where_clause", &self.where_clause)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("trace", &self.trace)
            .finish()
    }
}
