use crate::error::WalkError;
use crate::listener::RenderableExpr;
use crate::parser::{NodeKind, ParseNode};

/// LIMIT / OFFSET. An override limit only ever raises the query's limit;
/// an override offset replaces it.
#[derive(Debug, Default)]
pub struct Limit {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    limit_override: Option<u64>,
    offset_override: Option<u64>,
}

impl Limit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, limit: Option<u64>, offset: Option<u64>) -> Self {
        self.limit_override = limit.filter(|limit| *limit > 0);
        self.offset_override = offset.filter(|offset| *offset > 0);
        self
    }

    fn value(node: &ParseNode) -> Result<u64, WalkError> {
        node.text
            .parse::<u64>()
            .map_err(|_| WalkError::unsupported(node.kind, &node.text))
    }

    pub fn effective_limit(&self) -> Option<u64> {
        match (self.limit, self.limit_override) {
            (Some(limit), Some(max)) => Some(limit.max(max)),
            (limit, max) => limit.or(max),
        }
    }

    pub fn effective_offset(&self) -> Option<u64> {
        self.offset_override.or(self.offset)
    }
}

impl RenderableExpr for Limit {
    fn enter(&mut self, _node: &ParseNode) -> Result<(), WalkError> {
        Ok(())
    }

    fn exit(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        match node.kind {
            NodeKind::LimitValue => self.limit = Some(Self::value(node)?),
            NodeKind::OffsetValue => self.offset = Some(Self::value(node)?),
            _ => {}
        }
        Ok(())
    }

    fn render(&self) -> String {
        let mut parts = vec![];
        if let Some(limit) = self.effective_limit() {
            parts.push(format!("LIMIT {}", limit));
        }
        if let Some(offset) = self.effective_offset() {
            parts.push(format!("OFFSET {}", offset));
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use crate::listener::*;

    #[test]
    pub fn test_limit_overrides() {
        let limit = Limit { limit: Some(200), offset: Some(3), ..Default::default() };
        assert_eq!(limit.render(), "LIMIT 200 OFFSET 3");

        let raised = Limit { limit: Some(200), ..Default::default() }.with_override(Some(300), Some(10));
        assert_eq!(raised.render(), "LIMIT 300 OFFSET 10");

        let kept = Limit { limit: Some(200), ..Default::default() }.with_override(Some(100), None);
        assert_eq!(kept.render(), "LIMIT 200");

        let only_override = Limit::new().with_override(Some(100), Some(10));
        assert_eq!(only_override.render(), "LIMIT 100 OFFSET 10");

        assert_eq!(Limit::new().render(), "");
    }
}
