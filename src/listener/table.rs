use crate::error::WalkError;
use crate::listener::RenderableExpr;
use crate::parser::{NodeKind, ParseNode};

#[derive(Debug, Default)]
pub struct Table {
    pub relations: Vec<String>,
    overrides: Vec<String>,
    name: Option<String>,
    alias: Option<String>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables rendered instead of the ones named in the query.
    pub fn with_override(mut self, tables: &[String]) -> Self {
        self.overrides = tables.to_vec();
        self
    }
}

impl RenderableExpr for Table {
    fn enter(&mut self, _node: &ParseNode) -> Result<(), WalkError> {
        Ok(())
    }

    fn exit(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        match node.kind {
            NodeKind::TableName => self.name = Some(node.text.clone()),
            NodeKind::TableAlias => self.alias = Some(node.text.clone()),
            NodeKind::Relation => {
                let relation = match (self.name.take(), self.alias.take()) {
                    (Some(name), Some(alias)) => format!("{} AS {}", name, alias),
                    (Some(name), None) => name,
                    _ => return Ok(()),
                };
                self.relations.push(relation);
            }
            _ => {}
        }
        Ok(())
    }

    fn render(&self) -> String {
        if !self.overrides.is_empty() {
            return self.overrides.join(", ");
        }
        self.relations.join(", ")
    }
}
