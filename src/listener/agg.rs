use crate::error::WalkError;
use crate::listener::{Field, RenderableExpr};
use crate::options::DimensionTransform;
use crate::parser::{NodeKind, ParseNode};

/// GROUP BY list. One field per top-level expression, never aliased.
#[derive(Default)]
pub struct Agg {
    transform: Option<DimensionTransform>,
    pub fields: Vec<Field>,
    current: Option<Field>,
    depth: usize,
}

impl Agg {
    pub fn new(transform: Option<DimensionTransform>) -> Self {
        Self {
            transform,
            ..Default::default()
        }
    }
}

impl RenderableExpr for Agg {
    fn enter(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        if node.kind == NodeKind::Expression {
            if self.depth == 0 {
                self.current = Some(Field::new(self.transform.clone()));
            }
            self.depth += 1;
        }

        match self.current.as_mut() {
            Some(field) => field.enter(node),
            None => Ok(()),
        }
    }

    fn exit(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        if let Some(field) = self.current.as_mut() {
            field.exit(node)?;
        }

        if node.kind == NodeKind::Expression {
            self.depth = self.depth.saturating_sub(1);
            if self.depth == 0 {
                if let Some(field) = self.current.take() {
                    self.fields.push(field);
                }
            }
        }
        Ok(())
    }

    fn render(&self) -> String {
        self.fields.iter().map(Field::render).collect::<Vec<String>>().join(", ")
    }
}
