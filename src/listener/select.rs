use crate::error::WalkError;
use crate::listener::{Field, RenderableExpr};
use crate::options::DimensionTransform;
use crate::parser::{NodeKind, ParseNode};

/// SELECT list. Bare columns take the alias suggested by the transform.
#[derive(Default)]
pub struct Select {
    transform: Option<DimensionTransform>,
    pub quantifier: Option<String>,
    pub fields: Vec<Field>,
    current: Option<Field>,
}

impl Select {
    pub fn new(transform: Option<DimensionTransform>) -> Self {
        Self {
            transform,
            ..Default::default()
        }
    }

    /// Aliases the output columns are selected as.
    pub fn output_names(&self) -> Vec<String> {
        self.fields.iter().filter_map(Field::output_alias).collect()
    }
}

impl RenderableExpr for Select {
    fn enter(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        if let Some(field) = self.current.as_mut() {
            return field.enter(node);
        }

        match node.kind {
            NodeKind::SetQuantifier => self.quantifier = Some(node.text.to_uppercase()),
            NodeKind::NamedExpression => {
                self.current = Some(Field::new(self.transform.clone()).with_default_alias());
            }
            _ => {}
        }
        Ok(())
    }

    fn exit(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        if node.kind == NodeKind::NamedExpression {
            if let Some(field) = self.current.take() {
                self.fields.push(field);
            }
            return Ok(());
        }

        match self.current.as_mut() {
            Some(field) => field.exit(node),
            None => Ok(()),
        }
    }

    fn render(&self) -> String {
        if self.fields.is_empty() {
            return String::new();
        }

        let fields = self.fields.iter().map(Field::render).collect::<Vec<String>>().join(", ");
        match &self.quantifier {
            Some(quantifier) => format!("{} {}", quantifier, fields),
            None => fields,
        }
    }
}
