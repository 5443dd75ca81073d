use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::WalkError;
use crate::listener::{Field, RenderableExpr};
use crate::options::DimensionTransform;
use crate::parser::{NodeKind, ParseNode};

static SORT_DIRECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(ASC|DESC)$").unwrap());

/// Direction left over once the expression text is removed from the sort
/// item text, e.g. `timeDESC` minus `time`.
pub fn sort_direction(item_text: &str, expression_text: &str) -> Option<String> {
    let rest = item_text.strip_prefix(expression_text)?.trim();
    SORT_DIRECTION.is_match(rest).then(|| rest.to_uppercase())
}

/// ORDER BY list.
#[derive(Default)]
pub struct Sort {
    transform: Option<DimensionTransform>,
    pub fields: Vec<Field>,
    current: Option<Field>,
    expression_text: Option<String>,
}

impl Sort {
    pub fn new(transform: Option<DimensionTransform>) -> Self {
        Self {
            transform,
            ..Default::default()
        }
    }
}

impl RenderableExpr for Sort {
    fn enter(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        if node.kind == NodeKind::SortItem {
            self.current = Some(Field::new(self.transform.clone()));
            self.expression_text = None;
            return Ok(());
        }

        if node.kind == NodeKind::Expression && self.expression_text.is_none() {
            self.expression_text = Some(node.text.clone());
        }

        match self.current.as_mut() {
            Some(field) => field.enter(node),
            None => Ok(()),
        }
    }

    fn exit(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        if node.kind != NodeKind::SortItem {
            return match self.current.as_mut() {
                Some(field) => field.exit(node),
                None => Ok(()),
            };
        }

        if let Some(mut field) = self.current.take() {
            let expression_text = self.expression_text.take().unwrap_or_default();
            field.sort = sort_direction(&node.text, &expression_text);
            self.fields.push(field);
        }
        Ok(())
    }

    fn render(&self) -> String {
        self.fields.iter().map(Field::render).collect::<Vec<String>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use crate::listener::*;

    #[test]
    pub fn test_sort_direction() {
        assert_eq!(sort_direction("timeDESC", "time"), Some("DESC".to_string()));
        assert_eq!(sort_direction("namedesc", "name"), Some("DESC".to_string()));
        assert_eq!(sort_direction("nameasc", "name"), Some("ASC".to_string()));
        assert_eq!(sort_direction("name", "name"), None);
        assert_eq!(sort_direction("cast(countASbigint)desc", "cast(countASbigint)"), Some("DESC".to_string()));
        assert_eq!(sort_direction("other", "name"), None);
    }
}
