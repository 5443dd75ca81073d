use std::fmt::Debug;

use crate::error::WalkError;
use crate::listener::{ColumnPath, Field, FieldState};
use crate::options::DimensionTransform;
use crate::parser::{NodeKind, ParseNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueShape {
    #[default]
    Single,
    /// `IN (...)`, rendered `(v1,v2)`.
    List,
    /// `BETWEEN`, rendered `low AND high`.
    Range,
}

impl ValueShape {
    pub fn join(&self, values: &[String]) -> String {
        match self {
            ValueShape::List => format!("({})", values.join(",")),
            ValueShape::Range => values.join(" AND "),
            ValueShape::Single if values.len() > 1 => format!("({})", values.join(",")),
            ValueShape::Single => values.first().cloned().unwrap_or_default(),
        }
    }
}

/// Column path of a value that is a plain (possibly dotted) column
/// reference. Anything else, literals and calls included, gives `None`.
pub fn value_column(node: &ParseNode) -> Option<ColumnPath> {
    match node.kind {
        NodeKind::Expression | NodeKind::ValueExpressionDefault => value_column(node.first_child()?),
        NodeKind::Predicated if node.children.len() == 1 => {
            value_column(node.child(NodeKind::ValueExpressionDefault)?)
        }
        NodeKind::ColumnReference => Some(ColumnPath::new(&node.text)),
        NodeKind::Dereference => {
            let mut path = value_column(node.first_child()?)?;
            path.segments.push(node.child(NodeKind::Identifier)?.text.clone());
            Some(path)
        }
        _ => None,
    }
}

/// `<field> <operator> <value>` collected from one `Predicated` node.
#[derive(Clone, Default)]
pub struct Condition {
    transform: Option<DimensionTransform>,
    pub field: Field,
    pub operator: Option<String>,
    pub values: Vec<String>,
    pub shape: ValueShape,
    pending_values: Vec<String>,
    /// Compact predicate text and compact value text, for operator recovery.
    predicate_text: Option<(String, String)>,
}

impl Condition {
    pub fn new(transform: Option<DimensionTransform>) -> Self {
        Self {
            field: Field::new(transform.clone()),
            transform,
            ..Default::default()
        }
    }

    /// The operator has been seen; the rest of the node is the value side.
    pub fn is_sealed(&self) -> bool {
        self.field.state() == FieldState::Sealed
    }

    pub fn is_fresh(&self) -> bool {
        self.field.is_empty() && self.pending_values.is_empty() && !self.is_sealed()
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty() && self.operator.is_none()
    }

    /// Value as rendered: columns resolved, everything else as written.
    fn value_sql(&self, node: &ParseNode) -> String {
        match value_column(node) {
            Some(path) => path.resolve(self.transform.as_ref()).0,
            None => node.sql.clone(),
        }
    }

    pub fn enter(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        match node.kind {
            NodeKind::Comparison => {
                // left, operator, right
                self.pending_values = node.children.last().map(|right| self.value_sql(right)).into_iter().collect();
                Ok(())
            }
            NodeKind::ComparisonOperator => {
                self.operator = Some(node.text.clone());
                self.values = std::mem::take(&mut self.pending_values);
                self.field.seal();
                Ok(())
            }
            NodeKind::Predicate => {
                self.operator = node.op.clone();
                self.values = node.children.iter().map(|value| self.value_sql(value)).collect();
                self.shape = match node.children.as_slice() {
                    [] => ValueShape::Single,
                    values if values.iter().all(|value| value.kind == NodeKind::Expression) => ValueShape::List,
                    [_, _] => ValueShape::Range,
                    _ => ValueShape::Single,
                };
                let raw: Vec<String> = node.children.iter().map(|value| value.text.clone()).collect();
                self.predicate_text = Some((node.text.clone(), self.shape.join(&raw)));
                self.field.seal();
                Ok(())
            }
            _ => self.field.enter(node),
        }
    }

    pub fn exit(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        if node.kind == NodeKind::Predicate && self.operator.is_none() {
            self.operator = self
                .predicate_text
                .as_ref()
                .and_then(|(text, value)| strip_value_suffix(text, value));
            return Ok(());
        }
        self.field.exit(node)
    }

    pub fn value_text(&self) -> String {
        self.shape.join(&self.values)
    }

    pub fn render(&self) -> String {
        let field = self.field.render();
        let Some(operator) = &self.operator else {
            return field;
        };

        let value = self.value_text();
        if value.is_empty() {
            format!("{} {}", field, operator)
        } else {
            format!("{} {} {}", field, operator, value)
        }
    }
}

impl Debug for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Condition")
            .field("field", &self.field)
            .field("operator", &self.operator)
            .field("values", &self.values)
            .field("shape", &self.shape)
            .finish()
    }
}

/// Recovers a predicate operator from the predicate's compact text by
/// removing the value text from its end: `LIKE'%c%'` gives `LIKE`.
pub fn strip_value_suffix(text: &str, value: &str) -> Option<String> {
    let compact: String = value.chars().filter(|ch| !ch.is_whitespace()).collect();
    text.strip_suffix(compact.as_str())
        .map(|operator| operator.trim().to_string())
        .filter(|operator| !operator.is_empty())
}

#[cfg(test)]
mod tests {
    use crate::listener::*;
    use crate::parser::*;

    #[test]
    pub fn test_strip_value_suffix() {
        assert_eq!(strip_value_suffix("MATCH_PHRASE'Error'", "'Error'"), Some("MATCH_PHRASE".into()));
        assert_eq!(strip_value_suffix("IN('a','b')", "('a','b')"), Some("IN".into()));
        assert_eq!(strip_value_suffix("BETWEEN1AND2", "1 AND 2"), Some("BETWEEN".into()));
        assert_eq!(strip_value_suffix("LIKE'x'", "'y'"), None);
        assert_eq!(strip_value_suffix("'x'", "'x'"), None);
    }

    #[test]
    pub fn test_strip_value_suffix_value_inside_operator() {
        assert_eq!(strip_value_suffix("LIKEE", "E"), Some("LIKE".into()));
        assert_eq!(strip_value_suffix("MATCH_ALLALL", "ALL"), Some("MATCH_ALL".into()));
        assert_eq!(strip_value_suffix("NOTININ", "IN"), Some("NOTIN".into()));
        assert_eq!(strip_value_suffix("REGEXPREGEXP", "REGEXP"), Some("REGEXP".into()));
        assert_eq!(strip_value_suffix("LIKE", "LIKE"), None);
        assert_eq!(strip_value_suffix("BETWEENANDANDAND", "AND AND"), Some("BETWEENAND".into()));
    }

    #[test]
    pub fn test_value_shapes() {
        let mut condition = Condition::new(None);
        condition.values = vec!["'a'".into(), "'b'".into()];

        condition.shape = ValueShape::List;
        assert_eq!(condition.value_text(), "('a','b')");

        condition.shape = ValueShape::Range;
        assert_eq!(condition.value_text(), "'a' AND 'b'");

        condition.shape = ValueShape::Single;
        assert_eq!(condition.value_text(), "('a','b')");

        condition.values.truncate(1);
        assert_eq!(condition.value_text(), "'a'");
    }

    #[test]
    pub fn test_value_column() {
        let tree = TreeParser::parse("SELECT * WHERE a IN (b.c, 'b', f(b), (b))").expect("Failed to parse query");
        let predicate = {
            fn find<'a>(node: &'a ParseNode) -> Option<&'a ParseNode> {
                if node.kind == NodeKind::Predicate {
                    return Some(node);
                }
                node.children.iter().find_map(find)
            }
            find(&tree).expect("predicate")
        };

        let paths: Vec<Option<String>> = predicate
            .children
            .iter()
            .map(|value| value_column(value).map(|path| path.dotted()))
            .collect();
        assert_eq!(paths, vec![Some("b.c".to_string()), None, None, None]);
    }
}
