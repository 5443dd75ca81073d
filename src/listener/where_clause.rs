use crate::error::WalkError;
use crate::listener::{Condition, LogicDepthStack, RenderableExpr};
use crate::options::DimensionTransform;
use crate::parser::{NodeKind, ParseNode};

#[derive(Debug, Clone)]
pub enum WhereItem {
    Condition(Condition),
    Logical(String),
    LeftParen,
    RightParen,
    Negation,
}

/// True when a parenthesized expression groups boolean terms, as opposed
/// to wrapping a plain value like `(a)`.
pub fn is_boolean_group(node: &ParseNode) -> bool {
    node.kind == NodeKind::ParenthesizedExpression
        && node
            .first_child()
            .and_then(ParseNode::first_child)
            .is_some_and(is_boolean)
}

fn is_boolean(node: &ParseNode) -> bool {
    match node.kind {
        NodeKind::LogicalBinary | NodeKind::LogicalNot => true,
        NodeKind::Predicated => match node.children.as_slice() {
            [value] => match value.kind {
                NodeKind::Comparison => true,
                NodeKind::ValueExpressionDefault => value.first_child().is_some_and(is_boolean_group),
                _ => false,
            },
            _ => true,
        },
        _ => false,
    }
}

/// WHERE clause: a flat list of conditions, operators and paren markers
/// replayed through a `LogicDepthStack` on render.
#[derive(Default)]
pub struct Where {
    transform: Option<DimensionTransform>,
    prefix: Option<String>,
    current: Option<(Condition, (usize, usize))>,
    pub items: Vec<WhereItem>,
}

impl Where {
    pub fn new(transform: Option<DimensionTransform>) -> Self {
        Self {
            transform,
            ..Default::default()
        }
    }

    /// Fixed predicate rendered ahead of the query's own conditions.
    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix.filter(|prefix| !prefix.trim().is_empty());
        self
    }

    fn render_tree(&self) -> String {
        let mut stack = LogicDepthStack::new();
        let mut parts: Vec<String> = vec![];

        for item in &self.items {
            match item {
                WhereItem::Logical(name) => {
                    stack.push(name);
                    continue;
                }
                WhereItem::Negation => {
                    parts.push("NOT".to_string());
                    continue;
                }
                WhereItem::LeftParen => {
                    stack.open_paren();
                    parts.push("(".to_string());
                }
                WhereItem::RightParen => {
                    stack.close_paren();
                    parts.push(")".to_string());
                }
                WhereItem::Condition(condition) => parts.push(condition.render()),
            }

            if let Some(name) = stack.take_ready() {
                parts.push(name);
            }
        }

        parts.join(" ")
    }
}

impl RenderableExpr for Where {
    fn enter(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        if let Some((condition, _)) = self.current.as_mut() {
            if condition.is_sealed() {
                return Ok(());
            }
            let opens_group = condition.is_fresh() && is_boolean_group(node);
            if !opens_group {
                return condition.enter(node);
            }
            self.current = None;
            self.items.push(WhereItem::LeftParen);
            return Ok(());
        }

        match node.kind {
            NodeKind::LogicalBinary => {
                let name = node.op.clone().unwrap_or_default();
                self.items.push(WhereItem::Logical(name));
            }
            NodeKind::LogicalNot => self.items.push(WhereItem::Negation),
            NodeKind::Predicated => {
                let condition = Condition::new(self.transform.clone());
                self.current = Some((condition, (node.start, node.end)));
            }
            _ => {}
        }
        Ok(())
    }

    fn exit(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        let closes_condition = matches!(
            &self.current,
            Some((_, span)) if node.kind == NodeKind::Predicated && *span == (node.start, node.end)
        );
        if closes_condition {
            if let Some((condition, _)) = self.current.take() {
                if !condition.is_empty() {
                    self.items.push(WhereItem::Condition(condition));
                }
            }
            return Ok(());
        }

        if let Some((condition, _)) = self.current.as_mut() {
            return condition.exit(node);
        }

        if is_boolean_group(node) {
            self.items.push(WhereItem::RightParen);
        }
        Ok(())
    }

    fn render(&self) -> String {
        let tree = self.render_tree();
        match &self.prefix {
            Some(prefix) if tree.is_empty() => prefix.clone(),
            Some(prefix) => format!("{} AND ( {} )", prefix, tree),
            None => tree,
        }
    }
}
