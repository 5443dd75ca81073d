use std::fmt::Debug;

use crate::error::WalkError;
use crate::options::DimensionTransform;
use crate::parser::{NodeKind, ParseNode};

/// A column name with its dotted segments and `[...]` subscripts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnPath {
    pub name: String,
    pub segments: Vec<String>,
    pub subscripts: Vec<String>,
}

impl ColumnPath {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn dotted(&self) -> String {
        std::iter::once(&self.name)
            .chain(self.segments.iter())
            .map(String::as_str)
            .collect::<Vec<&str>>()
            .join(".")
    }

    /// Storage name for the dotted path plus the alias the transform
    /// suggests for it. Subscripts are kept after the resolved name.
    pub fn resolve(&self, transform: Option<&DimensionTransform>) -> (String, Option<String>) {
        let dotted = self.dotted();
        let (mut resolved, alias) = match transform {
            Some(transform) => transform(&dotted),
            None => (dotted.clone(), None),
        };
        if resolved.is_empty() {
            resolved = dotted;
        }

        for subscript in &self.subscripts {
            resolved.push('[');
            resolved.push_str(subscript);
            resolved.push(']');
        }

        (resolved, alias)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(ColumnPath),
    /// Constants and `*`, rendered as written.
    Literal(String),
}

impl Operand {
    fn resolve(&self, transform: Option<&DimensionTransform>) -> (String, Option<String>) {
        match self {
            Operand::Column(path) => path.resolve(transform),
            Operand::Literal(text) => (text.clone(), None),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FuncArg {
    /// Where the rendering of everything inside this frame goes.
    Inner,
    Literal(String),
    Column(ColumnPath),
    Call(Box<Field>),
}

#[derive(Debug, Clone, Default)]
pub struct FuncFrame {
    pub name: String,
    pub args: Vec<FuncArg>,
    pub quantifier: Option<String>,
    pub cast_target: Option<String>,
    pub is_cast: bool,
}

impl FuncFrame {
    pub fn cast() -> Self {
        Self {
            name: "CAST".to_string(),
            is_cast: true,
            ..Default::default()
        }
    }

    pub fn has_inner(&self) -> bool {
        self.args.iter().any(|arg| matches!(arg, FuncArg::Inner))
    }

    pub fn render(&self, inner: &str, transform: Option<&DimensionTransform>) -> String {
        let mut inner_used = false;
        let mut parts: Vec<String> = self
            .args
            .iter()
            .map(|arg| match arg {
                FuncArg::Inner => {
                    inner_used = true;
                    inner.to_string()
                }
                FuncArg::Literal(text) => text.clone(),
                FuncArg::Column(path) => path.resolve(transform).0,
                FuncArg::Call(field) => field.render_expression().0,
            })
            .collect();
        if !inner_used && !inner.is_empty() {
            parts.insert(0, inner.to_string());
        }
        let body = parts.join(", ");

        if self.is_cast {
            return format!("CAST({} AS {})", body, self.cast_target.as_deref().unwrap_or_default());
        }

        match &self.quantifier {
            Some(quantifier) => format!("{}({} {})", self.name, quantifier, body),
            None => format!("{}({})", self.name, body),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldState {
    #[default]
    Idle,
    Column,
    InFunctionArgs,
    CastTarget,
    Sealed,
}

impl FieldState {
    pub fn name(&self) -> &'static str {
        match self {
            FieldState::Idle => "an empty field",
            FieldState::Column => "a complete column",
            FieldState::InFunctionArgs => "function arguments",
            FieldState::CastTarget => "a cast target",
            FieldState::Sealed => "a sealed field",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ColumnTarget {
    #[default]
    None,
    Base,
    Arg,
}

/// One rendered column: a base operand, the function and CAST frames around
/// it, an optional alias and an optional sort direction.
///
/// Frames complete innermost first and `functions` keeps them in that order,
/// so rendering folds the base through them outermost-last. A frame opened
/// while its parent already holds an inner value is collected by a nested
/// field and kept as a call argument instead.
#[derive(Clone, Default)]
pub struct Field {
    transform: Option<DimensionTransform>,
    default_alias: bool,
    pub base: Option<Operand>,
    pub alias: Option<String>,
    pub sort: Option<String>,
    pub functions: Vec<FuncFrame>,
    open: Vec<FuncFrame>,
    nested: Option<Box<Field>>,
    state: FieldState,
    target: ColumnTarget,
    pending_identifier: bool,
    subscripts: Vec<String>,
    skip_spans: Vec<(usize, usize)>,
    /// Value parens around the whole field, `(a)`.
    parens: usize,
}

impl Field {
    pub fn new(transform: Option<DimensionTransform>) -> Self {
        Self {
            transform,
            ..Default::default()
        }
    }

    /// Adopt the alias suggested by the transform for bare columns.
    pub fn with_default_alias(mut self) -> Self {
        self.default_alias = true;
        self
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_none() && self.functions.is_empty() && self.open.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.open.is_empty() && !self.functions.is_empty()
    }

    /// Stop collecting; later events are ignored.
    pub fn seal(&mut self) {
        self.state = FieldState::Sealed;
    }

    pub fn enter(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        if let Some(nested) = self.nested.as_mut() {
            return nested.enter(node);
        }
        if self.state == FieldState::Sealed || self.is_skipped(node) {
            return Ok(());
        }

        match node.kind {
            NodeKind::FunctionCall | NodeKind::Cast => self.open_frame(node),
            NodeKind::FunctionNameIdentifier => {
                if let Some(frame) = self.open.last_mut() {
                    frame.name = node.text.clone();
                }
                Ok(())
            }
            NodeKind::SetQuantifier => {
                if let Some(frame) = self.open.last_mut() {
                    frame.quantifier = Some(node.text.to_uppercase());
                }
                Ok(())
            }
            NodeKind::CastDataType => match self.open.last_mut() {
                Some(frame) => {
                    frame.cast_target = Some(node.text.clone());
                    self.state = FieldState::CastTarget;
                    Ok(())
                }
                None => Err(WalkError::invalid_state(node.kind, &node.text, self.state.name())),
            },
            NodeKind::ParenthesizedExpression if self.state == FieldState::Idle && self.open.is_empty() => {
                self.parens += 1;
                Ok(())
            }
            NodeKind::ColumnReference => self.enter_column(node),
            NodeKind::Identifier => {
                if std::mem::take(&mut self.pending_identifier) {
                    return Ok(());
                }
                self.push_segment(node)
            }
            NodeKind::Dereference => self.check_path_base(node),
            NodeKind::ElementAt => self.enter_element_at(node),
            NodeKind::Star | NodeKind::ConstantDefault => self.enter_literal(node),
            NodeKind::IdentifierOrText => {
                self.alias = Some(node.text.clone());
                Ok(())
            }
            NodeKind::ArithmeticBinary
            | NodeKind::ArithmeticUnary
            | NodeKind::Comparison
            | NodeKind::ComparisonOperator
            | NodeKind::LogicalBinary
            | NodeKind::LogicalNot
            | NodeKind::Predicate => Err(WalkError::unsupported(node.kind, &node.text)),
            _ => Ok(()),
        }
    }

    pub fn exit(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        if let Some(nested) = self.nested.as_mut() {
            nested.exit(node)?;
            if nested.is_complete() {
                if let (Some(nested), Some(frame)) = (self.nested.take(), self.open.last_mut()) {
                    frame.args.push(FuncArg::Call(nested));
                }
            }
            return Ok(());
        }
        if self.state == FieldState::Sealed || self.is_skipped(node) {
            return Ok(());
        }

        match node.kind {
            NodeKind::FunctionCall | NodeKind::Cast => self.close_frame(node),
            NodeKind::CastDataType => {
                self.state = FieldState::InFunctionArgs;
                Ok(())
            }
            NodeKind::ElementAt => {
                self.skip_spans.pop();
                let subscript = self.subscripts.pop();
                match (subscript, self.target_path()) {
                    (Some(subscript), Some(path)) => {
                        path.subscripts.push(subscript);
                        Ok(())
                    }
                    _ => Err(WalkError::invalid_state(node.kind, &node.text, self.state.name())),
                }
            }
            _ => Ok(()),
        }
    }

    fn is_skipped(&self, node: &ParseNode) -> bool {
        self.skip_spans
            .iter()
            .any(|&(start, end)| node.start >= start && node.end <= end)
    }

    fn open_frame(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        if self.open.last().is_some_and(FuncFrame::has_inner) {
            let mut nested = Field::new(self.transform.clone());
            nested.enter(node)?;
            self.nested = Some(Box::new(nested));
            return Ok(());
        }
        if self.open.is_empty() && self.state != FieldState::Idle {
            return Err(WalkError::invalid_state(node.kind, &node.text, self.state.name()));
        }

        let frame = match node.kind {
            NodeKind::Cast => FuncFrame::cast(),
            _ => FuncFrame::default(),
        };
        self.open.push(frame);
        self.state = FieldState::InFunctionArgs;
        Ok(())
    }

    fn close_frame(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        let frame = self
            .open
            .pop()
            .ok_or_else(|| WalkError::invalid_state(node.kind, &node.text, self.state.name()))?;
        self.functions.push(frame);

        match self.open.last_mut() {
            Some(parent) => parent.args.push(FuncArg::Inner),
            None => self.state = FieldState::Column,
        }
        Ok(())
    }

    fn enter_column(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        let path = ColumnPath::new(&node.text);
        self.pending_identifier = true;

        match self.open.last_mut() {
            Some(frame) if self.base.is_none() && !frame.has_inner() => {
                frame.args.push(FuncArg::Inner);
                self.base = Some(Operand::Column(path));
                self.target = ColumnTarget::Base;
            }
            Some(frame) => {
                frame.args.push(FuncArg::Column(path));
                self.target = ColumnTarget::Arg;
            }
            None if self.state == FieldState::Idle => {
                self.base = Some(Operand::Column(path));
                self.target = ColumnTarget::Base;
                self.state = FieldState::Column;
            }
            None => return Err(WalkError::invalid_state(node.kind, &node.text, self.state.name())),
        }
        Ok(())
    }

    fn enter_literal(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        match self.open.last_mut() {
            Some(frame) => frame.args.push(FuncArg::Literal(node.text.clone())),
            None if self.state == FieldState::Idle => {
                self.base = Some(Operand::Literal(node.text.clone()));
                self.state = FieldState::Column;
            }
            None => return Err(WalkError::invalid_state(node.kind, &node.text, self.state.name())),
        }
        Ok(())
    }

    fn check_path_base(&self, node: &ParseNode) -> Result<(), WalkError> {
        let on_path = node.first_child().is_some_and(|base| {
            matches!(
                base.kind,
                NodeKind::ColumnReference | NodeKind::Dereference | NodeKind::ElementAt
            )
        });
        if !on_path {
            return Err(WalkError::unsupported(node.kind, &node.text));
        }
        Ok(())
    }

    fn enter_element_at(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        self.check_path_base(node)?;

        let index = node
            .children
            .get(1)
            .filter(|index| {
                index.kind == NodeKind::ValueExpressionDefault
                    && index
                        .first_child()
                        .is_some_and(|constant| constant.kind == NodeKind::ConstantDefault)
            })
            .ok_or_else(|| WalkError::unsupported(node.kind, &node.text))?;

        self.subscripts.push(index.text.clone());
        self.skip_spans.push((index.start, index.end));
        Ok(())
    }

    fn push_segment(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        let state = self.state.name();
        match self.target_path() {
            Some(path) => {
                path.segments.push(node.text.clone());
                Ok(())
            }
            None => Err(WalkError::invalid_state(node.kind, &node.text, state)),
        }
    }

    fn target_path(&mut self) -> Option<&mut ColumnPath> {
        match self.target {
            ColumnTarget::Base => match self.base.as_mut() {
                Some(Operand::Column(path)) => Some(path),
                _ => None,
            },
            ColumnTarget::Arg => match self.open.last_mut()?.args.last_mut() {
                Some(FuncArg::Column(path)) => Some(path),
                _ => None,
            },
            ColumnTarget::None => None,
        }
    }

    /// Rendered expression without alias or direction, and the alias the
    /// transform suggested for the base column.
    pub fn render_expression(&self) -> (String, Option<String>) {
        let transform = self.transform.as_ref();
        let (mut text, suggested) = match &self.base {
            Some(operand) => operand.resolve(transform),
            None => (String::new(), None),
        };

        for frame in &self.functions {
            text = frame.render(&text, transform);
        }
        if self.parens > 0 {
            text = format!("{}{}{}", "(".repeat(self.parens), text, ")".repeat(self.parens));
        }

        (text, suggested)
    }

    fn alias_for(&self, text: &str, suggested: Option<String>) -> Option<String> {
        let alias = match &self.alias {
            Some(alias) => alias.clone(),
            None if self.default_alias && self.functions.is_empty() => suggested?,
            None => return None,
        };
        (alias != text).then_some(alias)
    }

    /// Name this field is selected as, when an `AS` is rendered for it.
    pub fn output_alias(&self) -> Option<String> {
        let (text, suggested) = self.render_expression();
        self.alias_for(&text, suggested)
    }

    pub fn render(&self) -> String {
        let (mut text, suggested) = self.render_expression();
        if let Some(alias) = self.alias_for(&text, suggested) {
            text = format!("{} AS {}", text, alias);
        }
        if let Some(sort) = &self.sort {
            text = format!("{} {}", text, sort);
        }
        text
    }
}

impl Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("base", &self.base)
            .field("alias", &self.alias)
            .field("sort", &self.sort)
            .field("functions", &self.functions)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::error::WalkError;
    use crate::listener::*;
    use crate::options::DimensionTransform;
    use crate::parser::*;

    fn find<'a>(node: &'a ParseNode, kind: NodeKind) -> Option<&'a ParseNode> {
        if node.kind == kind {
            return Some(node);
        }
        node.children.iter().find_map(|child| find(child, kind))
    }

    fn feed(field: &mut Field, node: &ParseNode) -> Result<(), WalkError> {
        field.enter(node)?;
        for child in &node.children {
            feed(field, child)?;
        }
        field.exit(node)
    }

    fn namespace_alias() -> DimensionTransform {
        Arc::new(|name: &str| match name {
            "pod_namespace" => (
                "__ext.io_kubernetes_pod_namespace".to_string(),
                Some("pod_namespace".to_string()),
            ),
            _ => (name.to_string(), None),
        })
    }

    fn render(expression: &str) -> Result<String, WalkError> {
        let tree = TreeParser::parse(&format!("SELECT {expression}")).expect("Failed to parse query");
        let named = find(&tree, NodeKind::NamedExpression).expect("named expression");
        let mut field = Field::new(Some(namespace_alias())).with_default_alias();
        feed(&mut field, named)?;
        Ok(field.render())
    }

    #[test]
    pub fn test_column_path_resolve() {
        let mut path = ColumnPath::new("__ext");
        path.segments.push("cluster".into());
        path.subscripts.push("'extra.name'".into());

        assert_eq!(path.dotted(), "__ext.cluster");
        assert_eq!(path.resolve(None), ("__ext.cluster['extra.name']".to_string(), None));
    }

    #[test]
    pub fn test_bare_column_takes_default_alias() {
        assert_eq!(
            render("pod_namespace").unwrap(),
            "__ext.io_kubernetes_pod_namespace AS pod_namespace"
        );
        assert_eq!(render("pod_namespace AS ns").unwrap(), "__ext.io_kubernetes_pod_namespace AS ns");
        assert_eq!(render("log").unwrap(), "log");
    }

    #[test]
    pub fn test_function_result_is_not_default_aliased() {
        assert_eq!(
            render("count(pod_namespace)").unwrap(),
            "count(__ext.io_kubernetes_pod_namespace)"
        );
        assert_eq!(render("count(*) AS log_count").unwrap(), "count(*) AS log_count");
        assert_eq!(render("COUNT()").unwrap(), "COUNT()");
    }

    #[test]
    pub fn test_nested_functions() {
        assert_eq!(
            render("split_part(split_part(log, 'Object:', 2), 'Func:', 1) AS Obj").unwrap(),
            "split_part(split_part(log, 'Object:', 2), 'Func:', 1) AS Obj"
        );
        assert_eq!(
            render("max(cast(split_part(log, ' exceed', 1) as bigint)) as BNum").unwrap(),
            "max(CAST(split_part(log, ' exceed', 1) AS bigint)) AS BNum"
        );
    }

    #[test]
    pub fn test_column_after_literal_keeps_argument_order() {
        assert_eq!(render("concat('x', log, 'y')").unwrap(), "concat('x', log, 'y')");
        assert_eq!(render("f('x', g(pod_namespace))").unwrap(), "f('x', g(__ext.io_kubernetes_pod_namespace))");
    }

    #[test]
    pub fn test_sibling_calls() {
        assert_eq!(
            render("concat(lower(a), upper(b), 1)").unwrap(),
            "concat(lower(a), upper(b), 1)"
        );
        assert_eq!(
            render("coalesce(a, cast(pod_namespace as text))").unwrap(),
            "coalesce(a, CAST(__ext.io_kubernetes_pod_namespace AS text))"
        );
    }

    #[test]
    pub fn test_second_column_is_argument() {
        assert_eq!(render("ifnull(a, pod_namespace)").unwrap(), "ifnull(a, __ext.io_kubernetes_pod_namespace)");
    }

    #[test]
    pub fn test_element_at_subscripts() {
        assert_eq!(
            render("CAST(__ext['io_kubernetes_pod_namespace']['extra.name'] AS TEXT) AS ns").unwrap(),
            "CAST(__ext['io_kubernetes_pod_namespace']['extra.name'] AS TEXT) AS ns"
        );
        assert_eq!(
            render("__ext['cluster']['extra.name_space']").unwrap(),
            "__ext['cluster']['extra.name_space']"
        );
    }

    #[test]
    pub fn test_dotted_names_and_quantifier() {
        assert_eq!(render("a.b.c").unwrap(), "a.b.c");
        assert_eq!(render("count(DISTINCT a.b)").unwrap(), "count(DISTINCT a.b)");
        assert_eq!(render("t.*").unwrap(), "t.*");
    }

    #[test]
    pub fn test_parens_around_whole_field() {
        assert_eq!(render("(log)").unwrap(), "(log)");
        assert_eq!(
            render("((pod_namespace))").unwrap(),
            "((__ext.io_kubernetes_pod_namespace)) AS pod_namespace"
        );
        assert_eq!(render("(count(*)) AS c").unwrap(), "(count(*)) AS c");
        // parens around a single call argument are not kept
        assert_eq!(render("count(DISTINCT (x))").unwrap(), "count(DISTINCT x)");
    }

    #[test]
    pub fn test_unsupported_expressions() {
        for expression in ["a + 1", "-a", "a = 1", "a[b]", "f(x).y"] {
            assert!(render(expression).is_err(), "{expression} should fail");
        }
    }

    #[test]
    pub fn test_sealed_field_ignores_events() {
        let tree = TreeParser::parse("SELECT a, b").expect("Failed to parse query");
        let columns: Vec<&ParseNode> = find(&tree, NodeKind::NamedExpressionSeq)
            .expect("seq")
            .children
            .iter()
            .collect();

        let mut field = Field::new(None);
        feed(&mut field, columns[0]).expect("first column");
        field.seal();
        feed(&mut field, columns[1]).expect("sealed field ignores the second column");

        assert_eq!(field.state(), FieldState::Sealed);
        assert_eq!(field.render(), "a");
    }

    #[test]
    pub fn test_second_bare_column_is_rejected() {
        let tree = TreeParser::parse("SELECT a, b").expect("Failed to parse query");
        let seq = find(&tree, NodeKind::NamedExpressionSeq).expect("seq");

        let mut field = Field::new(None);
        feed(&mut field, &seq.children[0]).expect("first column");
        let result = feed(&mut field, &seq.children[1]);
        assert!(matches!(result, Err(WalkError::InvalidState { .. })));
    }
}
