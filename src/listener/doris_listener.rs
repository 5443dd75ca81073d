use std::fmt::Display;

use tracing::trace;

use crate::error::WalkError;
use crate::listener::{ClauseExpr, RenderableExpr};
use crate::options::WalkerOptions;
use crate::parser::{ParseNode, ParseTreeListener, ParseTreeWalker, Phase};

/// A rendered clause, keyword included on display.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub phase: Phase,
    pub body: String,
}

impl Display for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.phase.prefix(), self.body)
    }
}

#[derive(Debug, Default)]
pub struct ListenerOutput {
    pub fragments: Vec<Fragment>,
    /// How many fragments came from the query itself rather than overrides.
    pub walked: usize,
    pub ignore_fields: Vec<String>,
}

impl ListenerOutput {
    pub fn sql(&self) -> String {
        self.fragments
            .iter()
            .map(Fragment::to_string)
            .collect::<Vec<String>>()
            .join(" ")
    }
}

/// Collects one fragment per clause while the tree is walked. Only one
/// clause is collected at a time.
pub struct DorisListener<'a> {
    options: &'a WalkerOptions,
    active: Option<ClauseExpr>,
    seen: Vec<Phase>,
    fragments: Vec<Fragment>,
    ignore_fields: Vec<String>,
    depth: usize,
}

impl<'a> DorisListener<'a> {
    pub fn new(options: &'a WalkerOptions) -> Self {
        Self {
            options,
            active: None,
            seen: vec![],
            fragments: vec![],
            ignore_fields: vec![],
            depth: 0,
        }
    }

    fn close(&mut self, expr: ClauseExpr) {
        let phase = expr.phase();
        self.seen.push(phase);

        if let ClauseExpr::Select(select) = &expr {
            if self.options.add_ignore_field {
                self.ignore_fields.extend(select.output_names());
            }
        }

        let body = expr.render();
        if !body.is_empty() {
            self.fragments.push(Fragment { phase, body });
        }
    }

    /// Renders clauses the query lacks but the overrides ask for and puts
    /// every fragment in clause order.
    pub fn finish(mut self) -> ListenerOutput {
        let walked = self.fragments.len();

        let mut missing = vec![];
        if !self.options.tables.is_empty() {
            missing.push(Phase::Collections);
        }
        if self.options.where_clause.is_some() {
            missing.push(Phase::Criteria);
        }
        if self.options.limit.is_some() || self.options.offset.is_some() {
            missing.push(Phase::LimitAndOffset);
        }

        for phase in missing {
            if !self.seen.contains(&phase) {
                let expr = ClauseExpr::new(phase, self.options);
                self.close(expr);
            }
        }
        self.fragments.sort_by_key(|fragment| fragment.phase);

        ListenerOutput {
            fragments: self.fragments,
            walked,
            ignore_fields: self.ignore_fields,
        }
    }
}

/// Walks a parsed statement and collects its fragments, overrides applied.
pub fn walk(tree: &ParseNode, options: &WalkerOptions) -> Result<ListenerOutput, WalkError> {
    let mut listener = DorisListener::new(options);
    ParseTreeWalker::walk(&mut listener, tree)?;
    Ok(listener.finish())
}

impl ParseTreeListener for DorisListener<'_> {
    type Error = WalkError;

    fn enter_every_rule(&mut self, node: &ParseNode) -> Result<(), Self::Error> {
        if self.options.trace {
            trace!(depth = self.depth, kind = %node.kind, text = %node.text, "enter");
        }
        self.depth += 1;

        if let Some(entered) = Phase::from_kind(node.kind) {
            if let Some(active) = &self.active {
                return Err(WalkError::NestedClause {
                    active: active.phase(),
                    entered,
                });
            }
            self.active = Some(ClauseExpr::new(entered, self.options));
        }

        match self.active.as_mut() {
            Some(active) => active.enter(node),
            None => Ok(()),
        }
    }

    fn exit_every_rule(&mut self, node: &ParseNode) -> Result<(), Self::Error> {
        self.depth = self.depth.saturating_sub(1);
        if self.options.trace {
            trace!(depth = self.depth, kind = %node.kind, text = %node.text, "exit");
        }

        if let Some(active) = self.active.as_mut() {
            active.exit(node)?;
        }

        if Phase::from_kind(node.kind).is_some() {
            if let Some(expr) = self.active.take() {
                self.close(expr);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::WalkError;
    use crate::listener::*;
    use crate::options::WalkerOptions;
    use crate::parser::*;

    fn leaf(kind: NodeKind, text: &str) -> ParseNode {
        ParseNode::new(kind, text.to_string(), 0, text.len(), vec![])
    }

    #[test]
    pub fn test_nested_clause_is_rejected() {
        let where_clause = ParseNode::new(NodeKind::WhereClause, "WHEREa".into(), 7, 13, vec![]);
        let select = ParseNode::new(NodeKind::SelectClause, "SELECTWHEREa".into(), 0, 13, vec![where_clause]);
        let tree = ParseNode::new(NodeKind::Statement, "SELECTWHEREa".into(), 0, 13, vec![select]);

        let result = walk(&tree, &WalkerOptions::new());
        assert_eq!(
            result.map(|output| output.sql()),
            Err(WalkError::NestedClause {
                active: Phase::Projection,
                entered: Phase::Criteria,
            })
        );
    }

    #[test]
    pub fn test_sibling_clauses_are_accepted() {
        let star = ParseNode::new(NodeKind::NamedExpression, "*".into(), 7, 8, vec![leaf(NodeKind::Star, "*")]);
        let select = ParseNode::new(NodeKind::SelectClause, "SELECT*".into(), 0, 8, vec![star]);
        let limit = ParseNode::new(NodeKind::LimitClause, "LIMIT5".into(), 9, 16, vec![leaf(NodeKind::LimitValue, "5")]);
        let tree = ParseNode::new(NodeKind::Statement, "SELECT*LIMIT5".into(), 0, 16, vec![select, limit]);

        let output = walk(&tree, &WalkerOptions::new()).expect("Failed to walk");
        assert_eq!(output.sql(), "SELECT * LIMIT 5");
        assert_eq!(output.walked, 2);
    }

    #[test]
    pub fn test_finish_orders_override_fragments() {
        let tree = TreeParser::parse("SELECT a ORDER BY a DESC").expect("Failed to parse query");
        let options = WalkerOptions::new()
            .with_tables(["db.t"])
            .with_where("x = 1")
            .with_limit(10);

        let output = walk(&tree, &options).expect("Failed to walk");
        let phases: Vec<Phase> = output.fragments.iter().map(|fragment| fragment.phase).collect();

        assert_eq!(output.walked, 2);
        assert_eq!(
            phases,
            vec![
                Phase::Projection,
                Phase::Collections,
                Phase::Criteria,
                Phase::OrderBy,
                Phase::LimitAndOffset
            ]
        );
        assert_eq!(output.sql(), "SELECT a FROM db.t WHERE x = 1 ORDER BY a DESC LIMIT 10");
    }

    #[test]
    pub fn test_present_clause_is_not_synthesized_twice() {
        let tree = TreeParser::parse("SELECT a FROM t WHERE b = 2 LIMIT 50").expect("Failed to parse query");
        let options = WalkerOptions::new().with_tables(["db.t"]).with_where("x = 1").with_limit(10);

        let output = walk(&tree, &options).expect("Failed to walk");
        assert_eq!(output.fragments.len(), 4);
        assert_eq!(output.sql(), "SELECT a FROM db.t WHERE x = 1 AND ( b = 2 ) LIMIT 50");
    }

    #[test]
    pub fn test_trace_leaves_output_unchanged() {
        let text = "SELECT DISTINCT a, count(*) AS c FROM t WHERE (a = 1 OR b IN (1, 2)) AND c IS NULL GROUP BY a ORDER BY c DESC LIMIT 5, 10";
        let tree = TreeParser::parse(text).expect("Failed to parse query");

        let plain = walk(&tree, &WalkerOptions::new()).expect("Failed to walk");
        let traced = walk(&tree, &WalkerOptions::new().with_trace()).expect("Failed to walk");

        assert_eq!(traced.sql(), plain.sql());
        assert_eq!(
            traced.sql(),
            "SELECT DISTINCT a, count(*) AS c FROM t WHERE ( a = 1 OR b IN (1,2) ) AND c IS NULL GROUP BY a ORDER BY c DESC LIMIT 10 OFFSET 5"
        );
    }
}
