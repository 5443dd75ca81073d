use std::fmt::Display;

/// Productions of the Doris query grammar that the tree parser builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Statement,
    Query,
    QuerySpecification,
    QueryOrganization,
    SelectClause,
    SetQuantifier,
    NamedExpressionSeq,
    NamedExpression,
    Expression,
    Predicated,
    LogicalBinary,
    LogicalNot,
    Predicate,
    ValueExpressionDefault,
    ArithmeticUnary,
    ArithmeticBinary,
    Comparison,
    ComparisonOperator,
    Cast,
    CastDataType,
    FunctionCall,
    FunctionNameIdentifier,
    Star,
    ConstantDefault,
    ColumnReference,
    Dereference,
    ElementAt,
    ParenthesizedExpression,
    Identifier,
    IdentifierOrText,
    FromClause,
    Relation,
    TableName,
    TableAlias,
    WhereClause,
    AggClause,
    GroupingElement,
    SortClause,
    SortItem,
    LimitClause,
    LimitValue,
    OffsetValue,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One node of the parse tree.
///
/// `text` is the concatenated text of every token under the node with the
/// whitespace between them dropped, so `split_part (log, '|', 3)` reads
/// `split_part(log,'|',3)`. `start` and `end` are char offsets into the query.
/// `op` carries the operator of logical, arithmetic, comparison and
/// predicate nodes exactly as written. `sql` is the same tokens with a single
/// space kept between adjacent words, `CAST('2020' AS DATE)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNode {
    pub kind: NodeKind,
    pub text: String,
    pub sql: String,
    pub op: Option<String>,
    pub start: usize,
    pub end: usize,
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    pub fn new(kind: NodeKind, text: String, start: usize, end: usize, children: Vec<ParseNode>) -> Self {
        Self {
            kind,
            sql: text.clone(),
            text,
            op: None,
            start,
            end,
            children,
        }
    }

    pub fn with_sql(mut self, sql: String) -> Self {
        self.sql = sql;
        self
    }

    pub fn with_op(mut self, op: String) -> Self {
        self.op = Some(op);
        self
    }

    pub fn child(&self, kind: NodeKind) -> Option<&ParseNode> {
        self.children.iter().find(|child| child.kind == kind)
    }

    pub fn first_child(&self) -> Option<&ParseNode> {
        self.children.first()
    }
}
