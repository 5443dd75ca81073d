use crate::error::WalkError;
use crate::listener::{Agg, Limit, Select, Sort, Table, Where};
use crate::options::WalkerOptions;
use crate::parser::{ParseNode, Phase};

/// A clause collector fed with every walk event inside its clause.
pub trait RenderableExpr {
    fn enter(&mut self, node: &ParseNode) -> Result<(), WalkError>;
    fn exit(&mut self, node: &ParseNode) -> Result<(), WalkError>;
    /// Clause body without its keyword. Empty means nothing to emit.
    fn render(&self) -> String;
}

pub enum ClauseExpr {
    Select(Select),
    Table(Table),
    Where(Where),
    Agg(Agg),
    Sort(Sort),
    Limit(Limit),
}

impl ClauseExpr {
    pub fn new(phase: Phase, options: &WalkerOptions) -> Self {
        let transform = options.transform();
        match phase {
            Phase::Projection => ClauseExpr::Select(Select::new(transform)),
            Phase::Collections => ClauseExpr::Table(Table::new().with_override(&options.tables)),
            Phase::Criteria => ClauseExpr::Where(Where::new(transform).with_prefix(options.where_clause.clone())),
            Phase::Aggregates => ClauseExpr::Agg(Agg::new(transform)),
            Phase::OrderBy => ClauseExpr::Sort(Sort::new(transform)),
            Phase::LimitAndOffset => ClauseExpr::Limit(Limit::new().with_override(options.limit, options.offset)),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            ClauseExpr::Select(_) => Phase::Projection,
            ClauseExpr::Table(_) => Phase::Collections,
            ClauseExpr::Where(_) => Phase::Criteria,
            ClauseExpr::Agg(_) => Phase::Aggregates,
            ClauseExpr::Sort(_) => Phase::OrderBy,
            ClauseExpr::Limit(_) => Phase::LimitAndOffset,
        }
    }

    fn inner(&mut self) -> &mut dyn RenderableExpr {
        match self {
            ClauseExpr::Select(expr) => expr,
            ClauseExpr::Table(expr) => expr,
            ClauseExpr::Where(expr) => expr,
            ClauseExpr::Agg(expr) => expr,
            ClauseExpr::Sort(expr) => expr,
            ClauseExpr::Limit(expr) => expr,
        }
    }
}

impl RenderableExpr for ClauseExpr {
    fn enter(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        self.inner().enter(node)
    }

    fn exit(&mut self, node: &ParseNode) -> Result<(), WalkError> {
        self.inner().exit(node)
    }

    fn render(&self) -> String {
        match self {
            ClauseExpr::Select(expr) => expr.render(),
            ClauseExpr::Table(expr) => expr.render(),
            ClauseExpr::Where(expr) => expr.render(),
            ClauseExpr::Agg(expr) => expr.render(),
            ClauseExpr::Sort(expr) => expr.render(),
            ClauseExpr::Limit(expr) => expr.render(),
        }
    }
}
