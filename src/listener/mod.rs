pub mod expr;
pub use expr::*;

pub mod field;
pub use field::*;

pub mod logic;
pub use logic::*;

pub mod condition;
pub use condition::*;

pub mod select;
pub use select::*;

pub mod table;
pub use table::*;

pub mod where_clause;
pub use where_clause::*;

pub mod agg;
pub use agg::*;

pub mod sort;
pub use sort::*;

pub mod limit;
pub use limit::*;

pub mod doris_listener;
pub use doris_listener::*;
