pub mod expression;
pub mod ordering;

pub use expression::{Constant, Expr};
pub use ordering::{compare_expr, ExprKey};
