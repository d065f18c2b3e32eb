use crate::{Constant, Expr};
use std::cmp::Ordering;
use std::rc::Rc;

/// Total structural order on expression trees.
///
/// Consistent with `Expr`'s `Eq`: two trees compare `Equal` iff they are
/// structurally identical. Used to keep canonical sums and products sorted.
pub fn compare_expr(a: &Expr, b: &Expr) -> Ordering {
    if std::ptr::eq(a, b) {
        return Ordering::Equal;
    }

    use Expr::*;

    // 1. Hierarchy Check
    let rank_a = get_rank(a);
    let rank_b = get_rank(b);
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }

    // 2. Same Type Comparison
    match (a, b) {
        (Number(n1), Number(n2)) => n1.cmp(n2),
        (Constant(c1), Constant(c2)) => compare_constant(c1, c2),
        (Variable(v1), Variable(v2)) => v1.cmp(v2),
        (Function(n1, args1), Function(n2, args2)) | (Operator(n1, args1), Operator(n2, args2)) => {
            match n1.cmp(n2) {
                Ordering::Equal => compare_args(args1, args2),
                ord => ord,
            }
        }
        (Pow(b1, e1), Pow(b2, e2)) => match compare_expr(b1, b2) {
            Ordering::Equal => compare_expr(e1, e2),
            ord => ord,
        },
        (Neg(e1), Neg(e2)) => compare_expr(e1, e2),
        (Add(l1, r1), Add(l2, r2))
        | (Sub(l1, r1), Sub(l2, r2))
        | (Mul(l1, r1), Mul(l2, r2))
        | (Div(l1, r1), Div(l2, r2)) => compare_binary(l1, r1, l2, r2),
        _ => Ordering::Equal, // ranks already differ for mismatched variants
    }
}

fn get_rank(expr: &Expr) -> u8 {
    use Expr::*;
    match expr {
        Number(_) => 0,
        Constant(_) => 1,
        Variable(_) => 2,
        Function(_, _) => 3,
        Operator(_, _) => 4,
        Neg(_) => 5,
        Pow(_, _) => 6,
        Mul(_, _) => 7,
        Div(_, _) => 8,
        Add(_, _) => 9,
        Sub(_, _) => 10,
    }
}

fn compare_constant(c1: &Constant, c2: &Constant) -> Ordering {
    c1.cmp(c2)
}

fn compare_args(args1: &[Rc<Expr>], args2: &[Rc<Expr>]) -> Ordering {
    for (a1, a2) in args1.iter().zip(args2.iter()) {
        match compare_expr(a1, a2) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    args1.len().cmp(&args2.len())
}

fn compare_binary(l1: &Expr, r1: &Expr, l2: &Expr, r2: &Expr) -> Ordering {
    match compare_expr(l1, l2) {
        Ordering::Equal => compare_expr(r1, r2),
        ord => ord,
    }
}

/// `Rc<Expr>` wrapper ordered by [`compare_expr`], usable as a `BTreeMap` key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExprKey(pub Rc<Expr>);

impl PartialOrd for ExprKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExprKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_expr(&self.0, &other.0)
    }
}
