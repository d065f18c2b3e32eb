use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::fmt;
use std::rc::Rc;

/// Named mathematical constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constant {
    Pi,
    E,
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Pi => write!(f, "pi"),
            Constant::E => write!(f, "e"),
        }
    }
}

/// Immutable expression tree. Every transformation builds a new tree; shared
/// subtrees are reference counted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Number(BigRational),
    Constant(Constant),
    Variable(String),
    Add(Rc<Expr>, Rc<Expr>),
    Sub(Rc<Expr>, Rc<Expr>),
    Mul(Rc<Expr>, Rc<Expr>),
    Div(Rc<Expr>, Rc<Expr>),
    Pow(Rc<Expr>, Rc<Expr>),
    Neg(Rc<Expr>),
    Function(String, Vec<Rc<Expr>>), // e.g., cos(x), arccos(x)
    /// N-ary indexed construct such as `factorial(n)` or `sum(k, 1, n, f)`.
    Operator(String, Vec<Rc<Expr>>),
}

impl Expr {
    // Helper constructors for cleaner code
    pub fn num(n: i64) -> Rc<Self> {
        Rc::new(Expr::Number(BigRational::from_integer(BigInt::from(n))))
    }

    pub fn rational(numer: i64, denom: i64) -> Rc<Self> {
        Rc::new(Expr::Number(BigRational::new(
            BigInt::from(numer),
            BigInt::from(denom),
        )))
    }

    pub fn number(n: BigRational) -> Rc<Self> {
        Rc::new(Expr::Number(n))
    }

    pub fn zero() -> Rc<Self> {
        Self::num(0)
    }

    pub fn one() -> Rc<Self> {
        Self::num(1)
    }

    pub fn pi() -> Rc<Self> {
        Rc::new(Expr::Constant(Constant::Pi))
    }

    pub fn e() -> Rc<Self> {
        Rc::new(Expr::Constant(Constant::E))
    }

    pub fn var(name: &str) -> Rc<Self> {
        Rc::new(Expr::Variable(name.to_string()))
    }

    pub fn add(lhs: Rc<Expr>, rhs: Rc<Expr>) -> Rc<Self> {
        Rc::new(Expr::Add(lhs, rhs))
    }

    pub fn sub(lhs: Rc<Expr>, rhs: Rc<Expr>) -> Rc<Self> {
        Rc::new(Expr::Sub(lhs, rhs))
    }

    pub fn mul(lhs: Rc<Expr>, rhs: Rc<Expr>) -> Rc<Self> {
        Rc::new(Expr::Mul(lhs, rhs))
    }

    pub fn div(lhs: Rc<Expr>, rhs: Rc<Expr>) -> Rc<Self> {
        Rc::new(Expr::Div(lhs, rhs))
    }

    pub fn pow(base: Rc<Expr>, exp: Rc<Expr>) -> Rc<Self> {
        Rc::new(Expr::Pow(base, exp))
    }

    pub fn neg(expr: Rc<Expr>) -> Rc<Self> {
        Rc::new(Expr::Neg(expr))
    }

    pub fn func(name: &str, args: Vec<Rc<Expr>>) -> Rc<Self> {
        Rc::new(Expr::Function(name.to_string(), args))
    }

    pub fn operator(name: &str, args: Vec<Rc<Expr>>) -> Rc<Self> {
        Rc::new(Expr::Operator(name.to_string(), args))
    }

    pub fn cos(arg: Rc<Expr>) -> Rc<Self> {
        Self::func("cos", vec![arg])
    }

    pub fn sqrt(arg: Rc<Expr>) -> Rc<Self> {
        Self::pow(arg, Self::rational(1, 2))
    }

    /// `base^n` for a small integer exponent.
    pub fn powi(base: Rc<Expr>, n: i64) -> Rc<Self> {
        Self::pow(base, Self::num(n))
    }

    /// Left-folded sum; the empty sum is `0`.
    pub fn sum_of(terms: impl IntoIterator<Item = Rc<Expr>>) -> Rc<Self> {
        let mut iter = terms.into_iter();
        match iter.next() {
            None => Self::zero(),
            Some(first) => iter.fold(first, Self::add),
        }
    }

    /// Left-folded product; the empty product is `1`.
    pub fn product_of(factors: impl IntoIterator<Item = Rc<Expr>>) -> Rc<Self> {
        let mut iter = factors.into_iter();
        match iter.next() {
            None => Self::one(),
            Some(first) => iter.fold(first, Self::mul),
        }
    }
}

impl Expr {
    pub fn as_number(&self) -> Option<&BigRational> {
        match self {
            Expr::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Number(n) if n.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Number(n) if n.is_one())
    }

    /// True if `var` occurs anywhere in the tree.
    pub fn contains_var(&self, var: &str) -> bool {
        match self {
            Expr::Variable(v) => v == var,
            Expr::Number(_) | Expr::Constant(_) => false,
            Expr::Add(l, r)
            | Expr::Sub(l, r)
            | Expr::Mul(l, r)
            | Expr::Div(l, r)
            | Expr::Pow(l, r) => l.contains_var(var) || r.contains_var(var),
            Expr::Neg(e) => e.contains_var(var),
            Expr::Function(_, args) | Expr::Operator(_, args) => {
                args.iter().any(|a| a.contains_var(var))
            }
        }
    }

    /// True if the tree contains no variable at all.
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Variable(_) => false,
            Expr::Number(_) | Expr::Constant(_) => true,
            Expr::Add(l, r)
            | Expr::Sub(l, r)
            | Expr::Mul(l, r)
            | Expr::Div(l, r)
            | Expr::Pow(l, r) => l.is_constant() && r.is_constant(),
            Expr::Neg(e) => e.is_constant(),
            Expr::Function(_, args) | Expr::Operator(_, args) => {
                args.iter().all(|a| a.is_constant())
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(_, _) | Expr::Sub(_, _) => 1,
            Expr::Mul(_, _) | Expr::Div(_, _) => 2,
            Expr::Number(n) if !n.is_integer() => 2,
            Expr::Pow(_, _) => 3,
            Expr::Neg(_) => 4,
            Expr::Number(n) if n.is_negative() => 4,
            Expr::Function(_, _)
            | Expr::Operator(_, _)
            | Expr::Number(_)
            | Expr::Constant(_)
            | Expr::Variable(_) => 5,
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, e: &Expr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", e)
    } else {
        write!(f, "{}", e)
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, name: &str, args: &[Rc<Expr>]) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    write!(f, ")")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let my_prec = self.precedence();
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Constant(c) => write!(f, "{}", c),
            Expr::Variable(s) => write!(f, "{}", s),
            Expr::Add(l, r) => {
                write_operand(f, l, l.precedence() < my_prec)?;
                write!(f, " + ")?;
                write_operand(f, r, r.precedence() < my_prec)
            }
            Expr::Sub(l, r) => {
                write_operand(f, l, l.precedence() < my_prec)?;
                write!(f, " - ")?;
                // a - (b - c) keeps its parentheses
                write_operand(f, r, r.precedence() <= my_prec)
            }
            Expr::Mul(l, r) => {
                write_operand(f, l, l.precedence() < my_prec)?;
                write!(f, " * ")?;
                write_operand(f, r, r.precedence() < my_prec)
            }
            Expr::Div(l, r) => {
                write_operand(f, l, l.precedence() < my_prec)?;
                write!(f, " / ")?;
                write_operand(f, r, r.precedence() <= my_prec)
            }
            Expr::Pow(b, e) => {
                let negative_base = matches!(b.as_number(), Some(n) if n.is_negative());
                write_operand(f, b, negative_base || b.precedence() <= my_prec)?;
                write!(f, "^")?;
                write_operand(f, e, e.precedence() < 5)
            }
            Expr::Neg(e) => {
                write!(f, "-")?;
                // -x^2 reads as -(x^2); only sums, products and nested signs need parens
                let inner = e.precedence();
                write_operand(f, e, inner < 3 || inner == my_prec)
            }
            Expr::Function(name, args) | Expr::Operator(name, args) => write_args(f, name, args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = Expr::add(Expr::num(1), Expr::mul(Expr::var("x"), Expr::num(2)));
        assert_eq!(format!("{}", e), "1 + x * 2");
    }

    #[test]
    fn test_complex_display() {
        let e = Expr::pow(Expr::add(Expr::var("a"), Expr::var("b")), Expr::num(2));
        assert_eq!(format!("{}", e), "(a + b)^2");
    }

    #[test]
    fn test_rational_exponent_display() {
        let e = Expr::sqrt(Expr::num(2));
        assert_eq!(format!("{}", e), "2^(1/2)");
        let c = Expr::cos(Expr::mul(Expr::rational(2, 9), Expr::pi()));
        assert_eq!(format!("{}", c), "cos(2/9 * pi)");
    }

    #[test]
    fn test_contains_var() {
        let e = Expr::func("cos", vec![Expr::mul(Expr::var("x"), Expr::pi())]);
        assert!(e.contains_var("x"));
        assert!(!e.contains_var("y"));
        assert!(!e.is_constant());
        assert!(Expr::sqrt(Expr::num(3)).is_constant());
    }
}
