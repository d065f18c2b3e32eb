//! Contract tests for the expression collaborators used by the polynomial
//! engine: equivalence, sign predicates, determinants and linear systems.

use cas_ast::Expr;
use cas_math::{
    are_equivalent, is_always_negative, is_always_non_negative, is_always_positive, simplify,
    LinearSystem, Matrix, SolveError,
};
use num_rational::BigRational;
use proptest::prelude::*;
use std::rc::Rc;

fn x() -> Rc<Expr> {
    Expr::var("x")
}

#[test]
fn equivalence_ignores_operand_order_and_grouping() {
    let a = Expr::mul(Expr::add(x(), Expr::num(1)), Expr::sub(x(), Expr::num(1)));
    let b = Expr::sub(Expr::powi(x(), 2), Expr::one());
    assert!(are_equivalent(&a, &b));
    assert!(!are_equivalent(&a, &Expr::powi(x(), 2)));
}

#[test]
fn radical_products_collapse() {
    // (1 + sqrt(2))(1 - sqrt(2)) = -1
    let r = Expr::sqrt(Expr::num(2));
    let e = Expr::mul(Expr::add(Expr::one(), r.clone()), Expr::sub(Expr::one(), r));
    assert_eq!(*simplify(&e), *Expr::num(-1));
}

#[test]
fn sign_predicates_on_closed_forms() {
    let sqrt2 = Expr::sqrt(Expr::num(2));
    assert!(is_always_positive(&sqrt2));
    // 1 - sqrt(2) < 0
    assert!(is_always_negative(&Expr::sub(Expr::one(), sqrt2.clone())));
    // 3 - 2 sqrt(2) > 0
    let e = Expr::sub(Expr::num(3), Expr::mul(Expr::num(2), sqrt2));
    assert!(is_always_positive(&e));
    assert!(is_always_non_negative(&Expr::zero()));
    // unknown sign for a free variable
    assert!(!is_always_non_negative(&x()));
    assert!(!is_always_negative(&x()));
}

#[test]
fn symbolic_determinant() {
    // | x  1 |
    // | 1  x |  = x^2 - 1
    let m = Matrix::new(2, 2, vec![x(), Expr::one(), Expr::one(), x()]).unwrap();
    let det = m.determinant().unwrap();
    assert!(are_equivalent(&det, &Expr::sub(Expr::powi(x(), 2), Expr::one())));
}

#[test]
fn linear_system_from_equations() {
    // a + b = 3, a - b = 1
    let a = Expr::var("a");
    let b = Expr::var("b");
    let eqs = vec![
        Expr::sub(Expr::add(a.clone(), b.clone()), Expr::num(3)),
        Expr::sub(Expr::sub(a, b), Expr::one()),
    ];
    let system = LinearSystem::from_equations(&eqs, &["a", "b"]).unwrap();
    let solution = system.solve_named().unwrap();
    assert_eq!(
        solution,
        vec![
            ("a".to_string(), BigRational::from_integer(2.into())),
            ("b".to_string(), BigRational::from_integer(1.into())),
        ]
    );
}

#[test]
fn non_linear_equation_is_rejected() {
    let a = Expr::var("a");
    let eqs = vec![Expr::sub(Expr::powi(a, 2), Expr::one())];
    assert!(matches!(
        LinearSystem::from_equations(&eqs, &["a"]),
        Err(SolveError::NonLinear(_))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10))]

    #[test]
    fn simplify_is_idempotent(a in -20i64..20, b in -20i64..20, n in 0i64..4) {
        let e = Expr::powi(Expr::add(Expr::mul(Expr::num(a), x()), Expr::num(b)), n);
        let once = simplify(&e);
        prop_assert_eq!(simplify(&once), once.clone());
        prop_assert!(are_equivalent(&once, &e));
    }
}
