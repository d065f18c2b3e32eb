#![allow(dead_code)]

use cas_ast::Expr;
use cas_engine::Polynomial;
use proptest::prelude::*;
use std::rc::Rc;

/// Small integer coefficient vectors, trailing entry non-zero.
pub fn arb_coeffs(max_degree: usize) -> impl Strategy<Value = Vec<i64>> {
    (prop::collection::vec(-6i64..=6, 0..=max_degree), 1i64..=4, any::<bool>()).prop_map(
        |(mut coeffs, lead, negative)| {
            coeffs.push(if negative { -lead } else { lead });
            coeffs
        },
    )
}

pub fn arb_poly(max_degree: usize) -> impl Strategy<Value = Polynomial> {
    arb_coeffs(max_degree).prop_map(|c| Polynomial::from_integers(&c, "x"))
}

/// Product of a few small linear and quadratic factors, so that the
/// factorization paths are actually exercised.
pub fn arb_factored_poly() -> impl Strategy<Value = Polynomial> {
    let factor = prop_oneof![
        (-3i64..=3).prop_map(|r| vec![-r, 1]),
        (-2i64..=2, 1i64..=3).prop_map(|(b, c)| vec![c, b, 1]),
    ];
    (prop::collection::vec(factor, 1..=3), 1i64..=3).prop_map(|(factors, lead)| {
        factors
            .iter()
            .map(|f| Polynomial::from_integers(f, "x"))
            .fold(Polynomial::from_integers(&[lead], "x"), |acc, f| acc.mul(&f))
    })
}

/// Polynomial-shaped expressions in `x` built from sums, products and
/// small powers.
pub fn arb_poly_expr() -> impl Strategy<Value = Rc<Expr>> {
    let leaf = prop_oneof![
        (-5i64..=5).prop_map(Expr::num),
        Just(Expr::var("x")),
    ];

    leaf.prop_recursive(
        3,  // levels deep
        16, // max size
        2,  // items per collection
        |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::add(l, r)),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::sub(l, r)),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::mul(l, r)),
                (inner.clone(), 2i64..=3).prop_map(|(b, n)| Expr::powi(b, n)),
                inner.clone().prop_map(Expr::neg),
            ]
        },
    )
}
