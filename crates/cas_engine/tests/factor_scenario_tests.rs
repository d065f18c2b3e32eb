//! End-to-end factorization scenarios through the public API.

use cas_ast::Expr;
use cas_engine::{
    decompose_into_irreducible_factors, divide_expressions, factor, factorize, gcd,
    gcd_expressions, get_coefficients, polynomial_divide, polynomial_mul, Polynomial, PolyBudget,
};
use cas_math::are_equivalent;
use std::rc::Rc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn p(coeffs: &[i64]) -> Polynomial {
    Polynomial::from_integers(coeffs, "x")
}

fn x() -> Rc<Expr> {
    Expr::var("x")
}

fn x_minus(r: i64) -> Rc<Expr> {
    Expr::sub(x(), Expr::num(r))
}

fn a() -> Rc<Expr> {
    Expr::var("a")
}

fn in_x(expr: &Rc<Expr>) -> Polynomial {
    get_coefficients(expr, "x", &PolyBudget::default())
        .unwrap()
        .expect("polynomial in x")
}

#[test]
fn quintic_with_repeated_root() {
    init_tracing();
    // x^5 - x^3 - x^2 + 1
    let expr = Expr::sum_of([
        Expr::powi(x(), 5),
        Expr::neg(Expr::powi(x(), 3)),
        Expr::neg(Expr::powi(x(), 2)),
        Expr::one(),
    ]);
    let result = factor(&expr, "x", &PolyBudget::default()).unwrap();

    let expected = Expr::product_of([
        Expr::powi(x_minus(1), 2),
        Expr::add(x(), Expr::one()),
        Expr::sum_of([Expr::powi(x(), 2), x(), Expr::one()]),
    ]);
    assert!(are_equivalent(&result, &expected), "got {}", result);
    assert!(result.to_string().contains("(x - 1)^2"), "got {}", result);

    let f = factorize(&p(&[1, 0, -1, -1, 0, 1]), &PolyBudget::default()).unwrap();
    assert_eq!(f.factors.len(), 3);
    assert_eq!(f.degree(), 5);
}

#[test]
fn periodic_sextic_splits_into_quadratics() {
    init_tracing();
    // x^6 + x^3 + 1, period 3
    let f = factorize(&p(&[1, 0, 0, 1, 0, 0, 1]), &PolyBudget::default()).unwrap();
    assert!(f.unit.is_one());
    assert_eq!(f.factors.len(), 3);
    assert!(f.factors.iter().all(|(g, m)| g.degree() == 2 && *m == 1));
    // roots are primitive ninth roots of unity
    let rendered = Expr::product_of(f.factors.iter().map(|(g, _)| g.to_expr())).to_string();
    assert!(rendered.contains("cos"), "got {}", rendered);
}

#[test]
fn division_satisfies_reconstruction_law() {
    // (x^3 + x^2 - 1) / (x - 1)
    let a = p(&[-1, 0, 1, 1]);
    let b = p(&[-1, 1]);
    let (q, r) = polynomial_divide(&a, &b).unwrap();
    assert_eq!(q, p(&[2, 2, 1]));
    assert_eq!(r, p(&[1]));
    assert!(r.degree() < b.degree());
    assert_eq!(polynomial_mul(&q, &b).add(&r), a);
}

#[test]
fn gcd_of_difference_of_squares_and_linear() {
    let g = gcd(&p(&[-1, 0, 1]), &p(&[1, 1])).unwrap();
    assert_eq!(g, p(&[1, 1]));
    assert!(g.is_monic());
    assert_eq!(gcd(&p(&[1, 0, 1]), &p(&[1, 1])).unwrap(), p(&[1]));
}

#[test]
fn expression_division() {
    let num = Expr::sub(Expr::powi(x(), 3), Expr::one());
    let (q, r) = divide_expressions(&num, &x_minus(1), "x", &PolyBudget::default()).unwrap();
    assert!(are_equivalent(
        &q,
        &Expr::sum_of([Expr::powi(x(), 2), x(), Expr::one()])
    ));
    assert!(r.is_zero());

    // gcd(x^2 - 1, 2x + 2) = x + 1
    let a = Expr::sub(Expr::powi(x(), 2), Expr::one());
    let b = Expr::add(Expr::mul(Expr::num(2), x()), Expr::num(2));
    let g = gcd_expressions(&a, &b, "x", &PolyBudget::default()).unwrap();
    assert!(are_equivalent(&g, &Expr::add(x(), Expr::one())));
}

#[test]
fn irreducible_input_is_returned_unchanged() {
    let budget = PolyBudget::default();
    for coeffs in [&[1, 0, 1][..], &[1, 1, 1], &[2, 0, 0, 0, 0, 1, 1]] {
        let poly = p(coeffs);
        let once = decompose_into_irreducible_factors(&poly, &budget).unwrap();
        assert!(are_equivalent(&once, &poly.to_expr()));
    }
    assert_eq!(
        decompose_into_irreducible_factors(&p(&[1, 0, 1]), &budget)
            .unwrap()
            .to_string(),
        "x^2 + 1"
    );
}

#[test]
fn low_degree_input_is_not_touched() {
    let budget = PolyBudget::default();
    assert_eq!(
        decompose_into_irreducible_factors(&p(&[3, 2]), &budget)
            .unwrap()
            .to_string(),
        "2 * x + 3"
    );
    assert_eq!(
        decompose_into_irreducible_factors(&p(&[7]), &budget)
            .unwrap()
            .to_string(),
        "7"
    );
}

#[test]
fn non_polynomial_expression_passes_through() {
    let budget = PolyBudget::default();
    let e = Expr::cos(x());
    assert!(Rc::ptr_eq(&factor(&e, "x", &budget).unwrap(), &e));
    let recip = Expr::div(Expr::one(), x());
    assert!(Rc::ptr_eq(&factor(&recip, "x", &budget).unwrap(), &recip));
}

#[test]
fn leading_coefficient_and_zero_roots_are_reassembled() {
    // 3x^4 - 3x^2 = 3 x^2 (x - 1)(x + 1)
    let expr = Expr::sub(
        Expr::mul(Expr::num(3), Expr::powi(x(), 4)),
        Expr::mul(Expr::num(3), Expr::powi(x(), 2)),
    );
    let result = factor(&expr, "x", &PolyBudget::default()).unwrap();
    assert!(are_equivalent(&result, &expr));
    let rendered = result.to_string();
    assert!(rendered.starts_with("3 * "), "got {}", rendered);
    assert!(rendered.contains("x^2"), "got {}", rendered);
}

#[test]
fn irrational_and_rational_roots() {
    // x^2 - 2 over the radicals
    let f = factorize(&p(&[-2, 0, 1]), &PolyBudget::default()).unwrap();
    assert_eq!(f.factors.len(), 2);
    let expected = Expr::sub(Expr::powi(x(), 2), Expr::num(2));
    assert!(are_equivalent(&f.to_expr(), &expected));

    // three rational roots are all removed by the root search
    let f = factorize(&p(&[-6, 11, -6, 1]), &PolyBudget::default()).unwrap();
    assert_eq!(f.factors.len(), 3);
    for r in [1, 2, 3] {
        assert!(f.factors.contains(&(p(&[-r, 1]), 1)));
    }
}

#[test]
fn difference_of_squares_with_parameter() {
    init_tracing();
    // x^2 - a^2 = (x - a)(x + a)
    let expr = Expr::sub(Expr::powi(x(), 2), Expr::powi(a(), 2));
    let f = factorize(&in_x(&expr), &PolyBudget::default()).unwrap();
    assert_eq!(f.factors.len(), 2);
    assert!(f.factors.contains(&(Polynomial::linear(a(), "x"), 1)));
    assert!(f.factors.contains(&(Polynomial::linear(Expr::neg(a()), "x"), 1)));
    assert!(are_equivalent(&f.to_expr(), &expr));

    // x^2 - 2a^2 = (x - sqrt(2) a)(x + sqrt(2) a)
    let expr = Expr::sub(
        Expr::powi(x(), 2),
        Expr::mul(Expr::num(2), Expr::powi(a(), 2)),
    );
    let f = factorize(&in_x(&expr), &PolyBudget::default()).unwrap();
    assert_eq!(f.factors.len(), 2);
    assert!(are_equivalent(&f.to_expr(), &expr));
    let result = factor(&expr, "x", &PolyBudget::default()).unwrap();
    assert!(are_equivalent(&result, &expr));
}

#[test]
fn perfect_square_with_parameter() {
    // x^2 + 2ax + a^2 = (x + a)^2
    let expr = Expr::sum_of([
        Expr::powi(x(), 2),
        Expr::mul(Expr::mul(Expr::num(2), a()), x()),
        Expr::powi(a(), 2),
    ]);
    let f = factorize(&in_x(&expr), &PolyBudget::default()).unwrap();
    assert_eq!(f.factors, vec![(Polynomial::linear(Expr::neg(a()), "x"), 2)]);
    assert!(are_equivalent(&f.to_expr(), &expr));
}

#[test]
fn positive_definite_quadratic_stays_whole() {
    // x^2 + a^2 + 1 has no real roots for any a
    let expr = Expr::sum_of([Expr::powi(x(), 2), Expr::powi(a(), 2), Expr::one()]);
    let f = factorize(&in_x(&expr), &PolyBudget::default()).unwrap();
    assert_eq!(f.factors.len(), 1);
    assert_eq!(f.factors[0].0.degree(), 2);
    let result = factor(&expr, "x", &PolyBudget::default()).unwrap();
    assert!(are_equivalent(&result, &expr));
    assert_eq!(result.to_string(), "x^2 + a^2 + 1");
}

#[test]
fn quadratic_with_positive_symbolic_discriminant() {
    // x^2 + 3x + 2 - a^2: discriminant 1 + 4a^2 > 0
    let expr = Expr::sum_of([
        Expr::powi(x(), 2),
        Expr::mul(Expr::num(3), x()),
        Expr::num(2),
        Expr::neg(Expr::powi(a(), 2)),
    ]);
    let poly = in_x(&expr);
    assert_eq!(poly.to_expr().to_string(), "x^2 + 3 * x - a^2 + 2");
    let f = factorize(&poly, &PolyBudget::default()).unwrap();
    assert_eq!(f.factors.len(), 2);
    assert!(f.factors.iter().all(|(g, m)| g.degree() == 1 && *m == 1));
    assert!(are_equivalent(&f.to_expr(), &expr));
}

#[test]
fn difference_of_cubes_with_parameter() {
    // x^3 - a^3 = (x - a)(x^2 + a x + a^2)
    let expr = Expr::sub(Expr::powi(x(), 3), Expr::powi(a(), 3));
    let f = factorize(&in_x(&expr), &PolyBudget::default()).unwrap();
    assert_eq!(f.factors.len(), 2);
    assert_eq!(f.factors[0], (Polynomial::linear(a(), "x"), 1));
    let quadratic = Expr::sum_of([
        Expr::powi(x(), 2),
        Expr::mul(a(), x()),
        Expr::powi(a(), 2),
    ]);
    assert!(are_equivalent(&f.factors[1].0.to_expr(), &quadratic));
    assert!(are_equivalent(&f.to_expr(), &expr));
}
