//! Exact algebra support shared by the polynomial engine: normal forms,
//! predicates, trig tables and the matrix / linear-system collaborators.

pub mod expr_predicates;
pub mod linear_system;
pub mod matrix;
pub mod normal_form;
pub mod numeric;
pub mod trig_values;

pub use expr_predicates::{
    is_always_negative, is_always_non_negative, is_always_non_positive, is_always_positive,
    is_integer_constant, is_rational_constant, rational_value, sign_of, Sign,
};
pub use linear_system::{LinearSystem, SolveError};
pub use matrix::Matrix;
pub use normal_form::{are_equivalent, expand_with_limit, simplify, NormalForm, Normalizer};
