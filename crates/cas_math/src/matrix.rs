use crate::normal_form::{simplify, Normalizer};
use cas_ast::Expr;
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::rc::Rc;

/// Dense row-major matrix of expressions.
#[derive(Debug, Clone)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Rc<Expr>>,
}

impl Matrix {
    /// Returns `None` if `data` does not hold exactly `rows * cols` entries.
    pub fn new(rows: usize, cols: usize, data: Vec<Rc<Expr>>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Matrix { rows, cols, data })
    }

    /// `rows x cols` matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![Expr::zero(); rows * cols],
        }
    }

    pub fn get(&self, row: usize, col: usize) -> &Rc<Expr> {
        &self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: Rc<Expr>) {
        self.data[row * self.cols + col] = value;
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Compute determinant, simplified.
    /// Exact elimination for rational matrices, cofactor expansion otherwise.
    pub fn determinant(&self) -> Option<Rc<Expr>> {
        if !self.is_square() {
            return None; // Not square
        }
        if self.rows == 0 {
            return Some(Expr::one());
        }

        let n = Normalizer::default();
        let rational: Option<Vec<BigRational>> = self
            .data
            .iter()
            .map(|e| n.from_expr(e).as_rational())
            .collect();
        if let Some(values) = rational {
            return Some(Expr::number(Self::determinant_rational(self.rows, values)));
        }

        let det = match self.rows {
            1 => self.data[0].clone(),
            2 => self.det_2x2(),
            _ => Self::determinant_cofactor(self.rows, &self.data),
        };
        Some(simplify(&det))
    }

    /// det([[a, b], [c, d]]) = ad - bc
    fn det_2x2(&self) -> Rc<Expr> {
        let ad = Expr::mul(self.data[0].clone(), self.data[3].clone());
        let bc = Expr::mul(self.data[1].clone(), self.data[2].clone());
        Expr::sub(ad, bc)
    }

    /// Fraction-exact Gaussian elimination with row swaps.
    fn determinant_rational(n: usize, mut a: Vec<BigRational>) -> BigRational {
        let mut det = BigRational::one();
        for col in 0..n {
            let Some(pivot) = (col..n).find(|&r| !a[r * n + col].is_zero()) else {
                return BigRational::zero();
            };
            if pivot != col {
                for c in 0..n {
                    a.swap(pivot * n + c, col * n + c);
                }
                det = -det;
            }
            let p = a[col * n + col].clone();
            det *= &p;
            for r in (col + 1)..n {
                let factor = &a[r * n + col] / &p;
                if factor.is_zero() {
                    continue;
                }
                for c in col..n {
                    let delta = &factor * &a[col * n + c];
                    a[r * n + c] -= delta;
                }
            }
        }
        det
    }

    /// Cofactor expansion along the first row, simplifying each minor.
    fn determinant_cofactor(n: usize, data: &[Rc<Expr>]) -> Rc<Expr> {
        if n == 1 {
            return data[0].clone();
        }
        // det(M) = Σ(j=0 to n-1) (-1)^j * M[0][j] * det(Minor[0][j])
        let mut terms = Vec::with_capacity(n);
        for (j, element) in data.iter().take(n).enumerate() {
            if element.is_zero() {
                continue;
            }
            let minor_data = Self::get_minor(data, n, 0, j);
            let minor_det = simplify(&Self::determinant_cofactor(n - 1, &minor_data));
            let product = Expr::mul(element.clone(), minor_det);
            terms.push(if j % 2 == 0 { product } else { Expr::neg(product) });
        }
        Expr::sum_of(terms)
    }

    /// Extract minor matrix: remove row i and column j from n×n matrix
    fn get_minor(data: &[Rc<Expr>], n: usize, row: usize, col: usize) -> Vec<Rc<Expr>> {
        let mut minor = Vec::with_capacity((n - 1) * (n - 1));
        for r in 0..n {
            if r == row {
                continue; // Skip row
            }
            for c in 0..n {
                if c == col {
                    continue; // Skip column
                }
                minor.push(data[r * n + c].clone());
            }
        }
        minor
    }
}
