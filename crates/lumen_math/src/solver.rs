//! Closed-form real roots of polynomials up to degree four.
//!
//! Coefficients are given in ascending power order: `c[0] + c[1] x + c[2] x^2 ...`.
//! Every solver returns the real roots sorted ascending. A repeated root may
//! be reported once or several times depending on which branch produced it.
//! Degenerate input (leading coefficient zero) falls back to the next lower
//! degree instead of failing.

use std::f64::consts::PI;

use thiserror::Error;

/// Relative size below which a computed quantity counts as zero.
const RELATIVE_TOLERANCE: f64 = 1e-12;

/// True when `value` is negligible next to `scale`, the magnitude of the
/// terms it was computed from. Keeps the zero tests independent of how the
/// polynomial is scaled.
fn negligible(value: f64, scale: f64) -> bool {
    value.abs() <= RELATIVE_TOLERANCE * scale
}

/// Errors that can occur when calling a [`Solver`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("expected {expected} coefficients, got {actual}")]
    CoefficientCount { expected: usize, actual: usize },
}

pub type SolverResult<T> = Result<T, SolverError>;

/// A polynomial root finder of fixed degree.
///
/// Shapes hold one of these behind an `Arc<dyn Solver>` so the numeric
/// strategy can be swapped without touching intersection code.
pub trait Solver: Send + Sync + std::fmt::Debug {
    fn degree(&self) -> usize;

    /// Real roots of the polynomial with `degree() + 1` ascending
    /// coefficients, sorted ascending.
    fn solve(&self, coefficients: &[f64]) -> SolverResult<Vec<f64>>;
}

fn check_count(coefficients: &[f64], degree: usize) -> SolverResult<()> {
    if coefficients.len() != degree + 1 {
        return Err(SolverError::CoefficientCount {
            expected: degree + 1,
            actual: coefficients.len(),
        });
    }
    Ok(())
}

macro_rules! solver {
    ($name:ident, $degree:expr, |$c:ident| $body:expr) => {
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl Solver for $name {
            fn degree(&self) -> usize {
                $degree
            }

            fn solve(&self, coefficients: &[f64]) -> SolverResult<Vec<f64>> {
                check_count(coefficients, $degree)?;
                let $c = coefficients;
                Ok($body)
            }
        }
    };
}

solver!(LinearSolver, 1, |c| solve_linear(c[0], c[1]));
solver!(QuadraticSolver, 2, |c| solve_quadratic(c[0], c[1], c[2]));
solver!(CubicSolver, 3, |c| solve_cubic(c[0], c[1], c[2], c[3]));
solver!(QuarticSolver, 4, |c| solve_quartic(c[0], c[1], c[2], c[3], c[4]));

/// Root of `c0 + c1 x = 0`. A constant polynomial has no isolated roots.
pub fn solve_linear(c0: f64, c1: f64) -> Vec<f64> {
    if c1 == 0.0 {
        return Vec::new();
    }
    vec![-c0 / c1]
}

/// Roots of `c0 + c1 x + c2 x^2 = 0`.
pub fn solve_quadratic(c0: f64, c1: f64, c2: f64) -> Vec<f64> {
    if c2 == 0.0 {
        return solve_linear(c0, c1);
    }

    let b2 = c1 * c1;
    let ac4 = 4.0 * c2 * c0;
    let discriminant = b2 - ac4;
    if negligible(discriminant, b2.max(ac4.abs())) {
        return vec![-c1 / (2.0 * c2)];
    }
    if discriminant < 0.0 {
        return Vec::new();
    }

    // Avoid cancellation between -b and sqrt(D).
    let sqrt_d = discriminant.sqrt();
    let q = if c1 < 0.0 {
        -0.5 * (c1 - sqrt_d)
    } else {
        -0.5 * (c1 + sqrt_d)
    };

    let mut roots = vec![q / c2, c0 / q];
    sort(&mut roots);
    roots
}

/// Roots of `c0 + c1 x + c2 x^2 + c3 x^3 = 0`.
pub fn solve_cubic(c0: f64, c1: f64, c2: f64, c3: f64) -> Vec<f64> {
    if c3 == 0.0 {
        return solve_quadratic(c0, c1, c2);
    }

    // Normal form x^3 + a x^2 + b x + c.
    let a = c2 / c3;
    let b = c1 / c3;
    let c = c0 / c3;

    let mut roots = if a == 0.0 && b == 0.0 {
        vec![(-c).cbrt()]
    } else if c == 0.0 {
        let mut roots = solve_quadratic(b, a, 1.0);
        roots.push(0.0);
        roots
    } else {
        depressed_cubic(a, b, c)
    };
    sort(&mut roots);
    roots
}

/// Cardano with trigonometric and hyperbolic branches, for monic
/// `x^3 + a x^2 + b x + c` with `c != 0`.
fn depressed_cubic(a: f64, b: f64, c: f64) -> Vec<f64> {
    // Substitute x = t - a/3 to get t^3 + p t + q.
    let shift = a / 3.0;
    let p = b - a * a / 3.0;
    let q = 2.0 * a * a * a / 27.0 - a * b / 3.0 + c;
    let q_term = q * q / 4.0;
    let p_term = p * p * p / 27.0;
    let discriminant = q_term + p_term;

    if negligible(discriminant, q_term.max(p_term.abs())) {
        if negligible(p, b.abs().max(a * a / 3.0)) {
            return vec![-shift];
        }
        // One simple and one double root.
        return vec![3.0 * q / p - shift, -3.0 * q / (2.0 * p) - shift];
    }

    if discriminant < 0.0 {
        // Three distinct real roots; p is necessarily negative here.
        let m = 2.0 * (-p / 3.0).sqrt();
        let phi = ((3.0 * q) / (p * m)).clamp(-1.0, 1.0).acos() / 3.0;
        return (0..3)
            .map(|k| m * (phi - 2.0 * PI * k as f64 / 3.0).cos() - shift)
            .collect();
    }

    // One real root.
    let t = if p < 0.0 {
        let m = 2.0 * (-p / 3.0).sqrt();
        let arg = (-3.0 * q.abs() / (p * m)).max(1.0);
        -q.signum() * m * (arg.acosh() / 3.0).cosh()
    } else if p > 0.0 {
        let m = 2.0 * (p / 3.0).sqrt();
        let arg = 3.0 * q / (p * m);
        -m * (arg.asinh() / 3.0).sinh()
    } else {
        (-q).cbrt()
    };
    vec![t - shift]
}

/// Roots of `c0 + c1 x + c2 x^2 + c3 x^3 + c4 x^4 = 0`.
///
/// Ferrari's method: the depressed quartic is split into two quadratics
/// through the largest root of its resolvent cubic.
pub fn solve_quartic(c0: f64, c1: f64, c2: f64, c3: f64, c4: f64) -> Vec<f64> {
    if c4 == 0.0 {
        return solve_cubic(c0, c1, c2, c3);
    }

    // Normal form x^4 + a x^3 + b x^2 + c x + d.
    let a = c3 / c4;
    let b = c2 / c4;
    let c = c1 / c4;
    let d = c0 / c4;

    // Substitute x = y - a/4 to get y^4 + p y^2 + q y + r.
    let a2 = a * a;
    let p = -3.0 * a2 / 8.0 + b;
    let q = a2 * a / 8.0 - a * b / 2.0 + c;
    let r = -3.0 * a2 * a2 / 256.0 + a2 * b / 16.0 - a * c / 4.0 + d;

    let r_scale = (3.0 * a2 * a2 / 256.0)
        .max((a2 * b / 16.0).abs())
        .max((a * c / 4.0).abs())
        .max(d.abs());

    let mut roots = if negligible(r, r_scale) {
        // y (y^3 + p y + q) = 0
        let mut roots = solve_cubic(q, p, 0.0, 1.0);
        roots.push(0.0);
        roots
    } else {
        let resolvent = solve_cubic(r * p / 2.0 - q * q / 8.0, -r, -p / 2.0, 1.0);
        let Some(z) = resolvent.last().copied() else {
            return Vec::new();
        };

        let mut u = z * z - r;
        let mut v = 2.0 * z - p;
        if negligible(u, (z * z).max(r.abs())) {
            u = 0.0;
        } else if u > 0.0 {
            u = u.sqrt();
        } else {
            return Vec::new();
        }
        if negligible(v, (2.0 * z).abs().max(p.abs())) {
            v = 0.0;
        } else if v > 0.0 {
            v = v.sqrt();
        } else {
            return Vec::new();
        }

        let (v1, v2) = if q < 0.0 { (-v, v) } else { (v, -v) };
        let mut roots = solve_quadratic(z - u, v1, 1.0);
        roots.extend(solve_quadratic(z + u, v2, 1.0));
        roots
    };

    let shift = a / 4.0;
    for root in roots.iter_mut() {
        *root -= shift;
    }
    sort(&mut roots);
    roots
}

fn sort(roots: &mut [f64]) {
    roots.sort_by(|a, b| a.total_cmp(b));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_roots(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "roots {:?} vs {:?}", actual, expected);
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-8, "roots {:?} vs {:?}", actual, expected);
        }
    }

    fn distinct(roots: &[f64]) -> Vec<f64> {
        let mut out: Vec<f64> = Vec::new();
        for &r in roots {
            if out.last().map_or(true, |&l| (r - l).abs() > 1e-6) {
                out.push(r);
            }
        }
        out
    }

    #[test]
    fn test_linear() {
        assert_roots(&solve_linear(-6.0, 3.0), &[2.0]);
        assert!(solve_linear(1.0, 0.0).is_empty());
    }

    #[test]
    fn test_quadratic_two_roots() {
        // (x - 1)(x - 3)
        assert_roots(&solve_quadratic(3.0, -4.0, 1.0), &[1.0, 3.0]);
        // (x + 2)(x - 5), negative middle coefficient branch
        assert_roots(&solve_quadratic(-10.0, -3.0, 1.0), &[-2.0, 5.0]);
        // 2x^2 - 8
        assert_roots(&solve_quadratic(-8.0, 0.0, 2.0), &[-2.0, 2.0]);
    }

    #[test]
    fn test_quadratic_double_and_none() {
        assert_roots(&solve_quadratic(1.0, -2.0, 1.0), &[1.0]);
        assert!(solve_quadratic(1.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_quadratic_cancellation() {
        // Roots 1e-8 and 1e8; the naive formula loses the small one.
        let roots = solve_quadratic(1.0, -(1e8 + 1e-8), 1.0);
        assert_eq!(roots.len(), 2);
        assert!((roots[0] - 1e-8).abs() < 1e-20);
        assert!((roots[1] - 1e8).abs() < 1e-4);
    }

    #[test]
    fn test_quadratic_roots_do_not_depend_on_scale() {
        // 1e-7 (x - 1)(x - 3)
        assert_roots(&solve_quadratic(3e-7, -4e-7, 1e-7), &[1.0, 3.0]);
        // 1e9 (x - 1)^2 stays a double root.
        assert_roots(&solve_quadratic(1e9, -2e9, 1e9), &[1.0]);
    }

    #[test]
    fn test_quadratic_degrades_to_linear() {
        assert_roots(&solve_quadratic(4.0, 2.0, 0.0), &[-2.0]);
    }

    #[test]
    fn test_cubic_three_roots() {
        // (x - 1)(x - 2)(x - 3)
        assert_roots(&solve_cubic(-6.0, 11.0, -6.0, 1.0), &[1.0, 2.0, 3.0]);
        // 2 (x + 1)(x - 0.5)(x - 4)
        assert_roots(&solve_cubic(4.0, -5.0, -7.0, 2.0), &[-1.0, 0.5, 4.0]);
    }

    #[test]
    fn test_cubic_one_root() {
        // (x - 1)(x^2 + 1)
        assert_roots(&solve_cubic(-1.0, 1.0, -1.0, 1.0), &[1.0]);
        // (x + 2)(x^2 + x + 1), depressed form has p == 0
        assert_roots(&solve_cubic(2.0, 3.0, 3.0, 1.0), &[-2.0]);
        // (x + 1)(x^2 - x + 2), p > 0
        assert_roots(&solve_cubic(2.0, 1.0, 0.0, 1.0), &[-1.0]);
        // x^3 - 8
        assert_roots(&solve_cubic(-8.0, 0.0, 0.0, 1.0), &[2.0]);
    }

    #[test]
    fn test_cubic_one_root_negative_p() {
        // x^3 - 3x + 4: p = -3, D = 4 - 1 > 0
        let roots = solve_cubic(4.0, -3.0, 0.0, 1.0);
        assert_eq!(roots.len(), 1);
        let x = roots[0];
        assert!((x * x * x - 3.0 * x + 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_cubic_repeated_root() {
        // (x - 1)^2 (x + 2)
        assert_roots(&distinct(&solve_cubic(2.0, -3.0, 0.0, 1.0)), &[-2.0, 1.0]);
    }

    #[test]
    fn test_cubic_small_roots() {
        // (x - 0.001)(x - 0.002)(x - 0.003): every depressed term is tiny.
        let roots = solve_cubic(-6e-9, 11e-6, -6e-3, 1.0);
        assert_eq!(roots.len(), 3, "roots {:?}", roots);
        for (r, e) in roots.iter().zip([1e-3, 2e-3, 3e-3]) {
            assert!((r - e).abs() < 1e-12, "roots {:?}", roots);
        }
    }

    #[test]
    fn test_cubic_zero_constant() {
        // x (x - 1)(x - 2)
        assert_roots(&solve_cubic(0.0, 2.0, -3.0, 1.0), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_cubic_degrades_to_quadratic() {
        assert_roots(&solve_cubic(3.0, -4.0, 1.0, 0.0), &[1.0, 3.0]);
    }

    #[test]
    fn test_quartic_four_roots() {
        // (x - 1)(x - 2)(x - 3)(x - 4)
        assert_roots(&solve_quartic(24.0, -50.0, 35.0, -10.0, 1.0), &[1.0, 2.0, 3.0, 4.0]);
        // (x^2 - 1)(x^2 - 4), q == 0
        assert_roots(&solve_quartic(4.0, 0.0, -5.0, 0.0, 1.0), &[-2.0, -1.0, 1.0, 2.0]);
    }

    #[test]
    fn test_quartic_small_roots() {
        // (x - 0.001)(x - 0.002)(x - 0.003)(x - 0.004)
        let roots = solve_quartic(24e-12, -50e-9, 35e-6, -10e-3, 1.0);
        assert_eq!(roots.len(), 4, "roots {:?}", roots);
        for (r, e) in roots.iter().zip([1e-3, 2e-3, 3e-3, 4e-3]) {
            assert!((r - e).abs() < 1e-12, "roots {:?}", roots);
        }
    }

    #[test]
    fn test_quartic_two_roots() {
        // (x^2 - 1)(x^2 + 1)
        assert_roots(&solve_quartic(-1.0, 0.0, 0.0, 0.0, 1.0), &[-1.0, 1.0]);
    }

    #[test]
    fn test_quartic_no_roots() {
        assert!(solve_quartic(1.0, 0.0, 0.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_quartic_zero_root() {
        // x (x - 1)(x - 2)(x + 3)
        assert_roots(&solve_quartic(0.0, 6.0, -7.0, 0.0, 1.0), &[-3.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_quartic_degrades_to_cubic() {
        assert_roots(&solve_quartic(-6.0, 11.0, -6.0, 1.0, 0.0), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_quartic_mixed_real_and_complex_roots() {
        // 3 (x - 0.5)(x + 0.25)(x^2 + 2x + 5)
        let c = [-1.875, -4.5, 13.125, 5.25, 3.0];
        let roots = distinct(&solve_quartic(c[0], c[1], c[2], c[3], c[4]));
        assert_roots(&roots, &[-0.25, 0.5]);
    }

    #[test]
    fn test_solver_trait_checks_coefficient_count() {
        let solver = QuadraticSolver;

        assert_eq!(solver.degree(), 2);
        assert_eq!(
            solver.solve(&[1.0, 2.0]),
            Err(SolverError::CoefficientCount { expected: 3, actual: 2 })
        );
        assert_roots(&solver.solve(&[3.0, -4.0, 1.0]).unwrap(), &[1.0, 3.0]);
    }

    #[test]
    fn test_solver_trait_objects() {
        let solvers: Vec<Box<dyn Solver>> = vec![
            Box::new(LinearSolver),
            Box::new(QuadraticSolver),
            Box::new(CubicSolver),
            Box::new(QuarticSolver),
        ];
        let degrees: Vec<usize> = solvers.iter().map(|s| s.degree()).collect();

        assert_eq!(degrees, vec![1, 2, 3, 4]);
        assert_roots(
            &solvers[3].solve(&[24.0, -50.0, 35.0, -10.0, 1.0]).unwrap(),
            &[1.0, 2.0, 3.0, 4.0],
        );
    }
}
