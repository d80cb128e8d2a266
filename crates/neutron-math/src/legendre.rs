// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Legendre
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Gauss-Legendre quadrature abscissae and weights.
//!
//! Roots of P_n are located by Newton iteration from the Chebyshev
//! initial guess; weights follow from the derivative recurrence.

use std::f64::consts::PI;

/// Newton convergence tolerance on the abscissae.
const ROOT_TOL: f64 = 1e-15;

/// Iteration cap per root. Newton from the Chebyshev guess converges in
/// a handful of steps; this only guards against pathological inputs.
const MAX_NEWTON_ITER: usize = 64;

/// Evaluate (P_n(x), P_n'(x)) by the three-term recurrence.
fn legendre_with_derivative(n: usize, x: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = x;
    if n == 0 {
        return (1.0, 0.0);
    }
    for k in 2..=n {
        let kf = k as f64;
        let p2 = ((2.0 * kf - 1.0) * x * p1 - (kf - 1.0) * p0) / kf;
        p0 = p1;
        p1 = p2;
    }
    let dp = n as f64 * (x * p1 - p0) / (x * x - 1.0);
    (p1, dp)
}

/// Gauss-Legendre nodes and weights on [-1, 1], nodes ascending.
///
/// Panics if `n == 0`.
pub fn gauss_legendre(n: usize) -> (Vec<f64>, Vec<f64>) {
    assert!(n > 0, "Quadrature order must be > 0");
    let mut nodes = vec![0.0; n];
    let mut weights = vec![0.0; n];

    // Roots are symmetric about 0; solve the lower half and mirror.
    let m = (n + 1) / 2;
    for i in 0..m {
        // Chebyshev initial guess for the i-th root
        let mut x = -(PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut dp = 0.0;
        for _ in 0..MAX_NEWTON_ITER {
            let (p, d) = legendre_with_derivative(n, x);
            dp = d;
            let dx = p / dp;
            x -= dx;
            if dx.abs() < ROOT_TOL {
                break;
            }
        }
        let w = 2.0 / ((1.0 - x * x) * dp * dp);
        nodes[i] = x;
        weights[i] = w;
        nodes[n - 1 - i] = -x;
        weights[n - 1 - i] = w;
    }
    // Odd order leaves the center node at exactly zero
    if n % 2 == 1 {
        nodes[n / 2] = 0.0;
    }
    (nodes, weights)
}

/// Gauss-Legendre nodes and weights mapped onto [0, 1].
/// Weights sum to 1.
pub fn gauss_legendre_01(n: usize) -> (Vec<f64>, Vec<f64>) {
    let (nodes, weights) = gauss_legendre(n);
    let nodes = nodes.iter().map(|x| 0.5 * (x + 1.0)).collect();
    let weights = weights.iter().map(|w| 0.5 * w).collect();
    (nodes, weights)
}
