//! Natural cubic spline through a sequence of 2D fit points.
//!
//! Parametrized on normalized cumulative chord length, one tridiagonal
//! solve per axis. This stands in for the parametric B-spline fit CAD
//! packages use for SPLINE entities; for interpolating samples the two
//! agree to well below the snap tolerance.

use crate::float_types::Real;
use geo::Coord;

/// Sample `n` points of the interpolating spline on the full parameter
/// range. Returns `None` when fewer than two distinct points remain after
/// dropping consecutive duplicates.
pub fn sample_through(points: &[Coord<Real>], n: usize) -> Option<Vec<Coord<Real>>> {
    let mut pts: Vec<Coord<Real>> = Vec::with_capacity(points.len());
    for p in points {
        if pts.last() != Some(p) {
            pts.push(*p);
        }
    }
    if pts.len() < 2 {
        return None;
    }
    let n = n.max(2);

    // Chord-length parameter, normalized to [0, 1].
    let mut u = Vec::with_capacity(pts.len());
    u.push(0.0);
    for w in pts.windows(2) {
        let d = ((w[1].x - w[0].x).powi(2) + (w[1].y - w[0].y).powi(2)).sqrt();
        u.push(u.last().unwrap() + d);
    }
    let total = *u.last().unwrap();
    for ui in &mut u {
        *ui /= total;
    }

    let xs: Vec<Real> = pts.iter().map(|p| p.x).collect();
    let ys: Vec<Real> = pts.iter().map(|p| p.y).collect();
    let mx = second_derivatives(&u, &xs);
    let my = second_derivatives(&u, &ys);

    let mut out = Vec::with_capacity(n);
    let mut seg = 0usize;
    for i in 0..n {
        let t = i as Real / (n - 1) as Real;
        while seg + 2 < u.len() && u[seg + 1] < t {
            seg += 1;
        }
        out.push(Coord {
            x: eval_segment(&u, &xs, &mx, seg, t),
            y: eval_segment(&u, &ys, &my, seg, t),
        });
    }
    Some(out)
}

/// Natural spline second derivatives via the Thomas algorithm.
fn second_derivatives(u: &[Real], y: &[Real]) -> Vec<Real> {
    let m = u.len();
    let mut d2 = vec![0.0; m];
    if m < 3 {
        return d2;
    }

    let h: Vec<Real> = u.windows(2).map(|w| w[1] - w[0]).collect();
    let mut diag = vec![0.0; m];
    let mut rhs = vec![0.0; m];
    for i in 1..m - 1 {
        diag[i] = 2.0 * (h[i - 1] + h[i]);
        rhs[i] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
    }

    // Forward elimination over the interior rows.
    for i in 2..m - 1 {
        let factor = h[i - 1] / diag[i - 1];
        diag[i] -= factor * h[i - 1];
        rhs[i] -= factor * rhs[i - 1];
    }
    // Back substitution; the natural boundary keeps d2[0] = d2[m-1] = 0.
    for i in (1..m - 1).rev() {
        let upper = if i + 1 < m - 1 { h[i] * d2[i + 1] } else { 0.0 };
        d2[i] = (rhs[i] - upper) / diag[i];
    }
    d2
}

fn eval_segment(u: &[Real], y: &[Real], d2: &[Real], seg: usize, t: Real) -> Real {
    let h = u[seg + 1] - u[seg];
    let a = (u[seg + 1] - t) / h;
    let b = (t - u[seg]) / h;
    a * y[seg]
        + b * y[seg + 1]
        + ((a.powi(3) - a) * d2[seg] + (b.powi(3) - b) * d2[seg + 1]) * h * h / 6.0
}
