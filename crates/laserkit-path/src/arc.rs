//! Elliptical arc to cubic Bézier conversion.
//!
//! Endpoint parameterization is converted to center parameterization, then
//! the sweep is split until every piece spans at most 120 degrees.

use laserkit_core::Point;
use std::f64::consts::TAU;

const MAX_SEGMENT_SWEEP: f64 = 2.0 * std::f64::consts::PI / 3.0;

/// One cubic segment: two control points and the end point.
pub type CubicSegment = (Point, Point, Point);

/// Endpoint-parameterized arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSegment {
    pub from: Point,
    pub to: Point,
    pub rx: f64,
    pub ry: f64,
    /// x-axis rotation in degrees
    pub rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
}

struct Ellipse {
    center: Point,
    rx: f64,
    ry: f64,
    cos_phi: f64,
    sin_phi: f64,
}

impl Ellipse {
    fn point(&self, u: f64, v: f64) -> Point {
        // [x;y] = c + R(phi) * [rx*u; ry*v]
        Point::new(
            self.center.x + self.cos_phi * (self.rx * u) - self.sin_phi * (self.ry * v),
            self.center.y + self.sin_phi * (self.rx * u) + self.cos_phi * (self.ry * v),
        )
    }
}

fn angle_between(u: (f64, f64), v: (f64, f64)) -> f64 {
    let dot = u.0 * v.0 + u.1 * v.1;
    let det = u.0 * v.1 - u.1 * v.0;
    det.atan2(dot)
}

/// Convert an arc into cubic segments.
///
/// Degenerate radii produce a single straight cubic; coincident endpoints
/// produce nothing.
pub fn arc_to_cubics(arc: &ArcSegment) -> Vec<CubicSegment> {
    let ArcSegment { from, to, .. } = *arc;
    if from.approx_eq(&to, 1e-12) {
        return Vec::new();
    }

    let mut rx = arc.rx.abs();
    let mut ry = arc.ry.abs();
    if rx < f64::EPSILON || ry < f64::EPSILON {
        return vec![(from, to, to)];
    }

    let phi = arc.rotation.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    let dx2 = (from.x - to.x) / 2.0;
    let dy2 = (from.y - to.y) / 2.0;
    let x1p = cos_phi * dx2 + sin_phi * dy2;
    let y1p = -sin_phi * dx2 + cos_phi * dy2;

    // Radii too small to reach the endpoint are scaled up
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let scale = lambda.sqrt();
        rx *= scale;
        ry *= scale;
    }

    let rx2 = rx * rx;
    let ry2 = ry * ry;
    let denom = rx2 * y1p * y1p + ry2 * x1p * x1p;
    if denom.abs() < f64::EPSILON {
        return vec![(from, to, to)];
    }
    let numer = (rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p).max(0.0);

    let sign = if arc.large_arc == arc.sweep { -1.0 } else { 1.0 };
    let coef = sign * (numer / denom).sqrt();
    let cxp = coef * (rx * y1p / ry);
    let cyp = coef * (-ry * x1p / rx);

    let ellipse = Ellipse {
        center: Point::new(
            cos_phi * cxp - sin_phi * cyp + (from.x + to.x) / 2.0,
            sin_phi * cxp + cos_phi * cyp + (from.y + to.y) / 2.0,
        ),
        rx,
        ry,
        cos_phi,
        sin_phi,
    };

    let u = ((x1p - cxp) / rx, (y1p - cyp) / ry);
    let v = ((-x1p - cxp) / rx, (-y1p - cyp) / ry);
    let theta = angle_between((1.0, 0.0), u);
    let mut delta = angle_between(u, v);
    if !arc.sweep && delta > 0.0 {
        delta -= TAU;
    } else if arc.sweep && delta < 0.0 {
        delta += TAU;
    }

    let mut cubics = Vec::new();
    split_sweep(&ellipse, theta, delta, &mut cubics);

    // Pin the final point to the exact endpoint
    if let Some(last) = cubics.last_mut() {
        last.2 = to;
    }
    cubics
}

fn split_sweep(ellipse: &Ellipse, theta: f64, delta: f64, out: &mut Vec<CubicSegment>) {
    if delta.abs() > MAX_SEGMENT_SWEEP {
        let half = delta / 2.0;
        split_sweep(ellipse, theta, half, out);
        split_sweep(ellipse, theta + half, half, out);
        return;
    }

    let t1 = theta + delta;
    let k = 4.0 / 3.0 * (delta / 4.0).tan();
    let (s0, c0) = theta.sin_cos();
    let (s1, c1) = t1.sin_cos();

    out.push((
        ellipse.point(c0 - k * s0, s0 + k * c0),
        ellipse.point(c1 + k * s1, s1 - k * c1),
        ellipse.point(c1, s1),
    ));
}
