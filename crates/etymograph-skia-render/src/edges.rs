use skia_safe::{Canvas, Paint, PaintStyle, PathBuilder, Point};

use crate::{RenderOptions, to_color};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: (f32, f32),
    pub p1: (f32, f32),
    pub p2: (f32, f32),
    pub p3: (f32, f32),
}

impl CubicBezier {
    /// Horizontal S-curve: both control points sit at the midpoint x, at the
    /// source and target heights respectively.
    pub fn s_curve(from: (f32, f32), to: (f32, f32)) -> Self {
        let mid_x = (from.0 + to.0) / 2.0;
        Self {
            p0: from,
            p1: (mid_x, from.1),
            p2: (mid_x, to.1),
            p3: to,
        }
    }

    pub fn point_at(&self, t: f32) -> (f32, f32) {
        let u = 1.0 - t;
        let a = u * u * u;
        let b = 3.0 * u * u * t;
        let c = 3.0 * u * t * t;
        let d = t * t * t;
        (
            a * self.p0.0 + b * self.p1.0 + c * self.p2.0 + d * self.p3.0,
            a * self.p0.1 + b * self.p1.1 + c * self.p2.1 + d * self.p3.1,
        )
    }

    /// First derivative at `t`.
    pub fn tangent_at(&self, t: f32) -> (f32, f32) {
        let u = 1.0 - t;
        let a = 3.0 * u * u;
        let b = 6.0 * u * t;
        let c = 3.0 * t * t;
        (
            a * (self.p1.0 - self.p0.0) + b * (self.p2.0 - self.p1.0) + c * (self.p3.0 - self.p2.0),
            a * (self.p1.1 - self.p0.1) + b * (self.p2.1 - self.p1.1) + c * (self.p3.1 - self.p2.1),
        )
    }

    /// Triangle with its tip on the curve midpoint, pointing along the
    /// tangent there: `[tip, back_left, back_right]`.
    pub fn arrowhead(&self, length: f32, half_width: f32) -> [(f32, f32); 3] {
        let tip = self.point_at(0.5);
        let (dx, dy) = self.tangent_at(0.5);
        let angle = dy.atan2(dx);
        let (sin, cos) = angle.sin_cos();
        let rotate = |x: f32, y: f32| (tip.0 + x * cos - y * sin, tip.1 + x * sin + y * cos);
        [tip, rotate(-length, -half_width), rotate(-length, half_width)]
    }
}

pub fn draw_edge(canvas: &Canvas, curve: &CubicBezier, options: &RenderOptions) {
    let color = to_color(options.edge_color);

    let mut stroke = Paint::default();
    stroke.set_style(PaintStyle::Stroke);
    stroke.set_anti_alias(true);
    stroke.set_color(color);
    stroke.set_stroke_width(options.edge_width);

    let mut builder = PathBuilder::new();
    builder.move_to(Point::from(curve.p0));
    builder.cubic_to(Point::from(curve.p1), Point::from(curve.p2), Point::from(curve.p3));
    let path = builder.detach();
    canvas.draw_path(&path, &stroke);

    let mut fill = Paint::default();
    fill.set_style(PaintStyle::Fill);
    fill.set_anti_alias(true);
    fill.set_color(color);

    let [tip, left, right] = curve.arrowhead(options.arrow_length, options.arrow_half_width);
    let mut builder = PathBuilder::new();
    builder.move_to(Point::from(tip));
    builder.line_to(Point::from(left));
    builder.line_to(Point::from(right));
    builder.close();
    let path = builder.detach();
    canvas.draw_path(&path, &fill);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-3 && (a.1 - b.1).abs() < 1e-3
    }

    #[test]
    fn s_curve_control_points() {
        let curve = CubicBezier::s_curve((0.0, 10.0), (100.0, 50.0));
        assert_eq!(curve.p1, (50.0, 10.0));
        assert_eq!(curve.p2, (50.0, 50.0));
    }

    #[test]
    fn midpoint_of_s_curve_is_center() {
        let curve = CubicBezier::s_curve((0.0, 10.0), (100.0, 50.0));
        assert!(close(curve.point_at(0.5), (50.0, 30.0)));
        assert!(close(curve.point_at(0.0), (0.0, 10.0)));
        assert!(close(curve.point_at(1.0), (100.0, 50.0)));
    }

    #[test]
    fn horizontal_arrowhead_points_right() {
        let curve = CubicBezier::s_curve((0.0, 0.0), (100.0, 0.0));
        let [tip, left, right] = curve.arrowhead(12.0, 6.0);
        assert!(close(tip, (50.0, 0.0)));
        assert!(close(left, (38.0, -6.0)));
        assert!(close(right, (38.0, 6.0)));
    }

    #[test]
    fn diagonal_arrowhead_follows_midpoint_tangent() {
        let curve = CubicBezier::s_curve((0.0, 0.0), (100.0, 60.0));
        let (tx, ty) = curve.tangent_at(0.5);
        assert!(close((tx, ty), (0.75 * 100.0, 1.5 * 60.0)));

        let [tip, left, right] = curve.arrowhead(12.0, 6.0);
        assert!(close(tip, (50.0, 30.0)));

        let norm = tx.hypot(ty);
        let (ux, uy) = (tx / norm, ty / norm);
        let back = ((left.0 + right.0) / 2.0, (left.1 + right.1) / 2.0);
        assert!(close(back, (tip.0 - 12.0 * ux, tip.1 - 12.0 * uy)));

        // back edge is perpendicular to the tangent, left side first
        let across = (right.0 - left.0, right.1 - left.1);
        assert!((across.0 * ux + across.1 * uy).abs() < 1e-3);
        assert!(close(across, (-12.0 * uy, 12.0 * ux)));
    }
}
