//! Pseudo-image rendering of discrete state ids.
//!
//! State id `k` is drawn as a filled regular polygon with `k + 3` sides on a
//! black canvas. Optional transforms (shift, scale, rotate, flip) are drawn
//! from the caller's stream on every render and quantised.

use crate::config::{ImageSpec, ImageTransform};
use ndarray::{s, Array2, ArrayViewMut2};
use rand::Rng;
use std::f64::consts::PI;

#[derive(Clone, Debug)]
pub struct ImageRenderer {
    spec: ImageSpec,
}

/// One draw of the configured transforms.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Placement {
    dx: f64,
    dy: f64,
    scale: f64,
    rotation: f64,
    flip: bool,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            scale: 1.0,
            rotation: 0.0,
            flip: false,
        }
    }
}

impl ImageRenderer {
    pub fn new(spec: ImageSpec) -> Self {
        Self { spec }
    }

    /// `[height, width * parts]`
    pub fn shape(&self, parts: usize) -> [usize; 2] {
        [self.spec.height, self.spec.width * parts]
    }

    /// Render each id into its own panel, panels laid out left to right.
    pub fn render<R: Rng + ?Sized>(&self, ids: &[usize], rng: &mut R) -> Array2<f32> {
        let [h, w] = self.shape(ids.len());
        let mut canvas = Array2::<f32>::zeros((h, w));
        for (i, &id) in ids.iter().enumerate() {
            let placement = self.draw_placement(rng);
            let x0 = i * self.spec.width;
            let panel = canvas.slice_mut(s![.., x0..x0 + self.spec.width]);
            self.fill_polygon(panel, id + 3, placement);
        }
        canvas
    }

    fn draw_placement<R: Rng + ?Sized>(&self, rng: &mut R) -> Placement {
        let mut p = Placement::default();
        let min_side = self.spec.width.min(self.spec.height);

        if self.spec.has(ImageTransform::Shift) {
            let q = self.spec.shift_quantum;
            let steps = ((min_side / 4) / q) as i64;
            if steps > 0 {
                p.dx = (rng.gen_range(-steps..=steps) * q as i64) as f64;
                p.dy = (rng.gen_range(-steps..=steps) * q as i64) as f64;
            }
        }
        if self.spec.has(ImageTransform::Scale) {
            let (lo, hi) = self.spec.scale_range;
            p.scale = if lo < hi { rng.gen_range(lo..hi) } else { lo };
        }
        if self.spec.has(ImageTransform::Rotate) {
            let q = self.spec.rotation_quantum;
            let steps = ((360.0 / q).floor() as u64).max(1);
            p.rotation = (rng.gen_range(0..steps) as f64 * q).to_radians();
        }
        if self.spec.has(ImageTransform::Flip) {
            p.flip = rng.gen_bool(0.5);
        }
        p
    }

    fn fill_polygon(&self, mut panel: ArrayViewMut2<f32>, sides: usize, p: Placement) {
        let (h, w) = panel.dim();
        let radius = (w.min(h) as f64 / 4.0) * p.scale;
        let cx = w as f64 / 2.0 + p.dx;
        let cy = h as f64 / 2.0 + p.dy;

        let vertices: Vec<(f64, f64)> = (0..sides)
            .map(|k| {
                let theta = -PI / 2.0 + p.rotation + 2.0 * PI * k as f64 / sides as f64;
                (cx + radius * theta.cos(), cy + radius * theta.sin())
            })
            .collect();

        for ((row, col), px) in panel.indexed_iter_mut() {
            let mut x = col as f64 + 0.5;
            if p.flip {
                x = w as f64 - x;
            }
            let y = row as f64 + 0.5;
            if inside_convex(&vertices, x, y) {
                *px = 1.0;
            }
        }
    }
}

/// Point-in-convex-polygon by consistent edge orientation.
fn inside_convex(vertices: &[(f64, f64)], x: f64, y: f64) -> bool {
    let n = vertices.len();
    let mut sign = 0.0f64;
    for k in 0..n {
        let (ax, ay) = vertices[k];
        let (bx, by) = vertices[(k + 1) % n];
        let cross = (bx - ax) * (y - ay) - (by - ay) * (x - ax);
        if cross.abs() < 1e-12 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}
