//! Small numeric helpers shared by motion, camera and level code.

/// Linear interpolation from `a` to `b` by `t` (unclamped).
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Euclidean distance between two points.
#[inline]
pub fn dist(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    ((x2 - x1) * (x2 - x1) + (y2 - y1) * (y2 - y1)).sqrt()
}

/// Walk the grid cells on the line from `(x0, y0)` to `(x1, y1)` (Bresenham).
///
/// Returns `false` as soon as `can_pass` rejects a cell, `true` if every cell
/// on the line (endpoints included) is passable.
pub fn cast_ray(
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    mut can_pass: impl FnMut(i32, i32) -> bool,
) -> bool {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        if !can_pass(x, y) {
            return false;
        }
        if x == x1 && y == y1 {
            return true;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Seedable xorshift64 generator for deterministic test sweeps.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct Rng {
    state: u64,
}

#[cfg(test)]
impl Rng {
    pub(crate) fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform float in [lo, hi).
    pub(crate) fn range(&mut self, lo: f32, hi: f32) -> f32 {
        let unit = (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32;
        lo + (hi - lo) * unit
    }
}
