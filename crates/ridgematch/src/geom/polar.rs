//! Integer vector → (length, angle) through a folded lookup table.
//!
//! The table covers the first quadrant at `2^POLAR_TABLE_BITS` resolution.
//! Larger vectors are shifted down until they fit and the length is shifted
//! back up, so long edges lose a few low bits of precision. The loss is
//! deterministic, which is what matching needs.

use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::OnceLock;

use crate::cfg::POLAR_TABLE_BITS;

use super::IntPoint;

const RADIUS: usize = 1 << POLAR_TABLE_BITS;

struct PolarTable {
    length: Vec<i32>,
    angle: Vec<f64>,
}

impl PolarTable {
    fn build() -> Self {
        let mut length = vec![0; RADIUS * RADIUS];
        let mut angle = vec![0.0; RADIUS * RADIUS];
        for y in 0..RADIUS {
            for x in 0..RADIUS {
                let (fx, fy) = (x as f64, y as f64);
                let offset = y * RADIUS + x;
                length[offset] = (fx * fx + fy * fy).sqrt().round() as i32;
                if x > 0 || y > 0 {
                    angle[offset] = fy.atan2(fx);
                }
            }
        }
        Self { length, angle }
    }
}

fn table() -> &'static PolarTable {
    static TABLE: OnceLock<PolarTable> = OnceLock::new();
    TABLE.get_or_init(PolarTable::build)
}

/// Length (rounded pixels) and direction (radians in `[0, 2π)`) of `v`.
///
/// The zero vector maps to `(0, 0.0)`.
pub fn polar(v: IntPoint) -> (i32, f64) {
    let (mut x, mut y) = (v.x, v.y);
    let mut quadrant = 0.0;
    if y < 0 {
        x = -x;
        y = -y;
        quadrant = PI;
    }
    if x < 0 {
        let turned = -x;
        x = y;
        y = turned;
        quadrant += FRAC_PI_2;
    }
    // x, y >= 0 from here on.
    let shift = 32 - (((x | y) as u32) >> POLAR_TABLE_BITS).leading_zeros();
    let offset = ((y >> shift) as usize) * RADIUS + (x >> shift) as usize;
    let t = table();
    (t.length[offset] << shift, t.angle[offset] + quadrant)
}
