//! Stroke colors for subdivided edges.

use std::fmt;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn from_hex(hex: u32) -> Self {
        Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Color of an edge that is not subdivided.
pub const UNSPLIT_COLOR: Rgb = Rgb::from_hex(0x999999);

/// ColorBrewer RdBu, 11 classes, red to blue.
const RDBU: [Rgb; 11] = [
    Rgb::from_hex(0x67001f),
    Rgb::from_hex(0xb2182b),
    Rgb::from_hex(0xd6604d),
    Rgb::from_hex(0xf4a582),
    Rgb::from_hex(0xfddbc7),
    Rgb::from_hex(0xf7f7f7),
    Rgb::from_hex(0xd1e5f0),
    Rgb::from_hex(0x92c5de),
    Rgb::from_hex(0x4393c3),
    Rgb::from_hex(0x2166ac),
    Rgb::from_hex(0x053061),
];

/// Symmetric quadratic easing: slow at both ends.
pub fn ease_quad(t: f64) -> f64 {
    let t = t * 2.0;
    if t <= 1.0 {
        t * t / 2.0
    } else {
        let t = t - 1.0;
        (t * (2.0 - t) + 1.0) / 2.0
    }
}

/// Diverging red-white-blue scale, `t` clamped to `[0, 1]`.
pub fn rdbu(t: f64) -> Rgb {
    let channel = |pick: fn(&Rgb) -> u8| -> u8 {
        let values: Vec<f64> = RDBU.iter().map(|c| f64::from(pick(c))).collect();
        basis_spline(&values, t).round().clamp(0.0, 255.0) as u8
    };
    Rgb(channel(|c| c.0), channel(|c| c.1), channel(|c| c.2))
}

/// Color of fragment `index` among the `2^depth` fragments of one edge.
///
/// Runs from blue at the source to red at the target. Depths past the width
/// of `usize` saturate.
pub fn fragment_color(index: usize, depth: u32) -> Rgb {
    if depth == 0 {
        return UNSPLIT_COLOR;
    }
    let last = 1usize.checked_shl(depth).map_or(usize::MAX, |count| count - 1);
    let t = index.min(last) as f64 / last as f64;
    rdbu(1.0 - ease_quad(t))
}

/// Uniform B-spline through `values`, passing exactly through both ends.
fn basis_spline(values: &[f64], t: f64) -> f64 {
    let n = values.len() - 1;
    let (i, t) = if t <= 0.0 {
        (0, 0.0)
    } else if t >= 1.0 {
        (n - 1, 1.0)
    } else {
        ((t * n as f64).floor() as usize, t)
    };
    let v1 = values[i];
    let v2 = values[i + 1];
    let v0 = if i > 0 { values[i - 1] } else { 2.0 * v1 - v2 };
    let v3 = if i < n - 1 { values[i + 2] } else { 2.0 * v2 - v1 };

    let t1 = (t - i as f64 / n as f64) * n as f64;
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}
