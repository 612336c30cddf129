use rand::Rng;
use rand::seq::SliceRandom;

/// Modulo whose result takes the sign of `max`, so hues and screen
/// coordinates wrap into `[0, max)`.
pub fn modulo(value: f64, max: f64) -> f64 {
    let wrapped = value % max;
    let wrapped = if wrapped < 0.0 { wrapped + max } else { wrapped };
    // Tiny negative inputs round up to exactly `max`; -0.0 collapses to 0.0.
    if wrapped == max { 0.0 } else { wrapped + 0.0 }
}

/// Clamps `value` between the two bounds, whichever order they come in.
pub fn clamp(value: f64, a: f64, b: f64) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    value.max(lo).min(hi)
}

pub fn is_number(value: f64) -> bool {
    !value.is_nan()
}

pub fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

pub fn to_degrees(radians: f64) -> f64 {
    radians * 180.0 / std::f64::consts::PI
}

/// Uniform float in `[a, b)`. Equal bounds return `a`.
pub fn rand_num(rng: &mut impl Rng, a: f64, b: f64) -> f64 {
    a + rng.gen_range(0.0..1.0) * (b - a)
}

/// Uniform integer from the inclusive range spanned by `a` and `b`.
///
/// Returns `None` when no integer lies between the bounds, e.g. `1.2` and `1.8`.
pub fn rand_int(rng: &mut impl Rng, a: f64, b: f64) -> Option<i64> {
    if !is_number(a) || !is_number(b) {
        return None;
    }
    let lo = a.min(b).ceil();
    let hi = a.max(b).floor();
    if lo > hi {
        return None;
    }
    Some(rng.gen_range(lo as i64..=hi as i64))
}

pub fn rand_element<'a, T>(rng: &mut impl Rng, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}
