use std::fmt;

use crossterm::style;

use crate::util::{clamp, modulo};

/// RGBA color. Channels are whole numbers in `[0, 255]` and alpha is in
/// `[0, 1]`; every constructor funnels through [`rgba`] to keep it that way.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: f64,
}

pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 1.0 };
pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 1.0 };

impl Color {
    pub fn r(&self) -> u8 {
        self.r
    }

    pub fn g(&self) -> u8 {
        self.g
    }

    pub fn b(&self) -> u8 {
        self.b
    }

    pub fn a(&self) -> f64 {
        self.a
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "rgb({},{},{})", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for style::Color {
    fn from(color: Color) -> Self {
        style::Color::Rgb { r: color.r, g: color.g, b: color.b }
    }
}

fn channel(value: f64) -> u8 {
    // `as` saturates and maps NaN to 0.
    clamp(value.round(), 0.0, 255.0) as u8
}

/// Rounds and clamps the channels, clamps alpha. A NaN alpha counts as opaque.
pub fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Color {
    let a = if alpha.is_nan() { 1.0 } else { clamp(alpha, 0.0, 1.0) };
    Color { r: channel(red), g: channel(green), b: channel(blue), a }
}

pub fn rgb(red: f64, green: f64, blue: f64) -> Color {
    rgba(red, green, blue, 1.0)
}

fn hue_to_channel(m1: f64, m2: f64, hue: f64) -> f64 {
    let mut h = hue;
    if h < 0.0 {
        h += 1.0;
    }
    if h > 1.0 {
        h -= 1.0;
    }

    if h * 6.0 < 1.0 {
        m1 + (m2 - m1) * h * 6.0
    } else if h * 2.0 < 1.0 {
        m2
    } else if h * 3.0 < 2.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - h) * 6.0
    } else {
        m1
    }
}

/// Hue in degrees (any value, wrapped), saturation and lightness in `[0, 100]`.
pub fn hsla(hue: f64, saturation: f64, lightness: f64, alpha: f64) -> Color {
    let h = modulo(hue, 360.0) / 360.0;
    let s = clamp(saturation, 0.0, 100.0) / 100.0;
    let l = clamp(lightness, 0.0, 100.0) / 100.0;

    if s == 0.0 {
        let gray = l * 255.0;
        return rgba(gray, gray, gray, alpha);
    }

    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;

    rgba(
        hue_to_channel(m1, m2, h + 1.0 / 3.0) * 255.0,
        hue_to_channel(m1, m2, h) * 255.0,
        hue_to_channel(m1, m2, h - 1.0 / 3.0) * 255.0,
        alpha,
    )
}

pub fn hsl(hue: f64, saturation: f64, lightness: f64) -> Color {
    hsla(hue, saturation, lightness, 1.0)
}

/// Hue in degrees, saturation and value in `[0, 100]`.
pub fn hsva(hue: f64, saturation: f64, value: f64, alpha: f64) -> Color {
    let h = modulo(hue, 360.0) / 60.0;
    let s = clamp(saturation, 0.0, 100.0) / 100.0;
    let v = clamp(value, 0.0, 100.0) / 100.0;

    let i = h.floor();
    let mut f = h - i;
    // Even sectors run the ramp backwards.
    if i as i64 % 2 == 0 {
        f = 1.0 - f;
    }
    let m = v * (1.0 - s);
    let n = v * (1.0 - s * f);

    let (r, g, b) = match i as i64 {
        1 => (n, v, m),
        2 => (m, v, n),
        3 => (m, n, v),
        4 => (n, m, v),
        5 => (v, m, n),
        _ => (v, n, m),
    };

    rgba(r * 255.0, g * 255.0, b * 255.0, alpha)
}

pub fn hsv(hue: f64, saturation: f64, value: f64) -> Color {
    hsva(hue, saturation, value, 1.0)
}

/// Hue in degrees, whiteness and blackness in percent. When whiteness and
/// blackness add up past 100 they are scaled down to sum to exactly 100.
pub fn hwba(hue: f64, whiteness: f64, blackness: f64, alpha: f64) -> Color {
    let h = modulo(hue, 360.0) / 60.0;
    let mut w = whiteness.max(0.0) / 100.0;
    let mut bl = blackness.max(0.0) / 100.0;

    let sum = w + bl;
    if sum > 1.0 {
        w /= sum;
        bl /= sum;
    }

    let v = 1.0 - bl;
    let i = h.floor();
    let mut f = h - i;
    if i as i64 % 2 == 1 {
        f = 1.0 - f;
    }
    let n = w + f * (v - w);

    let (r, g, b) = match i as i64 {
        1 => (n, v, w),
        2 => (w, v, n),
        3 => (w, n, v),
        4 => (n, w, v),
        5 => (v, w, n),
        _ => (v, n, w),
    };

    rgba(r * 255.0, g * 255.0, b * 255.0, alpha)
}

pub fn hwb(hue: f64, whiteness: f64, blackness: f64) -> Color {
    hwba(hue, whiteness, blackness, 1.0)
}
