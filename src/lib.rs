//! BETA: 2D vector math, RGB/HSL/HSV/HWB colors, and a small canvas-style
//! drawing context, frame loop and input tracker for the terminal.

pub mod animation;
pub mod color;
pub mod constants;
pub mod demo;
pub mod error;
pub mod input;
pub mod rendering;
pub mod terminal_io;
pub mod util;
pub mod vector;

pub use color::{Color, hsl, hsla, hsv, hsva, hwb, hwba, rgb, rgba};
pub use error::{Error, Result};
pub use vector::Vector2D;
