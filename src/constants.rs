// --- Runtime defaults ---
pub const LOG_FILE: &str = "beta.log";
pub const DEFAULT_FPS: u32 = 30;
pub const DEFAULT_DEBUG_WIDTH: u16 = 80;
pub const DEFAULT_DEBUG_HEIGHT: u16 = 24;
pub const DEFAULT_DEBUG_FRAMES: u64 = 12;

pub const TERMINAL_ASPECT_RATIO_COMPENSATION: f64 = 2.0; // Terminal cells are about twice as tall as wide

// --- Demo scene ---
pub const PLAYER_SPEED: f64 = 12.0; // Cells per second
pub const ORBIT_SPEED: f64 = 90.0; // Degrees per second
pub const SPIN_SPEED: f64 = 45.0; // Degrees per second
pub const SPARKLE_INTERVAL: f64 = 0.5; // Seconds between sparkle changes
pub const SPARKLES: [char; 5] = ['*', '+', '.', 'o', 'x'];
pub const MAX_MARKS: usize = 16; // Mouse clicks remembered
