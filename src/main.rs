use std::io::{self, Write};
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use beta::animation::animate;
use beta::constants::*;
use beta::demo::Demo;
use beta::input::InputState;
use beta::rendering::{OutputTarget, Renderer, ScreenBuffer};
use beta::terminal_io::SimulatedInput;
use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    terminal::{disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement},
};
use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Color and vector playground for the terminal.
#[derive(Parser, Debug)]
#[command(name = "beta", version)]
struct Args {
    /// Render into an in-memory buffer and replay a scripted input sequence.
    #[arg(long)]
    debug: bool,
    /// Buffer width in debug mode.
    #[arg(long, default_value_t = DEFAULT_DEBUG_WIDTH)]
    width: u16,
    /// Buffer height in debug mode.
    #[arg(long, default_value_t = DEFAULT_DEBUG_HEIGHT)]
    height: u16,
    /// Stop after this many frames.
    #[arg(long)]
    frames: Option<u64>,
    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: u32,
    /// Seed for the demo's random choices.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = LOG_FILE)]
    log_file: String,
}

struct Session {
    out: OutputTarget,
    renderer: Renderer,
    input: InputState,
    demo: Demo,
    simulated_input: Option<SimulatedInput>,
    frame_count: u64,
    max_frames: Option<u64>,
    // Set when the terminal never reports key releases.
    release_keys_each_frame: bool,
    // First error a frame hit; the loop stops on it.
    failure: Option<beta::Error>,
}

impl Session {
    fn next_events(&mut self) -> io::Result<Vec<Event>> {
        let mut events = Vec::new();
        match &mut self.simulated_input {
            Some(sim) => {
                while sim.poll(self.frame_count)? {
                    events.push(sim.read()?);
                }
            },
            None => {
                while event::poll(Duration::ZERO).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
                    events.push(event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?);
                }
            },
        }
        Ok(events)
    }

    fn frame(&mut self, dt: f64) -> beta::Result<ControlFlow<()>> {
        for event in self.next_events()? {
            if let Event::Resize(width, height) = event {
                self.renderer.resize(width, height);
                info!("Terminal resized to {}x{}", width, height);
            }
            self.input.handle_crossterm(&event)?;
        }

        self.demo.update(dt, &self.input, &self.renderer)?;
        self.demo.draw(&mut self.renderer);
        self.renderer.present(&mut self.out).map_err(|e| { error!("Failed to render frame: {}", e); e })?;
        self.out.flush().map_err(|e| { error!("Failed to flush output: {}", e); e })?;

        if let Some(sb) = self.out.screen_buffer() {
            sb.print_to_log();
        }
        if self.release_keys_each_frame {
            self.input.release_keys();
        }

        self.frame_count += 1;
        let out_of_frames = self.max_frames.is_some_and(|max| self.frame_count >= max);
        if self.demo.is_finished() || out_of_frames {
            info!("Demo finished after {} frames.", self.frame_count);
            return Ok(ControlFlow::Break(()));
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Runs one frame, keeping its error for `main` instead of dropping it.
    fn run_frame(&mut self, dt: f64) -> ControlFlow<()> {
        match self.frame(dt) {
            Ok(flow) => flow,
            Err(e) => {
                error!("Frame {} failed: {}", self.frame_count, e);
                self.failure = Some(e);
                ControlFlow::Break(())
            },
        }
    }

    /// Gives the terminal back to the user. Every step runs even if an
    /// earlier one fails; the first failure is returned.
    fn restore_terminal(&mut self, keyboard_enhanced: bool) -> beta::Result<()> {
        let mut first: Option<beta::Error> = None;
        let mut note = |step: &str, result: beta::Result<()>| {
            if let Err(e) = result {
                error!("Failed to {} on exit: {}", step, e);
                first.get_or_insert(e);
            }
        };
        if self.input.is_initialized() {
            note("disable mouse capture", self.input.shutdown(&mut self.out));
        }
        if keyboard_enhanced {
            note("pop keyboard flags", self.out.execute_other_command(PopKeyboardEnhancementFlags).map_err(Into::into));
        }
        note("show cursor", self.out.execute_other_command(Show).map_err(Into::into));
        note("disable raw mode", disable_raw_mode().map_err(Into::into));
        first.map_or(Ok(()), Err)
    }
}

// A panicking frame poisons the lock; the session is still needed to clean up.
fn lock_session(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Picks the error `main` reports: a panic first, then a failed frame, then
/// a failed cleanup.
fn exit_status(waited: beta::Result<()>, failure: Option<beta::Error>, cleanup: beta::Result<()>) -> beta::Result<()> {
    waited?;
    if let Some(e) = failure {
        return Err(e);
    }
    cleanup
}

fn debug_script() -> SimulatedInput {
    let mut sim = SimulatedInput::default();
    sim.key(1, KeyCode::Right, KeyEventKind::Press)
        .key(2, KeyCode::Down, KeyEventKind::Press)
        .key(3, KeyCode::Char(' '), KeyEventKind::Press)
        .click(4, 12, 6)
        .key(5, KeyCode::Left, KeyEventKind::Press)
        .key(DEFAULT_DEBUG_FRAMES - 1, KeyCode::Char('q'), KeyEventKind::Press);
    sim
}

fn main() -> beta::Result<()> {
    let args = Args::parse();
    simple_logging::log_to_file(&args.log_file, log::LevelFilter::Info)?;
    info!("Starting beta demo.");

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut out;
    let mut renderer;
    let mut simulated_input = None;
    let mut keyboard_enhanced = false;
    let max_frames;

    if args.debug {
        info!("Debug mode enabled. Resolution set to {}x{}", args.width, args.height);
        out = OutputTarget::ScreenBuffer(ScreenBuffer::new(args.width, args.height));
        renderer = Renderer::new(args.width, args.height);
        simulated_input = Some(debug_script());
        max_frames = Some(args.frames.unwrap_or(DEFAULT_DEBUG_FRAMES));
    } else {
        info!("Attempting to enable raw mode.");
        enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;
        out = OutputTarget::Stdout(io::stdout());
        out.execute_other_command(Hide).map_err(|e| { error!("Failed to hide cursor: {}", e); e })?;
        if supports_keyboard_enhancement().unwrap_or(false) {
            out.execute_other_command(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))?;
            keyboard_enhanced = true;
        }
        renderer = Renderer::new(0, 0);
        renderer.resize_to_max().map_err(|e| { error!("Failed to get terminal size: {}", e); e })?;
        max_frames = args.frames;
    }

    let mut input = InputState::new();
    input.init(&mut out)?;
    let demo = Demo::new(renderer.width(), renderer.height(), rng);
    demo.bind(&mut input)?;

    let session = Arc::new(Mutex::new(Session {
        out,
        renderer,
        input,
        demo,
        // Scripted input only ever presses keys.
        release_keys_each_frame: args.debug || !keyboard_enhanced,
        simulated_input,
        frame_count: 0,
        max_frames,
        failure: None,
    }));

    let fps = args.fps.max(1);
    let shared = Arc::clone(&session);
    let handle = animate(Duration::from_secs(1) / fps, move |dt| lock_session(&shared).run_frame(dt));
    let waited = handle.wait();
    if let Err(e) = &waited {
        error!("Animation ended abnormally: {}", e);
    }

    let mut session = lock_session(&session);
    let cleanup = if args.debug { Ok(()) } else { session.restore_terminal(keyboard_enhanced) };
    info!("Exiting after {} frames.", session.frame_count);
    exit_status(waited, session.failure.take(), cleanup)
}
