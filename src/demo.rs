use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::info;
use rand::rngs::StdRng;

use crate::color::{Color, hsl, hsla, hsv, hwb, rgb};
use crate::constants::*;
use crate::error::Result;
use crate::input::InputState;
use crate::rendering::{Renderer, Style};
use crate::util::{clamp, rand_element, rand_int, rand_num};
use crate::vector::Vector2D;

fn flag() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

/// The demo scene: a hue wheel, HSV and HWB swatches, a spinning polygon
/// with an orbiting dot, and a player marker driven by the keyboard.
pub struct Demo {
    player: Vector2D,
    orbit: f64,
    spin: f64,
    sides: usize,
    sparkle: char,
    sparkle_timer: f64,
    marks: Vec<(Vector2D, Color)>,
    rng: StdRng,
    quit: Arc<AtomicBool>,
    reshape: Arc<AtomicBool>,
    click: Arc<AtomicBool>,
}

impl Demo {
    pub fn new(width: u16, height: u16, rng: StdRng) -> Self {
        Demo {
            player: Vector2D::new(width as f64 / 2.0, height as f64 / 2.0),
            orbit: 0.0,
            spin: 0.0,
            sides: 6,
            sparkle: SPARKLES[0],
            sparkle_timer: 0.0,
            marks: Vec::new(),
            rng,
            quit: flag(),
            reshape: flag(),
            click: flag(),
        }
    }

    /// Registers the quit, reshape and click callbacks.
    pub fn bind(&self, input: &mut InputState) -> Result<()> {
        for name in ["q", "escape"] {
            let quit = Arc::clone(&self.quit);
            input.on_button_down(name, move |_| quit.store(true, Ordering::Release))?;
        }
        let reshape = Arc::clone(&self.reshape);
        input.on_button_down("space", move |_| reshape.store(true, Ordering::Release))?;
        let click = Arc::clone(&self.click);
        input.on_button_down("mouse_left", move |_| click.store(true, Ordering::Release))?;
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }

    pub fn player(&self) -> Vector2D {
        self.player
    }

    pub fn sides(&self) -> usize {
        self.sides
    }

    pub fn marks(&self) -> &[(Vector2D, Color)] {
        &self.marks
    }

    pub fn update(&mut self, dt: f64, input: &InputState, renderer: &Renderer) -> Result<()> {
        let mut heading = Vector2D::ZERO;
        if input.is_button_down("left")? || input.is_button_down("a")? {
            heading.x -= 1.0;
        }
        if input.is_button_down("right")? || input.is_button_down("d")? {
            heading.x += 1.0;
        }
        if input.is_button_down("up")? || input.is_button_down("w")? {
            heading.y -= 1.0;
        }
        if input.is_button_down("down")? || input.is_button_down("s")? {
            heading.y += 1.0;
        }
        let step = heading.normalize().scale(Vector2D::new(TERMINAL_ASPECT_RATIO_COMPENSATION, 1.0));
        let moved = self.player.add(step.scalar_mult(PLAYER_SPEED * dt));
        let size = renderer.size();
        self.player = Vector2D::new(clamp(moved.x, 0.0, size.x - 1.0), clamp(moved.y, 1.0, size.y - 1.0));

        self.orbit = (self.orbit + ORBIT_SPEED * dt) % 360.0;
        self.spin = (self.spin + SPIN_SPEED * dt) % 360.0;

        self.sparkle_timer += dt;
        if self.sparkle_timer >= SPARKLE_INTERVAL {
            self.sparkle_timer -= SPARKLE_INTERVAL;
            if let Some(&s) = rand_element(&mut self.rng, &SPARKLES) {
                self.sparkle = s;
            }
        }

        if self.reshape.swap(false, Ordering::AcqRel) {
            if let Some(n) = rand_int(&mut self.rng, 3.0, 8.0) {
                self.sides = n as usize;
                info!("Polygon reshaped to {} sides", self.sides);
            }
        }

        if self.click.swap(false, Ordering::AcqRel) {
            let at = input.mouse_pos(renderer)?;
            let hue = rand_num(&mut self.rng, 0.0, 360.0);
            self.marks.push((at, hsl(hue, 90.0, 60.0)));
            if self.marks.len() > MAX_MARKS {
                self.marks.remove(0);
            }
            info!("Mark placed at {}", at);
        }
        Ok(())
    }

    /// Center of the spinning polygon and its orbit, in scene units.
    fn hub(&self, scene: Vector2D) -> Vector2D {
        Vector2D::new(scene.x * 0.65, scene.y / 2.0)
    }

    fn radius(&self, scene: Vector2D) -> f64 {
        ((scene.y - 4.0) / 2.0).min(scene.x / 5.0).max(2.0)
    }

    pub fn draw(&self, renderer: &mut Renderer) {
        renderer.clear();
        let size = renderer.size();
        // Scene units are square: one unit spans two columns.
        let scene = Vector2D::new(size.x / TERMINAL_ASPECT_RATIO_COMPENSATION, size.y);
        let radius = self.radius(scene);

        renderer.save();
        renderer.scale(TERMINAL_ASPECT_RATIO_COMPENSATION, 1.0);

        let wheel = Vector2D::new(radius + 1.0, radius + 1.5);
        for i in 0..12 {
            let start = i as f64 * 30.0;
            renderer.fill_sector(wheel, radius, start, start + 30.0, hsl(start, 100.0, 50.0));
        }
        renderer.line_circle(wheel, radius, 0.5, Style::from('.'));

        let hub = self.hub(scene);
        let points: Vec<Vector2D> = (0..self.sides)
            .map(|k| hub.add(Vector2D::from_polar(radius * 0.8, k as f64 * 360.0 / self.sides as f64)))
            .map(|p| p.rotate(hub, self.spin))
            .collect();
        renderer.fill_polygon(&points, hsla(self.spin, 60.0, 25.0, 0.5));
        renderer.line_polygon(&points, 0.5, Style::new('#', hsl(self.spin, 80.0, 60.0)));
        renderer.arc(hub, radius * 1.2, self.orbit - 60.0, self.orbit, 0.5, Style::from('~'));

        let dot = hub.add(Vector2D::from_polar(radius * 1.2, self.orbit));
        renderer.fill_circle(dot, 1.0, hwb(self.orbit, 10.0, 10.0));

        let swatch = Vector2D::new(scene.x / 12.0, 1.0);
        for i in 0..12 {
            let hue = i as f64 * 30.0;
            let x = i as f64 * swatch.x;
            renderer.fill_rect(Vector2D::new(x, scene.y - 2.0), swatch, hsv(hue, 100.0, 100.0));
            renderer.fill_rect(Vector2D::new(x, scene.y - 1.0), swatch, hwb(hue, 20.0, 30.0));
        }
        renderer.restore();

        for (at, color) in &self.marks {
            renderer.text(*at, &self.sparkle.to_string(), Some(*color));
        }
        renderer.text(self.player, "@", Some(rgb(255.0, 255.0, 255.0)));

        let dot_cells = dot.scale(Vector2D::new(TERMINAL_ASPECT_RATIO_COMPENSATION, 1.0));
        let status = format!(
            "player {}  grid distance to dot {:.0}  sparkle {}  swatch {}",
            self.player,
            self.player.grid_distance(dot_cells),
            self.sparkle,
            hsl(self.orbit, 100.0, 50.0),
        );
        renderer.clear_rect(Vector2D::ZERO, Vector2D::new(size.x, 1.0));
        renderer.text(Vector2D::ZERO, &status, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Button, InputEvent};
    use crate::rendering::{OutputTarget, ScreenBuffer};
    use rand::SeedableRng;

    fn setup() -> (Demo, InputState, Renderer) {
        let mut input = InputState::new();
        input.init(&mut OutputTarget::ScreenBuffer(ScreenBuffer::new(1, 1))).unwrap();
        let demo = Demo::new(40, 20, StdRng::seed_from_u64(5));
        demo.bind(&mut input).unwrap();
        (demo, input, Renderer::new(40, 20))
    }

    #[test]
    fn right_arrow_moves_player() {
        let (mut demo, mut input, renderer) = setup();
        let start = demo.player();
        input.handle_event(&InputEvent::ButtonDown(button("right"))).unwrap();
        demo.update(0.5, &input, &renderer).unwrap();
        assert!(demo.player().x > start.x);
        assert_eq!(demo.player().y, start.y);
    }

    #[test]
    fn player_stays_on_screen() {
        let (mut demo, mut input, renderer) = setup();
        input.handle_event(&InputEvent::ButtonDown(button("up"))).unwrap();
        demo.update(100.0, &input, &renderer).unwrap();
        assert_eq!(demo.player().y, 1.0);
    }

    #[test]
    fn quit_and_reshape_callbacks() {
        let (mut demo, mut input, renderer) = setup();
        input.handle_event(&InputEvent::ButtonDown(button("space"))).unwrap();
        demo.update(0.0, &input, &renderer).unwrap();
        assert!((3..=8).contains(&demo.sides()));
        assert!(!demo.is_finished());
        input.handle_event(&InputEvent::ButtonDown(button("escape"))).unwrap();
        assert!(demo.is_finished());
    }

    #[test]
    fn click_places_mark_at_pointer() {
        let (mut demo, mut input, renderer) = setup();
        input.handle_event(&InputEvent::MouseMove(Vector2D::new(7.0, 3.0))).unwrap();
        input.handle_event(&InputEvent::ButtonDown(Button::Mouse(0))).unwrap();
        input.handle_event(&InputEvent::ButtonUp(Button::Mouse(0))).unwrap();
        demo.update(0.0, &input, &renderer).unwrap();
        assert_eq!(demo.marks().len(), 1);
        assert_eq!(demo.marks()[0].0, Vector2D::new(7.0, 3.0));
    }

    #[test]
    fn draw_fills_scene_and_status_line() {
        let (demo, _input, mut renderer) = setup();
        demo.draw(&mut renderer);
        assert!(renderer.grid().row_string(0).starts_with("player (20, 10)"));
        let bottom = renderer.grid().get(0, 19).unwrap();
        assert_eq!(bottom.color, Some(hwb(0.0, 20.0, 30.0)));
        let player = renderer.grid().get(20, 10).unwrap();
        assert_eq!(player.glyph, '@');
    }

    fn button(name: &str) -> Button {
        crate::input::button(name).unwrap()
    }
}
