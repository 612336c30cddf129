use std::collections::{HashMap, HashSet};

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    ModifierKeyCode, MouseButton, MouseEvent, MouseEventKind,
};
use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::rendering::{OutputTarget, Renderer};
use crate::vector::Vector2D;

/// A trackable button: a keyboard key by browser key code, or a pointer
/// button by index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Key(u8),
    Mouse(u8),
}

/// Every button name the tracker knows.
pub const BUTTONS: &[(&str, Button)] = &[
    ("backspace", Button::Key(8)),
    ("tab", Button::Key(9)),
    ("enter", Button::Key(13)),
    ("shift", Button::Key(16)),
    ("ctrl", Button::Key(17)),
    ("alt", Button::Key(18)),
    ("pause", Button::Key(19)),
    ("capslock", Button::Key(20)),
    ("escape", Button::Key(27)),
    ("space", Button::Key(32)),
    ("pageup", Button::Key(33)),
    ("pagedown", Button::Key(34)),
    ("end", Button::Key(35)),
    ("home", Button::Key(36)),
    ("left", Button::Key(37)),
    ("up", Button::Key(38)),
    ("right", Button::Key(39)),
    ("down", Button::Key(40)),
    ("insert", Button::Key(45)),
    ("delete", Button::Key(46)),
    ("0", Button::Key(48)),
    ("1", Button::Key(49)),
    ("2", Button::Key(50)),
    ("3", Button::Key(51)),
    ("4", Button::Key(52)),
    ("5", Button::Key(53)),
    ("6", Button::Key(54)),
    ("7", Button::Key(55)),
    ("8", Button::Key(56)),
    ("9", Button::Key(57)),
    ("a", Button::Key(65)),
    ("b", Button::Key(66)),
    ("c", Button::Key(67)),
    ("d", Button::Key(68)),
    ("e", Button::Key(69)),
    ("f", Button::Key(70)),
    ("g", Button::Key(71)),
    ("h", Button::Key(72)),
    ("i", Button::Key(73)),
    ("j", Button::Key(74)),
    ("k", Button::Key(75)),
    ("l", Button::Key(76)),
    ("m", Button::Key(77)),
    ("n", Button::Key(78)),
    ("o", Button::Key(79)),
    ("p", Button::Key(80)),
    ("q", Button::Key(81)),
    ("r", Button::Key(82)),
    ("s", Button::Key(83)),
    ("t", Button::Key(84)),
    ("u", Button::Key(85)),
    ("v", Button::Key(86)),
    ("w", Button::Key(87)),
    ("x", Button::Key(88)),
    ("y", Button::Key(89)),
    ("z", Button::Key(90)),
    ("f1", Button::Key(112)),
    ("f2", Button::Key(113)),
    ("f3", Button::Key(114)),
    ("f4", Button::Key(115)),
    ("f5", Button::Key(116)),
    ("f6", Button::Key(117)),
    ("f7", Button::Key(118)),
    ("f8", Button::Key(119)),
    ("f9", Button::Key(120)),
    ("f10", Button::Key(121)),
    ("f11", Button::Key(122)),
    ("f12", Button::Key(123)),
    ("mouse_left", Button::Mouse(0)),
    ("mouse_middle", Button::Mouse(1)),
    ("mouse_right", Button::Mouse(2)),
    ("mouse_back", Button::Mouse(3)),
    ("mouse_forward", Button::Mouse(4)),
];

/// Looks a button up by name, ignoring case.
pub fn button(name: &str) -> Option<Button> {
    let name = name.to_ascii_lowercase();
    BUTTONS.iter().find(|(n, _)| *n == name).map(|&(_, b)| b)
}

fn key_code(code: KeyCode) -> Option<u8> {
    let code = match code {
        KeyCode::Backspace => 8,
        KeyCode::Tab | KeyCode::BackTab => 9,
        KeyCode::Enter => 13,
        KeyCode::Pause => 19,
        KeyCode::CapsLock => 20,
        KeyCode::Esc => 27,
        KeyCode::PageUp => 33,
        KeyCode::PageDown => 34,
        KeyCode::End => 35,
        KeyCode::Home => 36,
        KeyCode::Left => 37,
        KeyCode::Up => 38,
        KeyCode::Right => 39,
        KeyCode::Down => 40,
        KeyCode::Insert => 45,
        KeyCode::Delete => 46,
        KeyCode::F(n @ 1..=12) => 111 + n,
        KeyCode::Char(' ') => 32,
        KeyCode::Char(c) if c.is_ascii_digit() => c as u8,
        KeyCode::Char(c) if c.is_ascii_alphabetic() => c.to_ascii_uppercase() as u8,
        KeyCode::Modifier(m) => match m {
            ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => 16,
            ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => 17,
            ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => 18,
            _ => return None,
        },
        _ => return None,
    };
    Some(code)
}

fn mouse_index(button: MouseButton) -> u8 {
    match button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    ButtonDown(Button),
    ButtonUp(Button),
    /// Pointer position in terminal cells.
    MouseMove(Vector2D),
}

impl InputEvent {
    /// Mouse presses and releases are preceded by a move to where they happened.
    pub fn from_crossterm(event: &Event) -> Vec<InputEvent> {
        match event {
            Event::Key(KeyEvent { code, kind, .. }) => {
                let Some(key) = key_code(*code) else {
                    return Vec::new();
                };
                match kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => vec![InputEvent::ButtonDown(Button::Key(key))],
                    KeyEventKind::Release => vec![InputEvent::ButtonUp(Button::Key(key))],
                }
            },
            Event::Mouse(MouseEvent { kind, column, row, .. }) => {
                let moved = InputEvent::MouseMove(Vector2D::new(*column as f64, *row as f64));
                match kind {
                    MouseEventKind::Down(b) => vec![moved, InputEvent::ButtonDown(Button::Mouse(mouse_index(*b)))],
                    MouseEventKind::Up(b) => vec![moved, InputEvent::ButtonUp(Button::Mouse(mouse_index(*b)))],
                    MouseEventKind::Moved | MouseEventKind::Drag(_) => vec![moved],
                    _ => Vec::new(),
                }
            },
            _ => Vec::new(),
        }
    }
}

type ButtonCallback = Box<dyn FnMut(&InputEvent) + Send>;

/// Which buttons are held, plus callbacks fired on presses and releases.
///
/// Owned by the caller; every query fails until [`InputState::init`] has run.
#[derive(Default)]
pub struct InputState {
    initialized: bool,
    down: HashSet<Button>,
    on_down: HashMap<Button, Vec<ButtonCallback>>,
    on_up: HashMap<Button, Vec<ButtonCallback>>,
    mouse: Vector2D,
}

impl InputState {
    pub fn new() -> Self {
        InputState::default()
    }

    /// Enables mouse reporting on the terminal and starts accepting events.
    pub fn init(&mut self, out: &mut OutputTarget) -> Result<()> {
        out.execute_other_command(EnableMouseCapture)?;
        self.initialized = true;
        info!("Input tracking initialized.");
        Ok(())
    }

    pub fn shutdown(&mut self, out: &mut OutputTarget) -> Result<()> {
        self.require_init()?;
        out.execute_other_command(DisableMouseCapture)?;
        self.initialized = false;
        self.down.clear();
        info!("Input tracking shut down.");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn require_init(&self) -> Result<()> {
        if self.initialized { Ok(()) } else { Err(Error::InputNotInitialized) }
    }

    fn lookup(&self, name: &str) -> Result<Button> {
        self.require_init()?;
        button(name).ok_or_else(|| {
            warn!("Unknown button name {:?}", name);
            Error::UnknownButton(name.to_string())
        })
    }

    pub fn is_button_down(&self, name: &str) -> Result<bool> {
        let b = self.lookup(name)?;
        Ok(self.down.contains(&b))
    }

    pub fn on_button_down(&mut self, name: &str, callback: impl FnMut(&InputEvent) + Send + 'static) -> Result<()> {
        let b = self.lookup(name)?;
        self.on_down.entry(b).or_default().push(Box::new(callback));
        Ok(())
    }

    pub fn on_button_up(&mut self, name: &str, callback: impl FnMut(&InputEvent) + Send + 'static) -> Result<()> {
        let b = self.lookup(name)?;
        self.on_up.entry(b).or_default().push(Box::new(callback));
        Ok(())
    }

    /// Pointer position relative to where `renderer` is presented.
    pub fn mouse_pos(&self, renderer: &Renderer) -> Result<Vector2D> {
        self.require_init()?;
        let (col, row) = renderer.offset();
        Ok(self.mouse.subtract(Vector2D::new(col as f64, row as f64)))
    }

    /// Applies one event. A press of a button that is already down is
    /// dropped, so held keys do not auto-repeat.
    pub fn handle_event(&mut self, event: &InputEvent) -> Result<()> {
        self.require_init()?;
        match *event {
            InputEvent::ButtonDown(b) => {
                if self.down.insert(b) {
                    debug!("{:?} down", b);
                    fire(&mut self.on_down, b, event);
                }
            },
            InputEvent::ButtonUp(b) => {
                self.down.remove(&b);
                debug!("{:?} up", b);
                fire(&mut self.on_up, b, event);
            },
            InputEvent::MouseMove(pos) => self.mouse = pos,
        }
        Ok(())
    }

    pub fn handle_crossterm(&mut self, event: &Event) -> Result<()> {
        for e in InputEvent::from_crossterm(event) {
            self.handle_event(&e)?;
        }
        Ok(())
    }

    /// Marks every keyboard key as up without firing callbacks. Terminals
    /// that never report key releases need this once per frame.
    pub fn release_keys(&mut self) {
        self.down.retain(|b| matches!(b, Button::Mouse(_)));
    }
}

fn fire(callbacks: &mut HashMap<Button, Vec<ButtonCallback>>, b: Button, event: &InputEvent) {
    if let Some(list) = callbacks.get_mut(&b) {
        for callback in list.iter_mut() {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::ScreenBuffer;
    use crossterm::event::{KeyEventState, KeyModifiers};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ready() -> InputState {
        let mut input = InputState::new();
        let mut out = OutputTarget::ScreenBuffer(ScreenBuffer::new(1, 1));
        input.init(&mut out).unwrap();
        input
    }

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent { code, modifiers: KeyModifiers::NONE, kind, state: KeyEventState::NONE })
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE })
    }

    #[test]
    fn table_lookup_ignores_case() {
        assert_eq!(button("A"), Some(Button::Key(65)));
        assert_eq!(button("F12"), Some(Button::Key(123)));
        assert_eq!(button("mouse_forward"), Some(Button::Mouse(4)));
        assert_eq!(button("hyper"), None);
        assert_eq!(BUTTONS.len(), 26 + 10 + 20 + 12 + 5);
    }

    #[test]
    fn crossterm_keys_map_to_key_codes() {
        assert_eq!(
            InputEvent::from_crossterm(&key(KeyCode::Char('Q'), KeyEventKind::Press)),
            vec![InputEvent::ButtonDown(Button::Key(81))]
        );
        assert_eq!(
            InputEvent::from_crossterm(&key(KeyCode::F(5), KeyEventKind::Release)),
            vec![InputEvent::ButtonUp(Button::Key(116))]
        );
        assert_eq!(
            InputEvent::from_crossterm(&key(KeyCode::Modifier(ModifierKeyCode::RightShift), KeyEventKind::Press)),
            vec![InputEvent::ButtonDown(Button::Key(16))]
        );
        assert!(InputEvent::from_crossterm(&key(KeyCode::Char('%'), KeyEventKind::Press)).is_empty());
        assert!(InputEvent::from_crossterm(&Event::FocusGained).is_empty());
    }

    #[test]
    fn crossterm_mouse_moves_before_pressing() {
        assert_eq!(
            InputEvent::from_crossterm(&mouse(MouseEventKind::Down(MouseButton::Right), 4, 7)),
            vec![
                InputEvent::MouseMove(Vector2D::new(4.0, 7.0)),
                InputEvent::ButtonDown(Button::Mouse(2)),
            ]
        );
        assert!(InputEvent::from_crossterm(&mouse(MouseEventKind::ScrollUp, 0, 0)).is_empty());
    }

    #[test]
    fn queries_before_init_fail() {
        let mut input = InputState::new();
        assert!(matches!(input.is_button_down("a"), Err(Error::InputNotInitialized)));
        assert!(matches!(
            input.handle_event(&InputEvent::ButtonDown(Button::Key(65))),
            Err(Error::InputNotInitialized)
        ));
        assert!(matches!(input.on_button_up("a", |_| {}), Err(Error::InputNotInitialized)));
    }

    #[test]
    fn unknown_names_fail() {
        let mut input = ready();
        match input.is_button_down("nope") {
            Err(Error::UnknownButton(name)) => assert_eq!(name, "nope"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(input.on_button_down("nope", |_| {}).is_err());
    }

    #[test]
    fn tracks_down_and_up() {
        let mut input = ready();
        input.handle_crossterm(&key(KeyCode::Left, KeyEventKind::Press)).unwrap();
        assert!(input.is_button_down("left").unwrap());
        assert!(!input.is_button_down("right").unwrap());
        input.handle_crossterm(&key(KeyCode::Left, KeyEventKind::Release)).unwrap();
        assert!(!input.is_button_down("left").unwrap());
    }

    #[test]
    fn held_key_does_not_repeat_callbacks() {
        let mut input = ready();
        let downs = Arc::new(AtomicUsize::new(0));
        let ups = Arc::new(AtomicUsize::new(0));
        let d = Arc::clone(&downs);
        let u = Arc::clone(&ups);
        input.on_button_down("space", move |_| { d.fetch_add(1, Ordering::SeqCst); }).unwrap();
        input.on_button_up("space", move |_| { u.fetch_add(1, Ordering::SeqCst); }).unwrap();

        input.handle_crossterm(&key(KeyCode::Char(' '), KeyEventKind::Press)).unwrap();
        input.handle_crossterm(&key(KeyCode::Char(' '), KeyEventKind::Repeat)).unwrap();
        input.handle_crossterm(&key(KeyCode::Char(' '), KeyEventKind::Press)).unwrap();
        assert_eq!(downs.load(Ordering::SeqCst), 1);

        input.handle_crossterm(&key(KeyCode::Char(' '), KeyEventKind::Release)).unwrap();
        input.handle_crossterm(&key(KeyCode::Char(' '), KeyEventKind::Press)).unwrap();
        assert_eq!(downs.load(Ordering::SeqCst), 2);
        assert_eq!(ups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_keys_keeps_mouse_buttons() {
        let mut input = ready();
        input.handle_event(&InputEvent::ButtonDown(Button::Key(65))).unwrap();
        input.handle_event(&InputEvent::ButtonDown(Button::Mouse(0))).unwrap();
        input.release_keys();
        assert!(!input.is_button_down("a").unwrap());
        assert!(input.is_button_down("mouse_left").unwrap());
    }

    #[test]
    fn mouse_pos_is_relative_to_renderer() {
        let mut input = ready();
        let mut renderer = Renderer::new(10, 10);
        renderer.set_offset(3, 2);
        input.handle_crossterm(&mouse(MouseEventKind::Moved, 8, 9)).unwrap();
        assert_eq!(input.mouse_pos(&renderer).unwrap(), Vector2D::new(5.0, 7.0));
    }

    #[test]
    fn shutdown_requires_init_again() {
        let mut input = ready();
        let mut out = OutputTarget::ScreenBuffer(ScreenBuffer::new(1, 1));
        input.shutdown(&mut out).unwrap();
        assert!(!input.is_initialized());
        assert!(input.is_button_down("a").is_err());
    }
}
