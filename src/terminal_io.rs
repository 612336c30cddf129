use std::collections::HashMap;
use std::io;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

// --- SimulatedInput for headless runs ---
/// Host events scripted by frame number, replayed in place of a terminal.
#[derive(Default)]
pub struct SimulatedInput {
    events: HashMap<u64, Vec<Event>>,
    current_frame: u64,
}

impl SimulatedInput {
    pub fn new(events: HashMap<u64, Vec<Event>>) -> Self {
        SimulatedInput { events, current_frame: 0 }
    }

    pub fn push(&mut self, frame: u64, event: Event) -> &mut Self {
        self.events.entry(frame).or_default().push(event);
        self
    }

    pub fn key(&mut self, frame: u64, code: KeyCode, kind: KeyEventKind) -> &mut Self {
        self.push(
            frame,
            Event::Key(KeyEvent { code, modifiers: KeyModifiers::NONE, kind, state: KeyEventState::NONE }),
        )
    }

    pub fn click(&mut self, frame: u64, column: u16, row: u16) -> &mut Self {
        let at = |kind| Event::Mouse(MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE });
        self.push(frame, at(MouseEventKind::Down(MouseButton::Left)));
        self.push(frame, at(MouseEventKind::Up(MouseButton::Left)))
    }

    /// Whether events remain for `frame_count`.
    pub fn poll(&mut self, frame_count: u64) -> io::Result<bool> {
        self.current_frame = frame_count;
        Ok(self.events.get(&frame_count).is_some_and(|events| !events.is_empty()))
    }

    /// Next event of the frame last polled, in the order scripted.
    pub fn read(&mut self) -> io::Result<Event> {
        match self.events.get_mut(&self.current_frame) {
            Some(events) if !events.is_empty() => Ok(events.remove(0)),
            _ => Ok(Event::Key(KeyCode::Null.into())),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.events.values().all(Vec::is_empty)
    }
}
