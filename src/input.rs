use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};

/// Tracks pointer input state across a frame.
///
/// Window events are folded in as they arrive via
/// [`handle_event`](Input::handle_event); per-frame deltas and edge flags are
/// cleared by [`begin_frame`](Input::begin_frame) at the start of each frame.
/// The orbit controller consumes this tracker through
/// [`OrbitControls::process_input`](crate::OrbitControls::process_input).
pub struct Input {
    mouse_buttons_down: HashSet<MouseButton>,
    mouse_buttons_pressed: HashSet<MouseButton>,
    mouse_buttons_released: HashSet<MouseButton>,
    mouse_position: Vec2,
    mouse_delta: Vec2,
    scroll_delta: Vec2,
    /// Active touch points in start order.
    touches: Vec<(u64, Vec2)>,
    touches_started: bool,
    touches_ended: bool,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            mouse_buttons_down: HashSet::new(),
            mouse_buttons_pressed: HashSet::new(),
            mouse_buttons_released: HashSet::new(),
            mouse_position: Vec2::ZERO,
            mouse_delta: Vec2::ZERO,
            scroll_delta: Vec2::ZERO,
            touches: Vec::new(),
            touches_started: false,
            touches_ended: false,
        }
    }
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the start of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.mouse_buttons_pressed.clear();
        self.mouse_buttons_released.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
        self.touches_started = false;
        self.touches_ended = false;
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    if !self.mouse_buttons_down.contains(button) {
                        self.mouse_buttons_pressed.insert(*button);
                    }
                    self.mouse_buttons_down.insert(*button);
                }
                ElementState::Released => {
                    self.mouse_buttons_down.remove(button);
                    self.mouse_buttons_released.insert(*button);
                }
            },
            WindowEvent::CursorMoved { position, .. } => {
                let new_pos = Vec2::new(position.x as f32, position.y as f32);
                self.mouse_delta += new_pos - self.mouse_position;
                self.mouse_position = new_pos;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let d = match delta {
                    winit::event::MouseScrollDelta::LineDelta(x, y) => Vec2::new(*x, *y),
                    winit::event::MouseScrollDelta::PixelDelta(pos) => {
                        Vec2::new(pos.x as f32, pos.y as f32) / 120.0
                    }
                };
                self.scroll_delta += d;
            }
            WindowEvent::Touch(touch) => {
                let pos = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                match touch.phase {
                    TouchPhase::Started => {
                        self.touches.push((touch.id, pos));
                        self.touches_started = true;
                    }
                    TouchPhase::Moved => {
                        if let Some(entry) = self.touches.iter_mut().find(|(id, _)| *id == touch.id)
                        {
                            entry.1 = pos;
                        }
                    }
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        self.touches.retain(|(id, _)| *id != touch.id);
                        self.touches_ended = true;
                    }
                }
            }
            _ => {}
        }
    }

    /// Returns true if the mouse button is currently held down.
    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons_down.contains(&button)
    }

    /// Returns true if the mouse button was pressed this frame.
    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons_pressed.contains(&button)
    }

    /// Returns true if the mouse button was released this frame.
    pub fn mouse_released(&self, button: MouseButton) -> bool {
        self.mouse_buttons_released.contains(&button)
    }

    /// Current mouse position in window coordinates.
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Mouse movement delta this frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Scroll wheel delta this frame (in "lines").
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    /// Number of active touch points.
    pub fn touch_count(&self) -> usize {
        self.touches.len()
    }

    /// Position of the `index`-th active touch point, in start order.
    pub fn touch_position(&self, index: usize) -> Option<Vec2> {
        self.touches.get(index).map(|(_, pos)| *pos)
    }

    /// Distance between the first two touch points, if a pinch is in
    /// progress.
    pub fn pinch_distance(&self) -> Option<f32> {
        if self.touches.len() >= 2 {
            Some((self.touches[0].1 - self.touches[1].1).length())
        } else {
            None
        }
    }

    /// Whether any touch began this frame.
    pub fn touch_started(&self) -> bool {
        self.touches_started
    }

    /// Whether any touch ended this frame.
    pub fn touch_ended(&self) -> bool {
        self.touches_ended
    }
}
