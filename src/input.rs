use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum KeyState {
    #[default]
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSource {
    /// Driven by a positive and a negative key.
    Key,
    /// Driven by the mouse movement since the last frame.
    Mouse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseAxis {
    #[default]
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMode {
    #[default]
    Normal,
    Disabled,
}

/// Describes how a named axis value is produced.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisMeta {
    pub source: AxisSource,
    pub positive_key: Option<String>,
    pub negative_key: Option<String>,
    pub from: MouseAxis,
    /// Units per second the value falls back towards zero once released.
    pub gravity: f64,
    /// Mouse deltas producing a smaller magnitude than this read as zero.
    pub dead: f64,
    pub sensitivity: f64,
    pub invert: bool,
}

impl AxisMeta {
    pub fn keys(positive: &str, negative: &str, gravity: f64, sensitivity: f64) -> Self {
        Self {
            source: AxisSource::Key,
            positive_key: Some(positive.to_string()),
            negative_key: Some(negative.to_string()),
            from: MouseAxis::X,
            gravity,
            dead: 0.0,
            sensitivity,
            invert: false,
        }
    }

    pub fn mouse(from: MouseAxis, sensitivity: f64) -> Self {
        Self {
            source: AxisSource::Mouse,
            positive_key: None,
            negative_key: None,
            from,
            gravity: 0.0,
            dead: 0.0,
            sensitivity,
            invert: false,
        }
    }
}

#[derive(Debug, Clone)]
struct AxisBinding {
    meta: AxisMeta,
    value: f64,
}

/// Keyboard, mouse and axis state, fed by the platform and read by behaviors.
///
/// Key edges (`key_down`/`key_up`) compare the state delivered this frame
/// against the state at the end of the previous frame.
#[derive(Debug, Default)]
pub struct Input {
    previous_keys: HashMap<String, KeyState>,
    current_keys: HashMap<String, KeyState>,
    previous_mouse: (f64, f64),
    current_mouse: (f64, f64),
    axes: HashMap<String, Vec<AxisBinding>>,
    cursor_mode: CursorMode,
    current_time: f64,
    last_time: Option<f64>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press_key(&mut self, key: &str) {
        self.current_keys.insert(key.to_string(), KeyState::Down);
    }

    pub fn release_key(&mut self, key: &str) {
        self.current_keys.insert(key.to_string(), KeyState::Up);
    }

    pub fn set_mouse_position(&mut self, x: f64, y: f64) {
        self.current_mouse = (x, y);
    }

    pub fn mouse_position(&self) -> (f64, f64) {
        self.current_mouse
    }

    pub fn mouse_delta(&self) -> (f64, f64) {
        (
            self.current_mouse.0 - self.previous_mouse.0,
            self.current_mouse.1 - self.previous_mouse.1,
        )
    }

    /// Held this frame.
    pub fn key(&self, key: &str) -> bool {
        self.state(&self.current_keys, key) == KeyState::Down
    }

    /// Went down this frame.
    pub fn key_down(&self, key: &str) -> bool {
        self.state(&self.current_keys, key) == KeyState::Down
            && self.state(&self.previous_keys, key) == KeyState::Up
    }

    /// Went up this frame.
    pub fn key_up(&self, key: &str) -> bool {
        self.state(&self.current_keys, key) == KeyState::Up
            && self.state(&self.previous_keys, key) == KeyState::Down
    }

    fn state(&self, map: &HashMap<String, KeyState>, key: &str) -> KeyState {
        map.get(key).copied().unwrap_or_default()
    }

    pub fn bind_axis(&mut self, axis: &str, meta: AxisMeta) {
        self.axes
            .entry(axis.to_string())
            .or_default()
            .push(AxisBinding { meta, value: 0.0 });
    }

    pub fn reset_axis(&mut self, axis: &str) {
        self.axes.remove(axis);
    }

    /// Value of the binding with the largest magnitude, 0 for unknown axes.
    pub fn axis(&self, axis: &str) -> f64 {
        let Some(bindings) = self.axes.get(axis) else {
            return 0.0;
        };
        let mut result = 0.0f64;
        for binding in bindings {
            let value = if binding.meta.invert {
                -binding.value
            } else {
                binding.value
            };
            if value.abs() >= result.abs() {
                result = value;
            }
        }
        result
    }

    pub fn set_cursor_mode(&mut self, mode: CursorMode) {
        self.cursor_mode = mode;
    }

    pub fn cursor_mode(&self) -> CursorMode {
        self.cursor_mode
    }

    /// Advances axis values. Called after events are polled and before
    /// behaviors update.
    pub fn frame_start(&mut self, time: f64) {
        self.current_time = time;
        let last_time = *self.last_time.get_or_insert(time);
        let dt = self.current_time - last_time;
        let mouse_delta = self.mouse_delta();

        // Held means down before this frame; a fresh press adds no hold time.
        let held = |key: &Option<String>| {
            key.as_deref()
                .map(|k| self.key(k) && !self.key_down(k))
                .unwrap_or(false)
        };
        let mut updates = Vec::new();
        for (name, bindings) in &self.axes {
            for (index, binding) in bindings.iter().enumerate() {
                let meta = &binding.meta;
                let value = match meta.source {
                    AxisSource::Key => {
                        let mut delta_hold = 0.0;
                        if held(&meta.positive_key) {
                            delta_hold += dt;
                        }
                        if held(&meta.negative_key) {
                            delta_hold -= dt;
                        }
                        step_key_axis(binding.value, delta_hold, meta.gravity * dt, meta.sensitivity)
                    }
                    AxisSource::Mouse => {
                        let delta = match meta.from {
                            MouseAxis::X => mouse_delta.0,
                            MouseAxis::Y => mouse_delta.1,
                        };
                        let value = delta * meta.sensitivity;
                        if value.abs() < meta.dead {
                            0.0
                        } else {
                            value
                        }
                    }
                };
                updates.push((name.clone(), index, value));
            }
        }

        for (name, index, value) in updates {
            if let Some(binding) = self.axes.get_mut(&name).and_then(|b| b.get_mut(index)) {
                binding.value = value;
            }
        }
    }

    /// Latches key and mouse state so the next frame can detect edges.
    pub fn frame_end(&mut self) {
        for (key, state) in &self.current_keys {
            self.previous_keys.insert(key.clone(), *state);
        }
        self.previous_mouse = self.current_mouse;
        self.last_time = Some(self.current_time);
    }
}

fn step_key_axis(value: f64, delta_hold: f64, fall: f64, sensitivity: f64) -> f64 {
    let mut value = value;
    if delta_hold == 0.0 {
        if value > 0.0 {
            value -= fall.min(value);
        } else {
            value += fall.min(-value);
        }
    } else {
        if value * delta_hold < 0.0 {
            value = 0.0;
        }
        value += delta_hold * sensitivity;
    }
    value.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_edges_last_one_frame() {
        let mut input = Input::new();
        input.press_key("w");
        assert!(input.key("w"));
        assert!(input.key_down("w"));
        assert!(!input.key_up("w"));

        input.frame_end();
        assert!(input.key("w"));
        assert!(!input.key_down("w"));

        input.release_key("w");
        assert!(input.key_up("w"));
        input.frame_end();
        assert!(!input.key_up("w"));
        assert!(!input.key("w"));
    }

    #[test]
    fn unknown_keys_read_as_up() {
        let input = Input::new();
        assert!(!input.key("space"));
        assert!(!input.key_down("space"));
        assert!(!input.key_up("space"));
    }

    #[test]
    fn key_axis_ramps_with_sensitivity_and_falls_with_gravity() {
        let mut input = Input::new();
        input.bind_axis("angle", AxisMeta::keys("w", "s", 0.5, 0.5));

        input.frame_start(0.0);
        input.frame_end();

        input.press_key("w");
        input.frame_start(1.0);
        // pressed this frame: no hold time yet
        assert_eq!(input.axis("angle"), 0.0);
        input.frame_end();

        input.frame_start(2.0);
        assert!((input.axis("angle") - 0.5).abs() < 1e-9);
        input.frame_end();

        input.frame_start(4.0);
        assert_eq!(input.axis("angle"), 1.0);
        input.frame_end();

        input.release_key("w");
        input.frame_start(5.0);
        assert!((input.axis("angle") - 0.5).abs() < 1e-9);
        input.frame_end();
    }

    #[test]
    fn opposite_key_resets_before_accumulating() {
        assert!((step_key_axis(0.8, -1.0, 0.0, 0.25) + 0.25).abs() < 1e-9);
        assert_eq!(step_key_axis(-0.2, 0.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn mouse_axis_scales_delta() {
        let mut input = Input::new();
        input.bind_axis("mouse x", AxisMeta::mouse(MouseAxis::X, 0.01));
        input.set_mouse_position(10.0, 0.0);
        input.frame_start(0.0);
        input.frame_end();

        input.set_mouse_position(60.0, 5.0);
        input.frame_start(0.1);
        assert!((input.axis("mouse x") - 0.5).abs() < 1e-9);
        input.frame_end();
    }

    #[test]
    fn axis_reports_largest_magnitude_binding() {
        let mut input = Input::new();
        let mut inverted = AxisMeta::mouse(MouseAxis::Y, 1.0);
        inverted.invert = true;
        input.bind_axis("look", AxisMeta::mouse(MouseAxis::X, 1.0));
        input.bind_axis("look", inverted);
        input.frame_start(0.0);
        input.frame_end();

        input.set_mouse_position(0.2, 0.5);
        input.frame_start(0.1);
        assert!((input.axis("look") + 0.5).abs() < 1e-9);

        input.reset_axis("look");
        assert_eq!(input.axis("look"), 0.0);
    }
}
