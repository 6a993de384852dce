//! Window-system-independent pieces of the render loop: the close state
//! machine, the held-key state it is driven by, and viewport sizing.

use glutin::dpi::PhysicalSize;
use glutin::event::{ElementState, VirtualKeyCode};
use glutin::event_loop::ControlFlow;

/// Key that ends the loop.
pub const EXIT_KEY: VirtualKeyCode = VirtualKeyCode::Escape;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Closing,
}

/// Tracks whether the exit key is currently held, fed from keyboard events
/// and sampled once per frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputState {
    exit_held: bool,
}

impl InputState {
    pub fn key_event(&mut self, key: Option<VirtualKeyCode>, state: ElementState) {
        if key == Some(EXIT_KEY) {
            self.exit_held = state == ElementState::Pressed;
        }
    }

    pub fn exit_held(&self) -> bool {
        self.exit_held
    }
}

/// Close flag of the render loop.
///
/// Requests only set the flag; the loop observes it at the top of its next
/// iteration through [`FrameLoop::should_close`].
#[derive(Debug)]
pub struct FrameLoop {
    state: LoopState,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Running,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn should_close(&self) -> bool {
        self.state == LoopState::Closing
    }

    /// How the event loop continues after the current batch of events:
    /// keep polling while running, stop once closing.
    pub fn control_flow(&self) -> ControlFlow {
        match self.state {
            LoopState::Running => ControlFlow::Poll,
            LoopState::Closing => ControlFlow::Exit,
        }
    }

    pub fn request_close(&mut self) {
        if self.state == LoopState::Running {
            log::info!("close requested after {} frames", self.frames);
        }
        self.state = LoopState::Closing;
    }

    /// Per-frame input step: holding the exit key moves the loop to `Closing`.
    pub fn process_input(&mut self, input: &InputState) {
        if input.exit_held() {
            self.request_close();
        }
    }

    pub fn frame_finished(&mut self) {
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

/// Rendering viewport as passed to `glViewport`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    /// Covers the whole framebuffer. Sizes past `i32::MAX` saturate.
    pub fn covering(size: PhysicalSize<u32>) -> Self {
        Self {
            x: 0,
            y: 0,
            width: i32::try_from(size.width).unwrap_or(i32::MAX),
            height: i32::try_from(size.height).unwrap_or(i32::MAX),
        }
    }

    pub fn apply(&self) {
        unsafe {
            gl::Viewport(self.x, self.y, self.width, self.height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running() {
        let frame_loop = FrameLoop::new();
        assert_eq!(frame_loop.state(), LoopState::Running);
        assert!(!frame_loop.should_close());
    }

    #[test]
    fn escape_press_closes_within_one_frame() {
        let mut input = InputState::default();
        let mut frame_loop = FrameLoop::new();

        frame_loop.process_input(&input);
        frame_loop.frame_finished();
        assert!(!frame_loop.should_close());

        input.key_event(Some(VirtualKeyCode::Escape), ElementState::Pressed);
        frame_loop.process_input(&input);
        assert!(frame_loop.should_close());
        assert_eq!(frame_loop.frames(), 1);
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut input = InputState::default();
        input.key_event(Some(VirtualKeyCode::Space), ElementState::Pressed);
        input.key_event(None, ElementState::Pressed);
        assert!(!input.exit_held());

        let mut frame_loop = FrameLoop::new();
        frame_loop.process_input(&input);
        assert_eq!(frame_loop.state(), LoopState::Running);
    }

    #[test]
    fn released_escape_is_not_held() {
        let mut input = InputState::default();
        input.key_event(Some(VirtualKeyCode::Escape), ElementState::Pressed);
        input.key_event(Some(VirtualKeyCode::Escape), ElementState::Released);
        assert!(!input.exit_held());
    }

    #[test]
    fn running_loop_keeps_polling() {
        let mut frame_loop = FrameLoop::default();
        frame_loop.process_input(&InputState::default());
        frame_loop.frame_finished();
        assert_eq!(frame_loop.control_flow(), ControlFlow::Poll);
    }

    #[test]
    fn escape_during_a_frame_exits_right_after_it() {
        let mut input = InputState::default();
        let mut frame_loop = FrameLoop::new();

        // Pressed and still held: no further event arrives before the check.
        input.key_event(Some(EXIT_KEY), ElementState::Pressed);
        frame_loop.process_input(&input);
        frame_loop.frame_finished();

        assert_eq!(frame_loop.control_flow(), ControlFlow::Exit);
    }

    #[test]
    fn close_request_exits() {
        let mut frame_loop = FrameLoop::new();
        frame_loop.request_close();
        assert_eq!(frame_loop.control_flow(), ControlFlow::Exit);
    }

    #[test]
    fn closing_is_terminal() {
        let mut frame_loop = FrameLoop::new();
        frame_loop.request_close();
        frame_loop.process_input(&InputState::default());
        assert_eq!(frame_loop.state(), LoopState::Closing);
    }

    #[test]
    fn viewport_covers_framebuffer() {
        assert_eq!(
            Viewport::covering(PhysicalSize::new(1024, 768)),
            Viewport { x: 0, y: 0, width: 1024, height: 768 }
        );
    }

    #[test]
    fn viewport_saturates_oversized_dimensions() {
        let viewport = Viewport::covering(PhysicalSize::new(u32::MAX, 0));
        assert_eq!((viewport.width, viewport.height), (i32::MAX, 0));
    }
}
