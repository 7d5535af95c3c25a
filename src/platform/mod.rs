//=========================================================================
// Platform Subsystem
//
// Winit window and event loop driving the game on the main thread.
//
// Architecture:
// ```text
//  Winit Event Loop (main thread)
//   ├─ window_event
//   │    ├─ InputProcessor (winit → InputEvent, sticky modifiers)
//   │    ├─ InputBuffer    (discrete + coalesced continuous)
//   │    └─ CloseRequested → PlatformEvent::WindowClosed
//   │
//   └─ about_to_wait (tick boundary, paced by WaitUntil at TPS)
//        ├─ flush buffer → bounded channel
//        ├─ Game::tick(dt) → Exit ends the loop
//        └─ PlatformCommand (fullscreen) applied to the window
// ```
//
// There is no second thread: the same channel the headless driver
// writes to is drained by the game inside about_to_wait.
//
//=========================================================================

//=== Submodules ==========================================================

mod input_buffer;
mod input_processor;

//=== External Crates =====================================================

use std::time::{Duration, Instant};

use crossbeam_channel::{Sender, TrySendError};
use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::platform_bridge::{PlatformCommand, PlatformError, PlatformEvent, TickControl};
use crate::game::Game;
use input_buffer::InputBuffer;
use input_processor::InputProcessor;

pub const WINDOW_TITLE: &str = "模拟生存 - Simulate to Survive";

//=== Platform ============================================================

/// Window owner and tick pacer.
///
/// The window is created lazily in `resumed()`; the game is ticked from
/// `about_to_wait()` whenever the next tick deadline has passed.
pub(crate) struct Platform {
    game: Game,
    window: Option<Window>,
    buffer: InputBuffer,
    event_sender: Sender<PlatformEvent>,
    input_processor: InputProcessor,
    tick_interval: Duration,
    next_tick: Instant,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new(game: Game, event_sender: Sender<PlatformEvent>) -> Self {
        let tick_interval = Duration::from_secs_f64(1.0 / game.tps());
        info!(target: "platform", "Platform subsystem initialized ({:?} per tick)", tick_interval);

        Self {
            game,
            window: None,
            buffer: InputBuffer::new(),
            event_sender,
            input_processor: InputProcessor::new(),
            tick_interval,
            next_tick: Instant::now(),
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the winit event loop until the game exits or the window closes.
    pub(crate) fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting winit event loop");

        let event_loop = EventLoop::new()?;
        event_loop.run_app(&mut self)?;

        info!(target: "platform", "Event loop exited");
        Ok(())
    }

    //--- Internal Helpers -------------------------------------------------

    /// Sends buffered input to the game. A full channel drops the batch.
    fn flush_input_buffer(&mut self) {
        let Some((discrete, continuous)) = self.buffer.drain() else {
            return;
        };
        trace!(
            target: "platform::input",
            "Flushing {} discrete + {} continuous events",
            discrete.len(),
            continuous.len()
        );

        match self.event_sender.try_send(PlatformEvent::Inputs { discrete, continuous }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(target: "platform::input", "Event channel full, dropping input batch");
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!(target: "platform::input", "Event channel disconnected, dropping input batch");
            }
        }
    }

    fn apply_commands(&mut self) {
        for command in self.game.take_platform_commands() {
            match command {
                PlatformCommand::SetFullscreen(on) => {
                    if let Some(window) = &self.window {
                        window.set_fullscreen(on.then_some(Fullscreen::Borderless(None)));
                    }
                }
            }
        }
    }

    fn scale_factor(&self) -> f64 {
        self.window.as_ref().map_or(1.0, Window::scale_factor)
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists");
            return;
        }

        let display = &self.game.config().display;
        let mut attrs = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(display.window_width, display.window_height));
        if display.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        match event_loop.create_window(attrs) {
            Ok(window) => {
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    window.scale_factor()
                );
                self.window = Some(window);
                self.next_tick = Instant::now();
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                if self.event_sender.try_send(PlatformEvent::WindowClosed).is_err() {
                    warn!(target: "platform", "Could not queue window close");
                }
            }

            WindowEvent::ModifiersChanged(state) => {
                trace!(target: "platform::input", "Modifiers changed: {:?}", state);
                self.input_processor.update_modifiers(state.state());
            }

            WindowEvent::CursorMoved { position, .. } => {
                let event = self
                    .input_processor
                    .process_mouse_move(position.x, position.y, self.scale_factor());
                self.buffer.push_continuous(event);
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if let Some(event) = self.input_processor.process_key_event(key_event) {
                    self.buffer.push_discrete(event);
                } else {
                    trace!(target: "platform::input", "Unmapped key ignored");
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let event = self.input_processor.process_mouse_button(*button, *state);
                self.buffer.push_discrete(event);
            }

            _ => {}
        }
    }

    /// Tick boundary: runs every tick whose deadline has passed.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_tick {
            self.flush_input_buffer();

            let dt = self.tick_interval.as_secs_f64();
            if self.game.tick(dt) == TickControl::Exit {
                event_loop.exit();
                return;
            }
            self.apply_commands();

            self.next_tick += self.tick_interval;
            if self.next_tick < now {
                // Fell behind; skip ahead instead of bursting
                self.next_tick = now + self.tick_interval;
            }
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
    }
}
