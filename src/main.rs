//! Military base diorama viewer
//!
//! Drag with the left mouse button to orbit, scroll to zoom.
//! R resets the view, F toggles fullscreen, P pauses, Escape quits.

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::WindowId,
};

use diorama::config::DioramaConfig;
use diorama::input::{InputAction, InputMapper};
use diorama::scene::{Scene, SceneBuilder};
use diorama::systems::{AnimationSystem, RenderError, RenderSystem, WindowSystem};
use diorama_input::{CameraController, PointerEvent, PointerTracker};

/// Seconds between window title refreshes
const TITLE_INTERVAL: f32 = 0.5;

/// Main application state
struct App {
    config: DioramaConfig,
    window: Option<WindowSystem>,
    render: Option<RenderSystem>,
    scene: Scene,
    animation: AnimationSystem,
    controller: CameraController,
    pointer: PointerTracker,
    title_timer: std::time::Instant,
}

impl App {
    fn new(config: DioramaConfig) -> Self {
        let scene = SceneBuilder::military_base(config.scene.seed);
        let animation = AnimationSystem::new(&config.animation);
        let controller = config.camera.to_controller();

        Self {
            config,
            window: None,
            render: None,
            scene,
            animation,
            controller,
            pointer: PointerTracker::new(),
            title_timer: std::time::Instant::now(),
        }
    }

    fn handle_action(&mut self, action: InputAction, event_loop: &ActiveEventLoop) {
        match action {
            InputAction::Exit => event_loop.exit(),
            InputAction::ResetCamera => self.controller.reset(),
            InputAction::ToggleFullscreen => {
                if let Some(window) = &self.window {
                    window.toggle_fullscreen();
                }
            }
            InputAction::TogglePause => {
                self.animation.toggle_pause();
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(render) = &mut self.render else {
            return;
        };

        let update = self
            .animation
            .update(&mut self.scene.animation, &mut self.scene.world);
        render.sync(&mut self.scene.world, &update);
        self.controller.apply(render.camera_mut());

        match render.render_frame(&self.scene.world) {
            Ok(()) => {}
            Err(RenderError::SurfaceLost) => render.recover_surface(),
            Err(RenderError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
                return;
            }
            Err(e) => log::warn!("{}", e),
        }

        if let Some(window) = &self.window {
            if self.config.debug.show_stats && self.title_timer.elapsed().as_secs_f32() >= TITLE_INTERVAL {
                window.update_title(
                    self.animation.fps(),
                    self.controller.orbit().distance,
                    self.animation.is_paused(),
                );
                self.title_timer = std::time::Instant::now();
            }
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match WindowSystem::create(event_loop, &self.config.window) {
            Ok(window) => window,
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        let mut render = match RenderSystem::new(
            window.window().clone(),
            self.config.rendering.clone(),
            &self.config.camera,
            self.config.window.vsync,
        ) {
            Ok(render) => render,
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        let targets = self.scene.animation.rotation_targets();
        render.upload_scene(&mut self.scene.world, &targets);
        self.controller.apply(render.camera_mut());

        window.request_redraw();
        self.window = Some(window);
        self.render = Some(render);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(pointer_event) = self.pointer.translate(&event) {
            match pointer_event {
                PointerEvent::Resize { width, height } => {
                    if let Some(render) = &mut self.render {
                        render.resize(width, height);
                    }
                }
                other => self.controller.handle(other),
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    if let Some(action) = InputMapper::map_keyboard(key, event.state) {
                        self.handle_action(action, event_loop);
                    }
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}

fn main() -> Result<(), winit::error::EventLoopError> {
    let loaded = DioramaConfig::load();
    let log_level = loaded
        .as_ref()
        .map(|config| config.debug.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Initialize logging; RUST_LOG still wins over the config
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
    log::info!("Starting diorama");

    let config = loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        DioramaConfig::default()
    });

    // Create event loop
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    // Create and run application
    let mut app = App::new(config);
    event_loop.run_app(&mut app)
}
