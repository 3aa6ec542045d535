//! Fireworks entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_show {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use fireworks::assets::{SMOKE_TEXTURE_SIZE, SpriteImage};
    use fireworks::consts::SIM_DT;
    use fireworks::renderer::CanvasRenderer;
    use fireworks::sim::{FrameClock, Show, advance};
    use fireworks::{DrawList, QualityPreset, Settings};

    /// Display instance holding all state
    struct App {
        show: Show,
        clock: FrameClock,
        frame: DrawList,
        renderer: CanvasRenderer,
        canvas: HtmlCanvasElement,
        last_time: f64,
        /// Handle of the outstanding requestAnimationFrame call
        pending_frame: Option<i32>,
    }

    impl App {
        /// Run fixed ticks for the elapsed time and present the result
        fn update(&mut self, dt: f32) {
            self.frame.clear();
            let steps = advance(&mut self.show, &mut self.clock, dt, &mut self.frame);
            if steps == 0 {
                return;
            }

            match self.renderer.render(&self.frame) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                    self.renderer.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                    self.stop();
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Match the canvas backing store to its on-screen size
        fn fit_canvas(&mut self) {
            let (w, h) = canvas_size(&self.canvas);
            self.canvas.set_width(w);
            self.canvas.set_height(h);
            self.renderer.resize(w, h);
            self.show.resize(w as f32, h as f32);
        }

        /// Stop the display and drop the pending frame request
        fn stop(&mut self) {
            self.show.stop();
            if let Some(id) = self.pending_frame.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(id);
                }
            }
        }

        fn cycle_quality(&mut self) {
            let next = match self.show.settings.quality {
                QualityPreset::Low => QualityPreset::Medium,
                QualityPreset::Medium => QualityPreset::High,
                QualityPreset::High => QualityPreset::Low,
            };
            let settings = Settings {
                quality: next,
                ..self.show.settings.clone()
            };
            settings.save();
            self.show.apply_settings(settings);
            log::info!("Quality: {}", next.as_str());
        }
    }

    fn canvas_size(canvas: &HtmlCanvasElement) -> (u32, u32) {
        (
            canvas.client_width().max(1) as u32,
            canvas.client_height().max(1) as u32,
        )
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Fireworks starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No <canvas id=\"canvas\"> element");
            return;
        };

        let (width, height) = canvas_size(&canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let settings = Settings::load();

        // The smoke sprite must exist before anything is drawn
        let smoke = SpriteImage::smoke(SMOKE_TEXTURE_SIZE, seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return;
            }
        };
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let renderer = match CanvasRenderer::new(surface, &adapter, width, height, &smoke).await {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("Renderer setup failed: {}", e);
                return;
            }
        };

        let show = Show::new(settings, glam::Vec2::new(width as f32, height as f32), seed);
        log::info!("Show initialized with seed: {}", seed);

        let app = Rc::new(RefCell::new(App {
            show,
            clock: FrameClock::new(),
            frame: DrawList::new(),
            renderer,
            canvas: canvas.clone(),
            last_time: 0.0,
            pending_frame: None,
        }));

        setup_input_handlers(&canvas, app.clone());
        setup_window_handlers(app.clone());

        request_animation_frame(app);

        log::info!("Fireworks running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Mouse move - track position for held-down launches
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                app.borrow_mut()
                    .show
                    .pointer_moved(event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                a.show
                    .pointer_moved(event.offset_x() as f32, event.offset_y() as f32);
                a.show.pointer_pressed(true);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start/move - behave like a held mouse button
        for name in ["touchstart", "touchmove"] {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let y = touch.client_y() as f32 - rect.top() as f32;
                    let mut a = app.borrow_mut();
                    a.show.pointer_moved(x, y);
                    a.show.pointer_pressed(true);
                }
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end/cancel
        for name in ["touchend", "touchcancel"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if event.touches().length() == 0 {
                    app.borrow_mut().show.pointer_pressed(false);
                }
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_window_handlers(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Mouse up anywhere, so a release outside the canvas still counts
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().show.pointer_pressed(false);
            });
            let _ =
                window.add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur (alt-tab while holding the button)
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut a = app.borrow_mut();
                if a.show.ctx.pointer.pressed {
                    a.show.pointer_pressed(false);
                    log::info!("Pointer released (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().fit_canvas();
            });
            let _ =
                window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Page going away
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().stop();
            });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut a = app.borrow_mut();
                match event.key().as_str() {
                    "Escape" => a.stop(),
                    "q" | "Q" => a.cycle_quality(),
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let loop_app = app.clone();
        let closure = Closure::once(move |time: f64| {
            frame_loop(loop_app, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => app.borrow_mut().pending_frame = Some(id),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            a.pending_frame = None;

            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            a.last_time = time;

            a.update(dt);

            if !a.show.is_running() {
                return;
            }
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_show::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use fireworks::renderer::FrameGeometry;
    use fireworks::sim::{Show, tick};
    use fireworks::{DrawList, QualityPreset, Settings};

    env_logger::init();
    log::info!("Fireworks (native) starting...");
    log::info!("Native mode runs headless - run with `trunk serve` for the web version");

    let ticks: u64 = std::env::var("FIREWORKS_TICKS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1200);
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut settings = Settings::load();
    if let Some(quality) = std::env::var("FIREWORKS_QUALITY")
        .ok()
        .and_then(|v| QualityPreset::from_str(&v))
    {
        settings.quality = quality;
    }
    log::info!("Quality: {}", settings.quality.as_str());

    let mut show = Show::new(settings, glam::Vec2::new(1280.0, 720.0), seed);
    let mut frame = DrawList::new();
    let mut peak_vertices = 0;

    for _ in 0..ticks {
        frame.clear();
        tick(&mut show, &mut frame);
        let geometry = FrameGeometry::build(&frame);
        peak_vertices = peak_vertices.max(geometry.color.len() + geometry.sprites.len());

        let stats = show.stats();
        if stats.time_ticks % 60 == 0 {
            log::info!(
                "t={:>5} launches={:>2} explosions={:>4} smoke={:>2} hue={:.1}",
                stats.time_ticks,
                stats.launches,
                stats.explosions,
                stats.smoke,
                stats.hue
            );
        }
    }
    show.stop();

    let stats = show.stats();
    println!(
        "\nSimulated {} ticks: {} launches, {} explosion particles, {} smoke puffs alive; peak {} vertices/frame",
        stats.time_ticks, stats.launches, stats.explosions, stats.smoke, peak_vertices
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
