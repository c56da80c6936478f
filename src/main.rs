//! Accelerometer ball entry point
//!
//! On the web the ball is drawn with WebGPU and driven by `devicemotion`
//! events. Natively there is no display or sensor, so a headless run feeds
//! a simulated tilt into an in-memory surface and prints the session stats.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use wasm_bindgen::prelude::*;
    use web_sys::{DeviceMotionEvent, HtmlCanvasElement, PageTransitionEvent, Window};

    use accball::renderer::GpuSurface;
    use accball::{SensorReading, SensorSource, Session, Settings};

    type WebSession = Session<WebMotionSensor, GpuSurface>;

    /// `devicemotion` listener that can be attached and detached
    pub struct WebMotionSensor {
        window: Window,
        available: bool,
        subscribed: bool,
        handler: Closure<dyn FnMut(DeviceMotionEvent)>,
    }

    impl WebMotionSensor {
        fn new(window: Window, session: Weak<RefCell<WebSession>>) -> Self {
            let available = js_sys::Reflect::has(&window, &JsValue::from_str("DeviceMotionEvent"))
                .unwrap_or(false);

            let handler = Closure::<dyn FnMut(_)>::new(move |event: DeviceMotionEvent| {
                let Some(session) = session.upgrade() else {
                    return;
                };
                let Some(reading) = reading_from_event(&event) else {
                    return;
                };
                match session.try_borrow_mut() {
                    Ok(mut s) => {
                        s.on_reading(&reading);
                    }
                    Err(_) => log::debug!("Session busy, dropping motion event"),
                }
            });

            Self {
                window,
                available,
                subscribed: false,
                handler,
            }
        }
    }

    impl SensorSource for WebMotionSensor {
        fn is_available(&self) -> bool {
            self.available
        }

        fn subscribe(&mut self) {
            if !self.available || self.subscribed {
                return;
            }
            match self
                .window
                .add_event_listener_with_callback("devicemotion", self.handler.as_ref().unchecked_ref())
            {
                Ok(()) => self.subscribed = true,
                Err(e) => log::error!("Failed to listen for devicemotion: {:?}", e),
            }
        }

        fn unsubscribe(&mut self) {
            if !self.subscribed {
                return;
            }
            if let Err(e) = self
                .window
                .remove_event_listener_with_callback("devicemotion", self.handler.as_ref().unchecked_ref())
            {
                log::warn!("Failed to remove devicemotion listener: {:?}", e);
            }
            self.subscribed = false;
        }

        fn is_subscribed(&self) -> bool {
            self.subscribed
        }
    }

    /// Gravity-inclusive acceleration with the event time in nanoseconds
    fn reading_from_event(event: &DeviceMotionEvent) -> Option<SensorReading> {
        let accel = event.acceleration_including_gravity()?;
        let x = accel.x()? as f32;
        let y = accel.y()? as f32;
        let z = accel.z().unwrap_or(0.0) as f32;
        // DOMHighResTimeStamp is in milliseconds
        let timestamp = (event.time_stamp() * 1.0e6).round() as i64;
        Some(SensorReading::accelerometer(x, y, z, timestamp))
    }

    /// Match the canvas backing store to its CSS size and return it
    fn fit_canvas(window: &Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger unavailable: {}", e).into());
        }

        log::info!("Accelerometer ball starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()
            .map_err(|_| "element #canvas is not a canvas")?;

        let settings = Settings::load();
        let (width, height) = fit_canvas(&window, &canvas);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| e.to_string())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| e.to_string())?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let gpu = GpuSurface::new(surface, &adapter, width, height)
            .await
            .map_err(|e| e.to_string())?;

        let session: Rc<RefCell<WebSession>> = Rc::new_cyclic(|weak| {
            let sensor = WebMotionSensor::new(window.clone(), weak.clone());
            RefCell::new(Session::new(&settings, sensor, gpu))
        });

        session.borrow_mut().surface_created(width, height);
        // Lifecycle listeners own the session for the rest of the page
        setup_lifecycle_handlers(&window, &canvas, session);

        log::info!("Accelerometer ball running");
        Ok(())
    }

    fn setup_lifecycle_handlers(window: &Window, canvas: &HtmlCanvasElement, session: Rc<RefCell<WebSession>>) {
        // Viewport size or orientation change
        {
            let session = session.clone();
            let window_clone = window.clone();
            let canvas = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let (w, h) = fit_canvas(&window_clone, &canvas);
                session.borrow_mut().surface_resized(w, h);
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Page leaving (or entering the back/forward cache)
        {
            let session = session.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PageTransitionEvent| {
                session.borrow_mut().surface_destroyed();
            });
            let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Restored from the back/forward cache
        {
            let window_clone = window.clone();
            let canvas = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PageTransitionEvent| {
                if event.persisted() {
                    let (w, h) = fit_canvas(&window_clone, &canvas);
                    session.borrow_mut().surface_created(w, h);
                }
            });
            let _ = window.add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = web::run().await {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use accball::renderer::SoftwareSurface;
    use accball::sensor::SimulatedTilt;
    use accball::{Session, Settings};

    const WIDTH: u32 = 1080;
    const HEIGHT: u32 = 1920;
    /// One minute at game delivery rate
    const SAMPLES: usize = 3000;

    env_logger::init();
    log::info!("Accelerometer ball (native, headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match Settings::load_from(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path);
                settings
            }
            Err(e) => {
                log::error!("Failed to load settings from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    log::info!("Simulated tilt seed: {}", seed);

    let mut session = Session::new(
        &settings,
        SimulatedTilt::new(seed),
        SoftwareSurface::new(WIDTH, HEIGHT),
    );
    session.surface_created(WIDTH, HEIGHT);

    for i in 0..SAMPLES {
        let Some(reading) = session.sensor_mut().poll() else {
            log::warn!("Sensor stopped delivering after {} samples", i);
            break;
        };
        if let Some(pos) = session.on_reading(&reading)
            && i % 250 == 0
        {
            log::info!("t={:.2}s ball at ({:.1}, {:.1})", reading.timestamp as f64 / 1e9, pos.x, pos.y);
        }
    }

    session.surface_destroyed();

    match serde_json::to_string_pretty(&session.stats()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize stats: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry point is wasm_main
}
