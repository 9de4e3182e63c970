//! Native host: a `winit` window showing a scrollable column of images.
//!
//! The window plays the browser's part. Window events are translated into
//! [`EffectEvent`]s and dispatched through an [`EventBus`], which the shared
//! [`Runtime`] is connected to. Mode selection runs once at startup exactly
//! as in the browser, with a desktop user agent derived from the target OS.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::EffectConfig;
use crate::error::Error;
use crate::events::{EffectEvent, EventBus, EventKind, Teardown};
use crate::gpu::GpuContext;
use crate::layout::Viewport;
use crate::mode::{DeviceSignals, Mode, apply_degraded, select_mode};
use crate::page::{Page, PageImage};
use crate::runtime::{Runtime, connect};
use crate::texture::{Texture, decode_rgba, swatch};

/// Pixels scrolled per wheel line.
const LINE_HEIGHT: f32 = 40.0;

/// Where a page image comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageSource {
    /// An encoded image file on disk.
    File(PathBuf),
    /// A generated gradient swatch.
    Swatch { width: u32, height: u32, seed: u32 },
}

impl ImageSource {
    fn label(&self) -> String {
        match self {
            ImageSource::File(path) => path.display().to_string(),
            ImageSource::Swatch { seed, .. } => format!("swatch-{seed}"),
        }
    }

    fn load(&self) -> crate::Result<image::RgbaImage> {
        match self {
            ImageSource::File(path) => {
                let label = self.label();
                let bytes = std::fs::read(path).map_err(|source| Error::Io {
                    path: label.clone(),
                    source,
                })?;
                decode_rgba(&bytes, &label)
            }
            ImageSource::Swatch {
                width,
                height,
                seed,
            } => Ok(swatch(*width, *height, *seed)),
        }
    }
}

/// A few swatches in mixed orientations, shown when no files are given.
pub fn default_images() -> Vec<ImageSource> {
    [(1600, 1000), (1200, 1200), (1000, 1400), (1600, 900), (1200, 800)]
        .into_iter()
        .enumerate()
        .map(|(seed, (width, height))| ImageSource::Swatch {
            width,
            height,
            seed: seed as u32,
        })
        .collect()
}

/// User agent reported by the native host to the mode selector.
pub fn native_user_agent() -> String {
    format!(
        "hoverplane/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Configuration for the app window.
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub effect: EffectConfig,
    pub images: Vec<ImageSource>,
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Hoverplane".to_string(),
            width: 1280,
            height: 800,
            effect: EffectConfig::default(),
            images: default_images(),
            user_agent: native_user_agent(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn effect(mut self, effect: EffectConfig) -> Self {
        self.effect = effect;
        self
    }

    /// Show these images instead of the default swatches. An empty list keeps
    /// the swatches.
    pub fn images(mut self, images: Vec<ImageSource>) -> Self {
        if !images.is_empty() {
            self.images = images;
        }
        self
    }

    /// Override the user agent the mode selector sees.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Open the window and run until it is closed.
///
/// # Example
/// ```no_run
/// use hoverplane::{AppConfig, ImageSource};
///
/// let images = vec![ImageSource::File("photo.jpg".into())];
/// hoverplane::run_with_config(AppConfig::new().title("Gallery").images(images))?;
/// # Ok::<(), hoverplane::Error>(())
/// ```
pub fn run() -> crate::Result<()> {
    run_with_config(AppConfig::default())
}

/// Run with a custom configuration.
pub fn run_with_config(config: AppConfig) -> crate::Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| Error::host(format!("event loop: {err}")))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = HoverplaneApp::Pending(Some(config));
    event_loop
        .run_app(&mut app)
        .map_err(|err| Error::host(format!("event loop: {err}")))?;

    match app {
        HoverplaneApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

struct Running {
    window: Arc<Window>,
    runtime: Rc<RefCell<Runtime<Page>>>,
    bus: EventBus,
    teardown: Teardown,
    clock: Instant,
}

enum HoverplaneApp {
    Pending(Option<AppConfig>),
    Running(Box<Running>),
    Failed(Error),
    Closed,
}

impl ApplicationHandler for HoverplaneApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let HoverplaneApp::Pending(config) = self else {
            return;
        };
        let Some(config) = config.take() else {
            return;
        };

        *self = match start(event_loop, config) {
            Ok(running) => HoverplaneApp::Running(Box::new(running)),
            Err(err) => {
                log::error!("startup failed: {err}");
                event_loop.exit();
                HoverplaneApp::Failed(err)
            }
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let HoverplaneApp::Running(running) = self else {
            return;
        };
        let scale = running.window.scale_factor();
        let at = running.clock.elapsed().as_secs_f64();

        match event {
            WindowEvent::CloseRequested => {
                running.teardown.run(&mut running.bus);
                running.runtime.borrow_mut().page.destroy();
                log::info!("window closed");
                *self = HoverplaneApp::Closed;
                event_loop.exit();
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                running
                    .runtime
                    .borrow_mut()
                    .set_pixel_ratio(scale_factor as f32);
            }
            WindowEvent::Resized(size) => {
                running.bus.dispatch(&EffectEvent::Resize {
                    viewport: logical_viewport(size, scale),
                    at,
                });
            }
            WindowEvent::CursorMoved { position, .. } => {
                running.bus.dispatch(&EffectEvent::PointerMove {
                    client: logical_position(position, scale),
                    at,
                });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports positive y when the content should move down.
                let delta = match delta {
                    MouseScrollDelta::LineDelta(x, y) => -Vec2::new(x, y) * LINE_HEIGHT,
                    MouseScrollDelta::PixelDelta(position) => {
                        -logical_position(position, scale)
                    }
                };
                running.bus.dispatch(&EffectEvent::Wheel { delta, at });
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = running.runtime.borrow_mut().frame(at) {
                    log::error!("frame failed: {err}");
                }
                running.window.request_redraw();
            }
            _ => {}
        }
    }
}

fn start(event_loop: &ActiveEventLoop, config: AppConfig) -> crate::Result<Running> {
    let window_attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(LogicalSize::new(config.width, config.height));
    let window = Arc::new(
        event_loop
            .create_window(window_attrs)
            .map_err(|err| Error::host(format!("window: {err}")))?,
    );

    let scale = window.scale_factor();
    let size = window.inner_size();
    let viewport = logical_viewport(size, scale);

    let mode = select_mode(
        &DeviceSignals::new(config.user_agent.as_str(), viewport.width),
        &config.effect,
    );
    log::info!("{mode:?} mode for {:.0}px wide viewport", viewport.width);

    let pixels: Vec<(String, image::RgbaImage)> = config
        .images
        .iter()
        .enumerate()
        .map(|(index, source)| {
            let pixels = source.load().unwrap_or_else(|err| {
                log::warn!("{err}; showing a swatch instead");
                swatch(1200, 800, index as u32)
            });
            (source.label(), pixels)
        })
        .collect();

    let images = pixels
        .iter()
        .map(|(label, pixels)| PageImage::new(label.as_str(), pixels.width(), pixels.height()))
        .collect();
    let mut page = Page::new(viewport, images);
    if mode == Mode::Degraded {
        // The window is the page here, so planes still draw the images; they
        // just never receive pointer input.
        apply_degraded(&mut page);
    }

    let gpu = pollster::block_on(GpuContext::new(window.clone(), size.width, size.height))?;
    let mut runtime = Runtime::new(gpu, page, config.effect, scale as f32);
    for (index, (label, pixels)) in pixels.iter().enumerate() {
        let texture = Texture::from_image(&runtime.gpu, pixels, label);
        runtime.set_texture(index, texture);
    }

    let runtime = Rc::new(RefCell::new(runtime));
    let mut bus = EventBus::new();
    let kinds: &[EventKind] = match mode {
        Mode::Immersive => &[EventKind::PointerMove, EventKind::Resize, EventKind::Wheel],
        Mode::Degraded => &[EventKind::Resize, EventKind::Wheel],
    };
    let teardown = connect(&runtime, &mut bus, kinds);

    window.request_redraw();

    Ok(Running {
        window,
        runtime,
        bus,
        teardown,
        clock: Instant::now(),
    })
}

fn logical_viewport(size: PhysicalSize<u32>, scale: f64) -> Viewport {
    let size = size.to_logical::<f32>(scale);
    Viewport::new(size.width, size.height)
}

fn logical_position(position: PhysicalPosition<f64>, scale: f64) -> Vec2 {
    let position = position.to_logical::<f32>(scale);
    Vec2::new(position.x, position.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::is_mobile_user_agent;

    #[test]
    fn native_agent_is_never_mobile() {
        assert!(!is_mobile_user_agent(&native_user_agent()));
    }

    #[test]
    fn empty_image_list_keeps_swatches() {
        let config = AppConfig::new().images(Vec::new());
        assert_eq!(config.images, default_images());
    }

    #[test]
    fn swatch_sources_load_without_io() {
        let source = ImageSource::Swatch {
            width: 8,
            height: 4,
            seed: 3,
        };
        assert_eq!(source.load().unwrap().dimensions(), (8, 4));
        assert_eq!(source.label(), "swatch-3");
    }

    #[test]
    fn missing_file_reports_its_path() {
        let source = ImageSource::File("does/not/exist.png".into());
        let err = source.load().unwrap_err();
        assert!(err.to_string().contains("does/not/exist.png"));
    }

    #[test]
    fn logical_conversion_divides_by_scale() {
        let viewport = logical_viewport(PhysicalSize::new(2560, 1600), 2.0);
        assert_eq!(viewport, Viewport::new(1280.0, 800.0));
        let position = logical_position(PhysicalPosition::new(300.0, 90.0), 1.5);
        assert_eq!(position, Vec2::new(200.0, 60.0));
    }
}
