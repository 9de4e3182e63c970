//! Browser host.
//!
//! The DOM is the layout: every `<img>` matching the configured selector
//! becomes a plane, and its `getBoundingClientRect()` is re-read each frame.
//! The render canvas sits on top of the page, pointer and resize listeners
//! are [`DomEvents`] subscriptions, and `locomotive-scroll` moves the content.
//!
//! JavaScript calls [`mount`] once the page has loaded and keeps the returned
//! [`EffectHandle`] to tear the effect down later.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{HtmlCanvasElement, HtmlElement, HtmlImageElement, MouseEvent, WheelEvent, Window};

use crate::config::EffectConfig;
use crate::error::Error;
use crate::events::{EffectEvent, EventHandler, EventKind, EventSource, SubscriptionId, Teardown};
use crate::gpu::GpuContext;
use crate::layout::{Bounds, ImageId, LayoutSource, Viewport};
use crate::mode::{DeviceSignals, DocumentSurface, Mode, apply_degraded, select_mode};
use crate::runtime::{HostPage, Runtime, connect, css_size, physical_size};
use crate::texture::Texture;

#[wasm_bindgen(module = "locomotive-scroll")]
extern "C" {
    #[wasm_bindgen(js_name = "default")]
    type LocomotiveScroll;

    #[wasm_bindgen(constructor, js_class = "default")]
    fn new() -> LocomotiveScroll;

    #[wasm_bindgen(method)]
    fn destroy(this: &LocomotiveScroll);
}

/// Install the panic hook and console logger when the module loads.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"hoverplane: logger already installed".into());
    }
}

/// Start the effect on the current document.
///
/// Selectors default to `#canvas` and `img`.
#[wasm_bindgen]
pub async fn mount(
    canvas_selector: Option<String>,
    image_selector: Option<String>,
) -> Result<EffectHandle, JsValue> {
    let mut config = EffectConfig::default();
    if let Some(selector) = canvas_selector {
        config = config.canvas_selector(selector);
    }
    if let Some(selector) = image_selector {
        config = config.image_selector(selector);
    }

    launch(config).await.map_err(|err| {
        log::error!("hoverplane failed to start: {err}");
        JsValue::from_str(&err.to_string())
    })
}

/// A running (or degraded) effect. Call `destroy()` to remove every listener
/// and stop the frame loop.
#[wasm_bindgen]
pub struct EffectHandle {
    mode: Mode,
    events: DomEvents,
    teardown: Teardown,
    frames: Option<FrameLoop>,
    runtime: Option<Rc<RefCell<Runtime<DomPage>>>>,
    scroll: Locomotive,
}

#[wasm_bindgen]
impl EffectHandle {
    /// Whether the full effect is running, as opposed to the plain page.
    #[wasm_bindgen(getter)]
    pub fn immersive(&self) -> bool {
        self.mode == Mode::Immersive
    }

    /// Number of planes in the scene.
    #[wasm_bindgen(getter, js_name = planeCount)]
    pub fn plane_count(&self) -> usize {
        self.runtime
            .as_ref()
            .map_or(0, |runtime| runtime.borrow().effect.planes().len())
    }

    pub fn destroy(&mut self) {
        self.teardown.run(&mut self.events);
        if let Some(mut frames) = self.frames.take() {
            frames.stop();
        }
        self.runtime = None;
        self.scroll.destroy();
        log::info!("effect destroyed");
    }
}

async fn launch(config: EffectConfig) -> crate::Result<EffectHandle> {
    let window = web_sys::window().ok_or_else(|| Error::host("no global window"))?;
    let document = window
        .document()
        .ok_or_else(|| Error::host("window has no document"))?;

    let user_agent = window.navigator().user_agent().unwrap_or_default();
    let viewport = window_viewport(&window);
    let mode = select_mode(&DeviceSignals::new(user_agent, viewport.width), &config);
    log::info!("{mode:?} mode for {:.0}px wide viewport", viewport.width);

    // Content scrolls smoothly in both modes.
    let scroll = Locomotive::new();

    let canvas: HtmlCanvasElement = document
        .query_selector(&config.canvas_selector)
        .map_err(js_error)?
        .ok_or_else(|| Error::host(format!("no element matches '{}'", config.canvas_selector)))?
        .dyn_into()
        .map_err(|_| Error::host(format!("'{}' is not a canvas", config.canvas_selector)))?;

    let images = query_images(&document, &config.image_selector)?;
    if images.is_empty() {
        log::warn!("no images match '{}'", config.image_selector);
    }

    let pixel_ratio = config.pixel_ratio(window.device_pixel_ratio());
    let mut page = DomPage {
        window: window.clone(),
        canvas: canvas.clone(),
        images,
        pixel_ratio,
    };
    let mut events = DomEvents::new(window.clone());

    if mode == Mode::Degraded {
        apply_degraded(&mut page);
        return Ok(EffectHandle {
            mode,
            events,
            teardown: Teardown::new(),
            frames: None,
            runtime: None,
            scroll,
        });
    }

    page.resize(viewport);
    let (width, height) = physical_size(viewport, pixel_ratio);
    let gpu = GpuContext::new(wgpu::SurfaceTarget::Canvas(canvas), width, height).await?;
    let runtime = Rc::new(RefCell::new(Runtime::new(gpu, page, config, pixel_ratio)));

    load_textures(&window, &runtime);
    let teardown = connect(
        &runtime,
        &mut events,
        &[EventKind::PointerMove, EventKind::Resize],
    );
    let frames = FrameLoop::start(&window, Rc::clone(&runtime))?;

    Ok(EffectHandle {
        mode,
        events,
        teardown,
        frames: Some(frames),
        runtime: Some(runtime),
        scroll,
    })
}

fn query_images(document: &web_sys::Document, selector: &str) -> crate::Result<Vec<HtmlElement>> {
    let nodes = document.query_selector_all(selector).map_err(js_error)?;
    Ok((0..nodes.length())
        .filter_map(|index| nodes.get(index))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect())
}

/// Fetch and decode every image in the background. Planes show the
/// transparent placeholder until their texture arrives.
fn load_textures(window: &Window, runtime: &Rc<RefCell<Runtime<DomPage>>>) {
    let sources = runtime.borrow().page.image_sources();
    for (index, src) in sources {
        let window = window.clone();
        let runtime = Rc::clone(runtime);
        spawn_local(async move {
            let bytes = match fetch_bytes(&window, &src).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    log::warn!("{err}; keeping placeholder for image {index}");
                    return;
                }
            };
            let texture = Texture::from_bytes(&runtime.borrow().gpu, &bytes, &src);
            match texture {
                Ok(texture) => runtime.borrow_mut().set_texture(index, texture),
                Err(err) => log::warn!("{err}; keeping placeholder for image {index}"),
            }
        });
    }
}

async fn fetch_bytes(window: &Window, url: &str) -> crate::Result<Vec<u8>> {
    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;
    if !response.ok() {
        return Err(Error::host(format!("GET {url}: HTTP {}", response.status())));
    }
    let buffer = JsFuture::from(response.array_buffer().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

fn js_error(value: JsValue) -> Error {
    Error::host(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

fn window_viewport(window: &Window) -> Viewport {
    let read = |value: Result<JsValue, JsValue>| {
        value.ok().and_then(|value| value.as_f64()).unwrap_or(0.0) as f32
    };
    Viewport::new(read(window.inner_width()), read(window.inner_height()))
}

/// Host clock in seconds, same origin as `requestAnimationFrame` timestamps.
fn now(window: &Window) -> f64 {
    window.performance().map_or(0.0, |performance| performance.now()) / 1000.0
}

/// The document as seen by the effect.
pub struct DomPage {
    window: Window,
    canvas: HtmlCanvasElement,
    images: Vec<HtmlElement>,
    pixel_ratio: f32,
}

impl DomPage {
    /// `(index, url)` for every image that has a source.
    fn image_sources(&self) -> Vec<(usize, String)> {
        self.images
            .iter()
            .enumerate()
            .filter_map(|(index, element)| {
                let image = element.dyn_ref::<HtmlImageElement>()?;
                let src = Some(image.current_src())
                    .filter(|src| !src.is_empty())
                    .unwrap_or_else(|| image.src());
                (!src.is_empty()).then_some((index, src))
            })
            .collect()
    }
}

fn rect_bounds(element: &web_sys::Element) -> Bounds {
    let rect = element.get_bounding_client_rect();
    Bounds::new(
        rect.left() as f32,
        rect.top() as f32,
        rect.width() as f32,
        rect.height() as f32,
    )
}

impl LayoutSource for DomPage {
    fn viewport(&self) -> Viewport {
        window_viewport(&self.window)
    }

    fn surface_bounds(&self) -> Bounds {
        rect_bounds(&self.canvas)
    }

    fn image_count(&self) -> usize {
        self.images.len()
    }

    fn image_bounds(&self, id: ImageId) -> Option<Bounds> {
        self.images.get(id.0).map(|image| rect_bounds(image))
    }
}

impl HostPage for DomPage {
    fn resize(&mut self, viewport: Viewport) {
        let (width, height) = physical_size(viewport, self.pixel_ratio);
        self.canvas.set_width(width);
        self.canvas.set_height(height);

        let style = self.canvas.style();
        for (property, value) in css_size(viewport) {
            if let Err(err) = style.set_property(property, &value) {
                log::warn!("could not set canvas {property}: {err:?}");
            }
        }
    }
}

impl DocumentSurface for DomPage {
    fn image_count(&self) -> usize {
        self.images.len()
    }

    fn hide_render_surface(&mut self) {
        if let Err(err) = self.canvas.style().set_property("display", "none") {
            log::warn!("could not hide canvas: {err:?}");
        }
    }

    fn set_image_opacity(&mut self, id: ImageId, opacity: f32) {
        let Some(image) = self.images.get(id.0) else {
            return;
        };
        if let Err(err) = image.style().set_property("opacity", &opacity.to_string()) {
            log::warn!("could not set opacity of image {}: {err:?}", id.0);
        }
    }
}

/// `window` event listeners behind the [`EventSource`] interface.
pub struct DomEvents {
    window: Window,
    next_id: u64,
    listeners: Vec<(SubscriptionId, &'static str, Closure<dyn FnMut(web_sys::Event)>)>,
}

impl DomEvents {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

fn dom_event_name(kind: EventKind) -> &'static str {
    match kind {
        EventKind::PointerMove => "mousemove",
        EventKind::Resize => "resize",
        EventKind::Wheel => "wheel",
    }
}

fn translate(window: &Window, kind: EventKind, event: &web_sys::Event) -> Option<EffectEvent> {
    let at = now(window);
    match kind {
        EventKind::PointerMove => {
            let mouse = event.dyn_ref::<MouseEvent>()?;
            Some(EffectEvent::PointerMove {
                client: Vec2::new(mouse.client_x() as f32, mouse.client_y() as f32),
                at,
            })
        }
        EventKind::Resize => Some(EffectEvent::Resize {
            viewport: window_viewport(window),
            at,
        }),
        EventKind::Wheel => {
            let wheel = event.dyn_ref::<WheelEvent>()?;
            Some(EffectEvent::Wheel {
                delta: Vec2::new(wheel.delta_x() as f32, wheel.delta_y() as f32),
                at,
            })
        }
    }
}

impl EventSource for DomEvents {
    fn subscribe(&mut self, kind: EventKind, mut handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let name = dom_event_name(kind);
        let window = self.window.clone();
        let listener = Closure::wrap(Box::new(move |event: web_sys::Event| {
            if let Some(event) = translate(&window, kind, &event) {
                handler(&event);
            }
        }) as Box<dyn FnMut(web_sys::Event)>);

        if let Err(err) = self
            .window
            .add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())
        {
            log::warn!("could not listen for '{name}': {err:?}");
        }
        self.listeners.push((id, name, listener));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(position) = self.listeners.iter().position(|(listener, _, _)| *listener == id)
        else {
            return false;
        };
        let (_, name, listener) = self.listeners.remove(position);
        if let Err(err) = self
            .window
            .remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref())
        {
            log::warn!("could not remove '{name}' listener: {err:?}");
        }
        true
    }
}

impl Drop for DomEvents {
    fn drop(&mut self) {
        for (_, name, listener) in self.listeners.drain(..) {
            let _ = self
                .window
                .remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref());
        }
    }
}

/// `locomotive-scroll` drives native scrolling itself; planes follow it through
/// `getBoundingClientRect`, so only its lifetime is managed here.
struct Locomotive {
    inner: Option<LocomotiveScroll>,
}

impl Locomotive {
    fn new() -> Self {
        Self {
            inner: Some(LocomotiveScroll::new()),
        }
    }

    fn destroy(&mut self) {
        if let Some(scroll) = self.inner.take() {
            scroll.destroy();
        }
    }
}

/// Self-rescheduling `requestAnimationFrame` loop.
struct FrameLoop {
    window: Window,
    callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
    request: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
    fn start<P: HostPage + 'static>(
        window: &Window,
        runtime: Rc<RefCell<Runtime<P>>>,
    ) -> crate::Result<Self> {
        let callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let request = Rc::new(Cell::new(None));

        let next = Rc::clone(&callback);
        let next_request = Rc::clone(&request);
        let frame_window = window.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            match runtime.try_borrow_mut() {
                Ok(mut runtime) => {
                    if let Err(err) = runtime.frame(timestamp / 1000.0) {
                        log::error!("frame failed: {err}");
                    }
                }
                Err(_) => log::debug!("effect busy, skipping frame"),
            }

            if let Some(callback) = next.borrow().as_ref() {
                match frame_window.request_animation_frame(callback.as_ref().unchecked_ref()) {
                    Ok(id) => next_request.set(Some(id)),
                    Err(err) => {
                        log::error!("requestAnimationFrame failed: {err:?}");
                        next_request.set(None);
                    }
                }
            }
        }) as Box<dyn FnMut(f64)>));

        let id = {
            let callback = callback.borrow();
            let callback = callback
                .as_ref()
                .ok_or_else(|| Error::host("frame callback missing"))?;
            window
                .request_animation_frame(callback.as_ref().unchecked_ref())
                .map_err(js_error)?
        };
        request.set(Some(id));

        Ok(Self {
            window: window.clone(),
            callback,
            request,
        })
    }

    /// Cancel the pending frame and break the callback's self-reference.
    fn stop(&mut self) {
        if let Some(id) = self.request.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        self.callback.borrow_mut().take();
    }
}
