//! Error type for setup and rendering failures.
//!
//! Only setup is allowed to fail loudly. Everything that happens per frame or
//! per pointer event is cosmetic and degrades with a log line instead.

use thiserror::Error;

/// Errors surfaced by GPU setup, texture decoding and the hosts.
#[derive(Debug, Error)]
pub enum Error {
    /// The render surface could not be created for the window or canvas.
    #[error("failed to create render surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    /// No GPU adapter is compatible with the render surface.
    #[error("no suitable GPU adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    /// The adapter refused to create a device.
    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    /// The surface reported no usable texture format.
    #[error("render surface has no supported texture format")]
    UnsupportedSurface,

    /// A frame could not be acquired from the surface.
    #[error("failed to acquire frame: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// Image bytes could not be decoded into a texture.
    #[error("failed to decode image '{label}': {source}")]
    Image {
        label: String,
        #[source]
        source: image::ImageError,
    },

    /// An image file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The host environment (window, document, event loop) misbehaved.
    #[error("host error: {0}")]
    Host(String),
}

impl Error {
    pub(crate) fn host(message: impl Into<String>) -> Self {
        Error::Host(message.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
