//! Background image ingestion.
//!
//! Decoding is the only work the engine does off the event path. A
//! [`BackgroundLoad`] decodes on a worker (a thread natively, a local task on
//! the web) and hands the finished image back over a oneshot channel. The
//! engine swaps it in only once it is complete, so the background layer is
//! never observed half-decoded.

use base64::Engine as _;
use futures::channel::oneshot;
use image::RgbaImage;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::error::{EngineError, EngineResult};

/// Encoded image data supplied by the host
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundInput {
    /// PNG, JPEG or WebP file contents
    Bytes(Vec<u8>),
    /// A `data:image/...;base64,...` URL, as returned by image generation services
    DataUrl(String),
}

impl BackgroundInput {
    /// The raw encoded image bytes
    pub fn into_bytes(self) -> EngineResult<Vec<u8>> {
        match self {
            BackgroundInput::Bytes(bytes) => Ok(bytes),
            BackgroundInput::DataUrl(url) => decode_data_url(&url),
        }
    }
}

fn decode_data_url(url: &str) -> EngineResult<Vec<u8>> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| EngineError::InvalidDataUrl("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| EngineError::InvalidDataUrl("missing ',' separator".to_string()))?;
    if !header.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        return Err(EngineError::InvalidDataUrl(format!("unsupported encoding in '{}'", header)));
    }

    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

/// A decoded background image, cheap to clone
#[derive(Clone)]
pub struct BackgroundSource {
    image: Arc<RgbaImage>,
}

impl std::fmt::Debug for BackgroundSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundSource")
            .field("size", &self.image.dimensions())
            .finish()
    }
}

impl BackgroundSource {
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image: Arc::new(image) }
    }

    /// Decodes synchronously on the calling thread
    pub fn decode(input: BackgroundInput) -> EngineResult<Self> {
        let bytes = input.into_bytes()?;
        let image = image::load_from_memory(&bytes)?.to_rgba8();
        if image.width() == 0 || image.height() == 0 {
            return Err(EngineError::InvalidDimensions {
                width: image.width(),
                height: image.height(),
            });
        }
        log::debug!("Decoded background image {}x{}", image.width(), image.height());
        Ok(Self::from_image(image))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// An in-flight background decode.
///
/// Await it, or poll it without blocking through [`BackgroundLoad::try_complete`].
pub struct BackgroundLoad {
    receiver: oneshot::Receiver<EngineResult<BackgroundSource>>,
}

impl BackgroundLoad {
    pub fn spawn(input: BackgroundInput) -> Self {
        let (sender, receiver) = oneshot::channel();

        #[cfg(not(target_arch = "wasm32"))]
        std::thread::spawn(move || {
            // The receiver may be gone if a newer load replaced this one
            let _ = sender.send(BackgroundSource::decode(input));
        });

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(async move {
            let _ = sender.send(BackgroundSource::decode(input));
        });

        Self { receiver }
    }

    /// The result if decoding has finished, without blocking
    pub fn try_complete(&mut self) -> Option<EngineResult<BackgroundSource>> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(EngineError::LoadCanceled)),
        }
    }
}

impl Future for BackgroundLoad {
    type Output = EngineResult<BackgroundSource>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(EngineError::LoadCanceled)))
    }
}
