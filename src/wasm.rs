//! WASM API module for browser/JS interop
//!
//! Exposes [`WasmWall`], a pixel wall driven by `requestAnimationFrame`
//! timestamps that renders into an RGBA buffer for a canvas `ImageData`.

use image::RgbaImage;
use wasm_bindgen::prelude::*;

use crate::frame_loop::CancelToken;
use crate::renderer::RenderParams;
use crate::rng::Rng;
use crate::sequencer::{Phase, Sequencer, SequencerConfig};
use crate::store::{decode_snapshot, Collection, KeyValueStore, MemoryStore, DEFAULT_KEY};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub struct WasmWall {
    sequencer: Sequencer,
    render: RenderParams,
    surface: RgbaImage,
    cancel: CancelToken,
}

#[wasm_bindgen]
impl WasmWall {
    /// Create a wall of `width`x`height` pixels.
    ///
    /// `snapshot` is the saved collection JSON (e.g. from `localStorage`);
    /// when absent or malformed the built-in samples are used. The browser
    /// has no usable wall clock for seeding, so the host passes `seed`.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, seed: u32, snapshot: Option<String>) -> WasmWall {
        let mut store = MemoryStore::new();
        if let Some(json) = snapshot {
            // MemoryStore writes cannot fail
            let _ = store.set(DEFAULT_KEY, &json);
        }
        let collection = Collection::load(store, DEFAULT_KEY).into_items();

        WasmWall {
            sequencer: Sequencer::new(
                collection,
                SequencerConfig::default(),
                Rng::new(u64::from(seed)),
            ),
            render: RenderParams::default(),
            surface: RgbaImage::new(width, height),
            cancel: CancelToken::new(),
        }
    }

    /// Advance to `timestamp` (ms) and redraw. Returns false once cancelled.
    pub fn tick(&mut self, timestamp: f64) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.sequencer.frame(timestamp, Some(&mut self.surface), &self.render);
        true
    }

    /// Stop for good; later ticks do nothing and the host should stop
    /// requesting frames.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
    }

    /// Resize the drawing surface (e.g. from a `ResizeObserver`).
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.surface.dimensions() != (width, height) {
            self.surface = RgbaImage::new(width, height);
        }
    }

    pub fn pause(&mut self) {
        self.sequencer.pause();
    }

    pub fn resume(&mut self) {
        self.sequencer.resume();
    }

    pub fn skip(&mut self) {
        self.sequencer.skip();
    }

    #[wasm_bindgen(getter)]
    pub fn paused(&self) -> bool {
        self.sequencer.is_paused()
    }

    /// Build progress of the active matrix, 0-100
    #[wasm_bindgen(getter)]
    pub fn progress(&self) -> f64 {
        self.sequencer.progress()
    }

    #[wasm_bindgen(getter)]
    pub fn active_name(&self) -> Option<String> {
        self.sequencer.active_matrix().map(|m| m.name().to_string())
    }

    #[wasm_bindgen(getter)]
    pub fn active_index(&self) -> usize {
        self.sequencer.active_index()
    }

    /// `"building"` or `"waiting"`
    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        match self.sequencer.phase() {
            Phase::Building => "building".to_string(),
            Phase::Waiting { .. } => "waiting".to_string(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    /// Raw RGBA pixel data of the last frame (4 bytes per pixel)
    pub fn pixels(&self) -> Vec<u8> {
        self.surface.as_raw().clone()
    }

    /// Replace the collection from a saved snapshot. Applied when the next
    /// matrix is activated.
    pub fn set_collection(&mut self, snapshot: &str) -> Result<(), JsValue> {
        let items = decode_snapshot(snapshot).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.sequencer.set_collection(items);
        Ok(())
    }
}
