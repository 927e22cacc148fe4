//! WASM bindings for storybook-pages.
//!
//! The browser host loads the textures, renders the skinned meshes and plays
//! audio; this handle owns the book state and hands back per-frame numbers.

use crate::export::raw::{export_raw, RawPageData};
use crate::selection::SubscriptionId;
use crate::{Book, BookConfig, TextureRegistry};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = error)]
    fn console_error(message: &str);

    #[wasm_bindgen(js_namespace = console, js_name = warn)]
    fn console_warn(message: &str);

    #[wasm_bindgen(js_namespace = console, js_name = info)]
    fn console_info(message: &str);

    #[wasm_bindgen(js_namespace = console, js_name = debug)]
    fn console_debug(message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsoleChannel {
    Error,
    Warn,
    Info,
    Debug,
}

fn console_channel(level: log::Level) -> ConsoleChannel {
    match level {
        log::Level::Error => ConsoleChannel::Error,
        log::Level::Warn => ConsoleChannel::Warn,
        log::Level::Info => ConsoleChannel::Info,
        log::Level::Debug | log::Level::Trace => ConsoleChannel::Debug,
    }
}

fn format_record(record: &log::Record) -> String {
    format!("[{} {}] {}", record.level(), record.target(), record.args())
}

/// Forwards `log` records to the browser console.
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = format_record(record);
        match console_channel(record.level()) {
            ConsoleChannel::Error => console_error(&message),
            ConsoleChannel::Warn => console_warn(&message),
            ConsoleChannel::Info => console_info(&message),
            ConsoleChannel::Debug => console_debug(&message),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();

    // A host that installed its own logger first keeps it.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Warn);
    }
}

fn parse_log_level(level: &str) -> Option<log::LevelFilter> {
    level.trim().parse().ok()
}

/// Change the console log level: "off", "error", "warn", "info", "debug" or "trace".
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsError> {
    let filter = parse_log_level(level).ok_or_else(|| js_error(format!("unknown log level {:?}", level)))?;
    log::set_max_level(filter);
    Ok(())
}

fn js_error(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

/// A book driven from JavaScript.
#[wasm_bindgen]
pub struct StorybookHandle {
    book: Book,
    geometry: RawPageData,
    subscriptions: Vec<SubscriptionId>,
}

#[wasm_bindgen]
impl StorybookHandle {
    /// Create a book from optional config JSON and the ids of the textures the
    /// host has loaded.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>, loaded_textures: Vec<String>) -> Result<StorybookHandle, JsError> {
        let config = match config_json {
            Some(json) => BookConfig::from_json_str(&json).map_err(js_error)?,
            None => BookConfig::default(),
        };
        let textures = TextureRegistry::preloaded(loaded_textures);
        let book = Book::new(config, &textures).map_err(js_error)?;
        let geometry = export_raw(book.mesh());
        Ok(StorybookHandle {
            book,
            geometry,
            subscriptions: Vec::new(),
        })
    }

    /// Number of pages.
    #[wasm_bindgen(getter)]
    pub fn page_count(&self) -> usize {
        self.book.page_count()
    }

    /// Requested page index.
    #[wasm_bindgen(getter)]
    pub fn page(&self) -> usize {
        self.book.requested_page()
    }

    /// Displayed page index.
    #[wasm_bindgen(getter)]
    pub fn delayed_page(&self) -> usize {
        self.book.delayed_page()
    }

    #[wasm_bindgen(getter)]
    pub fn is_book_closed(&self) -> bool {
        self.book.is_book_closed()
    }

    pub fn set_page(&mut self, index: usize) -> Result<(), JsError> {
        self.book.set_requested_page(index).map_err(js_error)
    }

    /// Advance one frame; returns the pages stepped to during it.
    pub fn advance_frame(&mut self, delta: f32) -> Vec<u32> {
        self.book
            .advance_frame(delta)
            .iter()
            .map(|step| step.to as u32)
            .collect()
    }

    pub fn pointer_enter(&mut self, page: usize) -> Result<(), JsError> {
        self.book.pointer_enter(page).map_err(js_error)
    }

    pub fn pointer_leave(&mut self, page: usize) -> Result<(), JsError> {
        self.book.pointer_leave(page).map_err(js_error)
    }

    pub fn click(&mut self, page: usize) -> Result<(), JsError> {
        self.book.click(page).map_err(js_error)
    }

    /// Bone rotations of a page as `[fold, twist]` pairs.
    pub fn bone_rotations(&self, page: usize) -> Result<Vec<f32>, JsError> {
        let page = self
            .book
            .page(page)
            .ok_or_else(|| js_error(format!("unknown page {}", page)))?;
        Ok(page
            .skeleton()
            .bones()
            .iter()
            .flat_map(|bone| [bone.rotation.fold, bone.rotation.twist])
            .collect())
    }

    /// Highlight intensity of both print faces.
    pub fn emissive_intensity(&self, page: usize) -> f32 {
        self.book
            .page(page)
            .map_or(0.0, |page| page.materials().emissive_intensity())
    }

    pub fn depth_offset(&self, page: usize) -> f32 {
        self.book.depth_offset(page)
    }

    /// Labels for the page selector as a JSON array.
    pub fn page_labels_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.book.page_labels()).map_err(js_error)
    }

    /// Full book pose as JSON.
    pub fn pose_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.book.pose()).map_err(js_error)
    }

    /// Camera, light, float and ground descriptors as JSON.
    pub fn scene_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.book.config().scene).map_err(js_error)
    }

    /// Page-flip and soundtrack descriptors as JSON.
    pub fn audio_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.book.config().audio).map_err(js_error)
    }

    /// Texture URIs of a page's front and back.
    pub fn texture_uris(&self, page: usize) -> Result<Vec<String>, JsError> {
        let page = self
            .book
            .page(page)
            .ok_or_else(|| js_error(format!("unknown page {}", page)))?;
        let catalog = &self.book.config().catalog;
        Ok(vec![
            catalog.texture_uri(&page.spec().front),
            catalog.texture_uri(&page.spec().back),
        ])
    }

    /// Call `callback(index)` whenever the requested page changes.
    pub fn on_page_change(&mut self, callback: js_sys::Function) {
        let id = self.book.signal().subscribe(move |index| {
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from(index as u32)) {
                log::warn!("page change callback failed: {:?}", e);
            }
        });
        self.subscriptions.push(id);
    }

    /// Drop every page change callback.
    pub fn clear_page_change_callbacks(&mut self) {
        let signal = self.book.signal();
        for id in self.subscriptions.drain(..) {
            signal.unsubscribe(id);
        }
    }

    /// Export a page in its current pose as GLB.
    pub fn export_page_glb(&self, page: usize) -> Result<Vec<u8>, JsError> {
        crate::export_page_glb(&self.book, page).map_err(js_error)
    }

    // Shared page geometry

    #[wasm_bindgen(getter)]
    pub fn positions(&self) -> Vec<f32> {
        self.geometry.positions_flat()
    }

    #[wasm_bindgen(getter)]
    pub fn normals(&self) -> Vec<f32> {
        self.geometry.normals_flat()
    }

    #[wasm_bindgen(getter)]
    pub fn uvs(&self) -> Vec<f32> {
        self.geometry.uvs_flat()
    }

    #[wasm_bindgen(getter)]
    pub fn skin_indices(&self) -> Vec<u16> {
        self.geometry.joints_flat()
    }

    #[wasm_bindgen(getter)]
    pub fn skin_weights(&self) -> Vec<f32> {
        self.geometry.weights_flat()
    }

    #[wasm_bindgen(getter)]
    pub fn indices(&self) -> Vec<u32> {
        self.geometry.indices.clone()
    }

    /// Material groups as `[start, count, material]` triples.
    #[wasm_bindgen(getter)]
    pub fn groups(&self) -> Vec<u32> {
        self.geometry.groups_flat()
    }
}

impl Drop for StorybookHandle {
    fn drop(&mut self) {
        self.clear_page_change_callbacks();
    }
}
