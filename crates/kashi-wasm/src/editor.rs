//! Photo set and editor bindings for the "sell" page.
//!
//! One `JsPhotoEditor` backs the whole page: the ordered listing photos, the
//! crop/rotate modal and the preview handles the page turns into object
//! URLs. Decoding and exporting run synchronously inside each call, so the
//! request/complete pairs of the core session are closed before returning.
//!
//! ```typescript
//! const editor = new JsPhotoEditor({ max_photos: 20 });
//! editor.add_photos(names, types, contents);
//! const image = editor.open_editor(2);
//! editor.set_display_size(img.clientWidth, img.clientHeight);
//! editor.start_crop();
//! editor.adjust_crop({ x: 10, y: 10, width: 200, height: 200 });
//! const cropped = editor.apply_crop();
//! editor.done();
//! ```

use crate::types::{from_js, to_js, to_js_error, JsDecodedImage};
use kashi_core::decode;
use kashi_core::editor::{EditorError, ExportJob};
use kashi_core::geometry::{AspectLock, CropRegion};
use kashi_core::{EditorConfig, EditorSession, PhotoCollection, PreviewHandles, SelectedFile};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct JsPhotoEditor {
    config: EditorConfig,
    photos: PhotoCollection,
    session: EditorSession,
    handles: PreviewHandles,
}

#[wasm_bindgen]
impl JsPhotoEditor {
    /// Create an editor. `config` is an optional `EditorConfig` object;
    /// missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsPhotoEditor, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            from_js(config)?
        };
        config.validate().map_err(to_js_error)?;
        Ok(Self::with_config(config))
    }

    // ----- photo set -----

    /// Append picked files. `names`, `mimes` and `contents` (an array of
    /// `Uint8Array`) are parallel arrays.
    ///
    /// Files beyond the photo limit are rejected with an error; the ones
    /// that fit are kept.
    pub fn add_photos(
        &mut self,
        names: Vec<String>,
        mimes: Vec<String>,
        contents: js_sys::Array,
    ) -> Result<u32, JsValue> {
        if names.len() != mimes.len() || names.len() != contents.length() as usize {
            return Err(JsValue::from_str("names, mimes and contents must have the same length"));
        }
        let files: Vec<SelectedFile> = names
            .into_iter()
            .zip(mimes)
            .zip(contents.iter())
            .map(|((name, mime), bytes)| {
                SelectedFile::new(name, mime, js_sys::Uint8Array::new(&bytes).to_vec())
            })
            .collect();
        self.add_files(files)
    }

    #[wasm_bindgen(getter)]
    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }

    #[wasm_bindgen(getter)]
    pub fn max_photos(&self) -> usize {
        self.photos.max_photos()
    }

    /// Stable id of the photo at `index`, for list keys.
    pub fn photo_id(&self, index: usize) -> Option<f64> {
        self.photos.get(index).map(|item| item.id().get() as f64)
    }

    /// Encoded bytes of the photo at `index`.
    pub fn photo_bytes(&self, index: usize) -> Result<Vec<u8>, JsValue> {
        self.photos
            .get(index)
            .map(|item| item.source().bytes().to_vec())
            .ok_or_else(|| out_of_range(index))
    }

    pub fn photo_mime(&self, index: usize) -> Result<String, JsValue> {
        self.photos
            .get(index)
            .map(|item| item.source().mime().to_string())
            .ok_or_else(|| out_of_range(index))
    }

    /// Decoded grid thumbnail of the photo at `index`.
    pub fn thumbnail(&self, index: usize) -> Result<JsDecodedImage, JsValue> {
        let item = self.photos.get(index).ok_or_else(|| out_of_range(index))?;
        let image = decode::load(item.source()).map_err(to_js_error)?;
        decode::generate_thumbnail(&image, self.config.thumbnail_size)
            .map(JsDecodedImage::from_decoded)
            .map_err(to_js_error)
    }

    pub fn remove_photo(&mut self, index: usize) -> Result<(), JsValue> {
        self.photos.remove(index).map(|_| ()).map_err(to_js_error)
    }

    /// Drag-and-drop move. Returns `false` when nothing moved.
    pub fn reorder_photos(&mut self, from: usize, to: usize) -> bool {
        self.photos.reorder(from, to)
    }

    pub fn set_main_photo(&mut self, index: usize) -> Result<(), JsValue> {
        self.photos.set_main(index).map_err(to_js_error)
    }

    // ----- editor modal -----

    /// Open the editor on the photo at `index` and return its pixels.
    pub fn open_editor(&mut self, index: usize) -> Result<JsDecodedImage, JsValue> {
        self.session
            .open_with(&self.photos, index, &mut self.handles)
            .map_err(to_js_error)?;
        self.editor_image()
    }

    #[wasm_bindgen(getter)]
    pub fn is_editor_open(&self) -> bool {
        self.session.is_open()
    }

    #[wasm_bindgen(getter)]
    pub fn is_cropping(&self) -> bool {
        self.session.is_cropping()
    }

    /// Preview handle of the open editor, as a stable string key.
    #[wasm_bindgen(getter)]
    pub fn preview_handle(&self) -> Option<String> {
        self.session.handle().map(|h| h.to_string())
    }

    /// Number of preview handles the page has not released yet.
    #[wasm_bindgen(getter)]
    pub fn live_previews(&self) -> usize {
        self.handles.live_count()
    }

    /// Current working surface, rotation applied.
    pub fn editor_image(&self) -> Result<JsDecodedImage, JsValue> {
        self.session
            .image()
            .cloned()
            .map(JsDecodedImage::from_decoded)
            .ok_or_else(|| to_js_error(EditorError::NotReady))
    }

    /// Current rotation in degrees.
    #[wasm_bindgen(getter)]
    pub fn rotation(&self) -> u16 {
        self.session.rotation().map(|r| r.degrees()).unwrap_or(0)
    }

    /// Current crop selection, or `undefined` when the editor is not ready.
    pub fn crop_region(&self) -> Result<JsValue, JsValue> {
        match self.session.region() {
            Some(region) => to_js(&region),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    pub fn set_display_size(&mut self, width: f64, height: f64) -> Result<JsValue, JsValue> {
        let region = self
            .session
            .set_display_size(width, height)
            .map_err(to_js_error)?;
        to_js(&region)
    }

    /// Turn 90° clockwise. Returns the new angle.
    pub fn rotate(&mut self) -> Result<u16, JsValue> {
        self.session
            .rotate()
            .map(|r| r.degrees())
            .map_err(to_js_error)
    }

    pub fn start_crop(&mut self) -> Result<JsValue, JsValue> {
        let region = self.session.start_crop().map_err(to_js_error)?;
        to_js(&region)
    }

    /// Move or resize the selection; returns the clamped selection.
    pub fn adjust_crop(&mut self, region: JsValue) -> Result<JsValue, JsValue> {
        let requested: CropRegion = from_js(region)?;
        let region = self.session.adjust_crop(requested).map_err(to_js_error)?;
        to_js(&region)
    }

    /// Lock the selection to a square, or unlock it.
    pub fn set_aspect_locked(&mut self, locked: bool) -> Result<JsValue, JsValue> {
        let region = self
            .session
            .set_aspect_lock(AspectLock::from_locked(locked))
            .map_err(to_js_error)?;
        to_js(&region)
    }

    pub fn cancel_crop(&mut self) -> Result<JsValue, JsValue> {
        let region = self.session.cancel_crop().map_err(to_js_error)?;
        to_js(&region)
    }

    /// Export the selection, save it into the photo and continue editing the
    /// cropped result.
    pub fn apply_crop(&mut self) -> Result<JsDecodedImage, JsValue> {
        let job = self.session.confirm_crop().map_err(to_js_error)?;
        self.finish(job)?;
        self.editor_image()
    }

    /// Save pending changes and close the editor.
    pub fn done(&mut self) -> Result<(), JsValue> {
        if let Some(job) = self
            .session
            .done(&mut self.photos, &mut self.handles)
            .map_err(to_js_error)?
        {
            self.finish(job)?;
        }
        Ok(())
    }

    /// Make the edited photo the main one, save pending changes and close
    /// the editor.
    pub fn set_as_main(&mut self) -> Result<(), JsValue> {
        if let Some(job) = self
            .session
            .set_main(&mut self.photos, &mut self.handles)
            .map_err(to_js_error)?
        {
            self.finish(job)?;
        }
        Ok(())
    }

    /// Close the editor without saving.
    pub fn cancel_editor(&mut self) -> Result<(), JsValue> {
        self.session.cancel(&mut self.handles).map_err(to_js_error)
    }
}

impl JsPhotoEditor {
    fn with_config(config: EditorConfig) -> Self {
        Self {
            config,
            photos: PhotoCollection::new(config.max_photos),
            session: EditorSession::new(config),
            handles: PreviewHandles::new(),
        }
    }

    fn add_files(&mut self, files: Vec<SelectedFile>) -> Result<u32, JsValue> {
        self.photos
            .add(files)
            .map(|ids| ids.len() as u32)
            .map_err(to_js_error)
    }

    fn finish(&mut self, job: ExportJob) -> Result<(), JsValue> {
        let result = job.run();
        match self
            .session
            .export_finished(job.ticket, result, &mut self.photos, &mut self.handles)
        {
            Ok(_) => Ok(()),
            Err(EditorError::StaleResult) => {
                web_sys::console::debug_1(&JsValue::from_str("kashi: discarded stale export"));
                Ok(())
            }
            Err(e) => Err(to_js_error(e)),
        }
    }
}

fn out_of_range(index: usize) -> JsValue {
    JsValue::from_str(&format!("No photo at index {index}"))
}
