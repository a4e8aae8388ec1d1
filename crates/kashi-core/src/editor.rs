//! Editor Session: the modal state machine behind the photo editor.
//!
//! ```text
//! Closed ──open──▶ Open(Loading) ──image_loaded──▶ Open(Ready: Idle ⇄ Cropping)
//!    ▲                   │                                   │
//!    └───── decode error / cancel / done / set_main ─────────┘
//! ```
//!
//! Decoding and exporting are the only slow steps, and they are modelled as
//! request/complete pairs. Each request carries a [`SessionTicket`]; when the
//! result comes back the ticket is checked against the live session and a
//! result for a closed or replaced session (or for a photo that has since
//! been removed) is dropped with [`EditorError::StaleResult`].
//!
//! Results are written back by [`ItemId`], so a reorder while an export is
//! running still updates the right photo.

use thiserror::Error;

use crate::collection::{CollectionError, ItemId, PhotoCollection};
use crate::config::EditorConfig;
use crate::decode::{self, DecodeError, DecodedImage};
use crate::geometry::{AspectLock, CropGeometry, CropRegion};
use crate::preview::{DisplayHandle, PreviewHandles};
use crate::render::{self, DisplaySize, ExportError};
use crate::source::{EncodedBlob, ImageSource};
use crate::transform::{apply_rotation, Rotation};

/// Errors from the editor state machine.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("No photo is open in the editor")]
    NotOpen,

    #[error("The editor is already open")]
    AlreadyOpen,

    #[error("The photo is still loading")]
    NotReady,

    #[error("No crop in progress")]
    NotCropping,

    #[error("An export is already in progress")]
    ExportPending,

    /// A decode or export result arrived for a session or photo that no
    /// longer exists. Nothing was changed.
    #[error("Discarded a result for a closed editor session")]
    StaleResult,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Collection(#[from] CollectionError),
}

/// Identifies one asynchronous request made by one editor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTicket {
    session: u64,
    request: u64,
    item: ItemId,
}

impl SessionTicket {
    /// Photo the request was made for.
    pub fn item(&self) -> ItemId {
        self.item
    }
}

/// A photo the caller should decode and hand back to
/// [`EditorSession::image_loaded`].
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub ticket: SessionTicket,
    pub source: ImageSource,
}

/// Why an export was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPurpose {
    /// Apply Crop: the session stays open on the cropped result.
    Crop,
    /// Done with a rotation still pending: the session closes afterwards.
    Commit,
}

/// Everything the exporter needs, detached from the session so it can run
/// elsewhere.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub ticket: SessionTicket,
    pub purpose: ExportPurpose,
    pub image: DecodedImage,
    pub display: DisplaySize,
    pub region: CropRegion,
    pub quality: u8,
}

impl ExportJob {
    pub fn run(&self) -> Result<EncodedBlob, ExportError> {
        render::export(&self.image, self.display, &self.region, self.quality)
    }
}

/// What a finished export did to the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The crop was saved at `index`; the session now previews it through
    /// `handle`.
    Cropped { index: usize, handle: DisplayHandle },
    /// The rotated photo was saved at `index` and the session closed.
    Committed { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Idle,
    Cropping { start: CropRegion },
}

#[derive(Debug, Clone, Copy)]
struct PendingExport {
    request: u64,
    purpose: ExportPurpose,
    display: DisplaySize,
    region: CropRegion,
}

#[derive(Debug)]
struct Surface {
    /// Pixels as last saved, before `rotation`.
    base: DecodedImage,
    /// `base` turned by `rotation`; what the user sees and crops.
    view: DecodedImage,
    rotation: Rotation,
    display: DisplaySize,
    geometry: CropGeometry,
    mode: Mode,
    edited: Option<EncodedBlob>,
    pending: Option<PendingExport>,
}

impl Surface {
    /// After the selection was reset, make cancelling a crop in progress
    /// return to the reset selection rather than one from the old frame.
    fn rebase_crop(&mut self, region: CropRegion) {
        if let Mode::Cropping { start } = &mut self.mode {
            *start = region;
        }
    }
}

#[derive(Debug)]
enum Phase {
    Loading { request: u64 },
    Ready(Box<Surface>),
}

#[derive(Debug)]
struct OpenSession {
    id: u64,
    item: ItemId,
    handle: DisplayHandle,
    phase: Phase,
}

/// The single editor modal.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    aspect: AspectLock,
    open: Option<OpenSession>,
    next_session: u64,
    next_request: u64,
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            aspect: AspectLock::Free,
            open: None,
            next_session: 0,
            next_request: 0,
        }
    }

    // ----- lifecycle -----

    /// Open the editor on the photo at `index`.
    ///
    /// The returned request must be decoded and passed to
    /// [`image_loaded`](Self::image_loaded).
    pub fn open(
        &mut self,
        photos: &PhotoCollection,
        index: usize,
        handles: &mut PreviewHandles,
    ) -> Result<LoadRequest, EditorError> {
        if self.open.is_some() {
            return Err(EditorError::AlreadyOpen);
        }
        let item = photos.get(index).ok_or(CollectionError::IndexOutOfRange {
            index,
            len: photos.len(),
        })?;

        let id = self.next_session;
        self.next_session += 1;
        let request = self.next_request();
        let handle = handles.acquire(item.id());

        self.open = Some(OpenSession {
            id,
            item: item.id(),
            handle,
            phase: Phase::Loading { request },
        });
        tracing::debug!(session = id, item = %item.id(), index, "editor opened");

        Ok(LoadRequest {
            ticket: SessionTicket {
                session: id,
                request,
                item: item.id(),
            },
            source: item.source().clone(),
        })
    }

    /// Deliver the decode result for a [`LoadRequest`].
    ///
    /// A decode failure closes the editor and is returned to the caller.
    pub fn image_loaded(
        &mut self,
        ticket: SessionTicket,
        result: Result<DecodedImage, DecodeError>,
        handles: &mut PreviewHandles,
    ) -> Result<(), EditorError> {
        let expected = match &self.open {
            Some(OpenSession {
                id,
                phase: Phase::Loading { request },
                ..
            }) => *id == ticket.session && *request == ticket.request,
            _ => false,
        };
        if !expected {
            tracing::warn!(item = %ticket.item, "discarding stale decode result");
            return Err(EditorError::StaleResult);
        }

        let image = match result {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(item = %ticket.item, error = %e, "photo failed to decode");
                self.close(handles);
                return Err(e.into());
            }
        };

        let display = DisplaySize::natural(&image);
        let geometry = CropGeometry::new(
            display.width,
            display.height,
            self.aspect,
            self.config.min_crop_size,
        );
        if let Some(session) = self.open.as_mut() {
            tracing::debug!(
                session = session.id,
                width = image.width,
                height = image.height,
                "editor ready"
            );
            session.phase = Phase::Ready(Box::new(Surface {
                view: image.clone(),
                base: image,
                rotation: Rotation::NONE,
                display,
                geometry,
                mode: Mode::Idle,
                edited: None,
                pending: None,
            }));
        }
        Ok(())
    }

    /// Open and decode in one go.
    pub fn open_with(
        &mut self,
        photos: &PhotoCollection,
        index: usize,
        handles: &mut PreviewHandles,
    ) -> Result<(), EditorError> {
        let request = self.open(photos, index, handles)?;
        let decoded = decode::load(&request.source);
        self.image_loaded(request.ticket, decoded, handles)
    }

    /// Close without touching the collection.
    pub fn cancel(&mut self, handles: &mut PreviewHandles) -> Result<(), EditorError> {
        if self.open.is_none() {
            return Err(EditorError::NotOpen);
        }
        self.close(handles);
        Ok(())
    }

    /// Finish editing.
    ///
    /// With a rotation still unsaved, returns a full-frame export job; the
    /// editor closes once [`export_finished`](Self::export_finished) receives
    /// its result. Otherwise any saved edit is written back and the editor
    /// closes immediately.
    pub fn done(
        &mut self,
        photos: &mut PhotoCollection,
        handles: &mut PreviewHandles,
    ) -> Result<Option<ExportJob>, EditorError> {
        let quality = self.config.jpeg_quality;
        let request = self.next_request;
        let (session, item, surface) = self.ready_mut()?;
        if surface.pending.is_some() {
            return Err(EditorError::ExportPending);
        }

        if !surface.rotation.is_none() {
            let (width, height) = (surface.display.width, surface.display.height);
            let region = CropRegion::new(0.0, 0.0, width, height);
            let job = start_export(
                session,
                item,
                request,
                surface,
                ExportPurpose::Commit,
                region,
                quality,
            );
            self.next_request += 1;
            return Ok(Some(job));
        }

        if let Some(blob) = surface.edited.take() {
            photos.replace_item(item, blob)?;
        }
        self.close(handles);
        Ok(None)
    }

    /// Make the open photo the main one, then finish as [`done`](Self::done)
    /// does.
    ///
    /// An unsaved rotation is not dropped: the returned job exports it and
    /// the editor closes when its result arrives.
    pub fn set_main(
        &mut self,
        photos: &mut PhotoCollection,
        handles: &mut PreviewHandles,
    ) -> Result<Option<ExportJob>, EditorError> {
        let session = self.open.as_ref().ok_or(EditorError::NotOpen)?;
        let (item, loading) = (session.item, matches!(session.phase, Phase::Loading { .. }));
        if self.is_export_pending() {
            return Err(EditorError::ExportPending);
        }

        let index = photos
            .position(item)
            .ok_or(CollectionError::UnknownItem(item))?;
        photos.set_main(index)?;
        tracing::debug!(item = %item, from = index, "set as main photo");

        if loading {
            self.close(handles);
            return Ok(None);
        }
        self.done(photos, handles)
    }

    // ----- view -----

    /// Record the size the photo is drawn at. Resets the crop selection.
    pub fn set_display_size(&mut self, width: f64, height: f64) -> Result<CropRegion, EditorError> {
        let (_, _, surface) = self.ready_mut()?;
        surface.display = DisplaySize::new(width, height);
        let region = surface.geometry.set_bounds(width, height);
        surface.rebase_crop(region);
        Ok(region)
    }

    /// Turn the photo 90° clockwise. Resets the crop selection.
    pub fn rotate(&mut self) -> Result<Rotation, EditorError> {
        let (_, _, surface) = self.ready_mut()?;
        if surface.pending.is_some() {
            return Err(EditorError::ExportPending);
        }
        surface.rotation = surface.rotation.rotate();
        surface.view = apply_rotation(&surface.base, surface.rotation);
        surface.display = surface.display.swapped();
        let region = surface
            .geometry
            .set_bounds(surface.display.width, surface.display.height);
        surface.rebase_crop(region);
        tracing::debug!(degrees = surface.rotation.degrees(), "rotated");
        Ok(surface.rotation)
    }

    // ----- cropping -----

    pub fn start_crop(&mut self) -> Result<CropRegion, EditorError> {
        let (_, _, surface) = self.ready_mut()?;
        if surface.pending.is_some() {
            return Err(EditorError::ExportPending);
        }
        let region = surface.geometry.region();
        if surface.mode == Mode::Idle {
            surface.mode = Mode::Cropping { start: region };
        }
        Ok(region)
    }

    pub fn adjust_crop(&mut self, region: CropRegion) -> Result<CropRegion, EditorError> {
        let surface = self.cropping_mut()?;
        Ok(surface.geometry.adjust(region))
    }

    /// Lock or unlock the aspect ratio. A change resets the selection.
    pub fn set_aspect_lock(&mut self, aspect: AspectLock) -> Result<CropRegion, EditorError> {
        let (_, _, surface) = self.ready_mut()?;
        if surface.pending.is_some() {
            return Err(EditorError::ExportPending);
        }
        let changed = surface.geometry.aspect() != aspect;
        let region = surface.geometry.set_aspect(aspect);
        if changed {
            surface.rebase_crop(region);
        }
        self.aspect = aspect;
        Ok(region)
    }

    /// Leave crop mode, putting back the selection from when it started.
    pub fn cancel_crop(&mut self) -> Result<CropRegion, EditorError> {
        let surface = self.cropping_mut()?;
        let Mode::Cropping { start } = surface.mode else {
            return Err(EditorError::NotCropping);
        };
        surface.mode = Mode::Idle;
        Ok(surface.geometry.restore(start))
    }

    /// Snapshot the current selection for export.
    pub fn confirm_crop(&mut self) -> Result<ExportJob, EditorError> {
        let quality = self.config.jpeg_quality;
        let request = self.next_request;
        let (session, item, surface) = self.ready_mut()?;
        if surface.pending.is_some() {
            return Err(EditorError::ExportPending);
        }
        if !matches!(surface.mode, Mode::Cropping { .. }) {
            return Err(EditorError::NotCropping);
        }
        let region = surface.geometry.region();
        let job = start_export(
            session,
            item,
            request,
            surface,
            ExportPurpose::Crop,
            region,
            quality,
        );
        self.next_request += 1;
        Ok(job)
    }

    /// Deliver the result of an [`ExportJob`].
    pub fn export_finished(
        &mut self,
        ticket: SessionTicket,
        result: Result<EncodedBlob, ExportError>,
        photos: &mut PhotoCollection,
        handles: &mut PreviewHandles,
    ) -> Result<ExportOutcome, EditorError> {
        let live = match self.ready_mut() {
            Ok((session, _, surface)) if session == ticket.session => {
                if surface.pending.is_some_and(|p| p.request == ticket.request) {
                    surface.pending.take()
                } else {
                    None
                }
            }
            _ => None,
        };
        let Some(pending) = live else {
            return Err(stale(ticket));
        };

        let blob = match result {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(item = %ticket.item, error = %e, "export failed");
                if let Ok((_, _, surface)) = self.ready_mut() {
                    surface.mode = Mode::Idle;
                }
                return Err(e.into());
            }
        };

        let index = match photos.replace_item(ticket.item, blob.clone()) {
            Ok(index) => index,
            Err(_) => {
                self.close(handles);
                return Err(stale(ticket));
            }
        };

        match pending.purpose {
            ExportPurpose::Commit => {
                tracing::debug!(item = %ticket.item, index, "rotation saved");
                self.close(handles);
                Ok(ExportOutcome::Committed { index })
            }
            ExportPurpose::Crop => {
                let session = self.open.as_mut().ok_or(EditorError::NotOpen)?;
                let Phase::Ready(surface) = &mut session.phase else {
                    return Err(EditorError::NotReady);
                };
                let cropped = render::render_crop(&surface.view, pending.display, &pending.region)?;
                let natural = DisplaySize::natural(&cropped);

                surface.view = cropped.clone();
                surface.base = cropped;
                surface.rotation = Rotation::NONE;
                surface.display = natural;
                surface.geometry.set_bounds(natural.width, natural.height);
                surface.mode = Mode::Idle;
                surface.edited = Some(blob);

                handles.release(session.handle);
                session.handle = handles.acquire(session.item);
                tracing::debug!(
                    item = %session.item,
                    index,
                    width = surface.view.width,
                    height = surface.view.height,
                    "crop applied"
                );
                Ok(ExportOutcome::Cropped {
                    index,
                    handle: session.handle,
                })
            }
        }
    }

    // ----- queries -----

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.surface().is_some()
    }

    pub fn is_cropping(&self) -> bool {
        self.surface()
            .is_some_and(|s| matches!(s.mode, Mode::Cropping { .. }))
    }

    pub fn is_export_pending(&self) -> bool {
        self.surface().is_some_and(|s| s.pending.is_some())
    }

    /// Photo being edited.
    pub fn item(&self) -> Option<ItemId> {
        self.open.as_ref().map(|s| s.item)
    }

    /// Preview handle of the open session.
    pub fn handle(&self) -> Option<DisplayHandle> {
        self.open.as_ref().map(|s| s.handle)
    }

    /// The working surface, rotation applied.
    pub fn image(&self) -> Option<&DecodedImage> {
        self.surface().map(|s| &s.view)
    }

    pub fn rotation(&self) -> Option<Rotation> {
        self.surface().map(|s| s.rotation)
    }

    pub fn region(&self) -> Option<CropRegion> {
        self.surface().map(|s| s.geometry.region())
    }

    pub fn display_size(&self) -> Option<DisplaySize> {
        self.surface().map(|s| s.display)
    }

    pub fn aspect_lock(&self) -> AspectLock {
        self.aspect
    }

    // ----- internals -----

    fn next_request(&mut self) -> u64 {
        let request = self.next_request;
        self.next_request += 1;
        request
    }

    fn surface(&self) -> Option<&Surface> {
        match &self.open {
            Some(OpenSession {
                phase: Phase::Ready(surface),
                ..
            }) => Some(surface.as_ref()),
            _ => None,
        }
    }

    fn ready_mut(&mut self) -> Result<(u64, ItemId, &mut Surface), EditorError> {
        let session = self.open.as_mut().ok_or(EditorError::NotOpen)?;
        match &mut session.phase {
            Phase::Ready(surface) => Ok((session.id, session.item, surface.as_mut())),
            Phase::Loading { .. } => Err(EditorError::NotReady),
        }
    }

    fn cropping_mut(&mut self) -> Result<&mut Surface, EditorError> {
        let (_, _, surface) = self.ready_mut()?;
        if surface.pending.is_some() {
            return Err(EditorError::ExportPending);
        }
        if !matches!(surface.mode, Mode::Cropping { .. }) {
            return Err(EditorError::NotCropping);
        }
        Ok(surface)
    }

    fn close(&mut self, handles: &mut PreviewHandles) {
        if let Some(session) = self.open.take() {
            handles.release(session.handle);
            tracing::debug!(session = session.id, item = %session.item, "editor closed");
        }
    }
}

fn start_export(
    session: u64,
    item: ItemId,
    request: u64,
    surface: &mut Surface,
    purpose: ExportPurpose,
    region: CropRegion,
    quality: u8,
) -> ExportJob {
    surface.pending = Some(PendingExport {
        request,
        purpose,
        display: surface.display,
        region,
    });
    ExportJob {
        ticket: SessionTicket {
            session,
            request,
            item,
        },
        purpose,
        image: surface.view.clone(),
        display: surface.display,
        region,
        quality,
    }
}

fn stale(ticket: SessionTicket) -> EditorError {
    tracing::warn!(item = %ticket.item, "discarding stale export result");
    EditorError::StaleResult
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::encode::encode_jpeg;
    use crate::source::SelectedFile;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Property: any sequence of rotations leaves the working surface
        /// at the dimensions implied by the final angle.
        #[test]
        fn prop_rotation_dimensions(
            (w, h) in (1u32..=24, 1u32..=24),
            turns in 0usize..9,
        ) {
            let pixels = vec![200u8; (w * h * 3) as usize];
            let bytes = encode_jpeg(&pixels, w, h, 90).unwrap();
            let mut photos = PhotoCollection::new(1);
            photos.add([SelectedFile::new("p.jpg", "image/jpeg", bytes)]).unwrap();
            let mut handles = PreviewHandles::new();
            let mut editor = EditorSession::new(EditorConfig::default());
            editor.open_with(&photos, 0, &mut handles).unwrap();

            let mut rotation = Rotation::NONE;
            for _ in 0..turns {
                rotation = editor.rotate().unwrap();
            }

            prop_assert_eq!(rotation.degrees() as usize, (turns * 90) % 360);
            prop_assert_eq!(
                editor.image().unwrap().dimensions(),
                rotation.rotated_dimensions(w, h)
            );
        }
    }
}
