//! Kashi Core - listing photo pipeline
//!
//! This crate provides the photo handling behind the Kashi marketplace "sell"
//! flow: decoding picked photos, the crop/rotate editor, JPEG export, the
//! ordered photo set of a listing and listing submission. Alongside it sit
//! the marketplace records, following sellers and comments.

pub mod auth;
pub mod collection;
pub mod config;
pub mod decode;
pub mod editor;
pub mod encode;
pub mod geometry;
pub mod listing;
pub mod preview;
pub mod records;
pub mod render;
pub mod social;
pub mod source;
pub mod transform;

pub use collection::{CollectionError, ImageItem, ItemId, PhotoCollection};
pub use config::{ConfigError, EditorConfig};
pub use decode::{DecodeError, DecodedImage};
pub use editor::{EditorError, EditorSession, ExportJob, ExportOutcome, LoadRequest};
pub use geometry::{compute_initial_region, AspectLock, CropGeometry, CropRegion};
pub use listing::{submit_listing, ListingDraft, ListingError, ListingForm, PhotoUploader};
pub use preview::{DisplayHandle, PreviewHandles};
pub use render::{export, DisplaySize, ExportError};
pub use social::{CommentDraft, FollowState, FollowStore, SocialError};
pub use source::{EncodedBlob, ImageSource, SelectedFile};
pub use transform::Rotation;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_jpeg;

    /// Pick photos, edit one, reorder, submit.
    #[test]
    fn test_sell_flow() {
        struct Store(Vec<String>);
        impl PhotoUploader for Store {
            fn upload(
                &mut self,
                key: &str,
                _source: &ImageSource,
            ) -> Result<String, listing::UploadError> {
                self.0.push(key.to_string());
                Ok(format!("https://cdn.test/{key}"))
            }
            fn discard(&mut self, _key: &str) {}
        }

        let config = EditorConfig::default();
        let mut photos = PhotoCollection::new(config.max_photos);
        let mut handles = PreviewHandles::new();
        let mut editor = EditorSession::new(config);

        let files = (0..3).map(|i| {
            let w = 40 + i * 10;
            let pixels = vec![90u8; (w * 30 * 3) as usize];
            SelectedFile::new(
                format!("{i}.png"),
                "image/jpeg",
                encode_jpeg(&pixels, w, 30, 90).unwrap(),
            )
        });
        photos.add(files).unwrap();

        editor.open_with(&photos, 2, &mut handles).unwrap();
        editor.set_aspect_lock(AspectLock::SQUARE).unwrap();
        editor.start_crop().unwrap();
        let job = editor.confirm_crop().unwrap();
        editor
            .export_finished(job.ticket, job.run(), &mut photos, &mut handles)
            .unwrap();
        assert!(editor.set_main(&mut photos, &mut handles).unwrap().is_none());
        assert_eq!(handles.live_count(), 0);

        let form = ListingForm {
            title: "Wool coat".into(),
            brand: "Zara".into(),
            category: "Coats".into(),
            size: "S".into(),
            color: "Grey".into(),
            condition: "Like new".into(),
            description: "Warm".into(),
            price: "80".into(),
        };
        let mut store = Store(Vec::new());
        let draft = submit_listing(&form, &photos, "u1", "l1", &mut store).unwrap();

        assert_eq!(store.0, vec!["u1/l1/00.jpg", "u1/l1/01.jpg", "u1/l1/02.jpg"]);
        assert_eq!(draft.images.len(), 3);
        assert_eq!(draft.listing.price_cents, 8000);
    }
}
