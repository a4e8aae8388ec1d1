//! Listing submission: validate the form, upload the photos in order and
//! produce the record handed to the backend.

use serde::Serialize;
use thiserror::Error;

use crate::collection::PhotoCollection;
use crate::source::ImageSource;

/// A storage upload that did not go through.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Upload of {key} failed: {reason}")]
pub struct UploadError {
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingError {
    #[error("Please fill in the {0} field")]
    MissingField(&'static str),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Add at least one photo")]
    NoPhotos,

    #[error("Photo {index} could not be uploaded")]
    Upload {
        index: usize,
        #[source]
        source: UploadError,
    },
}

/// Listing form as typed by the seller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingForm {
    pub title: String,
    pub brand: String,
    pub category: String,
    pub size: String,
    pub color: String,
    pub condition: String,
    pub description: String,
    pub price: String,
}

/// A form that passed validation. Text fields are trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidListing {
    pub title: String,
    pub brand: String,
    pub category: String,
    pub size: String,
    pub color: String,
    pub condition: String,
    pub description: String,
    pub price_cents: u64,
}

impl ListingForm {
    /// Check every field is filled in (reporting the first one that is not)
    /// and parse the price.
    pub fn validate(&self) -> Result<ValidListing, ListingError> {
        let fields = [
            ("title", &self.title),
            ("brand", &self.brand),
            ("category", &self.category),
            ("size", &self.size),
            ("color", &self.color),
            ("condition", &self.condition),
            ("description", &self.description),
            ("price", &self.price),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ListingError::MissingField(*name));
        }

        Ok(ValidListing {
            title: self.title.trim().to_string(),
            brand: self.brand.trim().to_string(),
            category: self.category.trim().to_string(),
            size: self.size.trim().to_string(),
            color: self.color.trim().to_string(),
            condition: self.condition.trim().to_string(),
            description: self.description.trim().to_string(),
            price_cents: parse_price(&self.price)?,
        })
    }
}

/// Parse a price such as `"12"`, `"12.5"` or `"12.50"` into cents.
pub fn parse_price(input: &str) -> Result<u64, ListingError> {
    let invalid = || ListingError::InvalidPrice(input.to_string());
    let text = input.trim();

    let (whole, fraction) = match text.split_once('.') {
        Some((_, "")) => return Err(invalid()),
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !digits(whole) || !digits(fraction) || fraction.len() > 2 {
        return Err(invalid());
    }

    let whole: u64 = whole.parse().map_err(|_| invalid())?;
    let fraction: u64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<u64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    let cents = whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .ok_or_else(invalid)?;
    if cents == 0 {
        return Err(invalid());
    }
    Ok(cents)
}

/// Object storage for listing photos.
pub trait PhotoUploader {
    /// Store `source` under `key`, returning its public URI.
    fn upload(&mut self, key: &str, source: &ImageSource) -> Result<String, UploadError>;

    /// Remove an object stored by an earlier `upload`.
    fn discard(&mut self, key: &str);
}

/// The listing record sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingDraft {
    pub id: String,
    pub owner: String,
    #[serde(flatten)]
    pub listing: ValidListing,
    /// Photo URIs in display order; index 0 is the main photo.
    pub images: Vec<String>,
}

/// Storage key for the photo at `index`.
pub fn photo_key(owner: &str, listing_id: &str, index: usize, source: &ImageSource) -> String {
    format!("{owner}/{listing_id}/{index:02}.{}", source.extension())
}

/// Validate the form and upload every photo, in collection order.
///
/// All or nothing: if any upload fails, the photos already uploaded are
/// discarded and the error is returned. The collection is only borrowed, so
/// the seller can fix the problem and submit again.
pub fn submit_listing(
    form: &ListingForm,
    photos: &PhotoCollection,
    owner: &str,
    listing_id: &str,
    uploader: &mut dyn PhotoUploader,
) -> Result<ListingDraft, ListingError> {
    let listing = form.validate()?;
    if photos.is_empty() {
        return Err(ListingError::NoPhotos);
    }

    let mut uploaded: Vec<String> = Vec::with_capacity(photos.len());
    let mut images = Vec::with_capacity(photos.len());

    for (index, photo) in photos.iter().map(|item| item.source()).enumerate() {
        let key = photo_key(owner, listing_id, index, photo);
        match uploader.upload(&key, photo) {
            Ok(uri) => {
                uploaded.push(key);
                images.push(uri);
            }
            Err(source) => {
                tracing::warn!(
                    listing = listing_id,
                    index,
                    error = %source,
                    rollback = uploaded.len(),
                    "photo upload failed, rolling back"
                );
                for key in &uploaded {
                    uploader.discard(key);
                }
                return Err(ListingError::Upload { index, source });
            }
        }
    }

    tracing::info!(
        listing = listing_id,
        owner,
        photos = images.len(),
        "listing submitted"
    );
    Ok(ListingDraft {
        id: listing_id.to_string(),
        owner: owner.to_string(),
        listing,
        images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{EncodedBlob, SelectedFile};

    #[derive(Default)]
    struct MemoryStore {
        stored: Vec<String>,
        discarded: Vec<String>,
        fail_at: Option<usize>,
    }

    impl PhotoUploader for MemoryStore {
        fn upload(&mut self, key: &str, _source: &ImageSource) -> Result<String, UploadError> {
            if self.fail_at == Some(self.stored.len()) {
                return Err(UploadError {
                    key: key.to_string(),
                    reason: "quota exceeded".to_string(),
                });
            }
            self.stored.push(key.to_string());
            Ok(format!("https://cdn.test/{key}"))
        }

        fn discard(&mut self, key: &str) {
            self.discarded.push(key.to_string());
        }
    }

    fn form() -> ListingForm {
        ListingForm {
            title: " Denim jacket ".into(),
            brand: "Levi's".into(),
            category: "Jackets".into(),
            size: "M".into(),
            color: "Blue".into(),
            condition: "Good".into(),
            description: "Worn twice".into(),
            price: "45.5".into(),
        }
    }

    fn photos() -> PhotoCollection {
        let mut photos = PhotoCollection::new(20);
        photos
            .add([
                ImageSource::from(SelectedFile::new("front.PNG", "image/png", vec![1])),
                ImageSource::from(EncodedBlob::jpeg(vec![2])),
                ImageSource::from(SelectedFile::new("tag.webp", "", vec![3])),
            ])
            .unwrap();
        photos
    }

    #[test]
    fn test_validate_trims_and_parses() {
        let valid = form().validate().unwrap();
        assert_eq!(valid.title, "Denim jacket");
        assert_eq!(valid.price_cents, 4550);
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let mut f = form();
        f.size = "  ".into();
        f.description.clear();
        assert_eq!(f.validate(), Err(ListingError::MissingField("size")));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("12"), Ok(1200));
        assert_eq!(parse_price("12.5"), Ok(1250));
        assert_eq!(parse_price("0.99"), Ok(99));
        assert_eq!(parse_price(" 7.05 "), Ok(705));

        for bad in ["0", "0.00", "-3", "1.234", "abc", ".5", "1e3", "12.", "1,50"] {
            assert!(parse_price(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_submit_uploads_in_order() {
        let mut store = MemoryStore::default();
        let draft = submit_listing(&form(), &photos(), "u1", "l9", &mut store).unwrap();

        assert_eq!(
            store.stored,
            vec!["u1/l9/00.png", "u1/l9/01.jpg", "u1/l9/02.webp"]
        );
        assert_eq!(draft.images[0], "https://cdn.test/u1/l9/00.png");
        assert_eq!(draft.images.len(), 3);
    }

    #[test]
    fn test_submit_rolls_back_on_failure() {
        let mut store = MemoryStore {
            fail_at: Some(2),
            ..Default::default()
        };
        let err = submit_listing(&form(), &photos(), "u1", "l9", &mut store).unwrap_err();

        assert!(matches!(err, ListingError::Upload { index: 2, .. }));
        assert_eq!(store.discarded, store.stored);
        assert_eq!(store.discarded.len(), 2);
    }

    #[test]
    fn test_retry_after_failed_upload() {
        let photos = photos();
        let mut store = MemoryStore {
            fail_at: Some(1),
            ..Default::default()
        };
        assert!(submit_listing(&form(), &photos, "u1", "l9", &mut store).is_err());
        assert_eq!(photos.len(), 3);

        store.fail_at = None;
        let draft = submit_listing(&form(), &photos, "u1", "l9", &mut store).unwrap();
        assert_eq!(draft.images.len(), 3);
        assert_eq!(draft.images[1], "https://cdn.test/u1/l9/01.jpg");
    }

    #[test]
    fn test_submit_requires_photos() {
        let mut store = MemoryStore::default();
        let err = submit_listing(&form(), &PhotoCollection::new(20), "u1", "l9", &mut store)
            .unwrap_err();
        assert_eq!(err, ListingError::NoPhotos);
        assert!(store.stored.is_empty());
    }

    #[test]
    fn test_invalid_form_uploads_nothing() {
        let mut store = MemoryStore::default();
        let mut f = form();
        f.price = "free".into();
        assert!(matches!(
            submit_listing(&f, &photos(), "u1", "l9", &mut store),
            Err(ListingError::InvalidPrice(_))
        ));
        assert!(store.stored.is_empty());
    }

    #[test]
    fn test_draft_serializes_flat() {
        let mut store = MemoryStore::default();
        let draft = submit_listing(&form(), &photos(), "u1", "l9", &mut store).unwrap();
        let json = serde_json::to_value(&draft).unwrap();

        assert_eq!(json["id"], "l9");
        assert_eq!(json["price_cents"], 4550);
        assert_eq!(json["images"].as_array().unwrap().len(), 3);
    }
}
