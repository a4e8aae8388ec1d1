//! Photo Collection Manager.
//!
//! Ordered list of the photos attached to a listing. Order is chosen by the
//! seller (drag and drop, "Set as Main") and position 0 is always the main
//! photo used as the listing thumbnail.
//!
//! Each item gets a stable [`ItemId`] when it is added. Positions change on
//! every reorder, so anything that completes later (an export started from
//! the editor, say) refers to items by id rather than by index.

use std::fmt;

use thiserror::Error;

use crate::source::ImageSource;

/// Stable identity of a photo within one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "photo#{}", self.0)
    }
}

/// One photo in the listing's photo set.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageItem {
    id: ItemId,
    source: ImageSource,
}

impl ImageItem {
    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn into_source(self) -> ImageSource {
        self.source
    }
}

/// Errors from collection operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollectionError {
    /// Some of the added photos did not fit. The `accepted` ones were kept.
    #[error("You can upload a maximum of {max} photos ({rejected} not added)")]
    CapacityExceeded {
        max: usize,
        accepted: usize,
        rejected: usize,
    },

    #[error("Photo index {index} out of range (collection has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unknown photo {0}")]
    UnknownItem(ItemId),
}

/// Ordered, capped set of listing photos.
#[derive(Debug, Clone)]
pub struct PhotoCollection {
    items: Vec<ImageItem>,
    max_photos: usize,
    next_id: u64,
}

impl PhotoCollection {
    /// Empty collection holding at most `max_photos` photos.
    pub fn new(max_photos: usize) -> Self {
        Self {
            items: Vec::new(),
            max_photos,
            next_id: 0,
        }
    }

    /// Append photos in order.
    ///
    /// Photos are accepted until the cap is reached; the rest are rejected
    /// and reported through `CollectionError::CapacityExceeded`. Accepted
    /// photos stay in the collection even when that error is returned.
    pub fn add<I>(&mut self, sources: I) -> Result<Vec<ItemId>, CollectionError>
    where
        I: IntoIterator,
        I::Item: Into<ImageSource>,
    {
        let mut added = Vec::new();
        let mut rejected = 0;

        for source in sources {
            if self.items.len() >= self.max_photos {
                rejected += 1;
                continue;
            }
            let id = ItemId(self.next_id);
            self.next_id += 1;
            self.items.push(ImageItem {
                id,
                source: source.into(),
            });
            added.push(id);
        }

        if rejected > 0 {
            tracing::warn!(
                max = self.max_photos,
                accepted = added.len(),
                rejected,
                "photo limit reached"
            );
            return Err(CollectionError::CapacityExceeded {
                max: self.max_photos,
                accepted: added.len(),
                rejected,
            });
        }

        tracing::debug!(added = added.len(), total = self.items.len(), "photos added");
        Ok(added)
    }

    /// Remove the photo at `index`. Later photos shift down, so removing the
    /// main photo promotes the next one.
    pub fn remove(&mut self, index: usize) -> Result<ImageItem, CollectionError> {
        self.check_index(index)?;
        let item = self.items.remove(index);
        tracing::debug!(id = %item.id, index, "photo removed");
        Ok(item)
    }

    /// Drag-and-drop move: take the photo at `from` and insert it at `to`.
    ///
    /// Returns `false` (and changes nothing) when `from == to` or either
    /// index is out of range.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.items.len();
        if from == to || from >= len || to >= len {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }

    /// Move the photo at `index` to position 0, shifting the others down.
    pub fn set_main(&mut self, index: usize) -> Result<(), CollectionError> {
        self.check_index(index)?;
        self.items[..=index].rotate_right(1);
        Ok(())
    }

    /// Swap the content at `index` without moving it. Returns the old content.
    pub fn replace(
        &mut self,
        index: usize,
        source: impl Into<ImageSource>,
    ) -> Result<ImageSource, CollectionError> {
        self.check_index(index)?;
        Ok(std::mem::replace(&mut self.items[index].source, source.into()))
    }

    /// Swap the content of the photo with the given id, wherever it is now.
    /// Returns its current position.
    pub fn replace_item(
        &mut self,
        id: ItemId,
        source: impl Into<ImageSource>,
    ) -> Result<usize, CollectionError> {
        let index = self.position(id).ok_or(CollectionError::UnknownItem(id))?;
        self.items[index].source = source.into();
        Ok(index)
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&ImageItem> {
        self.items.get(index)
    }

    pub fn get_by_id(&self, id: ItemId) -> Option<&ImageItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// The main photo (position 0).
    pub fn main(&self) -> Option<&ImageItem> {
        self.items.first()
    }

    pub fn is_main(&self, index: usize) -> bool {
        index == 0 && !self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn max_photos(&self) -> usize {
        self.max_photos
    }

    pub fn remaining_capacity(&self) -> usize {
        self.max_photos.saturating_sub(self.items.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageItem> {
        self.items.iter()
    }

    /// Consume the collection, yielding the photo contents in display order.
    pub fn into_sources(self) -> Vec<ImageSource> {
        self.items.into_iter().map(ImageItem::into_source).collect()
    }

    fn check_index(&self, index: usize) -> Result<(), CollectionError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(CollectionError::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{EncodedBlob, SelectedFile};

    fn file(name: &str) -> SelectedFile {
        SelectedFile::new(name, "image/jpeg", name.as_bytes().to_vec())
    }

    fn names(photos: &PhotoCollection) -> Vec<String> {
        photos
            .iter()
            .map(|item| String::from_utf8(item.source().bytes().to_vec()).unwrap())
            .collect()
    }

    fn abc() -> PhotoCollection {
        let mut photos = PhotoCollection::new(20);
        photos.add([file("A"), file("B"), file("C")]).unwrap();
        photos
    }

    #[test]
    fn test_add_appends_in_order() {
        let photos = abc();
        assert_eq!(names(&photos), ["A", "B", "C"]);
        assert!(photos.is_main(0));
        assert!(!photos.is_main(1));
    }

    #[test]
    fn test_add_over_cap_accepts_up_to_cap() {
        let mut photos = PhotoCollection::new(20);
        let files: Vec<_> = (0..25).map(|i| file(&format!("f{i}"))).collect();

        let result = photos.add(files);
        assert_eq!(
            result,
            Err(CollectionError::CapacityExceeded {
                max: 20,
                accepted: 20,
                rejected: 5
            })
        );
        assert_eq!(photos.len(), 20);
        assert_eq!(photos.remaining_capacity(), 0);
    }

    #[test]
    fn test_add_when_full_rejects_everything() {
        let mut photos = PhotoCollection::new(2);
        photos.add([file("A"), file("B")]).unwrap();
        let result = photos.add([file("C")]);
        assert!(matches!(
            result,
            Err(CollectionError::CapacityExceeded { accepted: 0, rejected: 1, .. })
        ));
        assert_eq!(names(&photos), ["A", "B"]);
    }

    #[test]
    fn test_remove_main_promotes_next() {
        let mut photos = abc();
        let removed = photos.remove(0).unwrap();
        assert_eq!(removed.source().bytes(), b"A");
        assert_eq!(photos.main().unwrap().source().bytes(), b"B");
        assert_eq!(names(&photos), ["B", "C"]);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut photos = abc();
        assert_eq!(
            photos.remove(3).unwrap_err(),
            CollectionError::IndexOutOfRange { index: 3, len: 3 }
        );
    }

    #[test]
    fn test_reorder_moves_item() {
        let mut photos = abc();
        assert!(photos.reorder(0, 2));
        assert_eq!(names(&photos), ["B", "C", "A"]);
        assert!(photos.reorder(2, 0));
        assert_eq!(names(&photos), ["A", "B", "C"]);
    }

    #[test]
    fn test_reorder_noops() {
        let mut photos = abc();
        assert!(!photos.reorder(1, 1));
        assert!(!photos.reorder(0, 3));
        assert!(!photos.reorder(7, 0));
        assert_eq!(names(&photos), ["A", "B", "C"]);
    }

    #[test]
    fn test_set_main_moves_to_front() {
        let mut photos = abc();
        photos.set_main(2).unwrap();
        assert_eq!(names(&photos), ["C", "A", "B"]);
    }

    #[test]
    fn test_set_main_zero_is_noop() {
        let mut photos = abc();
        photos.set_main(0).unwrap();
        assert_eq!(names(&photos), ["A", "B", "C"]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut photos = abc();
        let old = photos.replace(1, EncodedBlob::jpeg(b"B2".to_vec())).unwrap();
        assert_eq!(old.bytes(), b"B");
        assert_eq!(names(&photos), ["A", "B2", "C"]);
        assert!(photos.get(1).unwrap().source().is_edited());
    }

    #[test]
    fn test_replace_item_follows_reorder() {
        let mut photos = abc();
        let id = photos.get(0).unwrap().id();
        photos.reorder(0, 2);

        let index = photos.replace_item(id, EncodedBlob::jpeg(b"A2".to_vec())).unwrap();
        assert_eq!(index, 2);
        assert_eq!(names(&photos), ["B", "C", "A2"]);
    }

    #[test]
    fn test_replace_item_unknown() {
        let mut photos = abc();
        let id = photos.get(0).unwrap().id();
        photos.remove(0).unwrap();
        assert_eq!(
            photos.replace_item(id, EncodedBlob::jpeg(vec![])),
            Err(CollectionError::UnknownItem(id))
        );
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let mut photos = abc();
        let removed = photos.remove(2).unwrap().id();
        let added = photos.add([file("D")]).unwrap();
        assert_ne!(added[0], removed);
    }

    #[test]
    fn test_into_sources_keeps_order() {
        let mut photos = abc();
        photos.set_main(1).unwrap();
        let sources = photos.into_sources();
        let bytes: Vec<&[u8]> = sources.iter().map(ImageSource::bytes).collect();
        assert_eq!(bytes, vec![b"B".as_slice(), b"A".as_slice(), b"C".as_slice()]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::source::SelectedFile;
    use proptest::prelude::*;

    proptest! {
        /// Property: the cap holds whatever the batch sizes are.
        #[test]
        fn prop_add_never_exceeds_cap(
            cap in 1usize..=22,
            batches in prop::collection::vec(0usize..=30, 1..5),
        ) {
            let mut photos = PhotoCollection::new(cap);
            for batch in batches {
                let files = (0..batch).map(|i| SelectedFile::new(format!("{i}.jpg"), "image/jpeg", vec![]));
                let before = photos.len();
                let result = photos.add(files);

                prop_assert!(photos.len() <= cap);
                match result {
                    Ok(ids) => {
                        prop_assert_eq!(ids.len(), batch);
                    }
                    Err(CollectionError::CapacityExceeded { accepted, rejected, .. }) => {
                        prop_assert_eq!(accepted + rejected, batch);
                        prop_assert_eq!(photos.len(), before + accepted);
                        prop_assert_eq!(photos.len(), cap);
                    }
                    Err(other) => {
                        prop_assert!(false, "unexpected error {}", other);
                    }
                }
            }
        }

        /// Property: reorder is a permutation of the same items.
        #[test]
        fn prop_reorder_is_permutation(
            len in 1usize..=10,
            from in 0usize..12,
            to in 0usize..12,
        ) {
            let mut photos = PhotoCollection::new(20);
            photos
                .add((0..len).map(|i| SelectedFile::new(format!("{i}"), "image/png", vec![i as u8])))
                .unwrap();

            let mut before: Vec<ItemId> = photos.iter().map(ImageItem::id).collect();
            photos.reorder(from, to);
            let mut after: Vec<ItemId> = photos.iter().map(ImageItem::id).collect();

            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
        }
    }
}
