// ============================================================
// Layer 4 — Split Index
// ============================================================
// Groups image records by their split label once, at load time.
//
//   images (file order)         split index
//   ┌────┬────┬────┬────┐       train → [0, 2]
//   │ tr │ va │ tr │ te │  ──▶  val   → [1]
//   └────┴────┴────┴────┘       test  → [3]
//
// Each split keeps the images in file order. The index stores
// positions into the accessor's image list, never copies.
// train, val and test are always present (possibly empty) so
// asking for their size never fails; any other name must come
// from the dataset file itself.

use std::collections::HashMap;

use crate::domain::error::{Result, VqaError};
use crate::domain::image::ImageRecord;

/// The canonical split names
pub const TRAIN: &str = "train";
pub const VAL: &str = "val";
pub const TEST: &str = "test";

/// Mapping from split name to image positions, read-only after build
#[derive(Debug, Clone, Default)]
pub struct SplitIndex {
    splits: HashMap<String, Vec<usize>>,
}

impl SplitIndex {
    /// Build the index from images in file order
    pub fn build(images: &[ImageRecord]) -> Self {
        let mut splits: HashMap<String, Vec<usize>> = [TRAIN, VAL, TEST]
            .into_iter()
            .map(|s| (s.to_string(), Vec::new()))
            .collect();

        for (pos, img) in images.iter().enumerate() {
            splits.entry(img.split.clone()).or_default().push(pos);
        }

        for (name, members) in &splits {
            tracing::debug!("Split '{}': {} images", name, members.len());
        }

        Self { splits }
    }

    /// Image positions of a split, in file order.
    ///
    /// # Errors
    /// `VqaError::UnknownSplit` if the split does not exist.
    pub fn get(&self, split: &str) -> Result<&[usize]> {
        self.splits
            .get(split)
            .map(Vec::as_slice)
            .ok_or_else(|| VqaError::UnknownSplit(split.to_string()))
    }

    /// Whether the split name exists in the index
    pub fn contains(&self, split: &str) -> bool {
        self.splits.contains_key(split)
    }

    /// All split names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.splits.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn images(splits: &[&str]) -> Vec<ImageRecord> {
        splits
            .iter()
            .enumerate()
            .map(|(i, s)| ImageRecord::new(i as u64, *s, Vec::new()))
            .collect()
    }

    #[test]
    fn test_groups_in_file_order() {
        let idx = SplitIndex::build(&images(&["train", "val", "train", "test"]));
        assert_eq!(idx.get("train").unwrap(), &[0, 2]);
        assert_eq!(idx.get("val").unwrap(), &[1]);
        assert_eq!(idx.get("test").unwrap(), &[3]);
    }

    #[test]
    fn test_canonical_splits_always_exist() {
        let idx = SplitIndex::build(&[]);
        assert!(idx.get("test").unwrap().is_empty());
        assert_eq!(idx.names(), vec!["test", "train", "val"]);
    }

    #[test]
    fn test_unknown_split() {
        let idx = SplitIndex::build(&images(&["train"]));
        assert!(matches!(idx.get("dev"), Err(VqaError::UnknownSplit(s)) if s == "dev"));
    }

    #[test]
    fn test_custom_split_from_file() {
        let idx = SplitIndex::build(&images(&["train", "extra"]));
        assert!(idx.contains("extra"));
        assert_eq!(idx.get("extra").unwrap(), &[1]);
    }
}
