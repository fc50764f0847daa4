// ============================================================
// Layer 4 — Dataset Accessor
// ============================================================
// Owns every image record for the lifetime of the process and
// exposes them split by split:
//
//   split_size                       → counts
//   sample_image_qa_pair             → one random (image, pair)
//   sample_image_qa_multiple_choice  → one random (image, mc test)
//   iter_image_qa_pair               → every (image, pair), in order
//   iter_image_qa_pair_batch         → the same, grouped in batches
//   iter_image_qa_multiple_choice    → every (image, mc test)
//   iter_qa_pairs / iter_qa_multiple_choice → without the image
//   iter_images                      → images, optionally shuffled
//
// Iterators are lazy and borrow the accessor, so calling the
// method again restarts from the beginning. Each yielded record
// is prepared on the way out: tokens are derived when tokenization
// is on, and the feature vector is attached when a feature store
// was loaded. Both are cached on the record, so a second pass
// does no extra work. Without a feature store no lookup is ever
// attempted.
//
// Randomness always comes from the caller's RNG, so a seeded
// StdRng gives reproducible samples and layouts.
//
// Sampling is two-stage: pick an image uniformly, then a pair of
// that image uniformly. Pairs on images with few questions are
// therefore more likely than pairs on crowded images; this is not
// uniform over the flattened pair list.

use anyhow::Result as AnyResult;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::batcher::QaBatcher;
use crate::data::multiple_choice::{self, MultipleChoiceView};
use crate::data::split_index::SplitIndex;
use crate::domain::error::Result;
use crate::domain::image::ImageRecord;
use crate::domain::qa_pair::QaPair;
use crate::domain::traits::{DatasetSource, FeatureLookup};

/// What getSplitSize counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    QaPairs,
    Images,
}

/// An image together with one of its QA pairs
#[derive(Debug, Clone, Copy)]
pub struct ImageQaPair<'a> {
    pub image:   &'a ImageRecord,
    pub qa_pair: &'a QaPair,
}

/// An image together with one of its pairs rendered as a mc test
#[derive(Debug, Clone)]
pub struct ImageMultipleChoice<'a> {
    pub image: &'a ImageRecord,
    pub mc:    MultipleChoiceView<'a>,
}

/// Read-mostly, in-memory access to a VQA dataset
pub struct DatasetAccessor {
    images:   Vec<ImageRecord>,
    index:    SplitIndex,
    features: Option<Box<dyn FeatureLookup>>,
    tokenize: bool,
}

impl DatasetAccessor {
    /// Index `images` by split. `tokenize` controls whether yielded
    /// pairs get their token sequences derived.
    pub fn new(images: Vec<ImageRecord>, tokenize: bool) -> Self {
        let index = SplitIndex::build(&images);
        Self { images, index, features: None, tokenize }
    }

    /// Load all records from a source and index them
    pub fn from_source(source: &dyn DatasetSource, tokenize: bool) -> AnyResult<Self> {
        Ok(Self::new(source.load_images()?, tokenize))
    }

    /// Attach a feature store; images get their vector on first access
    pub fn with_features(mut self, lookup: impl FeatureLookup + 'static) -> Self {
        self.features = Some(Box::new(lookup));
        self
    }

    /// Whether a feature store is loaded
    pub fn has_features(&self) -> bool {
        self.features.is_some()
    }

    /// Whether yielded pairs are tokenized
    pub fn tokenizes(&self) -> bool {
        self.tokenize
    }

    /// The split index built at load time
    pub fn index(&self) -> &SplitIndex {
        &self.index
    }

    // ── Preparation of yielded records ───────────────────────────────────────

    fn prepare_image<'a>(&self, img: &'a ImageRecord) -> Result<&'a ImageRecord> {
        if let Some(lookup) = self.features.as_deref() {
            img.ensure_features(lookup)?;
        }
        Ok(img)
    }

    fn prepare_pair<'a>(&self, pair: &'a QaPair) -> Result<&'a QaPair> {
        if self.tokenize {
            pair.ensure_tokens()?;
        }
        Ok(pair)
    }

    fn image_qa_pair<'a>(&self, img: &'a ImageRecord, pair: &'a QaPair) -> Result<ImageQaPair<'a>> {
        Ok(ImageQaPair {
            image:   self.prepare_image(img)?,
            qa_pair: self.prepare_pair(pair)?,
        })
    }

    fn multiple_choice<'a, R: Rng + ?Sized>(
        &self,
        pair:    &'a QaPair,
        shuffle: bool,
        rng:     &mut R,
    ) -> Result<MultipleChoiceView<'a>> {
        let qa_pair = self.prepare_pair(pair)?;
        let choices = multiple_choice::build(qa_pair, qa_pair.tokens(), shuffle, rng);
        Ok(MultipleChoiceView { qa_pair, choices })
    }

    fn split_images(
        &self,
        split:      &str,
        max_images: Option<usize>,
    ) -> Result<impl Iterator<Item = &ImageRecord> + '_> {
        let positions = self.index.get(split)?;
        Ok(positions
            .iter()
            .take(max_images.unwrap_or(usize::MAX))
            .map(move |&i| &self.images[i]))
    }

    // ── Public operations ────────────────────────────────────────────────────

    /// Number of QA pairs or images in a split.
    ///
    /// # Errors
    /// `VqaError::UnknownSplit` if the split does not exist.
    pub fn split_size(&self, split: &str, unit: SizeUnit) -> Result<usize> {
        let images = self.split_images(split, None)?;
        Ok(match unit {
            SizeUnit::QaPairs => images.map(|img| img.qa_pairs.len()).sum(),
            SizeUnit::Images  => images.count(),
        })
    }

    /// Sample an image uniformly, then one of its pairs uniformly.
    /// `None` when the split is empty or the image has no pairs.
    pub fn sample_image_qa_pair<R: Rng + ?Sized>(
        &self,
        split: &str,
        rng:   &mut R,
    ) -> Result<Option<ImageQaPair<'_>>> {
        let Some(&pos) = self.index.get(split)?.choose(rng) else {
            return Ok(None);
        };
        let img = &self.images[pos];
        match img.qa_pairs.choose(rng) {
            Some(pair) => self.image_qa_pair(img, pair).map(Some),
            None       => Ok(None),
        }
    }

    /// Two-stage sample rendered as a multiple-choice test
    pub fn sample_image_qa_multiple_choice<R: Rng + ?Sized>(
        &self,
        split:   &str,
        shuffle: bool,
        rng:     &mut R,
    ) -> Result<Option<ImageMultipleChoice<'_>>> {
        let Some(&pos) = self.index.get(split)?.choose(rng) else {
            return Ok(None);
        };
        let img = &self.images[pos];
        let Some(pair) = img.qa_pairs.choose(rng) else {
            return Ok(None);
        };
        Ok(Some(ImageMultipleChoice {
            image: self.prepare_image(img)?,
            mc:    self.multiple_choice(pair, shuffle, rng)?,
        }))
    }

    /// Every (image, pair) of the split, image by image, pair by pair.
    /// Stops after `max_images` images when given.
    pub fn iter_image_qa_pair(
        &self,
        split:      &str,
        max_images: Option<usize>,
    ) -> Result<impl Iterator<Item = Result<ImageQaPair<'_>>> + '_> {
        let images = self.split_images(split, max_images)?;
        Ok(images.flat_map(move |img| {
            img.qa_pairs
                .iter()
                .map(move |pair| self.image_qa_pair(img, pair))
        }))
    }

    /// The iter_image_qa_pair traversal grouped into batches of at
    /// most `max_batch_size`; the final partial batch is yielded too.
    pub fn iter_image_qa_pair_batch(
        &self,
        split:          &str,
        max_images:     Option<usize>,
        max_batch_size: usize,
    ) -> Result<QaBatcher<impl Iterator<Item = Result<ImageQaPair<'_>>> + '_>> {
        Ok(QaBatcher::new(
            self.iter_image_qa_pair(split, max_images)?,
            max_batch_size,
        ))
    }

    /// Every (image, pair) of the split as a multiple-choice test
    pub fn iter_image_qa_multiple_choice<'a, R: Rng + ?Sized + 'a>(
        &'a self,
        split:      &str,
        max_images: Option<usize>,
        shuffle:    bool,
        rng:        &'a mut R,
    ) -> Result<impl Iterator<Item = Result<ImageMultipleChoice<'a>>> + 'a> {
        let images = self.split_images(split, max_images)?;
        Ok(images
            .flat_map(|img| img.qa_pairs.iter().map(move |pair| (img, pair)))
            .map(move |(img, pair)| -> Result<ImageMultipleChoice<'a>> {
                Ok(ImageMultipleChoice {
                    image: self.prepare_image(img)?,
                    mc:    self.multiple_choice(pair, shuffle, &mut *rng)?,
                })
            }))
    }

    /// Every pair of the split, without the image
    pub fn iter_qa_pairs(
        &self,
        split: &str,
    ) -> Result<impl Iterator<Item = Result<&QaPair>> + '_> {
        let images = self.split_images(split, None)?;
        Ok(images
            .flat_map(|img| img.qa_pairs.iter())
            .map(move |pair| self.prepare_pair(pair)))
    }

    /// Every pair of the split as a multiple-choice test
    pub fn iter_qa_multiple_choice<'a, R: Rng + ?Sized + 'a>(
        &'a self,
        split:   &str,
        shuffle: bool,
        rng:     &'a mut R,
    ) -> Result<impl Iterator<Item = Result<MultipleChoiceView<'a>>> + 'a> {
        let images = self.split_images(split, None)?;
        Ok(images
            .flat_map(|img| img.qa_pairs.iter())
            .map(move |pair| self.multiple_choice(pair, shuffle, &mut *rng)))
    }

    /// Images of the split. With `shuffle`, the order is a uniform
    /// random permutation drawn once for this call (the index itself
    /// stays in file order), then truncated to `max_images`.
    pub fn iter_images<R: Rng + ?Sized>(
        &self,
        split:      &str,
        shuffle:    bool,
        max_images: Option<usize>,
        rng:        &mut R,
    ) -> Result<ImageIter<'_>> {
        let mut order: Vec<usize> = self.index.get(split)?.to_vec();
        if shuffle {
            order.shuffle(rng);
        }
        if let Some(n) = max_images {
            order.truncate(n);
        }
        Ok(ImageIter { accessor: self, order: order.into_iter() })
    }
}

/// Images of one split in a fixed, per-call order
pub struct ImageIter<'a> {
    accessor: &'a DatasetAccessor,
    order:    std::vec::IntoIter<usize>,
}

impl<'a> Iterator for ImageIter<'a> {
    type Item = Result<&'a ImageRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.order.next()?;
        Some(self.accessor.prepare_image(&self.accessor.images[pos]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::VqaError;
    use crate::domain::image::ImageId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn pair(id: u64) -> QaPair {
        QaPair::new(id, format!("What is {id}?"), Some(format!("Thing {id}.").as_str()))
            .with_choices(["Other a.", "Other b.", "Other c."])
    }

    /// train: img 1 (3 pairs), img 2 (1 pair), img 4 (2 pairs)
    /// val:   img 3 (2 pairs)
    fn toy() -> DatasetAccessor {
        let images = vec![
            ImageRecord::new(1, "train", vec![pair(10), pair(11), pair(12)]),
            ImageRecord::new(2, "train", vec![pair(20)]),
            ImageRecord::new(3, "val",   vec![pair(30), pair(31)]),
            ImageRecord::new(4, "train", vec![pair(40), pair(41)]),
        ];
        DatasetAccessor::new(images, true)
    }

    struct MapLookup(HashMap<ImageId, Vec<f32>>);

    impl FeatureLookup for MapLookup {
        fn feature_column(&self, image_id: ImageId) -> Result<Vec<f32>> {
            self.0
                .get(&image_id)
                .cloned()
                .ok_or(VqaError::FeatureNotFound(image_id))
        }
    }

    fn ids<'a>(it: impl Iterator<Item = Result<ImageQaPair<'a>>>) -> Vec<u64> {
        it.map(|r| r.unwrap().qa_pair.qa_id).collect()
    }

    #[test]
    fn test_split_sizes() {
        let dp = toy();
        assert_eq!(dp.split_size("train", SizeUnit::QaPairs).unwrap(), 6);
        assert_eq!(dp.split_size("train", SizeUnit::Images).unwrap(), 3);
        assert_eq!(dp.split_size("val", SizeUnit::QaPairs).unwrap(), 2);
        assert_eq!(dp.split_size("test", SizeUnit::Images).unwrap(), 0);
        assert!(matches!(
            dp.split_size("dev", SizeUnit::Images),
            Err(VqaError::UnknownSplit(_))
        ));
    }

    #[test]
    fn test_iter_image_qa_pair_order() {
        let dp = toy();
        let got = ids(dp.iter_image_qa_pair("train", None).unwrap());
        assert_eq!(got, vec![10, 11, 12, 20, 40, 41]);
    }

    #[test]
    fn test_iter_is_restartable() {
        let dp = toy();
        let a = ids(dp.iter_image_qa_pair("train", None).unwrap());
        let b = ids(dp.iter_image_qa_pair("train", None).unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_max_images_stops_early() {
        let dp = toy();
        assert_eq!(ids(dp.iter_image_qa_pair("train", Some(2)).unwrap()), vec![10, 11, 12, 20]);
        assert!(ids(dp.iter_image_qa_pair("train", Some(0)).unwrap()).is_empty());
    }

    #[test]
    fn test_batches_cover_plain_iteration() {
        let dp = toy();
        let flat = ids(dp.iter_image_qa_pair("train", None).unwrap());
        let batches: Vec<Vec<ImageQaPair<'_>>> = dp
            .iter_image_qa_pair_batch("train", None, 4)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(batches.iter().map(Vec::len).collect::<Vec<_>>(), vec![4, 2]);
        let joined: Vec<u64> = batches.iter().flatten().map(|p| p.qa_pair.qa_id).collect();
        assert_eq!(joined, flat);
    }

    #[test]
    fn test_pairs_are_tokenized_on_access() {
        let dp = toy();
        let first = dp.iter_qa_pairs("val").unwrap().next().unwrap().unwrap();
        assert_eq!(first.answer_tokens().unwrap(), ["thing", "30", "."]);
    }

    #[test]
    fn test_no_tokenization_when_disabled() {
        let images = vec![ImageRecord::new(1, "val", vec![QaPair::new(1, "no mark", Some("red"))])];
        let dp = DatasetAccessor::new(images, false);
        let p = dp.iter_qa_pairs("val").unwrap().next().unwrap().unwrap();
        assert!(p.tokens().is_none());
    }

    #[test]
    fn test_malformed_record_fails_iteration() {
        let images = vec![ImageRecord::new(1, "val", vec![QaPair::new(1, "no mark", Some("Red."))])];
        let dp = DatasetAccessor::new(images, true);
        let res: Result<Vec<_>> = dp.iter_qa_pairs("val").unwrap().collect();
        assert!(matches!(res, Err(VqaError::Format { .. })));
    }

    #[test]
    fn test_multiple_choice_iteration() {
        let dp = toy();
        let mut rng = StdRng::seed_from_u64(3);
        let all: Vec<ImageMultipleChoice<'_>> = dp
            .iter_image_qa_multiple_choice("train", None, true, &mut rng)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(all.len(), 6);
        for item in &all {
            let mc = item.mc.choices.as_ref().unwrap();
            assert_eq!(mc.candidates.len(), 4);
            assert_eq!(mc.selected(), item.mc.qa_pair.answer.as_deref());
            assert_eq!(mc.tokens.as_ref().unwrap().len(), 4);
        }
    }

    #[test]
    fn test_qa_multiple_choice_unshuffled_is_identity() {
        let dp = toy();
        let mut rng = StdRng::seed_from_u64(0);
        for view in dp.iter_qa_multiple_choice("val", false, &mut rng).unwrap() {
            assert_eq!(view.unwrap().choices.unwrap().selection, Some(0));
        }
    }

    #[test]
    fn test_sampling_is_reproducible() {
        let dp = toy();
        let a = dp
            .sample_image_qa_pair("train", &mut StdRng::seed_from_u64(8))
            .unwrap()
            .unwrap();
        let b = dp
            .sample_image_qa_pair("train", &mut StdRng::seed_from_u64(8))
            .unwrap()
            .unwrap();
        assert_eq!(a.qa_pair.qa_id, b.qa_pair.qa_id);
        assert_eq!(a.image.split, "train");
        assert!(a.image.qa_pairs.iter().any(|p| p.qa_id == a.qa_pair.qa_id));
    }

    #[test]
    fn test_sampling_empty_split() {
        let dp = toy();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(dp.sample_image_qa_pair("test", &mut rng).unwrap().is_none());
        assert!(dp
            .sample_image_qa_multiple_choice("test", true, &mut rng)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_sample_multiple_choice() {
        let dp = toy();
        let mut rng = StdRng::seed_from_u64(21);
        let s = dp
            .sample_image_qa_multiple_choice("val", true, &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(s.image.image_id, 3);
        let mc = s.mc.choices.unwrap();
        assert_eq!(mc.selected(), s.mc.qa_pair.answer.as_deref());
    }

    #[test]
    fn test_iter_images_shuffled_is_permutation() {
        let dp = toy();
        let mut rng = StdRng::seed_from_u64(5);
        let mut got: Vec<u64> = dp
            .iter_images("train", true, None, &mut rng)
            .unwrap()
            .map(|r| r.unwrap().image_id)
            .collect();
        got.sort_unstable();
        assert_eq!(got, vec![1, 2, 4]);

        // the index keeps file order
        let plain: Vec<u64> = dp
            .iter_images("train", false, None, &mut rng)
            .unwrap()
            .map(|r| r.unwrap().image_id)
            .collect();
        assert_eq!(plain, vec![1, 2, 4]);
    }

    #[test]
    fn test_iter_images_truncates_after_shuffle() {
        let dp = toy();
        let mut rng = StdRng::seed_from_u64(5);
        let got = dp.iter_images("train", true, Some(2), &mut rng).unwrap().count();
        assert_eq!(got, 2);
    }

    #[test]
    fn test_features_attached_on_access() {
        let lookup = MapLookup(
            [(1, vec![1.0]), (2, vec![2.0]), (4, vec![4.0])].into_iter().collect(),
        );
        let dp = toy().with_features(lookup);
        for item in dp.iter_image_qa_pair("train", None).unwrap() {
            let item = item.unwrap();
            assert_eq!(item.image.features(), Some(&[item.image.image_id as f32][..]));
        }
    }

    #[test]
    fn test_missing_feature_column_is_fatal() {
        let lookup = MapLookup([(1, vec![1.0])].into_iter().collect());
        let dp = toy().with_features(lookup);
        let res: Result<Vec<_>> = dp.iter_image_qa_pair("train", None).unwrap().collect();
        assert!(matches!(res, Err(VqaError::FeatureNotFound(2))));
    }

    #[test]
    fn test_no_feature_lookup_without_store() {
        let dp = toy();
        assert!(!dp.has_features());
        let item = dp.iter_image_qa_pair("val", None).unwrap().next().unwrap().unwrap();
        assert!(item.image.features().is_none());
    }
}
