//! Cyclic label assignment for animation frames

use crate::{Error, Result};

/// Ordered, non-empty list of labels assigned to frames by position
///
/// Frame `i` receives `labels[i % labels.len()]`, so a set shorter than the
/// animation is reused from the start.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<String>", into = "Vec<String>")
)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    /// Creates a label set, rejecting an empty list
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(Error::EmptyLabelSet);
        }
        Ok(Self { labels })
    }

    /// Creates the set `Layer_1`, `Layer_2`, ... `Layer_{count}`
    pub fn layers(count: usize) -> Result<Self> {
        Self::new((1..=count).map(|n| format!("Layer_{n}")))
    }

    /// Returns the label for the frame at `frame_index`
    pub fn label_for(&self, frame_index: usize) -> &str {
        &self.labels[frame_index % self.labels.len()]
    }

    /// Number of distinct labels in the cycle
    pub fn len(&self) -> usize {
        self.labels.len()
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self {
            labels: (1..=6).map(|n| format!("Layer_{n}")).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for LabelSet {
    type Error = Error;

    fn try_from(labels: Vec<String>) -> Result<Self> {
        Self::new(labels)
    }
}

impl From<LabelSet> for Vec<String> {
    fn from(set: LabelSet) -> Self {
        set.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_rejected() {
        let err = LabelSet::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, Error::EmptyLabelSet));
    }

    #[test]
    fn test_label_for_cycles() {
        let set = LabelSet::new(["a", "b", "c"]).unwrap();
        for i in 0..20 {
            assert_eq!(set.label_for(i), ["a", "b", "c"][i % 3]);
        }
    }

    #[test]
    fn test_nine_frames_six_labels() {
        let set = LabelSet::default();
        assert_eq!(set.len(), 6);
        assert_eq!(set.label_for(5), "Layer_6");
        assert_eq!(set.label_for(6), "Layer_1");
        assert_eq!(set.label_for(8), "Layer_3");
    }

    #[test]
    fn test_layers_matches_default() {
        assert_eq!(LabelSet::layers(6).unwrap(), LabelSet::default());
        assert!(LabelSet::layers(0).is_err());
    }
}
