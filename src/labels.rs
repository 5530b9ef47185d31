//! Explicit label-to-code mapping for classification datasets.
//!
//! Built once from an ordered label list and injected wherever encoding is
//! needed, instead of re-scanning a label list on every lookup.

use std::collections::HashMap;

/// Bidirectional mapping between label names and dense integer codes.
///
/// Codes are assigned by first occurrence in the input order, starting at 0;
/// later duplicates are ignored.
///
/// # Examples
///
/// ```
/// use lowrank_image::LabelMap;
///
/// let map = LabelMap::new(["notumor", "glioma", "notumor"]);
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.encode("glioma"), Some(1));
/// assert_eq!(map.decode(0), Some("notumor"));
/// assert_eq!(map.encode("meningioma"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LabelMap {
    codes: HashMap<String, usize>,
    labels: Vec<String>,
}

impl LabelMap {
    /// Builds the mapping from an ordered sequence of label names.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = Self::default();
        for label in labels {
            let label = label.into();
            if !map.codes.contains_key(&label) {
                map.codes.insert(label.clone(), map.labels.len());
                map.labels.push(label);
            }
        }
        map
    }

    /// The integer code for `label`, if it is known.
    pub fn encode(&self, label: &str) -> Option<usize> {
        self.codes.get(label).copied()
    }

    /// The label name for `code`, if it is in range.
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// All labels in code order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
