use serde::{Deserialize, Serialize};

/// Fields scraped from one item
///
/// Any field whose element was missing stays an empty string; the record
/// itself is always produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub price: String,

    #[serde(rename = "imageAlt")]
    pub image_alt_text: String,

    /// Page the item was read from
    #[serde(rename = "url")]
    pub source_url: String,
}

impl ExtractedRecord {
    /// An empty record that already knows where it came from
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            source_url: url.into(),
            ..Self::default()
        }
    }
}

/// Records of one run, in enumeration order
///
/// Duplicates are kept as found on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordCollection {
    records: Vec<ExtractedRecord>,
}

impl RecordCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ExtractedRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExtractedRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[ExtractedRecord] {
        &self.records
    }

    /// Pretty-printed JSON array of `{price, imageAlt, url}` objects
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }
}

impl FromIterator<ExtractedRecord> for RecordCollection {
    fn from_iter<T: IntoIterator<Item = ExtractedRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RecordCollection {
    type Item = ExtractedRecord;
    type IntoIter = std::vec::IntoIter<ExtractedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordCollection {
    type Item = &'a ExtractedRecord;
    type IntoIter = std::slice::Iter<'a, ExtractedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
