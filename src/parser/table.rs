use serde::Serialize;

use super::tokens::split_fields;

pub const WORDS: &str = "Words";
pub const MEANINGS: &str = "Meanings";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VocabRow {
    #[serde(rename = "Words")]
    pub word: String,
    #[serde(rename = "Meanings")]
    pub meaning: String,
}

impl VocabRow {
    pub fn new(word: impl Into<String>, meaning: impl Into<String>) -> Self {
        VocabRow {
            word: word.into(),
            meaning: meaning.into(),
        }
    }
}

/// Two-column vocabulary table. Row position doubles as the index, so
/// concatenation and filtering always leave it contiguous.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VocabTable {
    rows: Vec<VocabRow>,
}

impl VocabTable {
    pub fn columns() -> [&'static str; 2] {
        [WORDS, MEANINGS]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[VocabRow] {
        &self.rows
    }

    /// Concatenate page tables in order.
    pub fn concat<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = VocabTable>,
    {
        VocabTable {
            rows: tables.into_iter().flat_map(|t| t.rows).collect(),
        }
    }

    /// Drop every row whose word is exactly `header`. Returns how many went.
    pub fn drop_header(&mut self, header: &str) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| r.word != header);
        before - self.rows.len()
    }
}

impl FromIterator<VocabRow> for VocabTable {
    fn from_iter<T: IntoIterator<Item = VocabRow>>(iter: T) -> Self {
        VocabTable {
            rows: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for VocabTable {
    type Item = VocabRow;
    type IntoIter = std::vec::IntoIter<VocabRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// One row per line: word before the first separator, the rest is the meaning.
pub fn lines_to_df<S: AsRef<str>>(lines: &[S], separator: &str) -> VocabTable {
    lines
        .iter()
        .map(|line| {
            let fields = split_fields(line.as_ref(), separator);
            VocabRow::new(fields.word, fields.meaning)
        })
        .collect()
}
