use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use serde::Serialize;

use crate::parser::table::{VocabRow, VocabTable};

// "; liep - gelopen - lopen" style verb forms after the meaning
static VERB_FORMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r";\s*[\w\s]+-[\w\s]+-[\w\s]+").unwrap());

pub const TRIMMED_COLUMNS: [&str; 4] = ["Words", "Meanings", "Words_trimmed", "Meanings_trimmed"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRow {
    #[serde(rename = "Words")]
    pub word: String,
    #[serde(rename = "Meanings")]
    pub meaning: String,
    #[serde(rename = "Words_trimmed")]
    pub word_trimmed: String,
    #[serde(rename = "Meanings_trimmed")]
    pub meaning_trimmed: String,
}

/// Strips article markers and verb-form tails so the columns can be fed to
/// a translator word by word.
#[derive(Debug, Clone)]
pub struct Normalizer {
    word_article: Option<Regex>,
    meaning_article: Option<Regex>,
}

impl Normalizer {
    pub fn new<S: AsRef<str>>(articles: &[S]) -> Result<Self, regex::Error> {
        if articles.is_empty() {
            return Ok(Normalizer {
                word_article: None,
                meaning_article: None,
            });
        }
        let alternation = articles.iter().map(|a| regex::escape(a.as_ref())).join("|");
        Ok(Normalizer {
            word_article: Some(Regex::new(&format!(r"\s\(({alternation})\)"))?),
            meaning_article: Some(Regex::new(&format!(r"\(({alternation})\)"))?),
        })
    }

    pub fn word(&self, word: &str) -> String {
        match &self.word_article {
            Some(re) => re.replace_all(word, "").into_owned(),
            None => word.to_string(),
        }
    }

    pub fn meaning(&self, meaning: &str) -> String {
        let without_forms = VERB_FORMS_RE.replace_all(meaning, "");
        let without_articles = match &self.meaning_article {
            Some(re) => re.replace_all(&without_forms, "").into_owned(),
            None => without_forms.into_owned(),
        };
        without_articles.trim().to_string()
    }

    pub fn row(&self, row: &VocabRow) -> NormalizedRow {
        NormalizedRow {
            word: row.word.clone(),
            meaning: row.meaning.clone(),
            word_trimmed: self.word(&row.word),
            meaning_trimmed: self.meaning(&row.meaning),
        }
    }

    pub fn table(&self, table: &VocabTable) -> Vec<NormalizedRow> {
        table.rows().iter().map(|r| self.row(r)).collect()
    }
}
