//! Stored book types

use serde::{Deserialize, Serialize};

use crate::document::{Chapter, Sentence};

/// Table of contents entry as extracted from the book text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TocEntry {
    pub title: String,
    /// Upper-cased, punctuation-free form used to find the heading in the text
    #[serde(default)]
    pub chapter_key: String,
}

/// A sentence of the whole book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSentence {
    /// 1-based position within its paragraph
    pub sentence_number: u32,
    pub paragraph_number: u32,
    pub content: String,
    pub paragraph_start: bool,
}

impl From<&StoredSentence> for Sentence {
    fn from(sentence: &StoredSentence) -> Self {
        Sentence {
            content: sentence.content.clone(),
            paragraph_number: sentence.paragraph_number,
        }
    }
}

/// Full text of a book, as kept on the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBook {
    pub title: String,
    #[serde(default)]
    pub table_of_content: Vec<TocEntry>,
    #[serde(default)]
    pub sentences: Vec<StoredSentence>,
}

/// A book ready to serve: text plus its derived page layout
#[derive(Debug, Clone)]
pub struct LoadedBook {
    pub id: String,
    pub book: StoredBook,
    pub chapters: Vec<Chapter>,
    pub total_pages: u32,
}

/// Entry of the book listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: String,
    pub title: String,
}
