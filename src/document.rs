//! Book page model
//!
//! A book is served one page at a time. Each fetched page carries the whole
//! chapter index plus the sentences of that page only; paragraphs are derived
//! from the sentence sequence on demand and never stored.

use serde::{Deserialize, Serialize};

/// One fetched page of a book, as returned by a page source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDocument {
    #[serde(default)]
    pub book_id: String,
    pub title: String,
    /// Always positive for a well-formed page source
    pub total_pages: u32,
    pub current_page: u32,
    pub has_previous: bool,
    pub has_next: bool,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub sentences: Vec<Sentence>,
}

impl BookDocument {
    /// Build a page, deriving the previous/next flags from the position
    pub fn new(
        book_id: impl Into<String>,
        title: impl Into<String>,
        total_pages: u32,
        current_page: u32,
        chapters: Vec<Chapter>,
        sentences: Vec<Sentence>,
    ) -> Self {
        Self {
            book_id: book_id.into(),
            title: title.into(),
            total_pages,
            current_page,
            has_previous: current_page > 0,
            has_next: current_page + 1 < total_pages,
            chapters,
            sentences,
        }
    }

    /// Page indices belonging to a chapter
    pub fn chapter_pages(&self, chapter_index: usize) -> Vec<u32> {
        chapter_page_range(self, chapter_index)
    }

    /// Paragraphs of this page
    pub fn paragraphs(&self) -> Vec<Paragraph> {
        group_by_paragraph(&self.sentences)
    }

    pub fn progress_fraction(&self) -> f64 {
        progress_fraction(self)
    }
}

/// Table of contents entry mapped onto the page sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub title: String,
    pub start_page: u32,
}

impl Chapter {
    pub fn new(title: impl Into<String>, start_page: u32) -> Self {
        Self {
            title: title.into(),
            start_page,
        }
    }
}

/// A sentence of the current page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    pub content: String,
    pub paragraph_number: u32,
}

impl Sentence {
    pub fn new(content: impl Into<String>, paragraph_number: u32) -> Self {
        Self {
            content: content.into(),
            paragraph_number,
        }
    }
}

/// A maximal run of consecutive sentences sharing a paragraph number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub paragraph_number: u32,
    pub sentences: Vec<Sentence>,
}

impl Paragraph {
    /// Rendered text: sentence contents joined by a single space
    pub fn text(&self) -> String {
        self.sentences
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Every page index of a chapter, in order.
///
/// The range runs from the chapter's start page up to one page before the
/// next chapter starts, or to the last page of the book for the final
/// chapter. An out-of-range chapter index yields no pages.
pub fn chapter_page_range(doc: &BookDocument, chapter_index: usize) -> Vec<u32> {
    let Some(chapter) = doc.chapters.get(chapter_index) else {
        return Vec::new();
    };

    let end = match doc.chapters.get(chapter_index + 1) {
        Some(next) => next.start_page.checked_sub(1),
        None => doc.total_pages.checked_sub(1),
    };

    match end {
        Some(end) => (chapter.start_page..=end).collect(),
        None => Vec::new(),
    }
}

/// Group a page's sentences into paragraphs in a single pass
pub fn group_by_paragraph(sentences: &[Sentence]) -> Vec<Paragraph> {
    let mut paragraphs: Vec<Paragraph> = Vec::new();

    for sentence in sentences {
        match paragraphs.last_mut() {
            Some(current) if current.paragraph_number == sentence.paragraph_number => {
                current.sentences.push(sentence.clone());
            }
            _ => paragraphs.push(Paragraph {
                paragraph_number: sentence.paragraph_number,
                sentences: vec![sentence.clone()],
            }),
        }
    }

    paragraphs
}

/// Reading progress through the book, in `(0, 1]`.
///
/// `total_pages == 0` violates the page source contract and is not guarded.
pub fn progress_fraction(doc: &BookDocument) -> f64 {
    (doc.current_page as f64 + 1.0) / doc.total_pages as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(total_pages: u32, chapters: Vec<Chapter>) -> BookDocument {
        BookDocument::new("book-1", "Test Book", total_pages, 0, chapters, vec![])
    }

    #[test]
    fn test_chapter_ranges() {
        let doc = book(3, vec![Chapter::new("A", 0), Chapter::new("B", 2)]);

        assert_eq!(chapter_page_range(&doc, 0), vec![0, 1]);
        assert_eq!(chapter_page_range(&doc, 1), vec![2]);
    }

    #[test]
    fn test_last_chapter_reaches_end() {
        let doc = book(10, vec![Chapter::new("A", 0), Chapter::new("B", 4), Chapter::new("C", 7)]);

        assert_eq!(chapter_page_range(&doc, 2), vec![7, 8, 9]);
        assert_eq!(chapter_page_range(&doc, 1).last(), Some(&6));
        assert_eq!(chapter_page_range(&doc, 0).last(), Some(&3));
    }

    #[test]
    fn test_single_page_chapter() {
        let doc = book(6, vec![Chapter::new("A", 2), Chapter::new("B", 3)]);
        assert_eq!(chapter_page_range(&doc, 0), vec![2]);
    }

    #[test]
    fn test_chapter_out_of_range() {
        let doc = book(3, vec![Chapter::new("A", 0)]);
        assert!(chapter_page_range(&doc, 1).is_empty());
        assert!(book(3, vec![]).chapter_pages(0).is_empty());
    }

    #[test]
    fn test_group_by_paragraph() {
        let sentences = vec![
            Sentence::new("Hi", 0),
            Sentence::new("there", 0),
            Sentence::new("Bye", 1),
        ];

        let paragraphs = group_by_paragraph(&sentences);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].text(), "Hi there");
        assert_eq!(paragraphs[1].text(), "Bye");
        assert_eq!(paragraphs[1].paragraph_number, 1);
    }

    #[test]
    fn test_group_empty_and_single() {
        assert!(group_by_paragraph(&[]).is_empty());

        let sentences = vec![
            Sentence::new("One.", 3),
            Sentence::new("Two.", 3),
            Sentence::new("Three.", 3),
        ];
        let paragraphs = group_by_paragraph(&sentences);
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].text(), "One. Two. Three.");
    }

    #[test]
    fn test_non_adjacent_numbers_split() {
        // Only consecutive runs are merged
        let sentences = vec![
            Sentence::new("a", 1),
            Sentence::new("b", 2),
            Sentence::new("c", 1),
        ];
        assert_eq!(group_by_paragraph(&sentences).len(), 3);
    }

    #[test]
    fn test_regroup_is_stable() {
        let sentences = vec![
            Sentence::new("a", 1),
            Sentence::new("b", 1),
            Sentence::new("c", 2),
            Sentence::new("d", 3),
            Sentence::new("e", 3),
        ];

        let grouped = group_by_paragraph(&sentences);
        let flattened: Vec<Sentence> = grouped
            .iter()
            .flat_map(|p| p.sentences.iter().cloned())
            .collect();

        assert_eq!(flattened, sentences);
        assert_eq!(group_by_paragraph(&flattened), grouped);
    }

    #[test]
    fn test_page_flags() {
        let first = BookDocument::new("b", "t", 5, 0, vec![], vec![]);
        assert!(!first.has_previous);
        assert!(first.has_next);

        let last = BookDocument::new("b", "t", 5, 4, vec![], vec![]);
        assert!(last.has_previous);
        assert!(!last.has_next);

        let only = BookDocument::new("b", "t", 1, 0, vec![], vec![]);
        assert!(!only.has_previous);
        assert!(!only.has_next);
    }

    #[test]
    fn test_progress_fraction() {
        let doc = BookDocument::new("b", "t", 4, 1, vec![], vec![]);
        assert!((doc.progress_fraction() - 0.5).abs() < f64::EPSILON);

        let last = BookDocument::new("b", "t", 4, 3, vec![], vec![]);
        assert!((last.progress_fraction() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wire_format() {
        let doc = BookDocument::new(
            "b",
            "t",
            2,
            1,
            vec![Chapter::new("I", 0)],
            vec![Sentence::new("x", 1)],
        );
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("totalPages"));
        assert!(json.contains("hasPrevious"));
        assert!(json.contains("startPage"));
        assert!(json.contains("paragraphNumber"));
    }
}
