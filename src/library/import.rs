//! Plain-text book import
//!
//! Converts a Project Gutenberg style text file into a stored book:
//! license header/footer stripped, `CONTENTS` block turned into table of
//! contents entries, body split into paragraphs and sentences.

use regex::Regex;

use super::types::{StoredBook, StoredSentence, TocEntry};
use super::LibraryError;

const START_MARKER: &str = r"(?i)\*\*\* START OF THE PROJECT GUTENBERG EBOOK .*? \*\*\*";
const END_MARKER: &str = r"(?i)\*\*\* END OF THE PROJECT GUTENBERG EBOOK .*? \*\*\*";
const CONTENTS_HEADING: &str = "CONTENTS";

/// Blank lines in a row that close the contents block
const TOC_END_BLANK_LINES: usize = 3;

struct TocPatterns {
    dots: Regex,
    roman: Regex,
    chapter: Regex,
    number: Regex,
    non_key: Regex,
}

impl TocPatterns {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            dots: Regex::new(r"^[.\s]+$")?,
            roman: Regex::new(r"^\s*([IVXLCDM]+)\.?[—\-–](.+)$")?,
            chapter: Regex::new(r"(?i)^\s*(CHAPTER\s+[IVXLCDM0-9]+)[.\s—\-–]*(.*)$")?,
            number: Regex::new(r"^\s*(\d+)\.\s*(.+)$")?,
            non_key: Regex::new(r"[^a-zA-Z0-9\s]")?,
        })
    }

    fn key(&self, text: &str) -> String {
        self.non_key.replace_all(text, "").trim().to_uppercase()
    }

    /// Turn one contents line into an entry
    fn entry(&self, line: &str) -> Option<TocEntry> {
        let (title, key) = if let Some(caps) = self.roman.captures(line) {
            let chapter_title = caps[2].trim();
            (format!("{}. {}", &caps[1], chapter_title), self.key(chapter_title))
        } else if let Some(caps) = self.chapter.captures(line) {
            let number = caps[1].trim();
            let chapter_title = caps[2].trim();
            let title = if chapter_title.is_empty() {
                number.to_string()
            } else {
                format!("{} - {}", number, chapter_title)
            };
            (title, self.key(&format!("{} {}", number, chapter_title)))
        } else if let Some(caps) = self.number.captures(line) {
            let chapter_title = caps[2].trim();
            (format!("{}. {}", &caps[1], chapter_title), self.key(chapter_title))
        } else if let Some(dot) = line.find('.').filter(|&i| i > 0) {
            (line[..dot].trim().to_string(), self.key(&line[dot + 1..]))
        } else {
            (line.to_string(), self.key(line))
        };

        (!key.is_empty()).then_some(TocEntry {
            title,
            chapter_key: key,
        })
    }
}

/// Convert raw book text into a stored book
pub fn parse_text(text: &str, title: &str) -> Result<StoredBook, LibraryError> {
    let core = extract_core(text)?;
    let patterns = TocPatterns::new().map_err(|e| LibraryError::Parse(e.to_string()))?;

    let (table_of_content, body) = match core.find(CONTENTS_HEADING) {
        Some(at) => {
            let after = &core[at + CONTENTS_HEADING.len()..];
            let toc_len = toc_block_len(after);
            let entries = after[..toc_len]
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !patterns.dots.is_match(l))
                .filter_map(|l| patterns.entry(l))
                .collect();
            let body = format!("{}\n\n{}", core[..at].trim(), after[toc_len..].trim());
            (entries, body)
        }
        None => {
            tracing::debug!("No contents block found in '{}'", title);
            (Vec::new(), core.to_string())
        }
    };

    Ok(StoredBook {
        title: title.to_string(),
        table_of_content,
        sentences: split_body(&body),
    })
}

/// Text between the license markers, or the whole text without them
fn extract_core(text: &str) -> Result<&str, LibraryError> {
    let start = Regex::new(START_MARKER).map_err(|e| LibraryError::Parse(e.to_string()))?;
    let end = Regex::new(END_MARKER).map_err(|e| LibraryError::Parse(e.to_string()))?;

    let from = start.find(text).map(|m| m.end()).unwrap_or(0);
    let to = end.find(text).map(|m| m.start()).unwrap_or(text.len());

    if from < to {
        Ok(text[from..to].trim())
    } else {
        Ok(text)
    }
}

/// Byte length of the contents block that follows the heading
fn toc_block_len(after: &str) -> usize {
    let mut blank_run = 0;
    let mut seen_entry = false;
    let mut consumed = 0;

    for line in after.split_inclusive('\n') {
        consumed += line.len();

        if line.trim().is_empty() {
            blank_run += 1;
        } else {
            blank_run = 0;
            seen_entry = true;
        }

        if seen_entry && blank_run >= TOC_END_BLANK_LINES {
            break;
        }
    }

    consumed
}

fn split_body(body: &str) -> Vec<StoredSentence> {
    let mut sentences = Vec::new();
    let mut paragraph_number = 1;

    for paragraph in split_paragraphs(body) {
        let mut sentence_number = 0;
        for sentence in split_sentences(&paragraph) {
            sentence_number += 1;
            sentences.push(StoredSentence {
                sentence_number,
                paragraph_number,
                content: sentence,
                paragraph_start: sentence_number == 1,
            });
        }
        paragraph_number += 1;
    }

    sentences
}

/// Paragraphs are separated by blank lines; line breaks inside become spaces
fn split_paragraphs(body: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    paragraphs
}

/// Split after `.`, `!` or `?` followed by whitespace
fn split_sentences(paragraph: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;

    for (i, c) in paragraph.char_indices() {
        if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            let end = i + c.len_utf8();
            let sentence = paragraph[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = end;
        }
        prev = Some(c);
    }

    let rest = paragraph[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }

    sentences
}
