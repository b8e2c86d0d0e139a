//! Text chunking
//!
//! Splits raw text into display-ready word chunks, each with one emphasized
//! character that serves as the reader's fixation point. Chunking is pure: the
//! same text, highlight position and emphasis always yield the same sequence.

use serde::{Deserialize, Serialize};

/// Which character of a word receives emphasis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum HighlightPosition {
    /// First character
    #[default]
    First,
    /// Character at `len / 2`, with a centering space before it on even lengths
    Middle,
    /// No emphasis; the word is rendered unmodified
    Plain,
}

impl HighlightPosition {
    /// Parse a highlight mode name
    ///
    /// Unknown names map to [`HighlightPosition::Plain`] rather than failing.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "first" => HighlightPosition::First,
            "middle" => HighlightPosition::Middle,
            _ => HighlightPosition::Plain,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightPosition::First => "first",
            HighlightPosition::Middle => "middle",
            HighlightPosition::Plain => "plain",
        }
    }
}

impl From<String> for HighlightPosition {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<&str> for HighlightPosition {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl std::fmt::Display for HighlightPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering strategy for the emphasized character
pub trait Emphasis: Send + Sync {
    /// Append the emphasized form of `ch` to `out`
    fn emphasize(&self, ch: char, out: &mut String);
}

/// Wraps the emphasized character in a bold inline element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEmphasis {
    tag: String,
}

impl TagEmphasis {
    pub const DEFAULT_TAG: &'static str = "span";

    /// Create an emphasis using element `tag`
    ///
    /// Anything other than ASCII alphanumerics is dropped from the name; an
    /// empty result falls back to `span`.
    pub fn new(tag: &str) -> Self {
        let tag: String = tag.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        if tag.is_empty() {
            return Self::default();
        }
        Self { tag }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl Default for TagEmphasis {
    fn default() -> Self {
        Self {
            tag: Self::DEFAULT_TAG.to_string(),
        }
    }
}

impl Emphasis for TagEmphasis {
    fn emphasize(&self, ch: char, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        out.push_str(" style=\"font-weight: bold;\">");
        push_escaped_char(ch, out);
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// One rendered word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordChunk {
    markup: String,
    word: String,
    emphasized: Option<usize>,
}

impl WordChunk {
    /// Renderable markup, already escaped
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Source word the chunk was rendered from
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Char index of the emphasized character, `None` in plain mode
    pub fn emphasized_index(&self) -> Option<usize> {
        self.emphasized
    }
}

/// Ordered, immutable list of chunks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkSequence {
    chunks: Vec<WordChunk>,
}

impl ChunkSequence {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&WordChunk> {
        self.chunks.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WordChunk> {
        self.chunks.iter()
    }
}

impl<'a> IntoIterator for &'a ChunkSequence {
    type Item = &'a WordChunk;
    type IntoIter = std::slice::Iter<'a, WordChunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}

/// Word separator: Unicode `White_Space` less U+0085 (NEL), plus U+FEFF (BOM)
pub fn is_separator(ch: char) -> bool {
    (ch.is_whitespace() && ch != '\u{85}') || ch == '\u{FEFF}'
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_separator).filter(|word| !word.is_empty())
}

/// Split `text` on separator runs and render every word
///
/// Blank text yields an empty sequence.
pub fn chunk(text: &str, position: HighlightPosition, emphasis: &dyn Emphasis) -> ChunkSequence {
    let chunks = words(text)
        .map(|word| render_word(word, position, emphasis))
        .collect();

    ChunkSequence { chunks }
}

/// Number of non-empty separator-delimited tokens in `text`
pub fn word_count(text: &str) -> usize {
    words(text).count()
}

/// Render a single word
pub fn render_word(word: &str, position: HighlightPosition, emphasis: &dyn Emphasis) -> WordChunk {
    let chars: Vec<char> = word.chars().collect();
    let mut markup = String::with_capacity(word.len() + 48);

    let emphasized = match position {
        HighlightPosition::First => Some(0),
        HighlightPosition::Middle => Some(chars.len() / 2),
        HighlightPosition::Plain => None,
    }
    .filter(|&index| index < chars.len());

    match emphasized {
        Some(index) => {
            chars[..index].iter().for_each(|&c| push_escaped_char(c, &mut markup));
            // Even lengths have two middle candidates; the space recenters the glyph
            if position == HighlightPosition::Middle && chars.len() % 2 == 0 {
                markup.push(' ');
            }
            emphasis.emphasize(chars[index], &mut markup);
            chars[index + 1..].iter().for_each(|&c| push_escaped_char(c, &mut markup));
        }
        None => chars.iter().for_each(|&c| push_escaped_char(c, &mut markup)),
    }

    WordChunk {
        markup,
        word: word.to_string(),
        emphasized,
    }
}

fn push_escaped_char(ch: char, out: &mut String) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(ch),
    }
}
