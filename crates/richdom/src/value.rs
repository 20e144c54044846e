//! Rich-text value model.
//!
//! A value is an immutable snapshot of formatted text: a flat character
//! buffer, a per-character stack of inline formats, a sparse map of embedded
//! replacements keyed by sentinel offsets, and an optional selection range.
//!
//! Invariants (caller contract, not runtime errors):
//! - `formats.len()` equals the character count of `text`.
//! - Every `OBJECT_REPLACEMENT_CHARACTER` offset has a `replacements` entry.
//! - No other offset has a `replacements` entry.
//! - `start`/`end` are character offsets within `0..=text.chars().count()`.

use memchr::memmem;
use std::collections::BTreeMap;
use std::ops::Range;

/// Sentinel standing in for an atomic embedded object (image, embed, ...).
pub const OBJECT_REPLACEMENT_CHARACTER: char = '\u{FFFC}';

/// Sentinel separating paragraphs when a multiline tag is configured.
pub const LINE_SEPARATOR: char = '\u{2028}';

/// A named inline formatting instruction with ordered attributes.
///
/// Position 0 in a character's format stack is the outermost element.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormatDescriptor {
    pub tag: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: Vec<(String, String)>,
}

impl FormatDescriptor {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }
}

/// Nested content carried by a replacement.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReplacementContent {
    Text(String),
    Element(ReplacementDescriptor),
}

/// An atomic embedded element substituting for a single sentinel character.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplacementDescriptor {
    pub tag: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: Vec<(String, String)>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<ReplacementContent>,
}

impl ReplacementDescriptor {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: ReplacementContent) -> Self {
        self.children.push(child);
        self
    }
}

/// Immutable snapshot of formatted text with embedded replacements and an
/// optional selection range. Offsets are character offsets, not bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RichTextValue {
    pub text: String,
    pub formats: Vec<Vec<FormatDescriptor>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub replacements: BTreeMap<usize, ReplacementDescriptor>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub start: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub end: Option<usize>,
}

impl RichTextValue {
    /// A value over plain unformatted text with no selection.
    pub fn from_plain(text: impl Into<String>) -> Self {
        let text = text.into();
        let formats = vec![Vec::new(); text.chars().count()];
        Self {
            text,
            formats,
            replacements: BTreeMap::new(),
            start: None,
            end: None,
        }
    }

    pub fn with_selection(mut self, start: usize, end: usize) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Push `format` onto the stack of every character in `range` (it becomes
    /// the innermost format over that span).
    pub fn apply_format(&mut self, range: Range<usize>, format: FormatDescriptor) {
        for entry in &mut self.formats[range] {
            entry.push(format.clone());
        }
    }

    /// Splice a replacement sentinel at character offset `at`.
    pub fn insert_replacement(&mut self, at: usize, replacement: ReplacementDescriptor) {
        let byte = byte_offset(&self.text, at);
        self.text.insert(byte, OBJECT_REPLACEMENT_CHARACTER);
        self.formats.insert(at, Vec::new());
        let shifted = self.replacements.split_off(&at);
        for (offset, descriptor) in shifted {
            self.replacements.insert(offset + 1, descriptor);
        }
        self.replacements.insert(at, replacement);
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Fast presence check for the replacement sentinel.
    pub fn has_replacements(&self) -> bool {
        memmem::find(self.text.as_bytes(), SENTINEL_BYTES).is_some()
    }

    /// Fast presence check for the paragraph separator.
    pub fn has_line_separators(&self) -> bool {
        memmem::find(self.text.as_bytes(), LINE_SEPARATOR_BYTES).is_some()
    }

    /// Contract check for the invariants listed in the module docs. Intended
    /// for `debug_assert!` at API boundaries.
    pub fn is_well_formed(&self) -> bool {
        if self.formats.len() != self.text.chars().count() {
            return false;
        }
        for (offset, ch) in self.text.chars().enumerate() {
            if (ch == OBJECT_REPLACEMENT_CHARACTER) != self.replacements.contains_key(&offset) {
                return false;
            }
        }
        let len = self.formats.len();
        self.start.is_none_or(|start| start <= len) && self.end.is_none_or(|end| end <= len)
    }
}

const SENTINEL_BYTES: &[u8] = "\u{FFFC}".as_bytes();
const LINE_SEPARATOR_BYTES: &[u8] = "\u{2028}".as_bytes();

fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}
