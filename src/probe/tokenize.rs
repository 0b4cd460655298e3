//! Tokenizer for fping result lines.

use super::ProbeError;

/// Characters that separate fields in an fping result line.
const DELIMITERS: [char; 7] = [' ', '\n', ':', '/', '%', '=', ','];

/// The fields of one fping result line, in order.
///
/// Tokenizing never fails; positional access is checked when the tokens
/// are consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens<'a> {
    fields: Vec<&'a str>,
}

impl<'a> Tokens<'a> {
    /// Get the token at `index`, or a `TokenOutOfRange` error.
    pub fn get(&self, index: usize) -> Result<&'a str, ProbeError> {
        self.fields
            .get(index)
            .copied()
            .ok_or(ProbeError::TokenOutOfRange {
                index,
                len: self.fields.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn as_slice(&self) -> &[&'a str] {
        &self.fields
    }
}

/// Split a raw result line on the delimiter set, dropping empty fields.
pub fn tokenize(line: &str) -> Tokens<'_> {
    Tokens {
        fields: line
            .split(|c: char| DELIMITERS.contains(&c))
            .filter(|field| !field.is_empty())
            .collect(),
    }
}
