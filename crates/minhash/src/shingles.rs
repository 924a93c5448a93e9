//! Character shingling and the base shingle hash.
//!
//! Text is lowercased, stripped of everything that is not a word character or
//! a plain space, and cut into overlapping windows of [`SHINGLE_SIZE`]
//! characters. Each window is encoded as its characters joined with `_`
//! (`"app"` becomes `b"a_p_p"`) before hashing.

use unicode_general_category::{get_general_category, GeneralCategory};

/// Characters per shingle.
pub const SHINGLE_SIZE: usize = 3;

/// CRC-32 (zlib/gzip polynomial) of a shingle's bytes.
///
/// Signatures are only portable when every implementation agrees on this
/// value bit for bit.
#[inline]
pub fn base_hash(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}

/// Lowercase and drop every character that is not a word character or a
/// space.
///
/// Lowercasing applies to the whole string so a word-final `Σ` becomes `ς`.
/// Word characters are letters (`L*`), numbers (`N*`) and `_`; combining marks
/// are dropped even when they are alphabetic.
pub fn clean_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|&c| c == ' ' || is_word_char(c))
        .collect()
}

#[inline]
fn is_word_char(c: char) -> bool {
    use GeneralCategory::*;

    c == '_'
        || matches!(
            get_general_category(c),
            UppercaseLetter
                | LowercaseLetter
                | TitlecaseLetter
                | ModifierLetter
                | OtherLetter
                | DecimalNumber
                | LetterNumber
                | OtherNumber
        )
}

/// Encoded character shingles of `text`, in order of appearance.
///
/// Duplicates are kept; they cannot change a running minimum. Text with fewer
/// than [`SHINGLE_SIZE`] characters after cleaning yields nothing.
pub fn shingles(text: &str) -> Vec<Vec<u8>> {
    let chars: Vec<char> = clean_text(text).chars().collect();
    if chars.len() < SHINGLE_SIZE {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(chars.len() - SHINGLE_SIZE + 1);
    let mut buf = [0u8; 4];
    for window in chars.windows(SHINGLE_SIZE) {
        let mut shingle = Vec::with_capacity(SHINGLE_SIZE * 2);
        for (i, c) in window.iter().enumerate() {
            if i > 0 {
                shingle.push(b'_');
            }
            shingle.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
        out.push(shingle);
    }
    out
}
