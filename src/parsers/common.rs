use std::collections::HashSet;
use std::ops::Range;

/// Comment syntax of the language being masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `//` and `/* */`, with `'`, `"` and backtick strings (C#, Java, JS, TS).
    CLike,
    /// `#` comments with single- and triple-quoted strings (Python).
    Hash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Str(u8),
    Verbatim,
    Triple(u8),
}

/// Blank out comments while keeping byte offsets and newlines intact, so every
/// match offset against the masked text is valid against the original.
pub fn mask_comments(source: &str, style: CommentStyle) -> String {
    mask(source, style, false)
}

/// Like [`mask_comments`] but string literal contents are blanked as well. Quote
/// characters survive so `""` still reads as an (empty) string.
pub fn mask_comments_and_strings(source: &str, style: CommentStyle) -> String {
    mask(source, style, true)
}

fn mask(source: &str, style: CommentStyle, mask_strings: bool) -> String {
    let bytes = source.as_bytes();
    let mut out = bytes.to_vec();
    let mut state = State::Code;
    let mut i = 0;

    let blank = |out: &mut Vec<u8>, at: usize| {
        if out[at] != b'\n' {
            out[at] = b' ';
        }
    };

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        match state {
            State::Code => match (style, b) {
                (CommentStyle::CLike, b'/') if next == Some(b'/') => {
                    state = State::LineComment;
                    blank(&mut out, i);
                }
                (CommentStyle::CLike, b'/') if next == Some(b'*') => {
                    state = State::BlockComment;
                    blank(&mut out, i);
                    blank(&mut out, i + 1);
                    i += 1;
                }
                (CommentStyle::CLike, b'@') if next == Some(b'"') => {
                    state = State::Verbatim;
                    i += 1;
                }
                (CommentStyle::CLike, b'"' | b'\'' | b'`') => state = State::Str(b),
                (CommentStyle::Hash, b'#') => {
                    state = State::LineComment;
                    blank(&mut out, i);
                }
                (CommentStyle::Hash, b'"' | b'\'') => {
                    if next == Some(b) && bytes.get(i + 2) == Some(&b) {
                        state = State::Triple(b);
                        i += 2;
                    } else {
                        state = State::Str(b);
                    }
                }
                _ => {}
            },
            State::LineComment => {
                if b == b'\n' {
                    state = State::Code;
                } else {
                    blank(&mut out, i);
                }
            }
            State::BlockComment => {
                blank(&mut out, i);
                if b == b'*' && next == Some(b'/') {
                    blank(&mut out, i + 1);
                    i += 1;
                    state = State::Code;
                }
            }
            State::Str(quote) => {
                if b == b'\\' {
                    if mask_strings {
                        blank(&mut out, i);
                        if i + 1 < bytes.len() {
                            blank(&mut out, i + 1);
                        }
                    }
                    i += 1;
                } else if b == quote {
                    state = State::Code;
                } else if b == b'\n' && quote != b'`' {
                    // unterminated literal; resync at end of line
                    state = State::Code;
                } else if mask_strings {
                    blank(&mut out, i);
                }
            }
            State::Verbatim => {
                if b == b'"' && next == Some(b'"') {
                    if mask_strings {
                        blank(&mut out, i);
                        blank(&mut out, i + 1);
                    }
                    i += 1;
                } else if b == b'"' {
                    state = State::Code;
                } else if mask_strings {
                    blank(&mut out, i);
                }
            }
            State::Triple(quote) => {
                if b == quote && next == Some(quote) && bytes.get(i + 2) == Some(&quote) {
                    i += 2;
                    state = State::Code;
                } else {
                    // docstrings never hold live statements
                    blank(&mut out, i);
                }
            }
        }
        i += 1;
    }

    String::from_utf8(out).unwrap_or_else(|_| source.to_string())
}

/// Range of `text` from the bracket at `open` through its matching close, or
/// to the end of `text` when it is never closed.
pub fn balanced_block(text: &str, open: usize) -> Range<usize> {
    let bytes = text.as_bytes();
    let (opening, closing) = match bytes.get(open) {
        Some(b'[') => (b'[', b']'),
        Some(b'(') => (b'(', b')'),
        _ => (b'{', b'}'),
    };
    let mut depth = 0usize;
    for (idx, &b) in bytes.iter().enumerate().skip(open) {
        if b == opening {
            depth += 1;
        } else if b == closing {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return open..idx + 1;
            }
        }
    }
    open.min(text.len())..text.len()
}

/// Byte offset → 1-based line number lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(idx, _)| idx + 1));
        Self { starts }
    }

    pub fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }
}

/// Drop repeated entries, keeping the first occurrence of each.
pub fn dedupe(items: &mut Vec<String>) {
    let mut seen = HashSet::with_capacity(items.len());
    items.retain(|item| seen.insert(item.clone()));
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Names published by an `export { a, b as c, type D }` list. The public
/// (aliased) name wins over the local one.
pub fn split_export_list(list: &str) -> Vec<String> {
    list.split(',')
        .filter_map(|item| {
            let item = item.trim();
            let item = item.strip_prefix("type ").map(str::trim).unwrap_or(item);
            let name = match item.split_once(" as ") {
                Some((_, alias)) => alias.trim(),
                None => item,
            };
            is_identifier(name).then(|| name.to_string())
        })
        .collect()
}
