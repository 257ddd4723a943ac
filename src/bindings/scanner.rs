use super::parsers::{
    is_block_comment_end, is_block_comment_start, is_line_comment_start, scan_named_placeholder,
};

#[derive(Clone, Copy)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Bracketed,
    LineComment,
    BlockComment(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PlaceholderKind<'a> {
    Positional,
    Named(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct PlaceholderSpan<'a> {
    pub(super) start: usize,
    pub(super) end: usize,
    pub(super) kind: PlaceholderKind<'a>,
}

/// Locate `?` and `:name` placeholders outside literals, quoted identifiers and comments.
pub(super) fn scan_placeholders(sql: &str) -> Vec<PlaceholderSpan<'_>> {
    let bytes = sql.as_bytes();
    let mut spans = Vec::new();
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'[' => state = State::Bracketed,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'?' => spans.push(PlaceholderSpan {
                    start: idx,
                    end: idx + 1,
                    kind: PlaceholderKind::Positional,
                }),
                b':' => {
                    if let Some(end) = scan_named_placeholder(bytes, idx) {
                        spans.push(PlaceholderSpan {
                            start: idx,
                            end,
                            kind: PlaceholderKind::Named(&sql[idx + 1..end]),
                        });
                        idx = end - 1;
                    } else if bytes.get(idx + 1) == Some(&b':') {
                        idx += 1; // skip `::` cast
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::Bracketed => {
                if b == b']' {
                    state = State::Normal;
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
        }
        idx += 1;
    }

    spans
}
