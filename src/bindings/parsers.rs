// SQL Anywhere accepts both `--` and `//` line comments.
pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    matches!(
        (bytes.get(idx), bytes.get(idx + 1)),
        (Some(b'-'), Some(b'-')) | (Some(b'/'), Some(b'/'))
    )
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// Returns the end (exclusive) of a `:name` placeholder starting at `idx`, if there is one.
///
/// `::` casts and identifiers glued to a preceding word are not placeholders.
pub(super) fn scan_named_placeholder(bytes: &[u8], idx: usize) -> Option<usize> {
    if bytes.get(idx) != Some(&b':') {
        return None;
    }
    if idx > 0 {
        let prev = bytes[idx - 1];
        if prev == b':' || prev.is_ascii_alphanumeric() || prev == b'_' {
            return None;
        }
    }
    let first = *bytes.get(idx + 1)?;
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }
    let mut end = idx + 2;
    while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
        end += 1;
    }
    Some(end)
}
