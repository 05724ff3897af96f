//! Byte-level normalization of part and master codes.
//!
//! Codes are ASCII. Folding maps `a-z` to `A-Z` and leaves every other byte
//! alone; nothing here allocates except [`fold`] and [`strip_hyphens`].

/// Shortest code that can ever match.
pub const MIN_LEN: usize = 3;

/// Exclusive upper bound on code length. Suffix buckets cover `MIN_LEN..MAX_LEN`.
pub const MAX_LEN: usize = 50;

pub const HYPHEN: u8 = b'-';
pub const SPACE: u8 = b' ';

#[inline]
pub fn fold_byte(b: u8) -> u8 {
    if b.wrapping_sub(b'a') <= 25 {
        b & 0x5F
    } else {
        b
    }
}

/// Case-fold `src` into the front of `dst` and return the folded slice.
///
/// Panics if `dst` is shorter than `src`; callers size scratch buffers to
/// `MAX_LEN` and reject longer codes first.
pub fn fold_into<'b>(src: &[u8], dst: &'b mut [u8]) -> &'b [u8] {
    let out = &mut dst[..src.len()];
    for (d, &s) in out.iter_mut().zip(src) {
        *d = fold_byte(s);
    }
    out
}

pub fn fold(src: &[u8]) -> Box<[u8]> {
    src.iter().map(|&b| fold_byte(b)).collect()
}

pub fn contains_hyphen(code: &[u8]) -> bool {
    code.contains(&HYPHEN)
}

/// The code with every hyphen removed, or `None` when it has no hyphen.
pub fn strip_hyphens(code: &[u8]) -> Option<Box<[u8]>> {
    if !contains_hyphen(code) {
        return None;
    }
    Some(code.iter().copied().filter(|&b| b != HYPHEN).collect())
}

/// Trim leading and trailing space bytes. Tabs and other whitespace are kept.
pub fn trim_spaces(record: &[u8]) -> &[u8] {
    let start = record.iter().position(|&b| b != SPACE).unwrap_or(record.len());
    let end = record.iter().rposition(|&b| b != SPACE).map_or(start, |i| i + 1);
    &record[start..end]
}
