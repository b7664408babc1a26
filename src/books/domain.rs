pub mod model;

// Shortest normalized ISBN accepted for a catalog entry.
pub const MIN_ISBN_LEN: usize = 4;

// normalize_isbn maps raw ISBN text to the catalog key: the ASCII digits in
// order, followed by an `X` check character when the trimmed text ends in x/X.
pub fn normalize_isbn(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut key: String = trimmed.chars().filter(|ch| ch.is_ascii_digit()).collect();
    if trimmed.ends_with(['x', 'X']) {
        key.push('X');
    }
    key
}

// is_isbn_shape accepts digits and x/X once whitespace and hyphens are removed.
pub fn is_isbn_shape(raw: &str) -> bool {
    let compact: Vec<char> = raw.chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '-')
        .collect();
    !compact.is_empty() && compact.iter().all(|ch| ch.is_ascii_digit() || *ch == 'x' || *ch == 'X')
}
