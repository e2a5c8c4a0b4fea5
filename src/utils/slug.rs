/// Derive a store slug from an entity name.
///
/// Lower-cased strict-ASCII: alphanumeric ASCII characters are kept,
/// every other run of characters collapses to a single `-`, with no
/// leading or trailing separator.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}
