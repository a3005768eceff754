//! Title and person slugs.
//!
//! Slugs are derived from the catalog's current title, so the same function
//! both builds canonical URLs and decides whether an incoming slug is stale.

/// Encodes a human-readable title into a URL-safe slug.
///
/// Lowercases the input, collapses every run of characters outside
/// `[a-z0-9]` into a single hyphen and strips leading/trailing hyphens.
/// Non-ASCII letters are not transliterated: `"Amélie"` becomes `"am-lie"`.
pub fn encode(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Builds the `{id}-{slug}` path segment used for person pages.
///
/// A name with nothing encodable still yields `"{id}-"`, which decodes back
/// to the same id.
pub fn encode_person_slug(id: u64, name: &str) -> String {
    format!("{}-{}", id, encode(name))
}

/// Extracts the numeric person id from an `{id}-{slug}` path segment.
///
/// Returns `None` when the leading segment is not a plain decimal integer;
/// callers answer that with a not-found response.
pub fn decode_person_id(slug: &str) -> Option<u64> {
    let leading = slug.split_once('-').map_or(slug, |(id, _)| id);
    if leading.is_empty() || !leading.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    leading.parse().ok()
}

/// `/{kind}/{id}/{slug}`, or `/{kind}/{id}` when the title has no slug
fn title_path(kind: &str, id: u64, title: &str) -> String {
    let slug = encode(title);
    if slug.is_empty() {
        format!("/{}/{}", kind, id)
    } else {
        format!("/{}/{}/{}", kind, id, slug)
    }
}

/// Canonical path of a movie page.
pub fn movie_path(id: u64, title: &str) -> String {
    title_path("movie", id, title)
}

/// Canonical path of a TV show page.
pub fn tv_path(id: u64, name: &str) -> String {
    title_path("tv", id, name)
}

/// Canonical path of a person page.
pub fn person_path(id: u64, name: &str) -> String {
    format!("/person/{}", encode_person_slug(id, name))
}
