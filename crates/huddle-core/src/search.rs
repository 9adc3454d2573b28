/// Match predicate for the search scan: case-insensitive substring against
/// the message body or the author's denormalized name. The caller passes the
/// query already lowercased; the corpus is walked in (channel insertion,
/// thread creation, message arrival) order and results are recomputed on
/// every call — nothing is cached or maintained incrementally.
pub fn matches(query_lower: &str, body: &str, author_name: &str) -> bool {
    body.to_lowercase().contains(query_lower) || author_name.to_lowercase().contains(query_lower)
}
