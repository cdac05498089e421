use ulid::Ulid;

/// Generates a new record identifier.
///
/// ULIDs start with a 48-bit millisecond timestamp followed by 80 random
/// bits, so sled's byte-ordered trees list records in creation order.
pub fn time_sortable_uid() -> String {
    Ulid::new().to_string()
}

/// Short form of a record id for human-readable messages: the last eight
/// characters (the random part of a ULID).
pub fn short_id(id: &str) -> &str {
    let skip = id.chars().count().saturating_sub(8);
    match id.char_indices().nth(skip) {
        Some((offset, _)) => &id[offset..],
        None => id,
    }
}

/// Trims `value` and rejects it when nothing is left.
pub fn required_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
