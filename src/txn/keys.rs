use serde_json::{Map, Value};

/// Converts an identifier to camelCase (`source_account` -> `sourceAccount`).
///
/// Words are split on any non-alphanumeric character, on lower-to-upper case
/// transitions and before the last capital of an acronym run (`XMLHttp` ->
/// `xmlHttp`), so already camelCased keys come back unchanged.
pub fn camel_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    let mut out = String::with_capacity(key.len());
    for (i, word) in words.iter().enumerate() {
        let lower = word.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Prepares an operation record for display.
///
/// Adds `time` as a copy of `created_at` and camelCases every top-level key.
/// When two keys map to the same name, the one already in camelCase wins.
/// Nested objects are left as they are; records that are not objects pass
/// through unchanged.
pub fn normalize_operation(record: Value) -> Value {
    let Value::Object(fields) = record else {
        return record;
    };

    let created_at = fields.get("created_at").cloned();
    let (renamed, kept): (Vec<_>, Vec<_>) = fields
        .into_iter()
        .map(|(key, value)| (camel_case(&key), key, value))
        .partition(|(camel, key, _)| camel != key);

    let mut normalized: Map<String, Value> = kept.into_iter().map(|(key, _, value)| (key, value)).collect();
    for (camel, _, value) in renamed {
        normalized.entry(camel).or_insert(value);
    }
    normalized.insert("time".to_string(), created_at.unwrap_or(Value::Null));
    Value::Object(normalized)
}
