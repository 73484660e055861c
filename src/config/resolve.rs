//! Placeholder expansion for configuration values.
//!
//! Scalar values may embed `${section.key}` expressions. Each expression is
//! substituted independently, and only when the referenced value resolves to
//! a non-empty scalar; anything else leaves the token in place so that
//! partially-written configuration stays readable instead of failing.
//!
//! Three reserved tokens are bound to store directories rather than sections:
//! `${baseDir}`, `${userDir}` and `${configDir}`.

use super::store::ConfigStore;
use super::value::Value;

pub(crate) const BASE_DIR_TOKEN: &str = "${baseDir}";
pub(crate) const USER_DIR_TOKEN: &str = "${userDir}";
pub(crate) const CONFIG_DIR_TOKEN: &str = "${configDir}";

/// Expands every placeholder in `raw` against `store`.
///
/// Idempotent on inputs without remaining placeholders.
pub(crate) fn resolve(raw: &str, store: &ConfigStore) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find("${") {
        let (head, tail) = rest.split_at(pos);
        out.push_str(head);
        let body = &tail[2..];

        // The path grammar is word characters and dots only; anything else
        // means the token is not a placeholder and is copied through.
        let end = body
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
            .unwrap_or(body.len());
        if end > 0 && body[end..].starts_with('}') {
            let path = &body[..end];
            match lookup_scalar(path, store) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push_str("${");
                    out.push_str(path);
                    out.push('}');
                }
            }
            rest = &body[end + 1..];
        } else {
            out.push_str("${");
            rest = body;
        }
    }
    out.push_str(rest);

    out.replace(BASE_DIR_TOKEN, &store.base_dir())
        .replace(USER_DIR_TOKEN, &store.user_dir())
        .replace(CONFIG_DIR_TOKEN, &store.config_dir())
}

/// Traverses a dotted path: the first segment names a section, the remaining
/// segments walk nested maps. Traversal stops early at the last reachable
/// value; the result is returned only when it is a non-empty scalar.
fn lookup_scalar(path: &str, store: &ConfigStore) -> Option<String> {
    let mut segments = path.split('.');
    let section = segments.next()?;
    let mut current = store.all_values().get(section)?;

    for segment in segments {
        match current {
            Value::Map(entries) => match entries.get(segment) {
                Some(value) => current = value,
                None => break,
            },
            _ => break,
        }
    }

    match current {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
