//! Dot-delimited path utilities.
//!
//! A path like `author.posts.0.title` addresses a value through nested maps
//! and arrays.  Each segment indexes into a map (by key) or an array (by
//! decimal index).  A schema path may also contain the segment `$`, meaning
//! "every element of the array at this point"; [`expand`] turns such a
//! pattern into the concrete paths present in a particular value.
//!
//! None of these functions create intermediate structure.  Reading through a
//! missing segment yields `None`, and writing through one does nothing.

use crate::value::Value;

/// The path segment that stands for each element of an array.
pub const EACH: &str = "$";

/// Append `key` to `prefix`.
pub fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Split a path into its parent path (empty at top level) and last segment.
pub fn split_last(path: &str) -> (&str, &str) {
    match path.rfind('.') {
        Some(pos) => (&path[..pos], &path[pos + 1..]),
        None => ("", path),
    }
}

fn index<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Map(m) => m.get(segment),
        Value::Array(a) => segment.parse::<usize>().ok().and_then(|i| a.get(i)),
        _ => None,
    }
}

fn index_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Map(m) => m.get_mut(segment),
        Value::Array(a) => match segment.parse::<usize>() {
            Ok(i) => a.get_mut(i),
            Err(_) => None,
        },
        _ => None,
    }
}

/// Read the value at `path`.  The empty path addresses `root` itself.
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, index)
}

/// Mutably borrow the value at `path`.
pub fn get_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, index_mut)
}

/// Write `value` at `path`.
///
/// The parent of `path` must already exist.  A map parent gains (or
/// replaces) the key; an array parent only accepts an existing index.
/// Returns `false` if nothing was written.
pub fn set(root: &mut Value, path: &str, value: Value) -> bool {
    let (parent, last) = split_last(path);
    match get_mut(root, parent) {
        Some(Value::Map(m)) => {
            m.insert(last.to_string(), value);
            true
        }
        Some(Value::Array(a)) => match last.parse::<usize>().ok().and_then(|i| a.get_mut(i)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        },
        _ => false,
    }
}

/// Remove the value at `path`, returning it if it was present.
pub fn delete(root: &mut Value, path: &str) -> Option<Value> {
    let (parent, last) = split_last(path);
    match get_mut(root, parent)? {
        Value::Map(m) => m.remove(last),
        Value::Array(a) => {
            let i = last.parse::<usize>().ok()?;
            if i < a.len() {
                Some(a.remove(i))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Expand a pattern containing `$` segments into the concrete paths that
/// exist in `root`.
///
/// Each `$` is replaced by every index of the array found at that point; if
/// there's no array there, the pattern expands to nothing.  Other segments
/// are kept whether or not the value exists, so a missing field still gets
/// a concrete path (and will be validated as absent).
pub fn expand(pattern: &str, root: &Value) -> Vec<String> {
    let segments: Vec<&str> = pattern.split('.').collect();
    let mut paths = Vec::new();
    expand_into(Some(root), &segments, String::new(), &mut paths);
    paths
}

fn expand_into(value: Option<&Value>, segments: &[&str], prefix: String, paths: &mut Vec<String>) {
    match segments.split_first() {
        None => paths.push(prefix),
        Some((&EACH, rest)) => {
            if let Some(Value::Array(elements)) = value {
                for (i, element) in elements.iter().enumerate() {
                    let concrete = join(&prefix, &i.to_string());
                    expand_into(Some(element), rest, concrete, paths);
                }
            }
        }
        Some((segment, rest)) => {
            let child = value.and_then(|v| index(v, segment));
            expand_into(child, rest, join(&prefix, segment), paths);
        }
    }
}
