//! Bounded dereferencing of normalized client caches.
//!
//! Apollo and VTEX storefronts embed a flat table keyed by typed identifiers
//! (`"Product:tenis-runner"`, `"Brand:42"`). A field inside one entry may be
//! a small pointer object (`{"type":"id","id":"Brand:42"}` or
//! `{"__ref":"Brand:42"}`) that has to be looked up again in the same table.

use std::collections::HashSet;

use serde_json::{Map, Value};
use thiserror::Error;

/// Keys a pure pointer object may carry besides `id`.
const POINTER_KEYS: [&str; 5] = ["id", "type", "generated", "typename", "__typename"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ReferenceError {
    #[error("reference cycle through \"{0}\"")]
    Cycle(String),
    #[error("more than {0} hops")]
    HopLimit(usize),
    #[error("no entry for \"{0}\"")]
    Dangling(String),
}

impl ReferenceError {
    pub(crate) fn key(&self) -> Option<&str> {
        match self {
            ReferenceError::Cycle(key) | ReferenceError::Dangling(key) => Some(key),
            ReferenceError::HopLimit(_) => None,
        }
    }
}

/// The lookup tables a payload exposes for pointer resolution.
///
/// The payload root is always a table; nested Apollo caches
/// (`props.pageProps.__APOLLO_STATE__` in Next.js pages) are added as well.
pub(crate) struct ReferenceTable<'a> {
    maps: Vec<&'a Map<String, Value>>,
}

impl<'a> ReferenceTable<'a> {
    /// Keys under which frameworks nest a normalized cache.
    const NESTED_CACHE_KEYS: [&'static str; 3] =
        ["__APOLLO_STATE__", "apolloState", "initialApolloState"];

    pub(crate) fn from_payload(root: &'a Value) -> Self {
        let mut maps = Vec::new();
        if let Value::Object(map) = root {
            maps.push(map);
        }
        collect_nested_caches(root, &mut maps);
        Self { maps }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&'a Value> {
        self.maps.iter().find_map(|map| map.get(key))
    }

    /// Returns the key `value` points at, if it is a pointer object.
    ///
    /// Explicit pointers (`__ref`, or `"type": "id"`) always count, even when
    /// dangling. An object holding nothing but pointer keys counts only when
    /// its `id` is present in the table, so a literal `{"id": 7}` stays data.
    pub(crate) fn pointer_key<'v>(&self, value: &'v Value) -> Option<&'v str> {
        let Value::Object(map) = value else {
            return None;
        };
        if let Some(key) = map.get("__ref").and_then(Value::as_str) {
            return Some(key);
        }
        let id = map.get("id").and_then(Value::as_str)?;
        if map.get("type").and_then(Value::as_str) == Some("id") {
            return Some(id);
        }
        let pointer_only = map.keys().all(|k| POINTER_KEYS.contains(&k.as_str()));
        (pointer_only && self.get(id).is_some()).then_some(id)
    }

    /// Follows pointers starting at `value` until a non-pointer is reached.
    ///
    /// At most `max_hops` lookups are made; every key visited is tracked so a
    /// cycle is reported instead of looping.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] on a cycle, a dangling key, or when the
    /// chain is longer than `max_hops`.
    pub(crate) fn resolve<'v>(
        &self,
        value: &'v Value,
        max_hops: usize,
    ) -> Result<&'v Value, ReferenceError>
    where
        'a: 'v,
    {
        let mut current = value;
        let mut visited: HashSet<&str> = HashSet::new();
        let mut hops = 0usize;

        while let Some(key) = self.pointer_key(current) {
            if !visited.insert(key) {
                return Err(ReferenceError::Cycle(key.to_string()));
            }
            if hops == max_hops {
                return Err(ReferenceError::HopLimit(max_hops));
            }
            current = self
                .get(key)
                .ok_or_else(|| ReferenceError::Dangling(key.to_string()))?;
            hops += 1;
        }
        Ok(current)
    }
}

fn collect_nested_caches<'a>(value: &'a Value, out: &mut Vec<&'a Map<String, Value>>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if ReferenceTable::NESTED_CACHE_KEYS.contains(&key.as_str()) {
                    if let Value::Object(cache) = child {
                        out.push(cache);
                        continue;
                    }
                }
                collect_nested_caches(child, out);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_nested_caches(child, out);
            }
        }
        _ => {}
    }
}
