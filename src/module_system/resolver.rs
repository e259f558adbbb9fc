// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Module id resolution.
//!
//! Resolution is purely lexical: it maps a `(requesting id, requested id)`
//! pair to a canonical module id without consulting the source store, so that
//! identical require graphs always produce identical ids on every node.
//! Whether the canonical id actually exists is decided later, when the store
//! is asked for its source.

/// Namespace that non-relative requests resolve under
pub const LIB_NAMESPACE: &str = "jslib";

/// Check whether a requested id carries a relative-path marker: zero to four
/// leading dots followed by `/`.
///
/// Anything else is a library request and resolves under
/// [`LIB_NAMESPACE`] regardless of the requester's directory.
pub fn is_relative(requested_id: &str) -> bool {
    let dots = requested_id.bytes().take_while(|b| *b == b'.').count();
    dots <= 4 && requested_id.as_bytes().get(dots) == Some(&b'/')
}

/// Resolve a requested id against the requesting module's id, producing the
/// canonical id used as the registry cache key.
///
/// Relative requests start from the requesting module's directory (its id
/// with the last segment removed) and are normalized segment by segment:
/// empty segments and `.` are skipped, `..` pops the last accumulated segment
/// when one exists (and is a no-op otherwise), anything else is pushed.
/// Library requests discard the requester's directory entirely.
pub fn resolve(requesting_id: &str, requested_id: &str) -> String {
    let relative = is_relative(requested_id);

    let requested = if relative {
        requested_id.to_owned()
    } else {
        format!("{}/{}", LIB_NAMESPACE, requested_id)
    };

    let mut segments: Vec<&str> = if relative {
        let mut dir: Vec<&str> = requesting_id.split('/').collect();
        dir.pop();
        dir
    } else {
        Vec::new()
    };

    for part in requested.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    // A requester id with a leading slash leaves an empty segment behind.
    if segments.first().is_some_and(|s| s.is_empty()) {
        segments.remove(0);
    }

    let canonical = segments.join("/");
    tracing::trace!(
        requesting = requesting_id,
        requested = requested_id,
        canonical = canonical.as_str(),
        "resolved module id"
    );
    canonical
}
