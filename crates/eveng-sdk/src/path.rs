// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Resource locator resolution.
//!
//! Callers name labs and folders with slash-separated locators such as
//! `/team/ospf.unl` or `/team/`. A locator is ambiguous: it may point at a
//! folder, or at a lab file with or without its extension. [`resolve`] is the
//! only place that splits a locator; routes and request bodies must use the
//! resolved parts rather than slicing the raw string again.
//!
//! Resolution is purely lexical and never fails. A folder whose name happens to
//! end in `.unl` is indistinguishable from a lab file and is classified as one.

use std::fmt;

/// Path separator used by the server.
pub const SEPARATOR: char = '/';

/// Lab file extension.
pub const LAB_EXTENSION: &str = ".unl";

/// Extensions that mark a leaf as a fully-qualified resource.
pub const RESOURCE_EXTENSIONS: &[&str] = &[LAB_EXTENSION];

/// A locator split into its parent directory and final segment.
///
/// `parent` always ends with [`SEPARATOR`]; `leaf` never contains one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    parent: String,
    leaf: String,
    extension: Option<&'static str>,
}

/// Split `locator` on its last separator.
///
/// A locator without any separator is treated as relative to the root.
pub fn resolve(locator: &str) -> ResolvedPath {
    let (parent, leaf) = match locator.rfind(SEPARATOR) {
        Some(idx) => (&locator[..=idx], &locator[idx + 1..]),
        None => ("/", locator),
    };

    let extension = RESOURCE_EXTENSIONS
        .iter()
        .copied()
        .find(|ext| leaf.len() > ext.len() && leaf.ends_with(ext));

    ResolvedPath {
        parent: parent.to_string(),
        leaf: leaf.to_string(),
        extension,
    }
}

impl ResolvedPath {
    /// Directory part, ending with a separator.
    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Final segment exactly as given, extension included. Used in routes.
    pub fn leaf(&self) -> &str {
        &self.leaf
    }

    /// Final segment without a recognized extension. Used for `name` fields.
    pub fn name(&self) -> &str {
        match self.extension {
            Some(ext) => &self.leaf[..self.leaf.len() - ext.len()],
            None => &self.leaf,
        }
    }

    /// The recognized extension, if the leaf carries one.
    pub fn extension(&self) -> Option<&'static str> {
        self.extension
    }

    /// True when the leaf names a resource file rather than a directory.
    pub fn is_resource(&self) -> bool {
        self.extension.is_some()
    }

    /// The logical name to use for create-style requests.
    ///
    /// A resource locator supplies its own name; a directory locator falls
    /// back to the caller's.
    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.is_resource() {
            self.name()
        } else {
            fallback
        }
    }

    /// The directory this locator designates: the parent of a resource, or
    /// the whole locator when it already is a directory.
    pub fn directory(&self) -> String {
        if self.is_resource() || self.leaf.is_empty() {
            self.parent.clone()
        } else {
            format!("{}{}{}", self.parent, self.leaf, SEPARATOR)
        }
    }

    /// Percent-encoded route segment, e.g. `/my%20labs/ospf.unl`.
    pub fn route(&self) -> String {
        let mut route = String::with_capacity(self.parent.len() + self.leaf.len() + 1);
        for segment in self.parent.split(SEPARATOR).filter(|s| !s.is_empty()) {
            route.push(SEPARATOR);
            route.push_str(&urlencoding::encode(segment));
        }
        route.push(SEPARATOR);
        route.push_str(&urlencoding::encode(&self.leaf));
        route
    }

    /// Route segment for the resource name with the lab extension appended,
    /// regardless of whether the locator carried it.
    pub fn lab_route(&self, name: &str) -> String {
        let base = resolve(&format!("{}{}{}", self.parent, name, LAB_EXTENSION));
        base.route()
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.parent, self.leaf)
    }
}
