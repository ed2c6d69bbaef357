// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Resource schemas exchanged with the EVE-NG API.
//!
//! Numeric fields go through lenient deserializers because the server emits
//! many of them as strings on some editions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::envelope::InterfaceMap;
use crate::lenient;

// ============================================================================
// Session
// ============================================================================

/// The logged-in user, as returned by `GET api/auth`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub lang: String,
    /// Folder the user last browsed.
    #[serde(default)]
    pub folder: String,
    /// Lab the user currently has open, if any.
    #[serde(default)]
    pub lab: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub tenant: i64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub html5: i64,
}

/// Server status, as returned by `GET api/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    /// Version string; Pro builds carry a `PRO` marker.
    #[serde(default, deserialize_with = "lenient::text")]
    pub version: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub qemu_version: String,
    /// Resource counters and usage figures the client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Labs and folders
// ============================================================================

/// Lab metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lab {
    /// Parent folder. Filled in from the locator on create/update.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub version: String,
}

/// A folder entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
}

/// A lab file entry inside a folder listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabEntry {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub umtime: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub mtime: String,
}

/// Contents of a folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderListing {
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub labs: Vec<LabEntry>,
}

// ============================================================================
// Nodes
// ============================================================================

/// A lab node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, deserialize_with = "lenient::number")]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// Node type, e.g. `qemu`, `iol`, `dynamips`, `vpcs`.
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub console: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub cpu: u32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub ram: u32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub ethernet: u32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub delay: u32,
    /// 1 when the node boots from its saved startup configuration.
    #[serde(default, deserialize_with = "lenient::number")]
    pub config: u32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub left: i32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub top: i32,
    /// Runtime state reported by the server (0 stopped, 2 running, ...).
    #[serde(default, deserialize_with = "lenient::number")]
    pub status: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uuid: String,
}

/// One node interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    #[serde(default)]
    pub name: String,
    /// Connected network, 0 when unconnected.
    #[serde(default, deserialize_with = "lenient::number")]
    pub network_id: u32,
}

/// Interfaces of a node grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInterfaces {
    #[serde(default)]
    pub ethernet: InterfaceMap,
    #[serde(default)]
    pub serial: InterfaceMap,
}

/// Visual style of an interface link (Pro only).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceStyle {
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub linkstyle: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub srcpos: f32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub dstpos: f32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub labelpos: f32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub midpoint: f32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub width: u32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub stub: u32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub curviness: u32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub beziercurviness: u32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub round: u32,
    /// `network_id:<n>` of the link being styled.
    #[serde(default)]
    pub id: String,
    /// Node id, filled in by the client.
    #[serde(default)]
    pub node: String,
    /// Interface slot, filled in by the by-name variant.
    #[serde(default)]
    pub interface_id: String,
    /// Interface kind, filled in by the client.
    #[serde(default, rename = "type")]
    pub kind: String,
}

// ============================================================================
// Networks
// ============================================================================

/// A lab network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    #[serde(default, deserialize_with = "lenient::number")]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// Network type, e.g. `bridge`, `pnet0`.
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Number of attached interfaces, reported by the server.
    #[serde(default, deserialize_with = "lenient::number")]
    pub count: u32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub left: i32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub top: i32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub visibility: u32,
    #[serde(default)]
    pub icon: String,
}

/// Payload of create responses: `{"id": ...}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Created {
    #[serde(deserialize_with = "lenient::number")]
    pub id: u32,
}
