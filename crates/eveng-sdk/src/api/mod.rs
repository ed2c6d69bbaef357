// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Resource services: labs, folders, nodes and networks.
//!
//! Each service borrows the client, resolves locators through
//! [`resolve`](crate::path::resolve) and sends through the session. Lab
//! locators name the `.unl` file, e.g. `/users/alice/ospf.unl`.

mod folder;
mod lab;
mod network;
mod node;

pub use folder::FolderService;
pub use lab::LabService;
pub use network::NetworkService;
pub use node::NodeService;

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::envelope::indexed;
use crate::error::{Result, SdkError};
use crate::path::ResolvedPath;

/// `api/labs/<lab>` for a resolved lab locator.
fn lab_base(lab: &ResolvedPath) -> String {
    format!("api/labs{}", lab.route())
}

/// Decode an id-keyed collection. An empty lab comes back as `[]` instead
/// of `{}`, so both shapes are accepted.
fn collection<T: DeserializeOwned>(data: Value) -> Result<BTreeMap<u32, T>> {
    indexed(data)
        .map_err(|e| SdkError::UnexpectedResponse(format!("invalid collection: {}", e)))
}
