// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later

use eveng_http::{CallContext, Method};
use tracing::instrument;

use crate::client::EveClient;
use crate::error::{Result, SdkError};
use crate::path;
use crate::types::{Folder, FolderListing};

/// Operations on lab folders. Obtained from [`EveClient::folders`].
pub struct FolderService<'a> {
    client: &'a EveClient,
}

impl<'a> FolderService<'a> {
    pub(crate) fn new(client: &'a EveClient) -> Self {
        Self { client }
    }

    /// Sub-folders and lab files of a folder. `/` lists the root.
    #[instrument(skip(self, ctx))]
    pub fn get(&self, ctx: &CallContext, folder: &str) -> Result<FolderListing> {
        let route = folder_route(folder);
        let listing: Option<FolderListing> = self
            .client
            .send(ctx, Method::Get, &route, None)?
            .envelope
            .into_data()?;
        Ok(listing.unwrap_or_default())
    }

    /// Create the folder named by the last segment of `folder`.
    #[instrument(skip(self, ctx))]
    pub fn create(&self, ctx: &CallContext, folder: &str) -> Result<()> {
        let resolved = path::resolve(folder.trim_end_matches(path::SEPARATOR));
        if resolved.leaf().is_empty() {
            return Err(SdkError::InvalidInput(format!(
                "no folder name in {:?}",
                folder
            )));
        }
        let body = serde_json::to_value(Folder {
            name: resolved.leaf().to_string(),
            path: resolved.parent().to_string(),
        })?;
        self.client
            .send(ctx, Method::Post, "api/folders", Some(&body))?;
        Ok(())
    }

    /// Rename or move a folder. `update.path` is the new full path.
    #[instrument(skip(self, ctx, update))]
    pub fn update(&self, ctx: &CallContext, folder: &str, update: &Folder) -> Result<()> {
        let body = serde_json::to_value(update)?;
        self.client
            .send(ctx, Method::Put, &folder_route(folder), Some(&body))?;
        Ok(())
    }

    #[instrument(skip(self, ctx))]
    pub fn delete(&self, ctx: &CallContext, folder: &str) -> Result<()> {
        self.client
            .send(ctx, Method::Delete, &folder_route(folder), None)?;
        Ok(())
    }
}

fn folder_route(folder: &str) -> String {
    format!("api/folders{}", path::resolve(folder).route())
}
