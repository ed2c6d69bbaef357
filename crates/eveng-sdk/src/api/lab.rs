// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Lab files.

use eveng_http::{CallContext, Method};
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};

use super::lab_base;
use crate::client::EveClient;
use crate::error::{Result, SdkError};
use crate::path;
use crate::types::Lab;

/// Operations on lab files. Obtained from [`EveClient::labs`].
pub struct LabService<'a> {
    client: &'a EveClient,
}

impl<'a> LabService<'a> {
    pub(crate) fn new(client: &'a EveClient) -> Self {
        Self { client }
    }

    /// Lab metadata for `/path/to/lab.unl`.
    #[instrument(skip(self, ctx))]
    pub fn get(&self, ctx: &CallContext, locator: &str) -> Result<Lab> {
        let lab = path::resolve(locator);
        self.client
            .send(ctx, Method::Get, &lab_base(&lab), None)?
            .envelope
            .into_data()
    }

    /// Create a lab.
    ///
    /// `locator` is either the full lab path (`/dir/name.unl`), whose name
    /// wins over `lab.name`, or a folder (`/dir/`), in which case `lab.name`
    /// is used.
    #[instrument(skip(self, ctx, lab))]
    pub fn create(&self, ctx: &CallContext, locator: &str, lab: &Lab) -> Result<()> {
        let resolved = path::resolve(locator);
        let name = resolved.name_or(&lab.name);
        if name.is_empty() {
            return Err(SdkError::InvalidInput(format!(
                "no lab name in {:?} and none given",
                locator
            )));
        }

        let payload = Lab {
            path: resolved.parent().to_string(),
            name: name.to_string(),
            ..lab.clone()
        };
        let body = serde_json::to_value(&payload)?;
        self.client.send(ctx, Method::Post, "api/labs", Some(&body))?;
        debug!(name, path = resolved.parent(), "lab created");
        Ok(())
    }

    /// Update lab metadata. The lab is addressed like in [`create`](Self::create).
    #[instrument(skip(self, ctx, lab))]
    pub fn update(&self, ctx: &CallContext, locator: &str, lab: &Lab) -> Result<()> {
        let resolved = path::resolve(locator);
        let name = resolved.name_or(&lab.name);
        if name.is_empty() {
            return Err(SdkError::InvalidInput(format!(
                "no lab name in {:?} and none given",
                locator
            )));
        }

        let payload = Lab {
            name: name.to_string(),
            path: resolved.parent().to_string(),
            ..lab.clone()
        };
        let body = serde_json::to_value(&payload)?;
        let route = format!("api/labs{}", resolved.lab_route(name));
        self.client.send(ctx, Method::Put, &route, Some(&body))?;
        Ok(())
    }

    #[instrument(skip(self, ctx))]
    pub fn delete(&self, ctx: &CallContext, locator: &str) -> Result<()> {
        let lab = path::resolve(locator);
        self.client
            .send(ctx, Method::Delete, &lab_base(&lab), None)?;
        Ok(())
    }

    /// Move a lab into another folder. `destination` may be a folder or a
    /// full lab path; only its directory is used.
    #[instrument(skip(self, ctx))]
    pub fn move_to(&self, ctx: &CallContext, locator: &str, destination: &str) -> Result<()> {
        let lab = path::resolve(locator);
        let directory = path::resolve(destination).directory();
        let body = json!({ "path": directory });
        self.client.send(
            ctx,
            Method::Put,
            &format!("{}/move", lab_base(&lab)),
            Some(&body),
        )?;
        Ok(())
    }

    pub fn lock(&self, ctx: &CallContext, locator: &str) -> Result<()> {
        self.put_action(ctx, locator, "Lock")
    }

    pub fn unlock(&self, ctx: &CallContext, locator: &str) -> Result<()> {
        self.put_action(ctx, locator, "Unlock")
    }

    /// Links between nodes and networks, one object per link.
    pub fn topology(&self, ctx: &CallContext, locator: &str) -> Result<Vec<Map<String, Value>>> {
        let lab = path::resolve(locator);
        let links: Option<Vec<Map<String, Value>>> = self
            .client
            .send(ctx, Method::Get, &format!("{}/topology", lab_base(&lab)), None)?
            .envelope
            .into_data()?;
        Ok(links.unwrap_or_default())
    }

    /// Close the lab currently open in this session.
    pub fn close(&self, ctx: &CallContext) -> Result<()> {
        self.client
            .send(ctx, Method::Delete, "api/labs/close", None)?;
        Ok(())
    }

    fn put_action(&self, ctx: &CallContext, locator: &str, action: &str) -> Result<()> {
        let lab = path::resolve(locator);
        let route = format!("{}/{}", lab_base(&lab), action);
        self.client.send(ctx, Method::Put, &route, None)?;
        Ok(())
    }
}
