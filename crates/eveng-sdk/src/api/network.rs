// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Lab networks and the network type catalogue.

use std::collections::BTreeMap;

use eveng_http::{CallContext, Method};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::{collection, lab_base};
use crate::client::EveClient;
use crate::error::Result;
use crate::path;
use crate::types::{Created, Network};

/// Operations on the networks of a lab. Obtained from [`EveClient::networks`].
pub struct NetworkService<'a> {
    client: &'a EveClient,
}

impl<'a> NetworkService<'a> {
    pub(crate) fn new(client: &'a EveClient) -> Self {
        Self { client }
    }

    /// All networks of the lab, keyed by network id.
    #[instrument(skip(self, ctx))]
    pub fn list(&self, ctx: &CallContext, lab: &str) -> Result<BTreeMap<u32, Network>> {
        let data = self
            .client
            .send(ctx, Method::Get, &networks_route(lab), None)?
            .envelope
            .data;
        let networks = collection::<Network>(data)?
            .into_iter()
            .map(|(key, mut network)| {
                if network.id == 0 {
                    network.id = key;
                }
                (network.id, network)
            })
            .collect();
        Ok(networks)
    }

    #[instrument(skip(self, ctx))]
    pub fn get(&self, ctx: &CallContext, lab: &str, id: u32) -> Result<Network> {
        let route = format!("{}/{}", networks_route(lab), id);
        let mut network: Network = self
            .client
            .send(ctx, Method::Get, &route, None)?
            .envelope
            .into_data()?;
        network.id = id;
        Ok(network)
    }

    /// Create a network and return the id the server assigned.
    #[instrument(skip(self, ctx, network), fields(name = %network.name))]
    pub fn create(&self, ctx: &CallContext, lab: &str, network: &Network) -> Result<u32> {
        let body = serde_json::to_value(network)?;
        let created: Created = self
            .client
            .send(ctx, Method::Post, &networks_route(lab), Some(&body))?
            .envelope
            .into_data()?;
        debug!(id = created.id, "network created");
        Ok(created.id)
    }

    /// Update the network identified by `network.id`.
    #[instrument(skip(self, ctx, network), fields(id = network.id))]
    pub fn update(&self, ctx: &CallContext, lab: &str, network: &Network) -> Result<()> {
        let body = serde_json::to_value(network)?;
        let route = format!("{}/{}", networks_route(lab), network.id);
        self.client.send(ctx, Method::Put, &route, Some(&body))?;
        Ok(())
    }

    #[instrument(skip(self, ctx))]
    pub fn delete(&self, ctx: &CallContext, lab: &str, id: u32) -> Result<()> {
        let route = format!("{}/{}", networks_route(lab), id);
        self.client.send(ctx, Method::Delete, &route, None)?;
        Ok(())
    }

    /// Network types the server supports (`bridge`, `pnet0`, ...), sorted.
    pub fn network_types(&self, ctx: &CallContext) -> Result<Vec<String>> {
        let types: Option<Map<String, Value>> = self
            .client
            .send(ctx, Method::Get, "api/list/networks", None)?
            .envelope
            .into_data()?;
        let mut names: Vec<String> = types
            .unwrap_or_default()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        names.sort();
        Ok(names)
    }
}

fn networks_route(lab: &str) -> String {
    format!("{}/networks", lab_base(&path::resolve(lab)))
}
