// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Lab nodes: lifecycle, interfaces, startup configs and templates.
//!
//! Three operations depend on the server edition detected at login:
//! - [`NodeService::start_all`]: Community has a bulk route, Pro does not
//! - [`NodeService::config`] / [`NodeService::update_config`]: Pro scopes
//!   configs to a config set (`cfsid`)
//! - interface styling exists only on Pro

use std::collections::BTreeMap;

use eveng_http::{CallContext, Method};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument};

use super::{collection, lab_base};
use crate::client::EveClient;
use crate::error::{Result, SdkError};
use crate::path;
use crate::session::Edition;
use crate::types::{Created, Interface, InterfaceStyle, Node, NodeInterfaces};

/// Interface kind sent with style updates.
const STYLE_INTERFACE_KIND: &str = "ethernet";

/// Payload of `.../configs/<id>`.
#[derive(Debug, Default, Deserialize)]
struct StartupConfig {
    #[serde(default)]
    data: Option<String>,
}

/// Operations on the nodes of a lab. Obtained from [`EveClient::nodes`].
pub struct NodeService<'a> {
    client: &'a EveClient,
}

impl<'a> NodeService<'a> {
    pub(crate) fn new(client: &'a EveClient) -> Self {
        Self { client }
    }

    /// All nodes of the lab, keyed by node id.
    #[instrument(skip(self, ctx))]
    pub fn list(&self, ctx: &CallContext, lab: &str) -> Result<BTreeMap<u32, Node>> {
        let data = self
            .client
            .send(ctx, Method::Get, &nodes_route(lab), None)?
            .envelope
            .data;
        let nodes = collection::<Node>(data)?
            .into_iter()
            .map(|(key, mut node)| {
                if node.id == 0 {
                    node.id = key;
                }
                (node.id, node)
            })
            .collect();
        Ok(nodes)
    }

    #[instrument(skip(self, ctx))]
    pub fn get(&self, ctx: &CallContext, lab: &str, id: u32) -> Result<Node> {
        let mut node: Node = self
            .client
            .send(ctx, Method::Get, &node_route(lab, id), None)?
            .envelope
            .into_data()?;
        node.id = id;
        Ok(node)
    }

    /// Create a node and return the id the server assigned.
    #[instrument(skip(self, ctx, node), fields(name = %node.name, template = %node.template))]
    pub fn create(&self, ctx: &CallContext, lab: &str, node: &Node) -> Result<u32> {
        let body = serde_json::to_value(node)?;
        let created: Created = self
            .client
            .send(ctx, Method::Post, &nodes_route(lab), Some(&body))?
            .envelope
            .into_data()?;
        debug!(id = created.id, "node created");
        Ok(created.id)
    }

    /// Update the node identified by `node.id`.
    #[instrument(skip(self, ctx, node), fields(id = node.id))]
    pub fn update(&self, ctx: &CallContext, lab: &str, node: &Node) -> Result<()> {
        let body = serde_json::to_value(node)?;
        self.client
            .send(ctx, Method::Put, &node_route(lab, node.id), Some(&body))?;
        Ok(())
    }

    #[instrument(skip(self, ctx))]
    pub fn delete(&self, ctx: &CallContext, lab: &str, id: u32) -> Result<()> {
        self.client
            .send(ctx, Method::Delete, &node_route(lab, id), None)?;
        Ok(())
    }

    #[instrument(skip(self, ctx))]
    pub fn start(&self, ctx: &CallContext, lab: &str, id: u32) -> Result<()> {
        let route = format!("{}/start", node_route(lab, id));
        self.client.send(ctx, Method::Get, &route, None)?;
        Ok(())
    }

    #[instrument(skip(self, ctx))]
    pub fn stop(&self, ctx: &CallContext, lab: &str, id: u32) -> Result<()> {
        let route = format!("{}/stop", node_route(lab, id));
        self.client.send(ctx, Method::Get, &route, None)?;
        Ok(())
    }

    #[instrument(skip(self, ctx))]
    pub fn stop_all(&self, ctx: &CallContext, lab: &str) -> Result<()> {
        let route = format!("{}/stop", nodes_route(lab));
        self.client.send(ctx, Method::Get, &route, None)?;
        Ok(())
    }

    /// Start every node of the lab.
    ///
    /// On Pro the nodes are started one by one in ascending id order; the
    /// first failure aborts the loop and nodes already started stay running.
    #[instrument(skip(self, ctx))]
    pub fn start_all(&self, ctx: &CallContext, lab: &str) -> Result<()> {
        match self.client.capability()? {
            Edition::Community => {
                let route = format!("{}/start", nodes_route(lab));
                self.client.send(ctx, Method::Get, &route, None)?;
            }
            Edition::Pro => {
                let nodes = self.list(ctx, lab)?;
                info!(count = nodes.len(), "starting nodes individually");
                for id in nodes.keys() {
                    self.start(ctx, lab, *id)?;
                }
            }
        }
        Ok(())
    }

    /// Ethernet and serial interfaces of a node, keyed by slot.
    #[instrument(skip(self, ctx))]
    pub fn interfaces(&self, ctx: &CallContext, lab: &str, id: u32) -> Result<NodeInterfaces> {
        let interfaces: Option<NodeInterfaces> = self
            .client
            .send(ctx, Method::Get, &interfaces_route(lab, id), None)?
            .envelope
            .into_data()?;
        Ok(interfaces.unwrap_or_default())
    }

    /// Find an ethernet interface by name, e.g. `Gi0/0`. Returns its slot.
    pub fn interface_by_name(
        &self,
        ctx: &CallContext,
        lab: &str,
        id: u32,
        name: &str,
    ) -> Result<(u32, Interface)> {
        let interfaces = self.interfaces(ctx, lab, id)?;
        interfaces
            .ethernet
            .find_by_name(name)
            .map(|(slot, iface)| (slot, iface.clone()))
            .ok_or_else(|| SdkError::InterfaceNotFound(name.to_string()))
    }

    /// Connect interface `slot` to `network`. Network 0 disconnects it.
    #[instrument(skip(self, ctx))]
    pub fn connect_interface(
        &self,
        ctx: &CallContext,
        lab: &str,
        id: u32,
        slot: u32,
        network: u32,
    ) -> Result<()> {
        let target = if network == 0 { json!("") } else { json!(network) };
        let mut body = Map::new();
        body.insert(slot.to_string(), target);
        self.client.send(
            ctx,
            Method::Put,
            &interfaces_route(lab, id),
            Some(&Value::Object(body)),
        )?;
        Ok(())
    }

    pub fn connect_interface_by_name(
        &self,
        ctx: &CallContext,
        lab: &str,
        id: u32,
        name: &str,
        network: u32,
    ) -> Result<()> {
        let (slot, _) = self.interface_by_name(ctx, lab, id, name)?;
        self.connect_interface(ctx, lab, id, slot, network)
    }

    /// Saved startup configuration of a node. Empty when none is stored.
    #[instrument(skip(self, ctx))]
    pub fn config(&self, ctx: &CallContext, lab: &str, id: u32) -> Result<String> {
        let route = config_route(lab, id);
        let exchange = match self.client.capability()? {
            Edition::Pro => {
                let body = json!({ "cfsid": self.client.config().config_set_id });
                self.client.send(ctx, Method::Post, &route, Some(&body))?
            }
            Edition::Community => self.client.send(ctx, Method::Get, &route, None)?,
        };
        let config: Option<StartupConfig> = exchange.envelope.into_data()?;
        Ok(config.and_then(|c| c.data).unwrap_or_default())
    }

    /// Replace the startup configuration of a node.
    #[instrument(skip(self, ctx, config))]
    pub fn update_config(&self, ctx: &CallContext, lab: &str, id: u32, config: &str) -> Result<()> {
        let body = match self.client.capability()? {
            Edition::Pro => json!({
                "data": config,
                "cfsid": self.client.config().config_set_id,
            }),
            Edition::Community => json!({ "data": config }),
        };
        self.client
            .send(ctx, Method::Put, &config_route(lab, id), Some(&body))?;
        Ok(())
    }

    /// Set the link style of a node interface. Pro only.
    ///
    /// `style.node` and `style.kind` are filled in; `style.id` and
    /// `style.interface_id` must identify the link.
    #[instrument(skip(self, ctx, style))]
    pub fn set_interface_style(
        &self,
        ctx: &CallContext,
        lab: &str,
        id: u32,
        style: &InterfaceStyle,
    ) -> Result<()> {
        self.client.require_pro("interface styling")?;
        self.put_style(ctx, lab, id, style.clone())
    }

    /// Set the link style of the interface with the given name. Pro only.
    #[instrument(skip(self, ctx, style))]
    pub fn set_interface_style_by_name(
        &self,
        ctx: &CallContext,
        lab: &str,
        id: u32,
        name: &str,
        style: &InterfaceStyle,
    ) -> Result<()> {
        self.client.require_pro("interface styling")?;
        let (slot, iface) = self.interface_by_name(ctx, lab, id, name)?;
        let style = InterfaceStyle {
            interface_id: slot.to_string(),
            id: format!("network_id:{}", iface.network_id),
            ..style.clone()
        };
        self.put_style(ctx, lab, id, style)
    }

    /// Node templates available on the server: name to description.
    pub fn templates(&self, ctx: &CallContext) -> Result<BTreeMap<String, String>> {
        let templates: Option<BTreeMap<String, String>> = self
            .client
            .send(ctx, Method::Get, "api/list/templates/", None)?
            .envelope
            .into_data()?;
        Ok(templates.unwrap_or_default())
    }

    /// Full definition of one template, as the server sends it.
    pub fn template(&self, ctx: &CallContext, name: &str) -> Result<Map<String, Value>> {
        let route = format!("api/list/templates/{}", urlencoding::encode(name));
        match self.client.send(ctx, Method::Get, &route, None)?.envelope.data {
            Value::Object(definition) => Ok(definition),
            other => Err(SdkError::UnexpectedResponse(format!(
                "template {} is not an object: {}",
                name, other
            ))),
        }
    }

    fn put_style(
        &self,
        ctx: &CallContext,
        lab: &str,
        id: u32,
        mut style: InterfaceStyle,
    ) -> Result<()> {
        style.node = id.to_string();
        style.kind = STYLE_INTERFACE_KIND.to_string();
        let body = serde_json::to_value(&style)?;
        let route = format!("{}/style", node_route(lab, id));
        self.client.send(ctx, Method::Put, &route, Some(&body))?;
        Ok(())
    }
}

fn nodes_route(lab: &str) -> String {
    format!("{}/nodes", lab_base(&path::resolve(lab)))
}

fn node_route(lab: &str, id: u32) -> String {
    format!("{}/{}", nodes_route(lab), id)
}

fn interfaces_route(lab: &str, id: u32) -> String {
    format!("{}/interfaces", node_route(lab, id))
}

fn config_route(lab: &str, id: u32) -> String {
    format!("{}/configs/{}", lab_base(&path::resolve(lab)), id)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::client::testing::logged_in;
    use crate::engine::testing::ScriptedTransport;

    const COMMUNITY: &str = "6.2.0-4";
    const PRO: &str = "5.0.1-19-PRO";

    fn setup(version: &str) -> (Arc<ScriptedTransport>, EveClient) {
        let transport = Arc::new(ScriptedTransport::new());
        let client = logged_in(&transport, version);
        (transport, client)
    }

    fn sent(transport: &ScriptedTransport) -> Vec<(Method, String)> {
        transport
            .requests()
            .into_iter()
            .map(|r| (r.method, r.url))
            .collect()
    }

    fn body(transport: &ScriptedTransport, index: usize) -> Value {
        serde_json::from_slice(transport.requests()[index].body.as_deref().unwrap()).unwrap()
    }

    fn url(route: &str) -> String {
        format!("https://eve.local/{}", route)
    }

    #[test]
    fn test_list_and_get() {
        let (transport, client) = setup(COMMUNITY);
        transport.ok(json!({
            "2": {"id": 2, "name": "R2", "type": "iol", "ethernet": "4"},
            "1": {"id": "1", "name": "R1", "type": "qemu"}
        }));
        transport.ok(json!({"name": "R1", "type": "qemu", "status": 2}));

        let nodes = client.nodes();
        let ctx = CallContext::background();
        let all = nodes.list(&ctx, "/lab.unl").unwrap();
        assert_eq!(all.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(all[&2].ethernet, 4);

        let one = nodes.get(&ctx, "/lab.unl", 1).unwrap();
        assert_eq!(one.id, 1);
        assert_eq!(one.status, 2);

        assert_eq!(
            sent(&transport),
            vec![
                (Method::Get, url("api/labs/lab.unl/nodes")),
                (Method::Get, url("api/labs/lab.unl/nodes/1")),
            ]
        );
    }

    #[test]
    fn test_create_update_delete() {
        let (transport, client) = setup(COMMUNITY);
        transport.respond(
            201,
            json!({"status": "success", "code": 201, "message": "Lab has been saved (60023).", "data": {"id": "5"}}),
        );
        transport.ok(json!(null));
        transport.ok(json!(null));

        let nodes = client.nodes();
        let ctx = CallContext::background();
        let mut node = Node {
            name: "vpc1".into(),
            kind: "vpcs".into(),
            template: "vpcs".into(),
            ..Default::default()
        };
        node.id = nodes.create(&ctx, "/lab.unl", &node).unwrap();
        assert_eq!(node.id, 5);
        node.left = 40;
        nodes.update(&ctx, "/lab.unl", &node).unwrap();
        nodes.delete(&ctx, "/lab.unl", 5).unwrap();

        assert_eq!(body(&transport, 0)["template"], "vpcs");
        assert_eq!(body(&transport, 1)["left"], 40);
        assert_eq!(
            sent(&transport),
            vec![
                (Method::Post, url("api/labs/lab.unl/nodes")),
                (Method::Put, url("api/labs/lab.unl/nodes/5")),
                (Method::Delete, url("api/labs/lab.unl/nodes/5")),
            ]
        );
    }

    #[test]
    fn test_start_stop_routes() {
        let (transport, client) = setup(COMMUNITY);
        for _ in 0..3 {
            transport.ok(json!(null));
        }

        let nodes = client.nodes();
        let ctx = CallContext::background();
        nodes.start(&ctx, "/lab.unl", 3).unwrap();
        nodes.stop(&ctx, "/lab.unl", 3).unwrap();
        nodes.stop_all(&ctx, "/lab.unl").unwrap();

        assert_eq!(
            sent(&transport),
            vec![
                (Method::Get, url("api/labs/lab.unl/nodes/3/start")),
                (Method::Get, url("api/labs/lab.unl/nodes/3/stop")),
                (Method::Get, url("api/labs/lab.unl/nodes/stop")),
            ]
        );
    }

    #[test]
    fn test_start_all_community_uses_bulk_route() {
        let (transport, client) = setup(COMMUNITY);
        transport.ok(json!(null));

        client
            .nodes()
            .start_all(&CallContext::background(), "/lab.unl")
            .unwrap();

        assert_eq!(
            sent(&transport),
            vec![(Method::Get, url("api/labs/lab.unl/nodes/start"))]
        );
    }

    #[test]
    fn test_start_all_pro_starts_each_node_in_id_order() {
        let (transport, client) = setup(PRO);
        transport.ok(json!({"3": {"id": 3}, "1": {"id": 1}, "2": {"id": 2}}));
        for _ in 0..3 {
            transport.ok(json!(null));
        }

        client
            .nodes()
            .start_all(&CallContext::background(), "/lab.unl")
            .unwrap();

        assert_eq!(
            sent(&transport),
            vec![
                (Method::Get, url("api/labs/lab.unl/nodes")),
                (Method::Get, url("api/labs/lab.unl/nodes/1/start")),
                (Method::Get, url("api/labs/lab.unl/nodes/2/start")),
                (Method::Get, url("api/labs/lab.unl/nodes/3/start")),
            ]
        );
    }

    #[test]
    fn test_start_all_pro_aborts_on_first_failure() {
        let (transport, client) = setup(PRO);
        transport.ok(json!({"1": {"id": 1}, "2": {"id": 2}, "3": {"id": 3}}));
        transport.ok(json!(null));
        transport.respond(
            400,
            json!({"status": "fail", "code": 400, "message": "Failed to start node (12)."}),
        );

        let err = client
            .nodes()
            .start_all(&CallContext::background(), "/lab.unl")
            .unwrap_err();

        assert!(matches!(err, SdkError::ClientRejected { http_status: 400, .. }));
        assert_eq!(transport.calls(), 3);
    }

    #[test]
    fn test_start_all_requires_login() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = EveClient::with_transport(
            crate::client::testing::test_config(),
            transport.clone(),
        )
        .unwrap();
        let err = client
            .nodes()
            .start_all(&CallContext::background(), "/lab.unl")
            .unwrap_err();
        assert!(matches!(err, SdkError::NotAuthenticated));
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_interfaces_sparse_and_lookup() {
        let (transport, client) = setup(COMMUNITY);
        let sparse = json!({
            "id": 1, "sort": "iol",
            "ethernet": {
                "0": {"name": "e0/0", "network_id": 0},
                "16": {"name": "e0/1", "network_id": "7"}
            },
            "serial": []
        });
        transport.ok(sparse.clone());
        transport.ok(sparse);

        let nodes = client.nodes();
        let ctx = CallContext::background();
        let interfaces = nodes.interfaces(&ctx, "/lab.unl", 1).unwrap();
        assert_eq!(interfaces.ethernet.len(), 2);
        assert_eq!(interfaces.ethernet.get(16).unwrap().network_id, 7);
        assert!(interfaces.serial.is_empty());

        let (slot, iface) = nodes.interface_by_name(&ctx, "/lab.unl", 1, "e0/1").unwrap();
        assert_eq!(slot, 16);
        assert_eq!(iface.network_id, 7);
        assert_eq!(
            transport.requests()[0].url,
            url("api/labs/lab.unl/nodes/1/interfaces")
        );
    }

    #[test]
    fn test_unknown_interface_name() {
        let (transport, client) = setup(COMMUNITY);
        transport.ok(json!({"ethernet": [{"name": "Gi0/0", "network_id": 1}], "serial": []}));

        let err = client
            .nodes()
            .interface_by_name(&CallContext::background(), "/lab.unl", 1, "Gi0/9")
            .unwrap_err();
        assert!(matches!(err, SdkError::InterfaceNotFound(ref name) if name == "Gi0/9"));
    }

    #[test]
    fn test_connect_and_disconnect_interface() {
        let (transport, client) = setup(COMMUNITY);
        transport.ok(json!(null));
        transport.ok(json!({"ethernet": [{"name": "Gi0/0"}, {"name": "Gi0/1"}]}));
        transport.ok(json!(null));

        let nodes = client.nodes();
        let ctx = CallContext::background();
        nodes.connect_interface(&ctx, "/lab.unl", 1, 0, 3).unwrap();
        nodes
            .connect_interface_by_name(&ctx, "/lab.unl", 1, "Gi0/1", 0)
            .unwrap();

        assert_eq!(body(&transport, 0), json!({"0": 3}));
        assert_eq!(body(&transport, 2), json!({"1": ""}));
        assert_eq!(transport.requests()[2].method, Method::Put);
        assert_eq!(
            transport.requests()[2].url,
            url("api/labs/lab.unl/nodes/1/interfaces")
        );
    }

    #[test]
    fn test_config_community_uses_get() {
        let (transport, client) = setup(COMMUNITY);
        transport.ok(json!({"id": 1, "data": "hostname R1\n"}));
        transport.ok(json!(null));

        let nodes = client.nodes();
        let ctx = CallContext::background();
        assert_eq!(nodes.config(&ctx, "/lab.unl", 1).unwrap(), "hostname R1\n");
        nodes.update_config(&ctx, "/lab.unl", 1, "hostname R2").unwrap();

        assert_eq!(
            sent(&transport),
            vec![
                (Method::Get, url("api/labs/lab.unl/configs/1")),
                (Method::Put, url("api/labs/lab.unl/configs/1")),
            ]
        );
        assert_eq!(body(&transport, 1), json!({"data": "hostname R2"}));
    }

    #[test]
    fn test_config_pro_sends_config_set() {
        let (transport, client) = setup(PRO);
        transport.ok(json!(null));
        transport.ok(json!(null));

        let nodes = client.nodes();
        let ctx = CallContext::background();
        assert_eq!(nodes.config(&ctx, "/lab.unl", 2).unwrap(), "");
        nodes.update_config(&ctx, "/lab.unl", 2, "hostname R2").unwrap();

        assert_eq!(transport.requests()[0].method, Method::Post);
        assert_eq!(body(&transport, 0), json!({"cfsid": "default"}));
        assert_eq!(
            body(&transport, 1),
            json!({"data": "hostname R2", "cfsid": "default"})
        );
    }

    #[test]
    fn test_style_under_community_fails_without_network_call() {
        let (transport, client) = setup(COMMUNITY);
        let nodes = client.nodes();
        let ctx = CallContext::background();
        let style = InterfaceStyle::default();

        let err = nodes
            .set_interface_style(&ctx, "/lab.unl", 1, &style)
            .unwrap_err();
        assert!(matches!(
            err,
            SdkError::Capability {
                required: Edition::Pro,
                ..
            }
        ));
        let err = nodes
            .set_interface_style_by_name(&ctx, "/lab.unl", 1, "Gi0/0", &style)
            .unwrap_err();
        assert!(matches!(err, SdkError::Capability { .. }));
        assert!(err.is_local());

        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_style_by_name_under_pro_fills_link_identity() {
        let (transport, client) = setup(PRO);
        transport.ok(json!({"ethernet": {"0": {"name": "Gi0/0", "network_id": 4}}}));
        transport.ok(json!(null));

        let style = InterfaceStyle {
            color: "#ff0000".into(),
            width: 2,
            linkstyle: "Straight".into(),
            ..Default::default()
        };
        client
            .nodes()
            .set_interface_style_by_name(&CallContext::background(), "/lab.unl", 9, "Gi0/0", &style)
            .unwrap();

        let sent_style = body(&transport, 1);
        assert_eq!(
            transport.requests()[1].url,
            url("api/labs/lab.unl/nodes/9/style")
        );
        assert_eq!(sent_style["node"], "9");
        assert_eq!(sent_style["type"], "ethernet");
        assert_eq!(sent_style["interface_id"], "0");
        assert_eq!(sent_style["id"], "network_id:4");
        assert_eq!(sent_style["color"], "#ff0000");
        assert_eq!(sent_style["width"], 2);
    }

    #[test]
    fn test_templates() {
        let (transport, client) = setup(COMMUNITY);
        transport.ok(json!({"iol": "Cisco IOL", "vpcs": "Virtual PC (VPCS)"}));
        transport.ok(json!({"description": "Cisco IOL", "options": {"ram": {"value": 1024}}}));
        transport.ok(json!([]));

        let nodes = client.nodes();
        let ctx = CallContext::background();
        let templates = nodes.templates(&ctx).unwrap();
        assert_eq!(templates["vpcs"], "Virtual PC (VPCS)");

        let iol = nodes.template(&ctx, "iol").unwrap();
        assert_eq!(iol["options"]["ram"]["value"], 1024);

        let err = nodes.template(&ctx, "missing").unwrap_err();
        assert!(matches!(err, SdkError::UnexpectedResponse(_)));

        assert_eq!(transport.requests()[0].url, url("api/list/templates/"));
        assert_eq!(transport.requests()[1].url, url("api/list/templates/iol"));
    }
}
