//! Resource graph data model.
//!
//! A [`ResourceGraph`] is the only artifact handed to the emitter. Nodes carry
//! stable, application-assigned ids; edges point from a node to something it
//! needs to exist first. Nodes are stored in build order, which is always a
//! valid dependency order.

use super::{NetworkBlock, Tier};
use crate::error::{Result, SynthError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::Ipv4Addr;

/// `0.0.0.0/0`, destination of every default route and ACL entry.
pub const DEFAULT_ROUTE: NetworkBlock = NetworkBlock {
    addr: Ipv4Addr::UNSPECIFIED,
    mask: 0,
};

/// Rule number shared by the allow-all ACL entries.
pub const ACL_RULE_NUMBER: u16 = 100;

/// Target of a [`Resource::Route`], referencing a gateway node id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RouteTarget {
    InternetGateway(String),
    NatGateway(String),
}

impl RouteTarget {
    pub fn node_id(&self) -> &str {
        match self {
            RouteTarget::InternetGateway(id) | RouteTarget::NatGateway(id) => id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
}

/// Typed payload of a graph node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum Resource {
    Vpc {
        cidr_block: NetworkBlock,
        enable_dns_hostnames: bool,
        enable_dns_support: bool,
    },
    Subnet {
        tier: Tier,
        az_index: usize,
        cidr_block: NetworkBlock,
        map_public_ip_on_launch: bool,
    },
    InternetGateway,
    GatewayAttachment,
    DhcpOptions {
        domain_name: String,
        domain_name_servers: Vec<String>,
    },
    DhcpOptionsAssociation,
    NetworkAcl {
        tier: Tier,
    },
    NetworkAclEntry {
        rule_number: u16,
        protocol: i32,
        rule_action: RuleAction,
        cidr_block: NetworkBlock,
        egress: bool,
    },
    SubnetNetworkAclAssociation,
    RouteTable {
        tier: Tier,
    },
    SubnetRouteTableAssociation,
    Route {
        destination_cidr_block: NetworkBlock,
        target: RouteTarget,
    },
    ElasticIp {
        domain: String,
    },
    NatGateway,
    VpcEndpoint {
        service: String,
        endpoint_type: String,
    },
}

/// Discriminant of [`Resource`], used for lookups and reporting.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Vpc,
    Subnet,
    InternetGateway,
    GatewayAttachment,
    DhcpOptions,
    DhcpOptionsAssociation,
    NetworkAcl,
    NetworkAclEntry,
    SubnetNetworkAclAssociation,
    RouteTable,
    SubnetRouteTableAssociation,
    Route,
    ElasticIp,
    NatGateway,
    VpcEndpoint,
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Vpc { .. } => ResourceKind::Vpc,
            Resource::Subnet { .. } => ResourceKind::Subnet,
            Resource::InternetGateway => ResourceKind::InternetGateway,
            Resource::GatewayAttachment => ResourceKind::GatewayAttachment,
            Resource::DhcpOptions { .. } => ResourceKind::DhcpOptions,
            Resource::DhcpOptionsAssociation => ResourceKind::DhcpOptionsAssociation,
            Resource::NetworkAcl { .. } => ResourceKind::NetworkAcl,
            Resource::NetworkAclEntry { .. } => ResourceKind::NetworkAclEntry,
            Resource::SubnetNetworkAclAssociation => ResourceKind::SubnetNetworkAclAssociation,
            Resource::RouteTable { .. } => ResourceKind::RouteTable,
            Resource::SubnetRouteTableAssociation => ResourceKind::SubnetRouteTableAssociation,
            Resource::Route { .. } => ResourceKind::Route,
            Resource::ElasticIp { .. } => ResourceKind::ElasticIp,
            Resource::NatGateway => ResourceKind::NatGateway,
            Resource::VpcEndpoint { .. } => ResourceKind::VpcEndpoint,
        }
    }

    /// Tier of tier-scoped resources (subnets, ACLs, route tables).
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Resource::Subnet { tier, .. }
            | Resource::NetworkAcl { tier }
            | Resource::RouteTable { tier } => Some(*tier),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A single resource in the graph.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Stable id, unique within the graph.
    pub id: String,
    /// Value of the `Name` tag, if the resource is tagged.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub resource: Resource,
}

impl Node {
    pub fn new(id: &str, name: Option<String>, resource: Resource) -> Node {
        Node {
            id: id.to_string(),
            name,
            resource,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.resource.kind()
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    DependsOn,
    AttachedTo,
    AssociatedWith,
    RoutesVia,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelationKind::DependsOn => "dependsOn",
            RelationKind::AttachedTo => "attachedTo",
            RelationKind::AssociatedWith => "associatedWith",
            RelationKind::RoutesVia => "routesVia",
        };
        f.write_str(s)
    }
}

/// Directed edge: `from` needs `to` to exist first.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub relation: RelationKind,
}

/// Named output exposing a node's identifier to other stacks.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub name: String,
    pub node_id: String,
}

/// Nodes, edges and exports produced by one synthesis call.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    exports: Vec<Export>,
    #[serde(skip)]
    index: BTreeMap<String, usize>,
}

impl ResourceGraph {
    pub(crate) fn new() -> ResourceGraph {
        ResourceGraph::default()
    }

    /// Append a node. Ids must be unique.
    pub(crate) fn add_node(&mut self, node: Node) -> Result<()> {
        if self.index.contains_key(&node.id) {
            return Err(SynthError::GraphError(format!(
                "duplicate node id '{}'",
                node.id
            )));
        }
        log::trace!("add node {} ({})", node.id, node.kind());
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Append an edge. `to` must have been added before `from`.
    pub(crate) fn add_edge(&mut self, from: &str, to: &str, relation: RelationKind) -> Result<()> {
        let from_idx = self.position(from)?;
        let to_idx = self.position(to)?;
        if to_idx >= from_idx {
            return Err(SynthError::GraphError(format!(
                "edge {from} -{relation}-> {to} points at a node that is not built yet"
            )));
        }
        self.edges.push(Edge {
            from: from.to_string(),
            to: to.to_string(),
            relation,
        });
        Ok(())
    }

    pub(crate) fn add_export(&mut self, name: String, node_id: &str) -> Result<()> {
        self.position(node_id)?;
        self.exports.push(Export {
            name,
            node_id: node_id.to_string(),
        });
        Ok(())
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| SynthError::GraphError(format!("unknown node id '{id}'")))
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn exports(&self) -> &[Export] {
        &self.exports
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn nodes_of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.kind() == kind)
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.nodes_of_kind(kind).count()
    }

    pub fn edges_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.from == id)
    }

    pub fn edges_to<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.to == id)
    }

    /// Node ids ordered so that every node comes after everything it points to.
    ///
    /// Ties are broken by build order, so the result is deterministic.
    pub fn dependency_order(&self) -> Result<Vec<&str>> {
        let mut pending: Vec<usize> = vec![0; self.nodes.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for edge in &self.edges {
            let from = self.position(&edge.from)?;
            let to = self.position(&edge.to)?;
            pending[from] += 1;
            dependents[to].push(from);
        }

        let mut ready: BTreeSet<usize> = pending
            .iter()
            .enumerate()
            .filter(|(_, n)| **n == 0)
            .map(|(i, _)| i)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(i) = ready.pop_first() {
            order.push(self.nodes[i].id.as_str());
            for &d in &dependents[i] {
                pending[d] -= 1;
                if pending[d] == 0 {
                    ready.insert(d);
                }
            }
        }

        if order.len() != self.nodes.len() {
            return Err(SynthError::GraphError(format!(
                "dependency cycle among {} node(s)",
                self.nodes.len() - order.len()
            )));
        }
        Ok(order)
    }

    /// Check structural invariants of a finished graph.
    ///
    /// Every edge must point backwards in build order, and every subnet must
    /// carry exactly one ACL association and one route table association,
    /// both matching its tier.
    pub fn validate(&self) -> Result<()> {
        for edge in &self.edges {
            if self.position(&edge.to)? >= self.position(&edge.from)? {
                return Err(SynthError::GraphError(format!(
                    "edge {} -{}-> {} is out of order",
                    edge.from, edge.relation, edge.to
                )));
            }
        }

        for subnet in self.nodes_of_kind(ResourceKind::Subnet) {
            let tier = subnet.resource.tier();
            for (assoc_kind, target_kind) in [
                (
                    ResourceKind::SubnetNetworkAclAssociation,
                    ResourceKind::NetworkAcl,
                ),
                (
                    ResourceKind::SubnetRouteTableAssociation,
                    ResourceKind::RouteTable,
                ),
            ] {
                let targets = self.associated(&subnet.id, assoc_kind, target_kind);
                if targets.len() != 1 {
                    return Err(SynthError::GraphError(format!(
                        "subnet '{}' has {} {} association(s), expected 1",
                        subnet.id,
                        targets.len(),
                        target_kind
                    )));
                }
                if targets[0].resource.tier() != tier {
                    return Err(SynthError::GraphError(format!(
                        "subnet '{}' is associated with {} '{}' of another tier",
                        subnet.id, target_kind, targets[0].id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Nodes of `target_kind` linked to `subnet_id` through an association node
    /// of `assoc_kind`.
    pub fn associated(
        &self,
        subnet_id: &str,
        assoc_kind: ResourceKind,
        target_kind: ResourceKind,
    ) -> Vec<&Node> {
        self.edges_to(subnet_id)
            .filter(|e| e.relation == RelationKind::AssociatedWith)
            .filter_map(|e| self.node(&e.from))
            .filter(|assoc| assoc.kind() == assoc_kind)
            .flat_map(|assoc| {
                self.edges_from(&assoc.id)
                    .filter(|e| e.relation == RelationKind::AssociatedWith)
                    .filter_map(|e| self.node(&e.to))
                    .filter(|n| n.kind() == target_kind)
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn igw(id: &str) -> Node {
        Node::new(id, None, Resource::InternetGateway)
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut g = ResourceGraph::new();
        g.add_node(igw("igw")).unwrap();
        assert!(matches!(
            g.add_node(igw("igw")),
            Err(SynthError::GraphError(_))
        ));
    }

    #[test]
    fn test_edge_must_point_backwards() {
        let mut g = ResourceGraph::new();
        g.add_node(igw("a")).unwrap();
        g.add_node(igw("b")).unwrap();
        g.add_edge("b", "a", RelationKind::DependsOn).unwrap();
        assert!(g.add_edge("a", "b", RelationKind::DependsOn).is_err());
        assert!(g.add_edge("a", "missing", RelationKind::DependsOn).is_err());
        assert_eq!(g.edges().len(), 1);
    }

    #[test]
    fn test_dependency_order_ties_follow_build_order() {
        let mut g = ResourceGraph::new();
        for id in ["a", "b", "c", "d"] {
            g.add_node(igw(id)).unwrap();
        }
        g.add_edge("d", "a", RelationKind::DependsOn).unwrap();
        g.add_edge("c", "b", RelationKind::AttachedTo).unwrap();
        assert_eq!(g.dependency_order().unwrap(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_export_requires_node() {
        let mut g = ResourceGraph::new();
        assert!(g.add_export("x".to_string(), "igw").is_err());
        g.add_node(igw("igw")).unwrap();
        g.add_export("x".to_string(), "igw").unwrap();
        assert_eq!(g.exports()[0].node_id, "igw");
    }

    #[test]
    fn test_rule_action_is_allow_only() {
        assert_eq!(serde_json::to_string(&RuleAction::Allow).unwrap(), "\"allow\"");
        assert!(serde_json::from_str::<RuleAction>("\"deny\"").is_err());
    }

    #[test]
    fn test_node_json_shape() {
        let node = Node::new(
            "rtb-public",
            Some("demo-route-table-public-subnets".to_string()),
            Resource::RouteTable { tier: Tier::Public },
        );
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(
            json,
            r#"{"id":"rtb-public","name":"demo-route-table-public-subnets","kind":"RouteTable","tier":"public"}"#
        );
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}
