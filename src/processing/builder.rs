//! Resource graph construction.
//!
//! Builds the VPC, subnets, gateways, ACLs, route tables and routes in
//! dependency order. Every edge added here points at a node that already
//! exists, so build order doubles as emission order.

use super::allocator::AZ_COUNT;
use super::mode::TopologyMode;
use crate::error::{Result, SynthError};
use crate::models::{
    Node, RelationKind, Resource, ResourceGraph, RouteTarget, RuleAction, Subnet, SubnetPlan,
    Tier, ACL_RULE_NUMBER, DEFAULT_ROUTE,
};

const VPC_ID: &str = "vpc";
const IGW_ID: &str = "igw";
const IGW_ATTACHMENT_ID: &str = "igw-attachment";
const DHCP_ID: &str = "dhcp";
const DHCP_ASSOCIATION_ID: &str = "dhcp-association";
const EIP_ID: &str = "eip-nat";
const NAT_ID: &str = "nat";
const API_ENDPOINT_ID: &str = "vpce-execute-api";

/// DNS servers handed out by the DHCP options set.
pub const AMAZON_PROVIDED_DNS: &str = "AmazonProvidedDNS";

/// Service the optional interface endpoint connects to.
pub const API_ENDPOINT_SERVICE: &str = "execute-api";

/// Optional extras on top of the base topology.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Domain name for a DHCP options set; `None` skips DHCP options.
    pub dhcp_domain: Option<String>,
    /// Add an interface endpoint for the API gateway service in the private tier.
    pub api_endpoint: bool,
}

pub fn subnet_id(tier: Tier, az_index: usize) -> String {
    format!("subnet-{tier}-{az_index}")
}

pub fn acl_id(tier: Tier) -> String {
    format!("acl-{tier}")
}

pub fn route_table_id(tier: Tier) -> String {
    format!("rtb-{tier}")
}

pub fn default_route_id(tier: Tier) -> String {
    format!("route-{tier}-default")
}

/// Build the graph for `plan` with no optional extras.
pub fn build(plan: &SubnetPlan, mode: TopologyMode, name_prefix: &str) -> Result<ResourceGraph> {
    build_with(plan, mode, name_prefix, &BuildOptions::default())
}

/// Build the graph for `plan` in the given mode.
pub fn build_with(
    plan: &SubnetPlan,
    mode: TopologyMode,
    name_prefix: &str,
    options: &BuildOptions,
) -> Result<ResourceGraph> {
    check_plan(plan)?;
    log::debug!("build graph '{name_prefix}' mode={mode} options={options:?}");

    let mut b = GraphBuilder {
        graph: ResourceGraph::new(),
        prefix: name_prefix,
    };

    b.vpc(plan)?;
    for subnet in plan.iter() {
        b.subnet(subnet)?;
    }
    b.internet_gateway()?;
    if let Some(domain) = &options.dhcp_domain {
        b.dhcp_options(domain)?;
    }
    for tier in Tier::ALL {
        b.network_acl(tier, plan.tier(tier))?;
    }
    for tier in Tier::ALL {
        b.route_table(tier, plan.tier(tier))?;
    }
    b.public_default_route()?;
    match mode {
        TopologyMode::NatRouted => b.nat_gateway()?,
        TopologyMode::Isolated => {
            log::debug!("isolated mode: private tier gets no default route")
        }
    }
    if options.api_endpoint {
        b.api_endpoint(&plan.private)?;
    }

    let vpc_export = b.name("vpc");
    b.graph.add_export(vpc_export, VPC_ID)?;
    Ok(b.graph)
}

/// Reject plans that break the per-tier layout the graph relies on.
fn check_plan(plan: &SubnetPlan) -> Result<()> {
    for tier in Tier::ALL {
        let subnets = plan.tier(tier);
        if subnets.len() != AZ_COUNT {
            return Err(SynthError::InsufficientBlocksError {
                tier,
                available: subnets.len(),
                required: AZ_COUNT,
            });
        }
        for (i, s) in subnets.iter().enumerate() {
            if s.tier != tier || s.az_index != i {
                return Err(SynthError::GraphError(format!(
                    "subnet {s} is out of place in the {tier} tier at position {i}"
                )));
            }
            if !plan.vpc_block.contains_block(&s.block) {
                return Err(SynthError::GraphError(format!(
                    "subnet {s} lies outside {}",
                    plan.vpc_block
                )));
            }
            if let Some(other) = subnets[..i].iter().find(|o| o.block.overlaps(&s.block)) {
                return Err(SynthError::GraphError(format!(
                    "subnet {s} overlaps {other}"
                )));
            }
        }
    }
    Ok(())
}

struct GraphBuilder<'a> {
    graph: ResourceGraph,
    prefix: &'a str,
}

impl GraphBuilder<'_> {
    fn name(&self, suffix: &str) -> String {
        format!("{}-{suffix}", self.prefix)
    }

    fn add(&mut self, id: &str, name: Option<String>, resource: Resource) -> Result<()> {
        self.graph.add_node(Node::new(id, name, resource))
    }

    fn edge(&mut self, from: &str, to: &str, relation: RelationKind) -> Result<()> {
        self.graph.add_edge(from, to, relation)
    }

    fn vpc(&mut self, plan: &SubnetPlan) -> Result<()> {
        let name = self.name("vpc");
        self.add(
            VPC_ID,
            Some(name),
            Resource::Vpc {
                cidr_block: plan.vpc_block,
                enable_dns_hostnames: true,
                enable_dns_support: true,
            },
        )
    }

    fn subnet(&mut self, subnet: &Subnet) -> Result<()> {
        let id = subnet_id(subnet.tier, subnet.az_index);
        let name = self.name(&format!("subnet-{}{}", subnet.tier, subnet.az_index + 1));
        self.add(
            &id,
            Some(name),
            Resource::Subnet {
                tier: subnet.tier,
                az_index: subnet.az_index,
                cidr_block: subnet.block,
                map_public_ip_on_launch: subnet.map_public_ip_on_launch,
            },
        )?;
        self.edge(&id, VPC_ID, RelationKind::AttachedTo)
    }

    fn internet_gateway(&mut self) -> Result<()> {
        let name = self.name("internet-gateway");
        self.add(IGW_ID, Some(name), Resource::InternetGateway)?;
        self.add(IGW_ATTACHMENT_ID, None, Resource::GatewayAttachment)?;
        self.edge(IGW_ATTACHMENT_ID, VPC_ID, RelationKind::AttachedTo)?;
        self.edge(IGW_ATTACHMENT_ID, IGW_ID, RelationKind::AttachedTo)
    }

    fn dhcp_options(&mut self, domain: &str) -> Result<()> {
        let name = self.name("dhcp");
        self.add(
            DHCP_ID,
            Some(name),
            Resource::DhcpOptions {
                domain_name: domain.to_string(),
                domain_name_servers: vec![AMAZON_PROVIDED_DNS.to_string()],
            },
        )?;
        self.add(DHCP_ASSOCIATION_ID, None, Resource::DhcpOptionsAssociation)?;
        self.edge(DHCP_ASSOCIATION_ID, VPC_ID, RelationKind::AssociatedWith)?;
        self.edge(DHCP_ASSOCIATION_ID, DHCP_ID, RelationKind::AssociatedWith)
    }

    fn network_acl(&mut self, tier: Tier, subnets: &[Subnet]) -> Result<()> {
        let acl = acl_id(tier);
        let name = self.name(&format!("acl-{tier}-subnets"));
        self.add(&acl, Some(name), Resource::NetworkAcl { tier })?;
        self.edge(&acl, VPC_ID, RelationKind::AttachedTo)?;

        for (direction, egress) in [("ingress", false), ("egress", true)] {
            let entry = format!("{acl}-{direction}");
            self.add(
                &entry,
                None,
                Resource::NetworkAclEntry {
                    rule_number: ACL_RULE_NUMBER,
                    protocol: -1,
                    rule_action: RuleAction::Allow,
                    cidr_block: DEFAULT_ROUTE,
                    egress,
                },
            )?;
            self.edge(&entry, &acl, RelationKind::AttachedTo)?;
        }

        for s in subnets {
            let assoc = format!("{acl}-assoc-{}", s.az_index);
            self.add(&assoc, None, Resource::SubnetNetworkAclAssociation)?;
            self.edge(&assoc, &subnet_id(tier, s.az_index), RelationKind::AssociatedWith)?;
            self.edge(&assoc, &acl, RelationKind::AssociatedWith)?;
        }
        Ok(())
    }

    fn route_table(&mut self, tier: Tier, subnets: &[Subnet]) -> Result<()> {
        let rtb = route_table_id(tier);
        let name = self.name(&format!("route-table-{tier}-subnets"));
        self.add(&rtb, Some(name), Resource::RouteTable { tier })?;
        self.edge(&rtb, VPC_ID, RelationKind::AttachedTo)?;

        for s in subnets {
            let assoc = format!("{rtb}-assoc-{}", s.az_index);
            self.add(&assoc, None, Resource::SubnetRouteTableAssociation)?;
            self.edge(&assoc, &subnet_id(tier, s.az_index), RelationKind::AssociatedWith)?;
            self.edge(&assoc, &rtb, RelationKind::AssociatedWith)?;
        }
        Ok(())
    }

    fn default_route(&mut self, tier: Tier, target: RouteTarget) -> Result<String> {
        let id = default_route_id(tier);
        let gateway = target.node_id().to_string();
        self.add(
            &id,
            None,
            Resource::Route {
                destination_cidr_block: DEFAULT_ROUTE,
                target,
            },
        )?;
        self.edge(&id, &route_table_id(tier), RelationKind::AttachedTo)?;
        self.edge(&id, &gateway, RelationKind::RoutesVia)?;
        Ok(id)
    }

    fn public_default_route(&mut self) -> Result<()> {
        let id = self.default_route(
            Tier::Public,
            RouteTarget::InternetGateway(IGW_ID.to_string()),
        )?;
        // the gateway is only usable once attached
        self.edge(&id, IGW_ATTACHMENT_ID, RelationKind::DependsOn)
    }

    fn nat_gateway(&mut self) -> Result<()> {
        self.add(
            EIP_ID,
            None,
            Resource::ElasticIp {
                domain: "vpc".to_string(),
            },
        )?;

        let name = self.name("gw-nat");
        self.add(NAT_ID, Some(name), Resource::NatGateway)?;
        self.edge(NAT_ID, EIP_ID, RelationKind::DependsOn)?;
        self.edge(NAT_ID, &subnet_id(Tier::Public, 0), RelationKind::AttachedTo)?;
        self.edge(NAT_ID, IGW_ID, RelationKind::DependsOn)?;

        self.default_route(Tier::Private, RouteTarget::NatGateway(NAT_ID.to_string()))?;
        Ok(())
    }

    fn api_endpoint(&mut self, private: &[Subnet]) -> Result<()> {
        self.add(
            API_ENDPOINT_ID,
            None,
            Resource::VpcEndpoint {
                service: API_ENDPOINT_SERVICE.to_string(),
                endpoint_type: "Interface".to_string(),
            },
        )?;
        self.edge(API_ENDPOINT_ID, VPC_ID, RelationKind::AttachedTo)?;
        for s in private {
            self.edge(
                API_ENDPOINT_ID,
                &subnet_id(Tier::Private, s.az_index),
                RelationKind::AttachedTo,
            )?;
        }
        let export = self.name("vpc-api-endpoint");
        self.graph.add_export(export, API_ENDPOINT_ID)
    }
}
