//! CSV output formatting for resource graphs.

use crate::models::{Resource, ResourceGraph};
use colored::Colorize;
use itertools::Itertools;

use super::terminal::format_field;

/// One printable row per graph node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphPrintRow {
    /// Position in dependency order, 1-based.
    pub j: usize,
    pub id: String,
    pub kind: String,
    /// Name tag, "None" if untagged.
    pub name: String,
    /// Most relevant attribute of the resource (CIDR, tier, route target, ...).
    pub detail: String,
    /// Outgoing edges as `relation:target`, comma separated.
    pub needs: String,
}

/// Build the rows for `graph` in dependency order.
pub fn graph_rows(graph: &ResourceGraph) -> Vec<GraphPrintRow> {
    graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, node)| GraphPrintRow {
            j: i + 1,
            id: node.id.clone(),
            kind: node.kind().to_string(),
            name: node.name.clone().unwrap_or_else(|| "None".to_string()),
            detail: resource_detail(&node.resource),
            needs: graph
                .edges_from(&node.id)
                .map(|e| format!("{}:{}", e.relation, e.to))
                .join(","),
        })
        .collect()
}

fn resource_detail(resource: &Resource) -> String {
    match resource {
        Resource::Vpc { cidr_block, .. } => cidr_block.to_string(),
        Resource::Subnet {
            tier,
            az_index,
            cidr_block,
            ..
        } => format!("{cidr_block} {tier} az{az_index}"),
        Resource::NetworkAcl { tier } | Resource::RouteTable { tier } => tier.to_string(),
        Resource::NetworkAclEntry {
            rule_number,
            rule_action,
            egress,
            ..
        } => format!(
            "#{rule_number} {rule_action:?} {}",
            if *egress { "egress" } else { "ingress" }
        ),
        Resource::Route {
            destination_cidr_block,
            target,
        } => format!("{destination_cidr_block} -> {}", target.node_id()),
        Resource::ElasticIp { domain } => domain.clone(),
        Resource::DhcpOptions { domain_name, .. } => domain_name.clone(),
        Resource::VpcEndpoint { service, .. } => service.clone(),
        _ => String::new(),
    }
}

/// Print the graph as CSV to stdout.
pub fn graph_print(graph: &ResourceGraph) {
    log::info!(
        "#Start graph_print() nodes={} edges={}",
        graph.nodes().len(),
        graph.edges().len()
    );

    println!(
        r#" "cnt",                   "id",                 "kind",                             "name",                 "detail",  "needs""#
    );
    for row in graph_rows(graph) {
        print_csv_row(&row);
    }

    for export in graph.exports() {
        println!(
            "#{}# {} = {}",
            "EXPORT".on_blue(),
            export.name,
            export.node_id
        );
    }
}

fn print_csv_row(row: &GraphPrintRow) {
    println!(
        r#"{j},{id},{kind},{name},{detail},{needs}"#,
        j = format_field(row.j, 6),
        id = format_field(&row.id, 24),
        kind = format_field(&row.kind, 30),
        name = format_field(&row.name, 34),
        detail = format_field(&row.detail, 24),
        needs = format_field(&row.needs, 8),
    );
}
