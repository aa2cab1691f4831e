//! Namespace, link, shaping and routing setup for the emulated network.
//!
//! Every step is first turned into a plan of shell commands, grouped under
//! a heading, then handed to a `CommandRunner`. Plans are pure so they can
//! be inspected without root.

use super::config::{Endpoint, LinkSpec, NetemSpec, RouteSpec, TestbedConfig};
use super::runner::CommandRunner;
use crate::utils::config::RT_TABLES_PATH;
use crate::utils::error::CommandError;
use log::info;
use std::fmt;
use std::str::FromStr;

/// Commands issued under a common heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandGroup {
    pub title: String,
    pub commands: Vec<String>,
}

impl CommandGroup {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            commands: Vec::new(),
        }
    }

    fn push(&mut self, command: impl Into<String>) {
        self.commands.push(command.into());
    }
}

/// Selectable stage of the setup command
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SetupStep {
    Topology,
    Routes,
    Clean,
}

impl SetupStep {
    /// Steps run when none are named
    pub const DEFAULT: [SetupStep; 2] = [SetupStep::Topology, SetupStep::Routes];
}

impl FromStr for SetupStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" | "topo" => Ok(SetupStep::Topology),
            "2" | "route" => Ok(SetupStep::Routes),
            "3" | "clean" => Ok(SetupStep::Clean),
            other => Err(format!(
                "unknown step '{}' (expected 1/topo, 2/route or 3/clean)",
                other
            )),
        }
    }
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SetupStep::Topology => "topo",
            SetupStep::Routes => "route",
            SetupStep::Clean => "clean",
        };
        write!(f, "{}", name)
    }
}

/// Prefix a command so it runs inside a namespace
pub fn in_namespace(namespace: &str, command: &str) -> String {
    format!("ip netns exec {} {}", namespace, command)
}

/// Host sysctls, namespaces, veth links and netem shaping
pub fn topology_plan(config: &TestbedConfig) -> Vec<CommandGroup> {
    let mut groups = Vec::new();

    let mut host = CommandGroup::new("Spawning new nodes");
    for sysctl in &config.host_sysctls {
        host.push(format!("sysctl -w {}='{}'", sysctl.key, sysctl.value));
    }
    groups.push(host);

    for ns in &config.namespaces {
        let mut group = CommandGroup::new(format!("Creating namespace: {}", ns.name));
        group.push(format!("ip netns add {}", ns.name));
        group.push(in_namespace(&ns.name, "ip link set dev lo up"));
        if ns.ip_forward {
            group.push(in_namespace(&ns.name, "sysctl -w net.ipv4.ip_forward=1"));
        }
        groups.push(group);
    }

    for link in &config.links {
        groups.push(link_group(link));
    }

    let mut shaping = CommandGroup::new("Setting up TC-Netem on interfaces");
    for link in &config.links {
        if let Some(netem) = &link.netem {
            for end in [&link.local, &link.peer] {
                shaping.push(in_namespace(
                    &end.namespace,
                    &format!(
                        "tc qdisc replace dev {} root netem {}",
                        end.interface,
                        netem_args(netem)
                    ),
                ));
            }
        }
    }
    if !shaping.commands.is_empty() {
        groups.push(shaping);
    }

    groups
}

fn link_group(link: &LinkSpec) -> CommandGroup {
    let (local, peer) = (&link.local, &link.peer);
    let mut group = CommandGroup::new(format!(
        "Creating intf: {} (in {})",
        local.interface, local.namespace
    ));

    group.push(format!(
        "ip link add {} type veth peer name {}",
        local.interface, peer.interface
    ));
    for end in [local, peer] {
        group.push(format!("ip link set {} netns {}", end.interface, end.namespace));
    }
    for end in [local, peer] {
        configure_endpoint(&mut group, end, link.prefix_len);
    }
    group
}

fn configure_endpoint(group: &mut CommandGroup, end: &Endpoint, prefix_len: u8) {
    group.push(in_namespace(
        &end.namespace,
        &format!("ip addr add {}/{} dev {}", end.address, prefix_len, end.interface),
    ));
    if let Some(mac) = &end.mac {
        group.push(in_namespace(
            &end.namespace,
            &format!("ip link set dev {} address {}", end.interface, mac),
        ));
    }
    group.push(in_namespace(
        &end.namespace,
        &format!("ip link set dev {} up", end.interface),
    ));
}

/// Render netem options in a fixed order: rate, delay, limit, loss
pub fn netem_args(netem: &NetemSpec) -> String {
    let mut args = Vec::new();
    if let Some(rate) = &netem.rate {
        args.push(format!("rate {}", rate));
    }
    if let Some(delay) = &netem.delay {
        args.push(format!("delay {}", delay));
    }
    if let Some(limit) = netem.limit {
        args.push(format!("limit {}", limit));
    }
    if let Some(loss) = netem.loss_percent {
        args.push(format!("loss {}%", loss));
    }
    args.join(" ")
}

/// Routing table registration, neighbor entries and static routes
pub fn route_plan(config: &TestbedConfig) -> Vec<CommandGroup> {
    let mut group = CommandGroup::new("Spawning new routing");

    if let Some(table) = &config.route_table {
        group.push(format!(
            "echo '{} {}' >> {}",
            table.id, table.name, RT_TABLES_PATH
        ));
    }
    for route in &config.routes {
        push_route(&mut group, route);
    }

    vec![group]
}

fn push_route(group: &mut CommandGroup, route: &RouteSpec) {
    if let Some(neighbor) = &route.neighbor {
        group.push(in_namespace(
            &route.namespace,
            &format!(
                "ip neigh replace {} lladdr {} dev {} nud permanent",
                neighbor.address, neighbor.mac, route.interface
            ),
        ));
    }
    let via = route
        .gateway
        .as_ref()
        .map(|gw| format!(" via {}", gw))
        .unwrap_or_default();
    group.push(in_namespace(
        &route.namespace,
        &format!("ip route add {}{} dev {}", route.destination, via, route.interface),
    ));
}

/// Delete every namespace; veth ends vanish with them
pub fn teardown_plan(config: &TestbedConfig) -> Vec<CommandGroup> {
    let mut group = CommandGroup::new("Deleting nodes");
    for ns in &config.namespaces {
        group.push(format!("ip netns del {}", ns.name));
    }
    vec![group]
}

/// Hand every command of a plan to the runner, in order
pub fn run_plan(
    runner: &mut dyn CommandRunner,
    plan: &[CommandGroup],
) -> Result<usize, CommandError> {
    let mut count = 0;
    for group in plan {
        info!("*** {}", group.title);
        for command in &group.commands {
            runner.execute(command)?;
            count += 1;
        }
    }
    Ok(count)
}

pub fn setup_topology(
    runner: &mut dyn CommandRunner,
    config: &TestbedConfig,
) -> Result<usize, CommandError> {
    run_plan(runner, &topology_plan(config))
}

pub fn setup_routes(
    runner: &mut dyn CommandRunner,
    config: &TestbedConfig,
) -> Result<usize, CommandError> {
    run_plan(runner, &route_plan(config))
}

pub fn teardown(
    runner: &mut dyn CommandRunner,
    config: &TestbedConfig,
) -> Result<usize, CommandError> {
    run_plan(runner, &teardown_plan(config))
}

/// Run the selected steps in their fixed order, each at most once
///
/// Returns the number of commands issued.
pub fn run_steps(
    runner: &mut dyn CommandRunner,
    config: &TestbedConfig,
    steps: &[SetupStep],
) -> Result<usize, CommandError> {
    let mut ordered = steps.to_vec();
    ordered.sort();
    ordered.dedup();

    let mut count = 0;
    for step in ordered {
        info!("Running setup step: {}", step);
        count += match step {
            SetupStep::Topology => setup_topology(runner, config)?,
            SetupStep::Routes => setup_routes(runner, config)?,
            SetupStep::Clean => teardown(runner, config)?,
        };
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testbed::runner::DryRunRunner;

    #[test]
    fn test_step_parsing() {
        assert_eq!("1".parse::<SetupStep>().unwrap(), SetupStep::Topology);
        assert_eq!("topo".parse::<SetupStep>().unwrap(), SetupStep::Topology);
        assert_eq!("2".parse::<SetupStep>().unwrap(), SetupStep::Routes);
        assert_eq!("route".parse::<SetupStep>().unwrap(), SetupStep::Routes);
        assert_eq!("3".parse::<SetupStep>().unwrap(), SetupStep::Clean);
        assert_eq!("clean".parse::<SetupStep>().unwrap(), SetupStep::Clean);
        assert!("4".parse::<SetupStep>().is_err());
    }

    #[test]
    fn test_netem_args() {
        let netem = NetemSpec {
            rate: Some("10mbit".to_string()),
            delay: Some("10ms".to_string()),
            limit: Some(500),
            loss_percent: Some(0.5),
        };
        assert_eq!(netem_args(&netem), "rate 10mbit delay 10ms limit 500 loss 0.5%");

        let delay_only = NetemSpec {
            rate: None,
            delay: Some("30ms".to_string()),
            limit: None,
            loss_percent: None,
        };
        assert_eq!(netem_args(&delay_only), "delay 30ms");
    }

    #[test]
    fn test_link_group_commands() {
        let config = TestbedConfig::default();
        let group = link_group(&config.links[0]);
        assert_eq!(
            group.commands,
            vec![
                "ip link add h1-dev-r1 type veth peer name r1-dev-h1",
                "ip link set h1-dev-r1 netns emu-h1",
                "ip link set r1-dev-h1 netns emu-r1",
                "ip netns exec emu-h1 ip addr add 10.0.10.1/24 dev h1-dev-r1",
                "ip netns exec emu-h1 ip link set dev h1-dev-r1 address 00:00:10:00:10:01",
                "ip netns exec emu-h1 ip link set dev h1-dev-r1 up",
                "ip netns exec emu-r1 ip addr add 10.0.10.2/24 dev r1-dev-h1",
                "ip netns exec emu-r1 ip link set dev r1-dev-h1 address 00:00:10:00:10:02",
                "ip netns exec emu-r1 ip link set dev r1-dev-h1 up",
            ]
        );
    }

    #[test]
    fn test_route_without_gateway_or_neighbor() {
        let mut group = CommandGroup::new("routes");
        push_route(
            &mut group,
            &RouteSpec {
                namespace: "ns".to_string(),
                interface: "eth0".to_string(),
                destination: "10.9.0.0/16".to_string(),
                gateway: None,
                neighbor: None,
            },
        );
        assert_eq!(
            group.commands,
            vec!["ip netns exec ns ip route add 10.9.0.0/16 dev eth0"]
        );
    }

    #[test]
    fn test_run_steps_fixed_order_and_dedup() {
        let config = TestbedConfig::default();
        let mut runner = DryRunRunner::new();
        let count = run_steps(
            &mut runner,
            &config,
            &[SetupStep::Clean, SetupStep::Clean, SetupStep::Routes],
        )
        .unwrap();

        let commands = runner.commands();
        assert_eq!(count, commands.len());
        // routes first, then four namespace deletions
        assert!(commands[0].starts_with("echo '200 RT_TABLE_DELIM'"));
        assert_eq!(commands[commands.len() - 4..], [
            "ip netns del emu-h1",
            "ip netns del emu-r1",
            "ip netns del emu-h2",
            "ip netns del emu-h3",
        ]);
    }
}
