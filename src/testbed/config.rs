//! Testbed description loaded from TOML.
//!
//! `TestbedConfig::default()` is the stock emulation topology: three hosts
//! (`emu-h1`, `emu-h2`, `emu-h3`) hanging off one router (`emu-r1`), each
//! link shaped with netem.

use crate::utils::error::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestbedConfig {
    /// Host-wide kernel settings applied before any namespace exists
    #[serde(default)]
    pub host_sysctls: Vec<Sysctl>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_table: Option<RouteTable>,

    #[serde(default)]
    pub namespaces: Vec<NamespaceSpec>,

    #[serde(default)]
    pub links: Vec<LinkSpec>,

    #[serde(default)]
    pub routes: Vec<RouteSpec>,

    /// Named launch profiles for the `launch` command
    #[serde(default)]
    pub experiments: BTreeMap<String, ExperimentProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sysctl {
    pub key: String,
    pub value: String,
}

/// Entry appended to the iproute2 routing table list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteTable {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceSpec {
    pub name: String,

    #[serde(default = "default_true")]
    pub ip_forward: bool,
}

/// A veth pair connecting two namespaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    #[serde(default = "default_prefix_len")]
    pub prefix_len: u8,

    pub local: Endpoint,
    pub peer: Endpoint,

    /// Shaping applied to both ends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netem: Option<NetemSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub namespace: String,
    pub interface: String,
    pub address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
}

/// `tc netem` parameters, passed through verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetemSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_percent: Option<f64>,
}

/// Static route, optionally preceded by a permanent neighbor entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub namespace: String,
    pub interface: String,
    pub destination: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighbor: Option<NeighborSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborSpec {
    pub address: String,
    pub mac: String,
}

/// Packet captures and applications started together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentProfile {
    /// Captures are killed after this many seconds
    pub duration_secs: u64,

    /// Run detached commands in `xterm -hold` windows
    #[serde(default)]
    pub use_xterm: bool,

    /// Pause after each application launch
    #[serde(default)]
    pub stagger_ms: u64,

    /// Executed before anything else, e.g. a build script
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prebuild: Option<String>,

    #[serde(default)]
    pub captures: Vec<CaptureSpec>,

    #[serde(default)]
    pub apps: Vec<AppSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    pub interface: String,
    pub output: String,

    /// Flush each packet to the file as it arrives (`tcpdump -U`)
    #[serde(default)]
    pub packet_buffered: bool,
}

/// An application command line
///
/// `{ref_time}` (launch time, epoch seconds) and `{run_secs}` (profile
/// duration minus one second) in `command` are substituted at launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    pub command: String,

    /// Run to completion in this terminal instead of detaching
    #[serde(default)]
    pub foreground: bool,
}

fn default_true() -> bool {
    true
}

fn default_prefix_len() -> u8 {
    24
}

impl TestbedConfig {
    /// Load a config from a TOML file
    ///
    /// # Errors
    /// * `ConfigError::Io` - file cannot be read
    /// * `ConfigError::Parse` - invalid TOML or missing fields
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading testbed config: {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Load from a file when given, otherwise use the built-in topology
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn experiment(&self, name: &str) -> Result<&ExperimentProfile, ConfigError> {
        self.experiments
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
    }
}

impl Default for TestbedConfig {
    fn default() -> Self {
        let shaped = |delay: &str| NetemSpec {
            rate: Some("10mbit".to_string()),
            delay: Some(delay.to_string()),
            limit: Some(500),
            loss_percent: Some(0.0),
        };

        let mut experiments = BTreeMap::new();
        experiments.insert("emu".to_string(), emu_profile());
        experiments.insert("bulk".to_string(), bulk_profile());
        experiments.insert("local".to_string(), local_profile());

        Self {
            host_sysctls: vec![
                sysctl("net.ipv4.tcp_rmem", "16384 16777216 268435456"),
                sysctl("net.ipv4.tcp_wmem", "16384 16777216 268435456"),
                sysctl("net.ipv4.tcp_mem", "16384 16777216 268435456"),
                sysctl("net.ipv4.tcp_timestamps", "0"),
                sysctl("net.ipv4.tcp_congestion_control", "bbr"),
            ],
            route_table: Some(RouteTable {
                id: 200,
                name: "RT_TABLE_DELIM".to_string(),
            }),
            namespaces: ["emu-h1", "emu-r1", "emu-h2", "emu-h3"]
                .iter()
                .map(|name| NamespaceSpec {
                    name: name.to_string(),
                    ip_forward: true,
                })
                .collect(),
            links: vec![
                LinkSpec {
                    prefix_len: 24,
                    local: endpoint("emu-h1", "h1-dev-r1", "10.0.10.1", "00:00:10:00:10:01"),
                    peer: endpoint("emu-r1", "r1-dev-h1", "10.0.10.2", "00:00:10:00:10:02"),
                    netem: Some(shaped("10ms")),
                },
                LinkSpec {
                    prefix_len: 24,
                    local: endpoint("emu-r1", "r1-dev-h2", "10.0.20.1", "00:00:10:00:20:01"),
                    peer: endpoint("emu-h2", "h2-dev-r1", "10.0.20.2", "00:00:10:00:20:02"),
                    netem: Some(shaped("10ms")),
                },
                LinkSpec {
                    prefix_len: 24,
                    local: endpoint("emu-r1", "r1-dev-h3", "10.0.30.1", "00:00:10:00:30:01"),
                    peer: endpoint("emu-h3", "h3-dev-r1", "10.0.30.2", "00:00:10:00:30:02"),
                    netem: Some(shaped("30ms")),
                },
            ],
            routes: vec![
                route("emu-h1", "h1-dev-r1", "10.0.20.0/24", "10.0.10.1", "10.0.20.2", "00:00:10:00:10:02"),
                route("emu-h1", "h1-dev-r1", "10.0.30.0/24", "10.0.10.1", "10.0.30.2", "00:00:10:00:10:02"),
                route("emu-h2", "h2-dev-r1", "10.0.10.0/24", "10.0.20.2", "10.0.10.1", "00:00:10:00:20:01"),
                route("emu-h3", "h3-dev-r1", "10.0.10.0/24", "10.0.30.2", "10.0.10.1", "00:00:10:00:30:01"),
                route("emu-r1", "r1-dev-h1", "10.0.10.0/24", "10.0.10.2", "10.0.10.1", "00:00:10:00:10:01"),
                route("emu-r1", "r1-dev-h2", "10.0.20.0/24", "10.0.20.1", "10.0.20.2", "00:00:10:00:20:02"),
                route("emu-r1", "r1-dev-h3", "10.0.30.0/24", "10.0.30.1", "10.0.30.2", "00:00:10:00:30:02"),
            ],
            experiments,
        }
    }
}

fn sysctl(key: &str, value: &str) -> Sysctl {
    Sysctl {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn endpoint(namespace: &str, interface: &str, address: &str, mac: &str) -> Endpoint {
    Endpoint {
        namespace: namespace.to_string(),
        interface: interface.to_string(),
        address: address.to_string(),
        mac: Some(mac.to_string()),
    }
}

fn route(
    namespace: &str,
    interface: &str,
    destination: &str,
    gateway: &str,
    neighbor: &str,
    mac: &str,
) -> RouteSpec {
    RouteSpec {
        namespace: namespace.to_string(),
        interface: interface.to_string(),
        destination: destination.to_string(),
        gateway: Some(gateway.to_string()),
        neighbor: Some(NeighborSpec {
            address: neighbor.to_string(),
            mac: mac.to_string(),
        }),
    }
}

fn capture(namespace: Option<&str>, interface: &str, packet_buffered: bool) -> CaptureSpec {
    CaptureSpec {
        namespace: namespace.map(str::to_string),
        interface: interface.to_string(),
        output: format!("../{}.pcap", interface),
        packet_buffered,
    }
}

fn app(namespace: Option<&str>, command: &str, foreground: bool) -> AppSpec {
    AppSpec {
        namespace: namespace.map(str::to_string),
        command: command.to_string(),
        foreground,
    }
}

/// Server in emu-h2, client in emu-h1
fn emu_profile() -> ExperimentProfile {
    let binary = "../build/net_bulk_transfer/net_bulk";
    ExperimentProfile {
        duration_secs: 30,
        use_xterm: true,
        stagger_ms: 2000,
        prebuild: None,
        captures: vec![
            capture(Some("emu-h2"), "h2-dev-r1", true),
            capture(Some("emu-h1"), "h1-dev-r1", true),
        ],
        apps: vec![
            app(
                Some("emu-h2"),
                &format!("{} -s --prot 2 --error 0 --addr 10.0.10.1", binary),
                false,
            ),
            app(
                Some("emu-h1"),
                &format!("{} --prot 2 --error 0 --addr 10.0.20.2", binary),
                false,
            ),
        ],
    }
}

/// Raw TCP bulk transfer apps sharing a reference start time
fn bulk_profile() -> ExperimentProfile {
    ExperimentProfile {
        duration_secs: 10,
        use_xterm: true,
        stagger_ms: 1000,
        prebuild: Some("./compile".to_string()),
        captures: vec![
            capture(Some("emu-h2"), "h2-dev-r1", true),
            capture(Some("emu-h1"), "h1-dev-r1", true),
        ],
        apps: vec![
            app(Some("emu-h2"), "./app-tcp-rx {ref_time} bbr {run_secs} 21000 10.0.20.2", false),
            app(Some("emu-h1"), "./app-tcp-tx {ref_time} bbr {run_secs} 21000 10.0.20.2", false),
        ],
    }
}

/// Loopback run without namespaces; the client stays in the foreground
fn local_profile() -> ExperimentProfile {
    ExperimentProfile {
        duration_secs: 10,
        use_xterm: true,
        stagger_ms: 2000,
        prebuild: None,
        captures: vec![capture(None, "lo", false)],
        apps: vec![
            app(None, "../build/ndserver/nd_server", false),
            app(None, "../build/ndclient/nd_client", true),
        ],
    }
}
