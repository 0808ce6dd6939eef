// BMA Endpoint - Basic Merkled API descriptor parsing
//
// A peer advertises how to reach it with lines of the form:
//
//   BASIC_MERKLED_API [dns] [ipv4] [ipv6] port
//
// The first line of a peer's endpoint list that matches wins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Leading keyword of every BMA descriptor
pub const BMA_API: &str = "BASIC_MERKLED_API";

/// Port a BMA endpoint uses when none is given
pub const DEFAULT_BMA_PORT: u16 = 9101;

/// Optional host slots, in the order they appear on the line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Dns,
    Ipv4,
    Ipv6,
}

const SLOTS: [Slot; 3] = [Slot::Dns, Slot::Ipv4, Slot::Ipv6];

impl Slot {
    fn accepts(self, token: &str) -> bool {
        match self {
            Slot::Dns => is_dns_token(token),
            Slot::Ipv4 => is_ipv4_token(token),
            Slot::Ipv6 => is_ipv6_token(token),
        }
    }
}

/// `[a-z_][a-z0-9-_.]*`
fn is_dns_token(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
}

/// `[0-9.]+`
fn is_ipv4_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// `[0-9a-f:]+`
fn is_ipv6_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, 'a'..='f' | ':'))
}

/// `[0-9]+`
fn is_port_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

/// Connectivity info resolved from a BMA descriptor
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BmaEndpoint {
    dns: Option<String>,
    ipv4: Option<String>,
    ipv6: Option<String>,
    port: Option<u16>,
}

impl BmaEndpoint {
    /// Create an endpoint with no host and the default port
    pub fn new() -> Self {
        Self {
            port: Some(DEFAULT_BMA_PORT),
            ..Self::default()
        }
    }

    pub fn with_dns(mut self, dns: &str) -> Self {
        self.dns = Some(dns.to_string());
        self
    }

    pub fn with_ipv4(mut self, ipv4: &str) -> Self {
        self.ipv4 = Some(ipv4.to_string());
        self
    }

    pub fn with_ipv6(mut self, ipv6: &str) -> Self {
        self.ipv6 = Some(ipv6.to_string());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Parse a single descriptor line.
    ///
    /// Returns `None` when the line does not follow the grammar. Optional
    /// slots are tried earliest-first and a token only skips a slot when
    /// filling it would leave the rest of the line unmatched.
    pub fn parse(descriptor: &str) -> Option<Self> {
        let rest = descriptor.strip_prefix(BMA_API)?;
        let rest = rest.strip_prefix(' ')?;
        let tokens: Vec<&str> = rest.split(' ').collect();

        let (port_token, hosts) = tokens.split_last()?;
        if hosts.len() > SLOTS.len() || !is_port_token(port_token) {
            return None;
        }
        // A digit string too large for a TCP port still matches, but leaves
        // the endpoint without a usable port.
        let port: Option<u16> = port_token.parse().ok();

        let mut assigned: [Option<&str>; 3] = [None; 3];
        if !assign_slots(hosts, 0, &mut assigned) {
            return None;
        }

        let [dns, ipv4, ipv6] = assigned;
        Some(Self {
            dns: dns.map(str::to_string),
            ipv4: ipv4.map(str::to_string),
            ipv6: ipv6.map(str::to_string),
            port,
        })
    }

    /// Resolve the first matching descriptor of an ordered endpoint list
    pub fn resolve<S: AsRef<str>>(endpoints: &[S]) -> Option<Self> {
        endpoints.iter().find_map(|ep| Self::parse(ep.as_ref()))
    }

    pub fn dns(&self) -> Option<&str> {
        self.dns.as_deref()
    }

    pub fn ipv4(&self) -> Option<&str> {
        self.ipv4.as_deref()
    }

    pub fn ipv6(&self) -> Option<&str> {
        self.ipv6.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Preferred host: ipv6, then ipv4, then dns, else empty
    pub fn host(&self) -> &str {
        self.ipv6()
            .or_else(|| self.ipv4())
            .or_else(|| self.dns())
            .unwrap_or("")
    }

    /// `host:port`, with an ipv6 host wrapped in brackets.
    ///
    /// Empty when either half is missing: no host at all, or a port that did
    /// not fit in a `u16`.
    pub fn url(&self) -> String {
        let Some(port) = self.port else {
            return String::new();
        };
        match (self.ipv6(), self.ipv4(), self.dns()) {
            (Some(ipv6), _, _) => format!("[{}]:{}", ipv6, port),
            (None, Some(ipv4), _) => format!("{}:{}", ipv4, port),
            (None, None, Some(dns)) => format!("{}:{}", dns, port),
            (None, None, None) => String::new(),
        }
    }

    pub fn is_reachable(&self) -> bool {
        !self.url().is_empty()
    }
}

/// Fill host slots from `slot` onward with `tokens`, preferring to fill a
/// slot over skipping it.
fn assign_slots<'a>(tokens: &[&'a str], slot: usize, out: &mut [Option<&'a str>; 3]) -> bool {
    let Some((first, rest)) = tokens.split_first() else {
        return true;
    };
    if SLOTS.len() - slot < tokens.len() {
        return false;
    }

    if SLOTS[slot].accepts(first) {
        out[slot] = Some(*first);
        if assign_slots(rest, slot + 1, out) {
            return true;
        }
        out[slot] = None;
    }
    assign_slots(tokens, slot + 1, out)
}

impl fmt::Display for BmaEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", BMA_API)?;
        for part in [self.dns(), self.ipv4(), self.ipv6()].into_iter().flatten() {
            write!(f, " {}", part)?;
        }
        write!(f, " {}", self.port.unwrap_or(DEFAULT_BMA_PORT))
    }
}
