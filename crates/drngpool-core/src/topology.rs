//! Memory-domain topology supplied by the host.

/// Answers which domains exist and which of them are active.
pub trait DomainTopology: Send + Sync {
    /// Number of domain ids, active or not. Slots are indexed `0..count`.
    fn domain_count(&self) -> usize;

    /// Whether `domain` is active.
    fn is_active(&self, domain: usize) -> bool;

    /// Active domain ids in ascending order.
    fn active_domains(&self) -> Vec<usize> {
        (0..self.domain_count())
            .filter(|&d| self.is_active(d))
            .collect()
    }
}

/// Fixed topology, mostly for hosts that know their layout up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticTopology {
    active: Vec<bool>,
}

impl StaticTopology {
    /// `count` domains, all active. At least one domain always exists.
    pub fn new(count: usize) -> Self {
        Self {
            active: vec![true; count.max(1)],
        }
    }

    /// `count` domains with the listed ids inactive.
    pub fn with_inactive(count: usize, inactive: &[usize]) -> Self {
        let mut topology = Self::new(count);
        for &d in inactive {
            if let Some(slot) = topology.active.get_mut(d) {
                *slot = false;
            }
        }
        topology
    }
}

impl DomainTopology for StaticTopology {
    fn domain_count(&self) -> usize {
        self.active.len()
    }

    fn is_active(&self, domain: usize) -> bool {
        self.active.get(domain).copied().unwrap_or(false)
    }
}

/// NUMA nodes of the running machine.
///
/// On Linux this reads the `possible` and `online` node lists under
/// `/sys/devices/system/node`. Elsewhere, or when sysfs is unreadable, the
/// machine is treated as a single domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTopology {
    count: usize,
    online: Vec<usize>,
}

impl SystemTopology {
    pub fn detect() -> Self {
        let possible = read_node_list("possible");
        let online = read_node_list("online");
        match (possible, online) {
            (Some(possible), Some(online)) if !online.is_empty() => {
                let count = possible
                    .iter()
                    .chain(online.iter())
                    .max()
                    .map_or(1, |&max| max + 1);
                Self { count, online }
            }
            _ => Self {
                count: 1,
                online: vec![0],
            },
        }
    }
}

impl DomainTopology for SystemTopology {
    fn domain_count(&self) -> usize {
        self.count
    }

    fn is_active(&self, domain: usize) -> bool {
        self.online.binary_search(&domain).is_ok()
    }
}

#[cfg(target_os = "linux")]
fn read_node_list(which: &str) -> Option<Vec<usize>> {
    let path = format!("/sys/devices/system/node/{which}");
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| parse_node_list(&s))
}

#[cfg(not(target_os = "linux"))]
fn read_node_list(_which: &str) -> Option<Vec<usize>> {
    None
}

/// Parse a kernel node list such as `0-3,5` into sorted, deduplicated ids.
pub fn parse_node_list(list: &str) -> Option<Vec<usize>> {
    let mut ids = Vec::new();
    for part in list.trim().split(',').filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((lo, hi)) => {
                let lo: usize = lo.trim().parse().ok()?;
                let hi: usize = hi.trim().parse().ok()?;
                if lo > hi {
                    return None;
                }
                ids.extend(lo..=hi);
            }
            None => ids.push(part.trim().parse().ok()?),
        }
    }
    ids.sort_unstable();
    ids.dedup();
    Some(ids)
}
