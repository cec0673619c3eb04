//! VM and container inventory parsed from `qm list` / `pct list`.

use std::fmt;

use tracing::debug;

/// Kind of guest managed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Vm,
    Container,
}

impl ResourceKind {
    /// Column layout of this kind's listing command.
    pub fn layout(self) -> ListingLayout {
        match self {
            ResourceKind::Vm => VM_LAYOUT,
            ResourceKind::Container => CONTAINER_LAYOUT,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Vm => write!(f, "VM"),
            ResourceKind::Container => write!(f, "CT"),
        }
    }
}

/// A VM or container as listed by the host tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: u32,
    pub kind: ResourceKind,
    pub name: String,
    pub status: String,
}

/// Where a field sits in a whitespace-split listing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Fixed field index.
    At(usize),
    /// Last field, provided the line has more than `n` fields.
    LastAfter(usize),
}

impl Column {
    fn pick<'a>(self, fields: &[&'a str]) -> Option<&'a str> {
        match self {
            Column::At(idx) => fields.get(idx).copied(),
            Column::LastAfter(n) if fields.len() > n => fields.last().copied(),
            Column::LastAfter(_) => None,
        }
    }
}

/// Named-field mapping for one listing command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingLayout {
    pub id: Column,
    pub name: Column,
    pub status: Column,
}

/// `qm list`: `VMID NAME STATUS MEM(MB) BOOTDISK(GB) PID`
pub const VM_LAYOUT: ListingLayout = ListingLayout {
    id: Column::At(0),
    name: Column::At(1),
    status: Column::At(2),
};

/// `pct list`: `VMID Status Lock Name`. Lock is blank for unlocked
/// containers, so the name is whatever comes last.
pub const CONTAINER_LAYOUT: ListingLayout = ListingLayout {
    id: Column::At(0),
    name: Column::LastAfter(2),
    status: Column::At(1),
};

/// Parse a listing blob, skipping its header line.
pub fn parse_listing(kind: ResourceKind, output: &str) -> Vec<Resource> {
    let layout = kind.layout();

    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                return None;
            }

            let id = match layout.id.pick(&fields).map(str::parse::<u32>) {
                Some(Ok(id)) => id,
                _ => {
                    debug!(kind = %kind, line = %line, "Skipping unparseable listing line");
                    return None;
                }
            };

            Some(Resource {
                id,
                kind,
                name: layout.name.pick(&fields).unwrap_or("").to_string(),
                status: layout.status.pick(&fields).unwrap_or("").to_string(),
            })
        })
        .collect()
}

/// Everything the host reported, VMs first.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub vms: Vec<Resource>,
    pub containers: Vec<Resource>,
}

impl Inventory {
    pub fn from_listings(vm_output: &str, container_output: &str) -> Self {
        Self {
            vms: parse_listing(ResourceKind::Vm, vm_output),
            containers: parse_listing(ResourceKind::Container, container_output),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vms.is_empty() && self.containers.is_empty()
    }

    /// All resources in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.vms.iter().chain(self.containers.iter())
    }

    /// Classify an entered id. The VM list wins if both contain it.
    pub fn classify(&self, input: &str) -> Option<ResourceKind> {
        let matches = |r: &Resource| r.id.to_string() == input;

        if self.vms.iter().any(matches) {
            Some(ResourceKind::Vm)
        } else if self.containers.iter().any(matches) {
            Some(ResourceKind::Container)
        } else {
            None
        }
    }
}
