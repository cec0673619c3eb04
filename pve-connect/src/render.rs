//! Inventory table output.

use tabled::{Table, Tabled};

use crate::inventory::{Inventory, Resource};

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Resource> for ResourceRow {
    fn from(resource: &Resource) -> Self {
        Self {
            id: resource.id,
            kind: resource.kind.to_string(),
            name: if resource.name.is_empty() {
                "-".to_string()
            } else {
                resource.name.clone()
            },
            status: resource.status.clone(),
        }
    }
}

/// Render the combined VM/container table.
pub fn render_table(inventory: &Inventory) -> String {
    if inventory.is_empty() {
        return "No VMs or containers found".to_string();
    }

    let rows: Vec<ResourceRow> = inventory.iter().map(ResourceRow::from).collect();
    Table::new(rows).to_string()
}
