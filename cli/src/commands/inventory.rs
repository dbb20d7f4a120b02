use std::io::Write;

use edgeinv_core::example;
use edgeinv_core::pipeline::InventoryService;
use serde_json::{Map, Value};
use tracing::info;

use crate::terminal::print;

/// Runs discovery and writes the document to `out`. Nothing is written when
/// discovery fails.
pub async fn list(service: &InventoryService, out: impl Write, pretty: bool) -> anyhow::Result<()> {
    let document = service.build_inventory().await?;
    print::document(out, &document, pretty)
}

/// Host variables are already delivered through `_meta`.
pub fn host(name: &str, out: impl Write, pretty: bool) -> anyhow::Result<()> {
    info!("Variables for {name} are served through _meta.hostvars");
    print::document(out, &Value::Object(Map::new()), pretty)
}

pub fn example(out: impl Write, pretty: bool) -> anyhow::Result<()> {
    print::document(out, &example::example_inventory(), pretty)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
