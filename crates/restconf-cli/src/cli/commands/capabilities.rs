//! `restconf capabilities` – show the discovered root and capability list.

use anyhow::{Context, Result};
use restconf_core::Client;

pub fn run_capabilities(client: &Client) -> Result<()> {
    client
        .ensure_discovered()
        .with_context(|| format!("discovering RESTCONF root of {}", client.base_url()))?;
    println!("root: {}", client.endpoint().unwrap_or_default());
    println!("yang-patch: {}", client.has_yang_patch());
    let caps = client.capabilities();
    if caps.is_empty() {
        println!("No capabilities advertised.");
    }
    for cap in caps.as_slice() {
        println!("{cap}");
    }
    Ok(())
}
