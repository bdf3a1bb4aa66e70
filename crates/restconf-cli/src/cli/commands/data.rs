//! `restconf get|post|put|patch|delete` – one data operation.

use crate::cli::DataArgs;
use anyhow::{Context, Result};
use restconf_core::{Client, Method, Request, ResponseEnvelope};
use std::fs;
use std::time::Duration;

pub fn run_data(
    client: &Client,
    method: Method,
    args: &DataArgs,
    data: Option<&str>,
    wait: bool,
) -> Result<()> {
    let mut req = Request::new(method, args.path.as_str());
    if let Some(data) = data {
        req = req.body(load_payload(data)?);
    }
    for (k, v) in &args.query {
        req = req.query(k.as_str(), v.as_str());
    }
    if let Some(secs) = args.timeout {
        req = req.timeout(Duration::from_secs(secs));
    }
    if wait {
        req = req.wait();
    }

    let res = client
        .execute(&req)
        .with_context(|| format!("{} {}", method, args.path))?;
    print_response(&res);
    Ok(())
}

/// Inline JSON, or the contents of a file when prefixed with `@`.
pub(crate) fn load_payload(data: &str) -> Result<Vec<u8>> {
    match data.strip_prefix('@') {
        Some(path) => fs::read(path).with_context(|| format!("reading payload {path}")),
        None => Ok(data.as_bytes().to_vec()),
    }
}

fn print_response(res: &ResponseEnvelope) {
    match res.json() {
        Some(json) => match serde_json::to_string_pretty(&json) {
            Ok(pretty) => println!("{pretty}"),
            Err(_) => println!("{}", res.text()),
        },
        None if res.body.is_empty() => println!("HTTP {}", res.status),
        None => println!("{}", res.text()),
    }
}
