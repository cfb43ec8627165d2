//! Forwarding-state snapshots: per-switch CSV dumps and the XML manifest.
//!
//! This is the only place the harness depends on the shape of a switch's
//! forwarding table. Each entry becomes one CSV line
//! `destination_prefix,next_hop,interface,tag`; entries with no output
//! action become `DIRECT,drop` lines, and every addressed port contributes
//! a loopback line. The manifest is a small XML document naming one dump
//! file per switch.

use crate::error::{Error, Result};
use crate::fabric::{Fabric, Switch};
use crate::tracing_compat::debug;
use crate::types::Dpid;
use std::collections::BTreeMap;
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

/// Paths written by [`write_manifest`], all inside the caller's directory.
#[derive(Debug, Clone)]
pub struct ManifestFiles {
    /// The manifest XML file the verifier takes as input.
    pub manifest: PathBuf,
    /// One forwarding dump per switch, referenced by the manifest.
    pub fib_files: Vec<PathBuf>,
}

/// Dumps every switch's forwarding table in CSV form.
///
/// Fails with [`Error::NoForwardingState`] if any switch has no table.
pub fn dump_forwarding_csv(fabric: &Fabric) -> Result<BTreeMap<Dpid, String>> {
    fabric
        .switches()
        .map(|switch| Ok((switch.dpid(), switch_csv(fabric, switch)?)))
        .collect()
}

/// One switch's forwarding table as CSV lines.
fn switch_csv(fabric: &Fabric, switch: &Switch) -> Result<String> {
    let table = switch
        .table()
        .ok_or_else(|| Error::NoForwardingState(switch.dpid()))?;

    let mut lines = Vec::with_capacity(table.len() + switch.port_nos().len());
    for entry in table.entries() {
        let (dst, prefix) = entry
            .matching
            .nw_dst
            .unwrap_or((Ipv4Addr::UNSPECIFIED, 0));

        // Default drop: no output action specified.
        let mut gateway = String::from("DIRECT");
        let mut interface = String::from("drop");

        if let Some(port_no) = entry.output_port() {
            if let Some(port) = switch.port(port_no) {
                interface = port.interface_name();
                let peer_addr = fabric
                    .connected_port(switch.dpid(), port_no)
                    .and_then(|peer| fabric.switch(peer.dpid)?.port(peer.port)?.nw_addr());
                if let Some(addr) = peer_addr {
                    gateway = addr.to_string();
                }
            } else {
                debug!(dpid = %switch.dpid(), %port_no, "output action names an unknown port");
            }
        }

        lines.push(format!("{dst}/{prefix},{gateway},{interface},O"));
    }

    // Loopback devices, one per addressed port.
    for port in switch.ports() {
        if let Some(addr) = port.nw_addr() {
            lines.push(format!("{addr}/32,DIRECT,loopback 1,O"));
        }
    }

    Ok(lines.join("\n"))
}

/// Writes per-switch dump files and the manifest into `dir`.
///
/// File names are derived from the switch name (`s<dpid>.fib`); the
/// manifest references them relative to itself, as the verifier expects
/// siblings.
pub fn write_manifest(dir: &Path, fabric: &Fabric) -> Result<ManifestFiles> {
    let dumps = dump_forwarding_csv(fabric)?;

    let mut fib_files = Vec::with_capacity(dumps.len());
    let mut xml = String::from("<manifest>\n  <data>\n");
    for (dpid, csv) in &dumps {
        let file_name = format!("{dpid}.fib");
        let path = dir.join(&file_name);
        debug!(%dpid, file = %path.display(), "writing forwarding dump");
        fs::write(&path, csv)?;
        xml.push_str(&format!(
            "    <node name=\"{dpid}\" file=\"{file_name}\" />\n"
        ));
        fib_files.push(path);
    }
    xml.push_str("  </data>\n</manifest>\n");

    let manifest = dir.join("manifest.xml");
    fs::write(&manifest, xml)?;

    Ok(ManifestFiles {
        manifest,
        fib_files,
    })
}
