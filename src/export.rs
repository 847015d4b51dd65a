// SPDX-License-Identifier: Apache-2.0

//! Hypergraph extraction: serializes a floorplanned design as a text file
//! with four sections (basic info, IO pins, instances, nets), each closed by
//! a separator line.
//!
//! All output is deterministic for a fixed database snapshot: ids are
//! assigned in the database's native enumeration order, and the same order
//! drives every table.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use itertools::Itertools;
use log::{info, warn};

use crate::db::{DesignDb, IoType, NetInfo};

/// Width of the separator line closing each output section.
pub const SECTION_SEPARATOR_WIDTH: usize = 93;

/// The separator line closing each output section.
pub fn section_separator() -> String {
    "*".repeat(SECTION_SEPARATOR_WIDTH)
}

/// Dense name-to-id assignment in enumeration order.
///
/// Ids start at a caller-chosen offset so that the IO-pin map and the
/// instance map together cover a contiguous range `[0, N)`.
#[derive(Clone, Debug, Default)]
pub struct IdMap {
    ids: IndexMap<String, usize>,
    next: usize,
}

impl IdMap {
    /// Creates an empty map whose first assigned id is `first_id`.
    pub fn starting_at(first_id: usize) -> IdMap {
        IdMap {
            ids: IndexMap::new(),
            next: first_id,
        }
    }

    /// Assigns the next id to `name`, or returns the id it already has.
    pub fn assign(&mut self, name: impl AsRef<str>) -> usize {
        let name = name.as_ref();
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = self.next;
        self.ids.insert(name.to_string(), id);
        self.next += 1;
        id
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.ids.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The id the next `assign` call would hand out.
    pub fn next_id(&self) -> usize {
        self.next
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.ids.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

/// One-driver-per-net claim state. A net claims its driver exactly once;
/// every later driver candidate is recorded as a sink instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DriverState {
    NoDriverYet,
    Claimed(usize),
}

/// True when the master name marks a tap cell. Tap cells (like fillers) are
/// non-functional and never appear in the hypergraph.
pub(crate) fn is_tapcell(master: &str) -> bool {
    master.to_ascii_lowercase().contains("tapcell")
}

/// Writes the basic-information block: design name, unit scale, die and core
/// dimensions, and the core bounding box.
pub fn write_basic_info<W: Write>(db: &dyn DesignDb, out: &mut W) -> io::Result<()> {
    let die = db.die_area();
    let core = db.core_area();
    writeln!(out, "{}", section_separator())?;
    writeln!(out, "Basic information of the design:")?;
    writeln!(out, "Design name: {}", db.design_name())?;
    writeln!(
        out,
        "UNITS DISTANCE MICRONS : {} (We use DBU to store the layout information)",
        db.dbu_per_micron()
    )?;
    writeln!(out, "Die width: {} DBU", die.dx())?;
    writeln!(out, "Die height: {} DBU", die.dy())?;
    writeln!(out, "Core width: {} DBU", core.dx())?;
    writeln!(out, "Core height: {} DBU", core.dy())?;
    writeln!(
        out,
        "Core region:  lx = {}, ly = {}, ux = {}, uy = {}",
        core.x_min, core.y_min, core.x_max, core.y_max
    )?;
    writeln!(out, "{}", section_separator())
}

/// Writes the IO-pin table and returns the name-to-id map built from it.
/// Ids start at 0, in the database's enumeration order.
pub fn write_io_pins<W: Write>(db: &dyn DesignDb, out: &mut W) -> io::Result<IdMap> {
    writeln!(
        out,
        "Input/Output Pin information (Each line represents one fixed pin: vertex_id, IO_name, IO_type, x_center, y_center):"
    )?;
    let mut ids = IdMap::default();
    for pin in db.io_pins() {
        let id = ids.assign(&pin.name);
        let (x, y) = pin.bbox.center();
        writeln!(out, "{} {} {} {} {}", id, pin.name, pin.io_type.as_str(), x, y)?;
    }
    writeln!(out, "{}", section_separator())?;
    Ok(ids)
}

/// Writes the instance table and returns the name-to-id map built from it,
/// with ids continuing from `start_id`.
///
/// Filler and tap-cell instances are skipped entirely: no record, no id.
/// Movable standard cells get the position `-1 -1` — a deliberate redaction,
/// since the consuming placement algorithm determines those positions itself.
/// Macro and fixed instances keep their true bounding-box center.
pub fn write_instances<W: Write>(
    db: &dyn DesignDb,
    sequential: &HashSet<String>,
    start_id: usize,
    out: &mut W,
) -> io::Result<IdMap> {
    writeln!(
        out,
        "Instance information (Each line represents one instance: vertex_id, instance_name, cell_name, isMacro, isSeq, isFixed, x_center, y_center, width, height):"
    )?;
    let mut ids = IdMap::starting_at(start_id);
    for inst in db.insts() {
        if inst.is_filler || is_tapcell(&inst.master) {
            continue;
        }
        let id = ids.assign(&inst.name);
        let is_seq = sequential.contains(&inst.name);
        let (x, y) = if inst.is_macro || inst.is_fixed {
            inst.bbox.center()
        } else {
            (-1, -1)
        };
        writeln!(
            out,
            "{} {} {} {} {} {} {} {} {} {}",
            id,
            inst.name,
            inst.master,
            inst.is_macro,
            is_seq,
            inst.is_fixed,
            x,
            y,
            inst.bbox.dx(),
            inst.bbox.dy()
        )?;
    }
    writeln!(out, "{}", section_separator())?;
    Ok(ids)
}

/// Writes the net table: one line per net, driver id first, then sink ids.
///
/// Power/ground nets (`VDD`/`VSS`), nets whose total pin count reaches
/// `large_net_threshold`, driverless nets, and nets without sinks are
/// dropped. A net whose pin owner resolves in neither id map is malformed:
/// logged and skipped, never fatal.
pub fn write_nets<W: Write>(
    db: &dyn DesignDb,
    io_map: &IdMap,
    inst_map: &IdMap,
    large_net_threshold: usize,
    out: &mut W,
) -> io::Result<()> {
    writeln!(
        out,
        "Nets information (Each line represents one net. The first element in each line is the driver pin.):"
    )?;
    for net in db.nets() {
        if net.name == "VDD" || net.name == "VSS" {
            continue;
        }
        if net.inst_pins.len() + net.io_pins.len() >= large_net_threshold {
            warn!("Ignore large net: {}", net.name);
            continue;
        }
        let Some((driver, sinks)) = classify_net(&net, io_map, inst_map) else {
            continue;
        };
        if sinks.is_empty() {
            continue;
        }
        writeln!(out, "{} {}", driver, sinks.iter().join(" "))?;
    }
    writeln!(out, "{}", section_separator())
}

/// Splits a net's pins into one driver and its sinks.
///
/// Instance pins are scanned before boundary pins, so an instance output pin
/// always beats a boundary input pin for the driver role. Boundary pins are
/// driver-eligible only with IO type exactly INPUT; bidirectional boundary
/// pins never drive.
fn classify_net(net: &NetInfo, io_map: &IdMap, inst_map: &IdMap) -> Option<(usize, Vec<usize>)> {
    let mut driver = DriverState::NoDriverYet;
    let mut sinks = Vec::new();
    for pin in &net.inst_pins {
        let Some(id) = inst_map.get(&pin.inst) else {
            warn!(
                "Net {} connects to unmapped instance {}; skipping net",
                net.name, pin.inst
            );
            return None;
        };
        if pin.direction.is_output() && driver == DriverState::NoDriverYet {
            driver = DriverState::Claimed(id);
        } else {
            sinks.push(id);
        }
    }
    for pin in &net.io_pins {
        let Some(id) = io_map.get(&pin.pin) else {
            warn!(
                "Net {} connects to unmapped IO pin {}; skipping net",
                net.name, pin.pin
            );
            return None;
        };
        if driver == DriverState::NoDriverYet && pin.io_type == IoType::Input {
            driver = DriverState::Claimed(id);
        } else {
            sinks.push(id);
        }
    }
    match driver {
        DriverState::NoDriverYet => {
            warn!("No driver found for net: {}", net.name);
            None
        }
        DriverState::Claimed(id) => Some((id, sinks)),
    }
}

/// Runs the full export: truncates `path`, then writes all four sections to
/// one appending handle. Repeated runs over the same database snapshot
/// produce byte-identical output.
pub fn export_hypergraph(
    db: &dyn DesignDb,
    large_net_threshold: usize,
    path: &Path,
) -> io::Result<()> {
    info!(
        "exporting hypergraph for design {} to {}",
        db.design_name(),
        path.display()
    );
    let mut out = BufWriter::new(File::create(path)?);
    write_basic_info(db, &mut out)?;
    let io_map = write_io_pins(db, &mut out)?;
    let sequential: HashSet<String> = db.sequential_insts().into_iter().collect();
    let inst_map = write_instances(db, &sequential, io_map.len(), &mut out)?;
    write_nets(db, &io_map, &inst_map, large_net_threshold, &mut out)?;
    out.flush()
}
