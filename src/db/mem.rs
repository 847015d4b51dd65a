// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use log::debug;
use simple_error::bail;

use crate::Rect;
use crate::db::{
    DesignDb, GlobalPlacementOptions, InstInfo, IoPin, IoType, LibUnits, NetInfo, NetInstPin,
    NetIoPin, PinDirection, Site,
};

struct MemInst {
    master: String,
    bbox: Rect,
    is_macro: bool,
    is_fixed: bool,
    is_filler: bool,
}

struct MemNet {
    inst_pins: Vec<NetInstPin>,
    io_pins: Vec<String>,
}

/// In-memory [`DesignDb`] built in code.
///
/// Enumeration order is insertion order, fixed for a given construction, so
/// repeated queries satisfy the repeatable-order contract of the trait. The
/// placement entry points are stand-ins for the real engine: they record the
/// invocation, and detailed placement only clamps movable cells into the core
/// area.
pub struct MemDb {
    name: String,
    dbu_per_micron: i64,
    die: Rect,
    core: Rect,
    io_pins: IndexMap<String, (IoType, Rect)>,
    insts: IndexMap<String, MemInst>,
    nets: IndexMap<String, MemNet>,
    sequential: IndexSet<String>,
    libs: Vec<LibUnits>,
    site: Option<Site>,
    global_placement_runs: usize,
    detailed_placement_runs: usize,
}

impl MemDb {
    pub fn new(name: impl AsRef<str>, dbu_per_micron: i64, die: Rect, core: Rect) -> MemDb {
        MemDb {
            name: name.as_ref().to_string(),
            dbu_per_micron,
            die,
            core,
            io_pins: IndexMap::new(),
            insts: IndexMap::new(),
            nets: IndexMap::new(),
            sequential: IndexSet::new(),
            libs: Vec::new(),
            site: None,
            global_placement_runs: 0,
            detailed_placement_runs: 0,
        }
    }

    pub fn add_io_pin(&mut self, name: impl AsRef<str>, io_type: IoType, bbox: Rect) {
        let name = name.as_ref().to_string();
        if self.io_pins.insert(name.clone(), (io_type, bbox)).is_some() {
            panic!("Two IO pins with the same name: {name}");
        }
    }

    /// Adds a movable standard cell.
    pub fn add_inst(&mut self, name: impl AsRef<str>, master: impl AsRef<str>, bbox: Rect) {
        self.insert_inst(name, master, bbox, false, false, false);
    }

    /// Adds a standard cell whose position is fixed.
    pub fn add_fixed_inst(&mut self, name: impl AsRef<str>, master: impl AsRef<str>, bbox: Rect) {
        self.insert_inst(name, master, bbox, false, true, false);
    }

    /// Adds a macro (block master) instance.
    pub fn add_macro(&mut self, name: impl AsRef<str>, master: impl AsRef<str>, bbox: Rect) {
        self.insert_inst(name, master, bbox, true, false, false);
    }

    /// Adds an instance whose master is a filler cell.
    pub fn add_filler(&mut self, name: impl AsRef<str>, master: impl AsRef<str>, bbox: Rect) {
        self.insert_inst(name, master, bbox, false, false, true);
    }

    fn insert_inst(
        &mut self,
        name: impl AsRef<str>,
        master: impl AsRef<str>,
        bbox: Rect,
        is_macro: bool,
        is_fixed: bool,
        is_filler: bool,
    ) {
        let name = name.as_ref().to_string();
        let inst = MemInst {
            master: master.as_ref().to_string(),
            bbox,
            is_macro,
            is_fixed,
            is_filler,
        };
        if self.insts.insert(name.clone(), inst).is_some() {
            panic!("Two instances with the same name: {name}");
        }
    }

    /// Marks an existing instance as a sequential element (register).
    pub fn mark_sequential(&mut self, name: impl AsRef<str>) {
        let name = name.as_ref();
        if !self.insts.contains_key(name) {
            panic!("Cannot mark unknown instance as sequential: {name}");
        }
        self.sequential.insert(name.to_string());
    }

    /// Adds a net connecting the given instance pins and boundary terminals.
    /// All referenced instances and IO pins must already exist.
    pub fn add_net(
        &mut self,
        name: impl AsRef<str>,
        inst_pins: &[(&str, PinDirection)],
        io_pins: &[&str],
    ) {
        let name = name.as_ref().to_string();
        for (inst, _) in inst_pins {
            if !self.insts.contains_key(*inst) {
                panic!("Net {name} references unknown instance: {inst}");
            }
        }
        for pin in io_pins {
            if !self.io_pins.contains_key(*pin) {
                panic!("Net {name} references unknown IO pin: {pin}");
            }
        }
        let net = MemNet {
            inst_pins: inst_pins
                .iter()
                .map(|(inst, direction)| NetInstPin {
                    inst: inst.to_string(),
                    direction: *direction,
                })
                .collect(),
            io_pins: io_pins.iter().map(|p| p.to_string()).collect(),
        };
        if self.nets.insert(name.clone(), net).is_some() {
            panic!("Two nets with the same name: {name}");
        }
    }

    pub fn add_lib(&mut self, units: LibUnits) {
        self.libs.push(units);
    }

    pub fn set_core_site(&mut self, site: Site) {
        self.site = Some(site);
    }

    /// Bounding-box center of the named instance, if it exists.
    pub fn inst_center(&self, name: &str) -> Option<(i64, i64)> {
        self.insts.get(name).map(|i| i.bbox.center())
    }

    pub fn global_placement_runs(&self) -> usize {
        self.global_placement_runs
    }

    pub fn detailed_placement_runs(&self) -> usize {
        self.detailed_placement_runs
    }

    fn write_snapshot(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let mut text = String::new();
        for (name, inst) in &self.insts {
            let (x, y) = inst.bbox.center();
            let status = if inst.is_fixed { "FIXED" } else { "PLACED" };
            writeln!(text, "{name} {} {x} {y} {status}", inst.master)?;
        }
        fs::write(path, text)?;
        Ok(())
    }
}

impl DesignDb for MemDb {
    fn design_name(&self) -> String {
        self.name.clone()
    }

    fn dbu_per_micron(&self) -> i64 {
        self.dbu_per_micron
    }

    fn die_area(&self) -> Rect {
        self.die
    }

    fn core_area(&self) -> Rect {
        self.core
    }

    fn io_pins(&self) -> Vec<IoPin> {
        self.io_pins
            .iter()
            .map(|(name, (io_type, bbox))| IoPin {
                name: name.clone(),
                io_type: *io_type,
                bbox: *bbox,
            })
            .collect()
    }

    fn insts(&self) -> Vec<InstInfo> {
        self.insts
            .iter()
            .map(|(name, inst)| InstInfo {
                name: name.clone(),
                master: inst.master.clone(),
                bbox: inst.bbox,
                is_macro: inst.is_macro,
                is_fixed: inst.is_fixed,
                is_filler: inst.is_filler,
            })
            .collect()
    }

    fn nets(&self) -> Vec<NetInfo> {
        self.nets
            .iter()
            .map(|(name, net)| NetInfo {
                name: name.clone(),
                inst_pins: net.inst_pins.clone(),
                io_pins: net
                    .io_pins
                    .iter()
                    .map(|pin| NetIoPin {
                        pin: pin.clone(),
                        io_type: self.io_pins[pin].0,
                    })
                    .collect(),
            })
            .collect()
    }

    fn sequential_insts(&self) -> Vec<String> {
        self.sequential.iter().cloned().collect()
    }

    fn lib_units(&self) -> Vec<LibUnits> {
        self.libs.clone()
    }

    fn core_site(&self) -> Option<Site> {
        self.site
    }

    fn set_location(&mut self, inst: &str, x: i64, y: i64) -> Result<(), Box<dyn Error>> {
        let Some(entry) = self.insts.get_mut(inst) else {
            bail!("no instance named {}", inst);
        };
        entry.bbox = entry.bbox.centered_at(x, y);
        Ok(())
    }

    fn global_placement(&mut self, opts: &GlobalPlacementOptions) -> Result<(), Box<dyn Error>> {
        // The real engine places here; this double only records the call.
        debug!("global placement stand-in invoked with {opts:?}");
        self.global_placement_runs += 1;
        Ok(())
    }

    fn detailed_placement(
        &mut self,
        _max_disp_x: i64,
        _max_disp_y: i64,
    ) -> Result<(), Box<dyn Error>> {
        // Stand-in legalization: clamp movable cells into the core area.
        let core = self.core;
        for inst in self.insts.values_mut() {
            if inst.is_fixed || inst.is_macro {
                continue;
            }
            let (x, y) = inst.bbox.center();
            let x = x.clamp(core.x_min + inst.bbox.dx() / 2, core.x_max - inst.bbox.dx() / 2);
            let y = y.clamp(core.y_min + inst.bbox.dy() / 2, core.y_max - inst.bbox.dy() / 2);
            inst.bbox = inst.bbox.centered_at(x, y);
        }
        self.detailed_placement_runs += 1;
        Ok(())
    }

    fn write_def(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        self.write_snapshot(path)
    }

    fn write_db(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        self.write_snapshot(path)
    }
}
