// SPDX-License-Identifier: Apache-2.0

//! Query and mutation contract of the external physical-design engine.
//!
//! Everything the extraction and placement code needs from the engine goes
//! through the [`DesignDb`] trait, passed explicitly into every operation.
//! [`MemDb`] is an in-memory implementation used by the tests and the demo
//! entry point; a binding to a real engine implements the same trait.

use std::error::Error;
use std::path::Path;

use crate::Rect;

mod mem;
pub use mem::MemDb;

/// Signal direction of an instance pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinDirection {
    Input,
    Output,
    InOut,
}

impl PinDirection {
    /// True only for `Output`; bidirectional pins never drive a net.
    pub fn is_output(&self) -> bool {
        matches!(self, PinDirection::Output)
    }
}

/// IO type of a boundary terminal, as the engine reports it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IoType {
    Input,
    Output,
    InOut,
    Feedthru,
}

impl IoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IoType::Input => "INPUT",
            IoType::Output => "OUTPUT",
            IoType::InOut => "INOUT",
            IoType::Feedthru => "FEEDTHRU",
        }
    }
}

/// Placement site dimensions in DBU, taken from the core rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Site {
    pub width: i64,
    pub height: i64,
}

/// Unit and site parameters of one technology library.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LibUnits {
    pub dbu_per_micron: i64,
    pub site_height: i64,
}

/// A boundary terminal (chip-level IO pin).
#[derive(Clone, Debug)]
pub struct IoPin {
    pub name: String,
    pub io_type: IoType,
    pub bbox: Rect,
}

/// A placeable instance and the master properties the exporter cares about.
#[derive(Clone, Debug)]
pub struct InstInfo {
    pub name: String,
    pub master: String,
    pub bbox: Rect,
    pub is_macro: bool,
    pub is_fixed: bool,
    pub is_filler: bool,
}

/// A net connection to an instance pin.
#[derive(Clone, Debug)]
pub struct NetInstPin {
    pub inst: String,
    pub direction: PinDirection,
}

/// A net connection to a boundary terminal.
#[derive(Clone, Debug)]
pub struct NetIoPin {
    pub pin: String,
    pub io_type: IoType,
}

/// One net with all of its connection points.
#[derive(Clone, Debug)]
pub struct NetInfo {
    pub name: String,
    pub inst_pins: Vec<NetInstPin>,
    pub io_pins: Vec<NetIoPin>,
}

/// Flag set passed to the engine's global placer. The default matches the
/// incremental flow: all flags enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlobalPlacementOptions {
    pub routability_driven: bool,
    pub timing_driven: bool,
    pub skip_initial_place: bool,
    pub incremental: bool,
}

impl Default for GlobalPlacementOptions {
    fn default() -> Self {
        GlobalPlacementOptions {
            routability_driven: true,
            timing_driven: true,
            skip_initial_place: true,
            incremental: true,
        }
    }
}

/// Handle to an open, floorplanned physical database.
///
/// Enumeration methods (`io_pins`, `insts`, `nets`) return objects in the
/// engine's native order: opaque, but repeatable for a fixed database
/// snapshot. Everything downstream depends on that repeatability.
pub trait DesignDb {
    fn design_name(&self) -> String;

    /// DBU per micron of the block.
    fn dbu_per_micron(&self) -> i64;

    fn die_area(&self) -> Rect;

    fn core_area(&self) -> Rect;

    fn io_pins(&self) -> Vec<IoPin>;

    fn insts(&self) -> Vec<InstInfo>;

    fn nets(&self) -> Vec<NetInfo>;

    /// Names of all sequential (register) instances, as derived from the
    /// engine's timing graph.
    fn sequential_insts(&self) -> Vec<String>;

    /// Unit and site parameters of every loaded technology library.
    fn lib_units(&self) -> Vec<LibUnits>;

    /// Site of the core rows, if the block has any rows.
    fn core_site(&self) -> Option<Site>;

    /// Moves the named instance so that its bounding box is centered at
    /// `(x, y)`. Fails if no instance with that name exists.
    fn set_location(&mut self, inst: &str, x: i64, y: i64) -> Result<(), Box<dyn Error>>;

    /// Invokes the engine's global placer.
    fn global_placement(&mut self, opts: &GlobalPlacementOptions) -> Result<(), Box<dyn Error>>;

    /// Invokes the engine's detailed placer / legalizer with the given
    /// maximum displacement, in sites.
    fn detailed_placement(&mut self, max_disp_x: i64, max_disp_y: i64)
    -> Result<(), Box<dyn Error>>;

    /// Serializes the current layout to a DEF file.
    fn write_def(&self, path: &Path) -> Result<(), Box<dyn Error>>;

    /// Serializes the database snapshot to a file.
    fn write_db(&self, path: &Path) -> Result<(), Box<dyn Error>>;
}

/// True when all loaded libraries agree on DBU-per-micron and site height.
/// Mixed units make every downstream DBU computation meaningless.
pub fn lib_units_consistent(units: &[LibUnits]) -> bool {
    match units.split_first() {
        Some((first, rest)) => rest.iter().all(|u| u == first),
        None => true,
    }
}
