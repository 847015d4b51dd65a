// SPDX-License-Identifier: Apache-2.0

//! Glue layer over an external physical-design engine: extracts a hypergraph
//! representation of a floorplanned design (IO pins, instances, nets) to a
//! text file and drives the engine's incremental placement steps.
//!
//! The engine itself — technology loading, timing analysis, global and
//! detailed placement — is not implemented here. Everything goes through the
//! [`DesignDb`] handle, so the same extraction code runs against a real
//! engine binding or against the in-memory [`MemDb`].

mod geom;
pub use geom::Rect;

pub mod db;
pub use db::{
    DesignDb, GlobalPlacementOptions, InstInfo, IoPin, IoType, LibUnits, MemDb, NetInfo,
    NetInstPin, NetIoPin, PinDirection, Site, lib_units_consistent,
};

pub mod export;
pub use export::{
    IdMap, SECTION_SEPARATOR_WIDTH, export_hypergraph, section_separator, write_basic_info,
    write_instances, write_io_pins, write_nets,
};

pub mod init_placement;
pub use init_placement::{load_init_placement, write_init_placement};

pub mod flow;
pub use flow::{FlowPaths, run_incremental_placement};
