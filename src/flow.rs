// SPDX-License-Identifier: Apache-2.0

//! Flow-directory path conventions and the incremental placement driver.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use simple_error::bail;

use crate::db::{DesignDb, GlobalPlacementOptions};

/// Well-known input and output locations for one design inside a flow
/// directory laid out as `<flow>/platforms/<tech>/...` and
/// `<flow>/results/<tech>/<design>/base/...`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowPaths {
    pub platform_dir: PathBuf,
    pub lib_dir: PathBuf,
    pub lef_dir: PathBuf,
    pub rc_file: PathBuf,
    pub results_dir: PathBuf,
    /// Floorplanned database snapshot the export runs against.
    pub floorplan_db: PathBuf,
    /// Timing constraints applied after loading the snapshot.
    pub sdc_file: PathBuf,
    /// Hypergraph output file, `<design>_<tech>.txt` in the working directory.
    pub hypergraph_file: PathBuf,
}

impl FlowPaths {
    pub fn new(flow_dir: &Path, tech_node: &str, design: &str) -> FlowPaths {
        let platform_dir = flow_dir.join("platforms").join(tech_node);
        let results_dir = flow_dir
            .join("results")
            .join(tech_node)
            .join(design)
            .join("base");
        FlowPaths {
            lib_dir: platform_dir.join("lib"),
            lef_dir: platform_dir.join("lef"),
            rc_file: platform_dir.join("setRC.tcl"),
            floorplan_db: results_dir.join("3_2_place_iop.odb"),
            sdc_file: results_dir.join("2_floorplan.sdc"),
            hypergraph_file: PathBuf::from(format!("{design}_{tech_node}.txt")),
            platform_dir,
            results_dir,
        }
    }

    /// All `.lib` timing libraries of the platform, sorted by path.
    pub fn liberty_files(&self) -> Result<Vec<PathBuf>, Box<dyn Error>> {
        files_with_extension(&self.lib_dir, "lib")
    }

    /// Technology LEF files (file name contains "tech"); these must be read
    /// into the engine before the cell LEFs.
    pub fn tech_lef_files(&self) -> Result<Vec<PathBuf>, Box<dyn Error>> {
        let mut files = files_with_extension(&self.lef_dir, "lef")?;
        files.retain(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains("tech"))
        });
        Ok(files)
    }

    /// All `.lef` files of the platform, sorted by path.
    pub fn lef_files(&self) -> Result<Vec<PathBuf>, Box<dyn Error>> {
        files_with_extension(&self.lef_dir, "lef")
    }
}

fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    if !dir.is_dir() {
        bail!("missing platform directory: {}", dir.display());
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(ext))
        .collect();
    files.sort();
    Ok(files)
}

/// Runs the engine's incremental global placement followed by legalization,
/// writing a layout and database snapshot after each stage. Engine failures
/// propagate unchanged; there is no retry.
pub fn run_incremental_placement(
    db: &mut dyn DesignDb,
    odb_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    info!("running global placement");
    db.global_placement(&GlobalPlacementOptions::default())?;
    db.write_def(&odb_dir.join("3_3_place_gp.def"))?;
    db.write_db(&odb_dir.join("3_3_place_gp.odb"))?;

    let Some(site) = db.core_site() else {
        bail!("design has no rows; cannot size the legalizer displacement");
    };
    // Allow displacement across the whole block, measured in sites.
    let bbox = db.die_area();
    let max_disp_x = bbox.dx() / site.width;
    let max_disp_y = bbox.dy() / site.height;
    info!("running legalization (max displacement {max_disp_x} x {max_disp_y} sites)");
    db.detailed_placement(max_disp_x, max_disp_y)?;
    db.write_def(&odb_dir.join("3_5_place_dp.def"))?;
    db.write_db(&odb_dir.join("3_5_place_dp.odb"))?;
    Ok(())
}
