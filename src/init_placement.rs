// SPDX-License-Identifier: Apache-2.0

//! Init-placement file I/O: one `name x y` triple per line, movable
//! standard cells only.

use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::warn;

use crate::db::DesignDb;
use crate::export::is_tapcell;

/// Writes `name x y` (bounding-box center) for every movable standard cell.
/// Macro and fixed instances are omitted by design: their positions are
/// already final. Filler and tap cells are omitted like everywhere else.
pub fn write_init_placement(db: &dyn DesignDb, path: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for inst in db.insts() {
        if inst.is_filler || is_tapcell(&inst.master) {
            continue;
        }
        if inst.is_macro || inst.is_fixed {
            continue;
        }
        let (x, y) = inst.bbox.center();
        writeln!(out, "{} {} {}", inst.name, x, y)?;
    }
    out.flush()
}

/// Loads an init-placement file and applies each position to the named
/// instance.
///
/// Lines with fewer than three fields are skipped. Coordinates go through
/// float parsing before integer truncation, so `12.7` is accepted as 12; an
/// unparsable coordinate is logged and the line skipped. A name that does not
/// resolve in the database is an error.
pub fn load_init_placement(db: &mut dyn DesignDb, path: &Path) -> Result<(), Box<dyn Error>> {
    let file = File::open(path)?;
    for line in BufReader::new(file).lines() {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            continue;
        }
        let (Ok(x), Ok(y)) = (fields[1].parse::<f64>(), fields[2].parse::<f64>()) else {
            warn!("Skipping init-placement line with bad coordinates: {line}");
            continue;
        };
        db.set_location(fields[0], x as i64, y as i64)?;
    }
    Ok(())
}
