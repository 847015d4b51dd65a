// SPDX-License-Identifier: Apache-2.0

//! End-to-end walkthrough: build a small floorplanned design, export its
//! hypergraph, write and reload an init placement, then run the incremental
//! placement steps.
//!
//! A real flow would open the floorplan snapshot and timing constraints named
//! by [`FlowPaths`] through an engine binding; this demo fabricates an
//! equivalent design in memory instead.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use placegraph::{
    DesignDb, FlowPaths, IoType, LibUnits, MemDb, PinDirection, Rect, Site, export_hypergraph,
    lib_units_consistent, load_init_placement, run_incremental_placement, write_init_placement,
};

#[derive(Parser, Debug)]
#[command(about = "Extract a placement hypergraph and run incremental placement.")]
struct Args {
    /// Design name.
    #[arg(short = 'd', default_value = "ibex")]
    design: String,
    /// Technology node.
    #[arg(short = 't', default_value = "nangate45")]
    tech_node: String,
    /// Nets with at least this many pins are dropped from the hypergraph.
    #[arg(long, default_value_t = 1000)]
    large_net_threshold: usize,
    /// Flow directory containing platforms/ and results/.
    #[arg(long, default_value = "./of/flow")]
    flow_path: PathBuf,
}

fn build_demo_db(design: &str) -> MemDb {
    let mut db = MemDb::new(
        design,
        2000,
        Rect::new(0, 0, 200_000, 200_000),
        Rect::new(10_000, 10_000, 190_000, 190_000),
    );
    db.add_lib(LibUnits {
        dbu_per_micron: 2000,
        site_height: 2800,
    });
    db.set_core_site(Site {
        width: 380,
        height: 2800,
    });

    db.add_io_pin("clk", IoType::Input, Rect::new(0, 99_000, 200, 101_000));
    db.add_io_pin("rst_n", IoType::Input, Rect::new(0, 49_000, 200, 51_000));
    db.add_io_pin("data_in", IoType::Input, Rect::new(99_000, 0, 101_000, 200));
    db.add_io_pin(
        "data_out",
        IoType::Output,
        Rect::new(199_800, 99_000, 200_000, 101_000),
    );

    db.add_macro("ram_0", "RAM_64x32", Rect::new(20_000, 20_000, 80_000, 60_000));
    db.add_inst("u_and", "AND2_X1", Rect::new(0, 0, 760, 2800));
    db.add_inst("u_inv", "INV_X1", Rect::new(0, 0, 380, 2800));
    db.add_inst("reg_0", "DFF_X1", Rect::new(0, 0, 1520, 2800));
    db.add_inst("reg_1", "DFF_X1", Rect::new(0, 0, 1520, 2800));
    db.mark_sequential("reg_0");
    db.mark_sequential("reg_1");
    db.add_filler("fill_0", "FILLCELL_X1", Rect::new(0, 0, 380, 2800));
    db.add_fixed_inst("tap_0", "TAPCELL_X1", Rect::new(0, 0, 380, 2800));

    db.add_net(
        "clk",
        &[
            ("reg_0", PinDirection::Input),
            ("reg_1", PinDirection::Input),
        ],
        &["clk"],
    );
    db.add_net(
        "n_data",
        &[("u_and", PinDirection::Input)],
        &["data_in"],
    );
    db.add_net(
        "n_and",
        &[
            ("u_and", PinDirection::Output),
            ("reg_0", PinDirection::Input),
        ],
        &[],
    );
    db.add_net(
        "n_q0",
        &[
            ("reg_0", PinDirection::Output),
            ("u_inv", PinDirection::Input),
        ],
        &[],
    );
    db.add_net(
        "n_q1",
        &[
            ("u_inv", PinDirection::Output),
            ("reg_1", PinDirection::Input),
        ],
        &[],
    );
    db.add_net("n_out", &[("reg_1", PinDirection::Output)], &["data_out"]);
    db.add_net("VDD", &[("u_and", PinDirection::Input)], &[]);
    db.add_net("VSS", &[("u_and", PinDirection::Input)], &[]);
    db
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();
    let paths = FlowPaths::new(&args.flow_path, &args.tech_node, &args.design);
    println!(
        "A real flow would load {} and {} here.",
        paths.floorplan_db.display(),
        paths.sdc_file.display()
    );

    let mut db = build_demo_db(&args.design);
    assert!(lib_units_consistent(&db.lib_units()));

    export_hypergraph(&db, args.large_net_threshold, &paths.hypergraph_file)?;
    println!("Hypergraph written to {}", paths.hypergraph_file.display());

    let init_file = PathBuf::from("init_placement.txt");
    write_init_placement(&db, &init_file)?;
    load_init_placement(&mut db, &init_file)?;

    run_incremental_placement(&mut db, &PathBuf::from("."))?;
    println!("Wrote 3_3_place_gp and 3_5_place_dp snapshots.");
    Ok(())
}
