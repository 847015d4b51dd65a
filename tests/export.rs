// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use rstest::rstest;

use placegraph::{
    DesignDb, IdMap, IoType, MemDb, PinDirection, Rect, export_hypergraph, section_separator,
    write_basic_info, write_instances, write_io_pins, write_nets,
};

/// Small floorplanned design: three IO pins (ids 0..3), then four mapped
/// instances (ids 3..7). The filler and tap cell never receive ids.
fn base_db() -> MemDb {
    let mut db = MemDb::new(
        "ibex",
        2000,
        Rect::new(0, 0, 1000, 1000),
        Rect::new(100, 100, 900, 900),
    );
    db.add_io_pin("in_a", IoType::Input, Rect::new(0, 490, 20, 510));
    db.add_io_pin("out_z", IoType::Output, Rect::new(980, 490, 1000, 510));
    db.add_io_pin("bidir", IoType::InOut, Rect::new(490, 0, 510, 20));
    db.add_inst("reg_0", "DFF_X1", Rect::new(0, 0, 10, 20));
    db.mark_sequential("reg_0");
    db.add_inst("u_buf", "BUF_X1", Rect::new(30, 40, 50, 60));
    db.add_macro("mac_0", "RAM_512", Rect::new(100, 100, 300, 300));
    db.add_fixed_inst("fix_0", "DFF_X1", Rect::new(600, 600, 620, 640));
    db.add_filler("fill_0", "FILLCELL_X1", Rect::new(700, 700, 710, 720));
    db.add_inst("tap_0", "TAPCELL_X1", Rect::new(800, 800, 810, 820));
    db
}

fn base_db_with_nets() -> MemDb {
    let mut db = base_db();
    db.add_net(
        "n1",
        &[
            ("reg_0", PinDirection::Output),
            ("u_buf", PinDirection::Input),
        ],
        &[],
    );
    db.add_net("n2", &[("u_buf", PinDirection::Output)], &["out_z"]);
    db.add_net("nin", &[("reg_0", PinDirection::Input)], &["in_a"]);
    db
}

fn build_maps(db: &MemDb) -> (IdMap, IdMap) {
    let mut sink = Vec::new();
    let io_map = write_io_pins(db, &mut sink).unwrap();
    let sequential: HashSet<String> = db.sequential_insts().into_iter().collect();
    let inst_map = write_instances(db, &sequential, io_map.len(), &mut sink).unwrap();
    (io_map, inst_map)
}

/// Net-table data lines (header and separator stripped).
fn net_lines(db: &MemDb, threshold: usize) -> Vec<String> {
    let (io_map, inst_map) = build_maps(db);
    let mut buf = Vec::new();
    write_nets(db, &io_map, &inst_map, threshold, &mut buf).unwrap();
    String::from_utf8(buf)
        .unwrap()
        .lines()
        .skip(1)
        .take_while(|line| !line.starts_with('*'))
        .map(str::to_string)
        .collect()
}

fn instance_lines(db: &MemDb) -> Vec<String> {
    let sequential: HashSet<String> = db.sequential_insts().into_iter().collect();
    let mut buf = Vec::new();
    write_instances(db, &sequential, 3, &mut buf).unwrap();
    String::from_utf8(buf)
        .unwrap()
        .lines()
        .skip(1)
        .take_while(|line| !line.starts_with('*'))
        .map(str::to_string)
        .collect()
}

#[test]
fn export_is_deterministic() {
    let db = base_db_with_nets();
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.txt");
    let second = dir.path().join("second.txt");
    export_hypergraph(&db, 1000, &first).unwrap();
    export_hypergraph(&db, 1000, &second).unwrap();
    let first = std::fs::read(&first).unwrap();
    assert!(!first.is_empty());
    assert_eq!(first, std::fs::read(&second).unwrap());
}

#[test]
fn ids_are_dense_across_io_pins_and_instances() {
    let db = base_db();
    let (io_map, inst_map) = build_maps(&db);
    let mut ids: Vec<usize> = io_map.iter().chain(inst_map.iter()).map(|(_, id)| id).collect();
    ids.sort();
    assert_eq!(ids, (0..7).collect::<Vec<_>>());
    assert_eq!(io_map.get("in_a"), Some(0));
    assert_eq!(inst_map.get("reg_0"), Some(3));
    // Filler and tap cells never receive ids.
    assert_eq!(inst_map.get("fill_0"), None);
    assert_eq!(inst_map.get("tap_0"), None);
}

#[test]
fn io_pin_table_has_type_and_truncated_center() {
    let db = base_db();
    let mut buf = Vec::new();
    write_io_pins(&db, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("0 in_a INPUT 10 500\n"));
    assert!(text.contains("1 out_z OUTPUT 990 500\n"));
    assert!(text.contains("2 bidir INOUT 500 10\n"));
}

#[test]
fn movable_instance_position_is_redacted() {
    let lines = instance_lines(&base_db());
    let reg_0 = lines.iter().find(|l| l.contains(" reg_0 ")).unwrap();
    assert_eq!(reg_0, "3 reg_0 DFF_X1 false true false -1 -1 10 20");
    assert!(reg_0.ends_with("-1 -1 10 20"));
}

#[test]
fn macro_and_fixed_instances_keep_true_centers() {
    let lines = instance_lines(&base_db());
    let mac_0 = lines.iter().find(|l| l.contains(" mac_0 ")).unwrap();
    assert_eq!(mac_0, "5 mac_0 RAM_512 true false false 200 200 200 200");
    let fix_0 = lines.iter().find(|l| l.contains(" fix_0 ")).unwrap();
    assert_eq!(fix_0, "6 fix_0 DFF_X1 false false true 610 620 20 40");
}

#[test]
fn power_nets_are_excluded_by_name() {
    let mut db = base_db_with_nets();
    // Well-formed nets: only the name excludes them.
    db.add_net(
        "VDD",
        &[
            ("reg_0", PinDirection::Output),
            ("u_buf", PinDirection::Input),
        ],
        &[],
    );
    db.add_net(
        "VSS",
        &[
            ("u_buf", PinDirection::Output),
            ("reg_0", PinDirection::Input),
        ],
        &[],
    );
    assert_eq!(net_lines(&db, 1000).len(), 3);
}

#[rstest]
#[case(1, 0)]
#[case(2, 0)]
#[case(1_000_000, 3)]
fn large_net_threshold_drops_whole_nets(#[case] threshold: usize, #[case] expected: usize) {
    // Each net in the base design has exactly two pins.
    assert_eq!(net_lines(&base_db_with_nets(), threshold).len(), expected);
}

#[test]
fn net_ids_resolve_within_the_dense_range() {
    let lines = net_lines(&base_db_with_nets(), 1000);
    assert_eq!(lines.len(), 3);
    for line in &lines {
        for id in line.split_whitespace() {
            assert!(id.parse::<usize>().unwrap() < 7);
        }
    }
}

#[test]
fn instance_output_pin_beats_boundary_input_pin() {
    let mut db = base_db();
    db.add_net("n", &[("reg_0", PinDirection::Output)], &["in_a"]);
    // reg_0 (id 3) drives; the boundary input becomes a sink.
    assert_eq!(net_lines(&db, 1000), vec!["3 0"]);
}

#[test]
fn boundary_input_drives_when_no_instance_output_exists() {
    let mut db = base_db();
    db.add_net("n", &[("reg_0", PinDirection::Input)], &["in_a"]);
    assert_eq!(net_lines(&db, 1000), vec!["0 3"]);
}

#[test]
fn bidirectional_boundary_pin_never_drives() {
    let mut db = base_db();
    db.add_net("n", &[("reg_0", PinDirection::Input)], &["bidir"]);
    assert!(net_lines(&db, 1000).is_empty());
}

#[test]
fn later_output_pins_become_sinks() {
    let mut db = base_db();
    db.add_net(
        "n",
        &[
            ("reg_0", PinDirection::Output),
            ("u_buf", PinDirection::Output),
        ],
        &[],
    );
    // The driver is claimed once; the second output pin is a sink.
    assert_eq!(net_lines(&db, 1000), vec!["3 4"]);
}

#[test]
fn driverless_net_is_dropped() {
    let mut db = base_db();
    db.add_net(
        "n",
        &[
            ("reg_0", PinDirection::Input),
            ("u_buf", PinDirection::Input),
        ],
        &["out_z"],
    );
    assert!(net_lines(&db, 1000).is_empty());
}

#[test]
fn net_without_sinks_is_dropped() {
    let mut db = base_db();
    db.add_net("n", &[("reg_0", PinDirection::Output)], &[]);
    assert!(net_lines(&db, 1000).is_empty());
}

#[test]
fn net_touching_an_unmapped_instance_is_skipped() {
    let mut db = base_db();
    // fill_0 exists in the database but has no id (filler cells are skipped),
    // so the whole net is malformed.
    db.add_net(
        "n",
        &[
            ("reg_0", PinDirection::Output),
            ("fill_0", PinDirection::Input),
        ],
        &[],
    );
    assert!(net_lines(&db, 1000).is_empty());
}

#[test]
fn basic_info_block_format() {
    let db = base_db();
    let mut buf = Vec::new();
    write_basic_info(&db, &mut buf).unwrap();
    let sep = section_separator();
    let expected = format!(
        "{sep}\n\
         Basic information of the design:\n\
         Design name: ibex\n\
         UNITS DISTANCE MICRONS : 2000 (We use DBU to store the layout information)\n\
         Die width: 1000 DBU\n\
         Die height: 1000 DBU\n\
         Core width: 800 DBU\n\
         Core height: 800 DBU\n\
         Core region:  lx = 100, ly = 100, ux = 900, uy = 900\n\
         {sep}\n"
    );
    assert_eq!(String::from_utf8(buf).unwrap(), expected);
}

#[test]
fn every_section_is_closed_by_a_separator() {
    let db = base_db_with_nets();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hg.txt");
    export_hypergraph(&db, 1000, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let sep = section_separator();
    assert_eq!(sep.len(), 93);
    // Basic info is framed by two separators; the three tables close with
    // one each.
    assert_eq!(text.lines().filter(|l| *l == sep).count(), 5);
    let basic = text.find("Basic information").unwrap();
    let io = text.find("Input/Output Pin information").unwrap();
    let inst = text.find("Instance information").unwrap();
    let nets = text.find("Nets information").unwrap();
    assert!(basic < io && io < inst && inst < nets);
}
