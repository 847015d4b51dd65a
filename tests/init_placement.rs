// SPDX-License-Identifier: Apache-2.0

use std::fs;

use placegraph::{
    DesignDb, MemDb, Rect, load_init_placement, write_init_placement,
};

fn placed_db() -> MemDb {
    let mut db = MemDb::new(
        "counter",
        2000,
        Rect::new(0, 0, 10_000, 10_000),
        Rect::new(500, 500, 9_500, 9_500),
    );
    db.add_inst("u0", "AND2_X1", Rect::new(100, 100, 160, 120));
    // Odd width: centers still round-trip through truncating math.
    db.add_inst("u1", "INV_X1", Rect::new(201, 201, 216, 232));
    db.add_macro("mac", "RAM_512", Rect::new(1000, 1000, 3000, 2000));
    db.add_fixed_inst("fix", "DFF_X1", Rect::new(4000, 4000, 4020, 4040));
    db.add_filler("fill", "FILLCELL_X1", Rect::new(5000, 5000, 5010, 5020));
    db.add_inst("tap", "TAPCELL_X1", Rect::new(6000, 6000, 6010, 6020));
    db
}

#[test]
fn writer_emits_only_movable_standard_cells() {
    let db = placed_db();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("init.txt");
    write_init_placement(&db, &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let names: Vec<&str> = text
        .lines()
        .map(|l| l.split_whitespace().next().unwrap())
        .collect();
    assert_eq!(names, ["u0", "u1"]);
    for line in text.lines() {
        assert_eq!(line.split_whitespace().count(), 3);
    }
}

#[test]
fn round_trip_reproduces_movable_centers() {
    let mut db = placed_db();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("init.txt");
    write_init_placement(&db, &path).unwrap();
    let u0 = db.inst_center("u0").unwrap();
    let u1 = db.inst_center("u1").unwrap();

    db.set_location("u0", 5000, 5000).unwrap();
    db.set_location("u1", 5000, 5000).unwrap();
    load_init_placement(&mut db, &path).unwrap();
    assert_eq!(db.inst_center("u0").unwrap(), u0);
    assert_eq!(db.inst_center("u1").unwrap(), u1);
}

#[test]
fn loader_skips_lines_with_fewer_than_three_fields() {
    let mut db = placed_db();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("init.txt");
    fs::write(&path, "u0\nu0 5\nu0 300 400\n").unwrap();
    load_init_placement(&mut db, &path).unwrap();
    assert_eq!(db.inst_center("u0").unwrap(), (300, 400));
}

#[test]
fn loader_truncates_float_coordinates() {
    let mut db = placed_db();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("init.txt");
    fs::write(&path, "u0 12.7 9.9\n").unwrap();
    load_init_placement(&mut db, &path).unwrap();
    assert_eq!(db.inst_center("u0").unwrap(), (12, 9));
}

#[test]
fn loader_skips_unparsable_coordinates() {
    let mut db = placed_db();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("init.txt");
    fs::write(&path, "u0 abc 10\nu0 50 60\n").unwrap();
    load_init_placement(&mut db, &path).unwrap();
    assert_eq!(db.inst_center("u0").unwrap(), (50, 60));
}

#[test]
fn unknown_instance_name_is_an_error() {
    let mut db = placed_db();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("init.txt");
    fs::write(&path, "ghost 10 10\n").unwrap();
    assert!(load_init_placement(&mut db, &path).is_err());
}
