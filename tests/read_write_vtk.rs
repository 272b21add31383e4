use exavtk::{Ascii, Base64, Binary, Encode, GridWriter, Snapshot, Variables};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("exavtk_{}_{}", std::process::id(), name))
}

fn flow_snapshot(ndim: usize, lr1: [usize; 3]) -> Snapshot {
    let var = Variables::from([ndim, ndim, 1, 1, 2]);
    let mut snapshot = Snapshot::new(ndim, 3, lr1, var);
    snapshot.time = 12.375;
    snapshot.istep = 200;

    for (iel, element) in snapshot.elem.iter_mut().enumerate() {
        for array in [
            &mut element.pos,
            &mut element.vel,
            &mut element.pres,
            &mut element.temp,
            &mut element.scal,
        ] {
            for ((c, z, y, x), value) in array.indexed_iter_mut() {
                *value = iel as f64 + 0.1 * c as f64 - 0.01 * (x + 3 * y + 9 * z) as f64;
            }
        }
    }

    snapshot
}

fn round_trip<ENC: Encode>(name: &str, ndim: usize, lr1: [usize; 3], downsample: bool) {
    let grid = exavtk::build(&flow_snapshot(ndim, lr1), downsample).unwrap();

    let written = GridWriter::<ENC>::new()
        .write(temp_path(name), &grid)
        .unwrap();
    assert_eq!(written.extension().unwrap(), "vtp");

    let read = exavtk::read_grid(&written).unwrap();
    std::fs::remove_file(&written).unwrap();

    assert_eq!(read, grid);
}

#[test]
fn binary_hexahedra() {
    round_trip::<Binary>("binary_hex", 3, [4, 4, 4], false);
}

#[test]
fn base64_hexahedra() {
    round_trip::<Base64>("base64_hex", 3, [4, 4, 4], false);
}

#[test]
fn ascii_hexahedra() {
    round_trip::<Ascii>("ascii_hex", 3, [4, 4, 4], false);
}

#[test]
fn binary_downsampled_quads() {
    round_trip::<Binary>("binary_quad", 2, [5, 5, 1], true);
}

#[test]
fn ascii_quads() {
    round_trip::<Ascii>("ascii_quad", 2, [3, 3, 1], false);
}

#[test]
fn extension_is_forced() {
    let grid = exavtk::build(&flow_snapshot(3, [2, 2, 2]), false).unwrap();

    let path = temp_path("out");
    let written = exavtk::write_grid(&path, &grid).unwrap();
    assert_eq!(written, path.with_file_name(format!(
        "{}.vtp",
        path.file_name().unwrap().to_string_lossy()
    )));
    assert!(written.exists());

    // already ending in the extension, written in place
    let again = exavtk::write_grid(&written, &grid).unwrap();
    assert_eq!(again, written);

    std::fs::remove_file(&written).unwrap();
}

#[test]
fn snapshot_straight_to_disk() {
    let snapshot = flow_snapshot(3, [3, 3, 3]);
    let written = exavtk::write_snapshot(temp_path("snapshot"), &snapshot).unwrap();

    let grid = exavtk::read_grid(&written).unwrap();
    std::fs::remove_file(&written).unwrap();

    assert_eq!(grid.num_points(), 3 * 27);
    assert_eq!(grid.num_cells(), 3 * 8);
    assert_eq!(grid.time, Some(12.375));
    assert_eq!(grid.point_data.active_vectors(), Some("vel"));
    assert_eq!(grid.point_data.active_scalars(), Some("pres"));
    assert_eq!(
        grid.point_data.names().collect::<Vec<_>>(),
        vec!["vel", "pres", "temp", "scal_1", "scal_2"]
    );
}

#[test]
fn missing_file() {
    let err = exavtk::read_grid(temp_path("does_not_exist.vtp")).unwrap_err();
    assert!(matches!(err, exavtk::Error::Io(_)));
}

#[test]
fn truncated_appended_section() {
    let grid = exavtk::build(&flow_snapshot(3, [2, 2, 2]), false).unwrap();

    let mut bytes = Vec::new();
    exavtk::write_vtk::<_, Binary>(&mut bytes, &grid).unwrap();
    bytes.truncate(bytes.len() - 40);

    let err = exavtk::parse_grid(&bytes).unwrap_err();
    assert!(matches!(err, exavtk::ParseError::ParsingBinary(_)));
}
