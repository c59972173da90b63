use std::io::{Cursor, Write};

use luminis_nav::{
    CacheError, Direction, Grid, Navigation, NavigationTable, Navigator, PathFinder, Point,
    ProximitySearch,
};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

fn small_board() -> Grid {
    let mut grid = Grid::open(6, 5);
    for q in [(2, 0), (2, 1), (2, 2), (4, 3), (0, 4)] {
        grid.set_wall(Point::from(q), true);
    }
    grid
}

/// Flattened table payload for `grid`, derived from live search.
fn table_payload(grid: &Grid) -> Vec<u8> {
    let (w, h) = (grid.width(), grid.height());
    let mut out = vec![w as u8, h as u8, w as u8, h as u8, 2];
    let finder = PathFinder::new(grid);
    for sx in 0..w {
        for sy in 0..h {
            for ex in 0..w {
                for ey in 0..h {
                    let (start, end) = (Point::new(sx, sy), Point::new(ex, ey));
                    let direction = finder.next_direction(start, end);
                    let distance = finder.path_distance(start, end).unwrap_or(0);
                    out.push(direction.code());
                    out.push(distance as u8);
                }
            }
        }
    }
    out
}

fn archive(entry: &str, payload: &[u8]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file(entry, options).expect("start entry");
    writer.write_all(payload).expect("write payload");
    writer.finish().expect("finish archive").into_inner()
}

#[test]
fn loaded_table_agrees_with_live_search() {
    let grid = small_board();
    let bytes = archive("data", &table_payload(&grid));
    let table = NavigationTable::from_archive(Cursor::new(bytes)).expect("load table");

    assert!(table.covers(&grid));
    let live = PathFinder::new(&grid);
    let cached = Navigation::select(&grid, Some(&table));
    assert!(cached.is_cached());

    for start in grid.points() {
        let field = ProximitySearch::new(&grid).distance_field(start);
        for end in grid.points() {
            assert_eq!(
                cached.next_direction(start, end),
                live.next_direction(start, end),
                "direction {start} -> {end}"
            );
            assert_eq!(
                cached.path_distance(start, end),
                live.path_distance(start, end),
                "distance {start} -> {end}"
            );
            if !grid.is_wall(start) {
                assert_eq!(cached.path_distance(start, end), field.get(end));
            }
        }
    }
}

#[test]
fn table_lookups_wrap_coordinates() {
    let grid = small_board();
    let bytes = archive("data", &table_payload(&grid));
    let table = NavigationTable::from_archive(Cursor::new(bytes)).expect("load table");

    let (a, b) = (Point::new(0, 0), Point::new(5, 1));
    let (a_far, b_far) = (Point::new(6, -5), Point::new(-1, 6));
    assert_eq!(table.next_direction(a, b), table.next_direction(a_far, b_far));
    assert_eq!(table.distance(a, b), table.distance(a_far, b_far));
    assert_eq!(table.next_direction(a, b), Direction::South);
}

#[test]
fn load_reads_an_archive_from_disk() {
    let grid = small_board();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("small.nac");
    std::fs::write(&path, archive("data", &table_payload(&grid))).expect("write archive");

    let table = NavigationTable::load(&path).expect("load table");
    assert_eq!(table.dimensions(), (6, 5));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = NavigationTable::load(&dir.path().join("absent.nac")).expect_err("no file");
    assert!(matches!(err, CacheError::Io(_)));
}

#[test]
fn archive_without_data_entry_is_rejected() {
    let bytes = archive("other", &[1, 1, 1, 1, 2, 0, 0]);
    let err = NavigationTable::from_archive(Cursor::new(bytes)).expect_err("no data entry");
    assert!(matches!(err, CacheError::MissingEntry));
}

#[test]
fn garbage_is_not_an_archive() {
    let err = NavigationTable::from_archive(Cursor::new(b"not a zip".to_vec()))
        .expect_err("not an archive");
    assert!(matches!(err, CacheError::Archive(_)));
}

#[test]
fn truncated_payload_is_corruption() {
    let grid = small_board();
    let mut payload = table_payload(&grid);
    payload.truncate(payload.len() - 2);
    let err = NavigationTable::from_archive(Cursor::new(archive("data", &payload)))
        .expect_err("short payload");
    assert!(matches!(err, CacheError::Corrupted { .. }));
}

#[test]
fn table_for_another_board_falls_back_to_live_search() {
    let grid = small_board();
    let bytes = archive("data", &table_payload(&grid));
    let table = NavigationTable::from_archive(Cursor::new(bytes)).expect("load table");

    let other = Grid::open(7, 5);
    assert!(!table.covers(&other));
    let nav = Navigation::select(&other, Some(&table));
    assert!(!nav.is_cached());
    assert_eq!(nav.path_distance(Point::new(0, 0), Point::new(3, 0)), Some(3));
}
