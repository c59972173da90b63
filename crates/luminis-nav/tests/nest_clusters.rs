use std::collections::BTreeSet;

use luminis_nav::{ClusterFinder, Grid, Point};

fn points(raw: &[(i32, i32)]) -> Vec<Point> {
    raw.iter().copied().map(Point::from).collect()
}

fn as_sets(clusters: Vec<luminis_nav::NestCluster>) -> Vec<BTreeSet<Point>> {
    clusters.into_iter().map(|c| c.into_set()).collect()
}

const FRIENDLY: &[(i32, i32)] = &[(1, 7), (2, 5), (4, 5), (5, 3), (6, 7)];
const ENEMY: &[(i32, i32)] = &[(4, 8), (8, 6), (7, 4), (10, 4)];

#[test]
fn friendly_nests_form_two_clusters() {
    let grid = Grid::open(19, 19);
    let friendly = points(FRIENDLY);
    let all: Vec<Point> = friendly.iter().copied().chain(points(ENEMY)).collect();

    let clusters = as_sets(ClusterFinder::new(&grid, &all).clusters(&friendly));

    let expected: Vec<BTreeSet<Point>> = vec![
        points(&[(1, 7), (2, 5), (4, 5), (5, 3)]).into_iter().collect(),
        points(&[(6, 7)]).into_iter().collect(),
    ];
    assert_eq!(clusters.len(), expected.len());
    for set in &expected {
        assert!(clusters.contains(set), "missing cluster {set:?}");
    }
}

#[test]
fn enemy_nests_form_two_clusters() {
    let grid = Grid::open(19, 19);
    let enemy = points(ENEMY);
    let all: Vec<Point> = points(FRIENDLY).into_iter().chain(enemy.iter().copied()).collect();

    let clusters = as_sets(ClusterFinder::new(&grid, &all).clusters(&enemy));

    let expected: Vec<BTreeSet<Point>> = vec![
        points(&[(4, 8)]).into_iter().collect(),
        points(&[(8, 6), (7, 4), (10, 4)]).into_iter().collect(),
    ];
    assert_eq!(clusters.len(), expected.len());
    for set in &expected {
        assert!(clusters.contains(set), "missing cluster {set:?}");
    }
}

#[test]
fn clusters_partition_the_team_regardless_of_input_order() {
    let grid = Grid::open(19, 19);
    let mut friendly = points(FRIENDLY);
    let forward = as_sets(ClusterFinder::new(&grid, &friendly).clusters(&friendly));

    friendly.reverse();
    let backward = as_sets(ClusterFinder::new(&grid, &friendly).clusters(&friendly));

    let normalize = |mut v: Vec<BTreeSet<Point>>| {
        v.sort();
        v
    };
    assert_eq!(normalize(forward.clone()), normalize(backward));

    let covered: usize = forward.iter().map(BTreeSet::len).sum();
    let union: BTreeSet<Point> = forward.into_iter().flatten().collect();
    assert_eq!(covered, FRIENDLY.len(), "clusters must not overlap");
    assert_eq!(union, points(FRIENDLY).into_iter().collect());
}

#[test]
fn other_team_nests_are_never_merged() {
    let grid = Grid::open(19, 19);
    let mine = points(&[(2, 2)]);
    let theirs = points(&[(3, 2), (2, 3)]);
    let all: Vec<Point> = mine.iter().chain(theirs.iter()).copied().collect();

    let clusters = ClusterFinder::new(&grid, &all).clusters(&mine);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].len(), 1);
    assert!(clusters[0].contains(Point::new(2, 2)));
}

#[test]
fn no_nests_no_clusters() {
    let grid = Grid::open(5, 5);
    assert!(ClusterFinder::new(&grid, &[]).clusters(&[]).is_empty());
}
