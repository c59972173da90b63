//! Nest clustering.
//!
//! Two nests of a team share a cluster when a chain of links connects them. Nest `a` links to
//! nest `b` when some open tile `t` next to `a` is itself next to `b`, or sits next to an open
//! tile that is next to `b`. Any nest, of either team, contributes to the tile-to-nest index,
//! but only nests of the requested team are ever merged into a cluster.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::{Grid, Point};

/// Maximal set of same-team nests connected by the shared-tile link.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NestCluster {
    nests: BTreeSet<Point>,
}

impl NestCluster {
    pub fn contains(&self, nest: Point) -> bool {
        self.nests.contains(&nest)
    }

    pub fn len(&self) -> usize {
        self.nests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.nests.iter().copied()
    }

    pub fn as_set(&self) -> &BTreeSet<Point> {
        &self.nests
    }

    pub fn into_set(self) -> BTreeSet<Point> {
        self.nests
    }
}

impl FromIterator<Point> for NestCluster {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            nests: iter.into_iter().collect(),
        }
    }
}

/// Groups nests into [`NestCluster`]s.
///
/// Built once from every nest on the board; [`ClusterFinder::clusters`] can then be asked for
/// each team separately.
#[derive(Debug, Clone)]
pub struct ClusterFinder<'g> {
    grid: &'g Grid,
    /// Open tile -> nests orthogonally adjacent to it.
    environs: HashMap<Point, Vec<Point>>,
}

impl<'g> ClusterFinder<'g> {
    pub fn new(grid: &'g Grid, all_nests: &[Point]) -> Self {
        let mut environs: HashMap<Point, Vec<Point>> = HashMap::new();
        for &nest in all_nests {
            let nest = grid.wrap(nest);
            for (_, environ) in grid.open_neighbors(nest) {
                environs.entry(environ).or_default().push(nest);
            }
        }
        Self { grid, environs }
    }

    /// Clusters of `team_nests`, in order of each cluster's first nest in `team_nests`.
    ///
    /// Every nest appears in exactly one cluster.
    pub fn clusters(&self, team_nests: &[Point]) -> Vec<NestCluster> {
        let grid = self.grid;
        let team: HashSet<Point> = team_nests.iter().map(|&n| grid.wrap(n)).collect();
        let mut visited: HashSet<Point> = HashSet::new();
        let mut out = Vec::new();

        for &seed in team_nests {
            let seed = grid.wrap(seed);
            if visited.contains(&seed) {
                continue;
            }

            let mut cluster = BTreeSet::new();
            let mut queue = VecDeque::new();
            cluster.insert(seed);
            visited.insert(seed);
            queue.push_back(seed);

            while let Some(current) = queue.pop_front() {
                for (_, environ) in grid.open_neighbors(current) {
                    for ext in std::iter::once(environ)
                        .chain(grid.open_neighbors(environ).map(|(_, p)| p))
                    {
                        let Some(touching) = self.environs.get(&ext) else {
                            continue;
                        };
                        for &nest in touching {
                            if team.contains(&nest) && cluster.insert(nest) {
                                visited.insert(nest);
                                queue.push_back(nest);
                            }
                        }
                    }
                }
            }

            out.push(NestCluster { nests: cluster });
        }

        out
    }
}
