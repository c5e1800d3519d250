//! Vectorization of a raster valid-data mask into a pixel space polygon.
//!
//! Regions are 4-connected groups of valid pixels, labelled in row-major scan
//! order. Ring vertices are pixel corners, `x` being the column and `y` the row.

use std::collections::{BTreeMap, VecDeque};

use geo::{Coord, LineString, Polygon};
use ndarray::{Array2, ArrayView2};

/// Which mask regions make up a footprint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegionPolicy {
    /// Keep the first region in scan order and drop the others.
    #[default]
    FirstRegionOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaskFootprint {
    /// Outline in pixel space, holes as interior rings.
    pub polygon: Polygon,
    /// Number of regions found in the mask.
    pub regions: usize,
}

/// `None` when the mask has no valid pixel.
pub fn vectorize_mask(mask: ArrayView2<bool>, policy: RegionPolicy) -> Option<MaskFootprint> {
    let (labels, regions) = label_regions(mask);
    let label = match policy {
        RegionPolicy::FirstRegionOnly => 1,
    };
    if regions < label {
        return None;
    }

    let mut rings = RegionEdges::new(&labels, label).into_rings().into_iter();
    let exterior = rings.next()?;
    Some(MaskFootprint {
        polygon: Polygon::new(to_line_string(exterior), rings.map(to_line_string).collect()),
        regions: regions as usize,
    })
}

/// Labels from 1 in scan order, 0 for invalid pixels.
fn label_regions(mask: ArrayView2<bool>) -> (Array2<u32>, u32) {
    let (rows, cols) = mask.dim();
    let mut labels = Array2::<u32>::zeros((rows, cols));
    let mut count = 0;
    let mut queue = VecDeque::new();

    for ((row, col), &valid) in mask.indexed_iter() {
        if !valid || labels[[row, col]] != 0 {
            continue;
        }
        count += 1;
        labels[[row, col]] = count;
        queue.push_back((row, col));
        while let Some((row, col)) = queue.pop_front() {
            let neighbours = [
                (row.wrapping_sub(1), col),
                (row + 1, col),
                (row, col.wrapping_sub(1)),
                (row, col + 1),
            ];
            for (row, col) in neighbours {
                if row < rows && col < cols && mask[[row, col]] && labels[[row, col]] == 0 {
                    labels[[row, col]] = count;
                    queue.push_back((row, col));
                }
            }
        }
    }
    (labels, count)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    East,
    South,
    West,
    North,
}

impl Step {
    /// `(row, col)` offset.
    fn offset(self) -> (isize, isize) {
        match self {
            Step::East => (0, 1),
            Step::South => (1, 0),
            Step::West => (0, -1),
            Step::North => (-1, 0),
        }
    }

    /// Clockwise on screen, rows growing downwards.
    fn right(self) -> Self {
        match self {
            Step::East => Step::South,
            Step::South => Step::West,
            Step::West => Step::North,
            Step::North => Step::East,
        }
    }

    fn left(self) -> Self {
        self.right().right().right()
    }
}

/// `(row, col)` pixel corner.
type Vertex = (usize, usize);

/// Directed boundary edges of one region, keeping the region on their right.
struct RegionEdges {
    outgoing: BTreeMap<Vertex, Vec<Step>>,
}

impl RegionEdges {
    fn new(labels: &Array2<u32>, label: u32) -> Self {
        let (rows, cols) = labels.dim();
        let outside = |row: Option<usize>, col: Option<usize>| match (row, col) {
            (Some(row), Some(col)) if row < rows && col < cols => labels[[row, col]] != label,
            _ => true,
        };
        let mut outgoing: BTreeMap<Vertex, Vec<Step>> = BTreeMap::new();
        for ((row, col), _) in labels.indexed_iter().filter(|(_, value)| **value == label) {
            let sides = [
                (outside(row.checked_sub(1), Some(col)), (row, col), Step::East),
                (outside(Some(row), Some(col + 1)), (row, col + 1), Step::South),
                (outside(Some(row + 1), Some(col)), (row + 1, col + 1), Step::West),
                (outside(Some(row), col.checked_sub(1)), (row + 1, col), Step::North),
            ];
            for (is_boundary, from, step) in sides {
                if is_boundary {
                    outgoing.entry(from).or_default().push(step);
                }
            }
        }
        Self { outgoing }
    }

    fn take(&mut self, vertex: Vertex, preferred: &[Step]) -> Option<Step> {
        let steps = self.outgoing.get_mut(&vertex)?;
        let index = preferred
            .iter()
            .find_map(|step| steps.iter().position(|candidate| candidate == step))?;
        let step = steps.swap_remove(index);
        if steps.is_empty() {
            self.outgoing.remove(&vertex);
        }
        Some(step)
    }

    /// Closed rings, the outer boundary first.
    ///
    /// The smallest remaining vertex is always the upper left corner of a ring,
    /// and the first one is the upper left corner of the first pixel in scan order.
    fn into_rings(mut self) -> Vec<Vec<Vertex>> {
        let mut rings = Vec::new();
        loop {
            let Some((&start, steps)) = self.outgoing.first_key_value() else {
                break;
            };
            let first = steps[0];
            let Some(ring) = self.trace(start, first) else {
                break;
            };
            rings.push(ring);
        }
        rings
    }

    /// Follows edges from `start`, turning left whenever possible. Where the
    /// region touches itself at a corner the ring splits there, so a hole
    /// meeting the outside diagonally is its own ring touching the exterior
    /// at one point instead of a self-touching exterior.
    fn trace(&mut self, start: Vertex, first: Step) -> Option<Vec<Vertex>> {
        let mut step = self.take(start, &[first])?;
        let mut ring = vec![start];
        let mut vertex = start;
        loop {
            let (d_row, d_col) = step.offset();
            vertex = (
                vertex.0.checked_add_signed(d_row)?,
                vertex.1.checked_add_signed(d_col)?,
            );
            if vertex == start {
                break;
            }
            let next = self.take(vertex, &[step.left(), step, step.right()])?;
            if next != step {
                ring.push(vertex);
            }
            step = next;
        }
        ring.push(start);
        Some(ring)
    }
}

fn to_line_string(ring: Vec<Vertex>) -> LineString {
    ring.into_iter()
        .map(|(row, col)| Coord {
            x: col as f64,
            y: row as f64,
        })
        .collect()
}
