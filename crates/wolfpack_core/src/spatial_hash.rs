use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use wolfpack_data::Species;

#[derive(Clone, Default)]
/// Uniform grid over the x/z ground plane used for every neighbor lookup.
///
/// Stores entity indices in an offset array (compressed sparse rows):
/// `cell_offsets[i]..cell_offsets[i+1]` are the entries of cell `i` inside
/// `entity_indices`. Queries return candidate indices from the covered cells;
/// callers apply the exact distance test against their own position data.
///
/// # Examples
/// ```
/// use wolfpack_core::spatial_hash::SpatialHash;
///
/// let mut spatial = SpatialHash::new(8.0, 100, 100);
/// let positions = vec![(15.0, 15.0), (25.0, 25.0), (85.0, 85.0)];
/// spatial.build_parallel(&positions, 100, 100);
///
/// let mut nearby = Vec::new();
/// spatial.query_into(15.0, 15.0, 12.0, &mut nearby);
/// assert!(nearby.contains(&0));
/// ```
pub struct SpatialHash {
    pub cell_size: f64,
    pub width: u16,
    pub depth: u16,
    pub cols: usize,
    pub rows: usize,
    pub cell_offsets: Vec<usize>,
    pub entity_indices: Vec<usize>,
    species: Vec<Species>,
}

impl SpatialHash {
    pub fn new(cell_size: f64, width: u16, depth: u16) -> Self {
        let cols = (width as f64 / cell_size).ceil() as usize;
        let rows = (depth as f64 / cell_size).ceil() as usize;
        Self {
            cell_size,
            width,
            depth,
            cols,
            rows,
            cell_offsets: vec![0; cols * rows + 1],
            entity_indices: Vec::new(),
            species: Vec::new(),
        }
    }

    /// Flat cell index for a ground-plane coordinate, `None` when out of bounds
    /// or not finite.
    #[inline]
    pub fn get_cell_idx(&self, x: f64, z: f64) -> Option<usize> {
        if !x.is_finite() || !z.is_finite() {
            return None;
        }

        // Check for i32 overflow before casting
        if x.abs() > i32::MAX as f64 / self.cell_size {
            return None;
        }
        if z.abs() > i32::MAX as f64 / self.cell_size {
            return None;
        }

        let cx = (x / self.cell_size).floor() as i32;
        let cz = (z / self.cell_size).floor() as i32;
        if cx < 0 || cx >= self.cols as i32 || cz < 0 || cz >= self.rows as i32 {
            None
        } else {
            Some((cz as usize * self.cols) + cx as usize)
        }
    }

    pub fn build_parallel(&mut self, positions: &[(f64, f64)], width: u16, depth: u16) {
        let untagged: Vec<(f64, f64, Species)> = positions
            .iter()
            .map(|&(x, z)| (x, z, Species::Wolf))
            .collect();
        self.build_with_species(&untagged, width, depth);
    }

    /// Rebuilds the grid from `(x, z, species)` triples. Entry `i` of `data`
    /// becomes entity index `i`.
    pub fn build_with_species(&mut self, data: &[(f64, f64, Species)], width: u16, depth: u16) {
        self.width = width;
        self.depth = depth;
        self.cols = (f64::from(width) / self.cell_size).ceil() as usize;
        self.rows = (f64::from(depth) / self.cell_size).ceil() as usize;

        let cell_count = self.cols * self.rows;

        let atomic_counts: Vec<AtomicUsize> =
            (0..cell_count).map(|_| AtomicUsize::new(0)).collect();
        data.par_iter().for_each(|&(x, z, _)| {
            if let Some(idx) = self.get_cell_idx(x, z) {
                atomic_counts[idx].fetch_add(1, AtomicOrdering::Relaxed);
            }
        });
        let counts: Vec<usize> = atomic_counts.into_iter().map(|a| a.into_inner()).collect();

        self.cell_offsets.resize(cell_count + 1, 0);
        let mut total = 0;
        for (i, &count) in counts.iter().enumerate() {
            self.cell_offsets[i] = total;
            total += count;
        }
        self.cell_offsets[cell_count] = total;

        self.entity_indices.clear();
        self.entity_indices.resize(total, 0);

        let mut current_offsets = self.cell_offsets[..cell_count].to_vec();
        for (entity_idx, &(x, z, _)) in data.iter().enumerate() {
            if let Some(cell_idx) = self.get_cell_idx(x, z) {
                let write_idx = current_offsets[cell_idx];
                self.entity_indices[write_idx] = entity_idx;
                current_offsets[cell_idx] += 1;
            }
        }

        self.species.clear();
        self.species.extend(data.iter().map(|&(_, _, s)| s));
    }

    /// Visits every candidate index in the cells covering the query square.
    pub fn query_callback<F>(&self, x: f64, z: f64, radius: f64, mut callback: F)
    where
        F: FnMut(usize),
    {
        self.for_each_cell(x, z, radius, |start, end| {
            for &entity_idx in &self.entity_indices[start..end] {
                callback(entity_idx);
            }
        });
    }

    #[inline]
    pub fn query_into(&self, x: f64, z: f64, radius: f64, result: &mut Vec<usize>) {
        result.clear();
        self.for_each_cell(x, z, radius, |start, end| {
            result.extend_from_slice(&self.entity_indices[start..end]);
        });
    }

    /// Candidate count from cell occupancy, without a distance test.
    pub fn count_nearby(&self, x: f64, z: f64, radius: f64) -> usize {
        let mut count = 0;
        self.for_each_cell(x, z, radius, |start, end| count += end - start);
        count
    }

    /// Exact count of `species` within `radius`, using the positions the grid
    /// was built from.
    pub fn count_species_within(
        &self,
        x: f64,
        z: f64,
        radius: f64,
        species: Species,
        positions: &[(f64, f64)],
    ) -> usize {
        let r_sq = radius * radius;
        let mut count = 0;
        self.query_callback(x, z, radius, |idx| {
            if self.species.get(idx) != Some(&species) {
                return;
            }
            if let Some(&(px, pz)) = positions.get(idx) {
                let (dx, dz) = (px - x, pz - z);
                if dx * dx + dz * dz <= r_sq {
                    count += 1;
                }
            }
        });
        count
    }

    fn for_each_cell<F>(&self, x: f64, z: f64, radius: f64, mut visit: F)
    where
        F: FnMut(usize, usize),
    {
        if !x.is_finite() || !z.is_finite() || !radius.is_finite() || self.cols == 0 {
            return;
        }
        let min_cx = ((x - radius) / self.cell_size).floor() as i32;
        let max_cx = ((x + radius) / self.cell_size).floor() as i32;
        let min_cz = ((z - radius) / self.cell_size).floor() as i32;
        let max_cz = ((z + radius) / self.cell_size).floor() as i32;

        for cz in min_cz.max(0)..=max_cz.min(self.rows as i32 - 1) {
            for cx in min_cx.max(0)..=max_cx.min(self.cols as i32 - 1) {
                let cell_idx = (cz as usize * self.cols) + cx as usize;
                visit(self.cell_offsets[cell_idx], self.cell_offsets[cell_idx + 1]);
            }
        }
    }
}
