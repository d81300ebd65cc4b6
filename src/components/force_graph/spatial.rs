//! Uniform grid hash over node positions for proximity queries.
//!
//! Rebuilt once per frame after the layout step; queries return a superset of
//! the circular neighborhood and callers filter by exact distance.

use std::collections::HashMap;

use super::store::{NodeIdx, SimNode};

pub const DEFAULT_CELL_SIZE: f64 = 100.0;

#[derive(Clone, Debug)]
pub struct SpatialHash {
	cell_size: f64,
	grid: HashMap<(i64, i64), Vec<NodeIdx>>,
}

impl Default for SpatialHash {
	fn default() -> Self {
		Self::new(DEFAULT_CELL_SIZE)
	}
}

impl SpatialHash {
	pub fn new(cell_size: f64) -> Self {
		Self {
			cell_size: if cell_size > 0.0 { cell_size } else { DEFAULT_CELL_SIZE },
			grid: HashMap::new(),
		}
	}

	fn cell_of(&self, x: f64, y: f64) -> (i64, i64) {
		(
			(x / self.cell_size).floor() as i64,
			(y / self.cell_size).floor() as i64,
		)
	}

	pub fn clear(&mut self) {
		self.grid.clear();
	}

	pub fn insert(&mut self, idx: NodeIdx, x: f64, y: f64) {
		let cell = self.cell_of(x, y);
		self.grid.entry(cell).or_default().push(idx);
	}

	pub fn rebuild(&mut self, nodes: &[SimNode]) {
		self.clear();
		for (idx, node) in nodes.iter().enumerate() {
			self.insert(idx, node.x, node.y);
		}
	}

	/// All entries in cells within `ceil(radius / cell_size)` of the cell
	/// containing `(x, y)`.
	///
	/// When the neighborhood spans more cells than are occupied, occupied cells
	/// are scanned instead. Cell coordinates never wrap.
	pub fn query(&self, x: f64, y: f64, radius: f64) -> Vec<NodeIdx> {
		// `as` saturates, so an infinite reach becomes u64::MAX
		let reach = (radius.max(0.0) / self.cell_size).ceil() as u64;
		let (cx, cy) = self.cell_of(x, y);
		let span = reach.saturating_mul(2).saturating_add(1);
		let mut results = Vec::new();

		if span.saturating_mul(span) > self.grid.len() as u64 {
			for (&(gx, gy), cell) in &self.grid {
				if gx.abs_diff(cx) <= reach && gy.abs_diff(cy) <= reach {
					results.extend_from_slice(cell);
				}
			}
			return results;
		}

		let reach = reach as i64;
		for dx in -reach..=reach {
			for dy in -reach..=reach {
				let (Some(kx), Some(ky)) = (cx.checked_add(dx), cy.checked_add(dy)) else {
					continue;
				};
				if let Some(cell) = self.grid.get(&(kx, ky)) {
					results.extend_from_slice(cell);
				}
			}
		}
		results
	}
}
