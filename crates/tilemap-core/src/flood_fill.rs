//! Flood fill over any [`TileMatrix`].
//!
//! The fill replaces the 4-connected region of tiles that share the identifier found at the
//! origin. Every tile is written as soon as it is discovered, so a position can never be queued
//! twice and the affected list never contains duplicates.

use crate::storage::TileMatrix;
use crate::tile::{TileId, TilePos};
use std::collections::VecDeque;

/// Replace the connected region containing `origin` with `replacement`.
///
/// Positions written by the fill are appended to `affected` in discovery order when given.
/// Returns the number of replaced tiles. Nothing happens when `origin` is outside the matrix or
/// the region already holds `replacement`.
pub fn flood_fill<M: TileMatrix + ?Sized>(
    matrix: &mut M,
    origin: TilePos,
    replacement: TileId,
    mut affected: Option<&mut Vec<TilePos>>,
) -> usize {
    let Some(target) = matrix.tile_at(origin) else {
        return 0;
    };
    if target == replacement {
        return 0;
    }

    let mut replaced = 0;
    let mut queue = VecDeque::new();

    let mut write = |matrix: &mut M, pos: TilePos, queue: &mut VecDeque<TilePos>| {
        if matrix.set_tile(pos, replacement).is_ok() {
            replaced += 1;
            if let Some(affected) = affected.as_deref_mut() {
                affected.push(pos);
            }
            queue.push_back(pos);
        }
    };

    write(matrix, origin, &mut queue);
    while let Some(pos) = queue.pop_front() {
        for neighbor in pos.neighbors() {
            if matrix.tile_at(neighbor) == Some(target) {
                write(matrix, neighbor, &mut queue);
            }
        }
    }

    tracing::trace!(?origin, target, replacement, replaced, "flood fill");
    replaced
}
