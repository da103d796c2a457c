//! Board-indexing and guard-building helpers shared by the square-grid game
//! encoders (`breakthrough`, `amazons`): a cell at `(row, col)` on a
//! `width`-wide board is layer `row * width + col`, a flat owned buffer
//! rather than a nested one.
use ldfa_core::ldfa::constructors;
use ldfa_core::{Ldfa, Result, Shape};

pub const DIRECTIONS_8: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub fn cell(width: usize, row: usize, col: usize) -> usize {
    row * width + col
}

/// `(row, col)` of every square `dist` steps from `(row, col)` in direction
/// `dir`, stopping at the board edge. Index 0 is the closest square.
pub fn ray(width: usize, height: usize, row: usize, col: usize, dir: (i32, i32)) -> Vec<usize> {
    let mut out = Vec::new();
    let (mut r, mut c) = (row as i32, col as i32);
    loop {
        r += dir.0;
        c += dir.1;
        if r < 0 || c < 0 || r as usize >= height || c as usize >= width {
            break;
        }
        out.push(cell(width, r as usize, c as usize));
    }
    out
}

/// The LDFA accepting every position whose `layer` equals `value`.
pub fn value_guard(shape: &Shape, layer: usize, value: u32) -> Result<Ldfa> {
    constructors::fixed(shape.clone(), &[(layer, value)])
}

/// The LDFA accepting every position whose `layer` equals any of `values`.
pub fn any_value_guard(shape: &Shape, layer: usize, values: &[u32]) -> Result<Ldfa> {
    let mut acc = ldfa_core::ldfa::constructors::reject(shape.clone())?;
    for &v in values {
        acc = acc.union(&value_guard(shape, layer, v)?)?;
    }
    Ok(acc)
}

/// The LDFA accepting every position where every cell in `cells` equals
/// `value` (a clear-path guard over a ray prefix).
pub fn all_equal_guard(shape: &Shape, cells: &[usize], value: u32) -> Result<Ldfa> {
    let constraints: Vec<(usize, u32)> = cells.iter().map(|&c| (c, value)).collect();
    constructors::fixed(shape.clone(), &constraints)
}
