// src/processing/regionprops/perimeter.rs
use std::f64::consts::SQRT_2;

use ndarray::Array2;

const NEIGHBOURHOOD: [[u8; 3]; 3] = [[10, 2, 10], [2, 1, 2], [10, 2, 10]];

/// Weight of each boundary-pixel configuration code.
fn code_weight(code: u8) -> f64 {
    match code {
        5 | 7 | 15 | 17 | 25 | 27 => 1.0,
        21 | 33 => SQRT_2,
        13 | 23 => (1.0 + SQRT_2) / 2.0,
        _ => 0.0,
    }
}

/// Perimeter of a 2D binary mask, estimated from its 4-connected boundary.
///
/// Boundary pixels are foreground pixels with at least one 4-neighbour in the
/// background (pixels outside the mask count as background). Each boundary
/// pixel is classified by its 8-neighbourhood of boundary pixels and
/// contributes 1, sqrt(2) or (1 + sqrt(2)) / 2.
pub fn perimeter(mask: &Array2<bool>) -> f64 {
    let (rows, cols) = mask.dim();
    let inside = |r: isize, c: isize| -> bool {
        r >= 0
            && c >= 0
            && (r as usize) < rows
            && (c as usize) < cols
            && mask[[r as usize, c as usize]]
    };

    let border = Array2::from_shape_fn((rows, cols), |(r, c)| {
        let (r, c) = (r as isize, c as isize);
        inside(r, c)
            && !(inside(r - 1, c) && inside(r + 1, c) && inside(r, c - 1) && inside(r, c + 1))
    });
    let on_border = |r: isize, c: isize| -> bool {
        r >= 0
            && c >= 0
            && (r as usize) < rows
            && (c as usize) < cols
            && border[[r as usize, c as usize]]
    };

    let mut total = 0.0;
    for ((r, c), &is_border) in border.indexed_iter() {
        if !is_border {
            continue;
        }
        let mut code = 0u8;
        for (dr, row) in NEIGHBOURHOOD.iter().enumerate() {
            for (dc, &weight) in row.iter().enumerate() {
                let nr = r as isize + dr as isize - 1;
                let nc = c as isize + dc as isize - 1;
                if on_border(nr, nc) {
                    code += weight;
                }
            }
        }
        total += code_weight(code);
    }
    total
}
