use crate::GaussianProblem;
use fnt_core::FntResult;
use log::debug;

/// Reduces the problem in place to reduced row-echelon form over GF(2).
///
/// Columns are processed left to right. The pivot for a column is moved into
/// the current pivot row by XOR rather than by swapping, so storage order never
/// changes. On success row `i` holds exactly coefficient `i` for every `i`, and
/// rows past the rank are all-zero.
///
/// Returns `Ok(false)` when some column finds no pivot. That is an expected
/// outcome (too few independent rows), not an error.
pub fn solve<P: GaussianProblem>(problem: &mut P) -> FntResult<bool> {
    let rows = problem.num_rows();
    let cols = problem.num_coefficients();
    let mut pivot = 0;

    for col in 0..cols {
        if pivot >= rows { break; }

        // 1. Find a row at or below the pivot with this column set
        let mut found = None;
        for r in pivot..rows {
            if problem.has_coefficient(r, col)? {
                found = Some(r);
                break;
            }
        }
        let Some(found) = found else {
            debug!("column {} has no pivot", col);
            continue;
        };

        // 2. Logical swap: the pivot row lacks this column, so XOR sets it
        if found != pivot {
            problem.xor(found, pivot)?;
        }

        // 3. Clear the column everywhere else
        for r in 0..rows {
            if r != pivot && problem.has_coefficient(r, col)? {
                problem.xor(pivot, r)?;
            }
        }
        pivot += 1;
    }

    debug!("elimination finished: rank {} of {}", pivot, cols);
    Ok(pivot == cols)
}
