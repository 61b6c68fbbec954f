use std::io;

use crate::error::Result;
use crate::grid::{Cell, Grid};
use crate::policy::Policy;
use crate::solver::Action;

/// Scientific notation with a signed two-digit exponent, e.g. `5.00e+00`.
fn sci(v: f64) -> String {
    let s = format!("{:.2e}", v);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => s,
    }
}

fn arrow(action: Action) -> char {
    match action {
        Action::Up => '↑',
        Action::Down => '↓',
        Action::Left => '←',
        Action::Right => '→',
    }
}

fn join_rows<F>(grid: &Grid, sep: &str, mut render: F) -> String
where
    F: FnMut(usize, usize) -> String,
{
    let mut out = String::new();
    for r in 0..grid.rows() {
        let row: Vec<String> = (0..grid.cols()).map(|c| render(r, c)).collect();
        out.push_str(&row.join(sep));
        out.push('\n');
    }
    out
}

/// Raw cell values.
pub fn render_map(grid: &Grid) -> String {
    join_rows(grid, " ", |r, c| format!("{:3}", grid.cells()[[r, c]]))
}

/// Value estimates for free cells, with walls and terminals marked.
pub fn render_values(grid: &Grid, values: &ndarray::Array2<f64>) -> String {
    join_rows(grid, " ", |r, c| match Cell::from(grid.cells()[[r, c]]) {
        Cell::Wall => String::from("  WALL    "),
        Cell::Terminal(_) => String::from("  TERMINAL"),
        Cell::Free => format!("{:>10}", sci(values[[r, c]])),
    })
}

/// One arrow per free cell. Walls are `█`, positive terminals show their
/// reward, and `N` marks any other cell without an action.
pub fn render_policy(grid: &Grid, policy: &Policy) -> String {
    join_rows(grid, " ", |r, c| match Cell::from(grid.cells()[[r, c]]) {
        Cell::Wall => String::from("█"),
        Cell::Terminal(reward) if reward > 0 => reward.to_string(),
        _ => match policy.get(r, c) {
            Some(action) => arrow(action).to_string(),
            None => String::from("N"),
        },
    })
}

/// Value grid as CSV, one record per row. Walls and terminals are empty.
pub fn write_values_csv<W: io::Write>(
    grid: &Grid,
    values: &ndarray::Array2<f64>,
    out: W,
) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    for (r, row) in values.rows().into_iter().enumerate() {
        let record: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(c, v)| match Cell::from(grid.cells()[[r, c]]) {
                Cell::Free => v.to_string(),
                _ => String::new(),
            })
            .collect();
        wtr.write_record(&record)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Policy grid as CSV using action labels. Cells without an action are
/// empty.
pub fn write_policy_csv<W: io::Write>(policy: &Policy, out: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    for row in policy.actions.rows() {
        wtr.write_record(row.iter().map(|a| a.map_or("", |a| a.label())))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{fixtures, Mdp};
    use test_case::test_case;

    #[test_case(5.0, "5.00e+00"; "Whole number")]
    #[test_case(0.0, "0.00e+00"; "Zero")]
    #[test_case(0.000123, "1.23e-04"; "Small")]
    #[test_case(-2500.0, "-2.50e+03"; "Negative")]
    fn scientific_notation(v: f64, expected: &str) {
        assert_eq!(sci(v), expected);
    }

    #[test]
    fn render_linear_map() {
        let grid = fixtures::linear();
        assert_eq!(render_map(&grid), "  4   0   0   0   0   0   0   1\n");
    }

    #[test]
    fn render_value_markers() {
        // Arrange
        let grid = Grid::new(vec![vec![0, -1, 1]]).unwrap();
        let values = ndarray::array![[0.5, 0.0, 0.0]];
        // Act
        let out = render_values(&grid, &values);
        // Assert
        assert_eq!(out, "  5.00e-01   WALL       TERMINAL\n");
    }

    #[test]
    fn render_policy_arrows() {
        // Arrange
        let grid = Grid::new(vec![vec![1, 0, -1, 0, -3]]).unwrap();
        let values = ndarray::Array2::<f64>::zeros(grid.dim());
        let policy = Policy::extract(&Mdp::new(&grid, 0.5), &values).unwrap();
        // Act
        let out = render_policy(&grid, &policy);
        // Assert
        assert_eq!(out, "1 ← █ ↑ N\n");
    }

    #[test]
    fn render_ends_every_row_with_newline() {
        let grid = fixtures::uturn();
        let out = render_map(&grid);
        assert_eq!(out.lines().count(), 4);
        assert!(out.ends_with("  0  -1   1  -1   0\n"));
    }

    #[test]
    fn values_csv_blanks_non_free_cells() {
        // Arrange
        let grid = Grid::new(vec![vec![1, 0, -1], vec![0, 0, 0]]).unwrap();
        let values = ndarray::array![[0.0, 1.0, 0.0], [0.5, 0.25, 0.125]];
        let mut buf = Vec::new();
        // Act
        write_values_csv(&grid, &values, &mut buf).unwrap();
        // Assert
        assert_eq!(String::from_utf8(buf).unwrap(), ",1,\n0.5,0.25,0.125\n");
    }

    #[test]
    fn policy_csv_uses_labels() {
        let grid = Grid::new(vec![vec![1, 0, 0, -1]]).unwrap();
        let values = ndarray::Array2::<f64>::zeros(grid.dim());
        let policy = Policy::extract(&Mdp::new(&grid, 0.5), &values).unwrap();
        let mut buf = Vec::new();
        write_policy_csv(&policy, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), ",LEFT,UP,\n");
    }
}
