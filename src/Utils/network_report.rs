//! Tabular console output of network evaluations.
use crate::Network::jacobian_assembler::{SparseJacobian, SparseJacobianLayout};
use crate::Network::species::{NCHEM, Species};
use prettytable::{Cell, Row, Table, row};

/// Amount and rate of change of every variable of one cell.
pub fn rhs_table(y: &[f64], ydot: &[f64], cell: usize) -> Table {
    let mut table = Table::new();
    table.add_row(row!["variable", "value", "d/dt", "timescale, s"]);
    for s in Species::ALL {
        let k = cell * NCHEM + s.index();
        let timescale = if ydot[k] != 0.0 {
            format!("{:.3e}", (y[k] / ydot[k]).abs())
        } else {
            "-".to_string()
        };
        table.add_row(row![
            s.name(),
            format!("{:.4e}", y[k]),
            format!("{:.4e}", ydot[k]),
            timescale
        ]);
    }
    table
}

/// One row per cell: temperature and net energy change.
pub fn temperature_table(temperatures: &[f64], ydot: &[f64]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["cell", "T, K", "dge/dt, erg/g/s"]);
    for (i, t) in temperatures.iter().enumerate() {
        table.add_row(row![
            i,
            format!("{:.2}", t),
            format!("{:.4e}", ydot[i * NCHEM + Species::Energy.index()])
        ]);
    }
    table
}

/// The nonzero block of one cell, rows by variable, blank outside the pattern.
pub fn jacobian_table(jac: &SparseJacobian, cell: usize) -> Table {
    let mut table = Table::new();
    let mut header = vec![Cell::new("d(row)/d(col)")];
    header.extend(Species::ALL.iter().map(|s| Cell::new(s.name())));
    table.add_row(Row::new(header));
    let base = cell * NCHEM;
    for s in Species::ALL {
        let mut cells = vec![Cell::new(s.name())];
        for col in 0..NCHEM {
            let text = match SparseJacobianLayout::position(s.index(), col) {
                Some(_) => format!("{:.2e}", jac.get(base + s.index(), base + col)),
                None => String::new(),
            };
            cells.push(Cell::new(&text));
        }
        table.add_row(Row::new(cells));
    }
    table
}
