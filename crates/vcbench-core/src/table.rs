//! Fixed-width table output. Each driver declares its columns once; cells
//! arrive pre-formatted and are right-aligned into the column width with a
//! two-space gutter, matching what GNUPlot-style consumers expect.

use std::io::Write;

pub struct Column {
    pub name: &'static str,
    pub width: usize,
}

impl Column {
    /// Width is the larger of the header name and the widest expected cell.
    pub fn new(name: &'static str, min_width: usize) -> Self {
        Self { name, width: min_width.max(name.len()) }
    }
}

pub fn header(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| format!("{:>width$}", c.name, width = c.width))
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn row(columns: &[Column], cells: &[String]) -> String {
    debug_assert_eq!(columns.len(), cells.len());
    columns
        .iter()
        .zip(cells)
        .map(|(c, cell)| format!("{:>width$}", cell, width = c.width))
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn print_header(columns: &[Column]) {
    let mut stdout = std::io::stdout();
    let _ = writeln!(stdout, "{}", header(columns));
    let _ = stdout.flush();
}

pub fn print_row(columns: &[Column], cells: &[String]) {
    let mut stdout = std::io::stdout();
    let _ = writeln!(stdout, "{}", row(columns, cells));
    let _ = stdout.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_row_are_aligned() {
        let columns = [Column::new("string", 12), Column::new("numeric", 9)];
        let cells = ["hello!".to_string(), "100".to_string()];
        assert_eq!(header(&columns), "      string    numeric");
        assert_eq!(row(&columns, &cells), "      hello!        100");
    }

    #[test]
    fn narrow_column_grows_to_its_name() {
        let columns = [Column::new("magnitude", 2)];
        assert_eq!(columns[0].width, "magnitude".len());
    }

    #[test]
    fn overwide_cells_are_not_truncated() {
        let columns = [Column::new("n", 3)];
        let cells = ["123456".to_string()];
        assert_eq!(row(&columns, &cells), "123456");
    }
}
