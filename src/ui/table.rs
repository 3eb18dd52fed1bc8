use std::fmt;
use unicode_width::UnicodeWidthStr;

/// Boxed text table with centred cells.
///
/// Column widths are measured in terminal cells, so wide characters line up.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Missing trailing cells render empty; extra cells are dropped.
    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.width())
                    .chain(std::iter::once(header.width()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn separator(widths: &[usize]) -> String {
        let mut line = String::from("+");
        for width in widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line
    }

    fn line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
        let mut line = String::from("|");
        for (col, width) in widths.iter().enumerate() {
            let cell = cells.get(col).map(|c| c.as_ref()).unwrap_or("");
            let pad = width.saturating_sub(cell.width());
            let left = pad / 2;
            line.push(' ');
            line.push_str(&" ".repeat(left));
            line.push_str(cell);
            line.push_str(&" ".repeat(pad - left));
            line.push_str(" |");
        }
        line
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        let separator = Self::separator(&widths);
        writeln!(f, "{}", separator)?;
        writeln!(f, "{}", Self::line(&self.headers, &widths))?;
        writeln!(f, "{}", separator)?;
        for row in &self.rows {
            writeln!(f, "{}", Self::line(row, &widths))?;
        }
        write!(f, "{}", separator)
    }
}
