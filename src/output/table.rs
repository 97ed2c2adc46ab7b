#![forbid(unsafe_code)]

use std::fmt::Write as _;
use std::io;
use std::io::Write as _;

/// Plain column-aligned text table for non-TTY output. Widths assume one
/// cell char per column; the ratatui UI does its own width handling.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cols: impl IntoIterator<Item = impl Into<String>>) {
        self.rows.push(cols.into_iter().map(Into::into).collect());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn print(&self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        write!(out, "{}", self.render())
    }

    pub fn write_csv(&self, out: impl io::Write) -> io::Result<()> {
        let mut wtr = csv::Writer::from_writer(out);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let w = cell.chars().count();
                if i >= widths.len() {
                    widths.push(w);
                } else {
                    widths[i] = widths[i].max(w);
                }
            }
        }

        let mut out = String::new();
        render_row(&mut out, &self.headers, &widths);
        for row in &self.rows {
            render_row(&mut out, row, &widths);
        }
        out
    }
}

fn render_row(out: &mut String, row: &[String], widths: &[usize]) {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        let is_last = i == row.len() - 1;
        if is_last {
            out.push_str(cell);
        } else {
            let w = widths.get(i).copied().unwrap_or(0);
            let _ = write!(out, "{cell:<w$}");
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_padded_to_the_widest_cell() {
        let mut t = Table::new(["ID", "TITLE", "STATUS"]);
        t.row(["1", "Write unit tests", "Pending"]);
        t.row(["2", "Ship", "Completed"]);

        let rendered = t.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID  TITLE"));
        assert!(lines[1].contains("Write unit tests  Pending"));
        // Short cells are padded so the status column lines up.
        assert!(lines[2].contains("Ship              Completed"));
    }

    #[test]
    fn trailing_column_is_not_padded() {
        let mut t = Table::new(["A", "B"]);
        t.row(["x", "y"]);
        let rendered = t.render();
        assert!(rendered.lines().all(|l| !l.ends_with(' ')));
    }

    #[test]
    fn csv_output_quotes_embedded_commas() {
        let mut t = Table::new(["ID", "TITLE"]);
        t.row(["1", "Fix a, b, and c"]);

        let mut buf = Vec::new();
        t.write_csv(&mut buf).expect("csv");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("ID,TITLE\n"));
        assert!(text.contains("\"Fix a, b, and c\""));
    }
}
