use crate::ui::width_util::WidthUtil;
use std::io::Write;

#[derive(Debug, Clone, Default)]
pub struct TablePrinter {
    util: WidthUtil,
}

impl TablePrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_table<T: AsRef<str>>(
        &self,
        table_name: &str,
        headers: &[&str],
        rows: &[Vec<T>],
        empty_message: Option<&str>,
    ) {
        let mut stdout = std::io::stdout();
        let _ = self.render_table(table_name, headers, rows, empty_message, &mut stdout);
    }

    /// Render into any writer (used by tests to capture output).
    pub fn render_table<T: AsRef<str>, W: Write + ?Sized>(
        &self,
        table_name: &str,
        headers: &[&str],
        rows: &[Vec<T>],
        empty_message: Option<&str>,
        out: &mut W,
    ) -> std::io::Result<()> {
        let col_widths = self.compute_col_widths(headers, rows);
        let total_width = self.natural_width(&col_widths);

        if rows.is_empty() {
            if let Some(msg) = empty_message {
                let width = total_width
                    .max(self.util.visible_width(table_name))
                    .max(self.util.visible_width(msg));
                self.write_banner(out, table_name, width)?;
                writeln!(out, "{msg}")?;
                self.write_separator(out, width)?;
                return Ok(());
            }
        }

        self.write_banner(out, table_name, total_width)?;

        let header_line = headers
            .iter()
            .enumerate()
            .map(|(i, h)| self.util.pad_visible(h, col_widths[i]))
            .collect::<Vec<_>>()
            .join(" | ");
        writeln!(out, "{header_line}")?;
        self.write_separator(out, total_width)?;

        for row in rows {
            let line = row
                .iter()
                .enumerate()
                .take(col_widths.len())
                .map(|(i, cell)| self.util.pad_visible(cell.as_ref(), col_widths[i]))
                .collect::<Vec<_>>()
                .join(" | ");
            writeln!(out, "{line}")?;
        }
        self.write_separator(out, total_width)
    }

    fn compute_col_widths<T: AsRef<str>>(&self, headers: &[&str], rows: &[Vec<T>]) -> Vec<usize> {
        let mut col_widths: Vec<usize> = headers
            .iter()
            .map(|h| self.util.visible_width(h))
            .collect();
        for row in rows {
            for (i, cell) in row.iter().enumerate().take(col_widths.len()) {
                col_widths[i] = col_widths[i].max(self.util.visible_width(cell.as_ref()));
            }
        }
        col_widths
    }

    fn natural_width(&self, col_widths: &[usize]) -> usize {
        if col_widths.is_empty() {
            0
        } else {
            col_widths.iter().copied().sum::<usize>() + (col_widths.len() - 1) * 3
        }
    }

    fn write_banner<W: Write + ?Sized>(
        &self,
        out: &mut W,
        table_name: &str,
        width: usize,
    ) -> std::io::Result<()> {
        self.write_separator(out, width)?;
        writeln!(out, "{}", table_name.to_uppercase())?;
        self.write_separator(out, width)
    }

    fn write_separator<W: Write + ?Sized>(&self, out: &mut W, width: usize) -> std::io::Result<()> {
        let width = width.min(self.util.terminal_width()).max(1);
        writeln!(out, "{}", "-".repeat(width))
    }
}
