use std::collections::HashMap;

const MISSING_CELL: &str = "NaN";

/// A sheet read into header + rows of display strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TextTable {
    /// Builds a table from raw rows, using the first row as headers.
    ///
    /// Blank headers become `Unnamed: <i>` and repeated headers get a `.N`
    /// suffix. Blank data cells become `NaN`.
    pub fn from_rows(mut raw: Vec<Vec<String>>) -> Self {
        if raw.is_empty() {
            return Self::default();
        }

        let header_row = raw.remove(0);
        let width = raw
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header_row.len()))
            .max()
            .unwrap_or(0);

        let headers = dedupe_headers(
            (0..width)
                .map(|i| {
                    let name = header_row.get(i).map(|s| s.trim()).unwrap_or("");
                    if name.is_empty() {
                        format!("Unnamed: {}", i)
                    } else {
                        name.to_string()
                    }
                })
                .collect(),
        );

        let rows = raw
            .into_iter()
            .map(|row| {
                (0..width)
                    .map(|i| match row.get(i) {
                        Some(cell) if !cell.is_empty() => cell.clone(),
                        _ => MISSING_CELL.to_string(),
                    })
                    .collect()
            })
            .collect();

        Self { headers, rows }
    }

    /// Renders the table as a fixed-width text dump: a left-aligned row index
    /// followed by right-aligned columns separated by two spaces.
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return format!(
                "Empty DataFrame\nColumns: [{}]\nIndex: []",
                self.headers.join(", ")
            );
        }

        let index_width = (self.rows.len() - 1).to_string().len();
        let column_widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                self.rows
                    .iter()
                    .map(|row| display_width(&row[col]))
                    .chain(std::iter::once(display_width(header)))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(self.rows.len() + 1);

        let mut header_line = " ".repeat(index_width);
        for (header, width) in self.headers.iter().zip(&column_widths) {
            header_line.push_str("  ");
            header_line.push_str(&pad_left(header, *width));
        }
        lines.push(header_line);

        for (index, row) in self.rows.iter().enumerate() {
            let mut line = pad_right(&index.to_string(), index_width);
            for (cell, width) in row.iter().zip(&column_widths) {
                line.push_str("  ");
                line.push_str(&pad_left(cell, *width));
            }
            lines.push(line);
        }

        lines.join("\n")
    }
}

fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|name| {
            let count = seen.entry(name.clone()).or_insert(0);
            let result = if *count == 0 {
                name
            } else {
                format!("{}.{}", name, count)
            };
            *count += 1;
            result
        })
        .collect()
}

fn display_width(s: &str) -> usize {
    s.chars().count()
}

fn pad_left(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    format!("{}{}", " ".repeat(fill), s)
}

fn pad_right(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    format!("{}{}", s, " ".repeat(fill))
}

/// Truncates `s` to at most `max_chars` characters without splitting one.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}
