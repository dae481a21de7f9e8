//! Terminal rendering of an import run

use colored::Colorize;
use folio_import::ImportReport;
use folio_import_types::{SaveStatus, SUMMARY_HEADERS};

/// Pad every cell to its column width
fn pad_rows(headers: &[String], rows: &[Vec<String>]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let pad = |cells: &[String]| -> Vec<String> {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect()
    };

    (pad(headers), rows.iter().map(|row| pad(row)).collect())
}

fn status_color(label: &str, cell: String) -> String {
    match SaveStatus::ALL.iter().find(|status| status.label() == label) {
        Some(SaveStatus::Created) => cell.green().to_string(),
        Some(SaveStatus::Updated) => cell.cyan().to_string(),
        Some(SaveStatus::Failed) => cell.red().to_string(),
        Some(SaveStatus::Skipped) => cell.yellow().to_string(),
        _ => cell,
    }
}

fn print_table(headers: &[String], rows: &[Vec<String>], status_column: Option<usize>) {
    let (headers, padded) = pad_rows(headers, rows);
    println!("  {}", headers.join("  ").bright_white().bold());
    for (raw, row) in rows.iter().zip(padded) {
        let cells: Vec<String> = row
            .into_iter()
            .enumerate()
            .map(|(index, cell)| match status_column {
                Some(column) if column == index => status_color(raw[index].trim(), cell),
                _ => cell,
            })
            .collect();
        println!("  {}", cells.join("  "));
    }
}

/// Summary table, detail table and file failures
pub fn print_report(report: &ImportReport) {
    let log = &report.log;

    let details = log.details();
    if !details.is_empty() {
        println!();
        println!("{}", "Details".bright_white().bold());
        let status_column = details.headers.iter().position(|h| h == "Status");
        print_table(&details.headers, &details.rows, status_column);
    }

    let headers: Vec<String> = SUMMARY_HEADERS.iter().map(|h| h.to_string()).collect();
    let mut rows: Vec<Vec<String>> = log.summary().iter().map(|file| file.cells()).collect();
    if rows.len() > 1 {
        let totals = log.totals();
        rows.push(vec![
            "All files".to_string(),
            totals.total.to_string(),
            totals.created.to_string(),
            totals.updated.to_string(),
            totals.skipped.to_string(),
            totals.failed.to_string(),
            totals.noop.to_string(),
        ]);
    }

    println!();
    println!("{}", "Summary".bright_white().bold());
    print_table(&headers, &rows, None);

    if !log.failures().is_empty() {
        println!();
        println!("{}", "Files with errors".bright_red().bold());
        for failure in log.failures() {
            println!("  {} {}", "✗".bright_red(), failure.message);
        }
    }

    println!();
    println!(
        "{} {} rows from {} files in {:.2?}",
        "Done:".bright_green().bold(),
        log.total_entries(),
        report.files.len(),
        report.duration
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_rows_uses_widest_cell() {
        let headers = vec!["Id".to_string(), "Path".to_string()];
        let rows = vec![
            vec!["12".to_string(), "about".to_string()],
            vec!["N/A".to_string(), "a".to_string()],
        ];

        let (headers, rows) = pad_rows(&headers, &rows);

        assert_eq!(headers, vec!["Id ", "Path "]);
        assert_eq!(rows[0], vec!["12 ", "about"]);
        assert_eq!(rows[1], vec!["N/A", "a    "]);
    }
}
