//! Interactive file selection

use colored::Colorize;
use folio_core::format_size;
use folio_import_types::{DiscoveredFile, FileSelector, ImportError, ImportResult};
use std::io::{self, BufRead, Write};

const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Lists discovered files and asks which to import
///
/// Accepts `all`, an empty answer (all files), or numbers and ranges such
/// as `1,3-4`.
pub struct PromptSelector;

impl PromptSelector {
    fn print_files(files: &[DiscoveredFile]) {
        println!();
        println!("{}", "Files found:".bright_white().bold());
        let width = files.len().to_string().len();
        for (index, file) in files.iter().enumerate() {
            let number = format!("{:>width$}", index + 1, width = width);
            println!(
                "  {}) {}  {}  {}",
                number.bright_cyan(),
                format_size(file.size),
                file.modified.format(DATE_FORMAT),
                file.name
            );
        }
        println!();
    }
}

impl FileSelector for PromptSelector {
    fn select(&self, files: Vec<DiscoveredFile>) -> ImportResult<Vec<DiscoveredFile>> {
        Self::print_files(&files);

        print!(
            "{} ",
            "Files to import (e.g. 1,3-4 or all) [all]:".bright_white().bold()
        );
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;

        let indices = parse_selection(&answer, files.len())?;
        Ok(files
            .into_iter()
            .enumerate()
            .filter(|(index, _)| indices.contains(index))
            .map(|(_, file)| file)
            .collect())
    }
}

/// Zero-based indices chosen by `input`, sorted and de-duplicated
pub fn parse_selection(input: &str, count: usize) -> ImportResult<Vec<usize>> {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("all") {
        return Ok((0..count).collect());
    }

    let invalid = |part: &str| ImportError::InvalidInput(format!("invalid selection: {}", part));
    let number = |part: &str| -> ImportResult<usize> {
        match part.trim().parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
            _ => Err(invalid(part)),
        }
    };

    let mut indices = Vec::new();
    for part in input.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (number(start)?, number(end)?);
                if start > end {
                    return Err(invalid(part));
                }
                indices.extend(start..=end);
            }
            None => indices.push(number(part)?),
        }
    }

    indices.sort_unstable();
    indices.dedup();
    Ok(indices)
}
