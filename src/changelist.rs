//! Change-list parsing.
//!
//! A change list is a text file with one repository per line:
//!
//! ```text
//! <org>/<repo>   <true|false>
//! ```
//!
//! The second field is the visibility of the repository to create. Parsing is
//! strict: any malformed line is an error, never a skipped record.

use std::io::BufRead;

use anyhow::{Context, Result};

use crate::error::ImportError;

/// One parsed line of a change list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeListEntry {
    pub org: String,
    pub repo: String,
    pub private: bool,
}

impl ChangeListEntry {
    /// The `org/repo` identifier.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.org, self.repo)
    }

    /// Path of the local repository, relative to the working directory.
    pub fn local_path(&self) -> String {
        format!("{}.git", self.full_name())
    }
}

/// Parse a single change-list line. `line_number` is 1-based and only used
/// for error reporting.
pub fn parse_line(line_number: usize, line: &str) -> Result<ChangeListEntry, ImportError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [full_name, private] = fields.as_slice() else {
        return Err(ImportError::InvalidLineFormat {
            line_number,
            line: line.to_string(),
        });
    };

    let private = parse_bool(private).ok_or_else(|| ImportError::InvalidPrivateFlag {
        full_name: full_name.to_string(),
        value: private.to_string(),
    })?;

    let (org, repo) = split_full_name(full_name)?;

    Ok(ChangeListEntry {
        org: org.to_string(),
        repo: repo.to_string(),
        private,
    })
}

/// Boolean literals accepted in the visibility column.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Split `org/repo` at the first separator. Both halves must be non-empty
/// and the repository half must be a single path segment.
pub fn split_full_name(full_name: &str) -> Result<(&str, &str), ImportError> {
    match full_name.split_once('/') {
        Some((org, repo)) if !org.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((org, repo))
        }
        _ => Err(ImportError::InvalidFullName {
            full_name: full_name.to_string(),
        }),
    }
}

/// Lazily parses a change list. Iteration yields the first error it meets;
/// callers that abort on error never see the lines after it.
pub struct ChangeList<R> {
    lines: std::io::Lines<R>,
    line_number: usize,
}

impl<R: BufRead> ChangeList<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for ChangeList<R> {
    type Item = Result<ChangeListEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        self.line_number += 1;

        let line_number = self.line_number;
        Some(
            line.with_context(|| format!("Failed to read change list line {}", line_number))
                .and_then(|line| parse_line(line_number, &line).map_err(Into::into)),
        )
    }
}
