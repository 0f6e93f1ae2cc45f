//! Alignment results and their text/JSON renderings

use crate::normalize::AlignmentRecord;
use crate::AlignResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-file edit records, in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditList {
    edit_list: Vec<(String, AlignmentRecord)>,
}

impl EditList {
    /// Pair each file name with its record
    pub fn new(
        files: impl IntoIterator<Item = String>,
        records: impl IntoIterator<Item = AlignmentRecord>,
    ) -> Self {
        Self {
            edit_list: files.into_iter().zip(records).collect(),
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &AlignmentRecord> + '_ {
        self.edit_list.iter().map(|(_, record)| record)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AlignmentRecord)> + '_ {
        self.edit_list
            .iter()
            .map(|(file, record)| (file.as_str(), record))
    }

    /// Record of file `index`
    pub fn get(&self, index: usize) -> Option<&AlignmentRecord> {
        self.edit_list.get(index).map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.edit_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edit_list.is_empty()
    }

    /// True when no file needs its beginning trimmed
    pub fn is_in_sync(&self) -> bool {
        self.records().all(|record| record.trim_pre <= 0.0)
    }

    /// `{"edit_list": [[file, record], ...]}` with a 4-space indent
    pub fn to_json_pretty(&self) -> AlignResult<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// One line per file that has to be trimmed
    pub fn text_report(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EditList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = self
            .iter()
            .filter(|(_, record)| record.trim_pre > 0.0)
            .peekable();

        if lines.peek().is_none() {
            return write!(f, "files are in sync already");
        }

        let mut first = true;
        for (file, record) in lines {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(
                f,
                "Result: The beginning of '{}' needs to be trimmed off {:.4} seconds \
                 (or to be added {:.4} seconds padding) for all files to be in sync",
                file, record.trim_pre, record.pad_pre
            )?;
        }
        Ok(())
    }
}
