use std::collections::{BTreeSet, HashSet};

use shared::domain::FileDescriptor;

use crate::error::GuardRejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    /// The lister answered with no files. Informational, not a failure.
    EmptyButValid,
}

/// Listing and selection for the active stage. The selection is always a
/// subset of the listed names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    current_files: Vec<FileDescriptor>,
    selected: BTreeSet<String>,
}

impl FileSelection {
    pub fn current_files(&self) -> &[FileDescriptor] {
        &self.current_files
    }

    pub fn selected_names(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_listed(&self, name: &str) -> bool {
        self.current_files.iter().any(|file| file.name == name)
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.current_files.is_empty() && self.selected.is_empty()
    }

    /// Replaces the listing and drops the previous selection. Duplicate names
    /// keep their first occurrence.
    pub fn load_files(&mut self, descriptors: Vec<FileDescriptor>) -> LoadOutcome {
        let mut seen = HashSet::with_capacity(descriptors.len());
        self.current_files = descriptors
            .into_iter()
            .filter(|file| seen.insert(file.name.clone()))
            .collect();
        self.selected.clear();

        if self.current_files.is_empty() {
            LoadOutcome::EmptyButValid
        } else {
            LoadOutcome::Loaded(self.current_files.len())
        }
    }

    /// Returns whether `name` is selected afterwards.
    pub fn toggle(&mut self, name: &str) -> Result<bool, GuardRejection> {
        if !self.is_listed(name) {
            return Err(GuardRejection::UnknownFile(name.to_string()));
        }
        if self.selected.remove(name) {
            Ok(false)
        } else {
            self.selected.insert(name.to_string());
            Ok(true)
        }
    }

    /// Clears the selection when every listed file is selected, otherwise
    /// selects them all.
    pub fn select_all(&mut self) {
        if self.selected.len() == self.current_files.len() {
            self.selected.clear();
        } else {
            self.selected = self
                .current_files
                .iter()
                .map(|file| file.name.clone())
                .collect();
        }
    }

    pub fn clear(&mut self) {
        self.current_files.clear();
        self.selected.clear();
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
