//! Bulk operations: extraction and preloading.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use log::info;
use neox_codec::Codec;

use crate::archive::WpkArchive;
use crate::filter::EntryFilter;
use crate::{Error, Result};

impl<C: Codec> WpkArchive<C> {
    /// Extract every entry to `dest`.
    ///
    /// Entries are written in ordinal order under their resolved names.
    /// Failed entries are written too, with whatever bytes they hold; check
    /// their flags to tell them apart. Existing files are overwritten.
    pub fn extract_all(&self, dest: impl AsRef<Path>) -> Result<()> {
        let never = AtomicBool::new(false);
        self.extract_all_with(dest, &never, |_, _, _| {})?;
        Ok(())
    }

    /// Extract every entry, reporting progress and honouring `cancel`.
    ///
    /// `cancel` is checked before each entry. On cancellation the entries
    /// already written stay on disk and [`Error::Cancelled`] is returned.
    /// `progress` receives `(done, total, file name)` after each write.
    pub fn extract_all_with<F>(
        &self,
        dest: impl AsRef<Path>,
        cancel: &AtomicBool,
        mut progress: F,
    ) -> Result<usize>
    where
        F: FnMut(usize, usize, &str),
    {
        let dest = dest.as_ref();
        let total = self.record_count();

        for ordinal in 0..total {
            if cancel.load(Ordering::Relaxed) {
                info!("Extraction cancelled after {} of {} entries", ordinal, total);
                return Err(Error::Cancelled { completed: ordinal });
            }

            let entry = self.resolve(ordinal)?;
            let path = output_path(dest, entry.filename(), ordinal);
            entry.save_to_file(&path)?;

            progress(ordinal + 1, total, entry.filename());
        }

        info!("Extracted {} entries to {}", total, dest.display());
        Ok(total)
    }

    /// Resolve every entry without writing anything.
    pub fn load_all(&self, cancel: &AtomicBool) -> Result<usize> {
        let total = self.record_count();

        for ordinal in 0..total {
            if cancel.load(Ordering::Relaxed) {
                return Err(Error::Cancelled { completed: ordinal });
            }
            self.resolve(ordinal)?;
        }

        Ok(total)
    }

    /// Ordinals of the entries matching `filter`. Resolves every entry.
    pub fn filter(&self, filter: &EntryFilter) -> Result<Vec<usize>> {
        let mut matches = Vec::new();
        for ordinal in 0..self.record_count() {
            if filter.matches(&*self.resolve(ordinal)?) {
                matches.push(ordinal);
            }
        }
        Ok(matches)
    }
}

/// Path under `dest` for an entry name.
///
/// Both `/` and `\` separate components. Empty, `.` and `..` components are
/// dropped so the result always stays inside `dest`. A name with no usable
/// component falls back to `entry_<ordinal>`.
pub fn output_path(dest: &Path, name: &str, ordinal: usize) -> PathBuf {
    let mut path = dest.to_path_buf();
    let mut pushed = false;

    for component in name.split(|c| c == '/' || c == '\\') {
        if component.is_empty() || component == "." || component == ".." {
            continue;
        }
        path.push(component);
        pushed = true;
    }

    if !pushed {
        path.push(format!("entry_{ordinal}"));
    }

    path
}
