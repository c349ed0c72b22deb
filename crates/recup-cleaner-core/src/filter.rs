use std::collections::BTreeSet;
use std::fmt;

/// Keep-or-delete decision for a single recovered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Keep,
    Delete,
}

impl Disposition {
    /// Label written to the action log.
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Keep => "kept",
            Disposition::Delete => "deleted",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub disposition: Disposition,
    /// Extension used for logging and for grouping during reorganization.
    /// Lower-case, no leading dot, empty when the file name has no dot.
    pub extension: String,
}

/// Keep/exclude extension rules applied to every file of a finalized folder.
///
/// An empty keep set keeps everything by default. A non-empty keep set flips
/// the default to delete, and only matching files survive. The exclude set is
/// checked last and always wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionRules {
    keep: BTreeSet<String>,
    exclude: BTreeSet<String>,
}

impl ExtensionRules {
    pub fn new<K, E>(keep: K, exclude: E) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            keep: normalize_extensions(keep),
            exclude: normalize_extensions(exclude),
        }
    }

    /// Build rules from comma-separated lists such as `"jpg, .JPEG,pdf"`.
    pub fn from_csv(keep_csv: &str, exclude_csv: &str) -> Self {
        Self::new(keep_csv.split(','), exclude_csv.split(','))
    }

    /// Rules that keep every file.
    pub fn keep_all() -> Self {
        Self::default()
    }

    pub fn keep_set(&self) -> &BTreeSet<String> {
        &self.keep
    }

    pub fn exclude_set(&self) -> &BTreeSet<String> {
        &self.exclude
    }

    pub fn classify(&self, file_name: &str) -> Classification {
        let lower = file_name.to_lowercase();

        let mut extension = literal_extension(&lower).to_string();
        let mut disposition = if self.keep.is_empty() {
            Disposition::Keep
        } else {
            Disposition::Delete
        };

        if let Some(ext) = first_suffix_match(&lower, &self.keep) {
            disposition = Disposition::Keep;
            extension = ext.to_string();
        }

        // Checked after the keep set so that an exclusion always overrides.
        if let Some(ext) = first_suffix_match(&lower, &self.exclude) {
            disposition = Disposition::Delete;
            extension = ext.to_string();
        }

        Classification {
            disposition,
            extension,
        }
    }
}

/// Trim, lower-case and strip a leading dot from each entry; drop empties.
pub fn normalize_extensions<I>(items: I) -> BTreeSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| {
            item.as_ref()
                .trim()
                .trim_start_matches('.')
                .to_lowercase()
        })
        .filter(|ext| !ext.is_empty())
        .collect()
}

fn first_suffix_match<'a>(lower_name: &str, set: &'a BTreeSet<String>) -> Option<&'a str> {
    set.iter()
        .find(|ext| {
            lower_name.len() > ext.len()
                && lower_name.ends_with(ext.as_str())
                && lower_name[..lower_name.len() - ext.len()].ends_with('.')
        })
        .map(|ext| ext.as_str())
}

fn literal_extension(lower_name: &str) -> &str {
    match lower_name.rfind('.') {
        Some(idx) => &lower_name[idx + 1..],
        None => "",
    }
}
