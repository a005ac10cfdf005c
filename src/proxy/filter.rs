use std::collections::HashSet;
use std::io;
use std::path::Path;

/// Allow-list of model display names, loaded from a flat file with one
/// name per line. Lines are trimmed and blank lines skipped. An empty
/// filter allows everything; filtering only affects what `/api/tags`
/// returns, never which aliases resolve.
#[derive(Debug, Clone, Default)]
pub struct ModelFilter {
    names: HashSet<String>,
}

impl ModelFilter {
    /// Loads the filter file. A missing file is not an error, it simply
    /// means no filtering.
    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("model filter file {:?} not found, serving all models", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(e),
        };

        let names: HashSet<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        log::info!("loaded {} model name(s) from {:?}", names.len(), path);

        Ok(Self { names })
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether a display name passes the filter.
    pub fn allows(&self, name: &str) -> bool {
        self.names.is_empty() || self.names.contains(name)
    }
}
