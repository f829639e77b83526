//! Scripted configuration sources.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use flagconf_protocol::FlagsResult;

use crate::loader::{random_unit_name, FlagsModule, ModuleError, ModuleLoader};

/// Behaviour of one scripted source.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    /// Answers in order; the last one repeats. Empty answers with no flags.
    responses: Vec<FlagsResult>,
    load_error: Option<String>,
    query_error: Option<String>,
}

impl MockSource {
    /// Source answering every query with `flags`, ready and cacheable.
    pub fn with_flags(flags: &[&str]) -> Self {
        Self::with_responses(vec![FlagsResult::new(
            flags.iter().map(|f| f.to_string()).collect(),
        )])
    }

    pub fn with_responses(responses: Vec<FlagsResult>) -> Self {
        Self {
            responses,
            ..Self::default()
        }
    }

    /// Source whose load fails with `message`.
    pub fn failing_load(message: &str) -> Self {
        Self {
            load_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Source that loads but fails every query with `message`.
    pub fn failing_query(message: &str) -> Self {
        Self {
            query_error: Some(message.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
struct SourceStats {
    loads: usize,
    queries: Vec<PathBuf>,
    units: Vec<String>,
}

type SharedStats = Arc<Mutex<HashMap<PathBuf, SourceStats>>>;

/// Loader serving [`MockSource`]s by location.
#[derive(Debug, Default)]
pub struct MockLoader {
    sources: HashMap<PathBuf, MockSource>,
    stats: SharedStats,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, location: impl Into<PathBuf>, source: MockSource) -> Self {
        self.sources.insert(location.into(), source);
        self
    }

    /// Replace a source's behaviour, e.g. after "fixing" a broken one.
    pub fn set_source(&mut self, location: impl Into<PathBuf>, source: MockSource) {
        self.sources.insert(location.into(), source);
    }

    /// Load attempts for `location`, failed ones included.
    pub fn load_count(&self, location: &Path) -> usize {
        self.with_stats(location, |s| s.loads)
    }

    /// Load attempts across all locations.
    pub fn total_loads(&self) -> usize {
        let stats = self.stats.lock().unwrap();
        stats.values().map(|s| s.loads).sum()
    }

    pub fn query_count(&self, location: &Path) -> usize {
        self.with_stats(location, |s| s.queries.len())
    }

    /// Files queried against `location`, in order.
    pub fn queried_files(&self, location: &Path) -> Vec<PathBuf> {
        self.with_stats(location, |s| s.queries.clone())
    }

    /// Unit names handed out for `location`, one per successful load.
    pub fn units(&self, location: &Path) -> Vec<String> {
        self.with_stats(location, |s| s.units.clone())
    }

    fn with_stats<T: Default>(&self, location: &Path, f: impl FnOnce(&SourceStats) -> T) -> T {
        let stats = self.stats.lock().unwrap();
        stats.get(location).map(f).unwrap_or_default()
    }
}

impl ModuleLoader for MockLoader {
    fn load(&mut self, location: &Path) -> Result<Box<dyn FlagsModule>, ModuleError> {
        let mut stats = self.stats.lock().unwrap();
        let entry = stats.entry(location.to_path_buf()).or_default();
        entry.loads += 1;

        let source = self.sources.get(location).ok_or_else(|| {
            ModuleError::Failed(format!("no mock source at {}", location.display()))
        })?;

        if let Some(message) = &source.load_error {
            return Err(ModuleError::Failed(message.clone()));
        }

        let unit = random_unit_name();
        entry.units.push(unit.clone());

        Ok(Box::new(MockModule {
            unit,
            location: location.to_path_buf(),
            responses: source.responses.clone(),
            query_error: source.query_error.clone(),
            next: 0,
            stats: Arc::clone(&self.stats),
        }))
    }
}

struct MockModule {
    unit: String,
    location: PathBuf,
    responses: Vec<FlagsResult>,
    query_error: Option<String>,
    next: usize,
    stats: SharedStats,
}

impl FlagsModule for MockModule {
    fn unit_name(&self) -> &str {
        &self.unit
    }

    fn flags_for_file(&mut self, filename: &Path) -> Result<FlagsResult, ModuleError> {
        {
            let mut stats = self.stats.lock().unwrap();
            stats
                .entry(self.location.clone())
                .or_default()
                .queries
                .push(filename.to_path_buf());
        }

        if let Some(message) = &self.query_error {
            return Err(ModuleError::Failed(message.clone()));
        }

        let index = self.next.min(self.responses.len().saturating_sub(1));
        self.next += 1;
        Ok(self
            .responses
            .get(index)
            .cloned()
            .unwrap_or_else(|| FlagsResult::new(Vec::new())))
    }
}
