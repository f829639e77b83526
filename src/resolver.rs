//! Flags resolver
//!
//! Coordinates location, confirmation, loading, querying and sanitizing for
//! one file at a time. All caches live on the [`Flags`] context and last as
//! long as it does; nothing is ever evicted.
//!
//! Cache layers, fastest first:
//! - file → final flags (only when the source allows caching)
//! - file → the loaded source that answered for it
//! - source location → loaded source, or declined for this session

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::ancestry;
use crate::error::FlagsError;
use crate::frontend::{FlagVec, FrontEnd};
use crate::gate::ConfirmationGate;
use crate::host::Host;
use crate::loader::{FlagsModule, ModuleLoader};
use crate::locator::{ConfSources, CONF_FILENAME};

/// Notice posted (once) when no configuration source can be used.
pub fn no_conf_message() -> String {
    format!(
        "No {} file detected, so no compile flags are available. Thus no semantic \
         support for C/C++/ObjC/ObjC++. See the docs for details.",
        CONF_FILENAME
    )
}

/// Index of a loaded source within a [`Flags`] context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(usize);

/// What is known about a source location this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEntry {
    Loaded(ModuleId),
    /// User declined; skipped for every file until the context is dropped.
    Declined,
}

struct LoadedModule {
    location: PathBuf,
    module: Box<dyn FlagsModule>,
}

/// Resolution context.
///
/// Not thread-safe: every call takes `&mut self`.
pub struct Flags<H, L> {
    host: H,
    loader: L,
    gate: ConfirmationGate,
    special_flags: Vec<String>,

    flags_for_file: HashMap<PathBuf, FlagVec>,
    module_for_file: HashMap<PathBuf, ModuleId>,
    registry: HashMap<PathBuf, RegistryEntry>,
    modules: Vec<LoadedModule>,

    no_conf_warning_posted: bool,
}

impl<H: Host, L: ModuleLoader> Flags<H, L> {
    /// Create a context. Reads the global fallback location from the host
    /// once and computes the special include flags once.
    pub fn new(host: H, loader: L, frontend: FrontEnd) -> Self {
        let gate = ConfirmationGate::from_host(&host);
        let special_flags = frontend.special_includes();

        if let Some(global) = gate.global_conf() {
            tracing::debug!(global = %global.display(), "global configuration source");
        }

        Self {
            host,
            loader,
            gate,
            special_flags,
            flags_for_file: HashMap::new(),
            module_for_file: HashMap::new(),
            registry: HashMap::new(),
            modules: Vec::new(),
            no_conf_warning_posted: false,
        }
    }

    /// Resolve the compile flags for `filename`.
    ///
    /// `Ok(None)` means no flags are available right now: no usable source,
    /// or the source has not finished computing them (ask again later).
    /// Load and query failures propagate; a failed load is not remembered.
    pub fn resolve(&mut self, filename: &Path) -> Result<Option<FlagVec>, FlagsError> {
        let file = ancestry::absolutize(filename).map_err(|source| FlagsError::Path {
            path: filename.to_path_buf(),
            source,
        })?;

        if let Some(cached) = self.flags_for_file.get(&file) {
            tracing::trace!(file = %file.display(), "flags cache hit");
            return Ok(Some(cached.clone()));
        }

        let Some(id) = self.module_for_file(&file)? else {
            if !self.no_conf_warning_posted {
                self.host.post_message(&no_conf_message());
                self.no_conf_warning_posted = true;
            }
            return Ok(None);
        };

        let loaded = &mut self.modules[id.0];
        let results = loaded
            .module
            .flags_for_file(&file)
            .map_err(|source| FlagsError::Query {
                location: loaded.location.clone(),
                file: file.clone(),
                source,
            })?;

        if !results.flags_ready {
            tracing::debug!(file = %file.display(), "flags not ready yet");
            return Ok(None);
        }

        let mut raw = results.flags;
        raw.extend(self.special_flags.iter().cloned());
        let flags = FlagVec::from(flagconf_sanitizer::sanitize_flags(&raw));

        if results.do_cache {
            self.flags_for_file.insert(file, flags.clone());
        } else {
            tracing::debug!(file = %file.display(), "source asked not to cache flags");
        }

        Ok(Some(flags))
    }

    /// Source that answers for `file`, binding it on first success.
    fn module_for_file(&mut self, file: &Path) -> Result<Option<ModuleId>, FlagsError> {
        if let Some(id) = self.module_for_file.get(file) {
            return Ok(Some(*id));
        }

        let global = self.gate.global_conf().map(Path::to_path_buf);
        for location in ConfSources::for_file(file, global) {
            let known = self.registry.get(&location).copied();
            let entry = match known {
                Some(entry) => entry,
                None => self.register(&location)?,
            };

            if let RegistryEntry::Loaded(id) = entry {
                tracing::debug!(
                    file = %file.display(),
                    location = %location.display(),
                    "bound configuration source"
                );
                self.module_for_file.insert(file.to_path_buf(), id);
                return Ok(Some(id));
            }
        }

        Ok(None)
    }

    /// First encounter with a location: gate it and load it.
    fn register(&mut self, location: &Path) -> Result<RegistryEntry, FlagsError> {
        let decision = self.gate.check(location, &mut self.host);
        tracing::debug!(location = %location.display(), ?decision, "confirmation gate");

        if !decision.allows_load() {
            tracing::info!(
                location = %location.display(),
                "configuration source disabled for this session"
            );
            self.registry
                .insert(location.to_path_buf(), RegistryEntry::Declined);
            return Ok(RegistryEntry::Declined);
        }

        let module = self
            .loader
            .load(location)
            .map_err(|source| FlagsError::Load {
                location: location.to_path_buf(),
                source,
            })?;

        let id = ModuleId(self.modules.len());
        self.modules.push(LoadedModule {
            location: location.to_path_buf(),
            module,
        });
        let entry = RegistryEntry::Loaded(id);
        self.registry.insert(location.to_path_buf(), entry);
        Ok(entry)
    }

    /// Cached final flags for `filename`, if any.
    pub fn cached_flags(&self, filename: &Path) -> Option<&FlagVec> {
        let file = ancestry::absolutize(filename).ok()?;
        self.flags_for_file.get(&file)
    }

    /// Location of the source bound to `filename`, if any.
    pub fn bound_location(&self, filename: &Path) -> Option<&Path> {
        let file = ancestry::absolutize(filename).ok()?;
        let id = self.module_for_file.get(&file)?;
        Some(self.modules[id.0].location.as_path())
    }

    /// Unit name of the source bound to `filename`, if any.
    pub fn bound_unit(&self, filename: &Path) -> Option<&str> {
        let file = ancestry::absolutize(filename).ok()?;
        let id = self.module_for_file.get(&file)?;
        Some(self.modules[id.0].module.unit_name())
    }

    pub fn registry_entry(&self, location: &Path) -> Option<RegistryEntry> {
        self.registry.get(location).copied()
    }

    /// Number of sources loaded this session.
    pub fn loaded_count(&self) -> usize {
        self.modules.len()
    }

    pub fn no_conf_warning_posted(&self) -> bool {
        self.no_conf_warning_posted
    }

    pub fn special_flags(&self) -> &[String] {
        &self.special_flags
    }

    pub fn global_conf(&self) -> Option<&Path> {
        self.gate.global_conf()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }
}
