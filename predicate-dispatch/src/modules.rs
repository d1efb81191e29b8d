//! Module loading for import-path checks.
//!
//! A name such as `decimal.Decimal` that no scope can resolve is looked up by
//! loading module `decimal` and fetching its `Decimal` class. Modules are
//! supplied up front as providers keyed by dotted path; a provider runs the
//! first time its module is loaded and the result is cached for the life of
//! the registry. Loading is never undone.
//!
//! # Module Path Mapping
//!
//! Paths are dotted and matched exactly:
//! - `decimal` → the provider registered as `decimal`
//! - `zoo.pets` → the provider registered as `zoo.pets` (loading it does not
//!   load `zoo`)

use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::DispatchError;
use crate::types::{builtin_classes, Class, BUILTINS_MODULE};

/// A loaded module: a path and the classes it defines.
#[derive(Debug, Clone)]
pub struct Module {
    path: String,
    classes: IndexMap<String, Arc<Class>>,
}

impl Module {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            classes: IndexMap::new(),
        }
    }

    /// Define `class` in this module under its own name.
    pub fn with_class(mut self, class: Arc<Class>) -> Self {
        self.classes.insert(class.name().to_string(), class);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Class>> {
        self.classes.get(name)
    }

    /// Fetch a class attribute, failing if the module does not define it.
    pub fn attr(&self, name: &str) -> Result<Arc<Class>, DispatchError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| DispatchError::AttributeNotFound {
                module: self.path.clone(),
                name: name.to_string(),
            })
    }

    pub fn classes(&self) -> impl Iterator<Item = &Arc<Class>> {
        self.classes.values()
    }
}

/// Something that can load modules by dotted path.
pub trait ModuleLoader: Send + Sync {
    fn load(&self, path: &str) -> Result<Arc<Module>, DispatchError>;
}

type Provider = Arc<dyn Fn() -> Module + Send + Sync>;

/// Providers plus the cache of modules already loaded from them.
#[derive(Default)]
pub struct ModuleRegistry {
    providers: RwLock<FxHashMap<String, Provider>>,
    loaded: RwLock<FxHashMap<String, Arc<Module>>>,
}

static GLOBAL: LazyLock<Arc<ModuleRegistry>> = LazyLock::new(|| Arc::new(ModuleRegistry::with_std()));

impl ModuleRegistry {
    /// An empty registry with no providers.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry providing the standard modules: `builtins`, `numbers`,
    /// `decimal` and `fractions`.
    pub fn with_std() -> Self {
        let registry = Self::new();
        registry.provide(BUILTINS_MODULE, || {
            builtin_classes()
                .into_iter()
                .fold(Module::new(BUILTINS_MODULE), Module::with_class)
        });
        registry.provide("numbers", || {
            Module::new("numbers")
                .with_class(Class::number())
                .with_class(Class::real())
                .with_class(Class::integral())
        });
        registry.provide("decimal", || Module::new("decimal").with_class(Class::decimal()));
        registry.provide("fractions", || Module::new("fractions").with_class(Class::fraction()));
        registry
    }

    /// The process-wide registry used by the default check compiler.
    pub fn global() -> Arc<ModuleRegistry> {
        GLOBAL.clone()
    }

    /// Register a provider for `path`, replacing any earlier one.
    ///
    /// A module that has already been loaded stays loaded; the new provider
    /// only affects paths not yet in the cache.
    pub fn provide<F>(&self, path: impl Into<String>, provider: F)
    where
        F: Fn() -> Module + Send + Sync + 'static,
    {
        self.providers.write().insert(path.into(), Arc::new(provider));
    }

    pub fn is_loaded(&self, path: &str) -> bool {
        self.loaded.read().contains_key(path)
    }

    /// Paths of every module loaded so far, sorted.
    pub fn loaded_modules(&self) -> Vec<String> {
        let mut paths: Vec<_> = self.loaded.read().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl ModuleLoader for ModuleRegistry {
    fn load(&self, path: &str) -> Result<Arc<Module>, DispatchError> {
        if let Some(module) = self.loaded.read().get(path) {
            return Ok(module.clone());
        }

        let provider = self
            .providers
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| DispatchError::ModuleNotFound {
                path: path.to_string(),
            })?;

        // Run the provider without holding any lock; it may load other modules.
        let module = Arc::new(provider());
        debug!("Loaded module '{}' ({} classes)", path, module.classes.len());

        let mut loaded = self.loaded.write();
        Ok(loaded.entry(path.to_string()).or_insert(module).clone())
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("providers", &self.providers.read().len())
            .field("loaded", &self.loaded_modules())
            .finish()
    }
}
