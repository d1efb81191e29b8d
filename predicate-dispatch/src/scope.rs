//! Resolution scopes for forward references.
//!
//! A [`Scope`] is the explicit table of names an implementation can see:
//! classes bound by name, and modules bound by alias so dotted names such as
//! `models.Dog` resolve without loading anything. Builtin classes are always
//! visible, whatever the scope contains.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::modules::Module;
use crate::types::{builtin_classes, Class};

/// Names visible to an implementation.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    classes: IndexMap<String, Arc<Class>>,
    modules: IndexMap<String, Arc<Module>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a class under its own name.
    pub fn with_class(mut self, class: Arc<Class>) -> Self {
        self.bind(class.name().to_string(), class);
        self
    }

    /// Bind a module under `alias`.
    pub fn with_module(mut self, alias: impl Into<String>, module: Arc<Module>) -> Self {
        self.modules.insert(alias.into(), module);
        self
    }

    /// Bind a class under an arbitrary name, replacing any earlier binding.
    pub fn bind(&mut self, name: impl Into<String>, class: Arc<Class>) {
        self.classes.insert(name.into(), class);
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.modules.is_empty()
    }

    /// Resolve a name to a class without loading any module.
    ///
    /// Lookup order: an exact class binding, then `alias.Name` through a
    /// bound module, then the builtin classes.
    pub fn resolve(&self, name: &str) -> Option<Arc<Class>> {
        if let Some(class) = self.classes.get(name) {
            return Some(class.clone());
        }

        if let Some((alias, attr)) = name.rsplit_once('.') {
            if let Some(class) = self.modules.get(alias).and_then(|m| m.get(attr)) {
                return Some(class.clone());
            }
        }

        builtin_classes().into_iter().find(|class| class.name() == name)
    }
}
