//! Runtime type descriptors.
//!
//! Dispatch keys are dynamic [`Value`](crate::Value)s, so predicates need a
//! runtime notion of "type" to test against. This module provides it:
//!
//! - [`Class`] - a nominal type with single inheritance (`int <: Integral`)
//! - [`TypeExpr`] - a parameterized type built from classes (`list[int]`)
//! - [`check_type`] - structural compatibility of a value with a `TypeExpr`
//!
//! Classes are compared by identity. Two classes with the same name in the
//! same module are still distinct unless they are the same `Arc`'d
//! descriptor; every class gets a fresh [`ClassId`] when it is created.

mod builtins;
mod check;
mod expr;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

pub use builtins::builtin_classes;
pub use check::{check_type, TypeMismatch};
pub use expr::TypeExpr;

/// Module name whose classes are shown without a module prefix.
pub const BUILTINS_MODULE: &str = "builtins";

static NEXT_CLASS_ID: AtomicU32 = AtomicU32::new(0);

/// Unique identifier for a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    fn fresh() -> Self {
        ClassId(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// A nominal runtime type.
#[derive(Debug)]
pub struct Class {
    id: ClassId,
    name: String,
    module: String,
    parent: Option<Arc<Class>>,
}

impl Class {
    /// Create a class deriving directly from `object`.
    pub fn new(name: impl Into<String>, module: impl Into<String>) -> Arc<Class> {
        Class::with_parent(name, module, Class::object())
    }

    /// Create a class deriving from `parent`.
    pub fn with_parent(
        name: impl Into<String>,
        module: impl Into<String>,
        parent: Arc<Class>,
    ) -> Arc<Class> {
        Arc::new(Class {
            id: ClassId::fresh(),
            name: name.into(),
            module: module.into(),
            parent: Some(parent),
        })
    }

    /// Create a class with no parent. Only `object` is built this way.
    pub(crate) fn root(name: &str, module: &str) -> Arc<Class> {
        Arc::new(Class {
            id: ClassId::fresh(),
            name: name.to_string(),
            module: module.to_string(),
            parent: None,
        })
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn parent(&self) -> Option<&Arc<Class>> {
        self.parent.as_ref()
    }

    /// `name` for builtins, `module.name` for everything else.
    pub fn qualified_name(&self) -> String {
        if self.module == BUILTINS_MODULE {
            self.name.clone()
        } else {
            format!("{}.{}", self.module, self.name)
        }
    }

    /// Textual representation, e.g. `<class 'decimal.Decimal'>`.
    pub fn repr(&self) -> String {
        format!("<class '{}'>", self.qualified_name())
    }

    /// Walk from this class up to the root, starting with `self`.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Whether `self` is `other` or derives from it.
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        self.ancestors().any(|class| class.id == other.id)
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Class {}

impl Hash for Class {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

/// Iterator over a class and its ancestors.
pub struct Ancestors<'a> {
    next: Option<&'a Class>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Class;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.as_deref();
        Some(current)
    }
}
