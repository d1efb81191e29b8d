//! The check compiler.
//!
//! A check specification says what a candidate should accept: a class, a
//! parameterized type, a class name, or a ready-made predicate. The
//! [`CheckCompiler`] turns one into a [`ValuePredicate`]. It is itself an
//! ordinary [`Engine`], keyed on the specification, whose candidates are
//! predicate builders:
//!
//! | Priority | Builder       | Accepts              |
//! |----------|---------------|----------------------|
//! | 100      | concrete type | `CheckSpec::Type`    |
//! | 101      | generic type  | `CheckSpec::Generic` |
//! | 102      | forward ref   | `CheckSpec::Name`    |
//! | 103      | import path   | `CheckSpec::Name`    |
//! | 104      | callable      | `CheckSpec::Predicate` |
//!
//! Builders 102 and 103 accept the same specifications. Priority decides:
//! the scope lookup runs first and declines when the name is unknown, which
//! hands the name to the import-path builder.
//!
//! # Module Structure
//!
//! - [`builders`] - the five builtin builders and their priorities
//! - `tests` - compiler tests

pub mod builders;


use std::fmt;
use std::sync::{Arc, LazyLock};

use tracing::debug;

use crate::candidate::{predicate, Candidate, Implementation, Predicate, Priority, ValuePredicate};
use crate::config::CompilerConfig;
use crate::engine::{Dispatcher, Engine};
use crate::error::DispatchError;
use crate::modules::{ModuleLoader, ModuleRegistry};
use crate::scope::Scope;
use crate::signature::Signature;
use crate::types::{Class, TypeExpr};
use crate::value::Value;

/// What a candidate should accept.
#[derive(Clone)]
pub enum CheckSpec {
    /// Instances of a class and its subclasses.
    Type(Arc<Class>),
    /// Values structurally matching a parameterized type.
    Generic(TypeExpr),
    /// A class named by a string, resolved through a scope or a module.
    Name(String),
    /// A predicate used as-is.
    Predicate(ValuePredicate),
}

impl CheckSpec {
    /// Wrap an infallible test as a specification.
    pub fn predicate<F>(test: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        CheckSpec::Predicate(predicate(test))
    }

    pub fn name(name: impl Into<String>) -> Self {
        CheckSpec::Name(name.into())
    }

    /// Short tag naming the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckSpec::Type(_) => "type",
            CheckSpec::Generic(_) => "generic",
            CheckSpec::Name(_) => "name",
            CheckSpec::Predicate(_) => "predicate",
        }
    }
}

impl From<Arc<Class>> for CheckSpec {
    fn from(class: Arc<Class>) -> Self {
        CheckSpec::Type(class)
    }
}

impl From<TypeExpr> for CheckSpec {
    fn from(expr: TypeExpr) -> Self {
        CheckSpec::Generic(expr)
    }
}

impl From<&str> for CheckSpec {
    fn from(name: &str) -> Self {
        CheckSpec::Name(name.to_string())
    }
}

impl From<String> for CheckSpec {
    fn from(name: String) -> Self {
        CheckSpec::Name(name)
    }
}

impl From<ValuePredicate> for CheckSpec {
    fn from(predicate: ValuePredicate) -> Self {
        CheckSpec::Predicate(predicate)
    }
}

impl fmt::Display for CheckSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckSpec::Type(class) => write!(f, "type {}", class),
            CheckSpec::Generic(expr) => write!(f, "generic type {}", expr),
            CheckSpec::Name(name) => write!(f, "name {:?}", name),
            CheckSpec::Predicate(_) => write!(f, "predicate"),
        }
    }
}

impl fmt::Debug for CheckSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckSpec::Type(class) => f.debug_tuple("Type").field(&class.qualified_name()).finish(),
            CheckSpec::Generic(expr) => f.debug_tuple("Generic").field(&expr.to_string()).finish(),
            CheckSpec::Name(name) => f.debug_tuple("Name").field(name).finish(),
            CheckSpec::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Anything that can compile check specifications for a
/// [`Dispatch`](crate::Dispatch): a [`CheckCompiler`], or a bare engine
/// keyed on specifications.
pub type CheckDispatcher =
    dyn Dispatcher<CheckSpec, Output = ValuePredicate, Check = Predicate<CheckSpec>> + Send + Sync;

/// Compiles check specifications into predicates.
pub struct CheckCompiler {
    engine: Engine<CheckSpec, ValuePredicate>,
}

static DEFAULT_COMPILER: LazyLock<Arc<CheckCompiler>> = LazyLock::new(|| Arc::new(CheckCompiler::new()));

/// The process-wide compiler shared by every [`Dispatch`](crate::Dispatch)
/// built without one of its own.
pub fn default_compiler() -> Arc<CheckCompiler> {
    DEFAULT_COMPILER.clone()
}

impl CheckCompiler {
    /// A compiler with the five builtin builders, loading modules from
    /// [`ModuleRegistry::global`].
    pub fn new() -> Self {
        Self::with_loader(ModuleRegistry::global())
    }

    /// A compiler with the five builtin builders, loading modules from `loader`.
    pub fn with_loader(loader: Arc<dyn ModuleLoader>) -> Self {
        Self::build(loader, &CompilerConfig::default())
    }

    /// A compiler configured by `config`.
    ///
    /// Modules listed in `config.preload` are loaded before the compiler is
    /// returned; a module that fails to load fails construction.
    pub fn from_config(
        config: &CompilerConfig,
        loader: Arc<dyn ModuleLoader>,
    ) -> Result<Self, DispatchError> {
        for path in &config.preload {
            loader.load(path)?;
        }
        Ok(Self::build(loader, config))
    }

    fn build(loader: Arc<dyn ModuleLoader>, config: &CompilerConfig) -> Self {
        let compiler = Self::empty("check_compiler");
        builders::install(&compiler.engine, loader, config.import_prefilter);
        debug!(
            "Built check compiler with {} builders (import prefilter {})",
            compiler.engine.len(),
            if config.import_prefilter { "on" } else { "off" }
        );
        compiler
    }

    /// A compiler with no builders, for custom specification languages.
    pub fn empty(name: impl Into<String>) -> Self {
        let signature = Signature::new(name)
            .with_doc("Compile a check specification into a predicate.")
            .param("spec")
            .param(crate::signature::SCOPE_PARAM);
        Self {
            engine: Engine::with_signature(signature),
        }
    }

    /// Add a builder behind an explicit guard over specifications.
    ///
    /// Nothing stops `priority` from colliding with the builtin builders
    /// (100-104); ties go to whichever was registered first.
    pub fn register(
        &self,
        guard: Predicate<CheckSpec>,
        priority: Option<Priority>,
        builder: Implementation<CheckSpec, ValuePredicate>,
    ) -> Implementation<CheckSpec, ValuePredicate> {
        self.engine.register(guard, priority, builder)
    }

    /// Compile `spec`, resolving names against `scope`.
    ///
    /// Returns `Ok(None)` when no builder's guard accepts the specification,
    /// or every builder that accepted it declined.
    pub fn compile(
        &self,
        spec: &CheckSpec,
        scope: Option<&Scope>,
    ) -> Result<Option<ValuePredicate>, DispatchError> {
        self.engine.call_with_scope(spec, &[], scope)
    }

    pub fn engine(&self) -> &Engine<CheckSpec, ValuePredicate> {
        &self.engine
    }

    pub fn name(&self) -> &str {
        self.engine.name()
    }

    pub fn candidates(&self) -> Vec<Arc<Candidate<CheckSpec, ValuePredicate>>> {
        self.engine.candidates()
    }
}

impl Default for CheckCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher<CheckSpec> for CheckCompiler {
    type Output = ValuePredicate;
    type Check = Predicate<CheckSpec>;

    fn dispatch(
        &self,
        input: &CheckSpec,
        rest: &[Value],
    ) -> Result<Option<ValuePredicate>, DispatchError> {
        self.engine.call(input, rest)
    }

    fn dispatch_with_scope(
        &self,
        input: &CheckSpec,
        rest: &[Value],
        scope: Option<&Scope>,
    ) -> Result<Option<ValuePredicate>, DispatchError> {
        self.engine.call_with_scope(input, rest, scope)
    }

    fn register(
        &self,
        check: Predicate<CheckSpec>,
        priority: Option<Priority>,
        implementation: Implementation<CheckSpec, ValuePredicate>,
    ) -> Result<Implementation<CheckSpec, ValuePredicate>, DispatchError> {
        Ok(CheckCompiler::register(self, check, priority, implementation))
    }

    fn candidates(&self) -> Vec<Arc<Candidate<CheckSpec, ValuePredicate>>> {
        self.engine.candidates()
    }
}

impl fmt::Debug for CheckCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CheckCompiler").field(&self.engine).finish()
    }
}
