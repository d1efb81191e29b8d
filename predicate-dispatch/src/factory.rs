//! User-facing dispatchers.
//!
//! A [`Dispatch`] wraps an [`Engine`] keyed on [`Value`] and infers
//! candidate predicates from check specifications. Every dispatcher carries
//! a fallback at [`SENTINEL_PRIORITY`], so it always has a last resort: the
//! fallback given at construction, or one that fails with
//! [`DispatchError::NoImplementation`].
//!
//! ```
//! use predicate_dispatch::{Class, Dispatch, Implementation, Value};
//!
//! let describe = Dispatch::builder().name("describe").build().unwrap();
//! describe
//!     .register(
//!         None,
//!         None,
//!         Implementation::from_fn("describe_int", |v: &Value, _| {
//!             Ok(Value::from(format!("int {}", v)))
//!         })
//!         .typed_param("value", Class::int()),
//!     )
//!     .unwrap();
//!
//! assert_eq!(describe.call(&Value::Int(3), &[]).unwrap(), Value::from("int 3"));
//! assert!(describe.call(&Value::from("x"), &[]).is_err());
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::candidate::{always, Candidate, Implementation, Priority, SENTINEL_PRIORITY};
use crate::compiler::{default_compiler, CheckCompiler, CheckDispatcher, CheckSpec};
use crate::config::{CompilerConfig, Config};
use crate::engine::{Dispatcher, Engine};
use crate::error::DispatchError;
use crate::modules::ModuleRegistry;
use crate::signature::Signature;
use crate::value::Value;

/// A dispatcher over values with check inference.
pub struct Dispatch {
    engine: Engine<Value, Value>,
    compiler: Arc<CheckDispatcher>,
}

impl Dispatch {
    /// A dispatcher falling back to `fallback`, named after it.
    pub fn new(fallback: Implementation<Value, Value>) -> Result<Self, DispatchError> {
        Self::builder().fallback(fallback).build()
    }

    pub fn builder() -> DispatchBuilder {
        DispatchBuilder::default()
    }

    /// Register `implementation` behind a compiled check.
    ///
    /// Without a `check`, the annotation of the implementation's first
    /// declared parameter is used. Names in the check resolve against the
    /// implementation's defining scope. Nothing is added if either step
    /// fails.
    pub fn register(
        &self,
        check: Option<CheckSpec>,
        priority: Option<Priority>,
        implementation: Implementation<Value, Value>,
    ) -> Result<Implementation<Value, Value>, DispatchError> {
        let spec = match check {
            Some(spec) => spec,
            None => implementation
                .signature()
                .first_annotation()
                .cloned()
                .ok_or_else(|| DispatchError::MissingCheck {
                    implementation: implementation.name().to_string(),
                })?,
        };

        let predicate = self
            .compiler
            .dispatch_with_scope(&spec, &[], Some(implementation.signature().scope()))?
            .ok_or_else(|| DispatchError::UnsupportedCheck {
                spec: spec.to_string(),
            })?;

        Ok(self.engine.register(predicate, priority, implementation))
    }

    /// Dispatch on `value`, passing `rest` through to the implementation.
    ///
    /// A fallback that declines leaves nothing to return; that surfaces as
    /// `Value::None`.
    pub fn call(&self, value: &Value, rest: &[Value]) -> Result<Value, DispatchError> {
        Ok(self.engine.call(value, rest)?.unwrap_or(Value::None))
    }

    pub fn name(&self) -> &str {
        self.engine.name()
    }

    pub fn doc(&self) -> Option<&str> {
        self.engine.doc()
    }

    pub fn engine(&self) -> &Engine<Value, Value> {
        &self.engine
    }

    /// The dispatcher compiling this dispatcher's checks.
    pub fn compiler(&self) -> &Arc<CheckDispatcher> {
        &self.compiler
    }

    pub fn candidates(&self) -> Vec<Arc<Candidate<Value, Value>>> {
        self.engine.candidates()
    }
}

impl Dispatcher<Value> for Dispatch {
    type Output = Value;
    type Check = Option<CheckSpec>;

    fn dispatch(&self, input: &Value, rest: &[Value]) -> Result<Option<Value>, DispatchError> {
        self.engine.call(input, rest)
    }

    fn register(
        &self,
        check: Option<CheckSpec>,
        priority: Option<Priority>,
        implementation: Implementation<Value, Value>,
    ) -> Result<Implementation<Value, Value>, DispatchError> {
        Dispatch::register(self, check, priority, implementation)
    }

    fn candidates(&self) -> Vec<Arc<Candidate<Value, Value>>> {
        self.engine.candidates()
    }
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("name", &self.name())
            .field("candidates", &self.engine.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Dispatch`].
#[derive(Default)]
pub struct DispatchBuilder {
    name: Option<String>,
    doc: Option<String>,
    fallbacks: Vec<Implementation<Value, Value>>,
    compiler: Option<Arc<CheckDispatcher>>,
    config: Config,
}

impl DispatchBuilder {
    /// Override the name taken from the fallback.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the doc taken from the fallback.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Add a fallback. At most one is allowed; more fail at `build`.
    pub fn fallback(mut self, fallback: Implementation<Value, Value>) -> Self {
        self.fallbacks.push(fallback);
        self
    }

    /// Compile checks with `compiler` instead of the shared default.
    ///
    /// Any dispatcher keyed on [`CheckSpec`] will do: a [`CheckCompiler`]
    /// with extra builders, or a bare [`Engine`] with builders of its own.
    pub fn compiler(mut self, compiler: Arc<CheckDispatcher>) -> Self {
        self.compiler = Some(compiler);
        self
    }

    /// Apply a configuration.
    ///
    /// `[dispatch]` names a dispatcher built without a fallback. A
    /// non-default `[compiler]` section builds a dedicated compiler unless
    /// one was given explicitly.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Dispatch, DispatchError> {
        if self.fallbacks.len() > 1 {
            return Err(DispatchError::TooManyFallbacks {
                given: self.fallbacks.len(),
            });
        }

        let fallback = match self.fallbacks.into_iter().next() {
            Some(fallback) => fallback,
            None => missing_implementation(
                self.name
                    .clone()
                    .unwrap_or_else(|| self.config.dispatch.fallback_name.clone()),
            ),
        };

        let name = self
            .name
            .unwrap_or_else(|| fallback.signature().name().to_string());
        let mut signature = Signature::new(name);
        if let Some(doc) = self.doc.as_deref().or(fallback.signature().doc()) {
            signature = signature.with_doc(doc);
        }

        let compiler: Arc<CheckDispatcher> = match self.compiler {
            Some(compiler) => compiler,
            None if self.config.compiler != CompilerConfig::default() => Arc::new(
                CheckCompiler::from_config(&self.config.compiler, ModuleRegistry::global())?,
            ),
            None => default_compiler(),
        };

        let engine = Engine::with_signature(signature);
        engine.register(always(), Some(SENTINEL_PRIORITY), fallback);
        debug!("Built dispatcher `{}`", engine.name());

        Ok(Dispatch { engine, compiler })
    }
}

impl fmt::Debug for DispatchBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchBuilder")
            .field("name", &self.name)
            .field("fallbacks", &self.fallbacks.len())
            .finish_non_exhaustive()
    }
}

/// The fallback of a dispatcher built without one.
fn missing_implementation(dispatcher: String) -> Implementation<Value, Value> {
    let name = dispatcher.clone();
    Implementation::new(name, move |value: &Value, _| {
        Err(DispatchError::NoImplementation {
            dispatcher: dispatcher.clone(),
            found: value.class().qualified_name(),
        })
    })
    .param("value")
}
