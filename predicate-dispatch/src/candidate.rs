//! Dispatch candidates: a predicate, an implementation and a priority.

use std::fmt;
use std::sync::Arc;

use crate::error::DispatchError;
use crate::scope::Scope;
use crate::signal::Outcome;
use crate::signature::Signature;
use crate::value::Value;

/// Ordering key; lower priorities are tried first.
pub type Priority = i64;

/// Reserved for fallbacks so they are always tried last.
pub const SENTINEL_PRIORITY: Priority = Priority::MAX;

/// Decides whether a candidate applies to an input.
pub type Predicate<I> = Arc<dyn Fn(&I) -> Result<bool, DispatchError> + Send + Sync>;

/// A predicate over dispatch values; what the check compiler produces.
pub type ValuePredicate = Predicate<Value>;

/// Build a predicate from an infallible test.
pub fn predicate<I, F>(test: F) -> Predicate<I>
where
    I: 'static,
    F: Fn(&I) -> bool + Send + Sync + 'static,
{
    Arc::new(move |input: &I| -> Result<bool, DispatchError> { Ok(test(input)) })
}

/// The predicate that accepts everything.
pub fn always<I: 'static>() -> Predicate<I> {
    Arc::new(|_: &I| -> Result<bool, DispatchError> { Ok(true) })
}

/// Arguments after the dispatch key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Args<'a> {
    /// Remaining positional arguments.
    pub rest: &'a [Value],
    /// The resolution scope; `None` unless the implementation declares the
    /// `scope` parameter.
    pub scope: Option<&'a Scope>,
}

impl<'a> Args<'a> {
    pub fn new(rest: &'a [Value]) -> Self {
        Self { rest, scope: None }
    }

    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.rest.get(index)
    }
}

type Body<I, O> = Arc<dyn Fn(&I, &Args<'_>) -> Result<Outcome<O>, DispatchError> + Send + Sync>;

/// A callable body together with its declared signature.
///
/// Cloning is cheap and clones share the body, so the same implementation can
/// be registered several times under different checks.
pub struct Implementation<I, O> {
    signature: Signature,
    body: Body<I, O>,
}

impl<I, O> Implementation<I, O> {
    /// An implementation that may decline.
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&I, &Args<'_>) -> Result<Outcome<O>, DispatchError> + Send + Sync + 'static,
    {
        Self {
            signature: Signature::new(name),
            body: Arc::new(body),
        }
    }

    /// An implementation that always matches once its predicate accepted.
    pub fn from_fn<F>(name: impl Into<String>, body: F) -> Self
    where
        I: 'static,
        O: 'static,
        F: Fn(&I, &Args<'_>) -> Result<O, DispatchError> + Send + Sync + 'static,
    {
        Self::new(name, move |input, args| body(input, args).map(Outcome::Matched))
    }

    /// Replace the whole signature. The name given at construction is kept
    /// only if `signature` has an empty name.
    pub fn with_signature(mut self, mut signature: Signature) -> Self {
        if signature.name().is_empty() {
            signature = signature.with_name(self.signature.name());
        }
        self.signature = signature;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.signature = self.signature.with_doc(doc);
        self
    }

    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.signature = self.signature.param(name);
        self
    }

    pub fn typed_param(
        mut self,
        name: impl Into<String>,
        annotation: impl Into<crate::compiler::CheckSpec>,
    ) -> Self {
        self.signature = self.signature.typed_param(name, annotation);
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.signature = self.signature.with_scope(scope);
        self
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn name(&self) -> &str {
        self.signature.name()
    }

    /// Call the body directly, bypassing dispatch.
    pub fn invoke(&self, input: &I, args: &Args<'_>) -> Result<Outcome<O>, DispatchError> {
        (self.body)(input, args)
    }

    /// Whether both handles share the same body.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl<I, O> Clone for Implementation<I, O> {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature.clone(),
            body: self.body.clone(),
        }
    }
}

impl<I, O> fmt::Debug for Implementation<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Implementation")
            .field("name", &self.signature.name())
            .finish_non_exhaustive()
    }
}

/// A candidate for dispatch resolution. Immutable once built.
pub struct Candidate<I, O> {
    predicate: Predicate<I>,
    implementation: Implementation<I, O>,
    priority: Priority,
}

impl<I, O> Candidate<I, O> {
    pub fn new(predicate: Predicate<I>, implementation: Implementation<I, O>, priority: Priority) -> Self {
        Self {
            predicate,
            implementation,
            priority,
        }
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn predicate(&self) -> &Predicate<I> {
        &self.predicate
    }

    pub fn implementation(&self) -> &Implementation<I, O> {
        &self.implementation
    }

    pub fn name(&self) -> &str {
        self.implementation.name()
    }

    /// Run the predicate against `input`.
    pub fn applies_to(&self, input: &I) -> Result<bool, DispatchError> {
        (self.predicate)(input)
    }
}

impl<I, O> fmt::Debug for Candidate<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("implementation", &self.implementation.name())
            .field("priority", &self.priority)
            .finish()
    }
}
