//! The dispatch engine.
//!
//! An [`Engine`] owns one [`PriorityRegistry`] and resolves calls against it.
//!
//! # Algorithm Overview
//!
//! 1. **Snapshot**: take the current candidate list, ascending by priority
//! 2. **Filter**: skip candidates whose predicate rejects the input
//! 3. **Invoke**: run the first accepting candidate's implementation
//! 4. **Continue on decline**: an implementation returning
//!    [`Outcome::Declined`] hands the input to the next candidate
//! 5. **Stop**: the first `Outcome::Matched` is the result; if the list runs
//!    out the result is absent (`Ok(None)`)
//!
//! Errors from predicates or implementations end resolution immediately.
//!
//! The engine knows nothing about check specifications. It is used directly
//! by the check compiler, which registers explicit predicates, and wrapped by
//! [`Dispatch`](crate::Dispatch), which infers them.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::candidate::{Args, Candidate, Implementation, Predicate, Priority};
use crate::error::DispatchError;
use crate::registry::PriorityRegistry;
use crate::scope::Scope;
use crate::signal::Outcome;
use crate::signature::Signature;
use crate::value::Value;

/// Anything that resolves calls against a registry of candidates.
///
/// Implemented by [`Engine`], [`CheckCompiler`](crate::CheckCompiler) and
/// [`Dispatch`](crate::Dispatch). `Check` is what `register` accepts: an
/// explicit predicate for the strict flavor, an optional check specification
/// for the permissive one.
pub trait Dispatcher<I> {
    type Output;
    type Check;

    /// Resolve a call. `Ok(None)` means no candidate produced a result.
    fn dispatch(&self, input: &I, rest: &[Value]) -> Result<Option<Self::Output>, DispatchError>;

    /// Resolve a call with a resolution scope. Dispatchers that have no use
    /// for a scope ignore it.
    fn dispatch_with_scope(
        &self,
        input: &I,
        rest: &[Value],
        scope: Option<&Scope>,
    ) -> Result<Option<Self::Output>, DispatchError> {
        let _ = scope;
        self.dispatch(input, rest)
    }

    /// Add a candidate and hand back the implementation unchanged.
    fn register(
        &self,
        check: Self::Check,
        priority: Option<Priority>,
        implementation: Implementation<I, Self::Output>,
    ) -> Result<Implementation<I, Self::Output>, DispatchError>;

    /// The candidates in evaluation order.
    fn candidates(&self) -> Vec<Arc<Candidate<I, Self::Output>>>;
}

/// A predicate-ordered dispatch engine.
pub struct Engine<I, O> {
    /// Display metadata only; never consulted during resolution.
    signature: Signature,
    registry: RwLock<PriorityRegistry<I, O>>,
}

impl<I, O> Engine<I, O> {
    /// Create an engine with an empty registry.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_signature(Signature::new(name))
    }

    /// Create an engine displaying the given signature's name and doc.
    pub fn with_signature(signature: Signature) -> Self {
        Self {
            signature,
            registry: RwLock::new(PriorityRegistry::new()),
        }
    }

    pub fn name(&self) -> &str {
        self.signature.name()
    }

    pub fn doc(&self) -> Option<&str> {
        self.signature.doc()
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Insert an already-built candidate.
    pub fn add(&self, candidate: Candidate<I, O>) -> Arc<Candidate<I, O>> {
        debug!(
            "Registered `{}` on `{}` at priority {}",
            candidate.name(),
            self.name(),
            candidate.priority()
        );
        self.registry.write().add(candidate)
    }

    /// The priority a registration with `explicit` would receive now.
    pub fn resolve_priority(&self, explicit: Option<Priority>) -> Priority {
        self.registry.read().resolve_priority(explicit)
    }

    /// Register `implementation` behind `predicate`.
    ///
    /// Without an explicit priority the candidate goes one past the highest
    /// non-sentinel priority. Returns the implementation unchanged so it can
    /// be registered again under another predicate.
    pub fn register(
        &self,
        predicate: Predicate<I>,
        priority: Option<Priority>,
        implementation: Implementation<I, O>,
    ) -> Implementation<I, O> {
        let mut registry = self.registry.write();
        let priority = registry.resolve_priority(priority);
        debug!(
            "Registered `{}` on `{}` at priority {}",
            implementation.name(),
            self.name(),
            priority
        );
        registry.add(Candidate::new(predicate, implementation.clone(), priority));
        implementation
    }

    /// Resolve a call with no resolution scope.
    pub fn call(&self, input: &I, rest: &[Value]) -> Result<Option<O>, DispatchError> {
        self.call_with_scope(input, rest, None)
    }

    /// Resolve a call.
    ///
    /// `scope` is forwarded only to implementations whose signature declares
    /// the `scope` parameter; the others see `Args::scope == None`.
    pub fn call_with_scope(
        &self,
        input: &I,
        rest: &[Value],
        scope: Option<&Scope>,
    ) -> Result<Option<O>, DispatchError> {
        // Iterate a snapshot so implementations may register on this engine.
        let candidates = self.registry.read().snapshot();

        for candidate in &candidates {
            if !candidate.applies_to(input)? {
                trace!("`{}`: skipped `{}`", self.name(), candidate.name());
                continue;
            }

            let implementation = candidate.implementation();
            let args = Args {
                rest,
                scope: scope.filter(|_| implementation.signature().accepts_scope()),
            };

            match implementation.invoke(input, &args)? {
                Outcome::Matched(result) => {
                    trace!(
                        "`{}`: matched `{}` at priority {}",
                        self.name(),
                        candidate.name(),
                        candidate.priority()
                    );
                    return Ok(Some(result));
                }
                Outcome::Declined => {
                    trace!("`{}`: `{}` declined", self.name(), candidate.name());
                }
            }
        }

        Ok(None)
    }

    /// The candidates in evaluation order.
    pub fn candidates(&self) -> Vec<Arc<Candidate<I, O>>> {
        self.registry.read().snapshot()
    }

    pub fn priorities(&self) -> Vec<Priority> {
        self.registry.read().priorities()
    }

    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.read().is_empty()
    }
}

impl<I, O> Dispatcher<I> for Engine<I, O> {
    type Output = O;
    type Check = Predicate<I>;

    fn dispatch(&self, input: &I, rest: &[Value]) -> Result<Option<O>, DispatchError> {
        self.call(input, rest)
    }

    fn dispatch_with_scope(
        &self,
        input: &I,
        rest: &[Value],
        scope: Option<&Scope>,
    ) -> Result<Option<O>, DispatchError> {
        self.call_with_scope(input, rest, scope)
    }

    fn register(
        &self,
        check: Predicate<I>,
        priority: Option<Priority>,
        implementation: Implementation<I, O>,
    ) -> Result<Implementation<I, O>, DispatchError> {
        Ok(Engine::register(self, check, priority, implementation))
    }

    fn candidates(&self) -> Vec<Arc<Candidate<I, O>>> {
        Engine::candidates(self)
    }
}

impl<I, O> std::fmt::Debug for Engine<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("name", &self.name())
            .field("candidates", &*self.registry.read())
            .finish()
    }
}
