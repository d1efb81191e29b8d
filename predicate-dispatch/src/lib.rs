//! Predicate Dispatch
//!
//! Runtime polymorphism by predicate: candidates are tried in ascending
//! priority order, and the first whose predicate accepts the value and whose
//! implementation does not decline produces the result.
//!
//! # Features
//!
//! - Priority-ordered candidates with stable tie-breaking
//! - Implementations that can decline and hand off to the next candidate
//! - Checks inferred from declared parameter types
//! - A check compiler that is itself a dispatch engine, extensible with
//!   custom builders
//! - Forward references resolved in the defining scope, with module import
//!   as a last resort
//!
//! # Example
//!
//! ```
//! use predicate_dispatch::{Class, Dispatch, Implementation, Value};
//!
//! let area = Dispatch::new(
//!     Implementation::from_fn("area", |_: &Value, _| Ok(Value::Float(0.0)))
//!         .with_doc("Area of a shape."),
//! )
//! .unwrap();
//!
//! area.register(
//!     None,
//!     None,
//!     Implementation::from_fn("square", |side: &Value, _| {
//!         let side = side.as_float().unwrap_or_default();
//!         Ok(Value::Float(side * side))
//!     })
//!     .typed_param("side", Class::float()),
//! )
//! .unwrap();
//!
//! assert_eq!(area.call(&Value::Float(3.0), &[]).unwrap(), Value::Float(9.0));
//! assert_eq!(area.call(&Value::from("circle"), &[]).unwrap(), Value::Float(0.0));
//! ```
//!
//! # Module Structure
//!
//! - [`signal`] - matched/declined outcome of an implementation
//! - [`candidate`] - predicates, implementations, candidates
//! - [`registry`] - the priority-ordered candidate list
//! - [`engine`] - call resolution and the [`Dispatcher`] trait
//! - [`compiler`] - turning check specifications into predicates
//! - [`factory`] - user-facing dispatchers with fallbacks
//! - [`types`], [`value`], [`scope`], [`modules`], [`signature`] - the
//!   runtime model checks operate on

pub mod candidate;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod factory;
pub mod modules;
pub mod registry;
pub mod scope;
pub mod signal;
pub mod signature;
pub mod types;
pub mod value;

pub use candidate::{always, predicate, Args, Candidate, Implementation, Predicate, Priority, ValuePredicate, SENTINEL_PRIORITY};
pub use compiler::{default_compiler, CheckCompiler, CheckDispatcher, CheckSpec};
pub use config::{Config, ConfigError};
pub use engine::{Dispatcher, Engine};
pub use error::DispatchError;
pub use factory::{Dispatch, DispatchBuilder};
pub use modules::{Module, ModuleLoader, ModuleRegistry};
pub use registry::PriorityRegistry;
pub use scope::Scope;
pub use signal::Outcome;
pub use signature::Signature;
pub use types::{Class, TypeExpr};
pub use value::{Object, Value};
