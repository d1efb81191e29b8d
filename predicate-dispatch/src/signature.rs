//! Declared signatures of implementations.
//!
//! Registration needs to know three things about an implementation that a
//! closure cannot tell us by itself: the annotation on its first parameter
//! (to infer a check), the scope it was defined in (to resolve forward
//! references), and whether it declares the reserved `scope` parameter.
//! A [`Signature`] records them explicitly, along with display metadata.

use crate::compiler::CheckSpec;
use crate::scope::Scope;

/// Name of the reserved parameter through which the resolution scope is
/// forwarded to an implementation.
pub const SCOPE_PARAM: &str = "scope";

/// A declared parameter.
#[derive(Debug, Clone)]
pub struct Param {
    /// The parameter name.
    pub name: String,
    /// The declared type, if any.
    pub annotation: Option<CheckSpec>,
}

/// Name, doc, parameters and defining scope of an implementation.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    name: String,
    doc: Option<String>,
    params: Vec<Param>,
    scope: Scope,
}

impl Signature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Declare a parameter without a type.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            annotation: None,
        });
        self
    }

    /// Declare a parameter with a type.
    pub fn typed_param(mut self, name: impl Into<String>, annotation: impl Into<CheckSpec>) -> Self {
        self.params.push(Param {
            name: name.into(),
            annotation: Some(annotation.into()),
        });
        self
    }

    /// Set the scope the implementation was defined in.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// The annotation of the first declared parameter.
    pub fn first_annotation(&self) -> Option<&CheckSpec> {
        self.params.first().and_then(|p| p.annotation.as_ref())
    }

    /// Whether a parameter called `name` is declared.
    pub fn declares(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }

    /// Whether the resolution scope should be forwarded on calls.
    pub fn accepts_scope(&self) -> bool {
        self.declares(SCOPE_PARAM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Class;

    #[test]
    fn test_first_annotation() {
        let sig = Signature::new("area").typed_param("shape", Class::float()).param("scale");
        assert!(matches!(sig.first_annotation(), Some(CheckSpec::Type(c)) if **c == *Class::float()));
        assert!(!sig.accepts_scope());

        let untyped = Signature::new("f").param("x").typed_param("y", Class::int());
        assert!(untyped.first_annotation().is_none());
        assert!(Signature::new("g").first_annotation().is_none());
    }

    #[test]
    fn test_scope_param() {
        let sig = Signature::new("resolve").param("name").param(SCOPE_PARAM);
        assert!(sig.accepts_scope());
        assert!(sig.declares("name"));
    }
}
