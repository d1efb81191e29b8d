//! Parameterized type expressions.

use std::fmt;
use std::sync::Arc;

use super::Class;

/// A parameterized (generic) type such as `list[int]` or `dict[str, Dog]`.
///
/// Containers are checked element-wise by [`check_type`](super::check_type).
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// Accepts every value.
    Any,
    /// Instance of a class or one of its subclasses.
    Class(Arc<Class>),
    /// `list[T]`
    List(Box<TypeExpr>),
    /// `Sequence[T]`: a list or a tuple of any length.
    Sequence(Box<TypeExpr>),
    /// `dict[K, V]`
    Dict(Box<TypeExpr>, Box<TypeExpr>),
    /// `tuple[A, B, ...]` with a fixed arity.
    Tuple(Vec<TypeExpr>),
    /// `tuple[T, ...]` of any length.
    Variadic(Box<TypeExpr>),
    /// `Optional[T]`, i.e. `T` or `None`.
    Optional(Box<TypeExpr>),
    /// `Union[A, B, ...]`
    Union(Vec<TypeExpr>),
}

impl TypeExpr {
    pub fn class(class: Arc<Class>) -> Self {
        TypeExpr::Class(class)
    }

    pub fn list(element: impl Into<TypeExpr>) -> Self {
        TypeExpr::List(Box::new(element.into()))
    }

    pub fn sequence(element: impl Into<TypeExpr>) -> Self {
        TypeExpr::Sequence(Box::new(element.into()))
    }

    pub fn dict(key: impl Into<TypeExpr>, value: impl Into<TypeExpr>) -> Self {
        TypeExpr::Dict(Box::new(key.into()), Box::new(value.into()))
    }

    pub fn tuple(elements: Vec<TypeExpr>) -> Self {
        TypeExpr::Tuple(elements)
    }

    pub fn variadic(element: impl Into<TypeExpr>) -> Self {
        TypeExpr::Variadic(Box::new(element.into()))
    }

    pub fn optional(inner: impl Into<TypeExpr>) -> Self {
        TypeExpr::Optional(Box::new(inner.into()))
    }

    pub fn union(members: Vec<TypeExpr>) -> Self {
        TypeExpr::Union(members)
    }
}

impl From<Arc<Class>> for TypeExpr {
    fn from(class: Arc<Class>) -> Self {
        TypeExpr::Class(class)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeExpr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Any => write!(f, "Any"),
            TypeExpr::Class(class) => write!(f, "{}", class),
            TypeExpr::List(element) => write!(f, "list[{}]", element),
            TypeExpr::Sequence(element) => write!(f, "Sequence[{}]", element),
            TypeExpr::Dict(key, value) => write!(f, "dict[{}, {}]", key, value),
            TypeExpr::Tuple(elements) if elements.is_empty() => write!(f, "tuple[()]"),
            TypeExpr::Tuple(elements) => {
                write!(f, "tuple[")?;
                write_list(f, elements)?;
                write!(f, "]")
            }
            TypeExpr::Variadic(element) => write!(f, "tuple[{}, ...]", element),
            TypeExpr::Optional(inner) => write!(f, "Optional[{}]", inner),
            TypeExpr::Union(members) => {
                write!(f, "Union[")?;
                write_list(f, members)?;
                write!(f, "]")
            }
        }
    }
}
