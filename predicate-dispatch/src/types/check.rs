//! Structural type checking of values against [`TypeExpr`]s.
//!
//! Containers are covariant in their elements and checked recursively:
//! a `list[int]` check walks every element, a `dict[K, V]` check walks every
//! key and value. The first offending position is reported.

use thiserror::Error;

use super::{Class, TypeExpr};
use crate::value::Value;

/// A value does not conform to a type expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path} must be {expected}, found {found}")]
pub struct TypeMismatch {
    /// Where the mismatch was found, e.g. `value[2]`.
    pub path: String,
    /// The type that was required at that position.
    pub expected: String,
    /// What was found there instead.
    pub found: String,
}

impl TypeMismatch {
    fn new(path: &str, expected: &TypeExpr, found: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            expected: expected.to_string(),
            found: found.into(),
        }
    }
}

/// Check `value` against `expected`.
pub fn check_type(value: &Value, expected: &TypeExpr) -> Result<(), TypeMismatch> {
    check_at(value, expected, "value")
}

fn found_class(value: &Value) -> String {
    value.class().qualified_name()
}

fn check_at(value: &Value, expected: &TypeExpr, path: &str) -> Result<(), TypeMismatch> {
    match (expected, value) {
        (TypeExpr::Any, _) => Ok(()),

        // An int is acceptable where a float is expected
        (TypeExpr::Class(class), Value::Int(_) | Value::Bool(_))
            if class.id() == Class::float().id() =>
        {
            Ok(())
        }

        (TypeExpr::Class(class), _) => {
            if value.is_instance(class) {
                Ok(())
            } else {
                Err(TypeMismatch::new(path, expected, found_class(value)))
            }
        }

        (TypeExpr::List(element), Value::List(items)) => {
            for (i, item) in items.iter().enumerate() {
                check_at(item, element, &format!("{}[{}]", path, i))?;
            }
            Ok(())
        }

        (TypeExpr::Sequence(element), Value::List(items) | Value::Tuple(items)) => {
            for (i, item) in items.iter().enumerate() {
                check_at(item, element, &format!("{}[{}]", path, i))?;
            }
            Ok(())
        }

        (TypeExpr::Dict(key_ty, value_ty), Value::Dict(entries)) => {
            for (key, item) in entries {
                check_at(key, key_ty, &format!("key {} of {}", key, path))?;
                check_at(item, value_ty, &format!("{}[{}]", path, key))?;
            }
            Ok(())
        }

        (TypeExpr::Tuple(elements), Value::Tuple(items)) => {
            if elements.len() != items.len() {
                return Err(TypeMismatch::new(
                    path,
                    expected,
                    format!("tuple of length {}", items.len()),
                ));
            }
            for (i, (item, element)) in items.iter().zip(elements).enumerate() {
                check_at(item, element, &format!("{}[{}]", path, i))?;
            }
            Ok(())
        }

        (TypeExpr::Variadic(element), Value::Tuple(items)) => {
            for (i, item) in items.iter().enumerate() {
                check_at(item, element, &format!("{}[{}]", path, i))?;
            }
            Ok(())
        }

        (TypeExpr::Optional(_), Value::None) => Ok(()),
        (TypeExpr::Optional(inner), _) => check_at(value, inner, path),

        (TypeExpr::Union(members), _) => {
            if members.iter().any(|member| check_at(value, member, path).is_ok()) {
                Ok(())
            } else {
                Err(TypeMismatch::new(path, expected, found_class(value)))
            }
        }

        // Container expected, something else found
        (
            TypeExpr::List(_)
            | TypeExpr::Sequence(_)
            | TypeExpr::Dict(..)
            | TypeExpr::Tuple(_)
            | TypeExpr::Variadic(_),
            _,
        ) => {
            Err(TypeMismatch::new(path, expected, found_class(value)))
        }
    }
}
