//! Built-in classes.
//!
//! These back the primitive [`Value`](crate::Value) variants and the numeric
//! tower. They are created once per process and shared.

use std::sync::{Arc, LazyLock};

use super::{Class, BUILTINS_MODULE};

static OBJECT: LazyLock<Arc<Class>> = LazyLock::new(|| Class::root("object", BUILTINS_MODULE));
static NONE_TYPE: LazyLock<Arc<Class>> = LazyLock::new(|| Class::new("NoneType", BUILTINS_MODULE));
static STR: LazyLock<Arc<Class>> = LazyLock::new(|| Class::new("str", BUILTINS_MODULE));
static LIST: LazyLock<Arc<Class>> = LazyLock::new(|| Class::new("list", BUILTINS_MODULE));
static TUPLE: LazyLock<Arc<Class>> = LazyLock::new(|| Class::new("tuple", BUILTINS_MODULE));
static DICT: LazyLock<Arc<Class>> = LazyLock::new(|| Class::new("dict", BUILTINS_MODULE));

// Numeric tower
static NUMBER: LazyLock<Arc<Class>> = LazyLock::new(|| Class::new("Number", "numbers"));
static REAL: LazyLock<Arc<Class>> =
    LazyLock::new(|| Class::with_parent("Real", "numbers", Class::number()));
static INTEGRAL: LazyLock<Arc<Class>> =
    LazyLock::new(|| Class::with_parent("Integral", "numbers", Class::real()));
static INT: LazyLock<Arc<Class>> =
    LazyLock::new(|| Class::with_parent("int", BUILTINS_MODULE, Class::integral()));
static BOOL: LazyLock<Arc<Class>> =
    LazyLock::new(|| Class::with_parent("bool", BUILTINS_MODULE, Class::int()));
static FLOAT: LazyLock<Arc<Class>> =
    LazyLock::new(|| Class::with_parent("float", BUILTINS_MODULE, Class::real()));
static DECIMAL: LazyLock<Arc<Class>> =
    LazyLock::new(|| Class::with_parent("Decimal", "decimal", Class::number()));
static FRACTION: LazyLock<Arc<Class>> =
    LazyLock::new(|| Class::with_parent("Fraction", "fractions", Class::real()));

impl Class {
    /// The root of every hierarchy.
    pub fn object() -> Arc<Class> {
        OBJECT.clone()
    }

    /// Class of [`Value::None`](crate::Value::None).
    pub fn none() -> Arc<Class> {
        NONE_TYPE.clone()
    }

    pub fn bool() -> Arc<Class> {
        BOOL.clone()
    }

    pub fn int() -> Arc<Class> {
        INT.clone()
    }

    pub fn float() -> Arc<Class> {
        FLOAT.clone()
    }

    pub fn str() -> Arc<Class> {
        STR.clone()
    }

    pub fn list() -> Arc<Class> {
        LIST.clone()
    }

    pub fn tuple() -> Arc<Class> {
        TUPLE.clone()
    }

    pub fn dict() -> Arc<Class> {
        DICT.clone()
    }

    /// `numbers.Number`
    pub fn number() -> Arc<Class> {
        NUMBER.clone()
    }

    /// `numbers.Real`
    pub fn real() -> Arc<Class> {
        REAL.clone()
    }

    /// `numbers.Integral`
    pub fn integral() -> Arc<Class> {
        INTEGRAL.clone()
    }

    /// `decimal.Decimal`
    pub fn decimal() -> Arc<Class> {
        DECIMAL.clone()
    }

    /// `fractions.Fraction`
    pub fn fraction() -> Arc<Class> {
        FRACTION.clone()
    }
}

/// Classes visible by bare name everywhere, like the `builtins` module.
pub fn builtin_classes() -> Vec<Arc<Class>> {
    vec![
        Class::object(),
        Class::none(),
        Class::bool(),
        Class::int(),
        Class::float(),
        Class::str(),
        Class::list(),
        Class::tuple(),
        Class::dict(),
    ]
}
