//! The builtin predicate builders.

use std::sync::Arc;

use tracing::trace;

use super::CheckSpec;
use crate::candidate::{predicate, Implementation, Predicate, Priority, ValuePredicate};
use crate::engine::Engine;
use crate::error::DispatchError;
use crate::modules::ModuleLoader;
use crate::scope::Scope;
use crate::signal::Outcome;
use crate::signature::SCOPE_PARAM;
use crate::types::{check_type, Class};
use crate::value::Value;

pub const CONCRETE_TYPE_PRIORITY: Priority = 100;
pub const GENERIC_TYPE_PRIORITY: Priority = 101;
pub const FORWARD_REF_PRIORITY: Priority = 102;
pub const IMPORT_PATH_PRIORITY: Priority = 103;
pub const CALLABLE_PRIORITY: Priority = 104;

type Builder = Implementation<CheckSpec, ValuePredicate>;

/// Register the five builtin builders on `engine`.
pub(crate) fn install(
    engine: &Engine<CheckSpec, ValuePredicate>,
    loader: Arc<dyn ModuleLoader>,
    import_prefilter: bool,
) {
    engine.register(guard(|s| matches!(s, CheckSpec::Type(_))), Some(CONCRETE_TYPE_PRIORITY), concrete_type());
    engine.register(guard(|s| matches!(s, CheckSpec::Generic(_))), Some(GENERIC_TYPE_PRIORITY), generic_type());
    engine.register(guard(|s| matches!(s, CheckSpec::Name(_))), Some(FORWARD_REF_PRIORITY), forward_ref());
    engine.register(
        guard(|s| matches!(s, CheckSpec::Name(_))),
        Some(IMPORT_PATH_PRIORITY),
        import_path(loader, import_prefilter),
    );
    engine.register(guard(|s| matches!(s, CheckSpec::Predicate(_))), Some(CALLABLE_PRIORITY), callable());
}

fn guard(test: fn(&CheckSpec) -> bool) -> Predicate<CheckSpec> {
    predicate(test)
}

fn instance_of(class: Arc<Class>) -> ValuePredicate {
    predicate(move |value: &Value| value.is_instance(&class))
}

/// Check against a single class.
pub fn concrete_type() -> Builder {
    Implementation::new("check_concrete_type", |spec: &CheckSpec, _| {
        let CheckSpec::Type(class) = spec else {
            return Ok(Outcome::Declined);
        };
        Ok(Outcome::Matched(instance_of(class.clone())))
    })
    .param("spec")
    .with_doc("Check against a single class.")
}

/// Check structurally against a parameterized type. Mismatches are `false`.
pub fn generic_type() -> Builder {
    Implementation::new("check_generic_type", |spec: &CheckSpec, _| {
        let CheckSpec::Generic(expr) = spec else {
            return Ok(Outcome::Declined);
        };
        let expr = expr.clone();
        Ok(Outcome::Matched(predicate(move |value: &Value| check_type(value, &expr).is_ok())))
    })
    .param("spec")
    .with_doc("Check structurally against a parameterized type.")
}

/// Resolve a name in the caller's scope; decline if it is not there.
pub fn forward_ref() -> Builder {
    Implementation::new("check_forward_ref", |spec: &CheckSpec, args| {
        let CheckSpec::Name(name) = spec else {
            return Ok(Outcome::Declined);
        };
        let resolved = match args.scope {
            Some(scope) => scope.resolve(name),
            None => Scope::new().resolve(name),
        };
        match resolved {
            Some(class) => Ok(Outcome::Matched(instance_of(class))),
            None => {
                trace!("Forward reference {:?} not in scope, trying import", name);
                Ok(Outcome::Declined)
            }
        }
    })
    .param("spec")
    .param(SCOPE_PARAM)
    .with_doc("Resolve the name in the defining scope, then check against it.")
}

/// Split `module.path.Type` at its last dot. Leading dots never split, so
/// `.Foo` is a module path with an empty type name, as is any string
/// without a dot.
fn split_import_path(path: &str) -> (String, String) {
    let leading = path.len() - path.trim_start_matches('.').len();
    match path[leading..].rsplit_once('.') {
        Some((module, name)) => (path[..leading + module.len()].to_string(), name.to_string()),
        None => (path.to_string(), String::new()),
    }
}

/// Load the named class from its module when a value might be an instance.
///
/// The produced predicate first rejects values whose runtime type text does
/// not mention the module's top-level package, so unrelated values never
/// trigger a load. Load failures are errors, not `false`.
pub fn import_path(loader: Arc<dyn ModuleLoader>, prefilter: bool) -> Builder {
    Implementation::new("check_import_path", move |spec: &CheckSpec, _| {
        let CheckSpec::Name(path) = spec else {
            return Ok(Outcome::Declined);
        };
        let (module_path, type_name) = split_import_path(path);
        let package = module_path.split('.').next().unwrap_or_default().to_string();
        let loader = loader.clone();

        let check: ValuePredicate = Arc::new(move |value: &Value| -> Result<bool, DispatchError> {
            if prefilter && !value.type_repr().contains(&package) {
                return Ok(false);
            }
            let class = loader.load(&module_path)?.attr(&type_name)?;
            Ok(value.is_instance(&class))
        });
        Ok(Outcome::Matched(check))
    })
    .param("spec")
    .with_doc("Load the module named by the path, then check against its class.")
}

/// Use a predicate specification as the predicate itself.
pub fn callable() -> Builder {
    Implementation::new("check_callable", |spec: &CheckSpec, _| {
        let CheckSpec::Predicate(check) = spec else {
            return Ok(Outcome::Declined);
        };
        Ok(Outcome::Matched(check.clone()))
    })
    .param("spec")
    .with_doc("Return the predicate as-is.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_import_path() {
        assert_eq!(
            split_import_path("zoo.pets.Dog"),
            ("zoo.pets".to_string(), "Dog".to_string())
        );
        assert_eq!(split_import_path("Dog"), ("Dog".to_string(), String::new()));
    }

    #[test]
    fn test_split_import_path_leading_dots() {
        assert_eq!(split_import_path(".Foo"), (".Foo".to_string(), String::new()));
        assert_eq!(split_import_path("..Foo"), ("..Foo".to_string(), String::new()));
        assert_eq!(
            split_import_path(".pkg.Foo"),
            (".pkg".to_string(), "Foo".to_string())
        );
    }
}
