//! Dispatch Integration Tests
//!
//! End-to-end behavior through the public API: engines resolving calls,
//! dispatchers inferring and compiling checks, and the check compiler being
//! extended with new builders.
//!
//! Set `RUST_LOG=predicate_dispatch=trace` to see resolution steps.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use predicate_dispatch::{
    always, predicate, Args, CheckCompiler, CheckSpec, Class, Config, Dispatch, DispatchError,
    Dispatcher, Engine, Implementation, Module, ModuleRegistry, Object, Outcome, Scope, Signature,
    TypeExpr, Value, SENTINEL_PRIORITY,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn constant(name: &str, result: &'static str) -> Implementation<Value, Value> {
    Implementation::from_fn(name, move |_: &Value, _| Ok(Value::from(result)))
}

fn zoo() -> (Arc<Class>, Arc<Class>, Arc<Class>) {
    let animal = Class::new("Animal", "zoo");
    let dog = Class::with_parent("Dog", "zoo", animal.clone());
    let cat = Class::with_parent("Cat", "zoo", animal.clone());
    (animal, dog, cat)
}

// ============================================================
// Engine resolution
// ============================================================

#[test]
fn test_rejected_candidate_is_skipped() {
    init_tracing();
    let engine: Engine<Value, Value> = Engine::new("pick");
    engine.register(predicate(|_: &Value| false), Some(0), constant("c1", "W"));
    engine.register(always(), Some(1), constant("c2", "X"));

    assert_eq!(engine.call(&Value::Int(0), &[]).unwrap(), Some(Value::from("X")));
}

#[test]
fn test_declined_candidate_hands_off() {
    init_tracing();
    let engine: Engine<Value, Value> = Engine::new("pick");
    engine.register(
        always(),
        Some(0),
        Implementation::new("c1", |_: &Value, _| Ok(Outcome::Declined)),
    );
    engine.register(always(), Some(1), constant("c2", "Y"));

    assert_eq!(engine.call(&Value::Int(0), &[]).unwrap(), Some(Value::from("Y")));
}

#[test]
fn test_rest_arguments_reach_implementation() {
    let engine: Engine<Value, Value> = Engine::new("add");
    engine.register(
        always(),
        None,
        Implementation::from_fn("add_ints", |a: &Value, args: &Args<'_>| {
            let b = args.get(0).and_then(Value::as_int).unwrap_or_default();
            Ok(Value::Int(a.as_int().unwrap_or_default() + b))
        }),
    );

    assert_eq!(engine.call(&Value::Int(2), &[Value::Int(40)]).unwrap(), Some(Value::Int(42)));
}

// ============================================================
// Dispatchers
// ============================================================

#[test]
fn test_fallback_sees_every_value() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let dispatch = Dispatch::new(Implementation::from_fn("identity", move |v: &Value, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(v.clone())
    }))
    .unwrap();

    let values = [
        Value::None,
        Value::Bool(true),
        Value::Int(-1),
        Value::Float(2.5),
        Value::from("s"),
        Value::Tuple(vec![Value::Int(1)]),
        Value::Dict(vec![(Value::from("k"), Value::Int(1))]),
    ];
    for value in &values {
        assert_eq!(&dispatch.call(value, &[]).unwrap(), value);
    }
    assert_eq!(calls.load(Ordering::SeqCst), values.len());
}

#[test]
fn test_most_specific_registered_first() {
    let (animal, dog, cat) = zoo();
    let speak = Dispatch::builder().name("speak").build().unwrap();

    speak
        .register(None, None, constant("woof", "woof").typed_param("d", dog.clone()))
        .unwrap();
    speak
        .register(None, None, constant("generic", "...").typed_param("a", animal.clone()))
        .unwrap();

    assert_eq!(speak.call(&Value::from(Object::new(dog)), &[]).unwrap(), Value::from("woof"));
    assert_eq!(speak.call(&Value::from(Object::new(cat)), &[]).unwrap(), Value::from("..."));
    assert!(matches!(
        speak.call(&Value::from(Object::new(animal)), &[]),
        Ok(ref v) if *v == Value::from("...")
    ));
    assert!(matches!(
        speak.call(&Value::Int(1), &[]),
        Err(DispatchError::NoImplementation { .. })
    ));
}

#[test]
fn test_explicit_priority_overrides_order() {
    let (animal, dog, _) = zoo();
    let speak = Dispatch::builder().build().unwrap();

    speak
        .register(Some(animal.into()), Some(10), constant("generic", "..."))
        .unwrap();
    speak
        .register(Some(dog.clone().into()), Some(5), constant("woof", "woof"))
        .unwrap();

    assert_eq!(speak.call(&Value::from(Object::new(dog)), &[]).unwrap(), Value::from("woof"));
    assert_eq!(
        speak.engine().priorities(),
        vec![5, 10, SENTINEL_PRIORITY]
    );
}

#[test]
fn test_generic_checks() {
    let total = Dispatch::builder().name("total").build().unwrap();
    total
        .register(
            Some(TypeExpr::list(Class::int()).into()),
            None,
            Implementation::from_fn("sum_ints", |v: &Value, _| {
                let Value::List(items) = v else {
                    return Ok(Value::None);
                };
                Ok(Value::Int(items.iter().filter_map(Value::as_int).sum()))
            }),
        )
        .unwrap();
    total
        .register(
            Some(TypeExpr::optional(Class::str()).into()),
            None,
            constant("text_or_nothing", "text"),
        )
        .unwrap();

    let ints = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    assert_eq!(total.call(&ints, &[]).unwrap(), Value::Int(6));
    assert_eq!(total.call(&Value::None, &[]).unwrap(), Value::from("text"));
    assert!(total.call(&Value::List(vec![Value::from("a")]), &[]).is_err());
}

#[test]
fn test_missing_check_fails_before_invocation() {
    let invoked = Arc::new(AtomicUsize::new(0));
    let counter = invoked.clone();
    let dispatch = Dispatch::builder().build().unwrap();

    let untyped = Implementation::from_fn("untyped", move |_: &Value, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Value::None)
    })
    .param("x");

    let err = dispatch.register(None, None, untyped).unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(dispatch.candidates().len(), 1);
    assert_eq!(invoked.load(Ordering::SeqCst), 0);
}

#[test]
fn test_two_fallbacks_fail_to_build() {
    let err = Dispatch::builder()
        .fallback(constant("a", "a"))
        .fallback(constant("b", "b"))
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "dispatch takes at most 1 fallback implementation but 2 were given"
    );
}

// ============================================================
// Check compilation through dispatchers
// ============================================================

#[test]
fn test_import_path_check() {
    init_tracing();
    let dispatch = Dispatch::builder().build().unwrap();
    dispatch
        .register(None, None, constant("decimal", "decimal").typed_param("d", "decimal.Decimal"))
        .unwrap();

    let decimal = Value::from(Object::new(Class::decimal()));
    assert_eq!(dispatch.call(&decimal, &[]).unwrap(), Value::from("decimal"));
    assert!(dispatch.call(&Value::Float(1.0), &[]).is_err());
}

#[test]
fn test_missing_module_surfaces_only_for_suspect_values() {
    let loader = Arc::new(ModuleRegistry::with_std());
    let compiler = Arc::new(CheckCompiler::with_loader(loader.clone()));
    let dispatch = Dispatch::builder()
        .fallback(constant("default", "default"))
        .compiler(compiler)
        .build()
        .unwrap();

    // Registration succeeds: nothing is loaded until the predicate runs
    dispatch
        .register(None, None, constant("spirit", "boo").typed_param("s", "ghost.Spirit"))
        .unwrap();

    assert_eq!(dispatch.call(&Value::Int(1), &[]).unwrap(), Value::from("default"));
    assert!(loader.loaded_modules().is_empty());

    let haunted = Value::from(Object::new(Class::new("Spirit", "ghost.local")));
    let err = dispatch.call(&haunted, &[]).unwrap_err();
    assert_eq!(err.to_string(), "no module named 'ghost'");

    // Once the module exists the same dispatcher works
    let spirit = Class::new("Spirit", "ghost");
    let provided = spirit.clone();
    loader.provide("ghost", move || Module::new("ghost").with_class(provided.clone()));
    assert_eq!(
        dispatch.call(&Value::from(Object::new(spirit)), &[]).unwrap(),
        Value::from("boo")
    );
}

#[test]
fn test_scope_resolves_forward_references() {
    let (animal, dog, _) = zoo();
    let scope = Scope::new().with_class(animal).with_class(dog.clone());
    let dispatch = Dispatch::builder().build().unwrap();

    dispatch
        .register(
            None,
            None,
            constant("dog", "dog")
                .typed_param("d", "Dog")
                .with_scope(scope.clone()),
        )
        .unwrap();
    dispatch
        .register(
            None,
            None,
            constant("animal", "animal")
                .typed_param("a", "Animal")
                .with_scope(scope),
        )
        .unwrap();

    assert_eq!(dispatch.call(&Value::from(Object::new(dog)), &[]).unwrap(), Value::from("dog"));
}

#[test]
fn test_unresolvable_name_errors_late() {
    let dispatch = Dispatch::builder().build().unwrap();
    // Neither scope nor module knows `Unicorn`; the import builder still accepts it
    dispatch
        .register(None, None, constant("unicorn", "?").typed_param("u", "Unicorn"))
        .unwrap();

    // Cheap rejection: `<class 'int'>` does not mention `Unicorn`
    let err = dispatch.call(&Value::Int(1), &[]).unwrap_err();
    assert!(matches!(err, DispatchError::NoImplementation { .. }));
}

#[test]
fn test_callable_check() {
    let sign = Dispatch::builder().name("sign").build().unwrap();
    sign.register(
        Some(CheckSpec::predicate(|v| v.as_int().is_some_and(|i| i < 0))),
        None,
        constant("negative", "-"),
    )
    .unwrap();
    sign.register(Some(CheckSpec::predicate(|_| true)), None, constant("other", "+"))
        .unwrap();

    assert_eq!(sign.call(&Value::Int(-3), &[]).unwrap(), Value::from("-"));
    assert_eq!(sign.call(&Value::Int(3), &[]).unwrap(), Value::from("+"));
}

// ============================================================
// Extending the check compiler
// ============================================================

#[test]
fn test_custom_builder_on_isolated_compiler() {
    init_tracing();
    let compiler = Arc::new(CheckCompiler::with_loader(Arc::new(ModuleRegistry::with_std())));

    // `len=N`: sequences of exactly N items
    compiler.register(
        predicate(|s: &CheckSpec| matches!(s, CheckSpec::Name(n) if n.starts_with("len="))),
        Some(50),
        Implementation::new("check_length", |spec: &CheckSpec, _| {
            let CheckSpec::Name(name) = spec else {
                return Ok(Outcome::Declined);
            };
            let Ok(expected) = name["len=".len()..].parse::<usize>() else {
                return Ok(Outcome::Declined);
            };
            Ok(Outcome::Matched(predicate(move |v: &Value| match v {
                Value::List(items) | Value::Tuple(items) => items.len() == expected,
                _ => false,
            })))
        }),
    );

    let dispatch = Dispatch::builder().compiler(compiler.clone()).build().unwrap();
    dispatch
        .register(Some(CheckSpec::name("len=2")), None, constant("pair", "pair"))
        .unwrap();
    dispatch
        .register(Some(Class::list().into()), None, constant("list", "list"))
        .unwrap();

    let pair = Value::Tuple(vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(dispatch.call(&pair, &[]).unwrap(), Value::from("pair"));
    assert_eq!(
        dispatch.call(&Value::List(vec![Value::Int(1)]), &[]).unwrap(),
        Value::from("list")
    );

    // The shared compiler is untouched
    let default = Dispatch::builder().build().unwrap();
    assert!(default.compiler().candidates().iter().all(|c| c.priority() >= 100));
    assert_eq!(compiler.engine().priorities()[0], 50);
}

#[test]
fn test_builder_receives_scope_only_when_declared() {
    let compiler = Arc::new(CheckCompiler::empty("scoped"));
    let saw_scope = Arc::new(AtomicUsize::new(0));

    let seen = saw_scope.clone();
    compiler.register(
        always(),
        None,
        Implementation::new("unscoped", move |_: &CheckSpec, args: &Args<'_>| {
            if args.scope.is_some() {
                seen.fetch_add(1, Ordering::SeqCst);
            }
            Ok(Outcome::Declined)
        }),
    );
    let seen = saw_scope.clone();
    compiler.register(
        always(),
        None,
        Implementation::new("scoped", move |_: &CheckSpec, args: &Args<'_>| {
            if args.scope.is_some() {
                seen.fetch_add(10, Ordering::SeqCst);
            }
            Ok(Outcome::Matched(predicate(|_: &Value| true)))
        })
        .with_signature(Signature::new("").param("spec").param("scope")),
    );

    let dispatch = Dispatch::builder().compiler(compiler).build().unwrap();
    dispatch
        .register(Some(CheckSpec::name("anything")), None, constant("any", "any"))
        .unwrap();

    assert_eq!(saw_scope.load(Ordering::SeqCst), 10);
    assert_eq!(dispatch.call(&Value::Int(1), &[]).unwrap(), Value::from("any"));
}

#[test]
fn test_dispatcher_trait_is_uniform() {
    fn count<I, D: Dispatcher<I>>(dispatcher: &D) -> usize {
        dispatcher.candidates().len()
    }

    let engine: Engine<Value, Value> = Engine::new("e");
    let compiler = CheckCompiler::empty("c");
    let dispatch = Dispatch::builder().build().unwrap();

    assert_eq!(count::<Value, _>(&engine), 0);
    assert_eq!(count::<CheckSpec, _>(&compiler), 0);
    assert_eq!(count::<Value, _>(&dispatch), 1);
}

#[test]
fn test_config_builds_dedicated_compiler() {
    let config = Config::from_toml_str(
        r#"
        [compiler]
        import_prefilter = false
        preload = ["fractions"]

        [dispatch]
        fallback_name = "number_kind"
        "#,
    )
    .unwrap();
    let dispatch = Dispatch::builder().config(config).build().unwrap();
    assert_eq!(dispatch.name(), "number_kind");

    // Without the prefilter `numbers.Number` matches a plain int
    dispatch
        .register(Some(CheckSpec::name("numbers.Number")), None, constant("number", "number"))
        .unwrap();
    assert_eq!(dispatch.call(&Value::Int(1), &[]).unwrap(), Value::from("number"));
    assert!(ModuleRegistry::global().is_loaded("fractions"));
}
