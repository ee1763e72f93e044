//! Recipe construction: field iteration, factories, validation hooks,
//! custom makers and array-typed fields.

use confect::{
    FieldSpec, Instance, MadeValue, MakeError, MakeOptions, MakeRegistry, Recipe, TypeTag,
};
use serde_json::json;

fn registry() -> MakeRegistry {
    let mut registry = MakeRegistry::new();
    registry.add_recipe(
        Recipe::new("A").with_field(FieldSpec::new("data").skip_type_check()),
    );
    registry.add_recipe(
        Recipe::new("C").with_field(FieldSpec::typed("data", TypeTag::Number)),
    );
    registry.add_recipe(
        Recipe::new("B").with_field(FieldSpec::typed("a", TypeTag::named("A"))),
    );
    registry
}

#[test]
fn simple_recipe_builds_from_valid_config() {
    let registry = registry();
    let made = registry
        .make(&json!({"$$type": "A", "data": "100"}))
        .unwrap()
        .unwrap();
    assert_eq!(
        made,
        MadeValue::Instance(Instance::new("A").with("data", "100"))
    );
}

#[test]
fn typed_field_rejects_unparseable_config() {
    let registry = registry();
    let err = registry.make(&json!({"$$type": "C", "data": "abc"})).unwrap_err();
    assert!(matches!(err, MakeError::TypeCheck { .. }));
    assert_eq!(err.path(), "data");
}

#[test]
fn nested_field_builds_through_its_preferred_type() {
    let registry = registry();
    // no discriminator on the nested mapping: the field's preferred type
    // selects the maker
    let made = registry
        .make(&json!({"$$type": "B", "a": {"data": 100}}))
        .unwrap()
        .unwrap();
    let a = made.as_instance().unwrap().get("a").unwrap();
    assert_eq!(a.as_instance().unwrap().type_name(), "A");
    assert_eq!(
        a.as_instance().unwrap().get("data"),
        Some(&MadeValue::Number(100.0))
    );
}

#[test]
fn nested_field_discriminator_must_satisfy_the_field_type() {
    let registry = registry();
    let err = registry
        .make(&json!({"$$type": "B", "a": {"$$type": "C", "data": 100}}))
        .unwrap_err();
    assert!(matches!(err, MakeError::TypeCheck { .. }));
    assert_eq!(err.path(), "a");
}

#[test]
fn deep_nesting_builds_and_fails_with_paths() {
    let registry = registry();
    let config = json!({"data": {"$$type": "B", "a": {"data": {"$$type": "C", "data": 100}}}});
    let made = registry
        .make_with(&config, &MakeOptions::typed(TypeTag::named("A")))
        .unwrap()
        .unwrap();
    // outer config has no discriminator either; the preferred type drives it
    assert_eq!(made.as_instance().unwrap().type_name(), "A");

    let bad = json!({"data": {"$$type": "B", "a": {"data": {"$$type": "C", "data": "abc"}}}});
    let err = registry
        .make_with(&bad, &MakeOptions::typed(TypeTag::named("A")))
        .unwrap_err();
    assert!(matches!(err, MakeError::TypeCheck { .. }));
    assert_eq!(err.path(), "data.a.data.data");
}

#[test]
fn factory_presets_survive_absent_config_keys() {
    let mut registry = registry();
    registry.add_recipe(
        Recipe::new("FactoryClass")
            .with_factory(|| {
                Instance::new("FactoryClass")
                    .with("a", Instance::new("A").with("data", 1000i64))
            })
            .with_field(FieldSpec::typed("a", TypeTag::named("A"))),
    );
    let made = registry.make(&json!({"$$type": "FactoryClass"})).unwrap().unwrap();
    let a = made.as_instance().unwrap().get("a").unwrap();
    assert_eq!(
        a,
        &MadeValue::Instance(Instance::new("A").with("data", 1000i64))
    );
}

#[test]
fn field_validation_gates_the_construction() {
    let mut registry = registry();
    registry.add_recipe(
        Recipe::new("ValidatedFieldClass").with_field(
            FieldSpec::typed("a", TypeTag::named("A")).with_validation(|_, value| {
                value
                    .and_then(|v| v.as_instance())
                    .and_then(|a| a.get("data"))
                    .and_then(MadeValue::as_f64)
                    .is_some_and(|data| data > 100.0)
            }),
        ),
    );

    let made = registry
        .make(&json!({"$$type": "ValidatedFieldClass", "a": {"data": 1000}}))
        .unwrap();
    assert!(made.is_some());

    let err = registry
        .make(&json!({"$$type": "ValidatedFieldClass", "a": {"data": 10}}))
        .unwrap_err();
    assert!(matches!(err, MakeError::Construction { .. }));
}

#[test]
fn object_validation_gates_the_construction() {
    let mut registry = registry();
    registry.add_recipe(
        Recipe::new("ValidatedClass")
            .with_field(FieldSpec::new("a").skip_type_check())
            .with_validation(|target| target.get("a").is_some()),
    );

    let made = registry
        .make(&json!({"$$type": "ValidatedClass", "a": {}}))
        .unwrap();
    assert!(made.is_some());

    let err = registry.make(&json!({"$$type": "ValidatedClass"})).unwrap_err();
    assert!(matches!(err, MakeError::Construction { .. }));
}

#[test]
fn validated_fields_skip_the_type_check() {
    // the validator replaces the type check for its field
    let mut registry = registry();
    registry.add_recipe(
        Recipe::new("LooseNumber").with_field(
            FieldSpec::typed("n", TypeTag::Number).with_validation(|_, value| value.is_some()),
        ),
    );
    let made = registry
        .make(&json!({"$$type": "LooseNumber", "n": "abc"}))
        .unwrap()
        .unwrap();
    assert_eq!(
        made.as_instance().unwrap().get("n"),
        Some(&MadeValue::from("abc"))
    );
}

#[test]
fn config_name_reads_a_different_key() {
    let mut registry = registry();
    registry.add_recipe(
        Recipe::new("Renamed").with_field(
            FieldSpec::typed("timeout", TypeTag::Number).with_config_name("timeout_ms"),
        ),
    );
    let made = registry
        .make(&json!({"$$type": "Renamed", "timeout_ms": 250}))
        .unwrap()
        .unwrap();
    let instance = made.as_instance().unwrap();
    assert_eq!(instance.get("timeout"), Some(&MadeValue::Number(250.0)));
    assert_eq!(instance.get("timeout_ms"), None);
}

#[test]
fn optional_fields_tolerate_null() {
    let mut registry = registry();
    registry.add_recipe(
        Recipe::new("WithOptional")
            .with_field(FieldSpec::typed("req", TypeTag::named("A")))
            .with_field(FieldSpec::typed("opt", TypeTag::named("A")).optional()),
    );

    let made = registry
        .make(&json!({"$$type": "WithOptional", "req": {"data": 1}, "opt": null}))
        .unwrap()
        .unwrap();
    assert_eq!(
        made.as_instance().unwrap().get("opt"),
        Some(&MadeValue::Null)
    );

    let err = registry
        .make(&json!({"$$type": "WithOptional", "req": null}))
        .unwrap_err();
    assert!(matches!(err, MakeError::TypeCheck { .. }));
    assert_eq!(err.path(), "req");
}

#[test]
fn field_default_applies_when_resolution_yields_nothing() {
    let mut registry = registry();
    registry.add_recipe(
        Recipe::new("Flagged").with_field(
            FieldSpec::typed("flag", TypeTag::Boolean).with_default(true),
        ),
    );
    // an array has no definite boolean form, so the default steps in
    let made = registry
        .make(&json!({"$$type": "Flagged", "flag": []}))
        .unwrap()
        .unwrap();
    assert_eq!(
        made.as_instance().unwrap().get("flag"),
        Some(&MadeValue::Bool(true))
    );
}

#[test]
fn custom_maker_replaces_field_iteration() {
    let mut registry = registry();
    registry.add_recipe(
        Recipe::new("Custom")
            .with_field(FieldSpec::new("data").skip_type_check())
            .with_custom_maker(|ctx, config, _| {
                let mut instance = Instance::new("Custom");
                if let Some(data) = ctx.make(Some(config), &MakeOptions::default())? {
                    instance.set("data", data);
                }
                Ok(Some(MadeValue::Instance(instance)))
            }),
    );

    // the custom maker sees the whole config (minus the discriminator)
    // and performs no field iteration
    let made = registry
        .make(&json!({"$$type": "Custom", "data": "100"}))
        .unwrap()
        .unwrap();
    let instance = made.as_instance().unwrap();
    assert_eq!(
        instance.get("data"),
        Some(&MadeValue::from(&json!({"data": "100"})))
    );

    let err = registry
        .make_with(
            &json!({"$$type": "Custom", "data": "100"}),
            &MakeOptions::typed(TypeTag::named("A")),
        )
        .unwrap_err();
    assert!(matches!(err, MakeError::TypeCheck { .. }));

    let skip = MakeOptions {
        preferred_type: Some(TypeTag::named("A")),
        skip_type_check: true,
        ..MakeOptions::default()
    };
    assert!(registry
        .make_with(&json!({"$$type": "Custom", "data": "100"}), &skip)
        .unwrap()
        .is_some());
}

#[test]
fn array_field_coerces_each_element() {
    let mut registry = registry();
    registry.add_recipe(
        Recipe::new("Numbers").with_field(FieldSpec::typed(
            "arr",
            TypeTag::array_of(TypeTag::Number),
        )),
    );
    let made = registry
        .make(&json!({"$$type": "Numbers", "arr": [1, "2", 3]}))
        .unwrap()
        .unwrap();
    assert_eq!(
        made.as_instance().unwrap().get("arr"),
        Some(&MadeValue::Array(vec![
            MadeValue::Number(1.0),
            MadeValue::Number(2.0),
            MadeValue::Number(3.0),
        ]))
    );
}

#[test]
fn array_field_requires_an_array() {
    let mut registry = registry();
    registry.add_recipe(
        Recipe::new("Numbers").with_field(FieldSpec::typed(
            "arr",
            TypeTag::array_of(TypeTag::Number),
        )),
    );
    let err = registry
        .make(&json!({"$$type": "Numbers", "arr": {}}))
        .unwrap_err();
    assert!(matches!(err, MakeError::InvalidConfig { .. }));
}

#[test]
fn array_field_elements_build_constructible_types() {
    let registry = {
        let mut registry = registry();
        registry.add_recipe(Recipe::new("Group").with_field(FieldSpec::typed(
            "members",
            TypeTag::array_of(TypeTag::named("A")),
        )));
        registry
    };

    let made = registry
        .make(&json!({"$$type": "Group", "members": [{"data": 1}, {"$$type": "A", "data": 2}]}))
        .unwrap()
        .unwrap();
    let members = made.as_instance().unwrap().get("members").unwrap();
    let members = members.as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].as_instance().unwrap().type_name(), "A");

    // an element of the wrong constructed type fails with its index on
    // the path
    let err = registry
        .make(&json!({"$$type": "Group", "members": [{"$$type": "C", "data": 1}]}))
        .unwrap_err();
    assert!(matches!(err, MakeError::TypeCheck { .. }));
    assert_eq!(err.path(), "members.0");
}

#[test]
fn unchecked_array_field_keeps_mixed_elements() {
    let mut registry = registry();
    registry.add_recipe(
        Recipe::new("Mixed").with_field(
            FieldSpec::typed("arr", TypeTag::Array(None)).skip_type_check(),
        ),
    );
    let made = registry
        .make(&json!({"$$type": "Mixed", "arr": [1, "a", null, false]}))
        .unwrap()
        .unwrap();
    assert_eq!(
        made.as_instance().unwrap().get("arr"),
        Some(&MadeValue::from(&json!([1, "a", null, false])))
    );
}

#[test]
fn per_field_maker_override_wins() {
    let mut registry = registry();
    registry.add_recipe(
        Recipe::new("Doubled").with_field(
            FieldSpec::typed("n", TypeTag::Number).with_maker(|_, config, _| {
                let n = config.as_f64().unwrap_or(0.0);
                Ok(Some(MadeValue::Number(n * 2.0)))
            }),
        ),
    );
    let made = registry
        .make(&json!({"$$type": "Doubled", "n": 21}))
        .unwrap()
        .unwrap();
    assert_eq!(
        made.as_instance().unwrap().get("n"),
        Some(&MadeValue::Number(42.0))
    );
}
