//! Snapshot tests of lowered modules

use expect_test::expect;
use lowering_tests::lower;
use ql_typed::{ClassKind, TreeBuilder, Type};

#[test]
fn test_dump_of_a_class_with_properties() {
    let mut builder = TreeBuilder::new();
    let point = builder.class("Point", ClassKind::Class);
    let x = builder.param("x", Type::Int);
    builder.primary_constructor(point, vec![x]);
    builder.property_from_param(point, x);
    let label = builder.property(Some(point), "label", Type::String);
    builder.make_var(label);
    let origin = builder.string("origin");
    builder.properties[label].initializer = Some(origin);
    let tree = builder.finish();

    let module = lower(&tree).expect("lowering failed");

    expect![[r#"
        MODULE
          CLASS CLASS Point
            CONSTRUCTOR <init>(x: Int): Point primary
              BLOCK_BODY
                INSTANCE_INITIALIZER_CALL Point
            PROPERTY val x
              FIELD x: Int
                EXPRESSION_BODY
                  GET_VAR x: Int
              FUN <get-x>(): Int origin=DEFAULT_ACCESSOR
                BLOCK_BODY
                  RETURN from Point.<get-x>
                    GET_FIELD x: Int
                      GET_VAR <this>: Point
            PROPERTY var label
              FIELD label: String
                EXPRESSION_BODY
                  CONST String "origin"
              FUN <get-label>(): String origin=DEFAULT_ACCESSOR
                BLOCK_BODY
                  RETURN from Point.<get-label>
                    GET_FIELD label: String
                      GET_VAR <this>: Point
              FUN <set-label>(value: String): Unit origin=DEFAULT_ACCESSOR
                BLOCK_BODY
                  SET_FIELD label
                    GET_VAR <this>: Point
                    GET_VAR value: String
    "#]]
    .assert_eq(&module.dump().to_string());
}

#[test]
fn test_dump_of_a_fake_override() {
    let mut builder = TreeBuilder::new();
    let base = builder.class("Base", ClassKind::Interface);
    let name = builder.param("name", Type::String);
    builder.function(Some(base), "greet", vec![name], Type::Unit);
    let derived = builder.class("Derived", ClassKind::Class);
    builder.class_mut(derived).supertypes.push(Type::class(base, Vec::new()));
    let tree = builder.finish();

    let module = lower(&tree).expect("lowering failed");

    expect![[r#"
        MODULE
          CLASS INTERFACE Base
            FUN greet(name: String): Unit
          CLASS CLASS Derived : Base
            FUN greet(name: String): Unit origin=FAKE_OVERRIDE
              overridden: Base.greet
    "#]]
    .assert_eq(&module.dump().to_string());
}
