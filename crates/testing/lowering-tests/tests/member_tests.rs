//! Integration tests for class member lowering: synthesized, delegated and fake-override members

use lowering_tests::{body_exprs, functions_with_origin, init_tracing, lower};
use ql_ir::{IrBody, IrDeclaration, IrExpr, IrOrigin, IrParent, IrValueRef, SyntheticKind};
use ql_lower::{LoweringContext, LoweringOptions};
use ql_typed::{
    ClassId, ClassKind, DeclOrigin, FunctionId, InterfaceDelegation, TreeBuilder, Type,
    Visibility,
};

/// `data class Pair(val first: Int, val second: String)`
fn data_pair(builder: &mut TreeBuilder) -> ClassId {
    let pair = builder.class("Pair", ClassKind::Class);
    builder.class_mut(pair).is_data = true;
    let first = builder.param("first", Type::Int);
    let second = builder.param("second", Type::String);
    builder.primary_constructor(pair, vec![first, second]);
    builder.property_from_param(pair, first);
    builder.property_from_param(pair, second);
    pair
}

fn abstract_function(
    builder: &mut TreeBuilder,
    owner: ClassId,
    name: &str,
    return_type: Type,
) -> FunctionId {
    let function = builder.function(Some(owner), name, Vec::new(), return_type);
    builder.functions[function].is_abstract = true;
    function
}

#[test]
fn test_data_class_members_are_synthesized_once() {
    let mut builder = TreeBuilder::new();
    let printable = builder.class("Printable", ClassKind::Interface);
    abstract_function(&mut builder, printable, "toString", Type::String);
    let pair = data_pair(&mut builder);
    builder.class_mut(pair).supertypes.push(Type::class(printable, Vec::new()));
    let tree = builder.finish();

    let module = lower(&tree).expect("lowering failed");
    let ir_pair = module.find_class("Pair").expect("Pair missing");
    let ir_printable = module.find_class("Printable").expect("Printable missing");

    for name in ["component1", "component2", "copy", "equals", "hashCode", "toString"] {
        let functions = module.functions_named(ir_pair, name);
        assert_eq!(functions.len(), 1, "Expected exactly one {name}, found {}", functions.len());
        assert!(
            matches!(module.functions[functions[0]].origin, IrOrigin::Synthesized(_)),
            "{name} should be synthesized"
        );
        assert!(module.functions[functions[0]].body.is_some(), "{name} needs a body");
    }
    assert!(
        functions_with_origin(&module, ir_pair, IrOrigin::FakeOverride).is_empty(),
        "Synthesized members must not also appear as fake overrides"
    );

    let to_string = module.find_function(ir_pair, "toString").expect("toString missing");
    let inherited = module.find_function(ir_printable, "toString").expect("toString missing");
    assert_eq!(module.functions[to_string].overridden, vec![inherited]);
}

#[test]
fn test_checker_declared_component_gets_a_synthesized_body() {
    let mut builder = TreeBuilder::new();
    let pair = data_pair(&mut builder);
    let component = builder.function(Some(pair), "component1", Vec::new(), Type::Int);
    builder.functions[component].origin = DeclOrigin::DataComponent(1);
    let tree = builder.finish();

    let module = lower(&tree).expect("lowering failed");
    let ir_pair = module.find_class("Pair").expect("Pair missing");
    let components = module.functions_named(ir_pair, "component1");
    assert_eq!(components.len(), 1, "The declared component1 must not be generated twice");

    let body = body_exprs(&module, components[0]);
    let first_field = module
        .find_property(ir_pair, "first")
        .and_then(|property| module.properties[property].backing_field)
        .expect("first has a backing field");
    assert!(matches!(
        body[0],
        IrExpr::Return { value, .. }
            if matches!(**value, IrExpr::GetField { field, .. } if field == first_field)
    ));
}

#[test]
fn test_value_class_gets_structural_members_only() {
    let mut builder = TreeBuilder::new();
    let meters = builder.class("Meters", ClassKind::Class);
    builder.class_mut(meters).is_value = true;
    let raw = builder.param("raw", Type::Int);
    builder.primary_constructor(meters, vec![raw]);
    builder.property_from_param(meters, raw);
    let tree = builder.finish();

    let module = lower(&tree).expect("lowering failed");
    let ir_meters = module.find_class("Meters").expect("Meters missing");
    let equals = module.find_function(ir_meters, "equals").expect("equals missing");
    assert_eq!(
        module.functions[equals].origin,
        IrOrigin::Synthesized(SyntheticKind::ValueEquals)
    );
    assert!(module.find_function(ir_meters, "hashCode").is_some());
    assert!(module.find_function(ir_meters, "toString").is_some());
    assert!(module.find_function(ir_meters, "copy").is_none());
    assert!(module.find_function(ir_meters, "component1").is_none());
}

#[test]
fn test_enum_helpers_get_synthetic_bodies() {
    let mut builder = TreeBuilder::new();
    let color = builder.class("Color", ClassKind::Enum);
    builder.primary_constructor(color, Vec::new());
    let values = builder.function(Some(color), "values", Vec::new(), Type::Unit);
    builder.functions[values].origin = DeclOrigin::EnumValues;
    let name = builder.param("name", Type::String);
    let value_of = builder.function(
        Some(color),
        "valueOf",
        vec![name],
        Type::class(color, Vec::new()),
    );
    builder.functions[value_of].origin = DeclOrigin::EnumValueOf;
    let tree = builder.finish();

    let module = lower(&tree).expect("lowering failed");
    let ir_color = module.find_class("Color").expect("Color missing");
    let values = module.find_function(ir_color, "values").expect("values missing");
    let value_of = module.find_function(ir_color, "valueOf").expect("valueOf missing");
    assert_eq!(
        module.functions[values].body,
        Some(IrBody::Synthetic(SyntheticKind::EnumValues))
    );
    assert_eq!(
        module.functions[value_of].body,
        Some(IrBody::Synthetic(SyntheticKind::EnumValueOf))
    );
}

#[test]
fn test_interface_delegation_forwards_and_suppresses_fake_overrides() {
    let mut builder = TreeBuilder::new();
    let source = builder.class("Source", ClassKind::Interface);
    abstract_function(&mut builder, source, "read", Type::Int);
    abstract_function(&mut builder, source, "close", Type::Unit);
    let wrapper = builder.class("Wrapper", ClassKind::Class);
    let inner = builder.param("inner", Type::class(source, Vec::new()));
    builder.primary_constructor(wrapper, vec![inner]);
    builder.function(Some(wrapper), "close", Vec::new(), Type::Unit);
    let delegate = builder.get_param(inner);
    let wrapper_data = builder.class_mut(wrapper);
    wrapper_data.supertypes.push(Type::class(source, Vec::new()));
    wrapper_data.delegations.push(InterfaceDelegation {
        interface: source,
        delegate,
    });
    let tree = builder.finish();

    let module = lower(&tree).expect("lowering failed");
    let ir_wrapper = module.find_class("Wrapper").expect("Wrapper missing");
    let ir_source = module.find_class("Source").expect("Source missing");

    let reads = module.functions_named(ir_wrapper, "read");
    assert_eq!(reads.len(), 1, "read is forwarded once and never faked");
    assert_eq!(module.functions[reads[0]].origin, IrOrigin::Delegated);
    let source_read = module.find_function(ir_source, "read").expect("read missing");
    assert_eq!(module.functions[reads[0]].overridden, vec![source_read]);

    let closes = module.functions_named(ir_wrapper, "close");
    assert_eq!(closes.len(), 1, "An explicit member wins over the delegate");
    assert_eq!(module.functions[closes[0]].origin, IrOrigin::Defined);
    assert!(functions_with_origin(&module, ir_wrapper, IrOrigin::FakeOverride).is_empty());

    let field = module.classes[ir_wrapper]
        .declarations
        .iter()
        .find_map(|declaration| match *declaration {
            IrDeclaration::Field(field) => Some(field),
            _ => None,
        })
        .expect("delegate field missing");
    assert_eq!(module.name(module.fields[field].name), "$$delegate_0");
    let parameter = module
        .primary_constructor(ir_wrapper)
        .map(|constructor| module.functions[constructor].value_parameters[0])
        .expect("constructor missing");
    assert!(matches!(
        module.fields[field].initializer,
        Some(IrExpr::GetValue { value: IrValueRef::Parameter(read), .. }) if read == parameter
    ));
}

#[test]
fn test_inherited_members_become_fake_overrides() {
    let mut builder = TreeBuilder::new();
    let base = builder.class("Base", ClassKind::Class);
    builder.function(Some(base), "describe", Vec::new(), Type::String);
    let hidden = builder.function(Some(base), "hidden", Vec::new(), Type::Unit);
    builder.functions[hidden].visibility = Visibility::Private;
    builder.property(Some(base), "size", Type::Int);
    let derived = builder.class("Derived", ClassKind::Class);
    builder.class_mut(derived).supertypes.push(Type::class(base, Vec::new()));
    let tree = builder.finish();

    let module = lower(&tree).expect("lowering failed");
    let ir_base = module.find_class("Base").expect("Base missing");
    let ir_derived = module.find_class("Derived").expect("Derived missing");

    let fakes = functions_with_origin(&module, ir_derived, IrOrigin::FakeOverride);
    assert_eq!(fakes.len(), 1, "Only the public function is faked");
    let describe = module.find_function(ir_base, "describe").expect("describe missing");
    assert_eq!(module.functions[fakes[0]].overridden, vec![describe]);
    assert!(module.find_function(ir_derived, "hidden").is_none());

    let size = module.find_property(ir_derived, "size").expect("size is faked");
    assert_eq!(module.properties[size].origin, IrOrigin::FakeOverride);
    assert!(module.properties[size].backing_field.is_none());
}

#[test]
fn test_private_members_are_not_overridden() {
    let mut builder = TreeBuilder::new();
    let base = builder.class("Base", ClassKind::Class);
    let secret = builder.function(Some(base), "secret", Vec::new(), Type::Unit);
    builder.functions[secret].visibility = Visibility::Private;
    builder.function(Some(base), "render", Vec::new(), Type::Unit);
    let derived = builder.class("Derived", ClassKind::Class);
    builder.class_mut(derived).supertypes.push(Type::class(base, Vec::new()));
    builder.function(Some(derived), "secret", Vec::new(), Type::Unit);
    builder.function(Some(derived), "render", Vec::new(), Type::Unit);
    let tree = builder.finish();

    let module = lower(&tree).expect("lowering failed");
    let ir_base = module.find_class("Base").expect("Base missing");
    let ir_derived = module.find_class("Derived").expect("Derived missing");

    let secret = module.find_function(ir_derived, "secret").expect("secret missing");
    assert!(module.functions[secret].overridden.is_empty());
    let render = module.find_function(ir_derived, "render").expect("render missing");
    let base_render = module.find_function(ir_base, "render").expect("render missing");
    assert_eq!(module.functions[render].overridden, vec![base_render]);
}

#[test]
fn test_constructor_parameters_are_visible_in_property_initializers() {
    let mut builder = TreeBuilder::new();
    let point = builder.class("Point", ClassKind::Class);
    let x = builder.param("x", Type::Int);
    builder.primary_constructor(point, vec![x]);
    let doubled = builder.property(Some(point), "doubled", Type::Int);
    let read = builder.get_param(x);
    builder.properties[doubled].initializer = Some(read);
    let tree = builder.finish();

    let module = lower(&tree).expect("lowering failed");
    let ir_point = module.find_class("Point").expect("Point missing");
    let property = module.find_property(ir_point, "doubled").expect("doubled missing");
    let field = module.properties[property].backing_field.expect("field missing");
    let parameter = module
        .primary_constructor(ir_point)
        .map(|constructor| module.functions[constructor].value_parameters[0])
        .expect("constructor missing");
    assert!(matches!(
        module.fields[field].initializer,
        Some(IrExpr::GetValue { value: IrValueRef::Parameter(read), .. }) if read == parameter
    ));
}

const DATA_MEMBERS: [&str; 5] = ["component1", "copy", "equals", "hashCode", "toString"];

#[test]
fn test_nested_subclass_declared_before_its_data_superclass() {
    let mut builder = TreeBuilder::new();
    let outer = builder.class("Outer", ClassKind::Class);
    let derived = builder.nested_class(outer, "Derived", ClassKind::Class);
    let base = builder.nested_class(outer, "Base", ClassKind::Class);
    builder.class_mut(base).is_data = true;
    let x = builder.param("x", Type::Int);
    builder.primary_constructor(base, vec![x]);
    builder.property_from_param(base, x);
    builder.class_mut(derived).supertypes.push(Type::class(base, Vec::new()));
    let tree = builder.finish();

    let module = lower(&tree).expect("lowering failed");
    let ir_base = module.find_class("Base").expect("Base missing");
    let ir_derived = module.find_class("Derived").expect("Derived missing");

    for name in DATA_MEMBERS {
        let inherited = module.find_function(ir_base, name).expect("data member missing");
        let functions = module.functions_named(ir_derived, name);
        assert_eq!(functions.len(), 1, "Derived should inherit {name}");
        assert_eq!(module.functions[functions[0]].origin, IrOrigin::FakeOverride);
        assert_eq!(module.functions[functions[0]].overridden, vec![inherited]);
    }
}

#[test]
fn test_local_class_members_are_converted_inside_the_host() {
    let mut builder = TreeBuilder::new();
    let named = builder.class("Named", ClassKind::Interface);
    builder.function(Some(named), "describe", Vec::new(), Type::String);
    let host = builder.class("Host", ClassKind::Class);
    builder.primary_constructor(host, Vec::new());
    let entry = builder.local_class(host, "Entry");
    builder.class_mut(entry).is_data = true;
    builder.class_mut(entry).supertypes.push(Type::class(named, Vec::new()));
    let id = builder.param("id", Type::Int);
    builder.primary_constructor(entry, vec![id]);
    builder.property_from_param(entry, id);
    let tree = builder.finish();

    init_tracing();
    let mut context =
        LoweringContext::new(&tree, LoweringOptions::default()).expect("context setup failed");
    context.lower_unit().expect("lowering failed");
    assert_eq!(context.scopes.depth(), 0, "Every scope must be closed again");
    let module = context.finish();

    let ir_host = module.find_class("Host").expect("Host missing");
    let ir_entry = module.find_class("Entry").expect("Entry missing");
    assert_eq!(module.classes[ir_entry].parent, IrParent::Class(ir_host));

    let constructor = module.primary_constructor(ir_entry).expect("constructor missing");
    assert!(body_exprs(&module, constructor)[0].is_instance_initializer_call());
    let getter = module
        .find_property(ir_entry, "id")
        .and_then(|property| module.properties[property].getter)
        .expect("id getter missing");
    assert!(module.functions[getter].body.is_some());

    for name in DATA_MEMBERS {
        let function = module.find_function(ir_entry, name).expect("data member missing");
        assert!(
            matches!(module.functions[function].origin, IrOrigin::Synthesized(_)),
            "{name} should be synthesized"
        );
    }
    let describe = module.find_function(ir_entry, "describe").expect("describe missing");
    assert_eq!(module.functions[describe].origin, IrOrigin::FakeOverride);
}
