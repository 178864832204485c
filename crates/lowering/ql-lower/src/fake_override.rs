//! Fake overrides for inherited members a class does not declare itself

use crate::context::LoweringContext;
use crate::error::LoweringError;
use crate::member_scope::IrMember;
use crate::names::ProcessedNames;
use ql_ir::{
    IrClassId, IrDeclaration, IrFunction, IrFunctionId, IrOrigin, IrParamId, IrParent,
    IrProperty, IrPropertyId, IrValueParameter, Visibility,
};
use tracing::trace;

impl LoweringContext<'_> {
    /// Add a body-less override for every inherited member whose name is not in `processed`
    ///
    /// Returns the number of members added.
    pub fn add_fake_overrides(
        &mut self,
        class: IrClassId,
        processed: &ProcessedNames,
    ) -> Result<usize, LoweringError> {
        if !self.options.generate_fake_overrides {
            return Ok(0);
        }
        let inherited = self.member_scope.inherited_members(&self.module, class);
        let mut added = 0;
        for (key, group) in inherited {
            if processed.contains(key.name()) {
                continue;
            }
            let group: Vec<IrMember> = group
                .into_iter()
                .filter(|member| self.member_visibility(*member) != Visibility::Private)
                .collect();
            let Some(template) = group.first().copied() else {
                continue;
            };
            trace!(member = self.module.name(key.name()), "adding fake override");
            let declaration = match template {
                IrMember::Function(template) => {
                    let overridden = group
                        .iter()
                        .filter_map(|member| match member {
                            IrMember::Function(function) => Some(*function),
                            IrMember::Property(_) => None,
                        })
                        .collect();
                    IrDeclaration::Function(self.fake_function(class, template, overridden, None))
                }
                IrMember::Property(template) => {
                    IrDeclaration::Property(self.fake_property(class, template, &group))
                }
            };
            self.module.add_declaration(IrParent::Class(class), declaration);
            added += 1;
        }
        Ok(added)
    }

    fn member_visibility(&self, member: IrMember) -> Visibility {
        match member {
            IrMember::Function(function) => self.module.functions[function].visibility,
            IrMember::Property(property) => self.module.properties[property].visibility,
        }
    }

    fn fake_function(
        &mut self,
        class: IrClassId,
        template: IrFunctionId,
        overridden: Vec<IrFunctionId>,
        property: Option<IrPropertyId>,
    ) -> IrFunctionId {
        let source = self.module.functions[template].clone();
        let value_parameters = self.copy_parameters(&source.value_parameters);
        self.module.functions.alloc(IrFunction {
            origin: IrOrigin::FakeOverride,
            parent: IrParent::Class(class),
            dispatch_receiver: Some(class),
            value_parameters,
            body: None,
            overridden,
            annotations: Vec::new(),
            is_expect: false,
            property,
            ..source
        })
    }

    fn fake_property(
        &mut self,
        class: IrClassId,
        template: IrPropertyId,
        group: &[IrMember],
    ) -> IrPropertyId {
        let source = self.module.properties[template].clone();
        let property = self.module.properties.alloc(IrProperty {
            parent: IrParent::Class(class),
            origin: IrOrigin::FakeOverride,
            getter: None,
            setter: None,
            backing_field: None,
            annotations: Vec::new(),
            ..source
        });
        let accessors = |select: fn(&IrProperty) -> Option<IrFunctionId>| -> Vec<IrFunctionId> {
            group
                .iter()
                .filter_map(|member| match member {
                    IrMember::Property(property) => select(&self.module.properties[*property]),
                    IrMember::Function(_) => None,
                })
                .collect()
        };
        let getters = accessors(|property| property.getter);
        let setters = accessors(|property| property.setter);

        let getter = source
            .getter
            .map(|getter| self.fake_function(class, getter, getters, Some(property)));
        let setter = source
            .setter
            .map(|setter| self.fake_function(class, setter, setters, Some(property)));
        let data = &mut self.module.properties[property];
        data.getter = getter;
        data.setter = setter;
        property
    }

    /// Fresh copies of `parameters`, without their default values
    pub(crate) fn copy_parameters(&mut self, parameters: &[IrParamId]) -> Vec<IrParamId> {
        parameters
            .iter()
            .map(|param| {
                let source = &self.module.parameters[*param];
                let copy = IrValueParameter {
                    default_value: None,
                    annotations: Vec::new(),
                    ..source.clone()
                };
                self.module.parameters.alloc(copy)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LoweringOptions;
    use ql_typed::{ClassKind, TreeBuilder, Type, Visibility as TypedVisibility};

    fn base_and_derived() -> (ql_typed::TypedTree, ql_typed::ClassId) {
        let mut builder = TreeBuilder::new();
        let base = builder.class("Base", ClassKind::Class);
        let width = builder.param("width", Type::Int);
        builder.function(Some(base), "resize", vec![width], Type::Unit);
        let hidden = builder.function(Some(base), "internals", Vec::new(), Type::Unit);
        builder.functions[hidden].visibility = TypedVisibility::Private;
        let label = builder.property(Some(base), "label", Type::String);
        builder.make_var(label);
        let derived = builder.class("Derived", ClassKind::Class);
        builder.class_mut(derived).supertypes.push(Type::class(base, Vec::new()));
        (builder.finish(), derived)
    }

    #[test]
    fn inherited_members_get_fake_overrides() {
        let (tree, derived) = base_and_derived();
        let mut context = LoweringContext::new(&tree, LoweringOptions::default()).unwrap();
        let ir_derived = context.storage.class(derived).unwrap();

        let added = context
            .add_fake_overrides(ir_derived, &ProcessedNames::default())
            .unwrap();

        assert_eq!(added, 2);
        let module = &context.module;
        let ir_base = module.find_class("Base").unwrap();
        let resize = module.find_function(ir_derived, "resize").unwrap();
        let resize = &module.functions[resize];
        assert_eq!(resize.origin, IrOrigin::FakeOverride);
        assert_eq!(resize.dispatch_receiver, Some(ir_derived));
        assert_eq!(resize.value_parameters.len(), 1);
        assert_eq!(
            resize.overridden,
            vec![module.find_function(ir_base, "resize").unwrap()]
        );
        assert!(module.find_function(ir_derived, "internals").is_none());

        let label = &module.properties[module.find_property(ir_derived, "label").unwrap()];
        assert!(label.backing_field.is_none());
        let setter = &module.functions[label.setter.unwrap()];
        assert_eq!(setter.origin, IrOrigin::FakeOverride);
        assert!(setter.property.is_some());
    }

    #[test]
    fn processed_names_are_skipped() {
        let (tree, derived) = base_and_derived();
        let mut context = LoweringContext::new(&tree, LoweringOptions::default()).unwrap();
        let ir_derived = context.storage.class(derived).unwrap();
        let processed = ProcessedNames::default()
            .with_synthesized([context.intern("resize"), context.intern("label")]);

        let added = context.add_fake_overrides(ir_derived, &processed).unwrap();

        assert_eq!(added, 0);
    }
}
