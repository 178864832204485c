//! Interface delegation (`class C(d: I) : I by d`)
//!
//! Each delegation gets a `$$delegate_N` field holding the delegate, and every
//! interface member the class does not declare itself gets a forwarding
//! member that calls through the field. Forwarders are generated for all
//! classes before any class content is converted, so the fake-override pass
//! already sees them.

use crate::context::LoweringContext;
use crate::error::LoweringError;
use crate::member_scope::{IrMember, declared_members};
use crate::names::ProcessedNames;
use crate::storage::raw_index;
use ql_ir::{
    IrBody, IrCall, IrClassId, IrDeclaration, IrExpr, IrField, IrFunction, IrFunctionId,
    IrOrigin, IrParent, IrProperty, IrPropertyId, IrStatement, IrType, IrValueRef,
    SyntheticKind, Visibility,
};
use ql_span::FileSpan;
use ql_typed::ClassId;
use tracing::debug;

impl LoweringContext<'_> {
    /// Create delegate fields and forwarding members for every delegation of `class`
    pub fn generate_delegated_members(&mut self, class: ClassId) -> Result<(), LoweringError> {
        let tree = self.tree;
        let typed = &tree.classes[class];
        if typed.delegations.is_empty() {
            return Ok(());
        }
        let ir_class = self.storage.class(class)?;
        let explicit = ProcessedNames::explicit(tree, class);

        for (index, delegation) in typed.delegations.iter().enumerate() {
            let interface = self.storage.class(delegation.interface)?;
            let field_type = self.module.classes[ir_class]
                .supertypes
                .iter()
                .find(|supertype| supertype.class_id() == Some(interface))
                .cloned()
                .unwrap_or_else(|| self.module.this_type(interface));
            let name = self.intern(&format!("$$delegate_{index}"));
            let field = self.module.fields.alloc(IrField {
                name,
                ty: field_type.clone(),
                parent: IrParent::Class(ir_class),
                property: None,
                initializer: None,
                origin: IrOrigin::Synthesized(SyntheticKind::DelegateField),
                annotations: Vec::new(),
                span: FileSpan::SYNTHETIC,
            });
            self.module
                .add_declaration(IrParent::Class(ir_class), IrDeclaration::Field(field));
            self.storage.record_delegate_field(class, index, field);

            let delegate = IrExpr::GetField {
                receiver: Some(Box::new(self.this_value(ir_class))),
                field,
                ty: field_type,
            };
            let members = self.member_scope.visible_members(&self.module, interface);
            for (key, member) in members {
                if explicit.contains(key.name())
                    || declared_members(&self.module, ir_class).contains_key(&key)
                {
                    continue;
                }
                let declaration = match member {
                    IrMember::Function(target) => {
                        if self.module.functions[target].visibility == Visibility::Private {
                            continue;
                        }
                        IrDeclaration::Function(self.forwarding_function(
                            ir_class,
                            target,
                            &delegate,
                            None,
                        ))
                    }
                    IrMember::Property(target) => {
                        if self.module.properties[target].visibility == Visibility::Private {
                            continue;
                        }
                        IrDeclaration::Property(
                            self.forwarding_property(ir_class, target, &delegate),
                        )
                    }
                };
                self.module.add_declaration(IrParent::Class(ir_class), declaration);
            }
            debug!(
                class = self.name(typed.name),
                interface = self.module.name(self.module.classes[interface].name),
                "generated delegated members"
            );
        }
        Ok(())
    }

    /// Store the converted delegate expressions into the `$$delegate_N` fields
    ///
    /// Runs inside the class and primary-constructor scopes, so delegates may
    /// refer to constructor parameters.
    pub fn initialize_delegate_fields(&mut self, class: ClassId) -> Result<(), LoweringError> {
        let tree = self.tree;
        for (index, delegation) in tree.classes[class].delegations.iter().enumerate() {
            let field = self.storage.delegate_field(class, index).ok_or(
                LoweringError::MissingDeclaration {
                    kind: "delegate field",
                    index: raw_index(class),
                },
            )?;
            let value = self.lower_expr(delegation.delegate)?;
            self.module.fields[field].initializer = Some(value);
        }
        Ok(())
    }

    fn forwarding_function(
        &mut self,
        ir_class: IrClassId,
        target: IrFunctionId,
        delegate: &IrExpr,
        property: Option<IrPropertyId>,
    ) -> IrFunctionId {
        let source = self.module.functions[target].clone();
        let value_parameters = self.copy_parameters(&source.value_parameters);
        let function = self.module.functions.alloc(IrFunction {
            origin: IrOrigin::Delegated,
            parent: IrParent::Class(ir_class),
            dispatch_receiver: Some(ir_class),
            value_parameters: value_parameters.clone(),
            body: None,
            overridden: vec![target],
            annotations: Vec::new(),
            is_expect: false,
            property,
            span: FileSpan::SYNTHETIC,
            ..source.clone()
        });

        let mut call = IrCall::new(
            target,
            source.return_type.clone(),
            source.type_parameters.len(),
            value_parameters.len(),
        );
        for (index, param) in source.type_parameters.iter().enumerate() {
            call.put_type_argument(index, IrType::TypeParameter(*param));
        }
        for (index, param) in value_parameters.iter().enumerate() {
            call.put_value_argument(
                index,
                IrExpr::GetValue {
                    value: IrValueRef::Parameter(*param),
                    ty: self.module.parameters[*param].ty.clone(),
                },
            );
        }
        let forwarded = IrExpr::Call(call.with_receiver(delegate.clone()));
        self.module.functions[function].body = Some(IrBody::Block(vec![IrStatement::Expr(
            IrExpr::Return {
                target: function,
                value: Box::new(forwarded),
            },
        )]));
        function
    }

    fn forwarding_property(
        &mut self,
        ir_class: IrClassId,
        target: IrPropertyId,
        delegate: &IrExpr,
    ) -> IrPropertyId {
        let source = self.module.properties[target].clone();
        let property = self.module.properties.alloc(IrProperty {
            parent: IrParent::Class(ir_class),
            origin: IrOrigin::Delegated,
            getter: None,
            setter: None,
            backing_field: None,
            annotations: Vec::new(),
            span: FileSpan::SYNTHETIC,
            ..source
        });
        let getter = source.getter.map(|getter| {
            self.forwarding_function(ir_class, getter, delegate, Some(property))
        });
        let setter = source.setter.map(|setter| {
            self.forwarding_function(ir_class, setter, delegate, Some(property))
        });
        let data = &mut self.module.properties[property];
        data.getter = getter;
        data.setter = setter;
        property
    }
}
