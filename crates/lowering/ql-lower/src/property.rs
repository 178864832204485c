//! Property conversion: backing field, accessors, annotations

use crate::annotations::AnnotationTarget;
use crate::class_member::FunctionSource;
use crate::context::LoweringContext;
use crate::error::LoweringError;
use crate::scope::ScopeOwner;
use ql_ir::{
    IrBody, IrClassId, IrExpr, IrFieldId, IrFunctionId, IrOrigin, IrPropertyId, IrStatement,
    IrValueRef,
};
use ql_typed::{AccessorKind, Annotation, AnnotationUseSite, ExprId, PropertyId};
use tracing::trace;

impl LoweringContext<'_> {
    pub fn convert_property_content(
        &mut self,
        ir_property: IrPropertyId,
        property: PropertyId,
        containing: Option<IrClassId>,
    ) -> Result<(), LoweringError> {
        let tree = self.tree;
        let typed = &tree.properties[property];
        if let Some(field) = self.module.properties[ir_property].backing_field {
            self.initialize_backing_field(
                field,
                Some(ir_property),
                typed.initializer.or(typed.delegate),
                &typed.annotations,
            )?;
        }
        self.set_accessor_content(ir_property, property, AccessorKind::Getter, containing)?;
        if typed.is_var {
            self.set_accessor_content(ir_property, property, AccessorKind::Setter, containing)?;
        }
        self.generate_annotations(AnnotationTarget::Property(ir_property), &typed.annotations)
    }

    /// Convert the initializer of `field` unless it already has one
    ///
    /// Calling this again for the same field leaves it untouched.
    pub fn initialize_backing_field(
        &mut self,
        field: IrFieldId,
        property: Option<IrPropertyId>,
        initializer: Option<ExprId>,
        annotations: &[Annotation],
    ) -> Result<(), LoweringError> {
        if self.module.fields[field].initializer.is_some() {
            trace!(
                field = self.module.name(self.module.fields[field].name),
                "backing field already initialized"
            );
            return Ok(());
        }
        if let Some(initializer) = initializer {
            let value = match property {
                Some(property) => {
                    let mut guard = self.enter_scope(ScopeOwner::Property(property));
                    guard.lower_expr(initializer)?
                }
                None => self.lower_expr(initializer)?,
            };
            self.module.fields[field].initializer = Some(value);
        }
        self.generate_use_site_annotations(
            AnnotationTarget::Field(field),
            annotations,
            AnnotationUseSite::Field,
        )
    }

    /// Convert one accessor of `property`, giving default accessors a body over the backing field
    pub fn set_accessor_content(
        &mut self,
        ir_property: IrPropertyId,
        property: PropertyId,
        kind: AccessorKind,
        containing: Option<IrClassId>,
    ) -> Result<(), LoweringError> {
        let tree = self.tree;
        let typed = &tree.properties[property];
        let data = &self.module.properties[ir_property];
        let (accessor, field) = match kind {
            AccessorKind::Getter => (data.getter, data.backing_field),
            AccessorKind::Setter => (data.setter, data.backing_field),
        };
        let Some(accessor) = accessor else {
            return Ok(());
        };

        self.convert_function_content(
            accessor,
            FunctionSource::Accessor { property, kind },
            None,
        )?;

        let function = &self.module.functions[accessor];
        if function.origin == IrOrigin::DefaultAccessor && function.body.is_none() {
            if let Some(field) = field {
                let body = self.default_accessor_body(accessor, field, kind, containing);
                self.module.functions[accessor].body = Some(body);
            }
        }

        if let Some(class) = containing {
            let overridden = self.compute_accessor_overrides(ir_property, kind, class);
            self.module.functions[accessor].overridden = overridden;
        }

        let use_site = match kind {
            AccessorKind::Getter => AnnotationUseSite::Getter,
            AccessorKind::Setter => AnnotationUseSite::Setter,
        };
        self.generate_use_site_annotations(
            AnnotationTarget::Function(accessor),
            &typed.annotations,
            use_site,
        )
    }

    /// `return field` for getters, `field = value` for setters
    fn default_accessor_body(
        &self,
        accessor: IrFunctionId,
        field: IrFieldId,
        kind: AccessorKind,
        containing: Option<IrClassId>,
    ) -> IrBody {
        let receiver = containing.map(|class| Box::new(self.this_value(class)));
        let statement = match kind {
            AccessorKind::Getter => IrExpr::Return {
                target: accessor,
                value: Box::new(IrExpr::GetField {
                    receiver,
                    field,
                    ty: self.module.fields[field].ty.clone(),
                }),
            },
            AccessorKind::Setter => {
                let value = self.module.functions[accessor]
                    .value_parameters
                    .first()
                    .map_or_else(IrExpr::unit, |param| IrExpr::GetValue {
                        value: IrValueRef::Parameter(*param),
                        ty: self.module.parameters[*param].ty.clone(),
                    });
                IrExpr::SetField {
                    receiver,
                    field,
                    value: Box::new(value),
                }
            }
        };
        IrBody::Block(vec![IrStatement::Expr(statement)])
    }
}
