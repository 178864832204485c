//! Synthesized members of data and value classes
//!
//! All structural members are derived from the properties declared through
//! the primary constructor, in parameter order.

use crate::context::LoweringContext;
use crate::error::LoweringError;
use crate::names::ProcessedNames;
use crate::storage::raw_index;
use ql_intern::Name;
use ql_ir::{
    FunctionKind, Intrinsic, IrBinaryOp, IrBody, IrCall, IrClassId, IrDeclaration, IrExpr,
    IrFieldId, IrFunction, IrFunctionId, IrOrigin, IrParamId, IrParent, IrPropertyId,
    IrStatement, IrType, IrValueParameter, IrValueRef, IrVariable, SyntheticKind, TypeOperator,
    Visibility,
};
use ql_span::FileSpan;
use ql_typed::ClassId;
use tracing::debug;

/// Backing field of a primary-constructor property
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryField {
    pub property: IrPropertyId,
    pub field: IrFieldId,
    pub name: Name,
    pub ty: IrType,
}

/// Member kinds of one flavour of structural class
struct StructuralKinds {
    equals: SyntheticKind,
    hash_code: SyntheticKind,
    to_string: SyntheticKind,
}

const DATA_KINDS: StructuralKinds = StructuralKinds {
    equals: SyntheticKind::DataEquals,
    hash_code: SyntheticKind::DataHashCode,
    to_string: SyntheticKind::DataToString,
};

const VALUE_KINDS: StructuralKinds = StructuralKinds {
    equals: SyntheticKind::ValueEquals,
    hash_code: SyntheticKind::ValueHashCode,
    to_string: SyntheticKind::ValueToString,
};

fn block(statements: Vec<IrExpr>) -> IrBody {
    IrBody::Block(statements.into_iter().map(IrStatement::Expr).collect())
}

fn if_then(condition: IrExpr, then_branch: IrExpr) -> IrExpr {
    IrExpr::If {
        condition: Box::new(condition),
        then_branch: Box::new(then_branch),
        else_branch: None,
        ty: IrType::Unit,
    }
}

impl LoweringContext<'_> {
    pub fn primary_fields(&self, class: ClassId) -> Result<Vec<PrimaryField>, LoweringError> {
        self.tree
            .primary_properties(class)
            .into_iter()
            .map(|property| {
                let ir_property = self.storage.property(property)?;
                let data = &self.module.properties[ir_property];
                let field = data.backing_field.ok_or(LoweringError::MissingDeclaration {
                    kind: "backing field",
                    index: raw_index(property),
                })?;
                Ok(PrimaryField {
                    property: ir_property,
                    field,
                    name: data.name,
                    ty: self.module.fields[field].ty.clone(),
                })
            })
            .collect()
    }

    /// Add `componentN`, `copy`, `equals`, `hashCode` and `toString` to a data class
    ///
    /// Members whose name is already in `processed` are left to the class.
    /// Returns the names of the members added.
    pub fn generate_data_class_members(
        &mut self,
        class: ClassId,
        ir_class: IrClassId,
        processed: &ProcessedNames,
    ) -> Result<Vec<Name>, LoweringError> {
        let fields = self.primary_fields(class)?;
        let mut generated = Vec::new();

        for (index, field) in (1u32..).zip(&fields) {
            let name = self.intern(&format!("component{index}"));
            if processed.contains(name) {
                continue;
            }
            let function = self.synthesized_function(
                ir_class,
                name,
                SyntheticKind::DataComponent(index),
                Vec::new(),
                field.ty.clone(),
            );
            let body = self.component_body(function, ir_class, field);
            self.module.functions[function].body = Some(body);
            generated.push(name);
        }

        let copy = self.intern("copy");
        if !processed.contains(copy) {
            let parameters = fields
                .iter()
                .enumerate()
                .map(|(index, field)| self.synthetic_parameter(field.name, field.ty.clone(), index))
                .collect();
            let this_type = self.module.this_type(ir_class);
            let function = self.synthesized_function(
                ir_class,
                copy,
                SyntheticKind::DataCopy,
                parameters,
                this_type,
            );
            let body = self.copy_body(function, ir_class, &fields)?;
            self.module.functions[function].body = Some(body);
            generated.push(copy);
        }

        generated.extend(self.generate_structural_members(
            ir_class,
            &fields,
            processed,
            &DATA_KINDS,
        ));
        debug!(
            class = self.name(self.tree.classes[class].name),
            count = generated.len(),
            "synthesized data class members"
        );
        Ok(generated)
    }

    /// Add `equals`, `hashCode` and `toString` to a value class
    pub fn generate_value_class_members(
        &mut self,
        class: ClassId,
        ir_class: IrClassId,
        processed: &ProcessedNames,
    ) -> Result<Vec<Name>, LoweringError> {
        let fields = self.primary_fields(class)?;
        Ok(self.generate_structural_members(ir_class, &fields, processed, &VALUE_KINDS))
    }

    /// Body of a `componentN` or `copy` the checker declared without one
    pub fn synthesize_data_member_body(
        &mut self,
        function: IrFunctionId,
        class: ClassId,
    ) -> Result<Option<IrBody>, LoweringError> {
        let ir_class = self.storage.class(class)?;
        let fields = self.primary_fields(class)?;
        match self.module.functions[function].origin.synthetic_kind() {
            Some(SyntheticKind::DataComponent(index)) => {
                let field = usize::try_from(index)
                    .ok()
                    .and_then(|index| index.checked_sub(1))
                    .and_then(|index| fields.get(index));
                Ok(field.map(|field| self.component_body(function, ir_class, field)))
            }
            Some(SyntheticKind::DataCopy) => self.copy_body(function, ir_class, &fields).map(Some),
            _ => Ok(None),
        }
    }

    fn generate_structural_members(
        &mut self,
        ir_class: IrClassId,
        fields: &[PrimaryField],
        processed: &ProcessedNames,
        kinds: &StructuralKinds,
    ) -> Vec<Name> {
        let mut generated = Vec::new();

        let equals = self.intern("equals");
        if !processed.contains(equals) {
            let other_name = self.intern("other");
            let other = self.synthetic_parameter(other_name, IrType::nullable_any(), 0);
            let function = self.synthesized_function(
                ir_class,
                equals,
                kinds.equals,
                vec![other],
                IrType::Boolean,
            );
            let body = self.equals_body(function, ir_class, other, fields);
            self.module.functions[function].body = Some(body);
            generated.push(equals);
        }

        let hash_code = self.intern("hashCode");
        if !processed.contains(hash_code) {
            let function = self.synthesized_function(
                ir_class,
                hash_code,
                kinds.hash_code,
                Vec::new(),
                IrType::Int,
            );
            let body = self.hash_code_body(function, ir_class, fields);
            self.module.functions[function].body = Some(body);
            generated.push(hash_code);
        }

        let to_string = self.intern("toString");
        if !processed.contains(to_string) {
            let function = self.synthesized_function(
                ir_class,
                to_string,
                kinds.to_string,
                Vec::new(),
                IrType::String,
            );
            let body = self.to_string_body(function, ir_class, fields);
            self.module.functions[function].body = Some(body);
            generated.push(to_string);
        }

        generated
    }

    fn synthesized_function(
        &mut self,
        ir_class: IrClassId,
        name: Name,
        kind: SyntheticKind,
        value_parameters: Vec<IrParamId>,
        return_type: IrType,
    ) -> IrFunctionId {
        let function = self.module.functions.alloc(IrFunction {
            name,
            kind: FunctionKind::Simple,
            visibility: Visibility::Public,
            origin: IrOrigin::Synthesized(kind),
            parent: IrParent::Class(ir_class),
            dispatch_receiver: Some(ir_class),
            type_parameters: Vec::new(),
            value_parameters,
            return_type,
            body: None,
            overridden: Vec::new(),
            annotations: Vec::new(),
            is_expect: false,
            property: None,
            span: FileSpan::SYNTHETIC,
        });
        self.module
            .add_declaration(IrParent::Class(ir_class), IrDeclaration::Function(function));
        let overridden = self.compute_overrides(function, ir_class);
        self.module.functions[function].overridden = overridden;
        function
    }

    fn synthetic_parameter(&mut self, name: Name, ty: IrType, index: usize) -> IrParamId {
        self.module.parameters.alloc(IrValueParameter {
            name,
            ty,
            index,
            default_value: None,
            is_vararg: false,
            annotations: Vec::new(),
        })
    }

    fn this_field(&self, ir_class: IrClassId, field: &PrimaryField) -> IrExpr {
        IrExpr::GetField {
            receiver: Some(Box::new(self.this_value(ir_class))),
            field: field.field,
            ty: field.ty.clone(),
        }
    }

    fn parameter_value(&self, param: IrParamId) -> IrExpr {
        IrExpr::GetValue {
            value: IrValueRef::Parameter(param),
            ty: self.module.parameters[param].ty.clone(),
        }
    }

    fn component_body(
        &self,
        function: IrFunctionId,
        ir_class: IrClassId,
        field: &PrimaryField,
    ) -> IrBody {
        block(vec![IrExpr::Return {
            target: function,
            value: Box::new(self.this_field(ir_class, field)),
        }])
    }

    /// `return C(p1, p2, ...)`, with each parameter defaulting to the current field value
    fn copy_body(
        &mut self,
        function: IrFunctionId,
        ir_class: IrClassId,
        fields: &[PrimaryField],
    ) -> Result<IrBody, LoweringError> {
        let primary = self.module.primary_constructor(ir_class).ok_or_else(|| {
            LoweringError::MissingDeclaration {
                kind: "primary constructor",
                index: raw_index(ir_class),
            }
        })?;
        let parameters = self.module.functions[function].value_parameters.clone();
        for (param, field) in parameters.iter().zip(fields) {
            if self.module.parameters[*param].default_value.is_none() {
                let default = self.this_field(ir_class, field);
                self.module.parameters[*param].default_value = Some(default);
            }
        }

        let this_type = self.module.this_type(ir_class);
        let constructor = &self.module.functions[primary];
        let mut call = IrCall::new(
            primary,
            this_type,
            constructor.type_parameters.len(),
            constructor.value_parameters.len(),
        );
        let type_parameters = self.module.classes[ir_class].type_parameters.clone();
        for (index, param) in type_parameters.into_iter().enumerate() {
            call.put_type_argument(index, IrType::TypeParameter(param));
        }
        for (index, param) in parameters.iter().enumerate() {
            call.put_value_argument(index, self.parameter_value(*param));
        }
        Ok(block(vec![IrExpr::Return {
            target: function,
            value: Box::new(IrExpr::ConstructorCall(call)),
        }]))
    }

    fn equals_body(
        &mut self,
        function: IrFunctionId,
        ir_class: IrClassId,
        other: IrParamId,
        fields: &[PrimaryField],
    ) -> IrBody {
        let this_type = self.module.this_type(ir_class);
        let returning = |value: bool| IrExpr::Return {
            target: function,
            value: Box::new(IrExpr::boolean(value)),
        };
        let other_value = self.parameter_value(other);

        let mut statements = vec![
            IrStatement::Expr(if_then(
                IrExpr::Binary {
                    op: IrBinaryOp::Identity,
                    lhs: Box::new(self.this_value(ir_class)),
                    rhs: Box::new(other_value.clone()),
                    ty: IrType::Boolean,
                },
                returning(true),
            )),
            IrStatement::Expr(if_then(
                IrExpr::TypeOperator {
                    op: TypeOperator::NotInstanceOf,
                    operand: Box::new(other_value.clone()),
                    type_operand: this_type.clone(),
                },
                returning(false),
            )),
        ];

        if !fields.is_empty() {
            let name = self.intern("tmp");
            let variable = self.module.variables.alloc(IrVariable {
                name,
                ty: this_type.clone(),
                is_var: false,
            });
            statements.push(IrStatement::Variable {
                variable,
                initializer: Some(IrExpr::TypeOperator {
                    op: TypeOperator::Cast,
                    operand: Box::new(other_value),
                    type_operand: this_type.clone(),
                }),
            });
            for field in fields {
                let theirs = IrExpr::GetField {
                    receiver: Some(Box::new(IrExpr::GetValue {
                        value: IrValueRef::Variable(variable),
                        ty: this_type.clone(),
                    })),
                    field: field.field,
                    ty: field.ty.clone(),
                };
                statements.push(IrStatement::Expr(if_then(
                    IrExpr::Binary {
                        op: IrBinaryOp::NotEq,
                        lhs: Box::new(self.this_field(ir_class, field)),
                        rhs: Box::new(theirs),
                        ty: IrType::Boolean,
                    },
                    returning(false),
                )));
            }
        }

        statements.push(IrStatement::Expr(returning(true)));
        IrBody::Block(statements)
    }

    /// `((h(f1) * m + h(f2)) * m + ...)`, or `0` for a class without fields
    fn hash_code_body(
        &self,
        function: IrFunctionId,
        ir_class: IrClassId,
        fields: &[PrimaryField],
    ) -> IrBody {
        let multiplier = self.options.data_hash_multiplier;
        let hash = |field: &PrimaryField| IrExpr::Intrinsic {
            kind: Intrinsic::HashCode,
            argument: Box::new(self.this_field(ir_class, field)),
        };
        let folded = fields
            .split_first()
            .map(|(first, rest)| {
                rest.iter().fold(hash(first), |accumulator, field| IrExpr::Binary {
                    op: IrBinaryOp::Add,
                    lhs: Box::new(IrExpr::Binary {
                        op: IrBinaryOp::Mul,
                        lhs: Box::new(accumulator),
                        rhs: Box::new(IrExpr::int(multiplier)),
                        ty: IrType::Int,
                    }),
                    rhs: Box::new(hash(field)),
                    ty: IrType::Int,
                })
            })
            .unwrap_or_else(|| IrExpr::int(0));
        block(vec![IrExpr::Return {
            target: function,
            value: Box::new(folded),
        }])
    }

    /// `"C(a=" + a + ", b=" + b + ")"`
    fn to_string_body(
        &self,
        function: IrFunctionId,
        ir_class: IrClassId,
        fields: &[PrimaryField],
    ) -> IrBody {
        let class_name = self.module.name(self.module.classes[ir_class].name);
        let mut parts = Vec::with_capacity(fields.len() * 2 + 1);
        let mut prefix = format!("{class_name}(");
        for (index, field) in fields.iter().enumerate() {
            if index > 0 {
                prefix.push_str(", ");
            }
            prefix.push_str(self.module.name(field.name));
            prefix.push('=');
            parts.push(IrExpr::string(std::mem::take(&mut prefix)));
            parts.push(self.this_field(ir_class, field));
        }
        prefix.push(')');
        parts.push(IrExpr::string(prefix));
        block(vec![IrExpr::Return {
            target: function,
            value: Box::new(IrExpr::StringConcat(parts)),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LoweringOptions;
    use ql_typed::{ClassKind, TreeBuilder, Type, TypedTree};

    fn pair() -> (TypedTree, ClassId) {
        let mut builder = TreeBuilder::new();
        let pair = builder.class("Pair", ClassKind::Class);
        builder.class_mut(pair).is_data = true;
        let a = builder.param("a", Type::Int);
        let b = builder.param("b", Type::Int);
        builder.primary_constructor(pair, vec![a, b]);
        builder.property_from_param(pair, a);
        builder.property_from_param(pair, b);
        (builder.finish(), pair)
    }

    fn names(context: &LoweringContext<'_>, names: &[Name]) -> Vec<String> {
        names
            .iter()
            .map(|name| context.module.name(*name).to_owned())
            .collect()
    }

    #[test]
    fn data_class_gets_every_structural_member() {
        let (tree, pair) = pair();
        let mut context = LoweringContext::new(&tree, LoweringOptions::default()).unwrap();
        let ir_pair = context.storage.class(pair).unwrap();

        let generated = context
            .generate_data_class_members(pair, ir_pair, &ProcessedNames::default())
            .unwrap();

        assert_eq!(
            names(&context, &generated),
            ["component1", "component2", "copy", "equals", "hashCode", "toString"]
        );
        let copy = context.module.find_function(ir_pair, "copy").unwrap();
        let copy = &context.module.functions[copy];
        assert_eq!(copy.return_type, context.module.this_type(ir_pair));
        assert!(
            copy.value_parameters
                .iter()
                .all(|param| context.module.parameters[*param].default_value.is_some())
        );
    }

    #[test]
    fn explicit_members_are_not_regenerated() {
        let (tree, pair) = pair();
        let mut context = LoweringContext::new(&tree, LoweringOptions::default()).unwrap();
        let ir_pair = context.storage.class(pair).unwrap();
        let processed = ProcessedNames::default()
            .with_synthesized([context.intern("toString"), context.intern("component2")]);

        let generated = context
            .generate_data_class_members(pair, ir_pair, &processed)
            .unwrap();

        assert_eq!(
            names(&context, &generated),
            ["component1", "copy", "equals", "hashCode"]
        );
    }

    #[test]
    fn hash_code_of_fieldless_class_is_zero() {
        let mut builder = TreeBuilder::new();
        let unit = builder.class("Empty", ClassKind::Class);
        builder.class_mut(unit).is_data = true;
        builder.primary_constructor(unit, Vec::new());
        let tree = builder.finish();
        let mut context = LoweringContext::new(&tree, LoweringOptions::default()).unwrap();
        let ir_unit = context.storage.class(unit).unwrap();

        context
            .generate_data_class_members(unit, ir_unit, &ProcessedNames::default())
            .unwrap();

        let hash_code = context.module.find_function(ir_unit, "hashCode").unwrap();
        let body = context.module.functions[hash_code].body.as_ref().unwrap();
        assert_eq!(
            body.statements()[0].as_expr(),
            Some(&IrExpr::Return {
                target: hash_code,
                value: Box::new(IrExpr::int(0)),
            })
        );
    }
}
