//! Class content and function body conversion

use crate::annotations::AnnotationTarget;
use crate::context::LoweringContext;
use crate::error::LoweringError;
use crate::names::ProcessedNames;
use crate::scope::ScopeOwner;
use crate::unit::member_order;
use crate::visitor::DeclarationVisitor;
use ql_ir::{
    IrBody, IrCall, IrClassId, IrExpr, IrFunctionId, IrParent, IrStatement, SyntheticKind,
};
use ql_typed::{
    AccessorKind, Annotation, AnnotationUseSite, ClassId, ClassKind, ConstructorCallee,
    ConstructorId, DelegatedConstructorCall, FunctionId, MemberDecl, ParamId,
    PropertyId, TypedTree, Visibility,
};
use tracing::{debug, trace};

/// Typed declaration a backend function is converted from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionSource {
    Constructor(ConstructorId),
    Function(FunctionId),
    Accessor {
        property: PropertyId,
        kind: AccessorKind,
    },
}

impl FunctionSource {
    pub fn value_parameters(self, tree: &TypedTree) -> &[ParamId] {
        match self {
            Self::Constructor(constructor) => &tree.constructors[constructor].value_parameters,
            Self::Function(function) => &tree.functions[function].value_parameters,
            Self::Accessor { property, kind } => tree.properties[property]
                .accessor(kind)
                .map_or(&[], |accessor| &accessor.value_parameters),
        }
    }

    pub fn annotations(self, tree: &TypedTree) -> &[Annotation] {
        match self {
            Self::Constructor(constructor) => &tree.constructors[constructor].annotations,
            Self::Function(function) => &tree.functions[function].annotations,
            Self::Accessor { property, kind } => tree.properties[property]
                .accessor(kind)
                .map_or(&[], |accessor| &accessor.annotations),
        }
    }

    pub fn is_expect(self, tree: &TypedTree) -> bool {
        match self {
            Self::Constructor(constructor) => tree.constructors[constructor].is_expect,
            Self::Function(function) => tree.functions[function].is_expect,
            Self::Accessor { .. } => false,
        }
    }
}

impl LoweringContext<'_> {
    /// Populate every member of `ir_class` from `class`
    ///
    /// The class scope and, when there is one, the primary-constructor scope
    /// stay open while the members are converted, so property initializers
    /// and parameter defaults can refer to constructor parameters.
    pub fn convert_class_content(
        &mut self,
        ir_class: IrClassId,
        class: ClassId,
    ) -> Result<(), LoweringError> {
        let tree = self.tree;
        let typed = &tree.classes[class];
        debug!(class = tree.name(typed.name), "converting class content");

        let mut guard = self.enter_scope(ScopeOwner::Class(ir_class));
        let primary = tree.primary_constructor(class);
        if let Some(primary) = primary {
            let ir_primary = guard.storage.constructor(primary)?;
            guard.enter(ScopeOwner::Function(ir_primary));
            guard.register_parameters(&tree.constructors[primary].value_parameters)?;
            guard.convert_function_content(
                ir_primary,
                FunctionSource::Constructor(primary),
                Some(ir_class),
            )?;
        }
        guard.initialize_delegate_fields(class)?;

        let mut processed =
            ProcessedNames::explicit(tree, class).with_delegated(&guard.module, ir_class);
        if typed.is_value && primary.is_some() && guard.options.synthesize_value_members {
            let names = guard.generate_value_class_members(class, ir_class, &processed)?;
            processed = processed.with_synthesized(names);
        }
        if typed.is_data && primary.is_some() && guard.options.synthesize_data_members {
            let names = guard.generate_data_class_members(class, ir_class, &processed)?;
            processed = processed.with_synthesized(names);
        }
        let fake_overrides = guard.add_fake_overrides(ir_class, &processed)?;
        trace!(fake_overrides, processed = processed.len(), "members materialized");

        for member in member_order(tree, &typed.declarations, Some(class)) {
            match member {
                MemberDecl::TypeAlias(_) => {}
                MemberDecl::Constructor(constructor) if Some(constructor) == primary => {}
                MemberDecl::Class(nested)
                    if tree.classes[nested].visibility == Visibility::Local =>
                {
                    let ir_nested = guard.storage.class(nested)?;
                    guard.module.classes[ir_nested].parent = IrParent::Class(ir_class);
                    guard.convert_class_content(ir_nested, nested)?;
                }
                other => guard.visit_member(other)?,
            }
        }

        guard.generate_annotations(AnnotationTarget::Class(ir_class), &typed.annotations)?;
        Ok(())
    }

    /// Populate parameter defaults, annotations, body and overrides of `function`
    ///
    /// A primary constructor whose scope the class already opened is
    /// converted inside that scope; every other function gets its own.
    pub fn convert_function_content(
        &mut self,
        function: IrFunctionId,
        source: FunctionSource,
        containing: Option<IrClassId>,
    ) -> Result<(), LoweringError> {
        let tree = self.tree;
        let parameters = source.value_parameters(tree);
        let already_open = self.scopes.is_open(ScopeOwner::Function(function));
        let mut guard = self.scope_guard();
        if !already_open {
            guard.enter(ScopeOwner::Function(function));
            guard.register_parameters(parameters)?;
        }

        for param in parameters {
            let ir_param = guard.storage.parameter(*param)?;
            let typed = &tree.parameters[*param];
            if let Some(default) = typed.default_value {
                let default = guard.lower_expr(default)?;
                guard.module.parameters[ir_param].default_value = Some(default);
            }
            guard
                .generate_annotations(AnnotationTarget::Parameter(ir_param), &typed.annotations)?;
            if let FunctionSource::Constructor(constructor) = source {
                if let Some(property) = constructor_property(tree, constructor, *param) {
                    guard.generate_use_site_annotations(
                        AnnotationTarget::Parameter(ir_param),
                        &tree.properties[property].annotations,
                        AnnotationUseSite::Param,
                    )?;
                }
            }
        }
        guard
            .generate_annotations(AnnotationTarget::Function(function), source.annotations(tree))?;

        let body = match source {
            FunctionSource::Constructor(constructor) => guard.constructor_body(constructor)?,
            FunctionSource::Function(typed_function) => {
                guard.function_body(function, typed_function, source.is_expect(tree))?
            }
            FunctionSource::Accessor { property, kind } => tree.properties[property]
                .accessor(kind)
                .and_then(|accessor| accessor.body.as_ref())
                .map(|body| guard.lower_block(body).map(IrBody::Block))
                .transpose()?,
        };
        guard.module.functions[function].body = body;
        drop(guard);

        if let (FunctionSource::Function(_), Some(class)) = (source, containing) {
            let overridden = self.compute_overrides(function, class);
            self.module.functions[function].overridden = overridden;
        }
        Ok(())
    }

    /// Delegated call, then the instance initializer, then the source body
    ///
    /// A constructor delegating to `this(...)` skips the initializer.
    fn constructor_body(
        &mut self,
        constructor: ConstructorId,
    ) -> Result<Option<IrBody>, LoweringError> {
        let tree = self.tree;
        let typed = &tree.constructors[constructor];
        if typed.is_expect || tree.classes[typed.owner].kind == ClassKind::Annotation {
            return Ok(None);
        }

        let mut statements = Vec::new();
        if let Some(call) = &typed.delegated_call {
            let call = self.convert_delegated_constructor_call(call)?;
            statements.push(IrStatement::Expr(call));
        }
        if !typed.delegated_call.as_ref().is_some_and(|call| call.is_this) {
            let class = self.storage.class(typed.owner)?;
            statements.push(IrStatement::Expr(IrExpr::InstanceInitializerCall { class }));
        }
        if let Some(body) = &typed.body {
            statements.extend(self.lower_block(body)?);
        }
        Ok((!statements.is_empty()).then_some(IrBody::Block(statements)))
    }

    fn function_body(
        &mut self,
        function: IrFunctionId,
        typed_function: FunctionId,
        is_expect: bool,
    ) -> Result<Option<IrBody>, LoweringError> {
        if is_expect {
            return Ok(None);
        }
        let tree = self.tree;
        let typed = &tree.functions[typed_function];
        let kind = self.module.functions[function].origin.synthetic_kind();
        if let Some(kind) = kind.filter(|kind| kind.is_enum_helper()) {
            return Ok(Some(IrBody::Synthetic(kind)));
        }
        if kind.is_some_and(SyntheticKind::is_data_accessor) && typed.body.is_none() {
            let owner = typed.owner.ok_or_else(|| LoweringError::MissingOwnerClass {
                member: self.name(typed.name).to_owned(),
            })?;
            if tree.classes[owner].is_data {
                return self.synthesize_data_member_body(function, owner);
            }
        }
        typed
            .body
            .as_ref()
            .map(|body| self.lower_block(body).map(IrBody::Block))
            .transpose()
    }

    /// Lower `this(...)`/`super(...)`; an unresolved callee becomes an error marker
    pub fn convert_delegated_constructor_call(
        &mut self,
        call: &DelegatedConstructorCall,
    ) -> Result<IrExpr, LoweringError> {
        let constructed = self.lower_type(&call.constructed_type)?;
        let ConstructorCallee::Resolved(constructor) = call.callee else {
            debug!("delegated constructor call has no resolved callee");
            return Ok(IrExpr::ErrorCall {
                description: self.options.error_call_message.clone(),
                ty: constructed,
            });
        };
        let tree = self.tree;
        let constructor = tree.deepest_overridden_constructor(constructor);
        let typed = &tree.constructors[constructor];
        let is_enum = tree.classes[typed.owner].kind == ClassKind::Enum
            || tree.is_enum_type(&typed.return_type);

        let mut ir_call = IrCall::new(
            self.storage.constructor(constructor)?,
            constructed,
            typed.type_parameters.len(),
            typed.value_parameters.len(),
        );
        self.put_type_arguments(&mut ir_call, &call.constructed_type)?;
        if let Some(receiver) = call.dispatch_receiver {
            ir_call = ir_call.with_receiver(self.lower_expr(receiver)?);
        }
        self.bind_arguments(&mut ir_call, &typed.value_parameters, &call.arguments)?;

        Ok(if is_enum {
            IrExpr::EnumConstructorCall(ir_call)
        } else {
            IrExpr::DelegatingConstructorCall(ir_call)
        })
    }
}

/// Property declared through `param` of a primary constructor
fn constructor_property(
    tree: &TypedTree,
    constructor: ConstructorId,
    param: ParamId,
) -> Option<PropertyId> {
    let typed = &tree.constructors[constructor];
    if !typed.is_primary {
        return None;
    }
    tree.classes[typed.owner]
        .declarations
        .iter()
        .find_map(|member| match *member {
            MemberDecl::Property(property)
                if tree.properties[property].from_parameter == Some(param) =>
            {
                Some(property)
            }
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LoweringOptions;
    use ql_ir::IrType;
    use ql_typed::{Argument, TreeBuilder, Type};

    fn delegated(
        callee: ConstructorCallee,
        ty: Type,
        arguments: Vec<Argument>,
    ) -> DelegatedConstructorCall {
        DelegatedConstructorCall {
            is_this: false,
            callee,
            constructed_type: ty,
            dispatch_receiver: None,
            arguments,
            span: Default::default(),
        }
    }

    #[test]
    fn unresolved_callee_becomes_an_error_marker() {
        let mut builder = TreeBuilder::new();
        builder.class("Orphan", ClassKind::Class);
        let missing = builder.name("Missing");
        let tree = builder.finish();
        let mut context = LoweringContext::new(&tree, LoweringOptions::default()).unwrap();

        let call = delegated(ConstructorCallee::Unresolved(missing), Type::Error, Vec::new());
        assert_eq!(
            context.convert_delegated_constructor_call(&call),
            Ok(IrExpr::ErrorCall {
                description: "Cannot find delegated constructor call".to_owned(),
                ty: IrType::Error,
            })
        );
    }

    #[test]
    fn substituted_constructor_resolves_to_its_root() {
        let mut builder = TreeBuilder::new();
        let base = builder.class("Base", ClassKind::Class);
        let element = builder.name("T");
        builder.class_mut(base).type_parameters.push(element);
        let root = builder.constructor(base, Vec::new());
        let substituted = builder.constructor(base, Vec::new());
        builder.constructors[substituted].original = Some(root);
        let tree = builder.finish();
        let mut context = LoweringContext::new(&tree, LoweringOptions::default()).unwrap();

        // Base<Int, String>: the second argument has no parameter to go to
        let call = delegated(
            ConstructorCallee::Resolved(substituted),
            Type::class(base, vec![Type::Int, Type::String]),
            Vec::new(),
        );
        let IrExpr::DelegatingConstructorCall(ir_call) =
            context.convert_delegated_constructor_call(&call).unwrap()
        else {
            panic!("expected a delegating constructor call");
        };
        assert_eq!(ir_call.callee, context.storage.constructor(root).unwrap());
        assert_eq!(ir_call.type_arguments, vec![Some(IrType::Int)]);
    }

    #[test]
    fn enum_supertype_selects_the_enum_shape() {
        let mut builder = TreeBuilder::new();
        let color = builder.class("Color", ClassKind::Enum);
        let rgb = builder.param("rgb", Type::Int);
        let constructor = builder.primary_constructor(color, vec![rgb]);
        let value = builder.int(0xff0000);
        let tree = builder.finish();
        let mut context = LoweringContext::new(&tree, LoweringOptions::default()).unwrap();

        let call = delegated(
            ConstructorCallee::Resolved(constructor),
            Type::class(color, Vec::new()),
            vec![Argument::positional(value)],
        );
        let IrExpr::EnumConstructorCall(ir_call) =
            context.convert_delegated_constructor_call(&call).unwrap()
        else {
            panic!("expected an enum constructor call");
        };
        assert_eq!(ir_call.arguments, vec![Some(IrExpr::int(0xff0000))]);
        let ir_color = context.storage.class(color).unwrap();
        assert_eq!(ir_call.ty, IrType::class(ir_color, Vec::new()));
    }
}
