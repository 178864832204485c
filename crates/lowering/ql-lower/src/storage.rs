//! Declaration table
//!
//! Maps typed declarations to their backend counterparts. Every class,
//! constructor, function, property (with its field and accessors) and value
//! parameter gets an empty shell before any content is converted, so
//! conversion can refer to declarations that come later in source order.

use crate::error::LoweringError;
use la_arena::Idx;
use ql_ir::{
    ClassKind as IrClassKind, FunctionKind, IrClass, IrClassId, IrDeclaration, IrField,
    IrFieldId, IrFunction, IrFunctionId, IrModule, IrOrigin, IrParamId, IrParent, IrProperty,
    IrPropertyId, IrType, IrValueParameter, SyntheticKind, Visibility as IrVisibility,
};
use ql_typed::{
    AccessorKind, ClassId, ClassKind, ConstructorId, DeclOrigin, FunctionId, MemberDecl, ParamId,
    PropertyId, Type, TypedTree, Visibility,
};
use rustc_hash::FxHashMap;

pub(crate) fn raw_index<T>(id: Idx<T>) -> u32 {
    u32::from(id.into_raw())
}

#[derive(Debug, Default)]
pub struct DeclarationStorage {
    classes: FxHashMap<ClassId, IrClassId>,
    constructors: FxHashMap<ConstructorId, IrFunctionId>,
    functions: FxHashMap<FunctionId, IrFunctionId>,
    properties: FxHashMap<PropertyId, IrPropertyId>,
    parameters: FxHashMap<ParamId, IrParamId>,
    /// `$$delegate_N` fields, keyed by class and delegation index
    delegate_fields: FxHashMap<(ClassId, usize), IrFieldId>,
}

impl DeclarationStorage {
    /// Allocate shells for every declaration of `tree` into `module`
    pub fn allocate(tree: &TypedTree, module: &mut IrModule) -> Result<Self, LoweringError> {
        let mut storage = Self::default();

        for (id, class) in tree.classes.iter() {
            let ir_class = module.classes.alloc(IrClass {
                name: class.name,
                kind: lower_class_kind(class.kind),
                visibility: lower_visibility(class.visibility),
                is_data: class.is_data,
                is_value: class.is_value,
                parent: IrParent::Module,
                declarations: Vec::new(),
                type_parameters: class.type_parameters.clone(),
                supertypes: Vec::new(),
                annotations: Vec::new(),
                origin: IrOrigin::Defined,
                span: class.span,
            });
            storage.classes.insert(id, ir_class);
        }

        // Supertypes may name any class, so they are resolved once all classes exist
        for (id, class) in tree.classes.iter() {
            let ir_class = storage.class(id)?;
            let supertypes = class
                .supertypes
                .iter()
                .map(|ty| storage.lower_type(tree, ty))
                .collect::<Result<Vec<_>, _>>()?;
            let parent = match class.outer {
                Some(outer) => IrParent::Class(storage.class(outer)?),
                None => IrParent::Module,
            };
            let ir_class = &mut module.classes[ir_class];
            ir_class.supertypes = supertypes;
            ir_class.parent = parent;
        }

        storage.allocate_members(tree, module, &tree.top_level, IrParent::Module)?;
        Ok(storage)
    }

    fn allocate_members(
        &mut self,
        tree: &TypedTree,
        module: &mut IrModule,
        members: &[MemberDecl],
        parent: IrParent,
    ) -> Result<(), LoweringError> {
        for member in members {
            match *member {
                MemberDecl::Class(class) => {
                    let ir_class = self.class(class)?;
                    module.add_declaration(parent, IrDeclaration::Class(ir_class));
                    self.allocate_members(
                        tree,
                        module,
                        &tree.classes[class].declarations,
                        IrParent::Class(ir_class),
                    )?;
                }
                MemberDecl::Constructor(constructor) => {
                    let function = self.allocate_constructor(tree, module, constructor, parent)?;
                    module.add_declaration(parent, IrDeclaration::Function(function));
                }
                MemberDecl::Function(function) => {
                    let ir_function = self.allocate_function(tree, module, function, parent)?;
                    module.add_declaration(parent, IrDeclaration::Function(ir_function));
                }
                MemberDecl::Property(property) => {
                    let ir_property = self.allocate_property(tree, module, property, parent)?;
                    module.add_declaration(parent, IrDeclaration::Property(ir_property));
                }
                MemberDecl::TypeAlias(_) => {}
            }
        }
        Ok(())
    }

    fn allocate_parameters(
        &mut self,
        tree: &TypedTree,
        module: &mut IrModule,
        parameters: &[ParamId],
    ) -> Result<Vec<IrParamId>, LoweringError> {
        parameters
            .iter()
            .enumerate()
            .map(|(index, param)| {
                let typed = &tree.parameters[*param];
                let ir_param = module.parameters.alloc(IrValueParameter {
                    name: typed.name,
                    ty: self.lower_type(tree, &typed.ty)?,
                    index,
                    default_value: None,
                    is_vararg: typed.is_vararg,
                    annotations: Vec::new(),
                });
                self.parameters.insert(*param, ir_param);
                Ok(ir_param)
            })
            .collect()
    }

    fn allocate_constructor(
        &mut self,
        tree: &TypedTree,
        module: &mut IrModule,
        constructor: ConstructorId,
        parent: IrParent,
    ) -> Result<IrFunctionId, LoweringError> {
        let typed = &tree.constructors[constructor];
        let value_parameters = self.allocate_parameters(tree, module, &typed.value_parameters)?;
        let function = module.functions.alloc(IrFunction {
            name: module.interner.intern("<init>"),
            kind: FunctionKind::Constructor {
                is_primary: typed.is_primary,
            },
            visibility: lower_visibility(typed.visibility),
            origin: IrOrigin::Defined,
            parent,
            dispatch_receiver: None,
            type_parameters: typed.type_parameters.clone(),
            value_parameters,
            return_type: self.lower_type(tree, &typed.return_type)?,
            body: None,
            overridden: Vec::new(),
            annotations: Vec::new(),
            is_expect: typed.is_expect,
            property: None,
            span: typed.span,
        });
        self.constructors.insert(constructor, function);
        Ok(function)
    }

    fn allocate_function(
        &mut self,
        tree: &TypedTree,
        module: &mut IrModule,
        function: FunctionId,
        parent: IrParent,
    ) -> Result<IrFunctionId, LoweringError> {
        let typed = &tree.functions[function];
        let value_parameters = self.allocate_parameters(tree, module, &typed.value_parameters)?;
        let ir_function = module.functions.alloc(IrFunction {
            name: typed.name,
            kind: FunctionKind::Simple,
            visibility: lower_visibility(typed.visibility),
            origin: lower_origin(typed.origin),
            parent,
            dispatch_receiver: dispatch_receiver(parent),
            type_parameters: typed.type_parameters.clone(),
            value_parameters,
            return_type: self.lower_type(tree, &typed.return_type)?,
            body: None,
            overridden: Vec::new(),
            annotations: Vec::new(),
            is_expect: typed.is_expect,
            property: None,
            span: typed.span,
        });
        self.functions.insert(function, ir_function);
        Ok(ir_function)
    }

    fn allocate_property(
        &mut self,
        tree: &TypedTree,
        module: &mut IrModule,
        property: PropertyId,
        parent: IrParent,
    ) -> Result<IrPropertyId, LoweringError> {
        let typed = &tree.properties[property];
        let ty = self.lower_type(tree, &typed.ty)?;
        let ir_property = module.properties.alloc(IrProperty {
            name: typed.name,
            visibility: lower_visibility(typed.visibility),
            parent,
            is_var: typed.is_var,
            origin: IrOrigin::Defined,
            getter: None,
            setter: None,
            backing_field: None,
            annotations: Vec::new(),
            span: typed.span,
        });

        let backing_field = typed.has_backing_field.then(|| {
            module.fields.alloc(IrField {
                name: typed.name,
                ty: ty.clone(),
                parent,
                property: Some(ir_property),
                initializer: None,
                origin: IrOrigin::Defined,
                annotations: Vec::new(),
                span: typed.span,
            })
        });
        let getter = self.allocate_accessor(
            tree,
            module,
            property,
            ir_property,
            AccessorKind::Getter,
            parent,
            ty.clone(),
        )?;
        let setter = if typed.is_var {
            Some(self.allocate_accessor(
                tree,
                module,
                property,
                ir_property,
                AccessorKind::Setter,
                parent,
                ty,
            )?)
        } else {
            None
        };

        let ir = &mut module.properties[ir_property];
        ir.backing_field = backing_field;
        ir.getter = Some(getter);
        ir.setter = setter;
        self.properties.insert(property, ir_property);
        Ok(ir_property)
    }

    #[allow(
        clippy::too_many_arguments,
        reason = "both accessors come from the same property shell"
    )]
    fn allocate_accessor(
        &mut self,
        tree: &TypedTree,
        module: &mut IrModule,
        property: PropertyId,
        ir_property: IrPropertyId,
        kind: AccessorKind,
        parent: IrParent,
        property_type: IrType,
    ) -> Result<IrFunctionId, LoweringError> {
        let typed = &tree.properties[property];
        let accessor = typed.accessor(kind);
        let property_name = tree.name(typed.name);
        let (name, return_type, value_parameters) = match kind {
            AccessorKind::Getter => (format!("<get-{property_name}>"), property_type, Vec::new()),
            AccessorKind::Setter => {
                let parameters = match accessor {
                    Some(accessor) if !accessor.value_parameters.is_empty() => {
                        self.allocate_parameters(tree, module, &accessor.value_parameters)?
                    }
                    _ => vec![module.parameters.alloc(IrValueParameter {
                        name: module.interner.intern("value"),
                        ty: property_type,
                        index: 0,
                        default_value: None,
                        is_vararg: false,
                        annotations: Vec::new(),
                    })],
                };
                (format!("<set-{property_name}>"), IrType::Unit, parameters)
            }
        };
        let is_default = accessor.is_none_or(|accessor| accessor.is_default);
        Ok(module.functions.alloc(IrFunction {
            name: module.interner.intern(&name),
            kind: FunctionKind::Simple,
            visibility: lower_visibility(
                accessor.map_or(typed.visibility, |accessor| accessor.visibility),
            ),
            origin: if is_default {
                IrOrigin::DefaultAccessor
            } else {
                IrOrigin::Defined
            },
            parent,
            dispatch_receiver: dispatch_receiver(parent),
            type_parameters: Vec::new(),
            value_parameters,
            return_type,
            body: None,
            overridden: Vec::new(),
            annotations: Vec::new(),
            is_expect: false,
            property: Some(ir_property),
            span: accessor.map_or(typed.span, |accessor| accessor.span),
        }))
    }

    pub fn class(&self, class: ClassId) -> Result<IrClassId, LoweringError> {
        self.classes
            .get(&class)
            .copied()
            .ok_or(LoweringError::MissingDeclaration {
                kind: "class",
                index: raw_index(class),
            })
    }

    pub fn constructor(&self, constructor: ConstructorId) -> Result<IrFunctionId, LoweringError> {
        self.constructors
            .get(&constructor)
            .copied()
            .ok_or(LoweringError::MissingDeclaration {
                kind: "constructor",
                index: raw_index(constructor),
            })
    }

    pub fn function(&self, function: FunctionId) -> Result<IrFunctionId, LoweringError> {
        self.functions
            .get(&function)
            .copied()
            .ok_or(LoweringError::MissingDeclaration {
                kind: "function",
                index: raw_index(function),
            })
    }

    pub fn property(&self, property: PropertyId) -> Result<IrPropertyId, LoweringError> {
        self.properties
            .get(&property)
            .copied()
            .ok_or(LoweringError::MissingDeclaration {
                kind: "property",
                index: raw_index(property),
            })
    }

    pub fn parameter(&self, param: ParamId) -> Result<IrParamId, LoweringError> {
        self.parameters
            .get(&param)
            .copied()
            .ok_or(LoweringError::MissingDeclaration {
                kind: "value parameter",
                index: raw_index(param),
            })
    }

    pub fn record_delegate_field(&mut self, class: ClassId, index: usize, field: IrFieldId) {
        self.delegate_fields.insert((class, index), field);
    }

    pub fn delegate_field(&self, class: ClassId, index: usize) -> Option<IrFieldId> {
        self.delegate_fields.get(&(class, index)).copied()
    }

    /// Lower a typed type, expanding aliases
    pub fn lower_type(&self, tree: &TypedTree, ty: &Type) -> Result<IrType, LoweringError> {
        Ok(match tree.expand_type(ty) {
            Type::Int => IrType::Int,
            Type::Boolean => IrType::Boolean,
            Type::String => IrType::String,
            Type::Unit => IrType::Unit,
            Type::Nothing => IrType::Nothing,
            Type::Any { nullable } => IrType::Any { nullable },
            Type::Class {
                class,
                arguments,
                nullable,
            } => IrType::Class {
                class: self.class(class)?,
                arguments: arguments
                    .iter()
                    .map(|argument| self.lower_type(tree, argument))
                    .collect::<Result<_, _>>()?,
                nullable,
            },
            Type::TypeParameter(name) => IrType::TypeParameter(name),
            Type::Alias { .. } | Type::Error => IrType::Error,
        })
    }
}

fn dispatch_receiver(parent: IrParent) -> Option<IrClassId> {
    match parent {
        IrParent::Class(class) => Some(class),
        IrParent::Module => None,
    }
}

fn lower_visibility(visibility: Visibility) -> IrVisibility {
    match visibility {
        Visibility::Public => IrVisibility::Public,
        Visibility::Protected => IrVisibility::Protected,
        Visibility::Internal => IrVisibility::Internal,
        Visibility::Private => IrVisibility::Private,
        Visibility::Local => IrVisibility::Local,
    }
}

fn lower_class_kind(kind: ClassKind) -> IrClassKind {
    match kind {
        ClassKind::Class => IrClassKind::Class,
        ClassKind::Interface => IrClassKind::Interface,
        ClassKind::Enum => IrClassKind::Enum,
        ClassKind::Annotation => IrClassKind::Annotation,
        ClassKind::Object => IrClassKind::Object,
    }
}

fn lower_origin(origin: DeclOrigin) -> IrOrigin {
    match origin {
        DeclOrigin::Source => IrOrigin::Defined,
        DeclOrigin::DataComponent(index) => {
            IrOrigin::Synthesized(SyntheticKind::DataComponent(index))
        }
        DeclOrigin::DataCopy => IrOrigin::Synthesized(SyntheticKind::DataCopy),
        DeclOrigin::EnumValues => IrOrigin::Synthesized(SyntheticKind::EnumValues),
        DeclOrigin::EnumValueOf => IrOrigin::Synthesized(SyntheticKind::EnumValueOf),
    }
}
