//! Programmatic construction of typed trees
//!
//! The checker normally produces typed trees; `TreeBuilder` lets tools and
//! tests assemble the same shapes directly. Declarations get the defaults a
//! checker would give a plain source declaration (public, default accessors,
//! backing field for properties) and can be adjusted afterwards through the
//! arenas, which the builder exposes through `Deref`.

use crate::decl::{
    AccessorKind, ClassKind, DeclOrigin, MemberDecl, TypedAccessor, TypedClass, TypedConstructor,
    TypedFunction, TypedProperty, TypedTypeAlias, TypedValueParameter, Visibility,
};
use crate::expr::{Constant, Expr, ValueRef};
use crate::ty::Type;
use crate::{
    ClassId, ConstructorId, ExprId, FunctionId, LocalId, LocalVariable, ParamId, PropertyId,
    TypeAliasId, TypedTree,
};
use ql_intern::{Interner, Name};
use ql_span::FileSpan;
use std::ops::{Deref, DerefMut};

#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: TypedTree,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interner(interner: Interner) -> Self {
        Self {
            tree: TypedTree::new(interner),
        }
    }

    pub fn name(&self, text: &str) -> Name {
        self.tree.interner.intern(text)
    }

    pub fn finish(self) -> TypedTree {
        self.tree
    }

    /// Add a top-level class
    pub fn class(&mut self, name: &str, kind: ClassKind) -> ClassId {
        let class = self.alloc_class(name, kind, None, Visibility::Public);
        self.tree.top_level.push(MemberDecl::Class(class));
        class
    }

    /// Add a class nested in `outer`
    pub fn nested_class(&mut self, outer: ClassId, name: &str, kind: ClassKind) -> ClassId {
        let class = self.alloc_class(name, kind, Some(outer), Visibility::Public);
        self.push_member(outer, MemberDecl::Class(class));
        class
    }

    /// Add a local class whose enclosing declaration is `outer`
    pub fn local_class(&mut self, outer: ClassId, name: &str) -> ClassId {
        let class = self.alloc_class(name, ClassKind::Class, Some(outer), Visibility::Local);
        self.push_member(outer, MemberDecl::Class(class));
        class
    }

    fn alloc_class(
        &mut self,
        name: &str,
        kind: ClassKind,
        outer: Option<ClassId>,
        visibility: Visibility,
    ) -> ClassId {
        let name = self.name(name);
        self.tree.classes.alloc(TypedClass {
            name,
            kind,
            visibility,
            is_data: false,
            is_value: false,
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            delegations: Vec::new(),
            declarations: Vec::new(),
            annotations: Vec::new(),
            outer,
            span: FileSpan::default(),
        })
    }

    pub fn class_mut(&mut self, class: ClassId) -> &mut TypedClass {
        &mut self.tree.classes[class]
    }

    fn push_member(&mut self, owner: ClassId, decl: MemberDecl) {
        self.tree.classes[owner].declarations.push(decl);
    }

    fn push_decl(&mut self, owner: Option<ClassId>, decl: MemberDecl) {
        match owner {
            Some(owner) => self.push_member(owner, decl),
            None => self.tree.top_level.push(decl),
        }
    }

    pub fn param(&mut self, name: &str, ty: Type) -> ParamId {
        let name = self.name(name);
        self.tree.parameters.alloc(TypedValueParameter {
            name,
            ty,
            default_value: None,
            is_vararg: false,
            annotations: Vec::new(),
            span: FileSpan::default(),
        })
    }

    pub fn vararg_param(&mut self, name: &str, element: Type) -> ParamId {
        let param = self.param(name, element);
        self.tree.parameters[param].is_vararg = true;
        param
    }

    pub fn primary_constructor(&mut self, class: ClassId, params: Vec<ParamId>) -> ConstructorId {
        self.alloc_constructor(class, params, true)
    }

    /// Add a secondary constructor
    pub fn constructor(&mut self, class: ClassId, params: Vec<ParamId>) -> ConstructorId {
        self.alloc_constructor(class, params, false)
    }

    fn alloc_constructor(
        &mut self,
        class: ClassId,
        params: Vec<ParamId>,
        is_primary: bool,
    ) -> ConstructorId {
        let return_type = self.tree.class_type(class);
        let type_parameters = self.tree.classes[class].type_parameters.clone();
        let ctor = self.tree.constructors.alloc(TypedConstructor {
            owner: class,
            is_primary,
            visibility: Visibility::Public,
            is_expect: false,
            type_parameters,
            value_parameters: params,
            return_type,
            delegated_call: None,
            body: None,
            annotations: Vec::new(),
            original: None,
            span: FileSpan::default(),
        });
        self.push_member(class, MemberDecl::Constructor(ctor));
        ctor
    }

    pub fn function(
        &mut self,
        owner: Option<ClassId>,
        name: &str,
        params: Vec<ParamId>,
        return_type: Type,
    ) -> FunctionId {
        let name = self.name(name);
        let function = self.tree.functions.alloc(TypedFunction {
            name,
            owner,
            visibility: Visibility::Public,
            origin: DeclOrigin::Source,
            is_expect: false,
            is_abstract: false,
            type_parameters: Vec::new(),
            value_parameters: params,
            return_type,
            body: None,
            annotations: Vec::new(),
            span: FileSpan::default(),
        });
        self.push_decl(owner, MemberDecl::Function(function));
        function
    }

    /// Add a `val` with a default getter and a backing field
    pub fn property(&mut self, owner: Option<ClassId>, name: &str, ty: Type) -> PropertyId {
        let name = self.name(name);
        let property = self.tree.properties.alloc(TypedProperty {
            name,
            owner,
            visibility: Visibility::Public,
            ty,
            is_var: false,
            initializer: None,
            delegate: None,
            has_backing_field: true,
            getter: Some(Self::default_accessor(Vec::new())),
            setter: None,
            from_parameter: None,
            annotations: Vec::new(),
            span: FileSpan::default(),
        });
        self.push_decl(owner, MemberDecl::Property(property));
        property
    }

    /// Turn a `val` into a `var` with a default setter
    pub fn make_var(&mut self, property: PropertyId) {
        let ty = self.tree.properties[property].ty.clone();
        let value = self.param("value", ty);
        let property = &mut self.tree.properties[property];
        property.is_var = true;
        property.setter = Some(Self::default_accessor(vec![value]));
    }

    /// Declare a property through a primary-constructor parameter (`class C(val p: T)`)
    pub fn property_from_param(&mut self, class: ClassId, param: ParamId) -> PropertyId {
        let name = self.tree.interner.resolve(self.tree.parameters[param].name).to_owned();
        let ty = self.tree.parameters[param].ty.clone();
        let property = self.property(Some(class), &name, ty);
        let initializer = self.expr(Expr::GetValue(ValueRef::Parameter(param)));
        let property_data = &mut self.tree.properties[property];
        property_data.initializer = Some(initializer);
        property_data.from_parameter = Some(param);
        property
    }

    /// Replace the accessor of `property` by an explicit one with `body`
    pub fn explicit_accessor(
        &mut self,
        property: PropertyId,
        kind: AccessorKind,
        accessor: TypedAccessor,
    ) {
        let property = &mut self.tree.properties[property];
        match kind {
            AccessorKind::Getter => property.getter = Some(accessor),
            AccessorKind::Setter => property.setter = Some(accessor),
        }
    }

    pub fn default_accessor(value_parameters: Vec<ParamId>) -> TypedAccessor {
        TypedAccessor {
            is_default: true,
            visibility: Visibility::Public,
            value_parameters,
            body: None,
            annotations: Vec::new(),
            span: FileSpan::default(),
        }
    }

    pub fn type_alias(
        &mut self,
        name: &str,
        type_parameters: Vec<Name>,
        target: Type,
    ) -> TypeAliasId {
        let name = self.name(name);
        let alias = self.tree.type_aliases.alloc(TypedTypeAlias {
            name,
            type_parameters,
            target,
            span: FileSpan::default(),
        });
        self.tree.top_level.push(MemberDecl::TypeAlias(alias));
        alias
    }

    /// Add a type alias declared inside `owner`
    pub fn member_type_alias(&mut self, owner: ClassId, name: &str, target: Type) -> TypeAliasId {
        let name = self.name(name);
        let alias = self.tree.type_aliases.alloc(TypedTypeAlias {
            name,
            type_parameters: Vec::new(),
            target,
            span: FileSpan::default(),
        });
        self.push_member(owner, MemberDecl::TypeAlias(alias));
        alias
    }

    pub fn local(&mut self, name: &str, ty: Type) -> LocalId {
        let name = self.name(name);
        self.tree.locals.alloc(LocalVariable {
            name,
            ty,
            is_var: false,
        })
    }

    pub fn expr(&mut self, expr: Expr) -> ExprId {
        self.tree.exprs.alloc(expr)
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        self.expr(Expr::Const {
            value: Constant::Int(value),
            ty: Type::Int,
        })
    }

    pub fn string(&mut self, value: &str) -> ExprId {
        self.expr(Expr::Const {
            value: Constant::String(value.to_owned()),
            ty: Type::String,
        })
    }

    pub fn get_param(&mut self, param: ParamId) -> ExprId {
        self.expr(Expr::GetValue(ValueRef::Parameter(param)))
    }
}

impl Deref for TreeBuilder {
    type Target = TypedTree;

    fn deref(&self) -> &TypedTree {
        &self.tree
    }
}

impl DerefMut for TreeBuilder {
    fn deref_mut(&mut self) -> &mut TypedTree {
        &mut self.tree
    }
}
