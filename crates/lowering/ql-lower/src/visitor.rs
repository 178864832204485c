//! Dispatch over member declarations
//!
//! Class conversion hands every member it does not handle itself to a
//! [`DeclarationVisitor`]. Converting a nested class goes back through
//! [`LoweringContext::convert_class_content`], so the two recurse into each
//! other for arbitrarily deep nesting.

use crate::class_member::FunctionSource;
use crate::context::LoweringContext;
use crate::error::LoweringError;
use ql_typed::{ClassId, ConstructorId, FunctionId, MemberDecl, PropertyId, TypeAliasId};

pub trait DeclarationVisitor {
    type Error;

    fn visit_class(&mut self, class: ClassId) -> Result<(), Self::Error>;

    fn visit_constructor(&mut self, constructor: ConstructorId) -> Result<(), Self::Error>;

    fn visit_function(&mut self, function: FunctionId) -> Result<(), Self::Error>;

    fn visit_property(&mut self, property: PropertyId) -> Result<(), Self::Error>;

    fn visit_type_alias(&mut self, _alias: TypeAliasId) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_member(&mut self, member: MemberDecl) -> Result<(), Self::Error> {
        match member {
            MemberDecl::Class(class) => self.visit_class(class),
            MemberDecl::Constructor(constructor) => self.visit_constructor(constructor),
            MemberDecl::Function(function) => self.visit_function(function),
            MemberDecl::Property(property) => self.visit_property(property),
            MemberDecl::TypeAlias(alias) => self.visit_type_alias(alias),
        }
    }
}

impl DeclarationVisitor for LoweringContext<'_> {
    type Error = LoweringError;

    fn visit_class(&mut self, class: ClassId) -> Result<(), LoweringError> {
        let ir_class = self.storage.class(class)?;
        self.convert_class_content(ir_class, class)
    }

    fn visit_constructor(&mut self, constructor: ConstructorId) -> Result<(), LoweringError> {
        let ir_constructor = self.storage.constructor(constructor)?;
        let owner = self.storage.class(self.tree.constructors[constructor].owner)?;
        self.convert_function_content(
            ir_constructor,
            FunctionSource::Constructor(constructor),
            Some(owner),
        )
    }

    fn visit_function(&mut self, function: FunctionId) -> Result<(), LoweringError> {
        let ir_function = self.storage.function(function)?;
        let containing = self.tree.functions[function]
            .owner
            .map(|owner| self.storage.class(owner))
            .transpose()?;
        self.convert_function_content(ir_function, FunctionSource::Function(function), containing)
    }

    fn visit_property(&mut self, property: PropertyId) -> Result<(), LoweringError> {
        let ir_property = self.storage.property(property)?;
        let containing = self.tree.properties[property]
            .owner
            .map(|owner| self.storage.class(owner))
            .transpose()?;
        self.convert_property_content(ir_property, property, containing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ql_typed::{ClassKind, TreeBuilder, Type};

    #[derive(Default)]
    struct Census {
        classes: usize,
        functions: usize,
        properties: usize,
    }

    impl DeclarationVisitor for Census {
        type Error = std::convert::Infallible;

        fn visit_class(&mut self, _class: ClassId) -> Result<(), Self::Error> {
            self.classes += 1;
            Ok(())
        }

        fn visit_constructor(&mut self, _constructor: ConstructorId) -> Result<(), Self::Error> {
            Ok(())
        }

        fn visit_function(&mut self, _function: FunctionId) -> Result<(), Self::Error> {
            self.functions += 1;
            Ok(())
        }

        fn visit_property(&mut self, _property: PropertyId) -> Result<(), Self::Error> {
            self.properties += 1;
            Ok(())
        }
    }

    #[test]
    fn members_dispatch_by_kind() {
        let mut builder = TreeBuilder::new();
        let outer = builder.class("Outer", ClassKind::Class);
        builder.nested_class(outer, "Inner", ClassKind::Class);
        builder.function(Some(outer), "run", Vec::new(), Type::Unit);
        builder.property(Some(outer), "size", Type::Int);
        builder.member_type_alias(outer, "Size", Type::Int);
        let tree = builder.finish();

        let mut census = Census::default();
        for member in &tree.classes[outer].declarations {
            census.visit_member(*member).unwrap();
        }

        assert_eq!(
            (census.classes, census.functions, census.properties),
            (1, 1, 1)
        );
    }
}
