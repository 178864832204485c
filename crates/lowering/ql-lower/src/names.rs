//! Names a class already provides before fake overrides are computed
//!
//! Built as a pipeline: explicit declarations, then delegated members, then
//! each synthesis stage. Every stage takes the set by value and returns the
//! extended set, so the order of the stages is visible at the call site.

use indexmap::IndexSet;
use ql_intern::Name;
use ql_ir::{IrClassId, IrDeclaration, IrModule, IrOrigin};
use ql_typed::{ClassId, MemberDecl, TypedTree};
use rustc_hash::FxBuildHasher;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedNames {
    names: IndexSet<Name, FxBuildHasher>,
}

impl ProcessedNames {
    /// Functions and properties `class` declares explicitly
    pub fn explicit(tree: &TypedTree, class: ClassId) -> Self {
        let names = tree.classes[class]
            .declarations
            .iter()
            .filter_map(|decl| match *decl {
                MemberDecl::Function(function) => Some(tree.functions[function].name),
                MemberDecl::Property(property) => Some(tree.properties[property].name),
                _ => None,
            })
            .collect();
        Self { names }
    }

    /// Add members of `class` that forward to an interface delegate
    #[must_use]
    pub fn with_delegated(mut self, module: &IrModule, class: IrClassId) -> Self {
        for declaration in &module.classes[class].declarations {
            let origin = match *declaration {
                IrDeclaration::Function(function) => module.functions[function].origin,
                IrDeclaration::Property(property) => module.properties[property].origin,
                IrDeclaration::Class(_) | IrDeclaration::Field(_) => continue,
            };
            if origin == IrOrigin::Delegated {
                self.names.insert(module.declaration_name(*declaration));
            }
        }
        self
    }

    /// Add names produced by a synthesis stage
    #[must_use]
    pub fn with_synthesized(mut self, names: impl IntoIterator<Item = Name>) -> Self {
        self.names.extend(names);
        self
    }

    pub fn contains(&self, name: Name) -> bool {
        self.names.contains(&name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Name> + '_ {
        self.names.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ql_typed::{ClassKind, TreeBuilder, Type};

    #[test]
    fn stages_accumulate_in_order_without_duplicates() {
        let mut builder = TreeBuilder::new();
        let class = builder.class("Box", ClassKind::Class);
        builder.function(Some(class), "open", Vec::new(), Type::Unit);
        builder.property(Some(class), "size", Type::Int);
        let equals = builder.name("equals");
        let open = builder.name("open");
        let tree = builder.finish();

        let names = ProcessedNames::explicit(&tree, class).with_synthesized([equals, open]);

        let names: Vec<&str> = names.iter().map(|name| tree.name(name)).collect();
        assert_eq!(names, vec!["open", "size", "equals"]);
    }
}
