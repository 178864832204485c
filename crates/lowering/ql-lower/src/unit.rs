//! Lowering of a whole compilation unit

use crate::context::LoweringContext;
use crate::error::LoweringError;
use crate::visitor::DeclarationVisitor;
use ql_typed::{ClassId, MemberDecl, TypedTree};
use rustc_hash::FxHashSet;
use tracing::debug;

/// Top-level declarations in source order, except that a class comes after
/// every top-level class its own hierarchy (nested classes included) extends
pub fn supertype_first_order(tree: &TypedTree) -> Vec<MemberDecl> {
    member_order(tree, &tree.top_level, None)
}

/// `members` of `container` in source order, except that a class comes after
/// every sibling class its own hierarchy extends
///
/// Supertypes declared outside `container` do not affect the order.
pub fn member_order(
    tree: &TypedTree,
    members: &[MemberDecl],
    container: Option<ClassId>,
) -> Vec<MemberDecl> {
    let mut order = Vec::with_capacity(members.len());
    let mut visited = FxHashSet::default();
    for member in members {
        match *member {
            MemberDecl::Class(class) => {
                visit_class(tree, class, container, &mut visited, &mut order);
            }
            other => order.push(other),
        }
    }
    order
}

fn visit_class(
    tree: &TypedTree,
    class: ClassId,
    container: Option<ClassId>,
    visited: &mut FxHashSet<ClassId>,
    order: &mut Vec<MemberDecl>,
) {
    if !visited.insert(class) {
        return;
    }
    for supertype in hierarchy_supertypes(tree, class) {
        if let Some(sibling) = sibling_root(tree, supertype, container) {
            visit_class(tree, sibling, container, visited, order);
        }
    }
    order.push(MemberDecl::Class(class));
}

/// Classes named as supertypes by `class` or any class nested in it
fn hierarchy_supertypes(tree: &TypedTree, class: ClassId) -> Vec<ClassId> {
    let mut supertypes = Vec::new();
    let mut pending = vec![class];
    while let Some(current) = pending.pop() {
        let data = &tree.classes[current];
        supertypes.extend(
            data.supertypes
                .iter()
                .filter_map(|ty| tree.expand_type(ty).class_id()),
        );
        pending.extend(data.declarations.iter().filter_map(|member| match *member {
            MemberDecl::Class(nested) => Some(nested),
            _ => None,
        }));
    }
    supertypes
}

/// The class declared directly in `container` that encloses `class`
fn sibling_root(tree: &TypedTree, class: ClassId, container: Option<ClassId>) -> Option<ClassId> {
    let mut current = class;
    loop {
        let outer = tree.classes[current].outer;
        if outer == container {
            return Some(current);
        }
        current = outer?;
    }
}

impl LoweringContext<'_> {
    /// Convert every declaration of the tree into the module
    ///
    /// Delegated members are generated for all classes first, then top-level
    /// declarations are converted with supertypes ahead of their subclasses.
    pub fn lower_unit(&mut self) -> Result<(), LoweringError> {
        let tree = self.tree;
        for (class, _) in tree.classes.iter() {
            self.generate_delegated_members(class)?;
        }
        let order = supertype_first_order(tree);
        debug!(declarations = order.len(), "lowering compilation unit");
        for member in order {
            self.visit_member(member)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ql_typed::{ClassKind, TreeBuilder, Type};

    #[test]
    fn supertypes_of_nested_classes_come_first() {
        let mut builder = TreeBuilder::new();
        let helper = builder.function(None, "helper", Vec::new(), Type::Unit);
        let outer = builder.class("Outer", ClassKind::Class);
        let inner = builder.nested_class(outer, "Inner", ClassKind::Class);
        let base = builder.class("Base", ClassKind::Class);
        builder.class_mut(inner).supertypes.push(Type::class(base, Vec::new()));
        let tree = builder.finish();

        assert_eq!(
            supertype_first_order(&tree),
            vec![
                MemberDecl::Function(helper),
                MemberDecl::Class(base),
                MemberDecl::Class(outer),
            ]
        );
    }

    #[test]
    fn cyclic_hierarchies_terminate() {
        let mut builder = TreeBuilder::new();
        let a = builder.class("A", ClassKind::Interface);
        let b = builder.class("B", ClassKind::Interface);
        builder.class_mut(a).supertypes.push(Type::class(b, Vec::new()));
        builder.class_mut(b).supertypes.push(Type::class(a, Vec::new()));
        let tree = builder.finish();

        assert_eq!(
            supertype_first_order(&tree),
            vec![MemberDecl::Class(b), MemberDecl::Class(a)]
        );
    }

    #[test]
    fn nested_siblings_follow_their_supertypes() {
        let mut builder = TreeBuilder::new();
        let outer = builder.class("Outer", ClassKind::Class);
        let derived = builder.nested_class(outer, "Derived", ClassKind::Class);
        let run = builder.function(Some(outer), "run", Vec::new(), Type::Unit);
        let holder = builder.nested_class(outer, "Holder", ClassKind::Class);
        let base = builder.nested_class(holder, "Base", ClassKind::Class);
        let external = builder.class("External", ClassKind::Class);
        let derived_data = builder.class_mut(derived);
        derived_data.supertypes.push(Type::class(base, Vec::new()));
        derived_data.supertypes.push(Type::class(external, Vec::new()));
        let tree = builder.finish();

        assert_eq!(
            member_order(&tree, &tree.classes[outer].declarations, Some(outer)),
            vec![
                MemberDecl::Class(holder),
                MemberDecl::Class(derived),
                MemberDecl::Function(run),
            ]
        );
    }
}
