//! Supertype member scopes
//!
//! Override resolution and fake-override generation both need to know which
//! members a class inherits. Members are keyed by [`MemberKey`]: functions by
//! name and value-parameter count, properties by name.

use indexmap::IndexMap;
use ql_intern::Name;
use ql_ir::{IrClassId, IrDeclaration, IrFunctionId, IrModule, IrPropertyId};
use rustc_hash::{FxBuildHasher, FxHashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKey {
    Function { name: Name, arity: usize },
    Property(Name),
}

impl MemberKey {
    pub fn name(self) -> Name {
        match self {
            Self::Function { name, .. } | Self::Property(name) => name,
        }
    }
}

/// A callable member of a backend class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrMember {
    Function(IrFunctionId),
    Property(IrPropertyId),
}

pub type MemberMap<V> = IndexMap<MemberKey, V, FxBuildHasher>;

/// Functions and properties declared directly in `class`, including
/// synthesized and fake-override members already added to it
pub fn declared_members(module: &IrModule, class: IrClassId) -> MemberMap<IrMember> {
    let mut members = MemberMap::default();
    for declaration in &module.classes[class].declarations {
        match *declaration {
            IrDeclaration::Function(function) => {
                let data = &module.functions[function];
                if data.kind.is_constructor() || data.is_accessor() {
                    continue;
                }
                let key = MemberKey::Function {
                    name: data.name,
                    arity: data.value_parameters.len(),
                };
                members.entry(key).or_insert(IrMember::Function(function));
            }
            IrDeclaration::Property(property) => {
                let key = MemberKey::Property(module.properties[property].name);
                members.entry(key).or_insert(IrMember::Property(property));
            }
            IrDeclaration::Class(_) | IrDeclaration::Field(_) => {}
        }
    }
    members
}

pub trait MemberScope {
    /// Members visible on `class`: its own, then the first match along each supertype path
    fn visible_members(&self, module: &IrModule, class: IrClassId) -> MemberMap<IrMember>;

    /// Members `class` inherits, grouped by key, in supertype order
    fn inherited_members(&self, module: &IrModule, class: IrClassId) -> MemberMap<Vec<IrMember>> {
        let mut inherited: MemberMap<Vec<IrMember>> = MemberMap::default();
        for supertype in &module.classes[class].supertypes {
            let Some(supertype) = supertype.class_id() else {
                continue;
            };
            for (key, member) in self.visible_members(module, supertype) {
                let group = inherited.entry(key).or_default();
                if !group.contains(&member) {
                    group.push(member);
                }
            }
        }
        inherited
    }

    /// Supertype members a member of `class` with `key` directly overrides
    fn directly_overridden(
        &self,
        module: &IrModule,
        class: IrClassId,
        key: MemberKey,
    ) -> Vec<IrMember> {
        self.inherited_members(module, class)
            .swap_remove(&key)
            .unwrap_or_default()
    }
}

/// Scope built from the resolved supertypes of backend classes
#[derive(Debug, Clone, Copy, Default)]
pub struct SupertypeMemberScope;

impl SupertypeMemberScope {
    fn collect(
        module: &IrModule,
        class: IrClassId,
        visited: &mut FxHashSet<IrClassId>,
        members: &mut MemberMap<IrMember>,
    ) {
        if !visited.insert(class) {
            return;
        }
        for (key, member) in declared_members(module, class) {
            members.entry(key).or_insert(member);
        }
        for supertype in &module.classes[class].supertypes {
            if let Some(supertype) = supertype.class_id() {
                Self::collect(module, supertype, visited, members);
            }
        }
    }
}

impl MemberScope for SupertypeMemberScope {
    fn visible_members(&self, module: &IrModule, class: IrClassId) -> MemberMap<IrMember> {
        let mut members = MemberMap::default();
        Self::collect(module, class, &mut FxHashSet::default(), &mut members);
        members
    }
}
