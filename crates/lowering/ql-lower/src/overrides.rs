//! Override resolution for functions and property accessors

use crate::context::LoweringContext;
use crate::member_scope::{IrMember, MemberKey};
use indexmap::IndexSet;
use ql_ir::{IrClassId, IrFunctionId, IrPropertyId, Visibility};
use ql_typed::AccessorKind;
use rustc_hash::FxBuildHasher;

impl LoweringContext<'_> {
    /// Supertype functions `function` directly overrides, in supertype order
    ///
    /// Private candidates are invisible to subclasses and never overridden.
    pub fn compute_overrides(&self, function: IrFunctionId, class: IrClassId) -> Vec<IrFunctionId> {
        let data = &self.module.functions[function];
        let key = MemberKey::Function {
            name: data.name,
            arity: data.value_parameters.len(),
        };
        let overridden: IndexSet<IrFunctionId, FxBuildHasher> = self
            .member_scope
            .directly_overridden(&self.module, class, key)
            .into_iter()
            .filter_map(|member| match member {
                IrMember::Function(function) => Some(function),
                IrMember::Property(_) => None,
            })
            .filter(|function| self.module.functions[*function].visibility != Visibility::Private)
            .collect();
        overridden.into_iter().collect()
    }

    /// Accessors of the overridden properties that the `kind` accessor of `property` overrides
    pub fn compute_accessor_overrides(
        &self,
        property: IrPropertyId,
        kind: AccessorKind,
        class: IrClassId,
    ) -> Vec<IrFunctionId> {
        let key = MemberKey::Property(self.module.properties[property].name);
        let overridden: IndexSet<IrFunctionId, FxBuildHasher> = self
            .member_scope
            .directly_overridden(&self.module, class, key)
            .into_iter()
            .filter_map(|member| match member {
                IrMember::Property(property) => {
                    let property = &self.module.properties[property];
                    if property.visibility == Visibility::Private {
                        return None;
                    }
                    match kind {
                        AccessorKind::Getter => property.getter,
                        AccessorKind::Setter => property.setter,
                    }
                }
                IrMember::Function(_) => None,
            })
            .filter(|accessor| self.module.functions[*accessor].visibility != Visibility::Private)
            .collect();
        overridden.into_iter().collect()
    }
}
