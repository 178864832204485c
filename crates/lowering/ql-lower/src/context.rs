//! Lowering context and scope guards

use crate::error::LoweringError;
use crate::member_scope::{MemberScope, SupertypeMemberScope};
use crate::options::LoweringOptions;
use crate::scope::{ScopeOwner, ScopeStack};
use crate::storage::DeclarationStorage;
use ql_intern::Name;
use ql_ir::{IrClassId, IrExpr, IrModule, IrValueRef};
use ql_typed::{ParamId, TypedTree, ValueRef};
use std::ops::{Deref, DerefMut};

/// State of one compilation unit's lowering run
///
/// Owns the module being built, the declaration table and the scope stack.
/// Not meant to be shared: give every unit its own context.
pub struct LoweringContext<'tree> {
    pub tree: &'tree TypedTree,
    pub module: IrModule,
    pub storage: DeclarationStorage,
    pub scopes: ScopeStack,
    pub member_scope: Box<dyn MemberScope>,
    pub options: LoweringOptions,
}

impl<'tree> LoweringContext<'tree> {
    /// Create a context with every declaration of `tree` allocated as a shell
    pub fn new(tree: &'tree TypedTree, options: LoweringOptions) -> Result<Self, LoweringError> {
        let mut module = IrModule::new(tree.interner.clone());
        let storage = DeclarationStorage::allocate(tree, &mut module)?;
        Ok(Self {
            tree,
            module,
            storage,
            scopes: ScopeStack::new(),
            member_scope: Box::new(SupertypeMemberScope),
            options,
        })
    }

    #[must_use]
    pub fn with_member_scope(mut self, member_scope: impl MemberScope + 'static) -> Self {
        self.member_scope = Box::new(member_scope);
        self
    }

    pub fn finish(self) -> IrModule {
        debug_assert_eq!(self.scopes.depth(), 0, "scopes left open after lowering");
        self.module
    }

    pub fn name(&self, name: Name) -> &'tree str {
        self.tree.name(name)
    }

    pub fn intern(&self, text: &str) -> Name {
        self.module.interner.intern(text)
    }

    /// Open a scope for `owner`, closed when the guard drops
    pub fn enter_scope(&mut self, owner: ScopeOwner) -> ScopeGuard<'_, 'tree> {
        let mut guard = self.scope_guard();
        guard.enter(owner);
        guard
    }

    /// A guard that has not opened anything yet
    pub fn scope_guard(&mut self) -> ScopeGuard<'_, 'tree> {
        ScopeGuard {
            context: self,
            owners: Vec::new(),
        }
    }

    /// Bind typed value parameters to their shells in the innermost scope
    pub fn register_parameters(&mut self, parameters: &[ParamId]) -> Result<(), LoweringError> {
        for param in parameters {
            let ir_param = self.storage.parameter(*param)?;
            self.scopes
                .bind(ValueRef::Parameter(*param), IrValueRef::Parameter(ir_param));
        }
        Ok(())
    }

    /// `this` of `class`
    pub fn this_value(&self, class: IrClassId) -> IrExpr {
        IrExpr::GetValue {
            value: IrValueRef::This(class),
            ty: self.module.this_type(class),
        }
    }
}

/// Scopes opened through this guard are left in reverse order when it drops
///
/// Derefs to the context, so conversion code keeps working through the guard
/// while its scopes are open.
pub struct ScopeGuard<'ctx, 'tree> {
    context: &'ctx mut LoweringContext<'tree>,
    owners: Vec<ScopeOwner>,
}

impl ScopeGuard<'_, '_> {
    /// Open one more scope, nested in the ones already held
    pub fn enter(&mut self, owner: ScopeOwner) {
        self.context.scopes.enter(owner);
        self.owners.push(owner);
    }
}

impl<'tree> Deref for ScopeGuard<'_, 'tree> {
    type Target = LoweringContext<'tree>;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl DerefMut for ScopeGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl Drop for ScopeGuard<'_, '_> {
    fn drop(&mut self) {
        while let Some(owner) = self.owners.pop() {
            self.context.scopes.leave(owner);
        }
    }
}
