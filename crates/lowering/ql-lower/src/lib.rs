//! Typed tree → backend IR lowering
//!
//! Every declaration of the typed tree is first allocated as an empty shell
//! in the [`IrModule`]. Conversion then fills the shells class by class:
//! primary constructor first, then delegated, synthesized and fake-override
//! members, then every remaining declaration through the
//! [`DeclarationVisitor`].

pub mod annotations;
pub mod call;
pub mod class_member;
pub mod context;
pub mod data_class;
pub mod delegation;
pub mod error;
pub mod expr;
pub mod fake_override;
pub mod member_scope;
pub mod names;
pub mod options;
pub mod overrides;
pub mod property;
pub mod scope;
pub mod storage;
pub mod unit;
pub mod visitor;

pub use annotations::AnnotationTarget;
pub use class_member::FunctionSource;
pub use context::{LoweringContext, ScopeGuard};
pub use data_class::PrimaryField;
pub use error::LoweringError;
pub use member_scope::{IrMember, MemberKey, MemberMap, MemberScope, SupertypeMemberScope};
pub use names::ProcessedNames;
pub use options::LoweringOptions;
pub use scope::{ScopeOwner, ScopeStack};
pub use storage::DeclarationStorage;
pub use unit::{member_order, supertype_first_order};
pub use visitor::DeclarationVisitor;

use ql_ir::IrModule;
use ql_typed::TypedTree;

/// Lower a whole compilation unit
pub fn lower_module(tree: &TypedTree, options: LoweringOptions) -> Result<IrModule, LoweringError> {
    let mut context = LoweringContext::new(tree, options)?;
    context.lower_unit()?;
    Ok(context.finish())
}
