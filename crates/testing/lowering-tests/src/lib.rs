//! Shared helpers for the lowering integration tests

use ql_ir::{IrBody, IrClassId, IrDeclaration, IrExpr, IrFunctionId, IrModule, IrOrigin};
use ql_lower::{LoweringError, LoweringOptions, lower_module};
use ql_typed::TypedTree;
use tracing_subscriber::EnvFilter;

/// Install a subscriber writing through the test harness, filtered by `QL_LOG`
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    drop(
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_env("QL_LOG"))
            .with_test_writer()
            .try_init(),
    );
}

/// Lower `tree` with the default options
pub fn lower(tree: &TypedTree) -> Result<IrModule, LoweringError> {
    lower_with(tree, LoweringOptions::default())
}

pub fn lower_with(tree: &TypedTree, options: LoweringOptions) -> Result<IrModule, LoweringError> {
    init_tracing();
    lower_module(tree, options)
}

/// Expressions of the top-level statements of a block body
pub fn body_exprs(module: &IrModule, function: IrFunctionId) -> Vec<&IrExpr> {
    match &module.functions[function].body {
        Some(IrBody::Block(statements)) => statements
            .iter()
            .filter_map(|statement| statement.as_expr())
            .collect(),
        Some(IrBody::Synthetic(_)) | None => Vec::new(),
    }
}

/// Simple functions of `class` created with `origin`
pub fn functions_with_origin(
    module: &IrModule,
    class: IrClassId,
    origin: IrOrigin,
) -> Vec<IrFunctionId> {
    module.classes[class]
        .declarations
        .iter()
        .filter_map(|declaration| match *declaration {
            IrDeclaration::Function(function)
                if module.functions[function].origin == origin =>
            {
                Some(function)
            }
            _ => None,
        })
        .collect()
}
