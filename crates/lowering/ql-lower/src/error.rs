//! Error types for lowering

use thiserror::Error;

/// Internal consistency violations that abort lowering of a unit
///
/// Erroneous user code never produces these: the type checker has already
/// reported it, and lowering turns what is left into error markers in the IR.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoweringError {
    /// A typed declaration has no backend shell
    #[error("no backend declaration allocated for {kind} #{index}")]
    MissingDeclaration {
        /// Declaration kind, for the message
        kind: &'static str,
        /// Arena index of the typed declaration
        index: u32,
    },

    /// A synthesized data-class member whose owning class cannot be found
    #[error("synthesized member `{member}` has no owning class")]
    MissingOwnerClass {
        /// Name of the member
        member: String,
    },

    /// A value is read outside every scope that binds it
    #[error("`{name}` is not bound in any open scope")]
    UnboundValue {
        /// Name of the parameter or local
        name: String,
    },

    /// `return` with no enclosing function scope
    #[error("`return` outside of a function body")]
    MissingReturnTarget,

    /// A call argument that matches no parameter of the callee
    #[error("`{callee}` has no parameter for argument `{argument}`")]
    UnknownArgument {
        /// Qualified name of the callee
        callee: String,
        /// Argument name, or `#index` for positional arguments
        argument: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let error = LoweringError::UnboundValue {
            name: "x".to_owned(),
        };
        assert_eq!(error.to_string(), "`x` is not bound in any open scope");

        let error = LoweringError::MissingDeclaration {
            kind: "constructor",
            index: 3,
        };
        assert_eq!(
            error.to_string(),
            "no backend declaration allocated for constructor #3"
        );
    }
}
