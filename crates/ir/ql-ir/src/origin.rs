//! Where a backend declaration came from
//!
//! The origin is decided when a declaration is created and never changes.
//! Body selection during lowering branches on it instead of guessing from
//! whether a source declaration happens to be available.

use derive_more::Display;

/// Compiler-synthesized member shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SyntheticKind {
    /// `componentN()` of a data class, 1-based
    #[display("DATA_COMPONENT_{_0}")]
    DataComponent(u32),
    #[display("DATA_COPY")]
    DataCopy,
    #[display("DATA_EQUALS")]
    DataEquals,
    #[display("DATA_HASH_CODE")]
    DataHashCode,
    #[display("DATA_TO_STRING")]
    DataToString,
    #[display("VALUE_EQUALS")]
    ValueEquals,
    #[display("VALUE_HASH_CODE")]
    ValueHashCode,
    #[display("VALUE_TO_STRING")]
    ValueToString,
    #[display("ENUM_VALUES")]
    EnumValues,
    #[display("ENUM_VALUE_OF")]
    EnumValueOf,
    /// `$$delegate_N` field holding an interface delegate
    #[display("DELEGATE_FIELD")]
    DelegateField,
}

impl SyntheticKind {
    /// Enum helpers whose bodies are produced by the backend
    pub fn is_enum_helper(self) -> bool {
        matches!(self, Self::EnumValues | Self::EnumValueOf)
    }

    /// Data members the checker may declare without a body
    pub fn is_data_accessor(self) -> bool {
        matches!(self, Self::DataComponent(_) | Self::DataCopy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum IrOrigin {
    /// Declared in source
    #[default]
    #[display("DEFINED")]
    Defined,
    #[display("SYNTHESIZED({_0})")]
    Synthesized(SyntheticKind),
    /// Forwards to an interface delegate
    #[display("DELEGATED")]
    Delegated,
    #[display("FAKE_OVERRIDE")]
    FakeOverride,
    /// Accessor without a source body
    #[display("DEFAULT_ACCESSOR")]
    DefaultAccessor,
}

impl IrOrigin {
    pub fn synthetic_kind(self) -> Option<SyntheticKind> {
        match self {
            Self::Synthesized(kind) => Some(kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_render_in_dump_form() {
        assert_eq!(IrOrigin::FakeOverride.to_string(), "FAKE_OVERRIDE");
        assert_eq!(
            IrOrigin::Synthesized(SyntheticKind::DataComponent(2)).to_string(),
            "SYNTHESIZED(DATA_COMPONENT_2)"
        );
    }

    #[test]
    fn only_values_and_value_of_are_enum_helpers() {
        assert!(SyntheticKind::EnumValues.is_enum_helper());
        assert!(SyntheticKind::EnumValueOf.is_enum_helper());
        assert!(!SyntheticKind::DataCopy.is_enum_helper());
    }
}
