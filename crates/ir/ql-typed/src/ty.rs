//! Resolved types

use crate::{ClassId, TypeAliasId};
use ql_intern::Name;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Boolean,
    String,
    Unit,
    Nothing,
    Any {
        nullable: bool,
    },
    Class {
        class: ClassId,
        arguments: Vec<Type>,
        nullable: bool,
    },
    /// Not yet expanded alias application
    Alias {
        alias: TypeAliasId,
        arguments: Vec<Type>,
    },
    TypeParameter(Name),
    Error,
}

impl Type {
    pub fn class(class: ClassId, arguments: Vec<Type>) -> Self {
        Self::Class {
            class,
            arguments,
            nullable: false,
        }
    }

    pub fn nullable_any() -> Self {
        Self::Any { nullable: true }
    }

    /// The class this type is an application of, if any
    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Self::Class { class, .. } => Some(*class),
            _ => None,
        }
    }

    pub fn arguments(&self) -> &[Type] {
        match self {
            Self::Class { arguments, .. } | Self::Alias { arguments, .. } => arguments,
            _ => &[],
        }
    }

    /// Replace type parameters by the types `substitution` maps them to
    #[must_use]
    pub fn substitute(&self, substitution: &FxHashMap<Name, Type>) -> Type {
        match self {
            Self::TypeParameter(name) => substitution
                .get(name)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            Self::Class {
                class,
                arguments,
                nullable,
            } => Self::Class {
                class: *class,
                arguments: arguments
                    .iter()
                    .map(|argument| argument.substitute(substitution))
                    .collect(),
                nullable: *nullable,
            },
            Self::Alias { alias, arguments } => Self::Alias {
                alias: *alias,
                arguments: arguments
                    .iter()
                    .map(|argument| argument.substitute(substitution))
                    .collect(),
            },
            _ => self.clone(),
        }
    }
}
