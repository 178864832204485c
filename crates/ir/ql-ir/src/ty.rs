//! Backend IR types

use crate::IrClassId;
use ql_intern::Name;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IrType {
    Int,
    Boolean,
    String,
    Unit,
    Nothing,
    Any {
        nullable: bool,
    },
    Class {
        class: IrClassId,
        arguments: Vec<IrType>,
        nullable: bool,
    },
    /// Storage of a `vararg` parameter
    Array(Box<IrType>),
    TypeParameter(Name),
    Error,
}

impl IrType {
    pub fn class(class: IrClassId, arguments: Vec<IrType>) -> Self {
        Self::Class {
            class,
            arguments,
            nullable: false,
        }
    }

    pub fn nullable_any() -> Self {
        Self::Any { nullable: true }
    }

    pub fn class_id(&self) -> Option<IrClassId> {
        match self {
            Self::Class { class, .. } => Some(*class),
            _ => None,
        }
    }
}
