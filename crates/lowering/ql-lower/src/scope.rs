//! Lookup scopes opened while converting declarations
//!
//! Each open declaration (class, function, property) owns one frame holding
//! the parameters and locals visible inside it. Lookups search from the
//! innermost frame outwards. Frames are pushed and popped in strict LIFO
//! order; callers go through [`ScopeGuard`](crate::context::ScopeGuard) so a
//! frame is released on every exit path.

use ql_ir::{IrClassId, IrFunctionId, IrPropertyId, IrValueRef};
use ql_typed::ValueRef;
use rustc_hash::FxHashMap;
use tracing::trace;

/// Declaration a scope frame belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeOwner {
    Class(IrClassId),
    Function(IrFunctionId),
    Property(IrPropertyId),
}

#[derive(Debug)]
struct ScopeFrame {
    owner: ScopeOwner,
    values: FxHashMap<ValueRef, IrValueRef>,
}

#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<ScopeFrame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, owner: ScopeOwner) {
        trace!(?owner, depth = self.frames.len(), "enter scope");
        self.frames.push(ScopeFrame {
            owner,
            values: FxHashMap::default(),
        });
    }

    pub fn leave(&mut self, owner: ScopeOwner) {
        let frame = self.frames.pop();
        debug_assert_eq!(
            frame.as_ref().map(|frame| frame.owner),
            Some(owner),
            "scopes must be left in reverse order of entry"
        );
        trace!(?owner, depth = self.frames.len(), "leave scope");
    }

    /// Make `value` visible in the innermost frame
    pub fn bind(&mut self, value: ValueRef, ir_value: IrValueRef) {
        if let Some(frame) = self.frames.last_mut() {
            frame.values.insert(value, ir_value);
        }
    }

    pub fn lookup(&self, value: ValueRef) -> Option<IrValueRef> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.values.get(&value).copied())
    }

    pub fn is_open(&self, owner: ScopeOwner) -> bool {
        self.frames.iter().any(|frame| frame.owner == owner)
    }

    /// Innermost open function, the target of `return`
    pub fn current_function(&self) -> Option<IrFunctionId> {
        self.frames.iter().rev().find_map(|frame| match frame.owner {
            ScopeOwner::Function(function) => Some(function),
            _ => None,
        })
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
