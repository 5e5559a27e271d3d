//! Arena-indexed scope table.
//!
//! Scopes are allocated in a growable array and chained by parent index;
//! entering and leaving a scope is a push/pop on the `current` index, so no
//! ownership chain ever has to be unwound. Lookup checks the current scope
//! and then walks outward through the parent chain only — sibling scopes
//! are invisible to each other.

use inkwell::types::BasicTypeEnum;
use inkwell::values::PointerValue;
use rustc_hash::FxHashMap;

use cedar_ast::Type;

/// One named storage slot: the stack address, the LLVM type stored there,
/// and the source type descriptor it was declared with.
///
/// The source type is authoritative for all structural recovery (member
/// offsets, element and pointee types): LLVM pointer values are opaque, so
/// nothing is ever re-derived from `storage` itself.
#[derive(Debug, Clone)]
pub(crate) struct Binding<'ctx> {
    pub storage: PointerValue<'ctx>,
    pub resolved: BasicTypeEnum<'ctx>,
    pub source: Type,
}

struct Scope<'ctx> {
    parent: Option<usize>,
    bindings: FxHashMap<String, Binding<'ctx>>,
}

/// The scope arena. One scope is pushed per function body.
pub(crate) struct ScopeArena<'ctx> {
    scopes: Vec<Scope<'ctx>>,
    current: Option<usize>,
}

impl<'ctx> ScopeArena<'ctx> {
    pub fn new() -> Self {
        Self {
            scopes: Vec::new(),
            current: None,
        }
    }

    /// Enter a fresh scope whose parent is the current one.
    pub fn push(&mut self) {
        let index = self.scopes.len();
        self.scopes.push(Scope {
            parent: self.current,
            bindings: FxHashMap::default(),
        });
        self.current = Some(index);
    }

    /// Leave the current scope, restoring its parent.
    pub fn pop(&mut self) {
        if let Some(index) = self.current {
            self.current = self.scopes[index].parent;
        }
    }

    /// Insert a binding into the current scope. A same-name entry in the
    /// same scope is overwritten: last write wins, with no diagnostic.
    pub fn define(&mut self, name: &str, binding: Binding<'ctx>) {
        if let Some(index) = self.current {
            self.scopes[index].bindings.insert(name.to_string(), binding);
        }
    }

    /// Resolve a name against the current scope, then outward through the
    /// parent chain. `None` when the chain is exhausted.
    pub fn lookup(&self, name: &str) -> Option<&Binding<'ctx>> {
        let mut next = self.current;
        while let Some(index) = next {
            let scope = &self.scopes[index];
            if let Some(binding) = scope.bindings.get(name) {
                return Some(binding);
            }
            next = scope.parent;
        }
        None
    }
}
