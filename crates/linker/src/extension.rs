use irlink_atom::AtomIntern;
use irlink_ir::{Decl, DeclID, ModuleID, Signature, Symbol, SymbolFlags, SymbolID, SymbolKind};

use crate::context::LinkCx;

/// Last chance resolver for symbols no library provides.
pub trait LinkerExtension {
    /// Return the declaration of `symbol`, or `None` to let the next
    /// extension try. The returned declaration must be owned by `symbol`.
    fn resolve_symbol(
        &self,
        symbol: SymbolID,
        cx: &mut TranslationPluginContext<'_>,
    ) -> Option<DeclID>;
}

/// The view of the session handed to linker extensions.
pub struct TranslationPluginContext<'cx> {
    cx: &'cx mut LinkCx,
}

impl<'cx> TranslationPluginContext<'cx> {
    pub(crate) fn new(cx: &'cx mut LinkCx) -> Self {
        Self { cx }
    }

    pub fn symbol(&self, symbol: SymbolID) -> &Symbol {
        self.cx.symbols.get(symbol)
    }

    pub fn signature(&self, symbol: SymbolID) -> Option<Signature> {
        self.cx.symbols.get(symbol).signature
    }

    pub fn atoms(&self) -> &AtomIntern {
        &self.cx.atoms
    }

    pub fn atoms_mut(&mut self) -> &mut AtomIntern {
        &mut self.cx.atoms
    }

    pub fn decl(&self, decl: DeclID) -> &Decl {
        self.cx.decls.get(decl)
    }

    /// Allocate `decl` and bind its symbol to it.
    pub fn declare(&mut self, decl: Decl) -> DeclID {
        let symbol = decl.symbol;
        let id = self.cx.decls.alloc(decl);
        self.cx.symbols.bind(symbol, id);
        id
    }

    /// Allocate `decl` without binding anything.
    pub fn alloc(&mut self, decl: Decl) -> DeclID {
        self.cx.decls.alloc(decl)
    }

    pub fn new_private_symbol(&mut self, kind: SymbolKind, module: ModuleID) -> SymbolID {
        self.cx
            .symbols
            .new_private(None, kind, module, SymbolFlags::empty())
    }
}
