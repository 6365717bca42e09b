use irlink_ir::{DeclID, SymbolFlags, SymbolID};

use crate::errors::{LinkError, LinkResult};
use crate::extension::TranslationPluginContext;
use crate::{Linker, LinkerBackend};

impl<B: LinkerBackend> Linker<B> {
    /// Declaration of `symbol`, deserializing it on first request.
    ///
    /// `Ok(None)` is a regular outcome, e.g. for private symbols of other
    /// modules and for expect members nobody declared.
    #[tracing::instrument(level = tracing::Level::TRACE, skip_all, fields(symbol = self.cx.symbol_name(symbol)))]
    pub fn get_declaration(&mut self, symbol: SymbolID) -> LinkResult<Option<DeclID>> {
        let s = self.cx.symbols.get(symbol);
        if !s.is_public_api() {
            if s.flags.contains(SymbolFlags::WRAPPED) {
                return Ok(None);
            }
            if !self.backend.platform_specific_symbol(s) && Some(s.module) != self.current_module {
                return Ok(None);
            }
        }

        if !self.cx.symbols.is_bound(symbol) && self.find_deserialized_declaration(symbol)? {
            self.try_resolve_custom_declaration(symbol)?;
        }

        Ok(self.cx.symbols.owner(symbol))
    }

    /// Returns whether the symbol went through deserialization for the
    /// first time and is still unbound.
    fn find_deserialized_declaration(&mut self, symbol: SymbolID) -> LinkResult<bool> {
        if self.have_seen.contains(&symbol) {
            return Ok(false);
        }
        let module = self.cx.symbols.get(symbol).module;
        let deserializer =
            Self::resolve_module_deserializer(&mut self.deserializers, &self.cx, module)?;
        self.have_seen.insert(symbol);
        deserializer.declare_ir_symbol(symbol, &mut self.cx)?;
        self.deserialize_all_reachable_top_levels()?;
        Ok(!self.cx.symbols.is_bound(symbol))
    }

    fn try_resolve_custom_declaration(&mut self, symbol: SymbolID) -> LinkResult<Option<DeclID>> {
        let flags = self.cx.symbols.get(symbol).flags;
        if flags.intersects(SymbolFlags::WRAPPED | SymbolFlags::FAKE_OVERRIDE) {
            return Ok(None);
        }
        if !self.backend.has_translation_plugin_context() {
            return Ok(None);
        }

        let mut ctx = TranslationPluginContext::new(&mut self.cx);
        let Some(decl) = self
            .extensions
            .iter()
            .find_map(|ext| ext.resolve_symbol(symbol, &mut ctx))
        else {
            return Ok(None);
        };
        if self.cx.symbols.owner(symbol) != Some(decl) {
            return Err(LinkError::ForeignCustomDeclaration {
                signature: self.cx.symbol_name(symbol),
            });
        }
        tracing::debug!(symbol = self.cx.symbol_name(symbol), "resolved by extension");
        Ok(Some(decl))
    }
}
