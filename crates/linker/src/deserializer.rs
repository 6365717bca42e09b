use irlink_ir::{ModuleFragment, ModuleID, Signature, SymbolID};

use crate::context::LinkCx;
use crate::errors::LinkResult;
use crate::strategy::DeserializationStrategy;

/// Supplies the declarations of one module on demand.
///
/// A deserializer keeps its own queue of reachable top levels. Whenever it
/// queues something it has to call [`LinkCx::enqueue_module`] so that the
/// linker drains it, and references into other modules go through
/// [`LinkCx::reference_symbol`] and [`LinkCx::request_symbol`].
pub trait ModuleDeserializer {
    fn module(&self) -> ModuleID;

    fn strategy(&self) -> DeserializationStrategy;

    /// Called exactly once per session, before any symbol is declared.
    fn init(&mut self, cx: &mut LinkCx) -> LinkResult<()>;

    /// Register the intent to materialize `symbol`.
    fn declare_ir_symbol(&mut self, symbol: SymbolID, cx: &mut LinkCx) -> LinkResult<()>;

    fn deserialize_reachable_declarations(&mut self, cx: &mut LinkCx) -> LinkResult<()>;

    fn add_module_reachable_top_level(&mut self, signature: Signature, cx: &mut LinkCx);

    fn module_fragment(&self) -> &ModuleFragment;
}

/// Deserializer of the module being compiled. It has no library behind it:
/// everything it owns already exists in its fragment.
pub struct CurrentModuleDeserializer {
    fragment: ModuleFragment,
    dependencies: Vec<ModuleID>,
}

impl CurrentModuleDeserializer {
    pub fn new(fragment: ModuleFragment, dependencies: Vec<ModuleID>) -> Self {
        Self {
            fragment,
            dependencies,
        }
    }

    pub fn dependencies(&self) -> &[ModuleID] {
        &self.dependencies
    }
}

impl ModuleDeserializer for CurrentModuleDeserializer {
    fn module(&self) -> ModuleID {
        self.fragment.module
    }

    fn strategy(&self) -> DeserializationStrategy {
        DeserializationStrategy::All
    }

    fn init(&mut self, cx: &mut LinkCx) -> LinkResult<()> {
        let module = self.module();
        for decl in self.fragment.declarations() {
            let symbol = cx.decls.get(decl).symbol;
            if let Some(sig) = cx.symbols.get(symbol).signature {
                if sig.is_public() {
                    cx.register_top_level(sig, module);
                }
            }
        }
        Ok(())
    }

    fn declare_ir_symbol(&mut self, symbol: SymbolID, cx: &mut LinkCx) -> LinkResult<()> {
        tracing::trace!(
            symbol = cx.symbol_name(symbol),
            "current module has nothing to deserialize"
        );
        Ok(())
    }

    fn deserialize_reachable_declarations(&mut self, _: &mut LinkCx) -> LinkResult<()> {
        Ok(())
    }

    fn add_module_reachable_top_level(&mut self, signature: Signature, cx: &mut LinkCx) {
        tracing::trace!(
            signature = %signature.display(&cx.atoms),
            "current module has nothing to deserialize"
        );
    }

    fn module_fragment(&self) -> &ModuleFragment {
        &self.fragment
    }
}
