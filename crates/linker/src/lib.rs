mod builtins;
mod context;
mod deserializer;
mod errors;
mod expect_actual;
mod extension;
mod fake_override;
mod header;
mod resolve;
mod strategy;
mod worklist;

use irlink_atom::AtomIntern;
use irlink_config::NormalizedLinkerConfig;
use irlink_ir::{ModuleDescriptor, ModuleFragment, ModuleID, Symbol, SymbolFlags, SymbolID};
use irlink_utils::FxIndexMap;
use rustc_hash::FxHashSet;

pub use self::builtins::{
    FunctionFlavor, FunctionTypeFactory, FunctionTypeKey, ModuleDeserializerWithBuiltIns,
    function_type_of,
};
pub use self::context::LinkCx;
pub use self::deserializer::{CurrentModuleDeserializer, ModuleDeserializer};
pub use self::errors::{LinkError, LinkResult};
pub use self::expect_actual::ExpectActualTable;
pub use self::extension::{LinkerExtension, TranslationPluginContext};
pub use self::fake_override::{FakeOverrideBuilder, FakeOverrideQueue, NoFakeOverrides};
pub use self::strategy::DeserializationStrategy;
pub use self::worklist::ReachabilityWorklist;

/// Hooks supplied by the compiler backend embedding the linker.
pub trait LinkerBackend {
    /// Serialized library handed to [`LinkerBackend::create_module_deserializer`].
    type Library;

    fn create_module_deserializer(
        &mut self,
        module: ModuleID,
        library: Option<Self::Library>,
        strategy: DeserializationStrategy,
        cx: &mut LinkCx,
    ) -> LinkResult<Box<dyn ModuleDeserializer>>;

    fn is_builtin_module(&self, module: &ModuleDescriptor, atoms: &AtomIntern) -> bool;

    fn create_current_module_deserializer(
        &mut self,
        fragment: ModuleFragment,
        dependencies: Vec<ModuleID>,
    ) -> Box<dyn ModuleDeserializer> {
        Box::new(CurrentModuleDeserializer::new(fragment, dependencies))
    }

    /// Private symbols outside of the current module the backend still
    /// wants resolved.
    fn platform_specific_symbol(&self, _: &Symbol) -> bool {
        false
    }

    /// Symbols allowed to stay unbound after linking.
    fn is_exempt_from_binding(&self, symbol: &Symbol) -> bool {
        symbol
            .flags
            .intersects(SymbolFlags::EXPECT_MEMBER | SymbolFlags::IN_EXPECT_CONTAINER)
    }

    /// Without a plugin context linker extensions are never asked.
    fn has_translation_plugin_context(&self) -> bool {
        true
    }
}

/// One link session.
pub struct Linker<B: LinkerBackend> {
    cx: LinkCx,
    backend: B,
    fake_override_builder: Box<dyn FakeOverrideBuilder>,
    deserializers: FxIndexMap<ModuleID, Box<dyn ModuleDeserializer>>,
    initialized: FxHashSet<ModuleID>,
    session_initialized: bool,
    current_module: Option<ModuleID>,
    extensions: Vec<Box<dyn LinkerExtension>>,
    have_seen: FxHashSet<SymbolID>,
}

impl<B: LinkerBackend> Linker<B> {
    pub fn new(
        config: NormalizedLinkerConfig,
        backend: B,
        fake_override_builder: Box<dyn FakeOverrideBuilder>,
    ) -> Self {
        irlink_tracing::init_tracing();
        Self {
            cx: LinkCx::new(config),
            backend,
            fake_override_builder,
            deserializers: FxIndexMap::default(),
            initialized: FxHashSet::default(),
            session_initialized: false,
            current_module: None,
            extensions: Vec::new(),
            have_seen: irlink_utils::fx_hashset_with_capacity(256),
        }
    }

    #[inline(always)]
    pub fn cx(&self) -> &LinkCx {
        &self.cx
    }

    #[inline(always)]
    pub fn cx_mut(&mut self) -> &mut LinkCx {
        &mut self.cx
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn current_module(&self) -> Option<ModuleID> {
        self.current_module
    }

    pub fn has_pending_work(&self) -> bool {
        self.cx.has_pending_work()
    }

    pub fn module_deserializer(&self, module: ModuleID) -> Option<&dyn ModuleDeserializer> {
        self.deserializers.get(&module).map(|d| d.as_ref())
    }

    pub fn has_seen(&self, symbol: SymbolID) -> bool {
        self.have_seen.contains(&symbol)
    }

    fn resolve_module_deserializer<'d>(
        deserializers: &'d mut FxIndexMap<ModuleID, Box<dyn ModuleDeserializer>>,
        cx: &LinkCx,
        module: ModuleID,
    ) -> LinkResult<&'d mut Box<dyn ModuleDeserializer>> {
        deserializers
            .get_mut(&module)
            .ok_or_else(|| LinkError::NoModuleDeserializer {
                module: cx.module_name(module),
            })
    }

    /// Finish the session. Top levels still queued are deserialized first,
    /// then expects are reconciled with their actuals and the queued fake
    /// overrides are built. The seen set is forgotten at the end.
    #[tracing::instrument(level = tracing::Level::TRACE, skip_all)]
    pub fn post_process(&mut self) -> LinkResult<()> {
        self.deserialize_all_reachable_top_levels()?;
        self.finalize_expect_actual_linker()?;
        fake_override::build_all_fake_overrides(self.fake_override_builder.as_mut(), &mut self.cx);
        debug_assert!(self.cx.fake_override_queue.is_empty());
        self.have_seen.clear();

        if self.cx.config().report_unbound_symbols() {
            for symbol in self.unbound_symbols() {
                tracing::warn!(symbol = self.cx.symbol_name(symbol), "unbound after linking");
            }
        }
        Ok(())
    }

    /// Public symbols left without a declaration that the backend does not
    /// exempt.
    pub fn unbound_symbols(&self) -> Vec<SymbolID> {
        self.cx
            .symbols
            .iter()
            .filter(|(id, symbol)| {
                symbol.is_public_api()
                    && !self.cx.symbols.is_bound(*id)
                    && !self.backend.is_exempt_from_binding(symbol)
            })
            .map(|(id, _)| id)
            .collect()
    }
}
