use irlink_atom::AtomIntern;
use irlink_config::NormalizedLinkerConfig;
use irlink_ir::{DeclID, Decls, ModuleArena, ModuleID, Signature, SymbolID, SymbolKind, SymbolTable};
use rustc_hash::FxHashMap;

use crate::builtins::function_type_of;
use crate::errors::{LinkError, LinkResult};
use crate::expect_actual::ExpectActualTable;
use crate::fake_override::FakeOverrideQueue;
use crate::worklist::ReachabilityWorklist;

/// State of one link session shared with the module deserializers, the
/// fake override builder and the linker extensions.
pub struct LinkCx {
    pub atoms: AtomIntern,
    pub modules: ModuleArena,
    pub symbols: SymbolTable,
    pub decls: Decls,
    config: NormalizedLinkerConfig,
    pub(crate) worklist: ReachabilityWorklist,
    pending_references: Vec<SymbolID>,
    top_level_owners: FxHashMap<Signature, ModuleID>,
    pub(crate) builtins_module: Option<ModuleID>,
    pub(crate) expect_actual: ExpectActualTable,
    pub(crate) fake_override_queue: FakeOverrideQueue,
}

impl LinkCx {
    pub(crate) fn new(config: NormalizedLinkerConfig) -> Self {
        Self {
            atoms: irlink_ir::atoms::init_atom_map(),
            modules: ModuleArena::new(),
            symbols: SymbolTable::new(),
            decls: Decls::default(),
            config,
            worklist: ReachabilityWorklist::default(),
            pending_references: Vec::with_capacity(64),
            top_level_owners: irlink_utils::fx_hashmap_with_capacity(1024),
            builtins_module: None,
            expect_actual: ExpectActualTable::default(),
            fake_override_queue: FakeOverrideQueue::default(),
        }
    }

    /// Add a module to the session. Dependencies must already be known.
    pub fn new_module(&mut self, name: &str, dependencies: Vec<ModuleID>) -> ModuleID {
        let name = self.atoms.atom(name);
        self.modules.new_module(name, dependencies)
    }

    pub fn find_module(&self, name: &str) -> Option<ModuleID> {
        let name = self.atoms.lookup(name)?;
        self.modules.find_by_name(name)
    }

    #[inline(always)]
    pub fn config(&self) -> &NormalizedLinkerConfig {
        &self.config
    }

    /// `module` has top levels waiting to be deserialized.
    pub fn enqueue_module(&mut self, module: ModuleID) {
        self.worklist.insert(module);
    }

    /// Make `sig` discoverable by references coming from other modules.
    /// The first module registering a signature keeps it.
    pub fn register_top_level(&mut self, sig: Signature, module: ModuleID) {
        let prev = *self.top_level_owners.entry(sig).or_insert(module);
        if prev != module {
            tracing::debug!(
                signature = %sig.display(&self.atoms),
                kept = self.module_name(prev),
                ignored = self.module_name(module),
                "top level provided twice"
            );
        }
    }

    pub fn owner_module(&mut self, sig: &Signature) -> Option<ModuleID> {
        let top = sig.top_level(&mut self.atoms);
        if let Some(module) = self.top_level_owners.get(&top) {
            return Some(*module);
        }
        self.builtins_module
            .filter(|_| function_type_of(&top, &self.atoms).is_some())
    }

    /// Symbol of a public signature, created in its owning module on first
    /// use. Expect symbols are remembered for actualization.
    pub fn reference_symbol(&mut self, sig: Signature, kind: SymbolKind) -> LinkResult<SymbolID> {
        if let Some(symbol) = self.symbols.by_signature(&sig) {
            return Ok(symbol);
        }
        let Some(module) = self.owner_module(&sig) else {
            return Err(LinkError::DeclarationNotFound {
                signature: sig.display(&self.atoms).to_string(),
            });
        };
        let symbol = self.symbols.reference(sig, kind, module);
        if sig.is_expect() {
            self.expect_actual.record_expect_symbol(sig, symbol);
        }
        Ok(symbol)
    }

    /// Ask the owning module of `symbol` to materialize it. Requests are
    /// routed by the linker between two drain steps.
    pub fn request_symbol(&mut self, symbol: SymbolID) {
        if !self.symbols.is_bound(symbol) {
            self.pending_references.push(symbol);
        }
    }

    pub(crate) fn take_pending_reference(&mut self) -> Option<SymbolID> {
        self.pending_references.pop()
    }

    pub(crate) fn has_pending_work(&self) -> bool {
        !self.worklist.is_empty() || !self.pending_references.is_empty()
    }

    /// `actual_module` is only known for top level actuals.
    pub fn record_expect_actual(
        &mut self,
        expect: Signature,
        actual: Signature,
        actual_module: Option<ModuleID>,
    ) {
        self.expect_actual.record_mapping(expect, actual, actual_module);
    }

    pub fn record_expect_symbol(&mut self, sig: Signature, symbol: SymbolID) {
        self.expect_actual.record_expect_symbol(sig, symbol);
    }

    pub fn record_actual_symbol(&mut self, sig: Signature, symbol: SymbolID) {
        self.expect_actual.record_actual_symbol(sig, symbol);
    }

    pub fn expect_actual(&self) -> &ExpectActualTable {
        &self.expect_actual
    }

    pub fn enqueue_fake_override_class(&mut self, class: DeclID) {
        debug_assert!(self.decls.get(class).is_class());
        self.fake_override_queue.push(class);
    }

    pub fn pending_fake_overrides(&self) -> usize {
        self.fake_override_queue.len()
    }

    pub fn module_name(&self, module: ModuleID) -> String {
        self.modules.name(module, &self.atoms).to_string()
    }

    pub fn symbol_name(&self, symbol: SymbolID) -> String {
        let s = self.symbols.get(symbol);
        match s.signature {
            Some(sig) => sig.display(&self.atoms).to_string(),
            None => format!(
                "<private {} #{} in {}>",
                s.kind.as_str(),
                symbol.as_u32(),
                self.module_name(s.module)
            ),
        }
    }
}
