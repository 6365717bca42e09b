use irlink_ir::{ModuleID, RetargetError, Signature, SymbolID};
use irlink_utils::FxIndexMap;
use rustc_hash::FxHashMap;

use crate::errors::{LinkError, LinkResult};
use crate::{Linker, LinkerBackend};

/// Expect/actual pairs discovered while deserializing, and the symbols
/// created for either side so far.
#[derive(Debug, Default)]
pub struct ExpectActualTable {
    expect_to_actual: FxIndexMap<Signature, Signature>,
    top_level_actual_to_module: FxHashMap<Signature, ModuleID>,
    expect_symbols: FxHashMap<Signature, SymbolID>,
    actual_symbols: FxHashMap<Signature, SymbolID>,
}

impl ExpectActualTable {
    #[track_caller]
    pub fn record_mapping(
        &mut self,
        expect: Signature,
        actual: Signature,
        actual_module: Option<ModuleID>,
    ) {
        if let Some(prev) = self.expect_to_actual.insert(expect, actual) {
            assert_eq!(prev, actual, "conflicting actuals for one expect");
        }
        if let Some(module) = actual_module {
            self.top_level_actual_to_module.entry(actual).or_insert(module);
        }
    }

    pub fn record_expect_symbol(&mut self, sig: Signature, symbol: SymbolID) {
        self.expect_symbols.entry(sig).or_insert(symbol);
    }

    pub fn record_actual_symbol(&mut self, sig: Signature, symbol: SymbolID) {
        self.actual_symbols.entry(sig).or_insert(symbol);
    }

    pub fn actual_of(&self, expect: &Signature) -> Option<Signature> {
        self.expect_to_actual.get(expect).copied()
    }

    pub fn actual_module(&self, actual: &Signature) -> Option<ModuleID> {
        self.top_level_actual_to_module.get(actual).copied()
    }

    pub fn expect_symbol(&self, expect: &Signature) -> Option<SymbolID> {
        self.expect_symbols.get(expect).copied()
    }

    pub fn actual_symbol(&self, actual: &Signature) -> Option<SymbolID> {
        self.actual_symbols.get(actual).copied()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (Signature, Signature)> + '_ {
        self.expect_to_actual.iter().map(|(e, a)| (*e, *a))
    }

    pub fn len(&self) -> usize {
        self.expect_to_actual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expect_to_actual.is_empty()
    }
}

impl<B: LinkerBackend> Linker<B> {
    /// Actuals sit above their expects in the dependency order, so
    /// reachability never finds them. Force every actual whose expect was
    /// used, then point each expect symbol at its actual.
    #[tracing::instrument(level = tracing::Level::TRACE, skip_all)]
    pub(crate) fn finalize_expect_actual_linker(&mut self) -> LinkResult<()> {
        let pairs: Vec<_> = self.cx.expect_actual.pairs().collect();

        for &(expect, actual) in &pairs {
            let table = &self.cx.expect_actual;
            let Some(module) = table.actual_module(&actual) else {
                continue;
            };
            if table.expect_symbol(&expect).is_none() {
                continue;
            }
            let actual_bound = table
                .actual_symbol(&actual)
                .is_some_and(|symbol| self.cx.symbols.is_bound(symbol));
            if actual_bound {
                continue;
            }
            tracing::debug!(
                actual = %actual.display(&self.cx.atoms),
                module = self.cx.module_name(module),
                "force actual"
            );
            let deserializer =
                Self::resolve_module_deserializer(&mut self.deserializers, &self.cx, module)?;
            deserializer.add_module_reachable_top_level(actual, &mut self.cx);
            self.deserialize_all_reachable_top_levels()?;
        }

        for (expect, actual) in pairs {
            let table = &self.cx.expect_actual;
            let (Some(expect_symbol), Some(actual_symbol)) =
                (table.expect_symbol(&expect), table.actual_symbol(&actual))
            else {
                continue;
            };
            if !self.cx.symbols.is_bound(actual_symbol) {
                continue;
            }
            self.cx
                .symbols
                .retarget(expect_symbol, actual_symbol)
                .map_err(|err| {
                    let expect_repr = match err {
                        RetargetError::NotDelegating => {
                            format!("non-delegating {}", self.cx.symbols.get(expect_symbol).kind.as_str())
                        }
                        RetargetError::KindMismatch { expect: kind, .. } => kind.as_str().to_string(),
                    };
                    LinkError::UnexpectedExpectSymbolKind {
                        signature: expect.display(&self.cx.atoms).to_string(),
                        expect: expect_repr,
                        actual: self.cx.symbols.get(actual_symbol).kind.as_str().to_string(),
                    }
                })?;
        }
        Ok(())
    }
}
