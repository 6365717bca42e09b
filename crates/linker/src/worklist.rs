use irlink_ir::ModuleID;
use irlink_utils::FxIndexSet;

use crate::errors::LinkResult;
use crate::{Linker, LinkerBackend};

/// Modules whose deserializer holds reachable but not yet materialized top
/// levels. Transient: empty whenever no drain is running.
#[derive(Debug, Default)]
pub struct ReachabilityWorklist {
    modules: FxIndexSet<ModuleID>,
}

impl ReachabilityWorklist {
    pub fn insert(&mut self, module: ModuleID) -> bool {
        self.modules.insert(module)
    }

    pub fn pop(&mut self) -> Option<ModuleID> {
        self.modules.shift_remove_index(0)
    }

    pub fn contains(&self, module: ModuleID) -> bool {
        self.modules.contains(&module)
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }
}

impl<B: LinkerBackend> Linker<B> {
    /// Drain every module with reachable top levels until nothing new shows
    /// up. Deserializers may enqueue their own or other modules while being
    /// drained; each signature is queued at most once per module, so the
    /// loop ends.
    #[tracing::instrument(level = tracing::Level::TRACE, skip_all)]
    pub fn deserialize_all_reachable_top_levels(&mut self) -> LinkResult<()> {
        loop {
            self.route_pending_references()?;
            let Some(module) = self.cx.worklist.pop() else {
                break;
            };
            tracing::trace!(module = self.cx.module_name(module), "deserialize reachable");
            let deserializer =
                Self::resolve_module_deserializer(&mut self.deserializers, &self.cx, module)?;
            deserializer.deserialize_reachable_declarations(&mut self.cx)?;
        }
        debug_assert!(!self.cx.has_pending_work());
        Ok(())
    }

    fn route_pending_references(&mut self) -> LinkResult<()> {
        while let Some(symbol) = self.cx.take_pending_reference() {
            if self.cx.symbols.is_bound(symbol) {
                continue;
            }
            let module = self.cx.symbols.get(symbol).module;
            let deserializer =
                Self::resolve_module_deserializer(&mut self.deserializers, &self.cx, module)?;
            deserializer.declare_ir_symbol(symbol, &mut self.cx)?;
        }
        Ok(())
    }
}

#[test]
fn test_worklist_is_a_fifo_set() {
    let mut atoms = irlink_atom::AtomIntern::default();
    let mut arena = irlink_ir::ModuleArena::new();
    let a = arena.new_module(atoms.atom("a"), vec![]);
    let b = arena.new_module(atoms.atom("b"), vec![]);

    let mut worklist = ReachabilityWorklist::default();
    assert!(worklist.insert(a));
    assert!(worklist.insert(b));
    assert!(!worklist.insert(a));
    assert_eq!(worklist.len(), 2);
    assert!(worklist.contains(b));
    assert_eq!(worklist.pop(), Some(a));
    assert_eq!(worklist.pop(), Some(b));
    assert_eq!(worklist.pop(), None);
    assert!(worklist.is_empty());
}
