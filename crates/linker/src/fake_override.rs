use irlink_ir::DeclID;

use crate::context::LinkCx;

/// Builds the fake override members of a class once all its supertypes are
/// linked.
pub trait FakeOverrideBuilder {
    fn provide_fake_overrides(&mut self, class: DeclID, cx: &mut LinkCx);
}

/// Builder used when the backend does not need fake overrides.
#[derive(Debug, Default)]
pub struct NoFakeOverrides;

impl FakeOverrideBuilder for NoFakeOverrides {
    fn provide_fake_overrides(&mut self, _: DeclID, _: &mut LinkCx) {}
}

/// Classes waiting for their fake overrides. Served last in, first out.
#[derive(Debug, Default)]
pub struct FakeOverrideQueue {
    classes: Vec<DeclID>,
}

impl FakeOverrideQueue {
    pub fn push(&mut self, class: DeclID) {
        self.classes.push(class);
    }

    pub fn pop(&mut self) -> Option<DeclID> {
        self.classes.pop()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Serve every queued class, including the ones enqueued while building.
pub(crate) fn build_all_fake_overrides(builder: &mut dyn FakeOverrideBuilder, cx: &mut LinkCx) {
    while let Some(class) = cx.fake_override_queue.pop() {
        tracing::trace!(class = cx.symbol_name(cx.decls.get(class).symbol), "fake overrides");
        builder.provide_fake_overrides(class, cx);
    }
}

#[test]
fn test_queue_is_lifo() {
    let mut decls = irlink_ir::Decls::default();
    let mut arena = irlink_ir::ModuleArena::new();
    let mut atoms = irlink_atom::AtomIntern::default();
    let module = arena.new_module(atoms.atom("m"), vec![]);
    let mut symbols = irlink_ir::SymbolTable::new();
    let mut class = |name: &str| {
        let name = atoms.atom(name);
        let sig = irlink_ir::Signature::new(name, name);
        let symbol = symbols.reference(sig, irlink_ir::SymbolKind::Class, module);
        decls.alloc(irlink_ir::Decl::new(symbol, name, irlink_ir::SymbolKind::Class, module))
    };
    let (x, y, z) = (class("X"), class("Y"), class("Z"));

    let mut queue = FakeOverrideQueue::default();
    queue.push(x);
    queue.push(y);
    queue.push(z);
    assert_eq!(queue.len(), 3);
    assert_eq!(queue.pop(), Some(z));
    assert_eq!(queue.pop(), Some(y));
    assert_eq!(queue.pop(), Some(x));
    assert!(queue.is_empty());
}
