#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use irlink_atom::AtomIntern;
use irlink_config::RawLinkerConfig;
use irlink_ir::{DeclID, ModuleDescriptor, ModuleFragment, ModuleID, Signature, SymbolID, SymbolKind};
use irlink_library::{MemoryBackend, MemoryLibrary};
use irlink_linker::{
    DeserializationStrategy, FakeOverrideBuilder, LinkCx, LinkResult, Linker, LinkerBackend,
    ModuleDeserializer, NoFakeOverrides,
};

pub fn library(value: serde_json::Value) -> MemoryLibrary {
    MemoryLibrary::from_value(value).unwrap()
}

/// `graph` lists modules with the names of their dependencies, which must
/// come earlier in the list.
pub fn linker_with<B: LinkerBackend>(
    config: RawLinkerConfig,
    backend: B,
    builder: Box<dyn FakeOverrideBuilder>,
    graph: &[(&str, &[&str])],
) -> Linker<B> {
    let mut linker = Linker::new(config.normalize(), backend, builder);
    let cx = linker.cx_mut();
    for (name, deps) in graph {
        let deps = deps.iter().map(|dep| cx.find_module(dep).unwrap()).collect();
        cx.new_module(name, deps);
    }
    linker
}

pub fn linker(config: RawLinkerConfig, graph: &[(&str, &[&str])]) -> Linker<MemoryBackend> {
    linker_with(
        config,
        MemoryBackend::default(),
        Box::new(NoFakeOverrides),
        graph,
    )
}

pub fn module<B: LinkerBackend>(linker: &Linker<B>, name: &str) -> ModuleID {
    linker.cx().find_module(name).unwrap()
}

pub fn sig<B: LinkerBackend>(linker: &mut Linker<B>, text: &str) -> Signature {
    let (expect, text) = match text.strip_prefix("expect ") {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let sig = Signature::parse(text, &mut linker.cx_mut().atoms).unwrap();
    if expect {
        sig.with_flags(irlink_ir::SignatureFlags::EXPECT)
    } else {
        sig
    }
}

/// Symbol of a public signature, created through the owner index.
pub fn symbol<B: LinkerBackend>(
    linker: &mut Linker<B>,
    kind: SymbolKind,
    text: &str,
) -> LinkResult<SymbolID> {
    let sig = sig(linker, text);
    linker.cx_mut().reference_symbol(sig, kind)
}

/// Symbol of a public signature placed in `module` regardless of the owner
/// index.
pub fn symbol_in<B: LinkerBackend>(
    linker: &mut Linker<B>,
    kind: SymbolKind,
    text: &str,
    module: ModuleID,
) -> SymbolID {
    let sig = sig(linker, text);
    linker.cx_mut().symbols.reference(sig, kind, module)
}

pub fn decl_name<B: LinkerBackend>(linker: &Linker<B>, decl: DeclID) -> String {
    let cx = linker.cx();
    cx.atoms.get(cx.decls.get(decl).name).to_string()
}

/// Fake override builder logging the name of every class it serves.
/// Serving a class named in `enqueue_on` enqueues the listed classes.
#[derive(Default, Clone)]
pub struct RecordingFakeOverrides {
    pub log: Rc<RefCell<Vec<String>>>,
    pub enqueue_on: Rc<RefCell<Vec<(String, DeclID)>>>,
}

impl FakeOverrideBuilder for RecordingFakeOverrides {
    fn provide_fake_overrides(&mut self, class: DeclID, cx: &mut LinkCx) {
        let name = cx.atoms.get(cx.decls.get(class).name).to_string();
        for (on, extra) in self.enqueue_on.borrow().iter() {
            if *on == name {
                cx.enqueue_fake_override_class(*extra);
            }
        }
        self.log.borrow_mut().push(name);
    }
}

/// Wraps every deserializer of a [`MemoryBackend`] to count symbol
/// declarations.
#[derive(Default)]
pub struct CountingBackend {
    inner: MemoryBackend,
    pub declared: Rc<Cell<usize>>,
}

struct CountingDeserializer {
    inner: Box<dyn ModuleDeserializer>,
    declared: Rc<Cell<usize>>,
}

impl ModuleDeserializer for CountingDeserializer {
    fn module(&self) -> ModuleID {
        self.inner.module()
    }

    fn strategy(&self) -> DeserializationStrategy {
        self.inner.strategy()
    }

    fn init(&mut self, cx: &mut LinkCx) -> LinkResult<()> {
        self.inner.init(cx)
    }

    fn declare_ir_symbol(&mut self, symbol: SymbolID, cx: &mut LinkCx) -> LinkResult<()> {
        self.declared.set(self.declared.get() + 1);
        self.inner.declare_ir_symbol(symbol, cx)
    }

    fn deserialize_reachable_declarations(&mut self, cx: &mut LinkCx) -> LinkResult<()> {
        self.inner.deserialize_reachable_declarations(cx)
    }

    fn add_module_reachable_top_level(&mut self, signature: Signature, cx: &mut LinkCx) {
        self.inner.add_module_reachable_top_level(signature, cx)
    }

    fn module_fragment(&self) -> &ModuleFragment {
        self.inner.module_fragment()
    }
}

impl LinkerBackend for CountingBackend {
    type Library = MemoryLibrary;

    fn create_module_deserializer(
        &mut self,
        module: ModuleID,
        library: Option<MemoryLibrary>,
        strategy: DeserializationStrategy,
        cx: &mut LinkCx,
    ) -> LinkResult<Box<dyn ModuleDeserializer>> {
        let inner = self
            .inner
            .create_module_deserializer(module, library, strategy, cx)?;
        Ok(Box::new(CountingDeserializer {
            inner,
            declared: self.declared.clone(),
        }))
    }

    fn is_builtin_module(&self, module: &ModuleDescriptor, atoms: &AtomIntern) -> bool {
        self.inner.is_builtin_module(module, atoms)
    }
}
