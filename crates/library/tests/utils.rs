#![allow(dead_code)]

use irlink_config::RawLinkerConfig;
use irlink_ir::{ModuleID, Signature, SymbolKind};
use irlink_library::{MemoryBackend, MemoryLibrary};
use irlink_linker::{DeserializationStrategy, Linker, NoFakeOverrides};

/// A linker over the single module `lib` whose library is `value`.
pub fn load(
    config: RawLinkerConfig,
    value: serde_json::Value,
    strategy: DeserializationStrategy,
) -> (Linker<MemoryBackend>, ModuleID) {
    let mut linker = Linker::new(
        config.normalize(),
        MemoryBackend::default(),
        Box::new(NoFakeOverrides),
    );
    let lib = linker.cx_mut().new_module("lib", vec![]);
    let library = MemoryLibrary::from_value(value).unwrap();
    linker.load_module_header(lib, Some(library), strategy).unwrap();
    (linker, lib)
}

pub fn sig(linker: &mut Linker<MemoryBackend>, text: &str) -> Signature {
    Signature::parse(text, &mut linker.cx_mut().atoms).unwrap()
}

pub fn is_bound(linker: &mut Linker<MemoryBackend>, text: &str) -> bool {
    let sig = sig(linker, text);
    let cx = linker.cx();
    cx.symbols
        .by_signature(&sig)
        .is_some_and(|symbol| cx.symbols.is_bound(symbol))
}

pub fn body_len(linker: &mut Linker<MemoryBackend>, text: &str) -> Option<usize> {
    let sig = sig(linker, text);
    let cx = linker.cx();
    let symbol = cx.symbols.by_signature(&sig)?;
    let decl = cx.symbols.owner(symbol)?;
    cx.decls.get(decl).body.as_ref().map(Vec::len)
}

pub fn resolve(linker: &mut Linker<MemoryBackend>, kind: SymbolKind, text: &str) -> bool {
    let sig = sig(linker, text);
    let symbol = linker.cx_mut().reference_symbol(sig, kind).unwrap();
    linker.get_declaration(symbol).unwrap().is_some()
}
