use std::collections::VecDeque;

use irlink_ir::{
    Decl, DeclFlags, DeclID, ModuleFragment, ModuleID, Signature, SignatureFlags, SymbolFlags,
    SymbolID, SymbolKind,
};
use irlink_linker::{DeserializationStrategy, LinkCx, LinkError, LinkResult, ModuleDeserializer};
use irlink_utils::FxIndexMap;
use rustc_hash::FxHashSet;

use crate::raw::{MemoryLibrary, RawDecl};

/// Position of a top level declaration inside the library.
#[derive(Debug, Clone, Copy)]
struct TopLevel {
    file: usize,
    index: usize,
}

/// Top levels waiting to be materialized. A signature enters at most once.
#[derive(Debug, Default)]
struct ReachableQueue {
    queue: VecDeque<Signature>,
    visited: FxHashSet<Signature>,
}

impl ReachableQueue {
    fn push(&mut self, sig: Signature, module: ModuleID, cx: &mut LinkCx) {
        if self.visited.insert(sig) {
            self.queue.push_back(sig);
            cx.enqueue_module(module);
        }
    }

    fn pop(&mut self) -> Option<Signature> {
        self.queue.pop_front()
    }
}

/// Module deserializer reading declarations out of a [`MemoryLibrary`].
pub struct LibraryModuleDeserializer {
    module: ModuleID,
    module_name: String,
    strategy: DeserializationStrategy,
    library: MemoryLibrary,
    fragment: ModuleFragment,
    top_levels: FxIndexMap<Signature, TopLevel>,
    reachable: ReachableQueue,
}

impl LibraryModuleDeserializer {
    pub fn new(
        module: ModuleID,
        library: MemoryLibrary,
        strategy: DeserializationStrategy,
        cx: &mut LinkCx,
    ) -> LinkResult<Self> {
        let module_name = cx.module_name(module);
        let mut fragment = ModuleFragment::new(module);
        let mut top_levels = FxIndexMap::default();
        for (file_idx, file) in library.files.iter().enumerate() {
            let name = cx.atoms.atom(&file.name);
            let package = cx.atoms.atom(&file.package);
            fragment.add_file(name, package);
            for (index, decl) in file.declarations.iter().enumerate() {
                if decl.name.is_empty() || decl.name.contains(['.', '/', '|']) {
                    return Err(malformed(
                        &module_name,
                        format!("invalid top level name '{}'", decl.name),
                    ));
                }
                parse_kind(&module_name, &decl.kind)?;
                // members are looked up through an unhashed container signature
                if decl.hash.is_some() && !decl.members.is_empty() {
                    return Err(malformed(
                        &module_name,
                        format!("'{}' has both a hash and members", decl.name),
                    ));
                }
                let name = cx.atoms.atom(&decl.name);
                let sig = decl_signature(Signature::new(package, name), decl);
                let prev = top_levels.insert(
                    sig,
                    TopLevel {
                        file: file_idx,
                        index,
                    },
                );
                if prev.is_some() {
                    return Err(malformed(
                        &module_name,
                        format!("'{}' is declared twice", sig.display(&cx.atoms)),
                    ));
                }
            }
        }
        Ok(Self {
            module,
            module_name,
            strategy,
            library,
            fragment,
            top_levels,
            reachable: ReachableQueue::default(),
        })
    }

    pub fn library(&self) -> &MemoryLibrary {
        &self.library
    }

    fn materialize_top_level(&mut self, sig: Signature, cx: &mut LinkCx) -> LinkResult<()> {
        let Some(&TopLevel { file, index }) = self.top_levels.get(&sig) else {
            tracing::trace!(signature = %sig.display(&cx.atoms), "not declared here");
            return Ok(());
        };
        if sig.is_public() {
            let owner = cx.owner_module(&sig);
            if owner.is_some_and(|owner| owner != self.module) {
                tracing::debug!(
                    signature = %sig.display(&cx.atoms),
                    module = self.module_name,
                    "provided by another module"
                );
                return Ok(());
            }
        }
        let raw = &self.library.files[file].declarations[index];
        let mut materializer = Materializer {
            module: self.module,
            module_name: &self.module_name,
            strategy: self.strategy,
            top_levels: &self.top_levels,
            reachable: &mut self.reachable,
            cx: &mut *cx,
        };
        if let Some(decl) = materializer.decl(raw, sig, None, false)? {
            tracing::trace!(signature = %sig.display(&cx.atoms), "materialized");
            self.fragment.files[file].declarations.push(decl);
        }
        Ok(())
    }
}

impl ModuleDeserializer for LibraryModuleDeserializer {
    fn module(&self) -> ModuleID {
        self.module
    }

    fn strategy(&self) -> DeserializationStrategy {
        self.strategy
    }

    fn init(&mut self, cx: &mut LinkCx) -> LinkResult<()> {
        for sig in self.top_levels.keys() {
            if sig.is_public() {
                cx.register_top_level(*sig, self.module);
            }
        }

        for pair in &self.library.expect_actual {
            let expect = parse_signature(&self.module_name, &pair.expect, cx)?
                .with_flags(SignatureFlags::EXPECT);
            let actual = parse_signature(&self.module_name, &pair.actual, cx)?;
            let actual_module = self.top_levels.contains_key(&actual).then_some(self.module);
            cx.record_expect_actual(expect, actual, actual_module);
        }

        let strategy = self.strategy;
        if strategy.the_whole_world() || strategy.explicitly_exported() {
            let eager: Vec<_> = self
                .top_levels
                .iter()
                .filter(|(_, top)| {
                    strategy.the_whole_world()
                        || self.library.files[top.file].declarations[top.index].exported
                })
                .map(|(sig, _)| *sig)
                .collect();
            tracing::debug!(
                module = self.module_name,
                ?strategy,
                count = eager.len(),
                "eager top levels"
            );
            for sig in eager {
                self.reachable.push(sig, self.module, cx);
            }
        }
        Ok(())
    }

    fn declare_ir_symbol(&mut self, symbol: SymbolID, cx: &mut LinkCx) -> LinkResult<()> {
        let Some(sig) = cx.symbols.get(symbol).signature else {
            return Ok(());
        };
        let top = sig.top_level(&mut cx.atoms);
        if self.top_levels.contains_key(&top) {
            self.reachable.push(top, self.module, cx);
        } else {
            tracing::trace!(signature = %sig.display(&cx.atoms), "not declared here");
        }
        Ok(())
    }

    fn deserialize_reachable_declarations(&mut self, cx: &mut LinkCx) -> LinkResult<()> {
        while let Some(sig) = self.reachable.pop() {
            self.materialize_top_level(sig, cx)?;
        }
        Ok(())
    }

    fn add_module_reachable_top_level(&mut self, signature: Signature, cx: &mut LinkCx) {
        let top = signature.top_level(&mut cx.atoms);
        self.reachable.push(top, self.module, cx);
    }

    fn module_fragment(&self) -> &ModuleFragment {
        &self.fragment
    }
}

/// Turns raw declarations of one top level into IR.
struct Materializer<'a> {
    module: ModuleID,
    module_name: &'a str,
    strategy: DeserializationStrategy,
    top_levels: &'a FxIndexMap<Signature, TopLevel>,
    reachable: &'a mut ReachableQueue,
    cx: &'a mut LinkCx,
}

impl Materializer<'_> {
    fn decl(
        &mut self,
        raw: &RawDecl,
        sig: Signature,
        parent: Option<DeclID>,
        in_expect: bool,
    ) -> LinkResult<Option<DeclID>> {
        let config = self.cx.config();
        if raw.fake_override && !config.deserialize_fake_overrides() {
            return Ok(None);
        }
        if (raw.expect || in_expect) && config.skip_expects() {
            return Ok(None);
        }

        let kind = parse_kind(self.module_name, &raw.kind)?;
        let mut symbol_flags = SymbolFlags::empty();
        if raw.fake_override {
            symbol_flags |= SymbolFlags::FAKE_OVERRIDE;
        }
        if in_expect {
            symbol_flags |= SymbolFlags::IN_EXPECT_CONTAINER;
        }
        let symbol = if sig.is_public() {
            let symbol = self.cx.symbols.reference(sig, kind, self.module);
            self.cx.symbols.add_flags(symbol, symbol_flags);
            symbol
        } else {
            self.cx
                .symbols
                .new_private(Some(sig), kind, self.module, symbol_flags)
        };
        if self.cx.symbols.get(symbol).own_owner().is_some() {
            tracing::trace!(symbol = self.cx.symbol_name(symbol), "already declared");
            return Ok(None);
        }
        if sig.is_expect() {
            self.cx.record_expect_symbol(sig, symbol);
        }
        if raw.actual {
            self.cx.record_actual_symbol(sig, symbol);
        }

        let mut flags = DeclFlags::empty();
        for (set, flag) in [
            (raw.expect, DeclFlags::EXPECT),
            (raw.actual, DeclFlags::ACTUAL),
            (raw.fake_override, DeclFlags::FAKE_OVERRIDE),
            (raw.exported, DeclFlags::EXPORTED),
            (raw.inline, DeclFlags::INLINE),
        ] {
            if set {
                flags |= flag;
            }
        }
        let name = self.cx.atoms.atom(&raw.name);
        let id = self.cx.decls.alloc(
            Decl::new(symbol, name, kind, self.module)
                .with_parent(parent)
                .with_flags(flags),
        );
        self.cx.symbols.bind(symbol, id);

        for text in &raw.supertypes {
            let supertype = self.reference(text)?;
            self.cx.decls.get_mut(id).supertypes.push(supertype);
        }
        for text in &raw.references {
            let reference = self.reference(text)?;
            self.cx.decls.get_mut(id).references.push(reference);
        }
        if let Some(body) = &raw.body {
            if self.strategy.need_bodies() || (self.strategy.inline_bodies() && raw.inline) {
                let mut loaded = Vec::with_capacity(body.len());
                for text in body {
                    loaded.push(self.reference(text)?);
                }
                self.cx.decls.get_mut(id).body = Some(loaded);
            }
        }

        for member in &raw.members {
            if member.name.is_empty() || member.name.contains(['.', '/', '|']) {
                return Err(malformed(
                    self.module_name,
                    format!("invalid member name '{}'", member.name),
                ));
            }
            let member_sig = decl_signature(sig.nested(&member.name, &mut self.cx.atoms), member);
            if let Some(member) = self.decl(member, member_sig, Some(id), in_expect || raw.expect)? {
                self.cx.decls.get_mut(id).members.push(member);
            }
        }

        if kind == SymbolKind::Class && !self.cx.config().deserialize_fake_overrides() {
            self.cx.enqueue_fake_override_class(id);
        }
        Ok(Some(id))
    }

    /// Symbol of a referenced declaration. Top levels of this module become
    /// reachable here, others are requested from their owning module.
    fn reference(&mut self, text: &str) -> LinkResult<SymbolID> {
        let (sig, kind) = parse_reference(self.module_name, text, self.cx)?;
        let top = sig.top_level(&mut self.cx.atoms);
        if self.top_levels.contains_key(&top) {
            let symbol = self.cx.symbols.reference(sig, kind, self.module);
            if sig.is_expect() {
                self.cx.record_expect_symbol(sig, symbol);
            }
            if !self.cx.symbols.is_bound(symbol) {
                self.reachable.push(top, self.module, self.cx);
            }
            return Ok(symbol);
        }
        let symbol = self.cx.reference_symbol(sig, kind)?;
        self.cx.request_symbol(symbol);
        Ok(symbol)
    }
}

fn malformed(module: &str, message: String) -> LinkError {
    LinkError::MalformedLibrary {
        module: module.to_string(),
        message,
    }
}

fn parse_kind(module: &str, keyword: &str) -> LinkResult<SymbolKind> {
    SymbolKind::from_keyword(keyword)
        .ok_or_else(|| malformed(module, format!("unknown declaration kind '{keyword}'")))
}

fn parse_signature(module: &str, text: &str, cx: &mut LinkCx) -> LinkResult<Signature> {
    Signature::parse(text, &mut cx.atoms)
        .ok_or_else(|| malformed(module, format!("invalid signature '{text}'")))
}

/// `[expect ]<kind> package/Name.member|hash`
fn parse_reference(
    module: &str,
    text: &str,
    cx: &mut LinkCx,
) -> LinkResult<(Signature, SymbolKind)> {
    let (expect, rest) = match text.strip_prefix("expect ") {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let Some((keyword, sig)) = rest.split_once(' ') else {
        return Err(malformed(module, format!("invalid reference '{text}'")));
    };
    let kind = parse_kind(module, keyword)?;
    let sig = parse_signature(module, sig, cx)?;
    let sig = if expect {
        sig.with_flags(SignatureFlags::EXPECT)
    } else {
        sig
    };
    Ok((sig, kind))
}

fn decl_signature(sig: Signature, raw: &RawDecl) -> Signature {
    let sig = match raw.hash {
        Some(hash) => sig.with_hash(hash),
        None => sig,
    };
    let mut flags = SignatureFlags::empty();
    if raw.expect {
        flags |= SignatureFlags::EXPECT;
    }
    if raw.local {
        flags |= SignatureFlags::LOCAL;
    }
    sig.with_flags(flags)
}
