use rustc_hash::FxHashMap;

use crate::decl::DeclID;
use crate::module::ModuleID;
use crate::signature::Signature;

irlink_utils::index!(SymbolID);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Class,
    EnumEntry,
    SimpleFunction,
    Constructor,
    Property,
    Field,
    TypeAlias,
    TypeParameter,
}

impl SymbolKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "class" => SymbolKind::Class,
            "entry" => SymbolKind::EnumEntry,
            "fun" => SymbolKind::SimpleFunction,
            "ctor" => SymbolKind::Constructor,
            "property" => SymbolKind::Property,
            "field" => SymbolKind::Field,
            "typealias" => SymbolKind::TypeAlias,
            "typeparam" => SymbolKind::TypeParameter,
            _ => return None,
        };
        Some(kind)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::EnumEntry => "entry",
            SymbolKind::SimpleFunction => "fun",
            SymbolKind::Constructor => "ctor",
            SymbolKind::Property => "property",
            SymbolKind::Field => "field",
            SymbolKind::TypeAlias => "typealias",
            SymbolKind::TypeParameter => "typeparam",
        }
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SymbolFlags: u8 {
        const EXPECT_MEMBER         = 1 << 0;
        /// Nested somewhere under an `expect` declaration.
        const IN_EXPECT_CONTAINER   = 1 << 1;
        const FAKE_OVERRIDE         = 1 << 2;
        /// Created by the compiler itself and owned by no library.
        const WRAPPED               = 1 << 3;
    }
}

/// Placeholder created for an `expect` declaration. The slot is empty until
/// the actual counterpart is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegatingSymbol {
    Class(Option<SymbolID>),
    EnumEntry(Option<SymbolID>),
    SimpleFunction(Option<SymbolID>),
    Constructor(Option<SymbolID>),
    Property(Option<SymbolID>),
}

impl DelegatingSymbol {
    pub fn new(kind: SymbolKind) -> Option<Self> {
        let d = match kind {
            SymbolKind::Class => DelegatingSymbol::Class(None),
            SymbolKind::EnumEntry => DelegatingSymbol::EnumEntry(None),
            SymbolKind::SimpleFunction => DelegatingSymbol::SimpleFunction(None),
            SymbolKind::Constructor => DelegatingSymbol::Constructor(None),
            SymbolKind::Property => DelegatingSymbol::Property(None),
            _ => return None,
        };
        Some(d)
    }

    pub fn delegate(&self) -> Option<SymbolID> {
        use DelegatingSymbol::*;
        match self {
            Class(d) | EnumEntry(d) | SimpleFunction(d) | Constructor(d) | Property(d) => *d,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            DelegatingSymbol::Class(_) => SymbolKind::Class,
            DelegatingSymbol::EnumEntry(_) => SymbolKind::EnumEntry,
            DelegatingSymbol::SimpleFunction(_) => SymbolKind::SimpleFunction,
            DelegatingSymbol::Constructor(_) => SymbolKind::Constructor,
            DelegatingSymbol::Property(_) => SymbolKind::Property,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolRepr {
    Plain,
    Delegating(DelegatingSymbol),
}

#[derive(Debug)]
pub struct Symbol {
    pub signature: Option<Signature>,
    pub kind: SymbolKind,
    pub module: ModuleID,
    pub flags: SymbolFlags,
    owner: Option<DeclID>,
    repr: SymbolRepr,
}

impl Symbol {
    pub fn is_public_api(&self) -> bool {
        self.signature.is_some_and(|sig| sig.is_public())
    }

    pub fn repr(&self) -> &SymbolRepr {
        &self.repr
    }

    pub fn as_delegating(&self) -> Option<&DelegatingSymbol> {
        match &self.repr {
            SymbolRepr::Delegating(d) => Some(d),
            SymbolRepr::Plain => None,
        }
    }

    /// The declaration bound to this very symbol, ignoring any delegate.
    pub fn own_owner(&self) -> Option<DeclID> {
        self.owner
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetargetError {
    NotDelegating,
    KindMismatch {
        expect: SymbolKind,
        actual: SymbolKind,
    },
}

pub struct SymbolTable {
    symbols: Vec<Symbol>,
    public: FxHashMap<Signature, SymbolID>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            symbols: Vec::with_capacity(1024),
            public: irlink_utils::fx_hashmap_with_capacity(1024),
        }
    }

    fn push(&mut self, symbol: Symbol) -> SymbolID {
        let id = SymbolID(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    /// Get or create the symbol of a public signature. Expect signatures
    /// of a delegatable kind get a delegating symbol.
    pub fn reference(&mut self, sig: Signature, kind: SymbolKind, module: ModuleID) -> SymbolID {
        debug_assert!(sig.is_public());
        if let Some(id) = self.public.get(&sig) {
            debug_assert_eq!(self.get(*id).module, module);
            return *id;
        }
        let (flags, repr) = if sig.is_expect() {
            let repr = DelegatingSymbol::new(kind).map_or(SymbolRepr::Plain, SymbolRepr::Delegating);
            (SymbolFlags::EXPECT_MEMBER, repr)
        } else {
            (SymbolFlags::empty(), SymbolRepr::Plain)
        };
        let id = self.push(Symbol {
            signature: Some(sig),
            kind,
            module,
            flags,
            owner: None,
            repr,
        });
        self.public.insert(sig, id);
        id
    }

    /// A symbol outside of the cross-module namespace.
    pub fn new_private(
        &mut self,
        sig: Option<Signature>,
        kind: SymbolKind,
        module: ModuleID,
        flags: SymbolFlags,
    ) -> SymbolID {
        debug_assert!(sig.is_none_or(|sig| !sig.is_public()));
        self.push(Symbol {
            signature: sig,
            kind,
            module,
            flags,
            owner: None,
            repr: SymbolRepr::Plain,
        })
    }

    #[inline]
    pub fn get(&self, id: SymbolID) -> &Symbol {
        &self.symbols[id.as_usize()]
    }

    pub fn add_flags(&mut self, id: SymbolID, flags: SymbolFlags) {
        self.symbols[id.as_usize()].flags |= flags;
    }

    pub fn by_signature(&self, sig: &Signature) -> Option<SymbolID> {
        self.public.get(sig).copied()
    }

    /// Owner of the symbol. A delegating symbol whose delegate has been
    /// assigned answers with the delegate's owner.
    pub fn owner(&self, id: SymbolID) -> Option<DeclID> {
        let s = self.get(id);
        if let SymbolRepr::Delegating(d) = &s.repr {
            if let Some(delegate) = d.delegate() {
                return self.owner(delegate);
            }
        }
        s.owner
    }

    #[inline]
    pub fn is_bound(&self, id: SymbolID) -> bool {
        self.owner(id).is_some()
    }

    #[track_caller]
    pub fn bind(&mut self, id: SymbolID, decl: DeclID) {
        let s = &mut self.symbols[id.as_usize()];
        match s.owner {
            Some(prev) => assert_eq!(prev, decl, "{id:?} is already bound to {prev:?}"),
            None => s.owner = Some(decl),
        }
    }

    /// Point the delegating `expect` symbol at `actual`. Assigning the same
    /// delegate again is a no-op.
    pub fn retarget(&mut self, expect: SymbolID, actual: SymbolID) -> Result<(), RetargetError> {
        let actual_kind = self.get(actual).kind;
        let s = &mut self.symbols[expect.as_usize()];
        let slot = match (&mut s.repr, actual_kind) {
            (SymbolRepr::Delegating(DelegatingSymbol::Class(slot)), SymbolKind::Class)
            | (SymbolRepr::Delegating(DelegatingSymbol::EnumEntry(slot)), SymbolKind::EnumEntry)
            | (
                SymbolRepr::Delegating(DelegatingSymbol::SimpleFunction(slot)),
                SymbolKind::SimpleFunction,
            )
            | (
                SymbolRepr::Delegating(DelegatingSymbol::Constructor(slot)),
                SymbolKind::Constructor,
            )
            | (SymbolRepr::Delegating(DelegatingSymbol::Property(slot)), SymbolKind::Property) => {
                slot
            }
            (SymbolRepr::Delegating(d), actual) => {
                return Err(RetargetError::KindMismatch {
                    expect: d.kind(),
                    actual,
                });
            }
            (SymbolRepr::Plain, _) => return Err(RetargetError::NotDelegating),
        };
        if let Some(prev) = *slot {
            assert_eq!(prev, actual, "{expect:?} already delegates to {prev:?}");
        } else {
            *slot = Some(actual);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolID, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(idx, s)| (SymbolID(idx as u32), s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Decl, Decls, ModuleArena, SignatureFlags};
    use irlink_atom::AtomIntern;

    struct Fixture {
        atoms: AtomIntern,
        module: ModuleID,
        symbols: SymbolTable,
        decls: Decls,
    }

    fn fixture() -> Fixture {
        let mut atoms = AtomIntern::default();
        let mut modules = ModuleArena::new();
        let module = modules.new_module(atoms.atom("m"), vec![]);
        Fixture {
            atoms,
            module,
            symbols: SymbolTable::new(),
            decls: Decls::default(),
        }
    }

    impl Fixture {
        fn sig(&mut self, text: &str) -> Signature {
            Signature::parse(text, &mut self.atoms).unwrap()
        }

        fn declare(&mut self, symbol: SymbolID) -> DeclID {
            let s = self.symbols.get(symbol);
            let name = s.signature.unwrap().name();
            let decl = Decl::new(symbol, name, s.kind, s.module);
            let decl = self.decls.alloc(decl);
            self.symbols.bind(symbol, decl);
            decl
        }
    }

    #[test]
    fn test_reference_is_unique_per_signature() {
        let mut f = fixture();
        let sig = f.sig("a/A");
        let a = f.symbols.reference(sig, SymbolKind::Class, f.module);
        let b = f.symbols.reference(sig, SymbolKind::Class, f.module);
        assert_eq!(a, b);
        assert_eq!(f.symbols.by_signature(&sig), Some(a));
        assert!(f.symbols.get(a).is_public_api());
        assert_eq!(f.symbols.get(a).repr(), &SymbolRepr::Plain);
    }

    #[test]
    fn test_binding_is_monotonic() {
        let mut f = fixture();
        let sig = f.sig("a/A");
        let a = f.symbols.reference(sig, SymbolKind::Class, f.module);
        assert!(!f.symbols.is_bound(a));
        let decl = f.declare(a);
        assert_eq!(f.symbols.owner(a), Some(decl));
        f.symbols.bind(a, decl);
        assert_eq!(f.symbols.owner(a), Some(decl));
    }

    #[test]
    #[should_panic(expected = "already bound")]
    fn test_rebinding_panics() {
        let mut f = fixture();
        let sig = f.sig("a/A");
        let a = f.symbols.reference(sig, SymbolKind::Class, f.module);
        f.declare(a);
        let other = f.decls.alloc(Decl::new(a, sig.name(), SymbolKind::Class, f.module));
        f.symbols.bind(a, other);
    }

    #[test]
    fn test_retarget_follows_delegate() {
        let mut f = fixture();
        let expect_sig = f.sig("ui/Widget").with_flags(SignatureFlags::EXPECT);
        let actual_sig = f.sig("ui/Widget");
        let expect = f.symbols.reference(expect_sig, SymbolKind::Class, f.module);
        let actual = f.symbols.reference(actual_sig, SymbolKind::Class, f.module);
        assert!(f.symbols.get(expect).flags.contains(SymbolFlags::EXPECT_MEMBER));
        assert_eq!(
            f.symbols.get(expect).as_delegating(),
            Some(&DelegatingSymbol::Class(None))
        );

        let decl = f.declare(actual);
        assert!(!f.symbols.is_bound(expect));
        f.symbols.retarget(expect, actual).unwrap();
        assert_eq!(f.symbols.owner(expect), Some(decl));
        assert_eq!(
            f.symbols.get(expect).as_delegating().and_then(|d| d.delegate()),
            Some(actual)
        );
        // the same delegate again is accepted
        f.symbols.retarget(expect, actual).unwrap();
    }

    #[test]
    fn test_retarget_kind_mismatch() {
        let mut f = fixture();
        let expect_sig = f.sig("ui/Widget").with_flags(SignatureFlags::EXPECT);
        let actual_sig = f.sig("ui/Widget");
        let expect = f.symbols.reference(expect_sig, SymbolKind::Class, f.module);
        let actual = f.symbols.reference(actual_sig, SymbolKind::SimpleFunction, f.module);
        assert_eq!(
            f.symbols.retarget(expect, actual),
            Err(RetargetError::KindMismatch {
                expect: SymbolKind::Class,
                actual: SymbolKind::SimpleFunction
            })
        );

        let field_sig = f.sig("ui/counter").with_flags(SignatureFlags::EXPECT);
        let field = f.symbols.reference(field_sig, SymbolKind::Field, f.module);
        assert_eq!(
            f.symbols.retarget(field, actual),
            Err(RetargetError::NotDelegating)
        );
    }
}
