use irlink_atom::Atom;

use crate::module::ModuleID;
use crate::symbol::{SymbolID, SymbolKind};

irlink_utils::index!(DeclID);

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeclFlags: u8 {
        const EXPECT        = 1 << 0;
        const ACTUAL        = 1 << 1;
        const FAKE_OVERRIDE = 1 << 2;
        const EXPORTED      = 1 << 3;
        const INLINE        = 1 << 4;
        /// Created by the linker rather than read from a library.
        const SYNTHETIC     = 1 << 5;
    }
}

#[derive(Debug)]
pub struct Decl {
    pub symbol: SymbolID,
    pub name: Atom,
    pub kind: SymbolKind,
    pub module: ModuleID,
    pub parent: Option<DeclID>,
    pub flags: DeclFlags,
    pub members: Vec<DeclID>,
    pub supertypes: Vec<SymbolID>,
    /// Symbols mentioned by the declaration header.
    pub references: Vec<SymbolID>,
    /// `None` while the body has not been loaded.
    pub body: Option<Vec<SymbolID>>,
}

impl Decl {
    pub fn new(symbol: SymbolID, name: Atom, kind: SymbolKind, module: ModuleID) -> Self {
        Self {
            symbol,
            name,
            kind,
            module,
            parent: None,
            flags: DeclFlags::empty(),
            members: Vec::new(),
            supertypes: Vec::new(),
            references: Vec::new(),
            body: None,
        }
    }

    pub fn with_parent(mut self, parent: Option<DeclID>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_flags(mut self, flags: DeclFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn is_class(&self) -> bool {
        self.kind == SymbolKind::Class
    }
}

#[derive(Debug, Default)]
pub struct Decls(Vec<Decl>);

impl Decls {
    pub fn alloc(&mut self, decl: Decl) -> DeclID {
        let id = DeclID(self.0.len() as u32);
        self.0.push(decl);
        id
    }

    #[inline]
    pub fn get(&self, id: DeclID) -> &Decl {
        &self.0[id.as_usize()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: DeclID) -> &mut Decl {
        &mut self.0[id.as_usize()]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclID, &Decl)> {
        self.0
            .iter()
            .enumerate()
            .map(|(idx, decl)| (DeclID(idx as u32), decl))
    }
}
