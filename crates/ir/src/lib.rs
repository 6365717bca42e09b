pub mod atoms;
mod decl;
mod fragment;
mod module;
mod signature;
mod symbol;

pub use self::decl::{Decl, DeclFlags, DeclID, Decls};
pub use self::fragment::{IrFile, ModuleFragment};
pub use self::module::{ModuleArena, ModuleDescriptor, ModuleID};
pub use self::signature::{Signature, SignatureDisplay, SignatureFlags};
pub use self::symbol::{
    DelegatingSymbol, RetargetError, Symbol, SymbolFlags, SymbolID, SymbolKind, SymbolRepr,
    SymbolTable,
};
