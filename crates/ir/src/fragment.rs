use irlink_atom::Atom;

use crate::decl::DeclID;
use crate::module::ModuleID;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrFile {
    pub name: Atom,
    pub package: Atom,
    pub declarations: Vec<DeclID>,
}

/// Root container of one module. Files are created together with the
/// module header, their declarations are filled in as they get
/// materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFragment {
    pub module: ModuleID,
    pub files: Vec<IrFile>,
}

impl ModuleFragment {
    pub fn new(module: ModuleID) -> Self {
        Self {
            module,
            files: Vec::new(),
        }
    }

    pub fn add_file(&mut self, name: Atom, package: Atom) -> usize {
        let idx = self.files.len();
        self.files.push(IrFile {
            name,
            package,
            declarations: Vec::new(),
        });
        idx
    }

    pub fn declarations(&self) -> impl Iterator<Item = DeclID> + '_ {
        self.files.iter().flat_map(|f| f.declarations.iter().copied())
    }
}
