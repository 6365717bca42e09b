use irlink_atom::{Atom, AtomIntern};
use irlink_utils::FxIndexSet;

irlink_utils::index!(ModuleID);

#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    pub id: ModuleID,
    pub name: Atom,
    dependencies: Vec<ModuleID>,
}

impl ModuleDescriptor {
    /// Direct dependencies, in declaration order.
    pub fn dependencies(&self) -> &[ModuleID] {
        &self.dependencies
    }
}

#[derive(Debug, Default)]
pub struct ModuleArena {
    modules: Vec<ModuleDescriptor>,
}

impl ModuleArena {
    pub fn new() -> Self {
        Self {
            modules: Vec::with_capacity(64),
        }
    }

    pub fn new_module(&mut self, name: Atom, dependencies: Vec<ModuleID>) -> ModuleID {
        let id = ModuleID(self.modules.len() as u32);
        debug_assert!(dependencies.iter().all(|dep| *dep != id));
        self.modules.push(ModuleDescriptor {
            id,
            name,
            dependencies,
        });
        id
    }

    pub fn get_module(&self, id: ModuleID) -> &ModuleDescriptor {
        &self.modules[id.as_usize()]
    }

    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    pub fn find_by_name(&self, name: Atom) -> Option<ModuleID> {
        self.modules.iter().find(|m| m.name == name).map(|m| m.id)
    }

    pub fn name<'a>(&self, id: ModuleID, atoms: &'a AtomIntern) -> &'a str {
        atoms.get(self.get_module(id).name)
    }

    /// Transitive dependencies of `id`, nearest first. `id` itself is
    /// never part of the result, even inside a dependency cycle.
    pub fn all_dependency_modules(&self, id: ModuleID) -> Vec<ModuleID> {
        let mut seen = FxIndexSet::default();
        let mut stack = self.get_module(id).dependencies.clone();
        stack.reverse();
        while let Some(dep) = stack.pop() {
            if dep == id || !seen.insert(dep) {
                continue;
            }
            let deps = &self.get_module(dep).dependencies;
            stack.extend(deps.iter().rev());
        }
        seen.into_iter().collect()
    }
}
