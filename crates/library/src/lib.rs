mod deserializer;
mod raw;

use irlink_atom::AtomIntern;
use irlink_ir::{ModuleDescriptor, ModuleID};
use irlink_linker::{
    DeserializationStrategy, LinkCx, LinkResult, LinkerBackend, ModuleDeserializer,
};

pub use self::deserializer::LibraryModuleDeserializer;
pub use self::raw::{MemoryLibrary, RawDecl, RawExpectActual, RawFile};

/// Backend whose libraries are [`MemoryLibrary`] values.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    builtins_module: String,
    plugin_context: bool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            builtins_module: String::from("builtins"),
            plugin_context: true,
        }
    }
}

impl MemoryBackend {
    /// The module with this name provides the builtins.
    pub fn with_builtins_module(mut self, name: impl Into<String>) -> Self {
        self.builtins_module = name.into();
        self
    }

    pub fn with_plugin_context(mut self, plugin_context: bool) -> Self {
        self.plugin_context = plugin_context;
        self
    }
}

impl LinkerBackend for MemoryBackend {
    type Library = MemoryLibrary;

    fn create_module_deserializer(
        &mut self,
        module: ModuleID,
        library: Option<MemoryLibrary>,
        strategy: DeserializationStrategy,
        cx: &mut LinkCx,
    ) -> LinkResult<Box<dyn ModuleDeserializer>> {
        let library = library.unwrap_or_default();
        let deserializer = LibraryModuleDeserializer::new(module, library, strategy, cx)?;
        Ok(Box::new(deserializer))
    }

    fn is_builtin_module(&self, module: &ModuleDescriptor, atoms: &AtomIntern) -> bool {
        atoms.eq_str(module.name, &self.builtins_module)
    }

    fn has_translation_plugin_context(&self) -> bool {
        self.plugin_context
    }
}
