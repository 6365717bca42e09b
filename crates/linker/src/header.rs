use irlink_ir::{ModuleFragment, ModuleID};

use crate::builtins::ModuleDeserializerWithBuiltIns;
use crate::deserializer::ModuleDeserializer;
use crate::errors::{LinkError, LinkResult};
use crate::extension::LinkerExtension;
use crate::strategy::DeserializationStrategy;
use crate::{Linker, LinkerBackend};

impl<B: LinkerBackend> Linker<B> {
    /// Register the deserializer of `module` and return its fragment. A
    /// module already registered keeps its deserializer and strategy.
    #[tracing::instrument(level = tracing::Level::TRACE, skip(self, library))]
    pub fn load_module_header(
        &mut self,
        module: ModuleID,
        library: Option<B::Library>,
        strategy: DeserializationStrategy,
    ) -> LinkResult<&ModuleFragment> {
        if !self.deserializers.contains_key(&module) {
            tracing::debug!(module = self.cx.module_name(module), ?strategy, "load header");
            let deserializer =
                self.backend
                    .create_module_deserializer(module, library, strategy, &mut self.cx)?;
            let deserializer = self.maybe_wrap_with_builtins(module, deserializer);
            self.deserializers.insert(module, deserializer);
            if self.session_initialized {
                self.init_deserializer(module)?;
            }
        }
        let deserializer =
            Self::resolve_module_deserializer(&mut self.deserializers, &self.cx, module)?;
        Ok(deserializer.module_fragment())
    }

    /// Modules listed as exported dependencies are loaded whole, everything
    /// else only through its exported declarations.
    pub fn load_module_header_default(
        &mut self,
        module: ModuleID,
        library: Option<B::Library>,
    ) -> LinkResult<&ModuleFragment> {
        let name = self.cx.module_name(module);
        let strategy = if self.cx.config().is_exported_dependency(&name) {
            DeserializationStrategy::All
        } else {
            DeserializationStrategy::ExplicitlyExported
        };
        self.load_module_header(module, library, strategy)
    }

    pub fn deserialize_full_module(
        &mut self,
        module: ModuleID,
        library: Option<B::Library>,
    ) -> LinkResult<&ModuleFragment> {
        self.load_module_header(module, library, DeserializationStrategy::All)
    }

    pub fn deserialize_only_header_module(
        &mut self,
        module: ModuleID,
        library: Option<B::Library>,
    ) -> LinkResult<&ModuleFragment> {
        self.load_module_header(module, library, DeserializationStrategy::OnlyDeclarationHeaders)
    }

    pub fn deserialize_headers_with_inline_bodies(
        &mut self,
        module: ModuleID,
        library: Option<B::Library>,
    ) -> LinkResult<&ModuleFragment> {
        self.load_module_header(module, library, DeserializationStrategy::WithInlineBodies)
    }

    fn maybe_wrap_with_builtins(
        &mut self,
        module: ModuleID,
        deserializer: Box<dyn ModuleDeserializer>,
    ) -> Box<dyn ModuleDeserializer> {
        let descriptor = self.cx.modules.get_module(module);
        if !self.backend.is_builtin_module(descriptor, &self.cx.atoms) {
            return deserializer;
        }
        tracing::debug!(module = self.cx.module_name(module), "builtins provider");
        self.cx.builtins_module = Some(module);
        Box::new(ModuleDeserializerWithBuiltIns::new(deserializer))
    }

    /// Start the session. With a fragment, the current module gets its own
    /// deserializer; every dependency of it must already be loaded. Each
    /// registered deserializer is initialized once.
    #[tracing::instrument(level = tracing::Level::TRACE, skip_all)]
    pub fn init(
        &mut self,
        fragment: Option<ModuleFragment>,
        extensions: Vec<Box<dyn LinkerExtension>>,
    ) -> LinkResult<()> {
        self.extensions = extensions;

        if let Some(fragment) = fragment {
            let module = fragment.module;
            let dependencies = self.cx.modules.all_dependency_modules(module);
            if let Some(missing) = dependencies
                .iter()
                .find(|dep| !self.deserializers.contains_key(*dep))
            {
                return Err(LinkError::NoModuleDeserializer {
                    module: self.cx.module_name(*missing),
                });
            }
            tracing::debug!(
                module = self.cx.module_name(module),
                dependencies = dependencies.len(),
                "current module"
            );
            let deserializer = self
                .backend
                .create_current_module_deserializer(fragment, dependencies);
            let deserializer = self.maybe_wrap_with_builtins(module, deserializer);
            self.deserializers.insert(module, deserializer);
            self.initialized.remove(&module);
            self.current_module = Some(module);
        }

        let modules: Vec<_> = self.deserializers.keys().copied().collect();
        for module in modules {
            self.init_deserializer(module)?;
        }
        self.session_initialized = true;
        Ok(())
    }

    fn init_deserializer(&mut self, module: ModuleID) -> LinkResult<()> {
        if !self.initialized.insert(module) {
            return Ok(());
        }
        let deserializer =
            Self::resolve_module_deserializer(&mut self.deserializers, &self.cx, module)?;
        deserializer.init(&mut self.cx)
    }
}
