use irlink_atom::{Atom, AtomIntern};
use irlink_ir::atoms::{
    FUNCTION, FUNCTION_STR, INVOKE, INVOKE_STR, K_FUNCTION_STR, K_SUSPEND_FUNCTION_STR,
    PKG_BUILTINS, PKG_BUILTINS_COROUTINES, PKG_BUILTINS_REFLECT, SUSPEND_FUNCTION_STR,
};
use irlink_ir::{
    Decl, DeclFlags, DeclID, ModuleFragment, ModuleID, Signature, SymbolID, SymbolKind,
};
use rustc_hash::FxHashMap;

use crate::context::LinkCx;
use crate::deserializer::ModuleDeserializer;
use crate::errors::LinkResult;
use crate::strategy::DeserializationStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionFlavor {
    Function,
    SuspendFunction,
    KFunction,
    KSuspendFunction,
}

impl FunctionFlavor {
    const fn package(self) -> Atom {
        match self {
            FunctionFlavor::Function => PKG_BUILTINS,
            FunctionFlavor::SuspendFunction => PKG_BUILTINS_COROUTINES,
            FunctionFlavor::KFunction | FunctionFlavor::KSuspendFunction => PKG_BUILTINS_REFLECT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionTypeKey {
    pub flavor: FunctionFlavor,
    pub arity: u32,
}

/// Recognize `Function2`, `SuspendFunction0`, `KFunction1`, ... in their
/// builtin packages. Only top level signatures qualify.
pub fn function_type_of(sig: &Signature, atoms: &AtomIntern) -> Option<FunctionTypeKey> {
    let name = atoms.get(sig.name());
    // longest prefixes first, `Function` is a suffix of the others
    const PREFIXES: &[(&str, FunctionFlavor)] = &[
        (K_SUSPEND_FUNCTION_STR, FunctionFlavor::KSuspendFunction),
        (SUSPEND_FUNCTION_STR, FunctionFlavor::SuspendFunction),
        (K_FUNCTION_STR, FunctionFlavor::KFunction),
        (FUNCTION_STR, FunctionFlavor::Function),
    ];
    let (flavor, digits) = PREFIXES
        .iter()
        .find_map(|(prefix, flavor)| name.strip_prefix(prefix).map(|rest| (*flavor, rest)))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let arity = digits.parse::<u32>().ok()?;
    (sig.package() == flavor.package() && !sig.is_expect())
        .then_some(FunctionTypeKey { flavor, arity })
}

/// Synthesizes function interfaces, which no library serializes.
#[derive(Debug, Default)]
pub struct FunctionTypeFactory {
    classes: FxHashMap<FunctionTypeKey, DeclID>,
}

impl FunctionTypeFactory {
    pub fn function_class(
        &mut self,
        key: FunctionTypeKey,
        sig: Signature,
        module: ModuleID,
        cx: &mut LinkCx,
    ) -> DeclID {
        if let Some(class) = self.classes.get(&key) {
            return *class;
        }
        let symbol = cx.symbols.reference(sig, SymbolKind::Class, module);
        if let Some(owner) = cx.symbols.owner(symbol) {
            self.classes.insert(key, owner);
            return owner;
        }
        tracing::debug!(signature = %sig.display(&cx.atoms), "synthesize function interface");

        let flags = DeclFlags::SYNTHETIC | DeclFlags::EXPORTED;
        let class = cx.decls.alloc(
            Decl::new(symbol, sig.name(), SymbolKind::Class, module).with_flags(flags),
        );
        cx.symbols.bind(symbol, class);

        let base = Signature::new(PKG_BUILTINS, FUNCTION);
        if let Some(base_module) = cx.owner_module(&base) {
            let base = cx.symbols.reference(base, SymbolKind::Class, base_module);
            cx.decls.get_mut(class).supertypes.push(base);
            cx.request_symbol(base);
        }

        let invoke_sig = sig.nested(INVOKE_STR, &mut cx.atoms);
        let invoke_symbol = cx.symbols.reference(invoke_sig, SymbolKind::SimpleFunction, module);
        let invoke = cx.decls.alloc(
            Decl::new(invoke_symbol, INVOKE, SymbolKind::SimpleFunction, module)
                .with_parent(Some(class))
                .with_flags(flags),
        );
        cx.symbols.bind(invoke_symbol, invoke);
        cx.decls.get_mut(class).members.push(invoke);

        self.classes.insert(key, class);
        class
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Wraps the deserializer of the builtins module. Function interfaces are
/// answered by the [`FunctionTypeFactory`], everything else by the wrapped
/// deserializer.
pub struct ModuleDeserializerWithBuiltIns {
    delegate: Box<dyn ModuleDeserializer>,
    function_factory: FunctionTypeFactory,
}

impl ModuleDeserializerWithBuiltIns {
    pub fn new(delegate: Box<dyn ModuleDeserializer>) -> Self {
        Self {
            delegate,
            function_factory: FunctionTypeFactory::default(),
        }
    }

    pub fn function_factory(&self) -> &FunctionTypeFactory {
        &self.function_factory
    }

    fn try_function_type(&mut self, sig: Signature, cx: &mut LinkCx) -> Option<DeclID> {
        let top = sig.top_level(&mut cx.atoms);
        let key = function_type_of(&top, &cx.atoms)?;
        let module = self.delegate.module();
        Some(self.function_factory.function_class(key, top, module, cx))
    }
}

impl ModuleDeserializer for ModuleDeserializerWithBuiltIns {
    fn module(&self) -> ModuleID {
        self.delegate.module()
    }

    fn strategy(&self) -> DeserializationStrategy {
        self.delegate.strategy()
    }

    fn init(&mut self, cx: &mut LinkCx) -> LinkResult<()> {
        self.delegate.init(cx)
    }

    fn declare_ir_symbol(&mut self, symbol: SymbolID, cx: &mut LinkCx) -> LinkResult<()> {
        if let Some(sig) = cx.symbols.get(symbol).signature {
            if self.try_function_type(sig, cx).is_some() {
                return Ok(());
            }
        }
        self.delegate.declare_ir_symbol(symbol, cx)
    }

    fn deserialize_reachable_declarations(&mut self, cx: &mut LinkCx) -> LinkResult<()> {
        self.delegate.deserialize_reachable_declarations(cx)
    }

    fn add_module_reachable_top_level(&mut self, signature: Signature, cx: &mut LinkCx) {
        if self.try_function_type(signature, cx).is_none() {
            self.delegate.add_module_reachable_top_level(signature, cx);
        }
    }

    fn module_fragment(&self) -> &ModuleFragment {
        self.delegate.module_fragment()
    }
}
