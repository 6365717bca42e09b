macro_rules! normalized_option {
    ($s: ident, $(($option: ident, $ty: ty)),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub struct $s {
            $(pub(super) $option: $ty,)*
        }
        impl $s {
            $(pub fn $option(&self) -> & $ty {
                &self.$option
            })*
        }
    };
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LinkerFlags: u8 {
        /// Fake overrides are read from libraries instead of being synthesized.
        const DESERIALIZE_FAKE_OVERRIDES    = 1 << 0;
        /// Expect declarations are recorded but never materialized.
        const SKIP_EXPECTS                  = 1 << 1;
        const REPORT_UNBOUND_SYMBOLS        = 1 << 2;
    }
}

normalized_option!(
    NormalizedLinkerConfig,
    (exported_dependencies, Vec<String>),
    (flags, LinkerFlags),
);

impl NormalizedLinkerConfig {
    #[inline(always)]
    pub const fn deserialize_fake_overrides(&self) -> bool {
        self.flags.contains(LinkerFlags::DESERIALIZE_FAKE_OVERRIDES)
    }

    #[inline(always)]
    pub const fn skip_expects(&self) -> bool {
        self.flags.contains(LinkerFlags::SKIP_EXPECTS)
    }

    #[inline(always)]
    pub const fn report_unbound_symbols(&self) -> bool {
        self.flags.contains(LinkerFlags::REPORT_UNBOUND_SYMBOLS)
    }

    pub fn is_exported_dependency(&self, module_name: &str) -> bool {
        self.exported_dependencies.iter().any(|m| m == module_name)
    }
}

impl Default for NormalizedLinkerConfig {
    fn default() -> Self {
        super::RawLinkerConfig::default().normalize()
    }
}
