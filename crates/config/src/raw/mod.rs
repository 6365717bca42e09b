macro_rules! with_option {
    ($s: ident, $(($option: ident, $ty: ty)),* $(,)?) => {
        #[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $s {
            $(pub(super) $option: Option<$ty>,)*
        }
        impl $s {
            paste::paste! {
                $(
                    pub fn [<with_ $option>](mut self, $option: $ty) -> Self {
                        self.$option = Some($option);
                        self
                    }
                    pub fn [<with_ $option _if_none>](mut self, $option: $ty) -> Self {
                        if self.$option.is_none() {
                            self.$option = Some($option);
                        }
                        self
                    }
                    pub fn [<config_ $option>](mut self, f: impl FnOnce($ty) -> $ty) -> Self {
                        self.$option = match self.$option {
                            Some(c) => Some(f(c)),
                            None => Some(f(Default::default())),
                        };
                        self
                    }
                )*
            }
        }
    };
}

with_option!(
    RawLinkerConfig,
    (exported_dependencies, Vec<String>),
    (deserialize_fake_overrides, bool),
    (skip_expects, bool),
    (report_unbound_symbols, bool),
);

impl RawLinkerConfig {
    pub fn normalize(self) -> super::NormalizedLinkerConfig {
        use super::LinkerFlags;
        let exported_dependencies = self.exported_dependencies.unwrap_or_default();
        let mut flags = LinkerFlags::empty();
        if self.deserialize_fake_overrides.unwrap_or_default() {
            flags |= LinkerFlags::DESERIALIZE_FAKE_OVERRIDES;
        }
        if self.skip_expects.unwrap_or(true) {
            flags |= LinkerFlags::SKIP_EXPECTS;
        }
        if self.report_unbound_symbols.unwrap_or_default() {
            flags |= LinkerFlags::REPORT_UNBOUND_SYMBOLS;
        }
        super::NormalizedLinkerConfig {
            exported_dependencies,
            flags,
        }
    }
}
