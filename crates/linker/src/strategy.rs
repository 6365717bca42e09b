/// How much of a module is pulled in when its header is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeserializationStrategy {
    #[default]
    OnlyReferenced,
    All,
    ExplicitlyExported,
    OnlyDeclarationHeaders,
    WithInlineBodies,
}

impl DeserializationStrategy {
    pub const fn need_bodies(self) -> bool {
        matches!(
            self,
            Self::OnlyReferenced | Self::All | Self::ExplicitlyExported
        )
    }

    pub const fn explicitly_exported(self) -> bool {
        matches!(self, Self::All | Self::ExplicitlyExported)
    }

    pub const fn the_whole_world(self) -> bool {
        matches!(self, Self::All)
    }

    pub const fn inline_bodies(self) -> bool {
        !matches!(self, Self::OnlyDeclarationHeaders)
    }
}

#[test]
fn test_strategy_table() {
    use DeserializationStrategy::*;
    let table = [
        (OnlyReferenced, [true, false, false, true]),
        (All, [true, true, true, true]),
        (ExplicitlyExported, [true, true, false, true]),
        (OnlyDeclarationHeaders, [false, false, false, false]),
        (WithInlineBodies, [false, false, false, true]),
    ];
    for (strategy, expected) in table {
        let actual = [
            strategy.need_bodies(),
            strategy.explicitly_exported(),
            strategy.the_whole_world(),
            strategy.inline_bodies(),
        ];
        assert_eq!(actual, expected, "{strategy:?}");
    }
}
