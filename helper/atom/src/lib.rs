use irlink_utils::FxIndexSet;

pub use paste;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct Atom(u32);

impl Atom {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Atom(id)
    }

    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl nohash_hasher::IsEnabled for Atom {}

/// Interned strings of one link session. Declaration names, package names
/// and module names are all stored here and compared by [`Atom`].
#[derive(Debug, Default)]
pub struct AtomIntern {
    set: FxIndexSet<Box<str>>,
}

impl AtomIntern {
    pub fn prefill(list: &[&'static str]) -> Self {
        let set = FxIndexSet::from_iter(list.iter().map(|s| Box::from(*s)));
        debug_assert_eq!(set.len(), list.len(), "duplicated prefilled atom");
        Self { set }
    }

    #[track_caller]
    pub fn get(&self, atom: Atom) -> &str {
        self.set
            .get_index(atom.0 as usize)
            .unwrap_or_else(|| panic!("atom not found: {atom:?}"))
    }

    pub fn atom(&mut self, s: &str) -> Atom {
        if let Some(index) = self.set.get_index_of(s) {
            return Atom(index as u32);
        }
        let (idx, prev_is_not_exist) = self.set.insert_full(Box::from(s));
        debug_assert!(prev_is_not_exist);
        Atom(idx as u32)
    }

    pub fn lookup(&self, s: &str) -> Option<Atom> {
        self.set.get_index_of(s).map(|index| Atom(index as u32))
    }

    pub fn eq_str(&self, atom: Atom, s: &str) -> bool {
        self.get(atom) == s
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

/// Declare atoms whose index is fixed at compile time, together with the
/// function that builds an [`AtomIntern`] already holding them.
///
/// ```
/// use irlink_atom::{Atom, prefilled_atom_map};
///
/// prefilled_atom_map!(
///     init_atoms,
///     {
///         NAMES: {
///             FOO: ["foo", 0],
///             BAR: ["bar", 1],
///         },
///     }
/// );
///
/// let atoms = init_atoms();
/// assert_eq!(atoms.get(BAR), "bar");
/// ```
#[macro_export]
macro_rules! prefilled_atom_map {
    (
    $prefilled_atom_fn_name: ident,
    {
        $(
            $owner: ident: {
                $( $name:ident : [$lit:literal, $idx: literal]),* $(,)?
            },
        )+
    }) => {
        $(
            $crate::prefilled_atom_map!($owner, $(($name, [$lit, $idx])),*);
        )+

        const PREFILLED: &[&'static str] = &[
            $(
                $( $lit, )*
            )+
        ];
        pub fn $prefilled_atom_fn_name() -> $crate::AtomIntern {
            $crate::AtomIntern::prefill(PREFILLED)
        }

    };
    ( $owner: ident, $(($name:ident, [$lit:literal, $idx: literal])),* $(,)? ) => {
        $crate::paste::paste! {
            $(pub const [<$name _STR>]: &str = $lit;)*
            $(pub const $name: $crate::Atom = $crate::Atom::new($idx);)*
        }
        pub const $owner: &[(&str, $crate::Atom)] = &[$(($lit, $name),)*];
    }
}
