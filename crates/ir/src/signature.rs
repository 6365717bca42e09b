use std::fmt;

use irlink_atom::{Atom, AtomIntern};

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SignatureFlags: u8 {
        /// Signature of an `expect` declaration or of one of its members.
        const EXPECT    = 1 << 0;
        /// Only meaningful inside its own file, never looked up across modules.
        const LOCAL     = 1 << 1;
    }
}

/// Module independent identity of a declaration.
///
/// `name` is the dotted path of the declaration inside its package, so
/// `ui/Widget.render` names the member `render` of the top level `Widget`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    package: Atom,
    name: Atom,
    hash: Option<u64>,
    flags: SignatureFlags,
}

impl Signature {
    pub const fn new(package: Atom, name: Atom) -> Self {
        Self {
            package,
            name,
            hash: None,
            flags: SignatureFlags::empty(),
        }
    }

    pub const fn with_hash(mut self, hash: u64) -> Self {
        self.hash = Some(hash);
        self
    }

    pub fn with_flags(mut self, flags: SignatureFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline(always)]
    pub const fn package(&self) -> Atom {
        self.package
    }

    #[inline(always)]
    pub const fn name(&self) -> Atom {
        self.name
    }

    #[inline(always)]
    pub const fn hash(&self) -> Option<u64> {
        self.hash
    }

    #[inline(always)]
    pub const fn flags(&self) -> SignatureFlags {
        self.flags
    }

    pub const fn is_public(&self) -> bool {
        !self.flags.contains(SignatureFlags::LOCAL)
    }

    pub const fn is_expect(&self) -> bool {
        self.flags.contains(SignatureFlags::EXPECT)
    }

    pub fn is_top_level(&self, atoms: &AtomIntern) -> bool {
        !atoms.get(self.name).contains('.')
    }

    pub fn top_level(&self, atoms: &mut AtomIntern) -> Signature {
        let name = atoms.get(self.name);
        let Some((top, _)) = name.split_once('.') else {
            return *self;
        };
        let top = top.to_string();
        Signature {
            package: self.package,
            name: atoms.atom(&top),
            hash: None,
            flags: self.flags,
        }
    }

    /// Name of the innermost declaration, without its containers.
    pub fn short_name<'a>(&self, atoms: &'a AtomIntern) -> &'a str {
        let name = atoms.get(self.name);
        name.rsplit_once('.').map_or(name, |(_, short)| short)
    }

    pub fn nested(&self, member: &str, atoms: &mut AtomIntern) -> Signature {
        let name = format!("{}.{member}", atoms.get(self.name));
        Signature {
            package: self.package,
            name: atoms.atom(&name),
            hash: None,
            flags: self.flags,
        }
    }

    /// Parse `package/Name.member|hash`. The package may be empty, the hash
    /// is optional.
    pub fn parse(text: &str, atoms: &mut AtomIntern) -> Option<Signature> {
        let (package, rest) = text.split_once('/')?;
        let (name, hash) = match rest.split_once('|') {
            Some((name, hash)) => (name, Some(hash.parse::<u64>().ok()?)),
            None => (rest, None),
        };
        if name.is_empty() || name.split('.').any(str::is_empty) {
            return None;
        }
        let sig = Signature::new(atoms.atom(package), atoms.atom(name));
        Some(match hash {
            Some(hash) => sig.with_hash(hash),
            None => sig,
        })
    }

    pub fn display<'a>(&self, atoms: &'a AtomIntern) -> SignatureDisplay<'a> {
        SignatureDisplay { sig: *self, atoms }
    }
}

pub struct SignatureDisplay<'a> {
    sig: Signature,
    atoms: &'a AtomIntern,
}

impl fmt::Display for SignatureDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sig.is_expect() {
            write!(f, "expect ")?;
        }
        write!(
            f,
            "{}/{}",
            self.atoms.get(self.sig.package),
            self.atoms.get(self.sig.name)
        )?;
        if let Some(hash) = self.sig.hash {
            write!(f, "|{hash}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let mut atoms = AtomIntern::default();
        let sig = Signature::parse("ui/Widget.render|42", &mut atoms).unwrap();
        assert_eq!(atoms.get(sig.package()), "ui");
        assert_eq!(atoms.get(sig.name()), "Widget.render");
        assert_eq!(sig.hash(), Some(42));
        assert_eq!(sig.display(&atoms).to_string(), "ui/Widget.render|42");

        let expect = sig.with_flags(SignatureFlags::EXPECT);
        assert_ne!(sig, expect);
        assert_eq!(
            expect.display(&atoms).to_string(),
            "expect ui/Widget.render|42"
        );

        assert!(Signature::parse("Widget", &mut atoms).is_none());
        assert!(Signature::parse("ui/", &mut atoms).is_none());
        assert!(Signature::parse("ui/A..b", &mut atoms).is_none());
        assert!(Signature::parse("ui/A|x", &mut atoms).is_none());
    }

    #[test]
    fn test_top_level_and_nested() {
        let mut atoms = AtomIntern::default();
        let widget = Signature::parse("ui/Widget", &mut atoms)
            .unwrap()
            .with_flags(SignatureFlags::EXPECT);
        let render = widget.nested("render", &mut atoms);
        assert!(render.is_expect());
        assert!(!render.is_top_level(&atoms));
        assert_eq!(render.short_name(&atoms), "render");
        assert_eq!(render.top_level(&mut atoms), widget);
        assert_eq!(widget.top_level(&mut atoms), widget);
    }
}
