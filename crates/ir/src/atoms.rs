use irlink_atom::prefilled_atom_map;

prefilled_atom_map!(
    init_atom_map,
    {
        BUILTIN_ATOMS: {
            EMPTY: ["", 0],
            PKG_BUILTINS: ["builtins", 1],
            PKG_BUILTINS_COROUTINES: ["builtins.coroutines", 2],
            PKG_BUILTINS_REFLECT: ["builtins.reflect", 3],
            FUNCTION: ["Function", 4],
            SUSPEND_FUNCTION: ["SuspendFunction", 5],
            K_FUNCTION: ["KFunction", 6],
            K_SUSPEND_FUNCTION: ["KSuspendFunction", 7],
            INVOKE: ["invoke", 8],
        },
    }
);

#[test]
fn test_prefilled_atoms() {
    let atoms = init_atom_map();
    for (lit, atom) in BUILTIN_ATOMS {
        assert_eq!(atoms.get(*atom), *lit);
    }
}
