mod utils;

use irlink_config::RawLinkerConfig;
use irlink_ir::{DeclFlags, SymbolKind};
use irlink_library::MemoryBackend;
use irlink_linker::{LinkError, Linker, function_type_of};
use utils::{decl_name, library, linker, module, sig, symbol};

fn session(app_body: &[&str]) -> Linker<MemoryBackend> {
    let mut linker = linker(
        RawLinkerConfig::default(),
        &[("builtins", &[]), ("app", &["builtins"])],
    );
    let builtins = serde_json::json!({
        "files": [{ "name": "builtins.kt", "package": "builtins", "declarations": [
            { "name": "Function", "kind": "class" },
            { "name": "Any", "kind": "class" }
        ]}]
    });
    let app = serde_json::json!({
        "files": [{ "name": "main.kt", "package": "app", "declarations": [
            { "name": "main", "kind": "fun", "body": app_body }
        ]}]
    });
    for (name, value) in [("builtins", builtins), ("app", app)] {
        let m = module(&linker, name);
        linker.load_module_header(m, Some(library(value)), Default::default()).unwrap();
    }
    linker.init(None, vec![]).unwrap();
    linker
}

#[test]
fn test_function_interfaces_are_synthesized() {
    let mut linker = session(&[
        "class builtins/Function2",
        "fun builtins.coroutines/SuspendFunction1.invoke",
        "class builtins/Any",
    ]);
    let main = symbol(&mut linker, SymbolKind::SimpleFunction, "app/main").unwrap();
    linker.get_declaration(main).unwrap().unwrap();

    let function2 = symbol(&mut linker, SymbolKind::Class, "builtins/Function2").unwrap();
    let class = linker.cx().symbols.owner(function2).unwrap();
    let decl = linker.cx().decls.get(class);
    assert!(decl.flags.contains(DeclFlags::SYNTHETIC));
    assert_eq!(decl.members.len(), 1);
    assert_eq!(decl_name(&linker, decl.members[0]), "invoke");
    let function = symbol(&mut linker, SymbolKind::Class, "builtins/Function").unwrap();
    assert_eq!(linker.cx().decls.get(class).supertypes, vec![function]);
    assert!(linker.cx().symbols.is_bound(function));

    let invoke = symbol(
        &mut linker,
        SymbolKind::SimpleFunction,
        "builtins.coroutines/SuspendFunction1.invoke",
    )
    .unwrap();
    let invoke = linker.cx().symbols.owner(invoke).unwrap();
    let suspend = linker.cx().decls.get(invoke).parent.unwrap();
    assert_eq!(decl_name(&linker, suspend), "SuspendFunction1");

    // regular builtins still come from the library
    let any = symbol(&mut linker, SymbolKind::Class, "builtins/Any").unwrap();
    let any = linker.cx().symbols.owner(any).unwrap();
    assert!(!linker.cx().decls.get(any).flags.contains(DeclFlags::SYNTHETIC));
}

#[test]
fn test_function_interface_is_synthesized_once() {
    let mut linker = session(&["class builtins.reflect/KFunction1"]);
    let main = symbol(&mut linker, SymbolKind::SimpleFunction, "app/main").unwrap();
    linker.get_declaration(main).unwrap().unwrap();
    let decls = linker.cx().decls.len();

    let k_function = symbol(&mut linker, SymbolKind::Class, "builtins.reflect/KFunction1").unwrap();
    let first = linker.get_declaration(k_function).unwrap();
    assert!(first.is_some());
    linker.post_process().unwrap();
    assert_eq!(linker.get_declaration(k_function).unwrap(), first);
    assert_eq!(linker.cx().decls.len(), decls);
}

#[test]
fn test_function_interface_outside_its_package_is_not_found() {
    let mut linker = session(&["class app2/Function1"]);
    let main = symbol(&mut linker, SymbolKind::SimpleFunction, "app/main").unwrap();
    let err = linker.get_declaration(main).unwrap_err();
    assert_eq!(
        err,
        LinkError::DeclarationNotFound {
            signature: "app2/Function1".to_string()
        }
    );
}

#[test]
fn test_session_atoms_keep_builtin_names_first() {
    let mut linker = linker(
        RawLinkerConfig::default(),
        &[("x", &[]), ("y", &[]), ("z", &[])],
    );
    for (lit, atom) in irlink_ir::atoms::BUILTIN_ATOMS {
        assert_eq!(linker.cx().atoms.get(*atom), *lit);
    }
    for (text, recognized) in [
        ("builtins/Function2", true),
        ("x/Function2", false),
        ("z/SuspendFunction0", false),
    ] {
        let sig = sig(&mut linker, text);
        assert_eq!(function_type_of(&sig, &linker.cx().atoms).is_some(), recognized, "{text}");
    }
}
