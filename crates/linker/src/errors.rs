use irlink_errors::miette;
use irlink_errors::miette::Diagnostic;
use irlink_errors::thiserror;
use irlink_errors::thiserror::Error;

pub type LinkResult<T> = Result<T, LinkError>;

/// Conditions that abort the whole link session.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("No module deserializer found for module '{module}'.")]
    #[diagnostic(
        code(link::no_module_deserializer),
        help("load the header of '{module}' before linking against it")
    )]
    NoModuleDeserializer { module: String },

    #[error("Deserializer for declaration '{signature}' is not found.")]
    #[diagnostic(code(link::declaration_not_found))]
    DeclarationNotFound { signature: String },

    #[error("Linker extension resolved '{signature}' to a declaration owned by another symbol.")]
    #[diagnostic(code(link::foreign_custom_declaration))]
    ForeignCustomDeclaration { signature: String },

    #[error(
        "Unexpected expect symbol kind during actualization of '{signature}': {expect} cannot delegate to {actual}."
    )]
    #[diagnostic(code(link::unexpected_expect_symbol_kind))]
    UnexpectedExpectSymbolKind {
        signature: String,
        expect: String,
        actual: String,
    },

    #[error("Malformed library of module '{module}': {message}")]
    #[diagnostic(code(link::malformed_library))]
    MalformedLibrary { module: String, message: String },
}

impl From<LinkError> for irlink_errors::Diag {
    fn from(err: LinkError) -> Self {
        irlink_errors::Diag::new(err)
    }
}
