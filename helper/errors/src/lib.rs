pub use miette;
pub use thiserror;

#[derive(Debug)]
pub struct Diag {
    pub inner: Box<dyn miette::Diagnostic + Send + Sync + 'static>,
}

impl Diag {
    pub fn new(inner: impl miette::Diagnostic + Send + Sync + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    pub fn emit_message(self, no_color: bool) -> String {
        let mut out = String::new();
        let error_report = miette::ErrReport::new_boxed(self.inner);
        let theme = if no_color {
            miette::GraphicalTheme::unicode_nocolor()
        } else {
            miette::GraphicalTheme::unicode()
        };
        miette::GraphicalReportHandler::new_themed(theme)
            .with_width(80)
            .with_context_lines(0)
            .render_report(&mut out, error_report.as_ref())
            .expect("writing into a `String` never fails");
        out.trim_start_matches('\n').to_string()
    }

    pub fn emit(self) {
        let no_color = match std::env::var("NO_COLOR") {
            Ok(string) => string != "0",
            _ => false,
        };
        let out = self.emit_message(no_color);
        eprintln!("{out}");
    }
}
