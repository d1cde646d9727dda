use owo_colors::OwoColorize;
use std::fmt;

/// A byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl From<chumsky::span::SimpleSpan> for Span {
    fn from(span: chumsky::span::SimpleSpan) -> Self {
        Span::new(span.start, span.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A message attached to a span of the source.
#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<String>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, message)
    }

    fn with_severity(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.notes.push(format!("help: {}", help.into()));
        self
    }
}

/// 1-based line and column (in chars) of a byte offset.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

fn line_text(source: &str, line_num: usize) -> Option<&str> {
    source.split('\n').nth(line_num - 1).map(|l| l.trim_end_matches('\r'))
}

/// Renders diagnostics in the familiar rustc layout.
pub struct DiagnosticRenderer<'a> {
    source: &'a str,
    file_name: &'a str,
    use_color: bool,
}

impl<'a> DiagnosticRenderer<'a> {
    pub fn new(source: &'a str, file_name: &'a str, use_color: bool) -> Self {
        Self {
            source,
            file_name,
            use_color,
        }
    }

    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();
        self.render_header(&mut output, diagnostic);

        if let Some(label) = diagnostic.labels.first() {
            let (line, col) = line_col(self.source, label.span.start);
            let gutter_width = line.to_string().len() + 1;
            let gutter = " ".repeat(gutter_width);

            output.push_str(&format!(
                "{}{} {}:{}:{}\n",
                " ".repeat(gutter_width - 1),
                self.accent("-->"),
                self.file_name,
                line,
                col
            ));
            output.push_str(&format!("{} {}\n", gutter, self.accent("|")));

            for label in &diagnostic.labels {
                self.render_label(&mut output, label, gutter_width);
            }

            output.push_str(&format!("{} {}\n", gutter, self.accent("|")));
        }

        for note in &diagnostic.notes {
            output.push_str(&format!("  {} {}\n", self.accent("="), note));
        }

        output
    }

    fn render_header(&self, output: &mut String, diagnostic: &Diagnostic) {
        let severity = match diagnostic.severity {
            Severity::Error => self.paint(&diagnostic.severity.to_string(), |s| {
                s.red().bold().to_string()
            }),
            Severity::Warning => self.paint(&diagnostic.severity.to_string(), |s| {
                s.yellow().bold().to_string()
            }),
        };
        let message = self.paint(&diagnostic.message, |s| s.bold().to_string());

        match &diagnostic.code {
            Some(code) => output.push_str(&format!("{}[{}]: {}\n", severity, code, message)),
            None => output.push_str(&format!("{}: {}\n", severity, message)),
        }
    }

    fn render_label(&self, output: &mut String, label: &Label, gutter_width: usize) {
        let (line_num, start_col) = line_col(self.source, label.span.start);
        let Some(text) = line_text(self.source, line_num) else {
            return;
        };

        output.push_str(&format!(
            "{:>width$} {} {}\n",
            self.accent(&line_num.to_string()),
            self.accent("|"),
            text,
            width = gutter_width
        ));

        // Underlines stop at the end of the first line of a multi-line span.
        let line_chars = text.chars().count();
        let (end_line, end_col) = line_col(self.source, label.span.end);
        let last_col = if end_line == line_num { end_col } else { line_chars + 1 };
        let width = last_col.saturating_sub(start_col).max(1);

        let mut underline = " ".repeat(start_col - 1);
        underline.push_str(&"^".repeat(width));
        if !label.message.is_empty() {
            underline.push(' ');
            underline.push_str(&label.message);
        }

        output.push_str(&format!(
            "{} {} {}\n",
            " ".repeat(gutter_width),
            self.accent("|"),
            self.paint(&underline, |s| s.red().to_string())
        ));
    }

    fn accent(&self, s: &str) -> String {
        self.paint(s, |s| s.blue().to_string())
    }

    fn paint(&self, s: &str, style: impl Fn(&str) -> String) -> String {
        if self.use_color {
            style(s)
        } else {
            s.to_string()
        }
    }
}

/// Renders every diagnostic followed by an abort summary when errors are present.
pub fn render_diagnostics(
    source: &str,
    file_name: &str,
    diagnostics: &[Diagnostic],
    use_color: bool,
) -> String {
    let renderer = DiagnosticRenderer::new(source, file_name, use_color);
    let mut output = String::new();

    for diagnostic in diagnostics {
        output.push_str(&renderer.render(diagnostic));
        output.push('\n');
    }

    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    if error_count > 0 {
        output.push_str(&format!(
            "error: aborting due to {} error{}\n",
            error_count,
            if error_count == 1 { "" } else { "s" }
        ));
    }

    output
}
