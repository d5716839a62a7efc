use crate::span::{Position, SourceFile};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub position: Option<Position>,
    pub source: Option<SourceFile>,
}

impl Diagnostic {
    pub fn error(msg: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: msg.into(), position: None, source: None }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_source(mut self, src: SourceFile) -> Self {
        self.source = Some(src);
        self
    }

    pub fn render_human(&self) -> String {
        let sev = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        };

        let mut out = format!("{sev}: {}", self.message);

        if let (Some(src), Some(pos)) = (&self.source, self.position) {
            out.push_str(&format!("\n --> {}:{}:{}", src.name, pos.line, pos.column));
            if let Some(line) = src.line(pos.line) {
                out.push('\n');
                out.push_str(line);
                out.push('\n');
                out.push_str(&" ".repeat(pos.column.saturating_sub(1)));
                out.push('^');
            }
        }

        out
    }
}
