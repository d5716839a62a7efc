use std::{fs, io::Write, path::Path};

use crate::{
    diagnostics::Diagnostic,
    error::{InternalError, Result},
    lexer::{Scanner, TokenKind},
    parser::Parser,
    span::SourceFile,
};

#[derive(Clone, Debug)]
pub struct CheckOptions {
    /// Print the token listing before validating the program.
    pub list_tokens: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self { list_tokens: true }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CheckReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    pub fn is_success(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Writes one line per token, ending with `END_OF_INPUT` or just before the
/// first lexical error. Returns how many tokens were written.
pub fn write_token_listing(src: &str, out: &mut impl Write) -> std::io::Result<usize> {
    let mut written = 0;

    for item in Scanner::new(src) {
        let Ok(tok) = item else {
            break;
        };
        writeln!(out, "{tok}")?;
        written += 1;
        if tok.is(TokenKind::EndOfInput) {
            break;
        }
    }

    Ok(written)
}

pub fn check_source(src: &SourceFile, opts: &CheckOptions, out: &mut impl Write) -> Result<CheckReport> {
    if opts.list_tokens {
        writeln!(out, "--- token listing ---").map_err(InternalError::from)?;
        let count = write_token_listing(&src.text, out).map_err(InternalError::from)?;
        writeln!(out, "--- end of token listing ---").map_err(InternalError::from)?;
        tracing::info!(file = %src.name, tokens = count, "lexical listing written");
    }

    // The listing consumed its own scanner; validation starts from scratch.
    let report = Parser::new(Scanner::new(&src.text)).parse();
    tracing::info!(file = %src.name, success = report.is_success(), "syntax analysis done");

    Ok(CheckReport { diagnostics: report.into_diagnostics(src) })
}

pub fn check_file(path: &Path, opts: &CheckOptions, out: &mut impl Write) -> Result<CheckReport> {
    let bytes = fs::read(path).map_err(|source| InternalError::Read { path: path.to_path_buf(), source })?;
    let text = String::from_utf8(bytes)
        .map_err(|source| InternalError::Encoding { path: path.to_path_buf(), source })?;
    let src = SourceFile::new(path.display().to_string(), text);

    check_source(&src, opts, out)
}
