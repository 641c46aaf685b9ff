//! Result line formatting and persistence.
//!
//! Templates use named placeholders `{T}`, `{E}`, `{cv}`, `{M}` and `{chi}`,
//! optionally with a precision (`{E:.6}`). `{{` and `}}` are literal braces.

use std::fmt::Write as _;
use std::path::Path;

use tracing::{error, info};

use crate::config::PhysicsConfig;
use crate::error::{MagnetoError, MagnetoResult};
use crate::statistics::PhysicsResult;

fn lookup(name: &str, result: &PhysicsResult) -> Option<f64> {
    match name {
        "T" => Some(result.temperature),
        "E" => Some(result.energy),
        "cv" => Some(result.cv),
        "M" => Some(result.magnetization),
        "chi" => Some(result.chi),
        _ => None,
    }
}

fn parse_precision(fmt_spec: &str) -> MagnetoResult<usize> {
    fmt_spec
        .strip_prefix('.')
        .and_then(|digits| digits.parse::<usize>().ok())
        .ok_or_else(|| MagnetoError::Formatting(format!("unsupported format spec ':{fmt_spec}'")))
}

/// Render one result through `template`.
pub fn format_result(template: &str, result: &PhysicsResult) -> MagnetoResult<String> {
    let mut out = String::with_capacity(template.len() + 32);
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => {
                            return Err(MagnetoError::Formatting(format!(
                                "unterminated placeholder '{{{field}'"
                            )));
                        }
                        Some(ch) => field.push(ch),
                    }
                }
                let (name, fmt_spec) = match field.split_once(':') {
                    Some((name, fmt_spec)) => (name, Some(fmt_spec)),
                    None => (field.as_str(), None),
                };
                let value = lookup(name, result).ok_or_else(|| {
                    MagnetoError::Formatting(format!("unknown placeholder '{{{name}}}'"))
                })?;
                match fmt_spec {
                    Some(fmt_spec) => {
                        let precision = parse_precision(fmt_spec)?;
                        let _ = write!(out, "{value:.precision$}");
                    }
                    None => {
                        let _ = write!(out, "{value}");
                    }
                }
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(MagnetoError::Formatting(
                    "unmatched '}' in template".to_string(),
                ));
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

/// Render every result on its own line. A result that fails to format is
/// logged and left out; the remaining lines are kept.
pub fn format_results(template: &str, results: &[PhysicsResult]) -> String {
    let mut content = String::new();
    for result in results {
        match format_result(template, result) {
            Ok(line) => {
                content.push_str(&line);
                content.push('\n');
            }
            Err(e) => error!("{e}; not writing result for T={}", result.temperature),
        }
    }
    content
}

/// Format `results` with `config.format` and write them to `config.outputfile`.
pub fn write_results(config: &PhysicsConfig, results: &[PhysicsResult]) -> MagnetoResult<()> {
    let content = format_results(&config.format, results);
    write_string_to_file(&config.outputfile, &content)?;
    info!(
        path = %config.outputfile.display(),
        n_results = results.len(),
        "results written"
    );
    Ok(())
}

fn write_string_to_file(path: &Path, content: &str) -> MagnetoResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
