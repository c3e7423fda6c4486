use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(json: bool) {
    JSON_MODE.store(json, Ordering::Relaxed);
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{s}");
    Ok(())
}

/// `label: value` line for human output.
pub fn field(label: &str, value: impl std::fmt::Display) -> anyhow::Result<()> {
    let mut out = stdout();
    out.set_color(ColorSpec::new().set_bold(true))?;
    write!(out, "{label}:")?;
    out.reset()?;
    writeln!(out, " {value}")?;
    Ok(())
}

/// Colored verdict line, e.g. `VERIFIED ES256`.
pub fn verdict(ok: bool, detail: &str) -> anyhow::Result<()> {
    let mut out = stdout();
    let color = if ok { Color::Green } else { Color::Red };
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{}", if ok { "VERIFIED" } else { "REJECTED" })?;
    out.reset()?;
    writeln!(out, " {detail}")?;
    Ok(())
}

/// Indented note, colored by severity.
pub fn note(level: &str, msg: &str) -> anyhow::Result<()> {
    let mut out = stdout();
    let color = match level {
        "error" => Color::Red,
        "warning" => Color::Yellow,
        _ => Color::Cyan,
    };
    write!(out, "  ")?;
    out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    write!(out, "{level}")?;
    out.reset()?;
    writeln!(out, " {msg}")?;
    Ok(())
}

/// Report a fatal error on stderr (or as JSON on stdout in JSON mode).
pub fn error(err: &anyhow::Error) {
    if is_json() {
        let _ = print(&serde_json::json!({ "ok": false, "error": format!("{err:#}") }));
        return;
    }
    let mut e = StandardStream::stderr(ColorChoice::Auto);
    let _ = e.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(e, "error:");
    let _ = e.reset();
    let _ = writeln!(e, " {err:#}");
}

pub fn stdout() -> StandardStream {
    StandardStream::stdout(ColorChoice::Auto)
}
