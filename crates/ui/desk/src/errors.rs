//! Error reports and the panic hook of the desk binary.
//!
//! `init` is called once from `main` before anything touches the terminal.
//! Reports go to stderr and, stripped of ANSI colors, into the log file.

use std::panic::PanicHookInfo;
use std::sync::OnceLock;

use color_eyre::{Result, config::PanicHook};
use tracing::error;

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Where users should file crash reports.
fn report_hint() -> String {
    format!(
        "The desk crashed. Please attach the log file when reporting it at {}",
        env!("CARGO_PKG_REPOSITORY")
    )
}

/// Install color-eyre's report hook and the panic handler. Safe to call twice.
///
/// With `restore_terminal` (interactive mode) the panic handler leaves the
/// alternate screen first, otherwise the report would be drawn into the TUI.
pub fn init(restore_terminal: bool) -> Result<()> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section(report_hint())
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .try_into_hooks()?;
    eyre_hook.install()?;

    std::panic::set_hook(Box::new(move |info| {
        if restore_terminal {
            leave_terminal();
        }
        on_panic(&panic_hook, info);
        std::process::exit(libc::EXIT_FAILURE);
    }));

    let _ = INSTALLED.set(());
    Ok(())
}

fn leave_terminal() {
    match crate::tui::Tui::new() {
        Ok(mut tui) => {
            if let Err(e) = tui.exit() {
                error!(error = ?e, "terminal could not be restored after panic");
            }
        }
        Err(e) => error!(error = ?e, "no terminal handle to restore after panic"),
    }
}

fn on_panic(hook: &PanicHook, info: &PanicHookInfo<'_>) {
    let report = hook.panic_report(info).to_string();
    error!(panic = %strip_ansi_escapes::strip_str(&report), "desk panicked");

    // Release: kurzer Hinweis plus Dump-Datei, Debug: voller Backtrace
    #[cfg(not(debug_assertions))]
    {
        use human_panic::{handle_dump, metadata, print_msg};
        let metadata = metadata!();
        let dump = handle_dump(&metadata, info);
        if print_msg(dump, &metadata).is_err() {
            eprintln!("desk: could not print the crash summary");
        }
        eprintln!("{report}");
    }

    #[cfg(debug_assertions)]
    better_panic::Settings::auto()
        .most_recent_first(false)
        .lineno_suffix(true)
        .verbosity(better_panic::Verbosity::Full)
        .create_panic_handler()(info);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_hint_names_the_repository() {
        let hint = report_hint();
        assert!(hint.contains(env!("CARGO_PKG_REPOSITORY")));
        assert!(hint.contains("log file"));
    }
}
