use std::{panic, process};

use better_panic::Settings;
use color_eyre::{config::HookBuilder, eyre::Result};

fn panic_section() -> String {
    format!(
        "This is a bug. Consider reporting it to the {} maintainers ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_AUTHORS").replace(':', ", ")
    )
}

/// Install color-eyre reporting plus a panic hook that logs the report
///
/// Release builds also print a human-panic crash message; debug builds hand
/// over to better-panic for a full backtrace. Either way the process exits
/// with `EXIT_FAILURE`.
pub fn initialize_panic_handler() -> Result<()> {
    let (panic_hook, eyre_hook) = HookBuilder::default()
        .panic_section(panic_section())
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;
    panic::set_hook(Box::new(move |panic_info| {
        #[cfg(not(debug_assertions))]
        {
            use human_panic::{handle_dump, print_msg, Metadata};
            let meta = Metadata::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
                .authors(env!("CARGO_PKG_AUTHORS").replace(':', ", "));

            let file_path = handle_dump(&meta, panic_info);
            if let Err(err) = print_msg(file_path, &meta) {
                eprintln!("human-panic: printing error message failed: {err}");
            }
            eprintln!("{}", panic_hook.panic_report(panic_info));
        }
        let msg = format!("{}", panic_hook.panic_report(panic_info));
        log::error!("Error: {}", strip_ansi_escapes::strip_str(msg));

        #[cfg(debug_assertions)]
        {
            Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .verbosity(better_panic::Verbosity::Full)
                .create_panic_handler()(panic_info);
        }

        process::exit(libc::EXIT_FAILURE);
    }));
    Ok(())
}
