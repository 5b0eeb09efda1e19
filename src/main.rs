use clap::Parser;
use color_eyre::eyre::Result;
use serde_json::Value;

use storefront_shell::{
    infrastructure::{cli::Cli, config::Config},
    store::User,
    utils::{initialize_logging, initialize_panic_handler},
    App, NavigateOptions,
};

fn run() -> Result<()> {
    initialize_logging()?;

    initialize_panic_handler()?;

    let args = <Cli as Parser>::parse();

    let mut config = Config::new()?;
    if let Some(start) = &args.start {
        config.app.start_path.clone_from(start);
    }

    let mut app = App::new(&config);
    if let Some(name) = &args.login {
        let id = name.to_lowercase().replace(' ', "-");
        app.store()
            .set_user(Some(User::new(&id, name).with_role("customer")));
    }

    // Routing failures are part of the report, not fatal
    let mut errors = Vec::new();
    if let Err(err) = app.start() {
        errors.push(err.to_string());
    }
    for path in &args.paths {
        if let Err(err) = app.router().navigate(path, NavigateOptions::push()) {
            errors.push(err.to_string());
        }
    }
    for _ in 0..args.back {
        if let Err(err) = app.router().back() {
            errors.push(err.to_string());
        }
    }

    let mut report = app.report(args.html)?;
    report["errors"] = Value::from(errors);
    println!("{}", serde_json::to_string_pretty(&report)?);

    app.dispose();
    Ok(())
}

fn main() -> Result<()> {
    if let Err(e) = run() {
        eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
        Err(e)
    } else {
        Ok(())
    }
}
