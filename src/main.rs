use autosched::core::context::AppContext;
use autosched::logging::LogTarget;
use autosched::prompter::flows::menu_flow::MenuFlow;
use autosched::prompter::prompter::Prompter;
use std::path::PathBuf;

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

fn main() {
    let config_path = env_path("AUTOSCHED_CONFIG", "config.json");
    let logs_dir = env_path("AUTOSCHED_LOGS", "logs");

    let mut ctx = match AppContext::new_with_paths(config_path, logs_dir) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let prompter = Prompter::new();
    let flow = MenuFlow::new(&mut ctx);

    if let Err(err) = prompter.run(flow, false) {
        ctx.logger
            .error(format!("{err}"), LogTarget::ConsoleAndFile);
    }
}
