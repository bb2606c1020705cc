mod app;
mod cli;
mod config;
mod detect;
mod diff;
mod rules;
mod transforms;

fn main() {
    if let Err(err) = app::run() {
        eprintln!("indexpatch: {err:#}");
        std::process::exit(1);
    }
}
