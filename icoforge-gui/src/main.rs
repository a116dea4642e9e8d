#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
#![allow(clippy::new_without_default)]

mod cmd;
mod controller;
mod data;
mod delegate;
mod ui;

use druid::AppLauncher;
use env_logger::{Builder, Env};

use crate::{
    data::{AppState, Config},
    delegate::Delegate,
};

const ENV_LOG: &str = "ICOFORGE_LOG";
const ENV_LOG_STYLE: &str = "ICOFORGE_LOG_STYLE";

fn main() {
    // Setup logging from the env variables, with defaults.
    Builder::from_env(
        Env::new()
            .filter_or(ENV_LOG, "info")
            .write_style(ENV_LOG_STYLE),
    )
    .init();

    let config = Config::load().unwrap_or_default();
    let state = AppState::default_with_config(config);

    let window = ui::main_window();
    AppLauncher::with_window(window)
        .delegate(Delegate::new())
        .configure_env(ui::theme::setup)
        .launch(state)
        .expect("Application launch");
}
