use druid::{commands, AppDelegate, Command, DelegateCtx, Env, Handled, Target};

use crate::{cmd, data::AppState};

pub struct Delegate;

impl Delegate {
    pub fn new() -> Self {
        Self
    }
}

impl AppDelegate<AppState> for Delegate {
    fn command(
        &mut self,
        _ctx: &mut DelegateCtx,
        _target: Target,
        cmd: &Command,
        data: &mut AppState,
        _env: &Env,
    ) -> Handled {
        if let Some(infos) = cmd.get(commands::OPEN_FILES) {
            if data.is_running() {
                data.error_alert("Cannot edit the batch while a conversion is running");
                return Handled::Yes;
            }
            for info in infos {
                data.stage_input(info.path.clone());
            }
            Handled::Yes
        } else if let Some(info) = cmd.get(cmd::SELECT_OUTPUT_DIR) {
            data.config.output_dir = info.path.to_string_lossy().into_owned();
            Handled::Yes
        } else if let Some(file) = cmd.get(cmd::REMOVE_INPUT) {
            if data.is_running() {
                data.error_alert("Cannot edit the batch while a conversion is running");
            } else {
                data.remove_input(file);
            }
            Handled::Yes
        } else if cmd.is(cmd::CLEAR_INPUTS) {
            if data.is_running() {
                data.error_alert("Cannot edit the batch while a conversion is running");
            } else {
                data.inputs.clear();
            }
            Handled::Yes
        } else if cmd.is(cmd::ADD_SIZE) {
            data.add_size_from_input();
            Handled::Yes
        } else if let Some(&size) = cmd.get(cmd::REMOVE_SIZE) {
            data.remove_size(size);
            Handled::Yes
        } else if cmd.is(cmd::RESET_SIZES) {
            data.reset_sizes();
            Handled::Yes
        } else {
            Handled::No
        }
    }
}
