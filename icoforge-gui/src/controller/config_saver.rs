use druid::{widget::Controller, Data, Env, UpdateCtx, Widget};

use crate::data::AppState;

/// Persists the settings file whenever an edit changes the config, so the
/// output folder, size set, and move flag survive restarts without an
/// explicit save action.
pub struct ConfigSaver;

impl<W: Widget<AppState>> Controller<AppState, W> for ConfigSaver {
    fn update(
        &mut self,
        child: &mut W,
        ctx: &mut UpdateCtx,
        old_data: &AppState,
        data: &AppState,
        env: &Env,
    ) {
        if !old_data.config.same(&data.config) {
            data.config.save();
        }
        child.update(ctx, old_data, data, env);
    }
}
