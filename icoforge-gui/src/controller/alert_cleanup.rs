use std::time::Duration;

use druid::{widget::Controller, Env, Event, EventCtx, TimerToken, UpdateCtx, Widget};

use crate::data::AppState;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(1);

/// Expires transient alerts. The timer is armed only while alerts are on
/// screen and stops once the list drains, instead of ticking for the whole
/// lifetime of the window.
pub struct AlertCleanup {
    timer: Option<TimerToken>,
}

impl AlertCleanup {
    pub fn new() -> Self {
        Self { timer: None }
    }
}

impl<W: Widget<AppState>> Controller<AppState, W> for AlertCleanup {
    fn event(
        &mut self,
        child: &mut W,
        ctx: &mut EventCtx,
        event: &Event,
        data: &mut AppState,
        env: &Env,
    ) {
        if let Event::Timer(token) = event {
            if self.timer == Some(*token) {
                data.cleanup_alerts();
                self.timer = if data.alerts.is_empty() {
                    None
                } else {
                    Some(ctx.request_timer(CLEANUP_INTERVAL))
                };
            }
        }
        child.event(ctx, event, data, env)
    }

    fn update(
        &mut self,
        child: &mut W,
        ctx: &mut UpdateCtx,
        old_data: &AppState,
        data: &AppState,
        env: &Env,
    ) {
        if self.timer.is_none() && !data.alerts.is_empty() {
            self.timer = Some(ctx.request_timer(CLEANUP_INTERVAL));
        }
        child.update(ctx, old_data, data, env)
    }
}
