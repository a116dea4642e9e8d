use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver};
use druid::{
    widget::Controller, Env, Event, EventCtx, ExtEventSink, Target, Widget, WidgetId,
};
use icoforge_core::convert::{self, CancelToken, ConversionRequest, ConvertEvent};

use crate::{cmd, data::AppState};

/// Runs the batch converter on a worker thread and folds its events back
/// into the job state. Hosted on the root widget, so the forwarded commands
/// target a widget that is always alive.
pub struct ConvertController {
    cancel: Option<CancelToken>,
    thread: Option<JoinHandle<()>>,
}

impl ConvertController {
    pub fn new() -> Self {
        Self {
            cancel: None,
            thread: None,
        }
    }

    fn start_conversion(
        &mut self,
        event_sink: ExtEventSink,
        widget_id: WidgetId,
        data: &mut AppState,
    ) {
        let request = match Self::build_request(data) {
            Ok(request) => request,
            Err(message) => {
                data.error_alert(message);
                return;
            }
        };
        data.begin_job(request.input_paths().len());

        let cancel = CancelToken::new();
        self.cancel = Some(cancel.clone());

        let (sender, receiver) = unbounded();
        let worker = thread::spawn(move || {
            convert::convert(&request, &cancel, &sender);
        });
        self.thread = Some(thread::spawn(move || {
            Self::service_events(receiver, event_sink, widget_id);
            let _ = worker.join();
        }));
    }

    fn service_events(
        receiver: Receiver<ConvertEvent>,
        event_sink: ExtEventSink,
        widget_id: WidgetId,
    ) {
        for event in receiver {
            event_sink
                .submit_command(cmd::CONVERT_EVENT, event, Target::Widget(widget_id))
                .unwrap();
        }
    }

    fn build_request(data: &AppState) -> Result<ConversionRequest, String> {
        if !data.config.has_output_dir() {
            return Err("Choose an output directory first".to_string());
        }
        let inputs = data
            .inputs
            .iter()
            .map(|file| file.path.as_ref().clone())
            .collect();
        let sizes: Vec<u32> = data.config.sizes.iter().copied().collect();
        ConversionRequest::new(
            inputs,
            data.config.output_root(),
            &sizes,
            data.config.move_original,
        )
        .map_err(|err| err.to_string())
    }

    fn handle_event(&mut self, data: &mut AppState, event: &ConvertEvent) {
        match event {
            ConvertEvent::PngWritten { path, size } => {
                data.job
                    .push_log(format!("Generated {} ({}×{})", path.display(), size, size));
            }
            ConvertEvent::IcoWritten { path, entries } => {
                data.job.push_log(format!(
                    "Generated {} with {} embedded images",
                    path.display(),
                    entries
                ));
            }
            ConvertEvent::IcoSkipped { path } => {
                data.job.push_log(format!(
                    "No ICO written for {}: no configured size fits the format",
                    path.display()
                ));
            }
            ConvertEvent::OversizeSkipped { size } => {
                data.job.push_log(format!(
                    "Size {} exceeds the 256 px ICO limit, omitted from the icon",
                    size
                ));
            }
            ConvertEvent::OriginalMoved { to, .. } => {
                data.job
                    .push_log(format!("Moved original to {}", to.display()));
            }
            ConvertEvent::OriginalCopied { to, .. } => {
                data.job
                    .push_log(format!("Copied original to {}", to.display()));
            }
            ConvertEvent::ItemFailed { path, message } => {
                data.job
                    .push_log(format!("Failed {}: {}", path.display(), message));
            }
            ConvertEvent::Progress { percent, .. } => {
                data.job.progress = f64::from(*percent) / 100.0;
            }
            ConvertEvent::Cancelled { completed, total } => {
                data.job
                    .push_log(format!("Cancelled after {} of {} images", completed, total));
                data.finish_job();
                data.info_alert(format!("Conversion cancelled after {} of {} images", completed, total));
                self.reap_worker();
            }
            ConvertEvent::Finished { converted, failed } => {
                data.job.progress = 1.0;
                data.finish_job();
                let message = format!(
                    "Conversion finished: {} converted, {} failed",
                    converted, failed
                );
                data.job.push_log(message.clone());
                match failed {
                    0 => data.info_alert(message),
                    _ => data.error_alert(message),
                }
                self.reap_worker();
            }
        }
    }

    fn reap_worker(&mut self) {
        self.cancel.take();
        // The forwarding thread exits once the converter drops its sender,
        // which has already happened by the time a terminal event arrives.
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl<W: Widget<AppState>> Controller<AppState, W> for ConvertController {
    fn event(
        &mut self,
        child: &mut W,
        ctx: &mut EventCtx,
        event: &Event,
        data: &mut AppState,
        env: &Env,
    ) {
        match event {
            Event::Command(command) if command.is(cmd::START_CONVERSION) => {
                if data.is_running() {
                    data.error_alert("A conversion is already running");
                } else {
                    self.start_conversion(ctx.get_external_handle(), ctx.widget_id(), data);
                }
                ctx.set_handled();
            }
            Event::Command(command) if command.is(cmd::CANCEL_CONVERSION) => {
                if let Some(cancel) = &self.cancel {
                    cancel.cancel();
                    data.job.push_log("Cancelling after the current image…");
                }
                ctx.set_handled();
            }
            Event::Command(command) if command.is(cmd::CONVERT_EVENT) => {
                let convert_event = command.get_unchecked(cmd::CONVERT_EVENT);
                self.handle_event(data, convert_event);
                ctx.set_handled();
            }
            _ => {
                child.event(ctx, event, data, env);
            }
        }
    }
}
