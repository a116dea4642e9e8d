pub mod theme;

use druid::{
    commands,
    widget::{
        Button, Checkbox, CrossAxisAlignment, Either, Flex, Label, LineBreaking, List,
        ProgressBar, TextBox,
    },
    Color, FileDialogOptions, FileSpec, LensExt, Widget, WidgetExt, WindowDesc,
};
use icoforge_core::util::SUPPORTED_EXTENSIONS;

use crate::{
    cmd,
    controller::{AlertCleanup, ConfigSaver, ConvertController, InputController},
    data::{Alert, AlertStyle, AppState, Config, InputFile, Job},
};

pub fn main_window() -> WindowDesc<AppState> {
    WindowDesc::new(root_widget())
        .title("IcoForge")
        .with_min_size((theme::grid(55.0), theme::grid(50.0)))
        .window_size((theme::grid(80.0), theme::grid(75.0)))
}

fn root_widget() -> impl Widget<AppState> {
    Flex::column()
        .must_fill_main_axis(true)
        .cross_axis_alignment(CrossAxisAlignment::Fill)
        .with_child(inputs_header_widget())
        .with_flex_child(inputs_list_widget(), 1.0)
        .with_default_spacer()
        .with_child(sizes_widget())
        .with_default_spacer()
        .with_child(output_widget())
        .with_default_spacer()
        .with_child(run_widget())
        .with_default_spacer()
        .with_flex_child(log_widget(), 1.0)
        .with_child(alerts_widget())
        .padding(theme::grid(2.0))
        .controller(ConvertController::new())
        .controller(AlertCleanup::new())
        .controller(ConfigSaver)
}

fn inputs_header_widget() -> impl Widget<AppState> {
    Flex::row()
        .with_child(Label::new("Images").with_font(theme::UI_FONT_MEDIUM))
        .with_flex_spacer(1.0)
        .with_child(Button::new("Add Images…").on_click(|ctx, _data: &mut AppState, _env| {
            let options = FileDialogOptions::new()
                .allowed_types(vec![FileSpec::new("Image files", SUPPORTED_EXTENSIONS)])
                .multi_selection()
                .title("Select Images");
            ctx.submit_command(commands::SHOW_OPEN_PANEL.with(options));
        }))
        .with_default_spacer()
        .with_child(Button::new("Clear").on_click(|ctx, _data: &mut AppState, _env| {
            ctx.submit_command(cmd::CLEAR_INPUTS);
        }))
}

fn inputs_list_widget() -> impl Widget<AppState> {
    Either::new(
        |data: &AppState, _| data.inputs.is_empty(),
        Label::new("No images staged yet. PNG, JPEG, and BMP files are accepted.")
            .with_text_color(theme::PLACEHOLDER_COLOR)
            .padding(theme::grid(1.0)),
        List::new(input_row_widget)
            .lens(AppState::inputs)
            .scroll()
            .vertical(),
    )
}

fn input_row_widget() -> impl Widget<InputFile> {
    Flex::row()
        .with_child(Label::dynamic(|file: &InputFile, _| file.name.to_string()))
        .with_default_spacer()
        .with_flex_child(
            Label::dynamic(|file: &InputFile, _| file.path.display().to_string())
                .with_text_size(theme::TEXT_SIZE_SMALL)
                .with_text_color(theme::GREY_3)
                .with_line_break_mode(LineBreaking::Clip),
            1.0,
        )
        .with_child(
            Label::new("Remove")
                .with_text_size(theme::TEXT_SIZE_SMALL)
                .with_text_color(theme::BLUE_DARK)
                .on_click(|ctx, file: &mut InputFile, _env| {
                    ctx.submit_command(cmd::REMOVE_INPUT.with(file.clone()));
                }),
        )
        .padding((theme::grid(1.0), theme::grid(0.5)))
}

fn sizes_widget() -> impl Widget<AppState> {
    Flex::column()
        .cross_axis_alignment(CrossAxisAlignment::Fill)
        .with_child(
            Flex::row()
                .with_child(Label::new("Icon sizes").with_font(theme::UI_FONT_MEDIUM))
                .with_flex_spacer(1.0)
                .with_child(Button::new("Reset").on_click(|ctx, _data: &mut AppState, _env| {
                    ctx.submit_command(cmd::RESET_SIZES);
                })),
        )
        .with_spacer(theme::grid(0.5))
        .with_child(
            Flex::row()
                .with_child(size_input_widget())
                .with_default_spacer()
                .with_flex_child(size_chips_widget().scroll().horizontal(), 1.0),
        )
}

fn size_input_widget() -> impl Widget<AppState> {
    TextBox::new()
        .with_placeholder("Size in px")
        .controller(
            InputController::new()
                .on_submit(|ctx, _text, _env| ctx.submit_command(cmd::ADD_SIZE)),
        )
        .fix_width(theme::grid(12.0))
        .lens(AppState::size_input)
}

fn size_chips_widget() -> impl Widget<AppState> {
    List::new(size_chip_widget)
        .horizontal()
        .with_spacing(theme::grid(0.5))
        .lens(AppState::config.then(Config::sizes))
}

fn size_chip_widget() -> impl Widget<u32> {
    Label::dynamic(|size: &u32, _| format!("{} ✕", size))
        .with_text_size(theme::TEXT_SIZE_SMALL)
        .padding((theme::grid(1.0), theme::grid(0.5)))
        .background(theme::GREY_5)
        .rounded(theme::BUTTON_BORDER_RADIUS)
        .on_click(|ctx, size: &mut u32, _env| {
            ctx.submit_command(cmd::REMOVE_SIZE.with(*size));
        })
}

fn output_widget() -> impl Widget<AppState> {
    Flex::row()
        .with_child(Button::new("Output Folder…").on_click(|ctx, _data: &mut AppState, _env| {
            let options = FileDialogOptions::new()
                .select_directories()
                .accept_command(cmd::SELECT_OUTPUT_DIR)
                .title("Choose Output Directory");
            ctx.submit_command(commands::SHOW_OPEN_PANEL.with(options));
        }))
        .with_default_spacer()
        .with_flex_child(
            Label::dynamic(|data: &AppState, _| {
                if data.config.has_output_dir() {
                    data.config.output_dir.clone()
                } else {
                    "No output directory selected".to_string()
                }
            })
            .with_line_break_mode(LineBreaking::Clip),
            1.0,
        )
        .with_default_spacer()
        .with_child(
            Checkbox::new("Move originals")
                .lens(AppState::config.then(Config::move_original)),
        )
}

fn run_widget() -> impl Widget<AppState> {
    Flex::row()
        .with_child(Either::new(
            |data: &AppState, _| data.is_running(),
            Button::new("Cancel").on_click(|ctx, _data: &mut AppState, _env| {
                ctx.submit_command(cmd::CANCEL_CONVERSION);
            }),
            Button::new("Convert").on_click(|ctx, _data: &mut AppState, _env| {
                ctx.submit_command(cmd::START_CONVERSION);
            }),
        ))
        .with_default_spacer()
        .with_flex_child(
            ProgressBar::new()
                .expand_width()
                .lens(AppState::job.then(Job::progress)),
            1.0,
        )
        .with_default_spacer()
        .with_child(Label::dynamic(|data: &AppState, _| {
            format!("{:.0}%", data.job.progress * 100.0)
        }))
}

fn log_widget() -> impl Widget<AppState> {
    List::new(|| {
        Label::dynamic(|line: &std::sync::Arc<str>, _| line.to_string())
            .with_font(theme::UI_FONT_MONO)
            .with_text_size(theme::TEXT_SIZE_SMALL)
            .with_line_break_mode(LineBreaking::WordWrap)
    })
    .lens(AppState::job.then(Job::log))
    .scroll()
    .vertical()
    .border(theme::GREY_5, 1.0)
    .rounded(theme::BUTTON_BORDER_RADIUS)
}

fn alerts_widget() -> impl Widget<AppState> {
    List::new(alert_widget).lens(AppState::alerts)
}

fn alert_widget() -> impl Widget<Alert> {
    Either::new(
        |alert: &Alert, _| alert.style == AlertStyle::Error,
        alert_label(theme::RED),
        alert_label(theme::BLUE_DARK),
    )
}

fn alert_label(color: Color) -> impl Widget<Alert> {
    Label::dynamic(|alert: &Alert, _| alert.message.to_string())
        .with_text_color(theme::WHITE)
        .with_line_break_mode(LineBreaking::WordWrap)
        .padding(theme::grid(1.0))
        .expand_width()
        .background(color)
        .rounded(theme::BUTTON_BORDER_RADIUS)
        .padding((0.0, theme::grid(0.25)))
}
