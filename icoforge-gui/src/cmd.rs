use druid::{FileInfo, Selector};
use icoforge_core::convert::ConvertEvent;

use crate::data::InputFile;

// Input staging

pub const REMOVE_INPUT: Selector<InputFile> = Selector::new("app.remove-input");
pub const CLEAR_INPUTS: Selector = Selector::new("app.clear-inputs");

// Output directory

pub const SELECT_OUTPUT_DIR: Selector<FileInfo> = Selector::new("app.select-output-dir");

// Size set editing

pub const ADD_SIZE: Selector = Selector::new("app.add-size");
pub const REMOVE_SIZE: Selector<u32> = Selector::new("app.remove-size");
pub const RESET_SIZES: Selector = Selector::new("app.reset-sizes");

// Conversion job

pub const START_CONVERSION: Selector = Selector::new("app.start-conversion");
pub const CANCEL_CONVERSION: Selector = Selector::new("app.cancel-conversion");
pub const CONVERT_EVENT: Selector<ConvertEvent> = Selector::new("app.convert-event");
