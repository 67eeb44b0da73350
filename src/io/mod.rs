// Purpose - external interfaces, format conversions

pub mod converter;
pub mod keyboard;
pub mod midi;
pub mod pitch;
pub mod samples;
