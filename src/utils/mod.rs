pub mod format;
pub mod normalize;
pub mod time_utils;
