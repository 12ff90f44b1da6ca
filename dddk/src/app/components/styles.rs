//! Line styles shared by the built-in widgets.

use crate::api::{LineType, LineWidth, Palette, Style};

const fn thin(palette: Palette, line_type: Option<LineType>) -> Style {
    Style {
        palette: Some(palette),
        line_type,
        line_width: Some(LineWidth::Thin),
    }
}

pub const MEMORY: Style = thin(Palette::Cool, None);
pub const DISK: Style = thin(Palette::Grey, None);
pub const ERROR: Style = thin(Palette::Warm, None);
pub const CPU: Style = thin(Palette::Orange, None);
pub const TASK: Style = thin(Palette::Purple, None);

/// Last week's values, drawn behind the current ones.
pub const WEEK_BEFORE: Style = thin(Palette::Grey, Some(LineType::Dotted));
pub const UPPER_BOUND: Style = thin(Palette::Orange, Some(LineType::Dashed));
pub const TRAFFIC: Style = thin(Palette::Cool, Some(LineType::Solid));
