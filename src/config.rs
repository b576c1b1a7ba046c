use std::ops::RangeInclusive;
use std::time::Duration;

/// Fixed layout and styling knobs. Nothing here is persisted between runs.
#[derive(Clone, Debug)]
pub struct Config {
    pub width: f32,
    pub collapsed_height: f32,
    pub expanded_height: f32,
    pub full_height: f32,
    /// Gap between the top of the primary screen and the widget.
    pub top_margin: f32,
    pub tick: Duration,
    pub corner_radius_cap: f32,
    pub alpha_step: u8,
    pub image_alpha: RangeInclusive<u8>,
    pub default_image_alpha: u8,
    pub color_alpha: RangeInclusive<u8>,
    /// Unmultiplied RGBA.
    pub initial_color: [u8; 4],
    pub reset_color: [u8; 4],
    pub border_gray: u8,
    pub return_animation: Duration,
    pub font_size: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 450.0,
            collapsed_height: 50.0,
            expanded_height: 100.0,
            full_height: 150.0,
            top_margin: 10.0,
            tick: Duration::from_secs(1),
            corner_radius_cap: 25.0,
            alpha_step: 15,
            image_alpha: 30..=255,
            default_image_alpha: 230,
            color_alpha: 0..=255,
            initial_color: [20, 20, 20, 160],
            reset_color: [20, 20, 20, 230],
            border_gray: 80,
            return_animation: Duration::from_millis(300),
            font_size: 13.0,
        }
    }
}
