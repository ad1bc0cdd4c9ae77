/// Display parameters for the weekly grid.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// First hour shown on the grid; sessions may not start earlier
    pub opening_hour: u32,

    /// Vertical pixels for one hour of session time
    pub pixels_per_hour: f64,

    /// Width of one day column when the panel width is unknown
    pub base_column_width: f64,

    /// Measured width of the whole 7-day panel, 0 until the host reports one
    pub panel_width: f64,
}

/// Gap kept between neighbouring blocks, applied to both width and height.
pub const SLOT_MARGIN_PX: f64 = 4.0;

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            opening_hour: 6,
            pixels_per_hour: 60.0,
            base_column_width: 95.0,
            panel_width: 0.0,
        }
    }
}

impl LayoutConfig {
    /// Width of a single day column.
    pub fn day_column_width(&self) -> f64 {
        if self.panel_width > 0.0 {
            self.panel_width / 7.0
        } else {
            self.base_column_width
        }
    }
}
