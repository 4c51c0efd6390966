//! Helper struct for drawing objects in world space onto the screen.
//! This maintains aspect ratio, so the visible y range follows from the visible x range.
//! World y points up; screen y points down.

use egui::{Color32, Pos2, Rangef, Rect, Stroke, Ui, pos2};

const MAX_GRIDLINES: f32 = 20.0;
const GRID_COLOUR: Color32 = Color32::from_rgb(30, 30, 30);
const AXIS_COLOUR: Color32 = Color32::from_rgb(70, 70, 70);

pub struct Canvas<'a> {
    ui: &'a Ui,
    screen_extent: Rect,
    range: Rect,
    scale: f32,
}

impl<'a> Canvas<'a> {
    pub fn new(ui: &'a Ui, screen_extent: Rect, visible_x_axis: Rangef, y_centre: f32) -> Self {
        let y_span = visible_x_axis.span() / screen_extent.aspect_ratio();

        let range = Rect::from_x_y_ranges(
            visible_x_axis,
            Rangef::new(y_centre - y_span / 2.0, y_centre + y_span / 2.0),
        );

        let scale = screen_extent.width() / range.width();

        Canvas {
            ui,
            screen_extent,
            range,
            scale,
        }
    }

    fn world_to_screen_x(&self, x: f32) -> f32 {
        self.screen_extent.min.x + self.scale * (x - self.range.min.x)
    }

    fn world_to_screen_y(&self, y: f32) -> f32 {
        self.screen_extent.max.y - self.scale * (y - self.range.min.y)
    }

    fn world_to_screen_pos(&self, x: f64, y: f64) -> Pos2 {
        pos2(self.world_to_screen_x(x as f32), self.world_to_screen_y(y as f32))
    }

    fn grid_step(&self) -> f32 {
        let rough = self.range.width() / MAX_GRIDLINES;
        10f32.powf(rough.log10().floor())
    }

    pub fn draw_grid_lines(&self) {
        let step = self.grid_step();
        if !(step.is_finite() && step > 0.0) {
            log::error!("Grid step {step} is unusable, skipping grid");
            return;
        }

        let stroke = Stroke::new(1.0, GRID_COLOUR);
        let mut y = step * (self.range.min.y / step).floor();
        while y < self.range.max.y {
            self.ui
                .painter()
                .hline(self.screen_extent.x_range(), self.world_to_screen_y(y), stroke);
            y += step;
        }
        let mut x = step * (self.range.min.x / step).floor();
        while x < self.range.max.x {
            self.ui
                .painter()
                .vline(self.world_to_screen_x(x), self.screen_extent.y_range(), stroke);
            x += step;
        }
    }

    pub fn draw_axes(&self) {
        let stroke = Stroke::new(2.0, AXIS_COLOUR);
        self.ui
            .painter()
            .vline(self.world_to_screen_x(0.0), self.screen_extent.y_range(), stroke);
        self.ui
            .painter()
            .hline(self.screen_extent.x_range(), self.world_to_screen_y(0.0), stroke);
    }

    /// Vertical plate at world abscissa `x`, e.g. the magnetic sector's detector.
    pub fn draw_plate_at_x(&self, x: f64, stroke: Stroke) {
        self.ui
            .painter()
            .vline(self.world_to_screen_x(x as f32), self.screen_extent.y_range(), stroke);
    }

    /// Horizontal plate at world height `y`, e.g. the sample surface.
    pub fn draw_plate_at_y(&self, y: f64, stroke: Stroke) {
        self.ui
            .painter()
            .hline(self.screen_extent.x_range(), self.world_to_screen_y(y as f32), stroke);
    }

    /// Marker of fixed screen radius at a world position.
    pub fn draw_marker(&self, x: f64, y: f64, radius: f32, colour: Color32) {
        self.ui
            .painter()
            .circle_filled(self.world_to_screen_pos(x, y), radius, colour);
    }

    pub fn draw_points(&self, points: &[(f64, f64)], stroke: Stroke) {
        if points.len() < 2 {
            log::debug!("Too few points ({}) to draw a line", points.len());
            return;
        }
        let screen_points = points
            .iter()
            .map(|&(x, y)| self.world_to_screen_pos(x, y))
            .collect();
        self.ui.painter().line(screen_points, stroke);
    }
}
