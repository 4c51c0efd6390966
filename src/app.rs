//! Contains all application code, including viewer state and drawing logic

mod canvas;
mod style;

use canvas::Canvas;
use style::{SeriesId, StyleMap};

use egui::{Color32, Pos2, Rangef, Rect, Response, Stroke, Style};
use log::warn;
use strum::IntoEnumIterator;

use sims_deflection::simulation::uncertainty::{propagate_uncertainty, uncertainty_corridor};
use sims_deflection::simulation::variables::{
    ANGLE_DEGREES, DETECTOR_X, HEIGHT, MAGNETIC_FIELD, PLATE_DISTANCE, POTENTIAL, RELATIVE_UNCERTAINTY, SPEED,
};
use sims_deflection::simulation::{
    Apparatus, DeflectionError, DeflectionKind, DeflectionModel, DeflectionResult, Field, Landing, Particle,
    PropagationMethod, Scenario, Species, UncertaintyBudget,
};

const TRAJECTORY_POINTS: usize = 400;
// how far past the straight-line landing point a missing trajectory is drawn
const MISS_REACH_FACTOR: f64 = 3.0;
const VIEW_MARGIN: f32 = 1.2;

fn zoom_to(range: &Rangef, zoom: f32, centre: f32) -> Rangef {
    Rangef {
        min: centre - range.span() / (2.0 * zoom),
        max: centre + range.span() / (2.0 * zoom),
    }
}

/// Samples of one scenario's trajectory up to where it lands.
fn trajectory(scenario: &Scenario, model: &dyn DeflectionModel, landing: &Landing) -> DeflectionResult<Vec<(f64, f64)>> {
    let (start, end) = model.domain();
    let reach = match scenario.kind {
        DeflectionKind::Electric => landing.contact.unwrap_or(
            MISS_REACH_FACTOR * scenario.particle.height() / scenario.particle.angle().tan(),
        ),
        DeflectionKind::Magnetic => end,
    };
    model.sample_trajectory(start, reach.min(end), TRAJECTORY_POINTS)
}

struct Evaluation {
    landing: Landing,
    uncertainty: Option<f64>,
    interval: Option<(f64, f64)>,
    series: Vec<(SeriesId, Vec<(f64, f64)>)>,
}

impl Evaluation {
    fn bounding_box(&self) -> Option<Rect> {
        let points = self.series.iter().flat_map(|(_, points)| points);
        points.fold(None, |acc: Option<Rect>, &(x, y)| {
            let p = Pos2::new(x as f32, y as f32);
            Some(acc.map_or(Rect::from_min_max(p, p), |rect| rect.union(Rect::from_min_max(p, p))))
        })
    }
}

pub struct DeflectionApp {
    kind: DeflectionKind,
    species: Species,
    method: PropagationMethod,
    speed: f64,
    angle_degrees: f64,
    height: f64,
    potential: f64,
    plate_distance: f64,
    magnetic_field: f64,
    detector_x: f64,
    relative_uncertainty: f64,
    show_corridor: bool,
    zoom: f32,
}

impl DeflectionApp {
    /// Called once before the first frame.
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            kind: DeflectionKind::default(),
            species: Species::default(),
            method: PropagationMethod::default(),
            speed: SPEED.default,
            angle_degrees: ANGLE_DEGREES.default,
            height: HEIGHT.default,
            potential: POTENTIAL.default,
            plate_distance: PLATE_DISTANCE.default,
            magnetic_field: MAGNETIC_FIELD.default,
            detector_x: DETECTOR_X.default,
            relative_uncertainty: RELATIVE_UNCERTAINTY.default,
            show_corridor: true,
            zoom: 1.0,
        }
    }

    fn scenario(&self) -> DeflectionResult<Scenario> {
        let particle = Particle::from_species(self.species, self.speed, self.angle_degrees.to_radians(), self.height)?;
        let field = match self.kind {
            DeflectionKind::Electric => Field::from_potential(self.plate_distance, self.potential)?,
            DeflectionKind::Magnetic => Field::new(self.magnetic_field)?,
        };
        let apparatus = Apparatus {
            detector_x: self.detector_x,
            ..Apparatus::default()
        };
        Ok(Scenario::new(self.kind, particle, field).with_apparatus(apparatus))
    }

    fn evaluate(&self) -> DeflectionResult<Evaluation> {
        let scenario = self.scenario()?;
        let model = scenario.model()?;
        let landing = model.landing();
        let mut series = vec![(SeriesId::Nominal, trajectory(&scenario, model.as_ref(), &landing)?)];

        let budget = UncertaintyBudget::typical(&scenario, self.relative_uncertainty)?;
        let uncertainty = match propagate_uncertainty(&scenario, &budget, self.method) {
            Ok(report) => Some(report.uncertainty),
            Err(DeflectionError::UndefinedUncertainty(_)) => None,
            Err(e) => return Err(e),
        };

        let mut interval = None;
        if self.show_corridor && uncertainty.is_some() {
            match uncertainty_corridor(&scenario, &budget, self.method) {
                Ok(corridor) => {
                    interval = corridor.interval();
                    for (id, bound) in [
                        (SeriesId::LowerBound, corridor.lower),
                        (SeriesId::UpperBound, corridor.upper),
                    ] {
                        if !bound.in_domain {
                            continue;
                        }
                        let model = bound.scenario.model()?;
                        let points = trajectory(&bound.scenario, model.as_ref(), &model.landing())?;
                        series.push((id, points));
                    }
                }
                Err(e) => warn!("Uncertainty corridor unavailable: {e}"),
            }
        }

        Ok(Evaluation {
            landing,
            uncertainty,
            interval,
            series,
        })
    }

    fn settings(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            egui::ComboBox::from_id_salt("deflection-kind")
                .selected_text(self.kind.to_string())
                .show_ui(ui, |ui| {
                    for kind in DeflectionKind::iter() {
                        ui.selectable_value(&mut self.kind, kind, kind.to_string());
                    }
                });
            egui::ComboBox::from_id_salt("species")
                .selected_text(self.species.to_string())
                .show_ui(ui, |ui| {
                    for species in Species::iter() {
                        ui.selectable_value(&mut self.species, species, species.name());
                    }
                });

            ui.separator();

            ui.label("v").on_hover_text("Initial speed (m/s)");
            ui.add(egui::Slider::new(&mut self.speed, SPEED.min..=SPEED.max).logarithmic(true));
            if ui.button("↺").on_hover_text("Reset").clicked() {
                self.speed = SPEED.default;
            }
        });

        ui.horizontal(|ui| match self.kind {
            DeflectionKind::Electric => {
                ui.label("θ").on_hover_text("Launch angle from the sample (°)");
                ui.add(egui::Slider::new(
                    &mut self.angle_degrees,
                    ANGLE_DEGREES.min..=ANGLE_DEGREES.max,
                ));
                ui.label("h").on_hover_text("Launch height (m)");
                ui.add(egui::Slider::new(&mut self.height, HEIGHT.min..=HEIGHT.max));
                ui.label("V").on_hover_text("Plate potential difference (V)");
                ui.add(egui::Slider::new(&mut self.potential, POTENTIAL.min..=POTENTIAL.max));
                ui.label("d").on_hover_text("Plate distance (m)");
                ui.add(egui::Slider::new(
                    &mut self.plate_distance,
                    PLATE_DISTANCE.min..=PLATE_DISTANCE.max,
                ));
            }
            DeflectionKind::Magnetic => {
                ui.label("B").on_hover_text("Magnetic flux density (T)");
                ui.add(egui::Slider::new(
                    &mut self.magnetic_field,
                    MAGNETIC_FIELD.min..=MAGNETIC_FIELD.max,
                ));
                ui.label("x").on_hover_text("Detector position (m)");
                ui.add(egui::Slider::new(&mut self.detector_x, DETECTOR_X.min..=DETECTOR_X.max));
            }
        });

        ui.horizontal(|ui| {
            ui.label("Δ").on_hover_text("Relative uncertainty of speed, angle, height and field");
            ui.add(egui::Slider::new(
                &mut self.relative_uncertainty,
                RELATIVE_UNCERTAINTY.min..=RELATIVE_UNCERTAINTY.max,
            ));
            egui::ComboBox::from_id_salt("propagation-method")
                .selected_text(self.method.to_string())
                .show_ui(ui, |ui| {
                    for method in PropagationMethod::iter() {
                        ui.selectable_value(&mut self.method, method, method.to_string());
                    }
                });
            ui.checkbox(&mut self.show_corridor, "Corridor");

            ui.separator();

            ui.label("Zoom");
            ui.add(egui::Slider::new(&mut self.zoom, 1.0..=10.0));
            if ui.button("↺").on_hover_text("Reset view").clicked() {
                self.zoom = 1.0;
            }
        });
    }

    fn readout(&self, ui: &mut egui::Ui, evaluation: &DeflectionResult<Evaluation>) {
        let describe = |value: Option<f64>| value.map_or("none".to_string(), |v| format!("{v:.5} m"));
        ui.horizontal(|ui| match evaluation {
            Ok(evaluation) => {
                ui.label(format!("Contact: {}", describe(evaluation.landing.contact)));
                ui.separator();
                let angle = evaluation.landing.angle.map_or("none".to_string(), |a| {
                    format!("{:.2}°", a.to_degrees())
                });
                ui.label(format!("Incident angle: {angle}"));
                ui.separator();
                let uncertainty = evaluation
                    .uncertainty
                    .map_or("undefined".to_string(), |u| format!("± {u:.2e} m"));
                ui.label(format!("Δ: {uncertainty}"));
                if let Some((low, high)) = evaluation.interval {
                    ui.separator();
                    ui.label(format!("Corridor: [{low:.5}, {high:.5}] m"))
                        .on_hover_text("Worst-case envelope, not a confidence interval");
                }
            }
            Err(e) => {
                ui.colored_label(Color32::from_rgb(255, 90, 90), e.to_string());
            }
        });
    }
}

impl eframe::App for DeflectionApp {
    /// Called each time the UI needs repainting
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let settings_drawn: Response = egui::TopBottomPanel::top("settings")
            .show(ctx, |ui| self.settings(ui))
            .response;

        let evaluation = self.evaluate();

        let readout_drawn: Response = egui::TopBottomPanel::bottom("readout")
            .show(ctx, |ui| self.readout(ui, &evaluation))
            .response;

        let canvas_extent = Rect::from_two_pos(
            Pos2::new(ctx.screen_rect().left(), settings_drawn.rect.bottom()),
            Pos2::new(ctx.screen_rect().right(), readout_drawn.rect.top()),
        );

        let styles = StyleMap::for_colour(self.species.colour());
        let plate = Stroke::new(3.0, Color32::from_rgb(140, 140, 160));

        // draws the trajectories in the main panel of the window
        let style = Style::default();
        let _ = egui::CentralPanel::default()
            .frame(egui::Frame::canvas(&style))
            .show(ctx, |ui| {
                let Ok(evaluation) = &evaluation else {
                    return;
                };
                let Some(bounds) = evaluation.bounding_box() else {
                    return;
                };

                let fit = bounds.width().max(bounds.height() * canvas_extent.aspect_ratio()) * VIEW_MARGIN;
                if !(fit.is_finite() && fit > 0.0) {
                    return;
                }
                let visible = zoom_to(&Rangef::new(0.0, fit), self.zoom, bounds.center().x);
                let canvas = Canvas::new(ui, canvas_extent, visible, bounds.center().y);

                canvas.draw_grid_lines();
                canvas.draw_axes();

                match self.kind {
                    DeflectionKind::Electric => canvas.draw_plate_at_y(0.0, plate),
                    DeflectionKind::Magnetic => canvas.draw_plate_at_x(self.detector_x, plate),
                }

                for (id, points) in &evaluation.series {
                    canvas.draw_points(points, styles.stroke(*id));
                }

                if let Some(contact) = evaluation.landing.contact {
                    let (x, y) = match self.kind {
                        DeflectionKind::Electric => (contact, 0.0),
                        DeflectionKind::Magnetic => (self.detector_x, contact),
                    };
                    canvas.draw_marker(x, y, 4.0, Color32::WHITE);
                }
            });
    }
}
