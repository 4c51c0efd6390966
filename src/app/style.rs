//! Explicit series-to-style mapping handed to the canvas alongside the plotted results

use std::collections::HashMap;

use egui::{Color32, Stroke};

const CORRIDOR_ALPHA: u8 = 110;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesId {
    Nominal,
    LowerBound,
    UpperBound,
}

pub struct StyleMap {
    strokes: HashMap<SeriesId, Stroke>,
}

impl StyleMap {
    /// Nominal trajectory in the species colour, both corridor bounds in a faded copy of it.
    pub fn for_colour((r, g, b): (u8, u8, u8)) -> Self {
        let faded = Stroke::new(1.0, Color32::from_rgba_unmultiplied(r, g, b, CORRIDOR_ALPHA));
        StyleMap {
            strokes: HashMap::from([
                (SeriesId::Nominal, Stroke::new(2.0, Color32::from_rgb(r, g, b))),
                (SeriesId::LowerBound, faded),
                (SeriesId::UpperBound, faded),
            ]),
        }
    }

    pub fn stroke(&self, id: SeriesId) -> Stroke {
        self.strokes
            .get(&id)
            .copied()
            .unwrap_or(Stroke::new(1.0, Color32::GRAY))
    }
}
