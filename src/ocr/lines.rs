//! Line reconstruction from unordered detections.
//!
//! Greedy, single pass, order-sensitive. Each detection joins the first line
//! (in creation order) whose running vertical centre is close enough,
//! otherwise it starts a new line. The first satisfying line wins even when
//! a later one is nearer.

use super::Detection;

/// Fraction of a line's average height within which a detection joins it.
pub const DEFAULT_HEIGHT_MULTIPLIER: f64 = 0.6;

/// A reconstructed line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    items: Vec<(f64, String)>,
    y_centers: Vec<f64>,
    heights: Vec<f64>,
    average_y_center: f64,
    average_height: f64,
}

impl Line {
    fn seed(detection: &Detection) -> Self {
        let y_center = detection.y_center();
        let height = detection.height();
        Self {
            items: vec![(detection.x_position(), detection.text.clone())],
            y_centers: vec![y_center],
            heights: vec![height],
            average_y_center: y_center,
            average_height: height,
        }
    }

    fn accepts(&self, y_center: f64, height_multiplier: f64) -> bool {
        (self.average_y_center - y_center).abs() < self.average_height * height_multiplier
    }

    fn attach(&mut self, detection: &Detection) {
        self.items
            .push((detection.x_position(), detection.text.clone()));
        self.y_centers.push(detection.y_center());
        self.heights.push(detection.height());
        self.average_y_center = mean(&self.y_centers);
        self.average_height = mean(&self.heights);
    }

    /// `(x_position, text)` pairs; left-to-right once clustering finished.
    pub fn items(&self) -> &[(f64, String)] {
        &self.items
    }

    pub fn average_y_center(&self) -> f64 {
        self.average_y_center
    }

    pub fn average_height(&self) -> f64 {
        self.average_height
    }

    /// Item texts joined by single spaces.
    pub fn text(&self) -> String {
        self.items
            .iter()
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Group detections into lines, in reading order.
///
/// Lines come back sorted top-to-bottom by final average centre; items in
/// each line are sorted left-to-right. Both sorts are stable.
pub fn cluster(detections: &[Detection], height_multiplier: f64) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();

    for detection in detections {
        let y_center = detection.y_center();
        match lines
            .iter_mut()
            .find(|line| line.accepts(y_center, height_multiplier))
        {
            Some(line) => line.attach(detection),
            None => lines.push(Line::seed(detection)),
        }
    }

    for line in &mut lines {
        line.items.sort_by(|a, b| a.0.total_cmp(&b.0));
    }
    lines.sort_by(|a, b| a.average_y_center.total_cmp(&b.average_y_center));

    lines
}

/// Render lines as text: one line per row, trailing whitespace trimmed.
pub fn render(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|line| line.text().trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
