//! View models for the classification result panel.

use std::str::FromStr;
use strum_macros::{AsRefStr, EnumIter, EnumString};

use crate::response::ClassificationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, AsRefStr)]
pub enum KnownClass {
    #[strum(serialize = "adenocarcinoma")]
    Adenocarcinoma,
    #[strum(serialize = "large.cell.carcinoma")]
    LargeCellCarcinoma,
    #[strum(serialize = "normal")]
    Normal,
    #[strum(serialize = "squamous.cell.carcinoma")]
    SquamousCellCarcinoma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassStyle {
    pub color: &'static str,
    /// Font Awesome class list.
    pub icon: &'static str,
}

pub const NEUTRAL_STYLE: ClassStyle = ClassStyle {
    color: "#95a5a6",
    icon: "fa-solid fa-circle-question",
};

impl KnownClass {
    pub fn style(&self) -> ClassStyle {
        match self {
            Self::Adenocarcinoma => ClassStyle {
                color: "#e74c3c",
                icon: "fa-solid fa-disease",
            },
            Self::LargeCellCarcinoma => ClassStyle {
                color: "#e67e22",
                icon: "fa-solid fa-circle-radiation",
            },
            Self::Normal => ClassStyle {
                color: "#2ecc71",
                icon: "fa-solid fa-lungs",
            },
            Self::SquamousCellCarcinoma => ClassStyle {
                color: "#9b59b6",
                icon: "fa-solid fa-virus",
            },
        }
    }
}

pub fn class_style(name: &str) -> ClassStyle {
    KnownClass::from_str(name).map_or(NEUTRAL_STYLE, |class| class.style())
}

/// `large.cell.carcinoma` becomes `Large Cell Carcinoma`.
pub fn format_class_name(name: &str) -> String {
    name.split(['.', '_', '-', ' '])
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityBar {
    pub class_name: String,
    pub display_name: String,
    pub style: ClassStyle,
    pub probability: f64,
    /// Bar width in percent, clamped to 0..=100.
    pub width: f64,
    pub percent_text: String,
}

/// One arc of the donut chart. `fraction` and `offset` are shares of the full circle.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSegment {
    pub class_name: String,
    pub color: &'static str,
    pub fraction: f64,
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationView {
    pub label: String,
    pub display_label: String,
    pub style: ClassStyle,
    pub confidence_text: String,
    pub bars: Vec<ProbabilityBar>,
    pub chart: Vec<ChartSegment>,
}

impl ClassificationView {
    pub fn from_result(result: &ClassificationResult) -> Self {
        let mut ranked: Vec<(&str, f64)> = if result.probabilities.is_empty() {
            vec![(result.label.as_str(), result.confidence)]
        } else {
            result
                .probabilities
                .iter()
                .map(|(name, p)| (name.as_str(), *p))
                .collect()
        };
        ranked.sort_by(|(name_a, a), (name_b, b)| {
            b.partial_cmp(a)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| name_a.cmp(name_b))
        });

        let bars = ranked
            .iter()
            .map(|&(name, p)| ProbabilityBar {
                class_name: name.to_string(),
                display_name: format_class_name(name),
                style: class_style(name),
                probability: p,
                width: (p * 100.0).clamp(0.0, 100.0),
                percent_text: format_percent(p, 1),
            })
            .collect();

        Self {
            label: result.label.clone(),
            display_label: format_class_name(&result.label),
            style: class_style(&result.label),
            confidence_text: format!("Confidence: {}", format_percent(result.confidence, 2)),
            bars,
            chart: chart_segments(&ranked),
        }
    }
}

fn chart_segments(ranked: &[(&str, f64)]) -> Vec<ChartSegment> {
    let total: f64 = ranked.iter().map(|(_, p)| p.max(0.0)).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut offset = 0.0;
    ranked
        .iter()
        .map(|&(name, p)| {
            let fraction = p.max(0.0) / total;
            let segment = ChartSegment {
                class_name: name.to_string(),
                color: class_style(name).color,
                fraction,
                offset,
            };
            offset += fraction;
            segment
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ClassificationOutcome;
    use serde_json::json;
    use strum::IntoEnumIterator;

    fn result(probabilities: &[(&str, f64)], label: &str, confidence: f64) -> ClassificationResult {
        ClassificationResult {
            label: label.into(),
            confidence,
            probabilities: probabilities
                .iter()
                .map(|(name, p)| (name.to_string(), *p))
                .collect(),
            raw: serde_json::Value::Null,
        }
    }

    #[test]
    fn ranks_the_reference_response() {
        let data = json!([{
            "class": "normal",
            "confidence": 0.97,
            "probabilities": {
                "normal": 0.97,
                "adenocarcinoma": 0.02,
                "large.cell.carcinoma": 0.005,
                "squamous.cell.carcinoma": 0.005
            }
        }]);
        let result = ClassificationOutcome::from_payload(&data).into_result().unwrap();
        let view = ClassificationView::from_result(&result);

        let rows: Vec<(&str, &str)> = view
            .bars
            .iter()
            .map(|bar| (bar.class_name.as_str(), bar.percent_text.as_str()))
            .collect();
        assert_eq!(
            rows,
            [
                ("normal", "97.0%"),
                ("adenocarcinoma", "2.0%"),
                ("large.cell.carcinoma", "0.5%"),
                ("squamous.cell.carcinoma", "0.5%"),
            ]
        );
        assert_eq!(view.confidence_text, "Confidence: 97.00%");
        assert_eq!(view.display_label, "Normal");
        assert_eq!(view.style, KnownClass::Normal.style());
    }

    #[test]
    fn formats_class_names() {
        assert_eq!(format_class_name("large.cell.carcinoma"), "Large Cell Carcinoma");
        assert_eq!(format_class_name("squamous_cell-carcinoma"), "Squamous Cell Carcinoma");
        assert_eq!(format_class_name("normal"), "Normal");
        assert_eq!(format_class_name(""), "");
    }

    #[test]
    fn every_known_class_has_its_own_style() {
        let styles: Vec<ClassStyle> = KnownClass::iter().map(|c| class_style(c.as_ref())).collect();
        assert!(styles.iter().all(|s| *s != NEUTRAL_STYLE));
        for (i, a) in styles.iter().enumerate() {
            for b in &styles[i + 1..] {
                assert_ne!(a.color, b.color);
            }
        }
        assert_eq!(class_style("benign.nodule"), NEUTRAL_STYLE);
    }

    #[test]
    fn ties_break_by_class_name() {
        let view = ClassificationView::from_result(&result(
            &[("zeta", 0.25), ("alpha", 0.25), ("mid", 0.5)],
            "mid",
            0.5,
        ));
        let order: Vec<&str> = view.bars.iter().map(|b| b.class_name.as_str()).collect();
        assert_eq!(order, ["mid", "alpha", "zeta"]);
    }

    #[test]
    fn missing_probabilities_render_the_label_alone() {
        let view = ClassificationView::from_result(&result(&[], "adenocarcinoma", 0.8137));
        assert_eq!(view.bars.len(), 1);
        assert_eq!(view.bars[0].percent_text, "81.4%");
        assert_eq!(view.confidence_text, "Confidence: 81.37%");
    }

    #[test]
    fn out_of_range_values_are_clamped_for_width() {
        let view = ClassificationView::from_result(&result(&[("normal", 1.4), ("x", -0.2)], "normal", 1.4));
        assert_eq!(view.bars[0].width, 100.0);
        assert_eq!(view.bars[1].width, 0.0);
    }

    #[test]
    fn chart_follows_bar_order_and_covers_the_circle() {
        let view = ClassificationView::from_result(&result(
            &[("normal", 0.6), ("adenocarcinoma", 0.3), ("large.cell.carcinoma", 0.1)],
            "normal",
            0.6,
        ));
        let names: Vec<&str> = view.chart.iter().map(|s| s.class_name.as_str()).collect();
        assert_eq!(names, ["normal", "adenocarcinoma", "large.cell.carcinoma"]);
        assert_eq!(view.chart[0].offset, 0.0);
        assert!((view.chart[2].offset - 0.9).abs() < 1e-9);
        let covered: f64 = view.chart.iter().map(|s| s.fraction).sum();
        assert!((covered - 1.0).abs() < 1e-9);
        assert_eq!(view.chart[1].color, KnownClass::Adenocarcinoma.style().color);
    }

    #[test]
    fn all_zero_probabilities_draw_no_chart() {
        let view = ClassificationView::from_result(&result(&[("normal", 0.0)], "normal", 0.0));
        assert!(view.chart.is_empty());
        assert_eq!(view.bars[0].percent_text, "0.0%");
    }
}
