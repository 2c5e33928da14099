//! Built-in metrics for the Courier and Helvetica core families.
//!
//! Core fonts are never embedded; the viewer supplies the glyphs. Only the
//! widths are needed to lay out text. All four Courier styles share one
//! fixed width, Helvetica and Helvetica-Oblique share one table, and the
//! bold styles share another.

use super::{cp1252_unicode_map, FontDefinition, FontKind, FontSource};
use crate::error::{FolioError, Result};

/// Metrics source for the core families compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreFonts;

impl FontSource for CoreFonts {
    fn load(&self, family: &str, style: &str) -> Result<FontDefinition> {
        let (name, widths): (&str, &[u16; 256]) = match (family, style) {
            ("courier", "") => ("Courier", &COURIER),
            ("courier", "B") => ("Courier-Bold", &COURIER),
            ("courier", "I") => ("Courier-Oblique", &COURIER),
            ("courier", "BI") => ("Courier-BoldOblique", &COURIER),
            ("helvetica", "") => ("Helvetica", &HELVETICA),
            ("helvetica", "I") => ("Helvetica-Oblique", &HELVETICA),
            ("helvetica", "B") => ("Helvetica-Bold", &HELVETICA_BOLD),
            ("helvetica", "BI") => ("Helvetica-BoldOblique", &HELVETICA_BOLD),
            _ => {
                return Err(FolioError::config(format!(
                    "No font definition for {} {}",
                    family, style
                )))
            }
        };
        Ok(FontDefinition {
            name: name.to_string(),
            kind: FontKind::Core,
            widths: widths.to_vec(),
            underline_position: -100,
            underline_thickness: 50,
            descriptor: None,
            diff: None,
            encoding: Some("cp1252".to_string()),
            unicode_map: Some(cp1252_unicode_map()),
            subsetted: false,
        })
    }
}

const COURIER: [u16; 256] = [600; 256];

const HELVETICA: [u16; 256] = [
    278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278,
    278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278,
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 350,
    556, 350, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350,
    350, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 350, 500, 667,
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 500, 500, 556, 500,
];

const HELVETICA_BOLD: [u16; 256] = [
    278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278,
    278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278,
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, 350,
    556, 350, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350,
    350, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 350, 500, 667,
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];
