//! Scroll-driven background tinting: each page section carries a near-black
//! tint, and the section under the viewport center wins.

/// Vertical extent of one page section.
#[derive(Clone, Debug)]
pub struct SectionBand {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl SectionBand {
    pub fn contains(&self, y: f64) -> bool {
        y >= self.top && y < self.top + self.height
    }
}

/// Background color for a section id. Unknown sections fall back to the hero
/// tint (pure black).
pub fn tint_for(section: &str) -> &'static str {
    match section {
        "story" => "#020308",
        "work" => "#040206",
        "contact" => "#030405",
        _ => "#000000",
    }
}

/// The section the viewport-center probe lands in, if any.
pub fn active_section<'a>(bands: &'a [SectionBand], probe_y: f64) -> Option<&'a str> {
    bands
        .iter()
        .find(|b| b.contains(probe_y))
        .map(|b| b.id.as_str())
}

/// Convenience: background color for a scroll position, defaulting to the
/// hero tint between sections.
pub fn tint_at(bands: &[SectionBand], probe_y: f64) -> &'static str {
    tint_for(active_section(bands, probe_y).unwrap_or("hero"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bands() -> Vec<SectionBand> {
        [("hero", 0.0, 800.0), ("story", 800.0, 600.0), ("work", 1400.0, 1000.0), ("contact", 2400.0, 500.0)]
            .into_iter()
            .map(|(id, top, height)| SectionBand {
                id: id.to_string(),
                top,
                height,
            })
            .collect()
    }

    #[test]
    fn probe_picks_the_containing_section() {
        let bands = bands();
        assert_eq!(active_section(&bands, 100.0), Some("hero"));
        assert_eq!(active_section(&bands, 900.0), Some("story"));
        assert_eq!(active_section(&bands, 1400.0), Some("work"));
        assert_eq!(active_section(&bands, 2899.0), Some("contact"));
        assert_eq!(active_section(&bands, 5000.0), None);
    }

    #[test]
    fn band_bounds_are_half_open() {
        let bands = bands();
        // The boundary pixel belongs to the next section down.
        assert_eq!(active_section(&bands, 800.0), Some("story"));
        assert_eq!(active_section(&bands, 799.9), Some("hero"));
    }

    #[test]
    fn unknown_sections_fall_back_to_hero_black() {
        assert_eq!(tint_for("hero"), "#000000");
        assert_eq!(tint_for("garage"), "#000000");
        assert_eq!(tint_at(&bands(), 99999.0), "#000000");
        assert_eq!(tint_at(&bands(), 1500.0), "#040206");
    }
}
