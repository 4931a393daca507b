/// Colour palette shared by the HTML report and the SVG share card.
///
/// Values are CSS colour strings usable both in stylesheets and in SVG
/// `fill` attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    // ── Background ───────────────────────────────────────────────────────────
    pub bg_dark: &'static str,
    pub bg_mid: &'static str,
    pub surface: &'static str,
    pub border: &'static str,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text_primary: &'static str,
    pub text_secondary: &'static str,
    pub text_muted: &'static str,

    // ── Accents ──────────────────────────────────────────────────────────────
    pub accent_cyan: &'static str,
    pub accent_emerald: &'static str,
    pub accent_violet: &'static str,
    pub accent_rose: &'static str,

    // ── Heat scale ───────────────────────────────────────────────────────────
    /// Empty bucket first, brightest last.
    pub heat: [&'static str; 5],
}

impl Theme {
    /// Dark theme used for every rendered artifact.
    pub fn dark() -> Self {
        Self {
            bg_dark: "#0a0e1a",
            bg_mid: "#0f1628",
            surface: "#1e293b",
            border: "#334155",

            text_primary: "#f1f5f9",
            text_secondary: "#94a3b8",
            text_muted: "#64748b",

            accent_cyan: "#22d3ee",
            accent_emerald: "#34d399",
            accent_violet: "#a78bfa",
            accent_rose: "#fb7185",

            heat: ["#1e293b", "#164e63", "#0e7490", "#06b6d4", "#22d3ee"],
        }
    }

    /// Heat colour for `value` relative to `max`.
    pub fn heat_color(&self, value: usize, max: usize) -> &'static str {
        self.heat[heat_level(value, max)]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// Quartile bucket of `value / max`: 0 for empty, 1..=4 otherwise.
pub fn heat_level(value: usize, max: usize) -> usize {
    if max == 0 || value == 0 {
        return 0;
    }
    let ratio = value as f64 / max as f64;
    match ratio {
        r if r < 0.25 => 1,
        r if r < 0.50 => 2,
        r if r < 0.75 => 3,
        _ => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heat_level_quartiles() {
        assert_eq!(heat_level(0, 10), 0);
        assert_eq!(heat_level(5, 0), 0);
        assert_eq!(heat_level(1, 10), 1);
        assert_eq!(heat_level(3, 10), 2);
        assert_eq!(heat_level(5, 10), 3);
        assert_eq!(heat_level(10, 10), 4);
    }

    #[test]
    fn test_heat_color_uses_palette() {
        let theme = Theme::dark();
        assert_eq!(theme.heat_color(0, 4), theme.surface);
        assert_eq!(theme.heat_color(4, 4), theme.accent_cyan);
    }
}
