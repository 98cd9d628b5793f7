//! The creative brief every agent receives.

use std::fmt::Write;

#[derive(Debug, Clone, Default)]
pub struct SettingBrief {
    pub name: String,
    pub setting_type: String,
    pub time_of_day: String,
    pub description: Option<String>,
    pub atmosphere: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CastMember {
    pub name: String,
    pub role: String,
    /// Visual fingerprint summary when the character has been analyzed,
    /// otherwise the written appearance notes.
    pub appearance: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StyleBrief {
    pub style_name: Option<String>,
    pub color_palette: Vec<String>,
    pub lighting: Option<String>,
    pub camera_style: Option<String>,
    pub aspect_ratio: Option<String>,
    pub film_stock: Option<String>,
    pub reference_notes: Option<String>,
}

/// Everything known about one segment, assembled by the API from the
/// database before a run starts.
#[derive(Debug, Clone, Default)]
pub struct RoundtableBrief {
    pub series_title: String,
    pub episode_title: String,
    pub segment_title: String,
    pub description: Option<String>,
    pub dialogue: Option<String>,
    pub duration_secs: f64,
    pub setting: Option<SettingBrief>,
    pub cast: Vec<CastMember>,
    pub style: Option<StyleBrief>,
}

fn line(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        let _ = writeln!(out, "{label}: {value}");
    }
}

impl RoundtableBrief {
    /// Render as the plain-text brief placed in every agent prompt.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "SERIES: {}", self.series_title);
        let _ = writeln!(out, "EPISODE: {}", self.episode_title);
        let _ = writeln!(
            out,
            "SEGMENT: {} ({:.1} seconds)",
            self.segment_title, self.duration_secs
        );
        line(&mut out, "Action", self.description.as_deref());
        line(&mut out, "Dialogue", self.dialogue.as_deref());

        if let Some(setting) = &self.setting {
            let _ = writeln!(
                out,
                "\nSETTING: {} ({}, {})",
                setting.name, setting.setting_type, setting.time_of_day
            );
            line(&mut out, "Description", setting.description.as_deref());
            line(&mut out, "Atmosphere", setting.atmosphere.as_deref());
        }

        if !self.cast.is_empty() {
            out.push_str("\nCHARACTERS:\n");
            for member in &self.cast {
                let _ = write!(out, "- {} ({})", member.name, member.role);
                match member.appearance.as_deref().filter(|a| !a.trim().is_empty()) {
                    Some(appearance) => {
                        let _ = writeln!(out, ": {}", appearance.trim());
                    }
                    None => out.push('\n'),
                }
            }
        }

        if let Some(style) = &self.style {
            out.push_str("\nVISUAL STYLE:\n");
            line(&mut out, "Name", style.style_name.as_deref());
            if !style.color_palette.is_empty() {
                let _ = writeln!(out, "Palette: {}", style.color_palette.join(", "));
            }
            line(&mut out, "Lighting", style.lighting.as_deref());
            line(&mut out, "Camera", style.camera_style.as_deref());
            line(&mut out, "Aspect ratio", style.aspect_ratio.as_deref());
            line(&mut out, "Film stock", style.film_stock.as_deref());
            line(&mut out, "Notes", style.reference_notes.as_deref());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_sections() {
        let brief = RoundtableBrief {
            series_title: "Night Shift".into(),
            episode_title: "Pilot".into(),
            segment_title: "Pulse check".into(),
            description: Some("Mara kneels over a patient.".into()),
            dialogue: Some("Stay with me.".into()),
            duration_secs: 6.0,
            setting: Some(SettingBrief {
                name: "Ambulance".into(),
                setting_type: "interior".into(),
                time_of_day: "night".into(),
                description: None,
                atmosphere: Some("cramped, strobing light".into()),
            }),
            cast: vec![CastMember {
                name: "Mara".into(),
                role: "protagonist".into(),
                appearance: Some("Wiry, scar over left brow.".into()),
            }],
            style: Some(StyleBrief {
                color_palette: vec!["#0b1d3a".into(), "teal".into()],
                aspect_ratio: Some("2.39:1".into()),
                ..Default::default()
            }),
        };

        let text = brief.render();
        assert!(text.contains("SEGMENT: Pulse check (6.0 seconds)"));
        assert!(text.contains("SETTING: Ambulance (interior, night)"));
        assert!(text.contains("Atmosphere: cramped, strobing light"));
        assert!(!text.contains("Description:"));
        assert!(text.contains("- Mara (protagonist): Wiry, scar over left brow."));
        assert!(text.contains("Palette: #0b1d3a, teal"));
        assert!(text.contains("Aspect ratio: 2.39:1"));
    }

    #[test]
    fn minimal_brief_omits_optional_sections() {
        let text = RoundtableBrief {
            segment_title: "Cold open".into(),
            duration_secs: 5.0,
            ..Default::default()
        }
        .render();
        assert!(!text.contains("SETTING"));
        assert!(!text.contains("CHARACTERS"));
        assert!(!text.contains("VISUAL STYLE"));
    }
}
