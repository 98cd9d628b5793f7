/// A seat at the roundtable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Agent {
    /// Identifier used in wire events.
    pub key: &'static str,
    pub display_name: &'static str,
    pub persona: &'static str,
}

/// Agents in speaking order.
pub const AGENTS: [Agent; 4] = [
    Agent {
        key: "director",
        display_name: "Director",
        persona: "You are the director. You own the emotional intent of the scene: what the \
audience must feel, where the dramatic beat lands and how performances should read on camera.",
    },
    Agent {
        key: "cinematographer",
        display_name: "Cinematographer",
        persona: "You are the cinematographer. You think in lenses, framing, camera movement, \
lighting ratios and colour temperature, and you keep the series' visual style consistent.",
    },
    Agent {
        key: "screenwriter",
        display_name: "Screenwriter",
        persona: "You are the screenwriter. You protect story logic, character motivation and \
dialogue timing, and you flag anything the shot would show that contradicts the script.",
    },
    Agent {
        key: "production_designer",
        display_name: "Production Designer",
        persona: "You are the production designer. You describe the physical world: set \
dressing, props, textures, wardrobe and how the location reads at this time of day.",
    },
];

impl Agent {
    pub fn find(key: &str) -> Option<&'static Agent> {
        AGENTS.iter().find(|a| a.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique_snake_case() {
        for (i, agent) in AGENTS.iter().enumerate() {
            assert!(agent
                .key
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_'));
            assert!(AGENTS[i + 1..].iter().all(|other| other.key != agent.key));
        }
    }

    #[test]
    fn find_by_key() {
        assert_eq!(
            Agent::find("cinematographer").map(|a| a.display_name),
            Some("Cinematographer")
        );
        assert!(Agent::find("producer").is_none());
    }
}
