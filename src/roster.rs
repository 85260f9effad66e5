use std::path::Path;

use anyhow::Context as _;

use crate::error::{RoundelError, RoundelResult};

/// Straight (non-premultiplied) RGBA theme color, parsed from hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ThemeColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn parse_hex(s: &str) -> Result<Self, String> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> Result<u8, String> {
            u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
        }

        match s.len() {
            6 => Ok(Self {
                r: hex_byte(&s[0..2])?,
                g: hex_byte(&s[2..4])?,
                b: hex_byte(&s[4..6])?,
                a: 255,
            }),
            8 => Ok(Self {
                r: hex_byte(&s[0..2])?,
                g: hex_byte(&s[2..4])?,
                b: hex_byte(&s[4..6])?,
                a: hex_byte(&s[6..8])?,
            }),
            _ => Err("hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned()),
        }
    }
}

impl std::str::FromStr for ThemeColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl serde::Serialize for ThemeColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for ThemeColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// One avatar subject. `name` is the file-name stem for every output
/// (`<name>.png`, `<name>_original.png`, `<name>.gif`).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AgentSpec {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    pub color: ThemeColor,
}

impl AgentSpec {
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Full text prompt sent to the generation endpoint: the agent's
    /// subject fragment wrapped in the fixed portrait-style framing.
    pub fn full_prompt(&self) -> String {
        let subject = self.prompt.as_deref().unwrap_or(&self.name);
        format!(
            "professional character portrait, {subject}, \
             clean white background, centered composition, isolated subject, \
             high quality digital art, detailed fur texture, \
             vibrant colors, fantasy art style, \
             professional game character design, full body visible, \
             no artifacts, clean edges, perfect lighting"
        )
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Roster {
    pub agents: Vec<AgentSpec>,
}

impl Roster {
    /// The default seven-agent table the CLI ships with.
    pub fn builtin() -> Self {
        fn agent(name: &str, display: &str, prompt: &str, color: ThemeColor) -> AgentSpec {
            AgentSpec {
                name: name.to_string(),
                display_name: Some(display.to_string()),
                prompt: Some(prompt.to_string()),
                color,
            }
        }

        Self {
            agents: vec![
                agent(
                    "aslan",
                    "Aslan the Great",
                    "anthropomorphic majestic golden lion king wearing ornate crown, \
                     flowing golden mane, noble expression, regal powerful stance",
                    ThemeColor::rgb(0xff, 0xd7, 0x00),
                ),
                agent(
                    "eagleton",
                    "Eagleton Skywatcher",
                    "anthropomorphic teal eagle scout with spread wings, \
                     keen analytical eyes, graceful flight pose",
                    ThemeColor::rgb(0x20, 0xb2, 0xaa),
                ),
                agent(
                    "athena",
                    "Athena Nightwing",
                    "anthropomorphic indigo owl scholar with large wise eyes, \
                     scholarly appearance, holding ancient scroll",
                    ThemeColor::rgb(0x4b, 0x00, 0x82),
                ),
                agent(
                    "reynard",
                    "Reynard Swift",
                    "anthropomorphic purple fox trader with clever smile, \
                     bushy tail, cunning expression, agile stance",
                    ThemeColor::rgb(0x93, 0x70, 0xdb),
                ),
                agent(
                    "ursus",
                    "Ursus Guardian",
                    "anthropomorphic black bear guardian with strong protective stance, \
                     powerful build, armor details",
                    ThemeColor::rgb(0x2f, 0x4f, 0x4f),
                ),
                agent(
                    "luna",
                    "Luna Mysticfang",
                    "anthropomorphic violet wolf mystic with piercing eyes, \
                     mystical aura, prophetic presence",
                    ThemeColor::rgb(0x8a, 0x2b, 0xe2),
                ),
                // Dark gray rather than pure black so the silhouette stays
                // visible against dark page themes.
                agent(
                    "corvus",
                    "Corvus Messenger",
                    "anthropomorphic black raven messenger with spread wings, \
                     alert posture, swift messenger appearance",
                    ThemeColor::rgb(0x1a, 0x1a, 0x1a),
                ),
            ],
        }
    }

    pub fn from_json_file(path: &Path) -> RoundelResult<Self> {
        let f = std::fs::File::open(path)
            .with_context(|| format!("open roster '{}'", path.display()))?;
        let r = std::io::BufReader::new(f);
        let roster: Roster = serde_json::from_reader(r)
            .with_context(|| format!("parse roster JSON '{}'", path.display()))?;
        roster.validate()?;
        Ok(roster)
    }

    pub fn validate(&self) -> RoundelResult<()> {
        if self.agents.is_empty() {
            return Err(RoundelError::validation("roster must list at least one agent"));
        }
        let mut seen = std::collections::BTreeSet::new();
        for agent in &self.agents {
            if agent.name.is_empty() {
                return Err(RoundelError::validation("agent name must be non-empty"));
            }
            if !seen.insert(agent.name.as_str()) {
                return Err(RoundelError::validation(format!(
                    "duplicate agent name '{}'",
                    agent.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_hex_rgb_and_rgba() {
        let c: ThemeColor = serde_json::from_value(json!("#ff0000")).unwrap();
        assert_eq!(c, ThemeColor::rgb(255, 0, 0));

        let c: ThemeColor = serde_json::from_value(json!("0000FF80")).unwrap();
        assert_eq!(c.b, 255);
        assert_eq!(c.a, 128);

        assert!(serde_json::from_value::<ThemeColor>(json!("#12345")).is_err());
    }

    #[test]
    fn hex_round_trips() {
        let c = ThemeColor::rgb(0x20, 0xb2, 0xaa);
        assert_eq!(c.to_hex(), "#20b2aa");
        assert_eq!(ThemeColor::parse_hex(&c.to_hex()).unwrap(), c);

        let translucent = ThemeColor { a: 16, ..c };
        assert_eq!(translucent.to_hex(), "#20b2aa10");
        assert_eq!(
            ThemeColor::parse_hex(&translucent.to_hex()).unwrap(),
            translucent
        );
    }

    #[test]
    fn builtin_roster_validates() {
        let roster = Roster::builtin();
        roster.validate().unwrap();
        assert_eq!(roster.agents.len(), 7);
        assert_eq!(roster.agents[0].name, "aslan");
    }

    #[test]
    fn validate_rejects_duplicates_and_empty() {
        let mut roster = Roster::builtin();
        roster.agents[1].name = "aslan".to_string();
        assert!(roster.validate().is_err());

        let empty = Roster { agents: vec![] };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn full_prompt_wraps_subject_fragment() {
        let roster = Roster::builtin();
        let prompt = roster.agents[0].full_prompt();
        assert!(prompt.contains("golden lion king"));
        assert!(prompt.starts_with("professional character portrait"));
        assert!(prompt.contains("clean white background"));
    }

    #[test]
    fn roster_json_round_trips() {
        let roster = Roster::builtin();
        let text = serde_json::to_string(&roster).unwrap();
        let back: Roster = serde_json::from_str(&text).unwrap();
        back.validate().unwrap();
        assert_eq!(back.agents[6].color, ThemeColor::rgb(0x1a, 0x1a, 0x1a));
    }
}
