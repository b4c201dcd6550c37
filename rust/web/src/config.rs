//! Environment-driven configuration, loaded once at process start and
//! passed down by value. Unparseable numerics fall back to their
//! defaults rather than failing startup.

use std::env;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Record per-action experiences into the replay buffer.
    pub replay_enabled: bool,
    pub replay_capacity: usize,
    /// Seat policy for AI-controlled seats: `random`, `strategy`, or
    /// `passive`.
    pub ai_mode: String,
    pub ai_seed: Option<u64>,
    /// UX pacing between AI moves, milliseconds.
    pub ai_turn_delay_ms: u64,
    /// Pause before the final TABLE_END broadcast, milliseconds.
    pub hand_end_pause_ms: u64,
    /// Emit per-session game trace events.
    pub game_trace: bool,
    pub ai_strategy_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            replay_enabled: false,
            replay_capacity: 10_000,
            ai_mode: "random".to_string(),
            ai_seed: None,
            ai_turn_delay_ms: 800,
            hand_end_pause_ms: 5_000,
            game_trace: true,
            ai_strategy_path: None,
        }
    }
}

fn env_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` plugs in the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            replay_enabled: lookup("REPLAY_ENABLED")
                .map(|raw| env_bool(&raw))
                .unwrap_or(defaults.replay_enabled),
            replay_capacity: lookup("REPLAY_CAPACITY")
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(defaults.replay_capacity),
            ai_mode: lookup("AI_MODE")
                .map(|raw| raw.trim().to_ascii_lowercase())
                .unwrap_or(defaults.ai_mode),
            ai_seed: lookup("AI_SEED").and_then(|raw| raw.trim().parse().ok()),
            ai_turn_delay_ms: lookup("AI_TURN_DELAY_MS")
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(defaults.ai_turn_delay_ms),
            hand_end_pause_ms: lookup("HAND_END_PAUSE_MS")
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(defaults.hand_end_pause_ms),
            game_trace: lookup("GAME_TRACE")
                .map(|raw| env_bool(&raw))
                .unwrap_or(defaults.game_trace),
            ai_strategy_path: lookup("AI_STRATEGY_PATH"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.ai_turn_delay_ms, 800);
        assert_eq!(config.hand_end_pause_ms, 5000);
        assert_eq!(config.replay_capacity, 10_000);
        assert!(config.game_trace);
        assert!(!config.replay_enabled);
    }

    #[test]
    fn environment_values_override_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("REPLAY_ENABLED", "true"),
            ("REPLAY_CAPACITY", "500"),
            ("AI_MODE", "Strategy"),
            ("AI_SEED", "42"),
            ("AI_TURN_DELAY_MS", "0"),
            ("HAND_END_PAUSE_MS", "100"),
            ("GAME_TRACE", "off"),
            ("AI_STRATEGY_PATH", "/tmp/strategy.json"),
        ]));
        assert!(config.replay_enabled);
        assert_eq!(config.replay_capacity, 500);
        assert_eq!(config.ai_mode, "strategy");
        assert_eq!(config.ai_seed, Some(42));
        assert_eq!(config.ai_turn_delay_ms, 0);
        assert_eq!(config.hand_end_pause_ms, 100);
        assert!(!config.game_trace);
        assert_eq!(
            config.ai_strategy_path.as_deref(),
            Some("/tmp/strategy.json")
        );
    }

    #[test]
    fn malformed_numbers_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("REPLAY_CAPACITY", "lots"),
            ("AI_TURN_DELAY_MS", "-5"),
            ("AI_SEED", "not-a-number"),
        ]));
        assert_eq!(config.replay_capacity, 10_000);
        assert_eq!(config.ai_turn_delay_ms, 800);
        assert_eq!(config.ai_seed, None);
    }

    #[test]
    fn boolean_parsing_accepts_common_forms() {
        for raw in ["1", "true", "YES", " on ", "y"] {
            assert!(env_bool(raw), "{raw} should be true");
        }
        for raw in ["0", "false", "off", "no", ""] {
            assert!(!env_bool(raw), "{raw} should be false");
        }
    }
}
