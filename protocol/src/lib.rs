//! JSON messages exchanged with the host shell, one message per line.
//!
//! Every message is an envelope `{"action": <name>, "data": <payload>}`. Inbound messages select
//! and configure a minigame or carry player input; outbound messages report round results and
//! mirror the state a renderer needs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message from the host shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum Inbound {
    /// Selects a minigame and (re)configures it.
    PlayMinigame(PlayMinigame),
    /// Routing hint, does not affect the running round.
    NavigateMinigame(NavigateMinigame),
    /// Player input, tagged with the minigame it targets.
    Input(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayMinigame {
    pub minigame: String,
    /// Puzzle-specific settings; missing or malformed fields fall back to defaults.
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigateMinigame {
    pub minigame: String,
}

/// Message to the host shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum Outbound {
    /// A hosted round ended.
    FinishedMinigame { result: bool },
    Status(StatusUpdate),
    Effect { sound: Sound },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub minigame: String,
    /// Numeric round status: 0 idle, 1 running, 2 lost, 3 won, 4 resetting.
    pub status: u8,
    pub phase: usize,
    pub remaining_ms: u64,
    /// Elapsed fraction of the current phase, for a timer bar.
    pub progress: f32,
    pub board: Value,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Sound {
    Success,
    Failed,
    KeyPress,
}

impl Inbound {
    pub fn parse(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

impl Outbound {
    pub fn finished(result: bool) -> Self {
        Self::FinishedMinigame { result }
    }

    /// Single-line JSON encoding.
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_play_request() {
        let inbound = Inbound::parse(
            r#"{"action":"playMinigame","data":{"minigame":"chopping","data":{"letters":12}}}"#,
        )
        .unwrap();

        assert_eq!(
            inbound,
            Inbound::PlayMinigame(PlayMinigame {
                minigame: "chopping".into(),
                data: json!({ "letters": 12 }),
            })
        );
    }

    #[test]
    fn play_request_without_settings_has_null_data() {
        let inbound =
            Inbound::parse(r#"{"action":"playMinigame","data":{"minigame":"thermite"}}"#).unwrap();

        let Inbound::PlayMinigame(play) = inbound else {
            panic!("expected playMinigame, got {inbound:?}");
        };
        assert_eq!(play.data, Value::Null);
    }

    #[test]
    fn parses_navigation_and_input() {
        assert_eq!(
            Inbound::parse(r#"{"action":"navigateMinigame","data":{"minigame":"lockpick"}}"#).unwrap(),
            Inbound::NavigateMinigame(NavigateMinigame {
                minigame: "lockpick".into()
            })
        );

        let input = Inbound::parse(
            r#"{"action":"input","data":{"minigame":"lockpick","action":"Unlock"}}"#,
        )
        .unwrap();
        assert_eq!(
            input,
            Inbound::Input(json!({ "minigame": "lockpick", "action": "Unlock" }))
        );
    }

    #[test]
    fn rejects_unknown_actions() {
        assert!(Inbound::parse(r#"{"action":"selfDestruct","data":{}}"#).is_err());
        assert!(Inbound::parse("not json").is_err());
    }

    #[test]
    fn finished_message_matches_host_contract() {
        let line = Outbound::finished(true).to_line().unwrap();

        assert_eq!(
            serde_json::from_str::<Value>(&line).unwrap(),
            json!({ "action": "finishedMinigame", "data": { "result": true } })
        );
    }

    #[test]
    fn status_uses_camel_case_fields() {
        let update = Outbound::Status(StatusUpdate {
            minigame: "pincracker".into(),
            status: 1,
            phase: 0,
            remaining_ms: 19_000,
            progress: 0.5,
            board: Value::Null,
        });

        let value = serde_json::to_value(&update).unwrap();

        assert_eq!(value["action"], "status");
        assert_eq!(value["data"]["remainingMs"], 19_000);
        assert_eq!(
            serde_json::to_value(Outbound::Effect { sound: Sound::KeyPress }).unwrap(),
            json!({ "action": "effect", "data": { "sound": "keyPress" } })
        );
    }
}
