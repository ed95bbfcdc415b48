use player_registry::{DirectoryEntry, DraftedIdSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sleeper player record; the API sends many more fields, all ignored here
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SleeperPlayer {
    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub team: Option<String>,

    #[serde(default)]
    pub position: Option<String>,
}

/// `/players/nfl` body: player id to record, where a record may be null
///
/// Decoded into an ordered map so directory order (ascending id) is stable.
pub type PlayerDirectoryResponse = BTreeMap<String, Option<SleeperPlayer>>;

/// One entry of `/draft/{id}/picks`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DraftPick {
    #[serde(default)]
    pub player_id: Option<String>,

    #[serde(default)]
    pub pick_no: Option<u32>,

    #[serde(default)]
    pub round: Option<u32>,

    #[serde(default)]
    pub picked_by: Option<String>,
}

impl SleeperPlayer {
    /// Convert to a directory entry
    pub fn to_directory_entry(&self, id: &str) -> DirectoryEntry {
        DirectoryEntry {
            id: id.to_string(),
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            team: self.team.clone(),
            position: self.position.clone(),
        }
    }
}

/// Flatten a directory response, skipping null records
pub fn into_directory(response: PlayerDirectoryResponse) -> Vec<DirectoryEntry> {
    response
        .iter()
        .filter_map(|(id, player)| player.as_ref().map(|p| p.to_directory_entry(id)))
        .collect()
}

/// Ids of every pick that names a player
pub fn drafted_ids(picks: &[DraftPick]) -> DraftedIdSet {
    DraftedIdSet::from_ids(picks.iter().filter_map(|pick| pick.player_id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_skips_null_records_and_keeps_id_order() {
        let body = r#"{
            "6794": {"first_name": "Justin", "last_name": "Jefferson", "team": "MIN", "position": "WR", "age": 26},
            "1111": null,
            "4984": {"first_name": "Josh", "last_name": "Allen", "team": "BUF", "position": "QB"},
            "HOU": {"last_name": "Texans", "team": "HOU", "position": "DEF"}
        }"#;
        let response: PlayerDirectoryResponse = serde_json::from_str(body).unwrap();
        let directory = into_directory(response);

        let ids: Vec<&str> = directory.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["4984", "6794", "HOU"]);
        assert_eq!(directory[2].first_name, "");
        assert_eq!(directory[2].full_name(), "Texans");
    }

    #[test]
    fn test_drafted_ids_ignore_missing_players() {
        let body = r#"[
            {"player_id": "4984", "pick_no": 1, "round": 1, "picked_by": "u1"},
            {"player_id": null, "pick_no": 2, "round": 1},
            {"player_id": "", "pick_no": 3},
            {"player_id": "6794", "pick_no": 4, "round": 1, "metadata": {"first_name": "Justin"}}
        ]"#;
        let picks: Vec<DraftPick> = serde_json::from_str(body).unwrap();
        let drafted = drafted_ids(&picks);

        assert_eq!(drafted.len(), 2);
        assert!(drafted.contains("4984"));
        assert!(drafted.contains("6794"));
    }
}
