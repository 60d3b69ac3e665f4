//! Shared document model for collaborative mitplans
//!
//! A `Mitplan` is the root aggregate that connected clients edit together:
//! a set of named sheets (timeline lane-sets) plus a roster of players.
//! The durable store owns the document; the hot cache and every connected
//! client hold copies of it. State updates replace the whole document
//! (last write wins), so these types are plain serde data with no interior
//! bookkeeping.
//!
//! Wire names are camelCase to match the existing client protocol.

use crate::encounters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Number of parallel lanes a freshly created sheet starts with
pub const DEFAULT_COLUMN_COUNT: u32 = 5;

/// Root shared document, keyed by its generated id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mitplan {
    pub id: String,
    #[serde(default)]
    pub sheets: HashMap<String, Sheet>,
    #[serde(default)]
    pub roster: Roster,
}

/// One named sub-timeline within a mitplan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub assignment_events: HashMap<String, AssignmentEvent>,
    pub encounter_id: String,
    pub encounter: Encounter,
    pub column_count: u32,
}

/// A user-placed marker on a sheet's timeline
///
/// `column_id` is a 1-based lane index. The server does not validate it
/// against the sheet's `column_count`; lane layout is the client's concern
/// and out-of-range values are stored as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentEvent {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Seconds into the encounter; clamped to `[0, fightLength]` on commit
    pub timestamp: f64,
    pub column_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Player id this event is assigned to; absent = unassigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Event payload variant, discriminated by a `type` field
///
/// The discriminator is produced and consumed by the client; the server
/// passes it through untouched. Plain markers may omit `type` entirely on
/// the wire (the base event shape carries no discriminator, only the
/// cooldown/text payloads do), so a missing `type` deserializes as `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventKind {
    /// Plain marker with no payload
    None,
    /// Cooldown usage of a class ability
    Cooldown { ability: AbilityRef },
    /// Free-form text note
    Text { content: String },
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        #[derive(Deserialize)]
        struct Tagged {
            #[serde(rename = "type", default)]
            kind: Option<String>,
            #[serde(default)]
            ability: Option<AbilityRef>,
            #[serde(default)]
            content: Option<String>,
        }

        let tagged = Tagged::deserialize(deserializer)?;
        match tagged.kind.as_deref() {
            None | Some("none") => Ok(EventKind::None),
            Some("cooldown") => Ok(EventKind::Cooldown {
                ability: tagged
                    .ability
                    .ok_or_else(|| D::Error::missing_field("ability"))?,
            }),
            Some("text") => Ok(EventKind::Text {
                content: tagged
                    .content
                    .ok_or_else(|| D::Error::missing_field("content"))?,
            }),
            Some(other) => Err(D::Error::unknown_variant(
                other,
                &["none", "cooldown", "text"],
            )),
        }
    }
}

/// Reference to a class ability carried by cooldown-type events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spell_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// Per-mitplan list of participants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    #[serde(default)]
    pub players: HashMap<String, Player>,
}

/// One roster participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(rename = "class")]
    pub wow_class: String,
    pub spec: String,
    /// Availability per sheet id
    #[serde(default)]
    pub roster_states: HashMap<String, RosterState>,
}

/// Player availability for one sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RosterState {
    In,
    Tentative,
    Bench,
    Unavailable,
    Out,
}

/// Read-only boss-fight timeline referenced by sheets
///
/// Not mutated by this service; new sheets embed a copy of the reference
/// encounter they were created against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub id: String,
    pub name: String,
    pub events: Vec<EncounterEvent>,
    /// Total encounter duration in seconds
    pub fight_length: f64,
}

/// One fixed boss-ability marker on the encounter timeline
///
/// Field names stay snake_case on the wire; this matches the existing
/// encounter data files consumed by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterEvent {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spellid: Option<u32>,
    pub timer_dynamic: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_end: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Mitplan {
    /// Initial document template for a newly created mitplan:
    /// one default sheet against the default encounter, empty roster
    pub fn initial(id: &str) -> Self {
        let encounter = encounters::default_encounter();
        let sheet_id = Uuid::new_v4().to_string();
        let sheet = Sheet {
            id: sheet_id.clone(),
            name: "Sheet 1".to_string(),
            assignment_events: HashMap::new(),
            encounter_id: encounter.id.clone(),
            encounter,
            column_count: DEFAULT_COLUMN_COUNT,
        };

        let mut sheets = HashMap::new();
        sheets.insert(sheet_id, sheet);

        Mitplan {
            id: id.to_string(),
            sheets,
            roster: Roster::default(),
        }
    }

    /// Clamp every assignment event's timestamp into its sheet's encounter
    /// window `[0, fightLength]`
    ///
    /// Out-of-range timestamps are corrected, never rejected.
    pub fn clamp_timestamps(&mut self) {
        for sheet in self.sheets.values_mut() {
            let max = sheet.encounter.fight_length.max(0.0);
            for event in sheet.assignment_events.values_mut() {
                if !event.timestamp.is_finite() {
                    event.timestamp = 0.0;
                } else {
                    event.timestamp = event.timestamp.max(0.0).min(max);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(id: &str, timestamp: f64, column_id: u32) -> AssignmentEvent {
        AssignmentEvent {
            id: id.to_string(),
            name: format!("event {id}"),
            timestamp,
            column_id,
            color: None,
            icon: None,
            assignee: None,
            kind: EventKind::None,
        }
    }

    fn sheet_of(plan: &Mitplan) -> &Sheet {
        plan.sheets.values().next().unwrap()
    }

    #[test]
    fn initial_document_has_one_default_sheet() {
        let plan = Mitplan::initial("fierce-mighty-kobold");
        assert_eq!(plan.id, "fierce-mighty-kobold");
        assert_eq!(plan.sheets.len(), 1);
        assert!(plan.roster.players.is_empty());

        let sheet = sheet_of(&plan);
        assert_eq!(sheet.name, "Sheet 1");
        assert_eq!(sheet.column_count, DEFAULT_COLUMN_COUNT);
        assert_eq!(sheet.encounter_id, "default");
        assert!(sheet.assignment_events.is_empty());
        assert_eq!(sheet.encounter.fight_length, 300.0);
    }

    #[test]
    fn clamp_corrects_out_of_range_timestamps() {
        let mut plan = Mitplan::initial("test-clamp-plan");
        let sheet_id = sheet_of(&plan).id.clone();
        let sheet = plan.sheets.get_mut(&sheet_id).unwrap();
        sheet
            .assignment_events
            .insert("early".into(), marker("early", -5.0, 1));
        sheet
            .assignment_events
            .insert("late".into(), marker("late", 10_000.0, 1));
        sheet
            .assignment_events
            .insert("fine".into(), marker("fine", 12.5, 1));

        plan.clamp_timestamps();

        let events = &plan.sheets[&sheet_id].assignment_events;
        assert_eq!(events["early"].timestamp, 0.0);
        assert_eq!(events["late"].timestamp, 300.0);
        assert_eq!(events["fine"].timestamp, 12.5);
    }

    #[test]
    fn clamp_does_not_touch_column_ids() {
        // Lane indexes beyond columnCount are deliberately left alone
        let mut plan = Mitplan::initial("test-permissive-plan");
        let sheet_id = sheet_of(&plan).id.clone();
        plan.sheets
            .get_mut(&sheet_id)
            .unwrap()
            .assignment_events
            .insert("wide".into(), marker("wide", 1.0, 99));

        plan.clamp_timestamps();
        assert_eq!(
            plan.sheets[&sheet_id].assignment_events["wide"].column_id,
            99
        );
    }

    #[test]
    fn event_kind_discriminator_round_trips() {
        let event = AssignmentEvent {
            id: "e1".into(),
            name: "Barrier".into(),
            timestamp: 42.0,
            column_id: 2,
            color: Some("#0000FF".into()),
            icon: None,
            assignee: Some("player-1".into()),
            kind: EventKind::Cooldown {
                ability: AbilityRef {
                    name: "Power Word: Barrier".into(),
                    spell_id: Some(62618),
                    cooldown: Some(180.0),
                    duration: Some(10.0),
                },
            },
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "cooldown");
        assert_eq!(json["ability"]["spellId"], 62618);
        assert_eq!(json["columnId"], 2);

        let back: AssignmentEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn text_event_parses_from_wire_json() {
        let raw = r#"{
            "id": "note-1",
            "name": "positioning",
            "timestamp": 55.5,
            "columnId": 3,
            "type": "text",
            "content": "stack on tank"
        }"#;
        let event: AssignmentEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(
            event.kind,
            EventKind::Text {
                content: "stack on tank".into()
            }
        );
        assert_eq!(event.assignee, None);
    }

    #[test]
    fn event_without_type_field_parses_as_plain_marker() {
        // The minimal base event shape: no name, no discriminator
        let raw = r#"{"id":"e1","timestamp":12.5,"columnId":1}"#;
        let event: AssignmentEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.kind, EventKind::None);
        assert_eq!(event.timestamp, 12.5);
        assert_eq!(event.column_id, 1);
        assert_eq!(event.name, "");
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let raw = r#"{"id":"e1","timestamp":1.0,"columnId":1,"type":"hologram"}"#;
        assert!(serde_json::from_str::<AssignmentEvent>(raw).is_err());
    }

    #[test]
    fn cooldown_event_without_ability_is_rejected() {
        let raw = r#"{"id":"e1","timestamp":1.0,"columnId":1,"type":"cooldown"}"#;
        assert!(serde_json::from_str::<AssignmentEvent>(raw).is_err());
    }

    #[test]
    fn roster_state_uses_lowercase_wire_names() {
        let player = Player {
            id: "p1".into(),
            name: "Anduin".into(),
            wow_class: "Priest".into(),
            spec: "Discipline".into(),
            roster_states: HashMap::from([
                ("s1".to_string(), RosterState::In),
                ("s2".to_string(), RosterState::Tentative),
            ]),
        };

        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["class"], "Priest");
        assert_eq!(json["rosterStates"]["s1"], "in");
        assert_eq!(json["rosterStates"]["s2"], "tentative");

        let back: Player = serde_json::from_value(json).unwrap();
        assert_eq!(back, player);
    }

    #[test]
    fn unknown_roster_state_is_rejected() {
        let raw = r#"{"id":"p1","name":"x","class":"Mage","spec":"Frost","rosterStates":{"s1":"maybe"}}"#;
        assert!(serde_json::from_str::<Player>(raw).is_err());
    }

    #[test]
    fn document_round_trips_through_json() {
        let mut plan = Mitplan::initial("whimsical-jolly-murloc");
        let sheet_id = sheet_of(&plan).id.clone();
        plan.sheets
            .get_mut(&sheet_id)
            .unwrap()
            .assignment_events
            .insert("e1".into(), marker("e1", 12.5, 1));
        plan.roster.players.insert(
            "p1".into(),
            Player {
                id: "p1".into(),
                name: "Jaina".into(),
                wow_class: "Mage".into(),
                spec: "Frost".into(),
                roster_states: HashMap::new(),
            },
        );

        let raw = serde_json::to_string(&plan).unwrap();
        let back: Mitplan = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, plan);
    }
}
