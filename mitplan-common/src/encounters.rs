//! Built-in encounter reference data
//!
//! Encounters are read-only timelines the client lays sheets against. The
//! full encounter library ships with the frontend; the server only needs
//! the default encounter to seed newly created mitplans.

use crate::model::{Encounter, EncounterEvent};

/// The placeholder encounter every new sheet starts against
pub fn default_encounter() -> Encounter {
    Encounter {
        id: "default".to_string(),
        name: "Default Encounter".to_string(),
        fight_length: 300.0,
        events: vec![
            EncounterEvent {
                id: 1,
                name: "Ability One".to_string(),
                simple_name: Some("Ability 1".to_string()),
                spellid: Some(100001),
                timer_dynamic: 10.0,
                phase_start: Some(0.0),
                phase_end: Some(600.0),
                cleu: None,
                color: Some("#FF0000".to_string()),
            },
            EncounterEvent {
                id: 2,
                name: "Ability Two".to_string(),
                simple_name: Some("Ability 2".to_string()),
                spellid: Some(100002),
                timer_dynamic: 20.0,
                phase_start: Some(0.0),
                phase_end: Some(600.0),
                cleu: None,
                color: Some("#00FF00".to_string()),
            },
            EncounterEvent {
                id: 3,
                name: "Ability Three".to_string(),
                simple_name: Some("Ability 3".to_string()),
                spellid: Some(100003),
                timer_dynamic: 30.0,
                phase_start: Some(0.0),
                phase_end: Some(600.0),
                cleu: None,
                color: Some("#0000FF".to_string()),
            },
        ],
    }
}
