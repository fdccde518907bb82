//! Referential phase: cross-entity consistency.
//!
//! Checks run in a fixed order and stop at the first violation:
//! enemy id uniqueness, tower id uniqueness, then every spawn reference,
//! wave by wave and spawn by spawn.

use indexmap::IndexMap;

use super::suggest;
use crate::error::ReferentialViolation;
use crate::level::schema::LevelConfig;

/// Checks every cross-entity invariant of a structurally valid level.
pub(super) fn check(config: &LevelConfig) -> Result<(), ReferentialViolation> {
    let enemy_ids = index_ids(config.enemy_types.iter().map(|e| e.id.as_str())).map_err(
        |(id, first_index, index)| ReferentialViolation::DuplicateEnemyId {
            id,
            first_index,
            index,
        },
    )?;

    index_ids(config.tower_types.iter().map(|t| t.id())).map_err(|(id, first_index, index)| {
        ReferentialViolation::DuplicateTowerId {
            id,
            first_index,
            index,
        }
    })?;

    for (wave_index, wave) in config.waves.iter().enumerate() {
        for (spawn_index, spawn) in wave.spawns.iter().enumerate() {
            if !enemy_ids.contains_key(spawn.enemy_type.as_str()) {
                return Err(ReferentialViolation::UnknownEnemyType {
                    wave_index,
                    wave_number: wave.number,
                    spawn_index,
                    enemy_type: spawn.enemy_type.clone(),
                    suggestion: suggest(&spawn.enemy_type, enemy_ids.keys().copied()),
                });
            }
        }
    }

    Ok(())
}

/// Maps each id to the index of its declaration.
///
/// Fails on the first repeated id with `(id, first_index, index)`.
fn index_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
) -> Result<IndexMap<&'a str, usize>, (String, usize, usize)> {
    let mut seen = IndexMap::new();
    for (index, id) in ids.enumerate() {
        if let Some(&first_index) = seen.get(id) {
            return Err((id.to_string(), first_index, index));
        }
        seen.insert(id, index);
    }
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::schema::{
        DamageTower, EnemyType, MapConfig, Point, SlowTower, Spawn, TowerType, Wave,
    };

    fn enemy(id: &str) -> EnemyType {
        EnemyType {
            id: id.to_string(),
            name: id.to_uppercase(),
            hp: 10,
            speed: 1.0,
            reward: 1,
            slow_resistance: 0.0,
        }
    }

    fn damage_tower(id: &str) -> TowerType {
        TowerType::Damage(DamageTower {
            id: id.to_string(),
            name: "Arrow".to_string(),
            damage: 5,
            attack_speed: 1.0,
            range: 3.0,
            cost: 50,
        })
    }

    fn slow_tower(id: &str) -> TowerType {
        TowerType::Slow(SlowTower {
            id: id.to_string(),
            name: "Frost".to_string(),
            slow_percent: 0.5,
            slow_duration: 1.0,
            range: 3.0,
            cost: 60,
        })
    }

    fn wave(number: u32, enemy_types: &[&str]) -> Wave {
        Wave {
            number,
            spawns: enemy_types
                .iter()
                .map(|e| Spawn {
                    enemy_type: (*e).to_string(),
                    count: 1,
                    spawn_interval: 1.0,
                })
                .collect(),
        }
    }

    fn config(enemies: &[&str], towers: Vec<TowerType>, waves: Vec<Wave>) -> LevelConfig {
        LevelConfig {
            id: 1,
            name: "Test".to_string(),
            start_gold: 100,
            lives: 10,
            map: MapConfig {
                width: 10,
                height: 10,
                path: vec![Point { x: 0, y: 0 }],
            },
            enemy_types: enemies.iter().map(|e| enemy(e)).collect(),
            tower_types: towers,
            waves,
        }
    }

    #[test]
    fn test_check_consistent_level() {
        let level = config(
            &["goblin", "orc"],
            vec![damage_tower("archer"), slow_tower("ziggurat")],
            vec![wave(1, &["goblin"]), wave(2, &["goblin", "orc"])],
        );
        assert_eq!(check(&level), Ok(()));
    }

    #[test]
    fn test_check_duplicate_enemy_reports_both_indices() {
        let level = config(&["goblin", "orc", "goblin"], vec![], vec![]);
        assert_eq!(
            check(&level),
            Err(ReferentialViolation::DuplicateEnemyId {
                id: "goblin".to_string(),
                first_index: 0,
                index: 2,
            })
        );
    }

    #[test]
    fn test_check_duplicate_tower_across_variants() {
        let level = config(
            &["goblin"],
            vec![damage_tower("t1"), slow_tower("t1")],
            vec![],
        );
        assert!(matches!(
            check(&level),
            Err(ReferentialViolation::DuplicateTowerId { first_index: 0, index: 1, .. })
        ));
    }

    #[test]
    fn test_check_enemy_uniqueness_runs_before_tower_uniqueness() {
        let level = config(
            &["goblin", "goblin"],
            vec![damage_tower("t1"), damage_tower("t1")],
            vec![wave(1, &["ghost"])],
        );
        assert!(matches!(
            check(&level),
            Err(ReferentialViolation::DuplicateEnemyId { .. })
        ));
    }

    #[test]
    fn test_check_tower_uniqueness_runs_before_references() {
        let level = config(
            &["goblin"],
            vec![damage_tower("t1"), damage_tower("t1")],
            vec![wave(1, &["ghost"])],
        );
        assert!(matches!(
            check(&level),
            Err(ReferentialViolation::DuplicateTowerId { .. })
        ));
    }

    #[test]
    fn test_check_reports_first_unknown_reference() {
        let level = config(
            &["goblin"],
            vec![],
            vec![
                wave(1, &["goblin"]),
                wave(2, &["goblin", "troll", "ghost"]),
                wave(3, &["wraith"]),
            ],
        );
        assert_eq!(
            check(&level),
            Err(ReferentialViolation::UnknownEnemyType {
                wave_index: 1,
                wave_number: 2,
                spawn_index: 1,
                enemy_type: "troll".to_string(),
                suggestion: None,
            })
        );
    }

    #[test]
    fn test_check_unknown_reference_suggests_close_id() {
        let level = config(&["goblin", "orc"], vec![], vec![wave(1, &["goblim"])]);
        match check(&level) {
            Err(ReferentialViolation::UnknownEnemyType { suggestion, .. }) => {
                assert_eq!(suggestion.as_deref(), Some("goblin"));
            }
            other => panic!("expected unknown enemy type, got {other:?}"),
        }
    }

    #[test]
    fn test_check_references_are_case_sensitive() {
        let level = config(&["goblin"], vec![], vec![wave(1, &["Goblin"])]);
        assert!(check(&level).is_err());
    }
}
