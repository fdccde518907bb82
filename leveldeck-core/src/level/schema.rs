//! Level configuration schema types
//!
//! The typed model of a tower-defense level. Values of these types are only
//! built by the [`Validator`](crate::Validator), so holding one means every
//! field constraint and every cross-entity invariant has been checked.
//!
//! Each constrained field declares its [`Bound`] once, as an associated
//! constant on its entity. The structural phase reads those constants, so a
//! constraint can't drift between entry points.

use serde::Serialize;

// ============================================================================
// Field Constraints
// ============================================================================

/// Numeric range a field must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// `> 0`
    Positive,
    /// `>= 0`
    NonNegative,
    /// `0 <= v <= 1`
    UnitInterval,
    /// `0 < v <= 1`
    UpperUnitInterval,
}

impl Bound {
    /// Returns `true` if `value` satisfies the bound.
    #[must_use]
    pub fn admits(self, value: f64) -> bool {
        match self {
            Self::Positive => value > 0.0,
            Self::NonNegative => value >= 0.0,
            Self::UnitInterval => (0.0..=1.0).contains(&value),
            Self::UpperUnitInterval => value > 0.0 && value <= 1.0,
        }
    }

    /// Returns `true` if the integer `value` satisfies the bound.
    #[must_use]
    pub const fn admits_int(self, value: i64) -> bool {
        match self {
            Self::Positive => value > 0,
            Self::NonNegative => value >= 0,
            Self::UnitInterval => value == 0 || value == 1,
            Self::UpperUnitInterval => value == 1,
        }
    }

    /// Human-readable form used in violation messages.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Positive => "greater than 0",
            Self::NonNegative => "greater than or equal to 0",
            Self::UnitInterval => "between 0 and 1 inclusive",
            Self::UpperUnitInterval => "greater than 0 and at most 1",
        }
    }
}

// ============================================================================
// Root Level Configuration
// ============================================================================

/// A complete, validated level.
///
/// Owns every nested entity. Spawns refer to enemy types by id only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct LevelConfig {
    /// Numeric level id, as written in the document
    pub id: i64,
    /// Display name
    pub name: String,
    /// Gold available before the first wave
    pub start_gold: u32,
    /// Enemies that may leak before the level is lost
    pub lives: u32,
    /// Map layout
    pub map: MapConfig,
    /// Enemy archetypes; ids are unique
    pub enemy_types: Vec<EnemyType>,
    /// Tower archetypes; ids are unique
    pub tower_types: Vec<TowerType>,
    /// Waves in play order
    pub waves: Vec<Wave>,
}

impl LevelConfig {
    /// Field names in declaration order.
    pub const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "start_gold",
        "lives",
        "map",
        "enemy_types",
        "tower_types",
        "waves",
    ];
    pub const START_GOLD: Bound = Bound::NonNegative;
    pub const LIVES: Bound = Bound::Positive;

    /// Looks up a tower archetype by id.
    #[must_use]
    pub fn tower_type(&self, id: &str) -> Option<&TowerType> {
        self.tower_types.iter().find(|t| t.id() == id)
    }
}

// ============================================================================
// Map
// ============================================================================

/// A map coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const FIELDS: &'static [&'static str] = &["x", "y"];
}

/// Map dimensions and the path enemies walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct MapConfig {
    pub width: u32,
    pub height: u32,
    /// Waypoints in walking order; never empty
    pub path: Vec<Point>,
}

impl MapConfig {
    pub const FIELDS: &'static [&'static str] = &["width", "height", "path"];
    pub const WIDTH: Bound = Bound::Positive;
    pub const HEIGHT: Bound = Bound::Positive;
}

// ============================================================================
// Enemies
// ============================================================================

/// An enemy archetype that waves can spawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct EnemyType {
    pub id: String,
    pub name: String,
    pub hp: u32,
    /// Movement speed along the path
    pub speed: f64,
    /// Gold awarded on kill
    pub reward: u32,
    /// Fraction of incoming slow effects ignored
    pub slow_resistance: f64,
}

impl EnemyType {
    pub const FIELDS: &'static [&'static str] =
        &["id", "name", "hp", "speed", "reward", "slow_resistance"];
    pub const HP: Bound = Bound::Positive;
    pub const SPEED: Bound = Bound::NonNegative;
    pub const REWARD: Bound = Bound::NonNegative;
    pub const SLOW_RESISTANCE: Bound = Bound::UnitInterval;
}

// ============================================================================
// Towers
// ============================================================================

/// A tower archetype.
///
/// Closed set of variants, tagged by `type` in documents. Adding a kind of
/// tower means adding a variant here and handling it in every match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TowerType {
    /// `type: damage`
    Damage(DamageTower),
    /// `type: slow`
    Slow(SlowTower),
}

impl TowerType {
    /// Name of the discriminator field.
    pub const TAG_FIELD: &'static str = "type";
    /// Every accepted discriminator value.
    pub const TAGS: [&'static str; 2] = ["damage", "slow"];

    /// Discriminator value of this variant.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Damage(_) => "damage",
            Self::Slow(_) => "slow",
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Damage(t) => &t.id,
            Self::Slow(t) => &t.id,
        }
    }

    #[must_use]
    pub const fn cost(&self) -> u32 {
        match self {
            Self::Damage(t) => t.cost,
            Self::Slow(t) => t.cost,
        }
    }
}

/// A tower that deals direct damage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct DamageTower {
    pub id: String,
    pub name: String,
    pub damage: u32,
    /// Shots per second
    pub attack_speed: f64,
    pub range: f64,
    pub cost: u32,
}

impl DamageTower {
    pub const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "damage",
        "attack_speed",
        "range",
        "cost",
        TowerType::TAG_FIELD,
    ];
    pub const DAMAGE: Bound = Bound::Positive;
    pub const ATTACK_SPEED: Bound = Bound::Positive;
    pub const RANGE: Bound = Bound::Positive;
    pub const COST: Bound = Bound::Positive;
}

/// A tower that slows enemies in range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct SlowTower {
    pub id: String,
    pub name: String,
    /// Fraction of speed removed
    pub slow_percent: f64,
    /// Seconds the slow lasts
    pub slow_duration: f64,
    pub range: f64,
    pub cost: u32,
}

impl SlowTower {
    pub const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "slow_percent",
        "slow_duration",
        "range",
        "cost",
        TowerType::TAG_FIELD,
    ];
    pub const SLOW_PERCENT: Bound = Bound::UpperUnitInterval;
    pub const SLOW_DURATION: Bound = Bound::Positive;
    pub const RANGE: Bound = Bound::Positive;
    pub const COST: Bound = Bound::Positive;
}

// ============================================================================
// Waves
// ============================================================================

/// A batch of one enemy type within a wave.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct Spawn {
    /// Id of an [`EnemyType`] declared in the same level
    pub enemy_type: String,
    pub count: u32,
    /// Seconds between consecutive spawns
    pub spawn_interval: f64,
}

impl Spawn {
    pub const FIELDS: &'static [&'static str] = &["enemy_type", "count", "spawn_interval"];
    pub const COUNT: Bound = Bound::Positive;
    pub const SPAWN_INTERVAL: Bound = Bound::Positive;
}

/// One wave of enemies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct Wave {
    pub number: u32,
    /// Never empty
    pub spawns: Vec<Spawn>,
}

impl Wave {
    pub const FIELDS: &'static [&'static str] = &["number", "spawns"];
    pub const NUMBER: Bound = Bound::Positive;

    /// Total enemies this wave spawns.
    #[must_use]
    pub fn enemy_count(&self) -> u64 {
        self.spawns.iter().map(|s| u64::from(s.count)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_positive() {
        assert!(Bound::Positive.admits(0.1));
        assert!(!Bound::Positive.admits(0.0));
        assert!(!Bound::Positive.admits(-1.0));
        assert!(Bound::Positive.admits_int(1));
        assert!(!Bound::Positive.admits_int(0));
    }

    #[test]
    fn test_bound_non_negative() {
        assert!(Bound::NonNegative.admits(0.0));
        assert!(!Bound::NonNegative.admits(-0.5));
        assert!(Bound::NonNegative.admits_int(0));
        assert!(!Bound::NonNegative.admits_int(-1));
    }

    #[test]
    fn test_bound_unit_interval_is_closed() {
        assert!(Bound::UnitInterval.admits(0.0));
        assert!(Bound::UnitInterval.admits(1.0));
        assert!(!Bound::UnitInterval.admits(1.01));
        assert!(Bound::UnitInterval.admits_int(1));
        assert!(!Bound::UnitInterval.admits_int(2));
    }

    #[test]
    fn test_bound_upper_unit_interval_excludes_zero() {
        assert!(!Bound::UpperUnitInterval.admits(0.0));
        assert!(Bound::UpperUnitInterval.admits(0.4));
        assert!(Bound::UpperUnitInterval.admits(1.0));
        assert!(!Bound::UpperUnitInterval.admits_int(0));
        assert!(Bound::UpperUnitInterval.admits_int(1));
    }

    #[test]
    fn test_bound_nan_never_admitted() {
        for bound in [
            Bound::Positive,
            Bound::NonNegative,
            Bound::UnitInterval,
            Bound::UpperUnitInterval,
        ] {
            assert!(!bound.admits(f64::NAN), "{bound:?} admitted NaN");
        }
    }

    #[test]
    fn test_tower_serializes_with_tag() {
        let tower = TowerType::Slow(SlowTower {
            id: "ziggurat".to_string(),
            name: "Ziggurat of Slow".to_string(),
            slow_percent: 0.4,
            slow_duration: 2.0,
            range: 150.0,
            cost: 70,
        });
        let value = serde_json::to_value(&tower).unwrap();
        assert_eq!(value["type"], "slow");
        assert_eq!(value["id"], "ziggurat");
        assert_eq!(value["slow_percent"], 0.4);
        assert_eq!(tower.tag(), "slow");
        assert_eq!(tower.cost(), 70);
    }

    #[test]
    fn test_wave_enemy_count() {
        let wave = Wave {
            number: 1,
            spawns: vec![
                Spawn {
                    enemy_type: "goblin".to_string(),
                    count: 5,
                    spawn_interval: 1.5,
                },
                Spawn {
                    enemy_type: "orc".to_string(),
                    count: 2,
                    spawn_interval: 3.0,
                },
            ],
        };
        assert_eq!(wave.enemy_count(), 7);
    }

    #[test]
    fn test_tower_fields_include_tag() {
        assert!(DamageTower::FIELDS.contains(&TowerType::TAG_FIELD));
        assert!(SlowTower::FIELDS.contains(&TowerType::TAG_FIELD));
    }
}
