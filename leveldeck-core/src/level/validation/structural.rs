//! Structural phase: per-field parsing and constraint checking.
//!
//! The walker visits fields in schema declaration order and list items in
//! list order, recording every violation with its path. A field whose
//! parent has the wrong shape is not visited; the parent's violation
//! stands in for it.

use serde_json::{Map, Value};

use super::{UnknownFieldPolicy, ValidationOptions, suggest};
use crate::error::ValidationIssue;
use crate::level::schema::{
    Bound, DamageTower, EnemyType, LevelConfig, MapConfig, Point, SlowTower, Spawn, TowerType,
    Wave,
};

type Object = Map<String, Value>;

/// Collects structural violations while building typed values.
pub(super) struct Walker {
    options: ValidationOptions,
    issues: Vec<ValidationIssue>,
}

impl Walker {
    pub(super) const fn new(options: ValidationOptions) -> Self {
        Self {
            options,
            issues: Vec::new(),
        }
    }

    /// Walks the whole document.
    ///
    /// Returns the typed level only if no violation was recorded.
    pub(super) fn run(mut self, value: &Value) -> Result<LevelConfig, Vec<ValidationIssue>> {
        let level = self.level(value, "");
        match level {
            Some(level) if self.issues.is_empty() => Ok(level),
            _ => Err(self.issues),
        }
    }

    // ========================================================================
    // Entities
    // ========================================================================

    fn level(&mut self, value: &Value, path: &str) -> Option<LevelConfig> {
        let obj = self.object(value, path)?;

        let id = self.integer(obj, path, "id");
        let name = self.string(obj, path, "name");
        let start_gold = self.count(obj, path, "start_gold", LevelConfig::START_GOLD);
        let lives = self.count(obj, path, "lives", LevelConfig::LIVES);
        let map = self.nested(obj, path, "map", Self::map);
        let enemy_types = self.list(obj, path, "enemy_types", false, Self::enemy_type);
        let tower_types = self.list(obj, path, "tower_types", false, Self::tower_type);
        let waves = self.list(obj, path, "waves", false, Self::wave);
        self.unknown_fields(obj, path, LevelConfig::FIELDS);

        Some(LevelConfig {
            id: id?,
            name: name?,
            start_gold: start_gold?,
            lives: lives?,
            map: map?,
            enemy_types: enemy_types?,
            tower_types: tower_types?,
            waves: waves?,
        })
    }

    fn map(&mut self, value: &Value, path: &str) -> Option<MapConfig> {
        let obj = self.object(value, path)?;

        let width = self.count(obj, path, "width", MapConfig::WIDTH);
        let height = self.count(obj, path, "height", MapConfig::HEIGHT);
        let points = self.list(obj, path, "path", true, Self::point);
        self.unknown_fields(obj, path, MapConfig::FIELDS);

        Some(MapConfig {
            width: width?,
            height: height?,
            path: points?,
        })
    }

    fn point(&mut self, value: &Value, path: &str) -> Option<Point> {
        let obj = self.object(value, path)?;

        let x = self.integer(obj, path, "x");
        let y = self.integer(obj, path, "y");
        self.unknown_fields(obj, path, Point::FIELDS);

        Some(Point { x: x?, y: y? })
    }

    fn enemy_type(&mut self, value: &Value, path: &str) -> Option<EnemyType> {
        let obj = self.object(value, path)?;

        let id = self.string(obj, path, "id");
        let name = self.string(obj, path, "name");
        let hp = self.count(obj, path, "hp", EnemyType::HP);
        let speed = self.real(obj, path, "speed", EnemyType::SPEED);
        let reward = self.count(obj, path, "reward", EnemyType::REWARD);
        let slow_resistance = self.real(obj, path, "slow_resistance", EnemyType::SLOW_RESISTANCE);
        self.unknown_fields(obj, path, EnemyType::FIELDS);

        Some(EnemyType {
            id: id?,
            name: name?,
            hp: hp?,
            speed: speed?,
            reward: reward?,
            slow_resistance: slow_resistance?,
        })
    }

    fn tower_type(&mut self, value: &Value, path: &str) -> Option<TowerType> {
        let obj = self.object(value, path)?;
        let tag_path = join(path, TowerType::TAG_FIELD);

        // Fields shared by every variant come first in declaration order.
        let id = self.string(obj, path, "id");
        let name = self.string(obj, path, "name");

        match obj.get(TowerType::TAG_FIELD) {
            Some(Value::String(tag)) if tag == "damage" => self
                .damage_tower(obj, path, id, name)
                .map(TowerType::Damage),
            Some(Value::String(tag)) if tag == "slow" => {
                self.slow_tower(obj, path, id, name).map(TowerType::Slow)
            }
            Some(Value::String(tag)) => {
                let expected = TowerType::TAGS.map(|t| format!("'{t}'")).join(", ");
                self.add_issue(
                    &tag_path,
                    &format!("unknown tower type '{tag}', expected one of {expected}"),
                );
                None
            }
            Some(other) => {
                self.add_issue(
                    &tag_path,
                    &format!("expected a string, got {}", type_name(other)),
                );
                None
            }
            None => {
                self.add_issue(&tag_path, "field required");
                None
            }
        }
    }

    fn damage_tower(
        &mut self,
        obj: &Object,
        path: &str,
        id: Option<String>,
        name: Option<String>,
    ) -> Option<DamageTower> {
        let damage = self.count(obj, path, "damage", DamageTower::DAMAGE);
        let attack_speed = self.real(obj, path, "attack_speed", DamageTower::ATTACK_SPEED);
        let range = self.real(obj, path, "range", DamageTower::RANGE);
        let cost = self.count(obj, path, "cost", DamageTower::COST);
        self.unknown_fields(obj, path, DamageTower::FIELDS);

        Some(DamageTower {
            id: id?,
            name: name?,
            damage: damage?,
            attack_speed: attack_speed?,
            range: range?,
            cost: cost?,
        })
    }

    fn slow_tower(
        &mut self,
        obj: &Object,
        path: &str,
        id: Option<String>,
        name: Option<String>,
    ) -> Option<SlowTower> {
        let slow_percent = self.real(obj, path, "slow_percent", SlowTower::SLOW_PERCENT);
        let slow_duration = self.real(obj, path, "slow_duration", SlowTower::SLOW_DURATION);
        let range = self.real(obj, path, "range", SlowTower::RANGE);
        let cost = self.count(obj, path, "cost", SlowTower::COST);
        self.unknown_fields(obj, path, SlowTower::FIELDS);

        Some(SlowTower {
            id: id?,
            name: name?,
            slow_percent: slow_percent?,
            slow_duration: slow_duration?,
            range: range?,
            cost: cost?,
        })
    }

    fn wave(&mut self, value: &Value, path: &str) -> Option<Wave> {
        let obj = self.object(value, path)?;

        let number = self.count(obj, path, "number", Wave::NUMBER);
        let spawns = self.list(obj, path, "spawns", true, Self::spawn);
        self.unknown_fields(obj, path, Wave::FIELDS);

        Some(Wave {
            number: number?,
            spawns: spawns?,
        })
    }

    fn spawn(&mut self, value: &Value, path: &str) -> Option<Spawn> {
        let obj = self.object(value, path)?;

        let enemy_type = self.string(obj, path, "enemy_type");
        let count = self.count(obj, path, "count", Spawn::COUNT);
        let spawn_interval = self.real(obj, path, "spawn_interval", Spawn::SPAWN_INTERVAL);
        self.unknown_fields(obj, path, Spawn::FIELDS);

        Some(Spawn {
            enemy_type: enemy_type?,
            count: count?,
            spawn_interval: spawn_interval?,
        })
    }

    // ========================================================================
    // Shapes
    // ========================================================================

    fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Object> {
        if let Value::Object(obj) = value {
            Some(obj)
        } else {
            self.add_issue(
                path,
                &format!("expected an object, got {}", type_name(value)),
            );
            None
        }
    }

    fn nested<T>(
        &mut self,
        obj: &Object,
        path: &str,
        key: &str,
        parse: impl FnOnce(&mut Self, &Value, &str) -> Option<T>,
    ) -> Option<T> {
        let value = self.field(obj, path, key)?;
        parse(self, value, &join(path, key))
    }

    fn list<T>(
        &mut self,
        obj: &Object,
        path: &str,
        key: &str,
        non_empty: bool,
        mut parse: impl FnMut(&mut Self, &Value, &str) -> Option<T>,
    ) -> Option<Vec<T>> {
        let value = self.field(obj, path, key)?;
        let path = join(path, key);

        let Value::Array(items) = value else {
            self.add_issue(
                &path,
                &format!("expected an array, got {}", type_name(value)),
            );
            return None;
        };

        if non_empty && items.is_empty() {
            self.add_issue(&path, "must not be empty");
            return None;
        }

        let mut parsed = Vec::with_capacity(items.len());
        let mut complete = true;
        for (idx, item) in items.iter().enumerate() {
            match parse(self, item, &format!("{path}[{idx}]")) {
                Some(entry) => parsed.push(entry),
                None => complete = false,
            }
        }

        complete.then_some(parsed)
    }

    // ========================================================================
    // Scalars
    // ========================================================================

    fn field<'v>(&mut self, obj: &'v Object, path: &str, key: &str) -> Option<&'v Value> {
        let value = obj.get(key);
        if value.is_none() {
            self.add_issue(&join(path, key), "field required");
        }
        value
    }

    fn string(&mut self, obj: &Object, path: &str, key: &str) -> Option<String> {
        match self.field(obj, path, key)? {
            Value::String(s) => Some(s.clone()),
            other => {
                self.add_issue(
                    &join(path, key),
                    &format!("expected a string, got {}", type_name(other)),
                );
                None
            }
        }
    }

    /// Reads an integer. Floats with no fractional part count as integers.
    fn integer(&mut self, obj: &Object, path: &str, key: &str) -> Option<i64> {
        let value = self.field(obj, path, key)?;
        match as_integer(value) {
            Ok(n) => Some(n),
            Err(message) => {
                self.add_issue(&join(path, key), &message);
                None
            }
        }
    }

    /// Reads a bounded, non-negative integer that fits in `u32`.
    fn count(&mut self, obj: &Object, path: &str, key: &str, bound: Bound) -> Option<u32> {
        let n = self.integer(obj, path, key)?;
        let field_path = join(path, key);

        if !bound.admits_int(n) {
            self.add_issue(
                &field_path,
                &format!("must be {}, got {n}", bound.describe()),
            );
            return None;
        }

        match u32::try_from(n) {
            Ok(n) => Some(n),
            Err(_) => {
                self.add_issue(
                    &field_path,
                    &format!("must be at most {}, got {n}", u32::MAX),
                );
                None
            }
        }
    }

    /// Reads a finite, bounded real number.
    fn real(&mut self, obj: &Object, path: &str, key: &str, bound: Bound) -> Option<f64> {
        let value = self.field(obj, path, key)?;
        let field_path = join(path, key);

        let Some(n) = value.as_f64() else {
            self.add_issue(
                &field_path,
                &format!("expected a number, got {}", type_name(value)),
            );
            return None;
        };

        if !n.is_finite() {
            self.add_issue(&field_path, "must be a finite number");
            return None;
        }

        if !bound.admits(n) {
            self.add_issue(
                &field_path,
                &format!("must be {}, got {value}", bound.describe()),
            );
            return None;
        }

        Some(n)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn unknown_fields(&mut self, obj: &Object, path: &str, known: &[&str]) {
        if self.options.unknown_fields == UnknownFieldPolicy::Ignore {
            return;
        }

        for key in obj.keys().filter(|k| !known.contains(&k.as_str())) {
            let message = suggest(key, known.iter().copied()).map_or_else(
                || format!("unknown field '{key}'"),
                |s| format!("unknown field '{key}'; did you mean '{s}'?"),
            );
            self.add_issue(&join(path, key), &message);
        }
    }

    fn add_issue(&mut self, path: &str, message: &str) {
        self.issues.push(ValidationIssue::new(path, message));
    }
}

/// Appends a field name to a path.
fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn as_integer(value: &Value) -> Result<i64, String> {
    let Value::Number(n) = value else {
        return Err(format!("expected an integer, got {}", type_name(value)));
    };

    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    if n.is_u64() {
        return Err(format!("integer {n} is out of range"));
    }

    // Only floats remain here.
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        _ => Err(format!("expected an integer, got {n}")),
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
