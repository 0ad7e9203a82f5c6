use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub type EntryId = i64;

/// One persisted day of mood metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: EntryId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub metrics: MoodMetrics,
}

/// The twelve tracked metrics. Every field is required when decoding; the
/// form defaults live in [`Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow, Validate)]
pub struct MoodMetrics {
    #[validate(range(min = 0, message = "loneliness must be >= 0"))]
    pub loneliness: i32,
    #[validate(range(min = 0, message = "fulfillment must be >= 0"))]
    pub fulfillment: i32,
    #[validate(range(min = 0, message = "tiredness must be >= 0"))]
    pub tiredness: i32,
    #[validate(range(min = 0, message = "energy_levels must be >= 0"))]
    pub energy_levels: i32,
    #[validate(range(min = 0, message = "excitement must be >= 0"))]
    pub excitement: i32,
    #[validate(range(min = 0, message = "sleepiness must be >= 0"))]
    pub sleepiness: i32,
    #[validate(range(min = 0, message = "anger must be >= 0"))]
    pub anger: i32,
    #[validate(range(min = 0, message = "depression must be >= 0"))]
    pub depression: i32,
    #[validate(range(min = 0, message = "mania must be >= 0"))]
    pub mania: i32,
    #[validate(range(min = 0, message = "creativity must be >= 0"))]
    pub creativity: i32,
    #[validate(range(min = 0, message = "song_ideas must be >= 0"))]
    pub song_ideas: i32,
    #[validate(range(min = 0, message = "essay_ideas must be >= 0"))]
    pub essay_ideas: i32,
}

impl Default for MoodMetrics {
    fn default() -> Self {
        Self {
            loneliness: 3,
            fulfillment: 3,
            tiredness: 3,
            energy_levels: 3,
            excitement: 3,
            sleepiness: 3,
            anger: 3,
            depression: 3,
            mania: 3,
            creativity: 3,
            song_ideas: 0,
            essay_ideas: 0,
        }
    }
}

impl MoodMetrics {
    pub fn get(&self, field: MetricField) -> i32 {
        match field {
            MetricField::Loneliness => self.loneliness,
            MetricField::Fulfillment => self.fulfillment,
            MetricField::Tiredness => self.tiredness,
            MetricField::EnergyLevels => self.energy_levels,
            MetricField::Excitement => self.excitement,
            MetricField::Sleepiness => self.sleepiness,
            MetricField::Anger => self.anger,
            MetricField::Depression => self.depression,
            MetricField::Mania => self.mania,
            MetricField::Creativity => self.creativity,
            MetricField::SongIdeas => self.song_ideas,
            MetricField::EssayIdeas => self.essay_ideas,
        }
    }

    fn slot(&mut self, field: MetricField) -> &mut i32 {
        match field {
            MetricField::Loneliness => &mut self.loneliness,
            MetricField::Fulfillment => &mut self.fulfillment,
            MetricField::Tiredness => &mut self.tiredness,
            MetricField::EnergyLevels => &mut self.energy_levels,
            MetricField::Excitement => &mut self.excitement,
            MetricField::Sleepiness => &mut self.sleepiness,
            MetricField::Anger => &mut self.anger,
            MetricField::Depression => &mut self.depression,
            MetricField::Mania => &mut self.mania,
            MetricField::Creativity => &mut self.creativity,
            MetricField::SongIdeas => &mut self.song_ideas,
            MetricField::EssayIdeas => &mut self.essay_ideas,
        }
    }

    pub fn set(&mut self, field: MetricField, value: i32) {
        *self.slot(field) = value;
    }
}

/// Column names of the metric fields, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    Loneliness,
    Fulfillment,
    Tiredness,
    EnergyLevels,
    Excitement,
    Sleepiness,
    Anger,
    Depression,
    Mania,
    Creativity,
    SongIdeas,
    EssayIdeas,
}

impl MetricField {
    pub const ALL: [MetricField; 12] = [
        MetricField::Loneliness,
        MetricField::Fulfillment,
        MetricField::Tiredness,
        MetricField::EnergyLevels,
        MetricField::Excitement,
        MetricField::Sleepiness,
        MetricField::Anger,
        MetricField::Depression,
        MetricField::Mania,
        MetricField::Creativity,
        MetricField::SongIdeas,
        MetricField::EssayIdeas,
    ];

    pub fn column(self) -> &'static str {
        match self {
            MetricField::Loneliness => "loneliness",
            MetricField::Fulfillment => "fulfillment",
            MetricField::Tiredness => "tiredness",
            MetricField::EnergyLevels => "energy_levels",
            MetricField::Excitement => "excitement",
            MetricField::Sleepiness => "sleepiness",
            MetricField::Anger => "anger",
            MetricField::Depression => "depression",
            MetricField::Mania => "mania",
            MetricField::Creativity => "creativity",
            MetricField::SongIdeas => "song_ideas",
            MetricField::EssayIdeas => "essay_ideas",
        }
    }

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == column)
    }
}

/// Partial update of metric fields. Only `Some` fields are written, and
/// only those are serialized into a store request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loneliness: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fulfillment: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiredness: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_levels: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excitement: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleepiness: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anger: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depression: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mania: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creativity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song_ideas: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub essay_ideas: Option<i32>,
}

impl MetricsPatch {
    fn slot(&mut self, field: MetricField) -> &mut Option<i32> {
        match field {
            MetricField::Loneliness => &mut self.loneliness,
            MetricField::Fulfillment => &mut self.fulfillment,
            MetricField::Tiredness => &mut self.tiredness,
            MetricField::EnergyLevels => &mut self.energy_levels,
            MetricField::Excitement => &mut self.excitement,
            MetricField::Sleepiness => &mut self.sleepiness,
            MetricField::Anger => &mut self.anger,
            MetricField::Depression => &mut self.depression,
            MetricField::Mania => &mut self.mania,
            MetricField::Creativity => &mut self.creativity,
            MetricField::SongIdeas => &mut self.song_ideas,
            MetricField::EssayIdeas => &mut self.essay_ideas,
        }
    }

    pub fn set(&mut self, field: MetricField, value: i32) {
        *self.slot(field) = Some(value);
    }

    pub fn get(&self, field: MetricField) -> Option<i32> {
        match field {
            MetricField::Loneliness => self.loneliness,
            MetricField::Fulfillment => self.fulfillment,
            MetricField::Tiredness => self.tiredness,
            MetricField::EnergyLevels => self.energy_levels,
            MetricField::Excitement => self.excitement,
            MetricField::Sleepiness => self.sleepiness,
            MetricField::Anger => self.anger,
            MetricField::Depression => self.depression,
            MetricField::Mania => self.mania,
            MetricField::Creativity => self.creativity,
            MetricField::SongIdeas => self.song_ideas,
            MetricField::EssayIdeas => self.essay_ideas,
        }
    }

    pub fn is_empty(&self) -> bool {
        MetricField::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// Fields present in the patch, in form order.
    pub fn fields(&self) -> Vec<(MetricField, i32)> {
        MetricField::ALL
            .iter()
            .filter_map(|f| self.get(*f).map(|v| (*f, v)))
            .collect()
    }

    pub fn apply_to(&self, metrics: &mut MoodMetrics) {
        for (field, value) in self.fields() {
            metrics.set(field, value);
        }
    }
}

impl From<MoodMetrics> for MetricsPatch {
    fn from(metrics: MoodMetrics) -> Self {
        let mut patch = MetricsPatch::default();
        for field in MetricField::ALL {
            patch.set(field, metrics.get(field));
        }
        patch
    }
}
