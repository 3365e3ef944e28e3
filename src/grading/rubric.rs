//! Rubric definitions.
//!
//! A rubric is an ordered set of named criteria. Order matters: scores and
//! feedback are reported in rubric order. In JSON a rubric is an object whose
//! keys are criterion names; document order is preserved:
//!
//! ```json
//! {"content_quality": {"max_points": 40}, "grammar": {"max_points": 30, "weight": 0.5}}
//! ```
//!
//! A bare number is accepted as a weight with 100 max points, and a JSON array
//! of `{name, max_points, weight?}` records is accepted as well.

use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AnalyzerError, AnalyzerResult};

/// A single grading criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricCriterion {
    pub name: String,
    pub max_points: u32,
    /// Relative weight in the overall score. Defaults to `max_points / 100`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl RubricCriterion {
    pub fn new(name: impl Into<String>, max_points: u32) -> Self {
        Self {
            name: name.into(),
            max_points,
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Weight used when averaging criterion scores.
    pub fn effective_weight(&self) -> f64 {
        self.weight.unwrap_or(self.max_points as f64 / 100.0)
    }

    fn validate(&self) -> AnalyzerResult<()> {
        if self.max_points == 0 {
            return Err(AnalyzerError::invalid(format!(
                "criterion '{}' must have positive max_points",
                self.name
            )));
        }
        if let Some(weight) = self.weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(AnalyzerError::invalid(format!(
                    "criterion '{}' has invalid weight {}",
                    self.name, weight
                )));
            }
        }
        Ok(())
    }
}

/// Ordered collection of criteria, unique by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rubric {
    criteria: Vec<RubricCriterion>,
}

impl Rubric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a criterion, replacing any existing one with the same name in place.
    pub fn insert(&mut self, criterion: RubricCriterion) {
        match self.criteria.iter_mut().find(|c| c.name == criterion.name) {
            Some(existing) => *existing = criterion,
            None => self.criteria.push(criterion),
        }
    }

    pub fn with_criterion(mut self, criterion: RubricCriterion) -> Self {
        self.insert(criterion);
        self
    }

    pub fn get(&self, name: &str) -> Option<&RubricCriterion> {
        self.criteria.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RubricCriterion> {
        self.criteria.iter()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.criteria.iter().map(|c| c.name.as_str()).collect()
    }

    /// Check every criterion for positive max points and a usable weight.
    pub fn validate(&self) -> AnalyzerResult<()> {
        self.criteria.iter().try_for_each(RubricCriterion::validate)
    }

    /// Parse and validate a rubric from JSON.
    pub fn from_json(json: &str) -> AnalyzerResult<Self> {
        let rubric: Self = serde_json::from_str(json)
            .map_err(|e| AnalyzerError::invalid(format!("malformed rubric: {}", e)))?;
        rubric.validate()?;
        Ok(rubric)
    }
}

impl FromIterator<RubricCriterion> for Rubric {
    fn from_iter<I: IntoIterator<Item = RubricCriterion>>(iter: I) -> Self {
        let mut rubric = Rubric::new();
        for criterion in iter {
            rubric.insert(criterion);
        }
        rubric
    }
}

/// Value side of the object form: full settings or a bare weight.
#[derive(Deserialize)]
#[serde(untagged)]
enum CriterionSpec {
    Detailed {
        max_points: u32,
        #[serde(default)]
        weight: Option<f64>,
    },
    Weight(f64),
}

#[derive(Serialize)]
struct CriterionSettings {
    max_points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
}

impl Serialize for Rubric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.criteria.len()))?;
        for c in &self.criteria {
            map.serialize_entry(
                &c.name,
                &CriterionSettings {
                    max_points: c.max_points,
                    weight: c.weight,
                },
            )?;
        }
        map.end()
    }
}

struct RubricVisitor;

impl<'de> Visitor<'de> for RubricVisitor {
    type Value = Rubric;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of criterion names to settings, or a list of criteria")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Rubric, A::Error> {
        let mut rubric = Rubric::new();
        while let Some((name, spec)) = access.next_entry::<String, CriterionSpec>()? {
            if rubric.get(&name).is_some() {
                return Err(de::Error::custom(format!("duplicate criterion '{}'", name)));
            }
            let criterion = match spec {
                CriterionSpec::Detailed { max_points, weight } => RubricCriterion {
                    name,
                    max_points,
                    weight,
                },
                CriterionSpec::Weight(weight) => RubricCriterion::new(name, 100).with_weight(weight),
            };
            rubric.criteria.push(criterion);
        }
        Ok(rubric)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Rubric, A::Error> {
        let mut rubric = Rubric::new();
        while let Some(criterion) = access.next_element::<RubricCriterion>()? {
            if rubric.get(&criterion.name).is_some() {
                return Err(de::Error::custom(format!(
                    "duplicate criterion '{}'",
                    criterion.name
                )));
            }
            rubric.criteria.push(criterion);
        }
        Ok(rubric)
    }
}

impl<'de> Deserialize<'de> for Rubric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RubricVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weight_from_max_points() {
        let c = RubricCriterion::new("content_quality", 40);
        assert!((c.effective_weight() - 0.4).abs() < 1e-12);
        assert_eq!(c.with_weight(2.0).effective_weight(), 2.0);
    }

    #[test]
    fn object_form_keeps_document_order() {
        let rubric = Rubric::from_json(
            r#"{"zeta_creativity": {"max_points": 10},
                "alpha_grammar": {"max_points": 30, "weight": 0.5},
                "middle_content": {"max_points": 60}}"#,
        )
        .unwrap();
        assert_eq!(
            rubric.names(),
            vec!["zeta_creativity", "alpha_grammar", "middle_content"]
        );
        assert_eq!(rubric.get("alpha_grammar").unwrap().weight, Some(0.5));
    }

    #[test]
    fn bare_number_is_a_weight() {
        let rubric = Rubric::from_json(r#"{"grammar": 0.3}"#).unwrap();
        let c = rubric.get("grammar").unwrap();
        assert_eq!(c.max_points, 100);
        assert_eq!(c.effective_weight(), 0.3);
    }

    #[test]
    fn list_form() {
        let rubric = Rubric::from_json(
            r#"[{"name": "content", "max_points": 50}, {"name": "grammar", "max_points": 50}]"#,
        )
        .unwrap();
        assert_eq!(rubric.names(), vec!["content", "grammar"]);
    }

    #[test]
    fn rejects_duplicates() {
        let err = Rubric::from_json(
            r#"[{"name": "content", "max_points": 50}, {"name": "content", "max_points": 10}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidInput(_)));
    }

    #[test]
    fn rejects_zero_max_points() {
        let err = Rubric::from_json(r#"{"content": {"max_points": 0}}"#).unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidInput(_)));
    }

    #[test]
    fn rejects_negative_weight() {
        let rubric = Rubric::new().with_criterion(RubricCriterion::new("x", 10).with_weight(-1.0));
        assert!(rubric.validate().is_err());
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut rubric = Rubric::new()
            .with_criterion(RubricCriterion::new("a", 10))
            .with_criterion(RubricCriterion::new("b", 10));
        rubric.insert(RubricCriterion::new("a", 99));
        assert_eq!(rubric.names(), vec!["a", "b"]);
        assert_eq!(rubric.get("a").unwrap().max_points, 99);
    }

    #[test]
    fn serializes_as_ordered_map() {
        let rubric = Rubric::new()
            .with_criterion(RubricCriterion::new("writing", 20))
            .with_criterion(RubricCriterion::new("content", 80).with_weight(1.5));
        let json = serde_json::to_string(&rubric).unwrap();
        assert_eq!(
            json,
            r#"{"writing":{"max_points":20},"content":{"max_points":80,"weight":1.5}}"#
        );
        assert_eq!(Rubric::from_json(&json).unwrap(), rubric);
    }
}
