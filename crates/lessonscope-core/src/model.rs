//! Core data model types for lessonscope.
//!
//! A model response is reduced to a [`ParsedRecord`]: one string per
//! [`Field`], always all nine of them, in a fixed order that doubles as the
//! CSV column order.

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// The report section a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    /// Question Analysis Summary.
    QuestionAnalysis,
    /// Vocabulary Analysis.
    VocabularyAnalysis,
    /// Implementation Recommendations.
    ImplementationRecommendations,
}

impl Section {
    pub const ALL: [Section; 3] = [
        Section::QuestionAnalysis,
        Section::VocabularyAnalysis,
        Section::ImplementationRecommendations,
    ];

    /// Heading used by the instruction template for this section.
    pub fn title(self) -> &'static str {
        match self {
            Section::QuestionAnalysis => "Question Analysis Summary",
            Section::VocabularyAnalysis => "Vocabulary Analysis",
            Section::ImplementationRecommendations => "Implementation Recommendations",
        }
    }

    /// Field key prefix (`QA`, `VA`, `IR`).
    pub fn prefix(self) -> &'static str {
        match self {
            Section::QuestionAnalysis => "QA",
            Section::VocabularyAnalysis => "VA",
            Section::ImplementationRecommendations => "IR",
        }
    }

    /// Fields of this section, in record order.
    pub fn fields(self) -> impl Iterator<Item = Field> {
        Field::ALL.into_iter().filter(move |f| f.section() == self)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One of the nine labeled fields extracted from a model response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    KnowledgeAndSkills,
    KeyVocabulary,
    CommonMisconceptions,
    VocabularyTerms,
    Definitions,
    SpecialAttention,
    TeachingApproaches,
    Scaffolding,
    Sequencing,
}

impl Field {
    /// All fields in record (and CSV column) order.
    pub const ALL: [Field; 9] = [
        Field::KnowledgeAndSkills,
        Field::KeyVocabulary,
        Field::CommonMisconceptions,
        Field::VocabularyTerms,
        Field::Definitions,
        Field::SpecialAttention,
        Field::TeachingApproaches,
        Field::Scaffolding,
        Field::Sequencing,
    ];

    /// Stable identifier used as the CSV header and JSON key.
    pub fn key(self) -> &'static str {
        match self {
            Field::KnowledgeAndSkills => "QA_Knowledge-and-skills",
            Field::KeyVocabulary => "QA_Key-Vocabulary",
            Field::CommonMisconceptions => "QA_Common-misconceptions",
            Field::VocabularyTerms => "VA_Vocabulary-Terms",
            Field::Definitions => "VA_Definitions",
            Field::SpecialAttention => "VA_Special-Attention",
            Field::TeachingApproaches => "IR_Teaching-Approaches",
            Field::Scaffolding => "IR_Scaffolding",
            Field::Sequencing => "IR_Sequencing",
        }
    }

    /// Header label that opens this field in a model response.
    pub fn label(self) -> &'static str {
        match self {
            Field::KnowledgeAndSkills => "Required knowledge and skills",
            Field::KeyVocabulary => "Key vocabulary terms",
            Field::CommonMisconceptions => "Common misconceptions or challenges",
            Field::VocabularyTerms => "Vocabulary Terms",
            Field::Definitions => "Definitions",
            Field::SpecialAttention => "Special Attention",
            Field::TeachingApproaches => "Teaching Approaches",
            Field::Scaffolding => "Scaffolding",
            Field::Sequencing => "Sequencing",
        }
    }

    pub fn section(self) -> Section {
        match self {
            Field::KnowledgeAndSkills | Field::KeyVocabulary | Field::CommonMisconceptions => {
                Section::QuestionAnalysis
            }
            Field::VocabularyTerms | Field::Definitions | Field::SpecialAttention => {
                Section::VocabularyAnalysis
            }
            Field::TeachingApproaches | Field::Scaffolding | Field::Sequencing => {
                Section::ImplementationRecommendations
            }
        }
    }

    /// Look up a field by its header label, ignoring case.
    ///
    /// The whole label must match; `"Definitions of terms"` is not `Definitions`.
    pub fn from_label(label: &str) -> Option<Field> {
        let wanted = label.trim().to_lowercase();
        Field::ALL
            .into_iter()
            .find(|f| f.label().to_lowercase() == wanted)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown field: {s}"))
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The nine-field record produced by the response parser.
///
/// Every field is always present. There are no mutators: a record is built
/// once by the parser (or from explicit values) and then only read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecord {
    values: [String; 9],
}

impl ParsedRecord {
    /// Build a record from `(field, value)` pairs. Missing fields are empty;
    /// a repeated field keeps its last value.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Field, S)>,
        S: Into<String>,
    {
        let mut values: [String; 9] = Default::default();
        for (field, value) in pairs {
            values[field.index()] = value.into();
        }
        Self { values }
    }

    pub(crate) fn from_values(values: [String; 9]) -> Self {
        Self { values }
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    /// Iterate `(field, value)` in record order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL
            .into_iter()
            .map(move |f| (f, self.values[f.index()].as_str()))
    }

    /// `true` when no field carries any content.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(String::is_empty)
    }

    /// Number of fields that carry content.
    pub fn filled_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_empty()).count()
    }
}

impl Serialize for ParsedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Field::ALL.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.key(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ParsedRecord {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = std::collections::HashMap::<Field, String>::deserialize(deserializer)?;
        Ok(ParsedRecord::from_pairs(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_order_matches_keys() {
        let keys: Vec<&str> = Field::ALL.iter().map(|f| f.key()).collect();
        assert_eq!(
            keys,
            vec![
                "QA_Knowledge-and-skills",
                "QA_Key-Vocabulary",
                "QA_Common-misconceptions",
                "VA_Vocabulary-Terms",
                "VA_Definitions",
                "VA_Special-Attention",
                "IR_Teaching-Approaches",
                "IR_Scaffolding",
                "IR_Sequencing",
            ]
        );
    }

    #[test]
    fn label_lookup_is_case_insensitive_and_whole() {
        assert_eq!(
            Field::from_label("KEY VOCABULARY TERMS"),
            Some(Field::KeyVocabulary)
        );
        assert_eq!(Field::from_label("  sequencing "), Some(Field::Sequencing));
        assert_eq!(Field::from_label("Key vocabulary"), None);
        assert_eq!(Field::from_label("Key vocabulary terms list"), None);
    }

    #[test]
    fn sections_group_three_fields_each() {
        for section in Section::ALL {
            let fields: Vec<Field> = section.fields().collect();
            assert_eq!(fields.len(), 3);
            assert!(fields
                .iter()
                .all(|f| f.key().starts_with(section.prefix())));
        }
    }

    #[test]
    fn record_serializes_all_keys_in_order() {
        let record = ParsedRecord::from_pairs([(Field::Scaffolding, "step by step")]);
        let json = serde_json::to_string(&record).unwrap();
        let first = json.find("QA_Knowledge-and-skills").unwrap();
        let last = json.find("IR_Sequencing").unwrap();
        assert!(first < last);
        assert!(json.contains(r#""IR_Scaffolding":"step by step""#));
        assert!(json.contains(r#""VA_Definitions":"""#));
    }

    #[test]
    fn record_json_roundtrip() {
        let record = ParsedRecord::from_pairs([
            (Field::Definitions, "a\nb"),
            (Field::KeyVocabulary, "ratio"),
        ]);
        let json = serde_json::to_string(&record).unwrap();
        let back: ParsedRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.filled_count(), 2);
    }

    #[test]
    fn default_record_is_empty() {
        let record = ParsedRecord::default();
        assert!(record.is_empty());
        assert_eq!(record.iter().count(), 9);
    }
}
