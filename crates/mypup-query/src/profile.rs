//! Domain profiles: the field configuration behind each query stage.
//!
//! A [`QueryProfile`] tells the engine which fields free text searches, what
//! each filter key means, and which fields back each sort key. The built-in
//! [`QueryProfile::listings`] and [`QueryProfile::education`] profiles cover
//! the two record domains of the marketplace; custom profiles load from YAML
//! or JSON.
//!
//! ```
//! use mypup_query::{FilterRule, QueryProfile};
//!
//! let profile = QueryProfile::from_yaml_str(r#"
//! searchable_fields: [name, city]
//! filters:
//!   city: { kind: exact, field: city }
//!   openNow: { kind: flag, field: open_now }
//! items_per_page: 20
//! "#).unwrap();
//!
//! assert_eq!(profile.items_per_page, 20);
//! assert_eq!(
//!     profile.rule_for("openNow"),
//!     FilterRule::Flag { field: "open_now".into() }
//! );
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};

/// How a single filter key is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterRule {
    /// Record field must equal the filter value (case-sensitive).
    Exact { field: String },
    /// When the filter is `true`, the record field must be truthy.
    Flag { field: String },
    /// Record field must lie within `[min, max]` inclusive.
    Range {
        field: String,
        /// Range value treated as "no filter".
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<(f64, f64)>,
    },
    /// Record field must be at least the filter value.
    Min { field: String },
    /// Record field must be at most the filter value.
    Max { field: String },
    /// Free-text term, handled by the search stage.
    Text,
}

impl FilterRule {
    pub fn exact(field: impl Into<String>) -> Self {
        FilterRule::Exact {
            field: field.into(),
        }
    }

    pub fn flag(field: impl Into<String>) -> Self {
        FilterRule::Flag {
            field: field.into(),
        }
    }

    pub fn range(field: impl Into<String>) -> Self {
        FilterRule::Range {
            field: field.into(),
            default: None,
        }
    }

    pub fn min(field: impl Into<String>) -> Self {
        FilterRule::Min {
            field: field.into(),
        }
    }

    pub fn max(field: impl Into<String>) -> Self {
        FilterRule::Max {
            field: field.into(),
        }
    }

    /// Returns the record field this rule reads, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            FilterRule::Exact { field }
            | FilterRule::Flag { field }
            | FilterRule::Range { field, .. }
            | FilterRule::Min { field }
            | FilterRule::Max { field } => Some(field),
            FilterRule::Text => None,
        }
    }
}

/// Record fields consulted by the sort keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortFields {
    pub created: String,
    pub price: String,
    pub age: String,
    pub location: String,
    pub rating: String,
}

impl Default for SortFields {
    fn default() -> Self {
        SortFields {
            created: "created_at".into(),
            price: "price".into(),
            age: "age".into(),
            location: "location".into(),
            rating: "rating".into(),
        }
    }
}

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Behaviour of the `distance` sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DistanceMode {
    /// Ascending string comparison of the free-text location field.
    #[default]
    LocationText,
    /// Ascending great-circle distance from `origin`.
    Geographic {
        origin: Coordinates,
        #[serde(default = "default_lat_field")]
        lat_field: String,
        #[serde(default = "default_lng_field")]
        lng_field: String,
    },
}

fn default_lat_field() -> String {
    "latitude".into()
}

fn default_lng_field() -> String {
    "longitude".into()
}

impl DistanceMode {
    /// Geographic mode with the default `latitude`/`longitude` fields.
    pub fn geographic(lat: f64, lng: f64) -> Self {
        DistanceMode::Geographic {
            origin: Coordinates { lat, lng },
            lat_field: default_lat_field(),
            lng_field: default_lng_field(),
        }
    }
}

/// Behaviour of the `rating` sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RatingOrder {
    /// Keep input order.
    #[default]
    PassThrough,
    /// Highest rating first; missing ratings count as 0.
    Descending,
}

/// Field configuration for one record domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryProfile {
    /// Fields consulted by free-text search.
    pub searchable_fields: Vec<String>,
    /// Filter key semantics.
    pub filters: BTreeMap<String, FilterRule>,
    /// Fields behind each sort key.
    pub sort_fields: SortFields,
    pub distance: DistanceMode,
    pub rating: RatingOrder,
    /// Page size used when a query does not set one.
    pub items_per_page: usize,
}

impl Default for QueryProfile {
    fn default() -> Self {
        QueryProfile {
            searchable_fields: Vec::new(),
            filters: BTreeMap::new(),
            sort_fields: SortFields::default(),
            distance: DistanceMode::default(),
            rating: RatingOrder::default(),
            items_per_page: 12,
        }
    }
}

impl QueryProfile {
    /// Profile for dog listings.
    pub fn listings() -> Self {
        let mut filters = BTreeMap::new();
        for (key, field) in [
            ("breed", "breed"),
            ("gender", "gender"),
            ("size", "size"),
            ("color", "color"),
            ("source", "source"),
            ("paperwork", "paperwork"),
            ("coatLength", "coat_length"),
            ("location", "location"),
        ] {
            filters.insert(key.to_string(), FilterRule::exact(field));
        }
        for (key, field) in [
            ("verifiedOnly", "verified"),
            ("vaccinated", "vaccinated"),
            ("microchipped", "microchipped"),
            ("goodWithKids", "good_with_kids"),
            ("goodWithPets", "good_with_pets"),
            ("hypoallergenic", "hypoallergenic"),
            ("healthTested", "health_tested"),
        ] {
            filters.insert(key.to_string(), FilterRule::flag(field));
        }
        filters.insert("priceRange".into(), FilterRule::range("price"));
        filters.insert("ageRange".into(), FilterRule::range("age"));
        filters.insert("minPrice".into(), FilterRule::min("price"));
        filters.insert("maxPrice".into(), FilterRule::max("price"));
        filters.insert("minAge".into(), FilterRule::min("age"));
        filters.insert("maxAge".into(), FilterRule::max("age"));
        filters.insert("searchTerm".into(), FilterRule::Text);
        filters.insert("query".into(), FilterRule::Text);

        QueryProfile {
            searchable_fields: vec!["dog_name".into(), "breed".into(), "breeder".into()],
            filters,
            items_per_page: 12,
            ..QueryProfile::default()
        }
    }

    /// Profile for education resources.
    pub fn education() -> Self {
        let mut filters = BTreeMap::new();
        for key in ["category", "difficulty", "format", "author"] {
            filters.insert(key.to_string(), FilterRule::exact(key));
        }
        filters.insert("freeOnly".into(), FilterRule::flag("free"));
        filters.insert("minRating".into(), FilterRule::min("rating"));
        filters.insert("searchTerm".into(), FilterRule::Text);
        filters.insert("query".into(), FilterRule::Text);

        QueryProfile {
            searchable_fields: vec!["title".into(), "description".into(), "tags".into()],
            filters,
            items_per_page: 9,
            ..QueryProfile::default()
        }
    }

    /// Looks up a built-in profile by domain name.
    pub fn builtin(domain: &str) -> Result<Self> {
        match domain {
            "listings" => Ok(QueryProfile::listings()),
            "education" => Ok(QueryProfile::education()),
            other => Err(QueryError::UnknownDomain(other.to_string())),
        }
    }

    /// Decodes a profile from YAML. Missing sections take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Decodes a profile from JSON. Missing sections take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encodes the profile as YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Returns the rule for a filter key.
    ///
    /// Keys without a configured rule are exact matches on the field of the
    /// same name.
    pub fn rule_for(&self, key: &str) -> FilterRule {
        self.filters
            .get(key)
            .cloned()
            .unwrap_or_else(|| FilterRule::exact(key))
    }

    /// Returns the profile with a filter rule added or replaced.
    pub fn with_filter(mut self, key: impl Into<String>, rule: FilterRule) -> Self {
        self.filters.insert(key.into(), rule);
        self
    }

    pub fn with_distance(mut self, distance: DistanceMode) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_rating(mut self, rating: RatingOrder) -> Self {
        self.rating = rating;
        self
    }
}
