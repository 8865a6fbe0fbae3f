//! Sort keys and the comparators behind them.
//!
//! Every [`SortKey`] maps to a comparator over two records. All comparators
//! are total orders, and [`sort_records`] uses a stable sort, so records that
//! compare equal keep their input order. There is no secondary key.
//!
//! | Key | Order | Missing value |
//! |-----|-------|---------------|
//! | `newest` / `oldest` | creation time desc / asc | epoch |
//! | `price-low` / `price-high` | price asc / desc | 0 |
//! | `age-young` / `age-old` | age asc / desc | 0 |
//! | `distance` | see [`DistanceMode`] | `""` / farthest |
//! | `rating` | see [`RatingOrder`] | 0 |
//! | `relevance` | input order | - |

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use geo::{point, HaversineDistance};
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};
use crate::profile::{Coordinates, DistanceMode, QueryProfile, RatingOrder};
use crate::traits::Queryable;
use crate::value::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    #[default]
    Asc,
    Desc,
}

impl Dir {
    /// Flips `ordering` for [`Dir::Desc`].
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }
}

/// User-selectable result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    PriceLow,
    PriceHigh,
    AgeYoung,
    AgeOld,
    Distance,
    Rating,
    Relevance,
}

impl SortKey {
    /// All keys, in menu order.
    pub const ALL: [SortKey; 9] = [
        SortKey::Newest,
        SortKey::Oldest,
        SortKey::PriceLow,
        SortKey::PriceHigh,
        SortKey::AgeYoung,
        SortKey::AgeOld,
        SortKey::Distance,
        SortKey::Rating,
        SortKey::Relevance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::PriceLow => "price-low",
            SortKey::PriceHigh => "price-high",
            SortKey::AgeYoung => "age-young",
            SortKey::AgeOld => "age-old",
            SortKey::Distance => "distance",
            SortKey::Rating => "rating",
            SortKey::Relevance => "relevance",
        }
    }

    /// Returns `true` if this key never reorders records under `profile`.
    pub fn is_pass_through(self, profile: &QueryProfile) -> bool {
        match self {
            SortKey::Relevance => true,
            SortKey::Rating => profile.rating == RatingOrder::PassThrough,
            _ => false,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| QueryError::UnknownSortKey(s.to_string()))
    }
}

/// Compares two records under `key`.
///
/// ```
/// use std::cmp::Ordering;
/// use mypup_query::{compare, QueryProfile, Record, SortKey};
///
/// let profile = QueryProfile::listings();
/// let cheap = Record::new().with("price", 300);
/// let pricey = Record::new().with("price", 900);
///
/// assert_eq!(compare(&cheap, &pricey, SortKey::PriceLow, &profile), Ordering::Less);
/// assert_eq!(compare(&cheap, &pricey, SortKey::PriceHigh, &profile), Ordering::Greater);
/// assert_eq!(compare(&cheap, &pricey, SortKey::Relevance, &profile), Ordering::Equal);
/// ```
pub fn compare<T>(a: &T, b: &T, key: SortKey, profile: &QueryProfile) -> Ordering
where
    T: Queryable + ?Sized,
{
    let fields = &profile.sort_fields;
    match key {
        SortKey::Newest => Dir::Desc.apply(created(a, &fields.created).cmp(&created(b, &fields.created))),
        SortKey::Oldest => created(a, &fields.created).cmp(&created(b, &fields.created)),
        SortKey::PriceLow => by_number(a, b, &fields.price, Dir::Asc),
        SortKey::PriceHigh => by_number(a, b, &fields.price, Dir::Desc),
        SortKey::AgeYoung => by_number(a, b, &fields.age, Dir::Asc),
        SortKey::AgeOld => by_number(a, b, &fields.age, Dir::Desc),
        SortKey::Distance => match &profile.distance {
            DistanceMode::LocationText => {
                text(a, &fields.location).cmp(text(b, &fields.location))
            }
            DistanceMode::Geographic {
                origin,
                lat_field,
                lng_field,
            } => {
                let da = distance_km(a, origin, lat_field, lng_field);
                let db = distance_km(b, origin, lat_field, lng_field);
                da.total_cmp(&db)
            }
        },
        SortKey::Rating => match profile.rating {
            RatingOrder::PassThrough => Ordering::Equal,
            RatingOrder::Descending => by_number(a, b, &fields.rating, Dir::Desc),
        },
        SortKey::Relevance => Ordering::Equal,
    }
}

/// Stable-sorts `records` in place under `key`.
pub fn sort_records<T>(records: &mut [&T], key: SortKey, profile: &QueryProfile)
where
    T: Queryable + ?Sized,
{
    if key.is_pass_through(profile) {
        return;
    }
    records.sort_by(|a, b| compare(*a, *b, key, profile));
}

fn created<T: Queryable + ?Sized>(record: &T, field: &str) -> Timestamp {
    record
        .field_value(field)
        .to_timestamp()
        .unwrap_or(Timestamp::EPOCH)
}

fn number<T: Queryable + ?Sized>(record: &T, field: &str) -> f64 {
    record.field_value(field).to_f64().unwrap_or(0.0)
}

fn by_number<T: Queryable + ?Sized>(a: &T, b: &T, field: &str, dir: Dir) -> Ordering {
    dir.apply(number(a, field).total_cmp(&number(b, field)))
}

fn text<'a, T: Queryable + ?Sized>(record: &'a T, field: &str) -> &'a str {
    record.field_value(field).as_str().unwrap_or("")
}

/// Great-circle distance in kilometres, or infinity without coordinates.
fn distance_km<T: Queryable + ?Sized>(
    record: &T,
    origin: &Coordinates,
    lat_field: &str,
    lng_field: &str,
) -> f64 {
    let lat = record.field_value(lat_field).to_f64();
    let lng = record.field_value(lng_field).to_f64();
    match (lat, lng) {
        (Some(lat), Some(lng)) => {
            let from = point!(x: origin.lng, y: origin.lat);
            let to = point!(x: lng, y: lat);
            from.haversine_distance(&to) / 1000.0
        }
        _ => f64::INFINITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;

    fn ids(records: &[&Record]) -> Vec<i64> {
        records
            .iter()
            .map(|r| r.field_value("id").to_f64().unwrap_or(-1.0) as i64)
            .collect()
    }

    fn sorted(records: &[Record], key: SortKey, profile: &QueryProfile) -> Vec<i64> {
        let mut refs: Vec<&Record> = records.iter().collect();
        sort_records(&mut refs, key, profile);
        ids(&refs)
    }

    fn listings() -> Vec<Record> {
        vec![
            Record::new()
                .with("id", 1)
                .with("price", 300)
                .with("age", 10)
                .with("location", "Denver, CO")
                .with("rating", 4.0)
                .with("created_at", "2024-02-01T00:00:00Z"),
            Record::new()
                .with("id", 2)
                .with("price", 900)
                .with("age", 4)
                .with("location", "Austin, TX")
                .with("rating", 4.8)
                .with("created_at", "2024-03-01T00:00:00Z"),
            Record::new()
                .with("id", 3)
                .with("price", "700")
                .with("location", "Boston, MA")
                .with("created_at", "2024-01-01"),
            Record::new().with("id", 4).with("price", 300).with("age", 6),
        ]
    }

    #[test]
    fn sort_key_names_round_trip() {
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
            assert_eq!(key.to_string(), key.as_str());
        }
        assert!(matches!(
            "cheapest".parse::<SortKey>(),
            Err(QueryError::UnknownSortKey(_))
        ));
    }

    #[test]
    fn sort_key_serde_names() {
        assert_eq!(serde_json::to_string(&SortKey::PriceLow).unwrap(), r#""price-low""#);
        let key: SortKey = serde_json::from_str(r#""age-old""#).unwrap();
        assert_eq!(key, SortKey::AgeOld);
        assert_eq!(SortKey::default(), SortKey::Newest);
    }

    #[test]
    fn newest_and_oldest_treat_missing_as_epoch() {
        let profile = QueryProfile::listings();
        assert_eq!(sorted(&listings(), SortKey::Newest, &profile), vec![2, 1, 3, 4]);
        assert_eq!(sorted(&listings(), SortKey::Oldest, &profile), vec![4, 3, 1, 2]);
    }

    #[test]
    fn price_orders_are_stable() {
        let profile = QueryProfile::listings();
        assert_eq!(sorted(&listings(), SortKey::PriceLow, &profile), vec![1, 4, 3, 2]);
        assert_eq!(sorted(&listings(), SortKey::PriceHigh, &profile), vec![2, 3, 1, 4]);
    }

    #[test]
    fn age_treats_missing_as_zero() {
        let profile = QueryProfile::listings();
        assert_eq!(sorted(&listings(), SortKey::AgeYoung, &profile), vec![3, 2, 4, 1]);
        assert_eq!(sorted(&listings(), SortKey::AgeOld, &profile), vec![1, 4, 2, 3]);
    }

    #[test]
    fn distance_compares_location_text() {
        let profile = QueryProfile::listings();
        assert_eq!(sorted(&listings(), SortKey::Distance, &profile), vec![4, 2, 3, 1]);
    }

    #[test]
    fn distance_geographic_mode() {
        // Origin in Manhattan.
        let profile = QueryProfile::listings().with_distance(DistanceMode::geographic(40.7128, -74.0060));
        let records = vec![
            Record::new().with("id", 1).with("latitude", 34.05).with("longitude", -118.24),
            Record::new().with("id", 2),
            Record::new().with("id", 3).with("latitude", 42.36).with("longitude", -71.06),
            Record::new().with("id", 4).with("latitude", 40.73).with("longitude", -73.99),
        ];
        assert_eq!(sorted(&records, SortKey::Distance, &profile), vec![4, 3, 1, 2]);
    }

    #[test]
    fn rating_and_relevance_pass_through_by_default() {
        let profile = QueryProfile::listings();
        assert_eq!(sorted(&listings(), SortKey::Rating, &profile), vec![1, 2, 3, 4]);
        assert_eq!(sorted(&listings(), SortKey::Relevance, &profile), vec![1, 2, 3, 4]);
    }

    #[test]
    fn rating_descending_mode() {
        let profile = QueryProfile::listings().with_rating(RatingOrder::Descending);
        assert!(!SortKey::Rating.is_pass_through(&profile));
        assert_eq!(sorted(&listings(), SortKey::Rating, &profile), vec![2, 1, 3, 4]);
    }

    #[test]
    fn dir_apply() {
        assert_eq!(Dir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Dir::Desc.apply(Ordering::Equal), Ordering::Equal);
    }
}
