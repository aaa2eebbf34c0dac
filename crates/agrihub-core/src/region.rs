//! Administrative regions: State → District → Subdistrict → City.
//!
//! Each parent exclusively owns its children; deleting a parent removes the
//! whole subtree. A state's capital is a soft reference to a city and never an
//! ownership edge.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Identifiers ─────────────────────────────────────────────────────────────

macro_rules! region_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl From<$name> for i64 {
      fn from(id: $name) -> i64 { id.0 }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
    }
  };
}

region_id!(
  /// Surrogate key of a [`State`].
  StateId
);
region_id!(
  /// Surrogate key of a [`District`].
  DistrictId
);
region_id!(
  /// Surrogate key of a [`Subdistrict`].
  SubdistrictId
);
region_id!(
  /// Surrogate key of a [`City`].
  CityId
);

/// Which level of the hierarchy an id refers to. Used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
  State,
  District,
  Subdistrict,
  City,
}

impl fmt::Display for RegionKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::State => "state",
      Self::District => "district",
      Self::Subdistrict => "subdistrict",
      Self::City => "city",
    })
  }
}

// ─── Entities ────────────────────────────────────────────────────────────────

/// Constitutional status of a top-level region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateType {
  State,
  UnionTerritory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
  pub id:         StateId,
  /// Globally unique.
  pub name:       String,
  #[serde(rename = "type")]
  pub kind:       StateType,
  pub capital_id: Option<CityId>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
  pub id:         DistrictId,
  pub state_id:   StateId,
  pub name:       String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A tehsil, taluka or block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subdistrict {
  pub id:          SubdistrictId,
  pub district_id: DistrictId,
  pub name:        String,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// A city, town or village. Some sit directly under a district with no
/// subdistrict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
  pub id:             CityId,
  pub district_id:    DistrictId,
  pub subdistrict_id: Option<SubdistrictId>,
  pub name:           String,
  pub lat:            Option<f64>,
  pub lng:            Option<f64>,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

// ─── Write inputs ────────────────────────────────────────────────────────────

/// Input for [`RegionStore::create_city`](crate::store::RegionStore::create_city).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCity {
  pub district_id:    DistrictId,
  pub name:           String,
  #[serde(default)]
  pub subdistrict_id: Option<SubdistrictId>,
  #[serde(default)]
  pub lat:            Option<f64>,
  #[serde(default)]
  pub lng:            Option<f64>,
}

impl NewCity {
  pub fn new(district_id: DistrictId, name: impl Into<String>) -> Self {
    Self {
      district_id,
      name: name.into(),
      subdistrict_id: None,
      lat: None,
      lng: None,
    }
  }

  pub fn in_subdistrict(mut self, subdistrict_id: SubdistrictId) -> Self {
    self.subdistrict_id = Some(subdistrict_id);
    self
  }

  pub fn at(mut self, lat: f64, lng: f64) -> Self {
    self.lat = Some(lat);
    self.lng = Some(lng);
    self
  }

  /// Reject coordinates outside the WGS84 range.
  pub fn validate(&self) -> Result<()> { check_coordinates(self.lat, self.lng) }
}

/// Latitude within [-90, 90] and longitude within [-180, 180], when present.
pub fn check_coordinates(lat: Option<f64>, lng: Option<f64>) -> Result<()> {
  if let Some(lat) = lat
    && !(-90.0..=90.0).contains(&lat)
  {
    return Err(Error::InvalidCoordinate { axis: "latitude", value: lat });
  }
  if let Some(lng) = lng
    && !(-180.0..=180.0).contains(&lng)
  {
    return Err(Error::InvalidCoordinate { axis: "longitude", value: lng });
  }
  Ok(())
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// A read-only snapshot of a state and everything it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTree {
  pub state:     State,
  pub districts: Vec<DistrictTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictTree {
  pub district:     District,
  pub subdistricts: Vec<SubdistrictTree>,
  /// Cities attached to the district with no subdistrict.
  pub cities:       Vec<City>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubdistrictTree {
  pub subdistrict: Subdistrict,
  pub cities:      Vec<City>,
}

impl StateTree {
  /// Every city in the tree, whether or not it sits in a subdistrict.
  pub fn cities(&self) -> impl Iterator<Item = &City> {
    self.districts.iter().flat_map(DistrictTree::all_cities)
  }

  pub fn subdistricts(&self) -> impl Iterator<Item = &Subdistrict> {
    self
      .districts
      .iter()
      .flat_map(|d| d.subdistricts.iter().map(|s| &s.subdistrict))
  }
}

impl DistrictTree {
  pub fn all_cities(&self) -> impl Iterator<Item = &City> {
    self
      .subdistricts
      .iter()
      .flat_map(|s| s.cities.iter())
      .chain(self.cities.iter())
  }
}

/// Row counts removed (or touched) by a cascading delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
  pub states:           usize,
  pub districts:        usize,
  pub subdistricts:     usize,
  pub cities:           usize,
  /// States outside the deleted subtree whose capital was cleared.
  pub capitals_cleared: usize,
}

impl std::ops::AddAssign for CascadeReport {
  fn add_assign(&mut self, rhs: Self) {
    self.states += rhs.states;
    self.districts += rhs.districts;
    self.subdistricts += rhs.subdistricts;
    self.cities += rhs.cities;
    self.capitals_cleared += rhs.capitals_cleared;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_city_accepts_boundary_coordinates() {
    let city = NewCity::new(DistrictId(1), "Edge").at(-90.0, 180.0);
    assert!(city.validate().is_ok());
  }

  #[test]
  fn new_city_rejects_out_of_range_latitude() {
    let city = NewCity::new(DistrictId(1), "Nowhere").at(91.0, 0.0);
    assert!(matches!(
      city.validate(),
      Err(Error::InvalidCoordinate { axis: "latitude", .. })
    ));
  }

  #[test]
  fn new_city_rejects_out_of_range_longitude() {
    let city = NewCity::new(DistrictId(1), "Nowhere").at(0.0, -180.5);
    assert!(matches!(
      city.validate(),
      Err(Error::InvalidCoordinate { axis: "longitude", .. })
    ));
  }

  #[test]
  fn state_type_serialises_snake_case() {
    let json = serde_json::to_string(&StateType::UnionTerritory).unwrap();
    assert_eq!(json, "\"union_territory\"");
  }
}
