//! The `RegionStore` trait.
//!
//! Implemented by storage backends (e.g. `agrihub-store-sqlite`). The API and
//! the binary depend on this abstraction, not on a concrete backend.
//!
//! Every create and delete is a single unit of work: it either fully succeeds
//! or leaves the store untouched.

use std::future::Future;

use crate::{
  error::DomainError,
  region::{
    CascadeReport, City, CityId, District, DistrictId, NewCity, State, StateId, StateTree,
    StateType, Subdistrict, SubdistrictId,
  },
};

/// Abstraction over a persistent region hierarchy.
///
/// Backend errors expose domain rejections (`DuplicateName`, `NotFound`, …)
/// through [`DomainError`].
pub trait RegionStore: Send + Sync {
  type Error: std::error::Error + DomainError + Send + Sync + 'static;

  // ── Creates ───────────────────────────────────────────────────────────

  /// Create a state. Fails with `DuplicateName` if `name` is taken and with
  /// `NotFound` if `capital` does not reference an existing city.
  ///
  /// A new state owns no cities yet, so a `capital` given here necessarily
  /// belongs to another state and only has to exist. The ownership rule of
  /// [`set_capital`](Self::set_capital) applies to every later change; load
  /// the state's cities first and call `set_capital` to get a checked capital.
  fn create_state(
    &self,
    name: String,
    kind: StateType,
    capital: Option<CityId>,
  ) -> impl Future<Output = Result<State, Self::Error>> + Send + '_;

  /// Create a district under an existing state.
  fn create_district(
    &self,
    state_id: StateId,
    name: String,
  ) -> impl Future<Output = Result<District, Self::Error>> + Send + '_;

  /// Create a subdistrict under an existing district.
  fn create_subdistrict(
    &self,
    district_id: DistrictId,
    name: String,
  ) -> impl Future<Output = Result<Subdistrict, Self::Error>> + Send + '_;

  /// Create a city under an existing district and, optionally, one of that
  /// district's subdistricts.
  fn create_city(
    &self,
    input: NewCity,
  ) -> impl Future<Output = Result<City, Self::Error>> + Send + '_;

  // ── Capital reference ─────────────────────────────────────────────────

  /// Point a state's capital at one of its own cities, or clear it.
  fn set_capital(
    &self,
    state_id: StateId,
    city_id: Option<CityId>,
  ) -> impl Future<Output = Result<State, Self::Error>> + Send + '_;

  // ── Cascading deletes ─────────────────────────────────────────────────

  /// Delete a state with all of its districts, subdistricts and cities.
  fn delete_state(
    &self,
    id: StateId,
  ) -> impl Future<Output = Result<CascadeReport, Self::Error>> + Send + '_;

  /// Delete a district with all of its subdistricts and cities.
  fn delete_district(
    &self,
    id: DistrictId,
  ) -> impl Future<Output = Result<CascadeReport, Self::Error>> + Send + '_;

  /// Delete a subdistrict with all of its cities.
  fn delete_subdistrict(
    &self,
    id: SubdistrictId,
  ) -> impl Future<Output = Result<CascadeReport, Self::Error>> + Send + '_;

  /// Delete a single city. Any state using it as capital has its capital
  /// cleared; the state itself survives.
  fn delete_city(
    &self,
    id: CityId,
  ) -> impl Future<Output = Result<CascadeReport, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_state(
    &self,
    id: StateId,
  ) -> impl Future<Output = Result<Option<State>, Self::Error>> + Send + '_;

  /// All states, ordered by id.
  fn list_states(&self) -> impl Future<Output = Result<Vec<State>, Self::Error>> + Send + '_;

  fn find_state_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<State>, Self::Error>> + Send + 'a;

  /// Districts of `state_id` called `name`. Names are not unique.
  fn find_districts<'a>(
    &'a self,
    state_id: StateId,
    name: &'a str,
  ) -> impl Future<Output = Result<Vec<District>, Self::Error>> + Send + 'a;

  /// Cities of `district_id` called `name`. Names are not unique.
  fn find_cities<'a>(
    &'a self,
    district_id: DistrictId,
    name: &'a str,
  ) -> impl Future<Output = Result<Vec<City>, Self::Error>> + Send + 'a;

  /// Read-only snapshot of a state's full subtree. Fails with `NotFound` if
  /// the state does not exist.
  fn get_hierarchy(
    &self,
    state_id: StateId,
  ) -> impl Future<Output = Result<StateTree, Self::Error>> + Send + '_;
}
