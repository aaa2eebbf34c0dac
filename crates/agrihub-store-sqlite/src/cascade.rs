//! Explicit cascading deletes.
//!
//! Each routine walks its subtree leaves-first and must be called inside a
//! transaction; the caller commits once the whole walk has succeeded. Before a
//! city row goes, every state naming it as capital has that reference cleared.

use agrihub_core::region::CascadeReport;
use rusqlite::{Connection, params};

fn child_ids(conn: &Connection, sql: &str, parent: i64) -> rusqlite::Result<Vec<i64>> {
  let mut stmt = conn.prepare(sql)?;
  let ids = stmt
    .query_map(params![parent], |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<i64>>>()?;
  Ok(ids)
}

/// Delete one city, clearing any capital reference to it first.
pub fn delete_city(conn: &Connection, id: i64, now: &str) -> rusqlite::Result<CascadeReport> {
  let cleared = conn.execute(
    "UPDATE states SET capital_id = NULL, updated_at = ?2 WHERE capital_id = ?1",
    params![id, now],
  )?;
  let cities = conn.execute("DELETE FROM cities WHERE id = ?1", params![id])?;
  Ok(CascadeReport { cities, capitals_cleared: cleared, ..Default::default() })
}

/// Delete a subdistrict and its cities.
pub fn delete_subdistrict(
  conn: &Connection,
  id: i64,
  now: &str,
) -> rusqlite::Result<CascadeReport> {
  let mut report = CascadeReport::default();
  for city in child_ids(conn, "SELECT id FROM cities WHERE subdistrict_id = ?1", id)? {
    report += delete_city(conn, city, now)?;
  }
  report.subdistricts += conn.execute("DELETE FROM subdistricts WHERE id = ?1", params![id])?;
  Ok(report)
}

/// Delete a district, its subdistricts and every city it owns.
pub fn delete_district(conn: &Connection, id: i64, now: &str) -> rusqlite::Result<CascadeReport> {
  let mut report = CascadeReport::default();
  for sub in child_ids(conn, "SELECT id FROM subdistricts WHERE district_id = ?1", id)? {
    report += delete_subdistrict(conn, sub, now)?;
  }
  // Cities attached straight to the district.
  for city in child_ids(conn, "SELECT id FROM cities WHERE district_id = ?1", id)? {
    report += delete_city(conn, city, now)?;
  }
  report.districts += conn.execute("DELETE FROM districts WHERE id = ?1", params![id])?;
  Ok(report)
}

/// Delete a state and its entire subtree.
pub fn delete_state(conn: &Connection, id: i64, now: &str) -> rusqlite::Result<CascadeReport> {
  // The state's own capital goes with it; that is not a cleared referrer.
  conn.execute("UPDATE states SET capital_id = NULL WHERE id = ?1", params![id])?;

  let mut report = CascadeReport::default();
  for district in child_ids(conn, "SELECT id FROM districts WHERE state_id = ?1", id)? {
    report += delete_district(conn, district, now)?;
  }
  report.states += conn.execute("DELETE FROM states WHERE id = ?1", params![id])?;
  Ok(report)
}
