use std::collections::BTreeMap;

use crate::domain::models::{
    guest::Guest,
    table::TableRoster,
};

/// Trimmed table label, `None` for blank input.
pub fn normalize_table_name(table: Option<&str>) -> Option<String> {
    table
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Sets or clears the assignment. No capacity check is made.
pub fn assign_table(guest: &mut Guest, table: Option<&str>) {
    guest.table_name = normalize_table_name(table);
}

fn sort_table_names(names: &mut [String]) {
    let all_numeric = names.iter().all(|n| n.parse::<i64>().is_ok());
    if all_numeric {
        names.sort_by_key(|n| n.parse::<i64>().unwrap_or_default());
    } else {
        names.sort();
    }
}

fn group_by_table(guests: &[Guest]) -> BTreeMap<String, Vec<&Guest>> {
    let mut groups: BTreeMap<String, Vec<&Guest>> = BTreeMap::new();
    for guest in guests {
        if let Some(table) = normalize_table_name(guest.table_name.as_deref()) {
            groups.entry(table).or_default().push(guest);
        }
    }
    groups
}

/// Rosters for every table with at least one guest. Ordered numerically when
/// every name is an integer, lexicographically otherwise.
pub fn derive_tables(guests: &[Guest]) -> Vec<TableRoster> {
    let mut groups = group_by_table(guests);
    let mut names: Vec<String> = groups.keys().cloned().collect();
    sort_table_names(&mut names);

    names
        .into_iter()
        .filter_map(|name| {
            let members = groups.remove(&name)?;
            let total = members
                .iter()
                .fold(0i32, |acc, g| acc.saturating_add(g.party_size()));
            Some(TableRoster {
                name,
                guests: members.into_iter().cloned().collect(),
                total,
            })
        })
        .collect()
}

/// `(name, capacity)` per distinct assigned table, capacity being the sum of
/// `1 + companions` over the guests seated there.
pub fn capacities_from_assignments(guests: &[Guest]) -> Vec<(String, i32)> {
    derive_tables(guests)
        .into_iter()
        .map(|roster| (roster.name, roster.total))
        .collect()
}
