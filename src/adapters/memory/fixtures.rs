//! In-memory fixture repository.

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::{DateRange, Fixture};
use crate::ports::repository::FixtureRepository;

/// Fixture feed held ascending by match date.
#[derive(Debug, Default)]
pub struct InMemoryFixtureStore {
    fixtures: Vec<Fixture>,
}

impl InMemoryFixtureStore {
    pub fn new(mut fixtures: Vec<Fixture>) -> Self {
        fixtures.sort_by_key(|f| f.match_date);
        debug!(fixtures = fixtures.len(), "Indexed fixture feed");
        Self { fixtures }
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}

impl FixtureRepository for InMemoryFixtureStore {
    fn find_fixtures(&self, range: Option<DateRange>, league: Option<&str>) -> Vec<Fixture> {
        self.fixtures
            .iter()
            .filter(|f| range.is_none_or(|r| r.contains(f.match_date)))
            .filter(|f| league.is_none_or(|l| f.league == l))
            .cloned()
            .collect()
    }

    fn leagues(&self) -> Vec<String> {
        self.fixtures
            .iter()
            .map(|f| f.league.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FixtureStatus;
    use chrono::{Duration, TimeZone, Utc};

    fn fixture(id: &str, league: &str, day: i64) -> Fixture {
        Fixture {
            id: id.into(),
            home_team_id: "h".into(),
            away_team_id: "a".into(),
            league: league.into(),
            match_date: Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap() + Duration::days(day),
            season: "2024-25".into(),
            status: FixtureStatus::Finished,
            home_first_half_goals: Some(0),
            away_first_half_goals: Some(0),
        }
    }

    #[test]
    fn test_sorted_and_filtered() {
        let store = InMemoryFixtureStore::new(vec![
            fixture("c", "Serie A", 2),
            fixture("a", "La Liga", 0),
            fixture("b", "Serie A", 1),
        ]);
        let all = store.find_fixtures(None, None);
        let ids: Vec<_> = all.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let serie_a = store.find_fixtures(None, Some("Serie A"));
        assert_eq!(serie_a.len(), 2);

        let range = DateRange::new(all[1].match_date, all[2].match_date);
        assert_eq!(store.find_fixtures(Some(range), Some("La Liga")).len(), 0);
        assert_eq!(store.leagues(), vec!["La Liga", "Serie A"]);
    }
}
