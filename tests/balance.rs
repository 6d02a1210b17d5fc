use std::time::Duration;

use proptest::prelude::*;
use team_balancer::prelude::*;

fn balancer(workers: usize) -> Balancer {
    Balancer::new(Configuration::new().with_workers(workers))
}

fn mids(ratings: &[f64]) -> Vec<RawPlayer> {
    ratings
        .iter()
        .enumerate()
        .map(|(i, &r)| RawPlayer::new(format!("p{i}"), r, "MID"))
        .collect()
}

fn sorted_names(players: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut names = players.into_iter().collect::<Vec<_>>();
    names.sort();
    names
}

/// Checks the properties every response must have for `roster`.
fn assert_consistent(roster: &[RawPlayer], num_teams: usize, response: &BalanceResponse) {
    assert_eq!(response.teams.len(), num_teams);

    let sizes = response.teams.iter().map(|t| t.players.len()).collect::<Vec<_>>();
    let max = *sizes.iter().max().unwrap();
    let min = *sizes.iter().min().unwrap();
    assert!(min >= 1, "empty team in {sizes:?}");
    assert!(max - min <= 1, "unbalanced sizes {sizes:?}");

    let assigned = response
        .teams
        .iter()
        .flat_map(|t| t.players.iter().map(|p| p.name.clone()));
    let expected = roster.iter().map(|p| p.name.trim().to_owned());
    assert_eq!(sorted_names(assigned), sorted_names(expected));

    for (i, team) in response.teams.iter().enumerate() {
        assert_eq!(team.team_number, i + 1);
        let total = team.players.iter().map(|p| p.overall).sum::<f64>();
        assert!((team.total_rating - total).abs() < 1e-9);
        assert!((team.average_rating - total / team.players.len() as f64).abs() < 1e-9);
        for position in Position::ALL {
            let count = team.players.iter().filter(|p| p.position == position).count();
            assert_eq!(team.position_distribution.get(position), count);
        }
    }

    let grand_total = response.teams.iter().map(|t| t.total_rating).sum::<f64>();
    let player_count = response.teams.iter().map(|t| t.players.len()).sum::<usize>();
    assert!((response.overall_mean - grand_total / player_count as f64).abs() < 1e-9);

    let averages = response.teams.iter().map(|t| t.average_rating).collect::<Vec<_>>();
    let spread = averages.iter().cloned().fold(f64::MIN, f64::max)
        - averages.iter().cloned().fold(f64::MAX, f64::min);
    assert!((response.max_rating_difference - spread).abs() < 1e-9);
}

#[test]
fn test_eight_midfielders_split_evenly() {
    let roster = mids(&[5.0, 4.0, 4.0, 3.0, 3.0, 2.0, 2.0, 1.0]);
    let balancer = balancer(2);
    let request = balancer
        .request_builder(roster.clone())
        .with_num_teams(2)
        .with_seed(42)
        .build()
        .unwrap();

    let response = balancer.balance(request).unwrap();
    assert_consistent(&roster, 2, &response);
    for team in &response.teams {
        assert_eq!(team.players.len(), 4);
        assert!((team.total_rating - 12.0).abs() < 1e-9);
        assert_eq!(team.position_distribution.mid, 4);
    }
    assert!(response.max_rating_difference < 1e-9);
    assert!((response.overall_mean - 3.0).abs() < 1e-9);
}

#[test]
fn test_defenders_are_spread() {
    let roster = vec![
        RawPlayer::new("A", 4.0, "DEF"),
        RawPlayer::new("B", 3.0, "DEF"),
        RawPlayer::new("C", 4.0, "MID"),
        RawPlayer::new("D", 3.0, "ATT"),
    ];
    let balancer = balancer(1);
    let request = balancer
        .request_builder(roster.clone())
        .with_seed(3)
        .build()
        .unwrap();

    let response = balancer.balance(request).unwrap();
    assert_consistent(&roster, 2, &response);
    for team in &response.teams {
        assert_eq!(team.position_distribution.def, 1);
        assert!((team.average_rating - 3.5).abs() < 1e-9);
    }
    assert!(response.max_rating_difference < 1e-9);
}

#[test]
fn test_defenders_are_spread_even_when_ratings_disagree() {
    // stacking both defenders would give two teams averaging 1.5
    let roster = vec![
        RawPlayer::new("A", 0.0, "DEF"),
        RawPlayer::new("B", 3.0, "DEF"),
        RawPlayer::new("C", 2.0, "MID"),
        RawPlayer::new("D", 1.0, "ATT"),
    ];
    let balancer = balancer(2);
    for seed in 0..8 {
        let request = balancer
            .request_builder(roster.clone())
            .with_num_attempts(20)
            .with_seed(seed)
            .build()
            .unwrap();

        let response = balancer.balance(request).unwrap();
        assert_consistent(&roster, 2, &response);
        let defs = response
            .teams
            .iter()
            .map(|t| t.position_distribution.def)
            .collect::<Vec<_>>();
        assert_eq!(defs, vec![1, 1], "seed {seed}");
        // best position-balanced split is {B, D} / {A, C}
        assert!((response.max_rating_difference - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_uneven_team_sizes() {
    let roster = mids(&[5.0, 4.0, 3.0, 2.0, 1.0]);
    let balancer = balancer(2);
    let request = balancer
        .request_builder(roster.clone())
        .with_num_teams(3)
        .with_seed(9)
        .build()
        .unwrap();

    let response = balancer.balance(request).unwrap();
    assert_consistent(&roster, 3, &response);
    let mut sizes = response.teams.iter().map(|t| t.players.len()).collect::<Vec<_>>();
    sizes.sort();
    assert_eq!(sizes, vec![1, 2, 2]);
}

#[test]
fn test_one_player_per_team() {
    let roster = mids(&[5.0, 3.0, 2.0, 1.0]);
    let balancer = balancer(2);
    let request = balancer
        .request_builder(roster.clone())
        .with_num_teams(4)
        .build()
        .unwrap();

    let response = balancer.balance(request).unwrap();
    assert_consistent(&roster, 4, &response);
    assert!(response.teams.iter().all(|t| t.players.len() == 1));
    assert!((response.max_rating_difference - 4.0).abs() < 1e-9);
}

#[test]
fn test_more_teams_than_players() {
    let err = balancer(1)
        .request_builder(mids(&[5.0, 3.0, 2.0, 1.0]))
        .with_num_teams(5)
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        BalanceError::InsufficientPlayers {
            players: 4,
            num_teams: 5,
            minimum: 5,
        }
    );
}

#[test]
fn test_invalid_row_rejects_request() {
    let mut roster = mids(&[5.0, 3.0, 2.0, 1.0]);
    roster.push(RawPlayer::new("Eve", 7.5, "MID"));
    let err = balancer(1).request_builder(roster).build().unwrap_err();
    assert!(matches!(err, BalanceError::Validation(_)));
    assert!(err.to_string().contains("#5"), "{err}");
}

#[test]
fn test_seed_is_reproducible_across_worker_counts() {
    let roster = (0..18)
        .map(|i| {
            RawPlayer::new(
                format!("p{i}"),
                ((i * 7) % 11) as f64 / 2.0,
                ["DEF", "MID", "ATT"][i % 3],
            )
        })
        .collect::<Vec<_>>();

    let run = |workers: usize| {
        let balancer = balancer(workers);
        let request = balancer
            .request_builder(roster.clone())
            .with_num_teams(3)
            .with_num_attempts(8)
            .with_time_limit(Duration::from_secs(60))
            .with_seed(2024)
            .build()
            .unwrap();
        balancer.balance(request).unwrap()
    };

    let sequential = run(1);
    let parallel = run(4);
    assert_consistent(&roster, 3, &sequential);
    assert_eq!(sequential, parallel);
}

fn roster_strategy() -> impl Strategy<Value = Vec<RawPlayer>> {
    prop::collection::vec((0u8..=10, 0usize..3), 4..30).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (half_points, pos))| {
                RawPlayer::new(
                    format!("p{i}"),
                    half_points as f64 / 2.0,
                    ["DEF", "MID", "ATT"][pos],
                )
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_every_response_is_consistent(
        roster in roster_strategy(),
        teams in 2usize..=10,
        seed in any::<u64>(),
    ) {
        let num_teams = teams.min(roster.len());
        let balancer = balancer(1);
        let request = balancer
            .request_builder(roster.clone())
            .with_num_teams(num_teams)
            .with_num_attempts(3)
            .with_seed(seed)
            .build()
            .unwrap();

        let response = balancer.balance(request).unwrap();
        assert_consistent(&roster, num_teams, &response);

        for position in Position::ALL {
            let count = roster.iter().filter(|p| p.position == position.code()).count();
            let (floor, ceil) = (count / num_teams, count.div_ceil(num_teams));
            for team in &response.teams {
                let held = team.position_distribution.get(position);
                prop_assert!(
                    (floor..=ceil).contains(&held),
                    "team {} holds {} {} of {}",
                    team.team_number,
                    held,
                    position,
                    count
                );
            }
        }
    }
}
