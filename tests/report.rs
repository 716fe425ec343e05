use count_changes::model::{Contributor, RepositoryTotals, Summary, Totals};
use count_changes::report::{leaderboard, write_json, write_report, Metric, Mode};
use pretty_assertions::assert_eq;

fn contributor(account_id: u64, name: &str, commits: u64, review_count: u64) -> Contributor {
    Contributor {
        account_id,
        name: name.to_string(),
        commits,
        review_count,
    }
}

fn summary() -> Summary {
    let contributors = vec![
        contributor(1, "Alice", 3, 1),
        contributor(2, "Bob, Jr.", 0, 2),
        contributor(3, "Carol", 1, 2),
        contributor(4, "Dan", 0, 3),
    ];
    Summary {
        totals: Totals {
            commits: contributors.iter().map(|c| c.commits).sum(),
            reviews: contributors.iter().map(|c| c.review_count).sum(),
            additions: 1200,
            deletions: 345,
        },
        contributors,
        repositories: vec![RepositoryTotals {
            name: "openstack/keystone".to_string(),
            changes: 4,
            additions: 1200,
            deletions: 345,
        }],
    }
}

fn render(mode: Mode, color: bool) -> String {
    let mut out = Vec::new();
    write_report(&mut out, &summary(), mode, color).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn reviews_leaderboard_lines() {
    assert_eq!(
        render(Mode::Reviews, false),
        "1,Dan,3,0.375000,0.375000\n\
         2,Bob  Jr.,2,0.250000,0.625000\n\
         3,Carol,2,0.250000,0.875000\n\
         4,Alice,1,0.125000,1.000000\n"
    );
}

#[test]
fn commits_leaderboard_skips_zero_counts() {
    assert_eq!(
        render(Mode::Commits, false),
        "1,Alice,3,0.750000,0.750000\n\
         2,Carol,1,0.250000,1.000000\n"
    );
}

#[test]
fn ties_keep_creation_order() {
    let rows = leaderboard(&summary(), Metric::Reviews);
    let ids: Vec<u64> = rows.iter().map(|r| r.account_id).collect();
    assert_eq!(ids, vec![4, 2, 3, 1]);
}

#[test]
fn cumulative_share_reaches_one() {
    for metric in [Metric::Reviews, Metric::Commits] {
        let rows = leaderboard(&summary(), metric);
        let last = rows.last().unwrap();
        assert!((last.cumulative - 1.0).abs() < 1e-9);
    }
}

#[test]
fn empty_summary_prints_no_rows() {
    let mut out = Vec::new();
    write_report(&mut out, &Summary::default(), Mode::Reviews, false).unwrap();
    assert!(out.is_empty());
}

#[test]
fn summary_lines() {
    assert_eq!(
        render(Mode::Summary, false),
        "+1200 -345\n\
         4 patches merged\n\
         8 patches reviewed\n\
         4 total contributors\n"
    );
}

#[test]
fn summary_colors_line_counts_when_asked() {
    let text = render(Mode::Summary, true);
    let first = text.lines().next().unwrap();
    assert!(first.contains("\u{1b}[32m+1200"), "{first:?}");
    assert!(first.contains("\u{1b}[31m-345"), "{first:?}");
    assert!(text.contains("\n4 patches merged\n"));
}

#[test]
fn json_summary_includes_repositories() {
    let mut out = Vec::new();
    write_json(&mut out, &summary(), Mode::Summary).unwrap();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["additions"], 1200);
    assert_eq!(v["contributors"], 4);
    assert_eq!(v["repositories"][0]["name"], "openstack/keystone");
}

#[test]
fn json_leaderboard_rows() {
    let mut out = Vec::new();
    write_json(&mut out, &summary(), Mode::Commits).unwrap();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let rows = v.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[0]["name"], "Alice");
    assert_eq!(rows[1]["cumulative"], 1.0);
}
