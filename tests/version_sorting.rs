use rstest::{fixture, rstest};

use release_matrix::version::{Qualifier, VersionKey, normalize, sort_versions};

const FIXTURE: &str = include_str!("fixtures/ansible_versions.json");

#[fixture]
fn sorted() -> Vec<String> {
    let versions: Vec<String> = serde_json::from_str(FIXTURE).unwrap();
    sort_versions(&versions).unwrap()
}

fn positions(sorted: &[String], versions: &[&str]) -> Vec<usize> {
    versions
        .iter()
        .map(|v| {
            sorted
                .iter()
                .position(|s| s == v)
                .unwrap_or_else(|| panic!("{} missing from fixture", v))
        })
        .collect()
}

fn assert_ascending(sorted: &[String], versions: &[&str]) {
    let found = positions(sorted, versions);
    let mut ordered = found.clone();
    ordered.sort();
    assert_eq!(found, ordered, "expected {:?} in this order", versions);
}

#[rstest]
fn devel_is_last(sorted: Vec<String>) {
    assert_eq!(sorted.last().map(String::as_str), Some("devel"));
}

#[rstest]
fn sorting_keeps_every_entry(sorted: Vec<String>) {
    let versions: Vec<String> = serde_json::from_str(FIXTURE).unwrap();
    let mut expected = versions.clone();
    expected.sort();
    let mut actual = sorted.clone();
    actual.sort();
    assert_eq!(actual, expected);
}

#[rstest]
fn majors_are_in_release_order(sorted: Vec<String>) {
    assert_ascending(
        &sorted,
        &[
            "1.1", "1.2", "1.3.0", "1.4", "1.5", "1.6", "1.7", "1.8", "1.9.0.1", "2.0.0.0",
            "2.1.0.0", "2.2.0.0", "2.3.0.0", "2.4.0.0", "2.5.0", "2.6.0", "2.7.0", "2.8.0",
            "2.9.0",
        ],
    );
}

#[rstest]
fn hyphenated_release_candidates_precede_final(sorted: Vec<String>) {
    assert_ascending(
        &sorted,
        &[
            "2.3.4.0-0.1.rc1",
            "2.3.4.0",
            "2.4.0.0-0.1.rc1",
            "2.4.0.0-0.2.rc2",
            "2.4.0.0-0.3.rc3",
            "2.4.0.0-0.4.rc4",
            "2.4.0.0-0.5.rc5",
            "2.4.0.0",
        ],
    );
}

#[rstest]
fn pep440_prereleases_precede_final(sorted: Vec<String>) {
    assert_ascending(
        &sorted,
        &[
            "2.7.0.dev0",
            "2.7.0a1",
            "2.7.0b1",
            "2.7.0rc1",
            "2.7.0rc2",
            "2.7.0rc3",
            "2.7.0rc4",
            "2.7.0",
            "2.7.1",
        ],
    );
}

#[rstest]
fn hyphenated_alpha_and_beta_precede_release_candidates(sorted: Vec<String>) {
    assert_ascending(
        &sorted,
        &[
            "1.9.6",
            "2.0.0-0.1.alpha1",
            "2.0.0-0.3.beta1",
            "2.0.0-0.6.rc1",
            "2.0.0-0.9.rc4",
            "2.0.0.0",
        ],
    );
}

#[rstest]
fn numeric_iteration_follows_its_release(sorted: Vec<String>) {
    assert_ascending(&sorted, &["2.0.0.2", "2.0.0.2-1", "2.0.1.0"]);
}

#[rstest]
fn shorter_versions_compare_as_zero_padded(sorted: Vec<String>) {
    assert_ascending(&sorted, &["1.6", "1.6.1", "1.6.2", "1.6.9", "1.6.10", "1.7"]);
}

#[rstest]
fn sorted_output_is_monotonic(sorted: Vec<String>) {
    let keys: Vec<VersionKey> = sorted[..sorted.len() - 1]
        .iter()
        .map(|v| normalize(v).unwrap())
        .collect();
    for pair in keys.windows(2) {
        assert!(pair[0] <= pair[1], "{} sorted before {}", pair[0], pair[1]);
    }
}

#[test]
fn namespaced_identifiers_sort_like_bare_ones() {
    let versions: Vec<String> = [
        "ansible-devel",
        "ansible-2.7.0",
        "ansible-2.7.0rc1",
        "ansible-2.4.0.0-0.1.rc1",
        "ansible-1.9.6",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    assert_eq!(
        sort_versions(&versions).unwrap(),
        vec![
            "ansible-1.9.6",
            "ansible-2.4.0.0-0.1.rc1",
            "ansible-2.7.0rc1",
            "ansible-2.7.0",
            "ansible-devel",
        ]
    );
}

#[test]
fn normalized_key_exposes_qualifier() {
    let key = normalize("ansible-2.4.0.0-0.3.rc3").unwrap();
    assert_eq!(key.qualifier(), Qualifier::Rc);
    assert_eq!(key.qualifier_seq(), 3);
    assert!(key.is_prerelease());
}
