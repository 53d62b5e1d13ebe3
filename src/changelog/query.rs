use crate::changelog::ChangeRecord;

/// Records whose target is exactly `name`, in their original order.
///
/// Matching is case-sensitive and does no path normalization.
pub fn filter_by_name<'a>(
    records: &'a [ChangeRecord],
    name: &'a str,
) -> impl DoubleEndedIterator<Item = &'a ChangeRecord> + Clone {
    records
        .iter()
        .filter(move |record| record.target_name() == name)
}

/// Most recent record with a non-zero size.
///
/// Walks from the newest record backwards and stops at the first hit.
/// `None` means every record had size 0, or there were no records at all.
pub fn last_nonzero<'a, I>(records: I) -> Option<&'a ChangeRecord>
where
    I: IntoIterator<Item = &'a ChangeRecord>,
    I::IntoIter: DoubleEndedIterator,
{
    records
        .into_iter()
        .rev()
        .find(|record| record.size_bytes() != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::{ChangelogParser, fixtures::changelog_text};
    use rstest::*;

    const TIMES: [&str; 5] = [
        "Mon Jun 1 10:00:00 2015",
        "Mon Jun 1 11:00:00 2015",
        "Mon Jun 1 12:00:00 2015",
        "Mon Jun 1 13:00:00 2015",
        "Mon Jun 1 14:00:00 2015",
    ];

    fn records_for(entries: &[(&str, u64, &str)]) -> Vec<ChangeRecord> {
        ChangelogParser::new()
            .parse_text(&changelog_text(entries))
            .expect("fixture changelog parses")
    }

    fn history_with_sizes(sizes: &[u64]) -> Vec<ChangeRecord> {
        let entries = sizes
            .iter()
            .zip(TIMES)
            .map(|(size, time)| ("file.bin", *size, time))
            .collect::<Vec<_>>();
        records_for(&entries)
    }

    #[test]
    fn last_nonzero_picks_most_recent_nonzero_record() {
        let records = history_with_sizes(&[100, 0, 50, 0, 0]);

        let found = last_nonzero(&records).expect("a non-zero record exists");

        assert_eq!(found.size_bytes(), 50);
        assert_eq!(found, &records[2]);
    }

    #[rstest]
    #[case(&[0, 0, 0])]
    #[case(&[0])]
    #[case(&[])]
    fn last_nonzero_is_absent_without_nonzero_sizes(#[case] sizes: &[u64]) {
        let records = history_with_sizes(sizes);
        assert!(last_nonzero(&records).is_none());
    }

    #[test]
    fn last_nonzero_prefers_latest_of_equal_candidates() {
        let records = history_with_sizes(&[7, 7, 7]);
        let found = last_nonzero(&records).unwrap();
        assert_eq!(found.timestamp(), records[2].timestamp());
    }

    #[test]
    fn filter_by_name_keeps_order_and_exact_matches_only() {
        let records = records_for(&[
            ("a.txt", 1, TIMES[0]),
            ("a.txt.bak", 2, TIMES[1]),
            ("A.TXT", 3, TIMES[2]),
            ("a.txt", 4, TIMES[3]),
            ("dir/a.txt", 5, TIMES[4]),
        ]);

        let sizes = filter_by_name(&records, "a.txt")
            .map(|r| r.size_bytes())
            .collect::<Vec<_>>();

        assert_eq!(sizes, [1, 4]);
    }

    #[test]
    fn filter_by_name_without_matches_is_empty() {
        let records = records_for(&[("a.txt", 1, TIMES[0])]);
        assert_eq!(filter_by_name(&records, "missing.txt").count(), 0);
        assert!(last_nonzero(filter_by_name(&records, "missing.txt")).is_none());
    }

    #[test]
    fn report_scenario_finds_size_before_truncation() {
        let records = records_for(&[
            ("report.pdf", 4096, TIMES[0]),
            ("notes.txt", 12, TIMES[1]),
            ("report.pdf", 0, TIMES[2]),
        ]);

        let found = last_nonzero(filter_by_name(&records, "report.pdf")).unwrap();
        assert_eq!(found.size_bytes(), 4096);
        assert_eq!(found.timestamp(), records[0].timestamp());

        assert!(last_nonzero(filter_by_name(&records, "absent.doc")).is_none());
    }

    #[test]
    fn unrelated_nonzero_records_do_not_leak_into_result() {
        let records = records_for(&[
            ("a.txt", 0, TIMES[0]),
            ("a.txt.bak", 999, TIMES[1]),
            ("a.txt", 0, TIMES[2]),
        ]);
        assert!(last_nonzero(filter_by_name(&records, "a.txt")).is_none());
    }
}
