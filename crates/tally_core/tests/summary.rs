use pretty_assertions::assert_eq;
use tally_core::{BatchSummary, ExtractionResult};

fn init_logging() {
    tally_logging::initialize_for_tests();
}

#[test]
fn empty_batch_reports_only_the_total() {
    init_logging();
    let summary = BatchSummary::from_results(Vec::new());

    assert_eq!(
        summary.ordered_messages(),
        &["Total word count across all files: 0".to_string()]
    );
    assert_eq!(summary.total_word_count(), 0);
    assert!(summary.is_finalized());
}

#[test]
fn successes_are_listed_in_recording_order_and_summed() {
    init_logging();
    let summary = BatchSummary::from_results(vec![
        ExtractionResult::succeeded("1-a.docx", 10),
        ExtractionResult::succeeded("2-b.doc", 5),
        ExtractionResult::succeeded("3-c.docx", 0),
    ]);

    assert_eq!(
        summary.report_contents(),
        "Processed 1-a.docx: 10 words\n\
         Processed 2-b.doc: 5 words\n\
         Processed 3-c.docx: 0 words\n\
         Total word count across all files: 15"
    );
    assert_eq!(summary.processed_files(), 3);
}

#[test]
fn failures_add_nothing_to_report_or_total() {
    init_logging();
    let summary = BatchSummary::from_results(vec![
        ExtractionResult::succeeded("1-a.docx", 4),
        ExtractionResult::failed("2-broken.docx", "corrupt zip"),
        ExtractionResult::succeeded("3-c.docx", 6),
    ]);

    assert_eq!(summary.total_word_count(), 10);
    assert_eq!(summary.failed_files(), 1);
    assert!(summary
        .ordered_messages()
        .iter()
        .all(|line| !line.contains("2-broken.docx")));
    assert_eq!(summary.ordered_messages().len(), 3);
}

#[test]
fn failed_result_carries_zero_words_and_message() {
    let failed = ExtractionResult::failed("x.doc", "word not installed");
    assert!(!failed.is_success());
    assert_eq!(failed.word_count(), 0);
    assert_eq!(failed.error_message(), Some("word not installed"));
}

#[test]
fn finalize_appends_total_once() {
    let mut summary = BatchSummary::new();
    summary.record(&ExtractionResult::succeeded("a.docx", 2));
    summary.record_skipped();
    summary.finalize();
    summary.finalize();

    assert_eq!(summary.ordered_messages().len(), 2);
    assert_eq!(summary.skipped_files(), 1);
    assert_eq!(
        summary.ordered_messages().last().map(String::as_str),
        Some("Total word count across all files: 2")
    );
}

#[test]
fn total_matches_sum_of_reported_counts() {
    let counts = [3u64, 17, 0, 250, 1];
    let summary = BatchSummary::from_results(
        counts
            .iter()
            .enumerate()
            .map(|(i, c)| ExtractionResult::succeeded(format!("{i}-f.docx"), *c)),
    );

    let reported: u64 = summary
        .ordered_messages()
        .iter()
        .filter_map(|line| line.strip_prefix("Processed "))
        .filter_map(|rest| rest.rsplit_once(": "))
        .filter_map(|(_, words)| words.strip_suffix(" words"))
        .map(|n| n.parse::<u64>().unwrap())
        .sum();
    assert_eq!(reported, summary.total_word_count());
    assert_eq!(reported, 271);
}
