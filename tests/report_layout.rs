use rand::{rngs::StdRng, Rng, SeedableRng as _};
use roast_report::{
    display::{BlockKind, DrawCommand, LaidOutReport},
    layout::{layout_report, ReportLayout},
    CritiquePair, FeedbackRecord, PageGeometry,
};

const TOLERANCE: f32 = 1e-3;

fn short_record() -> FeedbackRecord {
    FeedbackRecord {
        id: "layout-1".into(),
        overall_score: Some(42.0),
        one_liner: "Competent, forgettable, and formatted in Comic Sans.".into(),
        first_impression: CritiquePair::new("A", "a"),
        skills_section: CritiquePair::new("B", "b"),
        work_experience: CritiquePair::new("C", "c"),
        ..FeedbackRecord::default()
    }
}

fn random_sentence(rng: &mut StdRng, maximum_words: usize) -> String {
    let word_count = rng.gen_range(1..=maximum_words);
    (0..word_count)
        .map(|_| {
            let word_length = rng.gen_range(1..=12);
            (0..word_length)
                .map(|_| rng.gen_range(b'a'..=b'z') as char)
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn random_pair(rng: &mut StdRng, maximum_words: usize) -> CritiquePair {
    CritiquePair::new(
        random_sentence(rng, maximum_words),
        random_sentence(rng, maximum_words),
    )
}

fn random_record(rng: &mut StdRng) -> FeedbackRecord {
    FeedbackRecord {
        id: format!("fuzz-{}", rng.gen_range(0..1_000_000)),
        overall_score: Some(rng.gen_range(0..=100) as f64),
        one_liner: random_sentence(rng, 30),
        first_impression: random_pair(rng, 40),
        skills_section: random_pair(rng, 40),
        work_experience: random_pair(rng, 40),
        red_flags: (0..rng.gen_range(0..=5))
            .map(|_| random_pair(rng, 80))
            .collect(),
        top_fixes: (0..rng.gen_range(0..=5))
            .map(|_| random_sentence(rng, 60))
            .collect(),
        ..FeedbackRecord::default()
    }
}

fn count_texts(laid_out_report: &LaidOutReport, needle: &str) -> usize {
    laid_out_report
        .pages
        .iter()
        .flat_map(|page| page.texts())
        .filter(|text| *text == needle)
        .count()
}

#[test]
fn sections_are_assigned_to_columns_by_position() {
    let geometry = PageGeometry::default();
    let laid_out_report = layout_report(&short_record(), &geometry, false);

    let cards: Vec<_> = laid_out_report
        .placements_of(|kind| matches!(kind, BlockKind::SectionCard { .. }))
        .collect();
    assert_eq!(cards.len(), 3);
    assert_eq!(cards[0].kind, BlockKind::SectionCard { index: 0, column: 0 });
    assert_eq!(cards[1].kind, BlockKind::SectionCard { index: 1, column: 1 });
    assert_eq!(cards[2].kind, BlockKind::SectionCard { index: 2, column: 0 });

    // The first row is aligned, the third card is stacked below the first one
    assert!((cards[0].top - cards[1].top).abs() < TOLERANCE);
    assert!((cards[2].top - (cards[0].bottom() + geometry.gap)).abs() < TOLERANCE);

    // The grid consumes the height of its taller column
    let grid = laid_out_report
        .placements_of(|kind| *kind == BlockKind::SectionGrid)
        .next()
        .unwrap();
    assert!((grid.bottom() - cards[2].bottom()).abs() < TOLERANCE);

    let card_x = |title: &str| {
        laid_out_report.pages[0]
            .commands
            .iter()
            .find_map(|command| match command {
                DrawCommand::Text { x, text, .. } if text == title => Some(*x),
                _ => None,
            })
            .unwrap()
    };
    assert!((card_x("First impression") - card_x("Work experience")).abs() < TOLERANCE);
    assert!(card_x("Skills section") > card_x("First impression") + geometry.column_width());
}

#[test]
fn empty_lists_are_left_out() {
    let laid_out_report = layout_report(&short_record(), &PageGeometry::default(), false);
    assert!(!laid_out_report.contains_text("Red flags"));
    assert!(!laid_out_report.contains_text("Top 5 things to fix"));
    assert_eq!(
        laid_out_report
            .placements_of(|kind| matches!(
                kind,
                BlockKind::FlaggedBanner | BlockKind::FixBanner
            ))
            .count(),
        0
    );
}

#[test]
fn a_single_flagged_issue_gives_a_single_pair() {
    let record = FeedbackRecord {
        red_flags: vec![CritiquePair::new("Three jobs in one year.", "Explain the moves.")],
        ..short_record()
    };
    let laid_out_report = layout_report(&record, &PageGeometry::default(), false);

    assert!(laid_out_report.contains_text("Red flags"));
    assert_eq!(
        laid_out_report
            .placements_of(|kind| matches!(kind, BlockKind::FlaggedItem { .. }))
            .count(),
        1
    );
    // Three section cards and the flagged issue each carry one pair of labels
    assert_eq!(count_texts(&laid_out_report, "Roast"), 4);
    assert_eq!(count_texts(&laid_out_report, "Fix"), 4);
    assert!(laid_out_report.contains_text("Three jobs in one year."));
}

#[test]
fn fixes_are_numbered() {
    let record = FeedbackRecord {
        top_fixes: vec!["Add metrics".into(), "Cut the fluff".into()],
        ..short_record()
    };
    let laid_out_report = layout_report(&record, &PageGeometry::default(), false);
    assert!(laid_out_report.contains_text("Top 5 things to fix"));
    assert!(laid_out_report.contains_text("1. Add metrics"));
    assert!(laid_out_report.contains_text("2. Cut the fluff"));
}

#[test]
fn score_falls_back_to_the_stored_score() {
    let geometry = PageGeometry::default();
    let cases = [
        (Some(87.0), Some(12.0), "87"),
        (None, Some(62.0), "62"),
        (None, None, "0"),
    ];
    for (overall_score, score, expected_score) in cases {
        let record = FeedbackRecord {
            overall_score,
            score,
            ..short_record()
        };
        let laid_out_report = layout_report(&record, &geometry, false);
        assert!(
            laid_out_report.contains_text(expected_score),
            "expected the score {}",
            expected_score
        );
        assert!(laid_out_report.contains_text("/ 100"));
    }
}

#[test]
fn header_falls_back_to_text_without_a_logo() {
    let geometry = PageGeometry::default();
    let laid_out_report = layout_report(&short_record(), &geometry, false);
    assert!(laid_out_report.contains_text("Roast My Resume"));
    assert!(laid_out_report.contains_text("Roast ID: layout-1"));
    assert!(laid_out_report.contains_text("Roast results"));

    let laid_out_report = layout_report(&short_record(), &geometry, true);
    assert!(!laid_out_report.contains_text("Roast My Resume"));
    let logo_count = laid_out_report.pages[0]
        .commands
        .iter()
        .filter(|command| matches!(command, DrawCommand::Logo { .. }))
        .count();
    assert_eq!(logo_count, 1);
}

#[test]
fn page_breaks_start_at_the_top_margin_after_the_background() {
    let geometry = PageGeometry::default();
    let mut rng = StdRng::seed_from_u64(7);
    let record = FeedbackRecord {
        red_flags: (0..5).map(|_| random_pair(&mut rng, 120)).collect(),
        top_fixes: (0..5).map(|_| random_sentence(&mut rng, 120)).collect(),
        ..short_record()
    };
    let laid_out_report = layout_report(&record, &geometry, false);
    assert!(laid_out_report.pages.len() > 1);

    for page in laid_out_report.pages.iter() {
        assert_eq!(
            page.commands.first(),
            Some(&DrawCommand::FillRectangle {
                x: 0.0,
                y: 0.0,
                width: geometry.page_width,
                height: geometry.page_height,
                color: geometry.palette.background,
            })
        );
    }

    let gated_placements: Vec<_> = laid_out_report
        .placements
        .iter()
        .filter(|placement| placement.kind != BlockKind::Footer)
        .collect();
    for pair in gated_placements.windows(2) {
        if pair[1].page != pair[0].page {
            assert_eq!(pair[1].page, pair[0].page + 1);
            assert!((pair[1].top - geometry.margin).abs() < TOLERANCE);
        }
    }
}

#[test]
fn a_grid_pushed_by_a_long_summary_starts_the_next_page() {
    let geometry = PageGeometry::default();
    let laid_out_report = (1..400)
        .map(|sentence_count| {
            let record = FeedbackRecord {
                one_liner: "Lists every tool ever touched without saying what was built. "
                    .repeat(sentence_count),
                ..short_record()
            };
            layout_report(&record, &geometry, false)
        })
        .find(|laid_out_report| {
            laid_out_report
                .placements_of(|kind| *kind == BlockKind::SectionGrid)
                .any(|grid| grid.page == 1)
        })
        .unwrap();

    let header = laid_out_report
        .placements_of(|kind| *kind == BlockKind::Header)
        .next()
        .unwrap();
    assert_eq!(header.page, 0);

    let grid = laid_out_report
        .placements_of(|kind| *kind == BlockKind::SectionGrid)
        .next()
        .unwrap();
    assert!((grid.top - geometry.margin).abs() < TOLERANCE);

    let cards: Vec<_> = laid_out_report
        .placements_of(|kind| matches!(kind, BlockKind::SectionCard { .. }))
        .collect();
    assert_eq!(cards.len(), 3);
    assert!(cards.iter().all(|card| card.page == 1));
    assert!((cards[0].top - geometry.margin).abs() < TOLERANCE);
    assert!((cards[1].top - geometry.margin).abs() < TOLERANCE);

    // The new page is painted before the first card is drawn on it
    let second_page = &laid_out_report.pages[1].commands;
    assert_eq!(
        second_page[0],
        DrawCommand::FillRectangle {
            x: 0.0,
            y: 0.0,
            width: geometry.page_width,
            height: geometry.page_height,
            color: geometry.palette.background,
        }
    );
    assert!(matches!(
        second_page[1],
        DrawCommand::Card { y, .. } if (y - geometry.margin).abs() < TOLERANCE
    ));
}

#[test]
fn oversized_blocks_are_split_between_pages() {
    let geometry = PageGeometry::default();
    let essay = "Every bullet point restates the job title instead of an outcome. ".repeat(150);
    let record = FeedbackRecord {
        first_impression: CritiquePair::new(essay.clone(), "Cut it down."),
        work_experience: CritiquePair::new(essay.clone(), "Quantify the results."),
        red_flags: vec![CritiquePair::new("Four pages long.", essay.clone())],
        top_fixes: vec![essay.clone(), "Add metrics".into()],
        ..short_record()
    };
    let laid_out_report = layout_report(&record, &geometry, false);

    let gated_placements: Vec<_> = laid_out_report
        .placements
        .iter()
        .filter(|placement| placement.kind != BlockKind::Footer)
        .collect();
    for placement in gated_placements.iter() {
        assert!(
            placement.bottom() <= geometry.printable_bottom() + TOLERANCE,
            "{:?} ends at {}",
            placement,
            placement.bottom()
        );
        assert!(placement.top >= geometry.margin - TOLERANCE);
    }
    for pair in gated_placements.windows(2) {
        assert!(pair[1].page >= pair[0].page);
        if pair[1].page != pair[0].page {
            assert!((pair[1].top - geometry.margin).abs() < TOLERANCE);
        }
    }

    // The grid is too tall to be kept together, its cards keep their columns
    assert_eq!(
        laid_out_report
            .placements_of(|kind| *kind == BlockKind::SectionGrid)
            .count(),
        0
    );
    let cards: Vec<_> = laid_out_report
        .placements_of(|kind| matches!(kind, BlockKind::SectionCard { .. }))
        .collect();
    let mut card_indices = Vec::new();
    for card in cards.iter() {
        let BlockKind::SectionCard { index, column } = card.kind else {
            unreachable!()
        };
        assert_eq!(column, index % 2);
        if card_indices.last() != Some(&index) {
            card_indices.push(index);
        }
    }
    assert_eq!(card_indices, vec![0, 1, 2]);

    let parts_of = |wanted: BlockKind| -> Vec<_> {
        laid_out_report
            .placements_of(move |kind| *kind == wanted)
            .collect()
    };
    let first_card = parts_of(BlockKind::SectionCard { index: 0, column: 0 });
    assert!(first_card.len() > 1);
    // Both columns start again at the top of the page where the first card ends
    let second_card = parts_of(BlockKind::SectionCard { index: 1, column: 1 });
    assert_eq!(second_card.len(), 1);
    assert_eq!(second_card[0].page, first_card.last().unwrap().page);
    assert!((second_card[0].top - geometry.margin).abs() < TOLERANCE);
    assert!(parts_of(BlockKind::SectionCard { index: 2, column: 0 }).len() > 1);

    assert!(parts_of(BlockKind::FlaggedItem { index: 0 }).len() > 1);
    assert!(parts_of(BlockKind::FixEntry { index: 0 }).len() > 1);
    assert_eq!(parts_of(BlockKind::FixEntry { index: 1 }).len(), 1);

    // Nothing was lost on the way
    assert_eq!(count_texts(&laid_out_report, "Roast"), 4);
    assert_eq!(count_texts(&laid_out_report, "Fix"), 4);
    assert!(laid_out_report.contains_text("2. Add metrics"));
    assert_eq!(count_texts(&laid_out_report, "Generated by Roast My Resume"), 1);
}

#[test]
fn no_block_crosses_the_bottom_margin() {
    let geometry = PageGeometry::default();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..200 {
        let record = random_record(&mut rng);
        let laid_out_report = layout_report(&record, &geometry, rng.gen_bool(0.5));

        for placement in laid_out_report.placements.iter() {
            if placement.kind == BlockKind::Footer {
                continue;
            }
            assert!(
                placement.bottom() <= geometry.printable_bottom() + TOLERANCE,
                "{:?} of the roast {} ends at {}",
                placement,
                record.id,
                placement.bottom()
            );
            assert!(placement.top >= geometry.margin - TOLERANCE);
            assert!(placement.page < laid_out_report.pages.len());
        }
    }
}

#[test]
fn footer_is_drawn_once_on_the_last_page() {
    let geometry = PageGeometry::default();
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..20 {
        let laid_out_report = layout_report(&random_record(&mut rng), &geometry, false);
        let footers: Vec<_> = laid_out_report
            .placements_of(|kind| *kind == BlockKind::Footer)
            .collect();
        assert_eq!(footers.len(), 1);
        assert_eq!(footers[0].page, laid_out_report.pages.len() - 1);

        let last_page = laid_out_report.pages.last().unwrap();
        assert!(last_page.texts().any(|text| text == "Generated by Roast My Resume"));
        assert_eq!(count_texts(&laid_out_report, "Generated by Roast My Resume"), 1);
    }
}

#[test]
fn ensure_space_breaks_only_when_needed() {
    let geometry = PageGeometry::default();
    let mut layout = ReportLayout::new(&geometry);
    let cursor = layout.begin();
    assert_eq!(cursor.page_count, 1);
    assert_eq!(cursor.y, geometry.margin);

    // A block taller than the page stays on the empty page
    let unchanged_cursor = layout.ensure_space(cursor, geometry.page_height * 2.0);
    assert_eq!(unchanged_cursor, cursor);

    let mut low_cursor = cursor;
    low_cursor.y = geometry.printable_bottom() - 10.0;
    assert_eq!(layout.ensure_space(low_cursor, 9.0), low_cursor);

    let broken_cursor = layout.ensure_space(low_cursor, 11.0);
    assert_eq!(broken_cursor.page_count, 2);
    assert_eq!(broken_cursor.y, geometry.margin);
    assert_eq!(layout.finish().pages.len(), 2);
}

#[test]
fn layout_is_deterministic_for_arbitrary_text() {
    let geometry = PageGeometry::default();
    let mut rng = rand::thread_rng();
    for _ in 0..20 {
        let mut random_text = |maximum_length: usize| {
            let length = rng.gen_range(1..=maximum_length);
            rand_utf8::rand_utf8(&mut rng, length).to_string()
        };
        let record = FeedbackRecord {
            id: "determinism".into(),
            one_liner: random_text(40),
            first_impression: CritiquePair::new(random_text(40), random_text(40)),
            red_flags: vec![CritiquePair::new(random_text(40), random_text(40))],
            top_fixes: vec![random_text(40)],
            ..FeedbackRecord::default()
        };
        similar_asserts::assert_eq!(
            layout_report(&record, &geometry, false),
            layout_report(&record, &geometry, false)
        );
    }
}
