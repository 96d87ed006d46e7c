use lopdf::content::Content;
use roast_report::{
    logo::Logo, render_report, render_report_from_json, CritiquePair, FeedbackRecord,
    PageGeometry, ReportError,
};

/// Decodes the strings shown by every page of the document, in painting order.
fn page_strings(pdf_document_bytes: &[u8]) -> Vec<Vec<String>> {
    let pdf_document = lopdf::Document::load_mem(pdf_document_bytes).unwrap();
    pdf_document
        .get_pages()
        .values()
        .map(|page_id| {
            let content_bytes = pdf_document.get_page_content(*page_id).unwrap();
            let content = Content::decode(&content_bytes).unwrap();
            content
                .operations
                .iter()
                .filter(|operation| operation.operator == "Tj")
                .map(|operation| {
                    let string_bytes = operation.operands[0].as_str().unwrap();
                    String::from_utf8_lossy(string_bytes).into_owned()
                })
                .collect()
        })
        .collect()
}

fn scenario_record() -> FeedbackRecord {
    FeedbackRecord::from_json(
        br#"{
            "id": "scenario",
            "overall_score": 40,
            "one_liner": "Generic and forgettable.",
            "first_impression": { "critique": "Reads like a template.", "remedy": "Lead with impact." },
            "skills_section": { "critique": "Every buzzword ever.", "remedy": "Keep the ones you use." },
            "work_experience": { "critique": "Duties, not results.", "remedy": "Quantify outcomes." },
            "red_flags": [],
            "top_fixes": ["Add metrics", "Cut objective statement"]
        }"#,
    )
    .unwrap()
}

#[test]
fn scenario_record_renders_the_expected_document() {
    let rendered_report = render_report(&scenario_record(), &PageGeometry::default(), None).unwrap();
    assert_eq!(rendered_report.content_type, "application/pdf");
    assert_eq!(rendered_report.filename, "roast-scenario.pdf");

    let pages = page_strings(&rendered_report.bytes);
    assert_eq!(pages.len(), 1);
    let strings = &pages[0];
    let count = |needle: &str| strings.iter().filter(|string| *string == needle).count();

    // Header
    assert_eq!(count("Roast My Resume"), 1);
    assert_eq!(count("Roast ID: scenario"), 1);
    assert_eq!(count("Roast results"), 1);
    assert_eq!(count("Generic and forgettable."), 1);

    // Score card, the score is immediately followed by its scale
    let score_position = strings.iter().position(|string| string == "40").unwrap();
    assert_eq!(strings[score_position + 1], "/ 100");

    // Exactly three cards in the grid and no flagged issues
    for title in ["First impression", "Skills section", "Work experience"] {
        assert_eq!(count(title), 1, "{}", title);
    }
    assert_eq!(count("Roast"), 3);
    assert_eq!(count("Fix"), 3);
    assert_eq!(count("Red flags"), 0);

    // Two numbered fixes and the footer last
    assert_eq!(count("Top 5 things to fix"), 1);
    let numbered_fixes: Vec<&str> = strings
        .iter()
        .map(|string| string.as_str())
        .filter(|string| string.starts_with("1. ") || string.starts_with("2. ") || string.starts_with("3. "))
        .collect();
    similar_asserts::assert_eq!(
        numbered_fixes,
        vec!["1. Add metrics", "2. Cut objective statement"]
    );
    assert_eq!(strings.last().unwrap(), "Generated by Roast My Resume");
}

#[test]
fn footer_is_on_the_final_page_of_long_reports() {
    let long_text = "This sentence is padding for a very long critique. ".repeat(25);
    let record = FeedbackRecord {
        red_flags: vec![CritiquePair::new(long_text.clone(), long_text.clone()); 5],
        top_fixes: vec![long_text.clone(); 5],
        ..scenario_record()
    };
    let rendered_report = render_report(&record, &PageGeometry::default(), None).unwrap();
    let pages = page_strings(&rendered_report.bytes);
    assert!(pages.len() > 1);

    let footer = "Generated by Roast My Resume";
    for (page_index, strings) in pages.iter().enumerate() {
        let has_footer = strings.iter().any(|string| string == footer);
        assert_eq!(has_footer, page_index == pages.len() - 1, "page {}", page_index);
    }
}

#[test]
fn rendering_is_deterministic() {
    let geometry = PageGeometry::default();
    let first_bytes = render_report(&scenario_record(), &geometry, None).unwrap().bytes;
    let second_bytes = render_report(&scenario_record(), &geometry, None).unwrap().bytes;
    assert!(first_bytes == second_bytes);
}

#[test]
fn logos_replace_the_text_title() {
    let image = image::RgbaImage::from_pixel(12, 6, image::Rgba([220, 38, 38, 255]));
    let mut png_bytes = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut png_bytes, image::ImageFormat::Png)
        .unwrap();
    let logo = Logo::decode(png_bytes.get_ref()).unwrap();

    let rendered_report =
        render_report(&scenario_record(), &PageGeometry::default(), Some(&logo)).unwrap();
    let pages = page_strings(&rendered_report.bytes);
    assert!(!pages[0].iter().any(|string| string == "Roast My Resume"));

    let pdf_document = lopdf::Document::load_mem(&rendered_report.bytes).unwrap();
    let first_page_id = *pdf_document.get_pages().values().next().unwrap();
    let content_bytes = pdf_document.get_page_content(first_page_id).unwrap();
    let content = Content::decode(&content_bytes).unwrap();
    assert!(content.operations.iter().any(|operation| operation.operator == "Do"));
}

#[test]
fn invalid_records_never_produce_a_document() {
    let geometry = PageGeometry::default();

    let result = render_report_from_json(br#"{ "overall_score": 40 }"#, &geometry, None);
    assert!(matches!(result, Err(ReportError::InvalidRecord(_))));

    let record = FeedbackRecord {
        red_flags: vec![CritiquePair::default(); 6],
        ..scenario_record()
    };
    let result = render_report(&record, &geometry, None);
    assert!(matches!(result, Err(ReportError::InvalidRecord(_))));

    let record = FeedbackRecord {
        id: String::new(),
        ..scenario_record()
    };
    let result = render_report(&record, &geometry, None);
    assert!(matches!(result, Err(ReportError::InvalidRecord(_))));
}

#[test]
fn typographic_punctuation_survives_encoding() {
    let record = FeedbackRecord {
        one_liner: "\u{201C}Synergy\u{201D} \u{2014} café".into(),
        ..scenario_record()
    };
    let rendered_report = render_report(&record, &PageGeometry::default(), None).unwrap();
    let pdf_document = lopdf::Document::load_mem(&rendered_report.bytes).unwrap();
    let first_page_id = *pdf_document.get_pages().values().next().unwrap();
    let content = Content::decode(&pdf_document.get_page_content(first_page_id).unwrap()).unwrap();
    let encoded_strings: Vec<Vec<u8>> = content
        .operations
        .iter()
        .filter(|operation| operation.operator == "Tj")
        .map(|operation| operation.operands[0].as_str().unwrap().to_vec())
        .collect();
    assert!(encoded_strings.contains(&b"\x93Synergy\x94 \x97 caf\xe9".to_vec()));
}
