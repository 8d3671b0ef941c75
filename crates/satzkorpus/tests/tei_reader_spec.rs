use std::error::Error;
use std::path::{Path, PathBuf};

use satzkorpus::config::CorpusConfig;
use satzkorpus::corpus::{CorpusBuilder, SectionType};
use satzkorpus::input::{DocumentReader, InputFormat};
use satzkorpus::segment::RuleSegmenter;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/kritik.xml")
}

#[test]
fn tei_fixture_is_detected_and_chunked() -> Result<(), Box<dyn Error>> {
    let reader = DocumentReader::open(&fixture(), &CorpusConfig::default())?;
    assert_eq!(reader.format(), InputFormat::Tei);
    assert_eq!(reader.file_name(), "kritik.xml");

    let chunks = reader.chunks().collect::<Result<Vec<_>, _>>()?;
    assert_eq!(chunks.len(), 4);

    // body chunks first, in document order
    assert_eq!(chunks[0].section, SectionType::Body);
    assert_eq!(
        chunks[0].text,
        "Die Waare ist zunächst ein äusserer Gegenstand. Sie befriedigt menschliche Bedürfnisse."
    );
    assert_eq!(chunks[0].locator.page.as_deref(), Some("3"));
    assert_eq!(chunks[0].locator.paragraph.as_deref(), Some("p-1"));

    // page break inside the paragraph does not split it
    assert_eq!(
        chunks[1].text,
        "Der Reichthum erscheint als Waarensammlung. Die Waare ist seine Elementarform."
    );
    assert_eq!(chunks[1].locator.page.as_deref(), Some("3"));

    // paragraph after the embedded page break starts on the new page
    assert_eq!(chunks[2].locator.page.as_deref(), Some("4"));

    // footnote last, label stripped, page and line from the note position
    assert_eq!(chunks[3].section, SectionType::Footnote);
    assert_eq!(
        chunks[3].text,
        "Karl Marx: Zur Kritik der politischen Oekonomie. Berlin 1859."
    );
    assert_eq!(chunks[3].locator.page.as_deref(), Some("3"));
    assert_eq!(chunks[3].locator.line, Some(30));
    Ok(())
}

#[test]
fn front_matter_never_reaches_the_corpus() -> Result<(), Box<dyn Error>> {
    let reader = DocumentReader::open(&fixture(), &CorpusConfig::default())?;
    for chunk in reader.chunks() {
        assert!(!chunk?.text.contains("Vorwort"));
    }
    Ok(())
}

#[test]
fn corpus_from_tei_has_contiguous_ids_and_line_numbers() -> Result<(), Box<dyn Error>> {
    let reader = DocumentReader::open(&fixture(), &CorpusConfig::default())?;
    let mut builder = CorpusBuilder::new(RuleSegmenter);
    let records = builder.build(reader)?;

    assert_eq!(records.len(), 7);
    for (expected_id, record) in records.iter().enumerate() {
        assert_eq!(record.sentence_id, expected_id as u64);
        assert_eq!(record.file, "kritik.xml");
    }

    // first paragraph: one sentence per source line
    assert_eq!(records[0].line, Some(1));
    assert_eq!(records[1].line, Some(2));

    // sentence spanning the embedded page break stays whole
    assert_eq!(records[3].text, "Die Waare ist seine Elementarform.");
    assert_eq!(records[3].section_type, SectionType::Body);

    // footnote sentences close the corpus
    assert_eq!(records[5].section_type, SectionType::Footnote);
    assert_eq!(records[6].section_type, SectionType::Footnote);
    assert_eq!(records[5].line, Some(30));
    assert_eq!(records[6].text, "Berlin 1859.");

    // offsets are character positions within the owning chunk
    assert_eq!(records[0].start, 0);
    assert_eq!(records[0].end, 47);
    assert_eq!(records[1].start, 48);
    Ok(())
}

#[test]
fn repeated_builds_are_identical() -> Result<(), Box<dyn Error>> {
    let config = CorpusConfig::default();
    let first = CorpusBuilder::new(RuleSegmenter)
        .build(DocumentReader::open(&fixture(), &config)?)?;
    let second = CorpusBuilder::new(RuleSegmenter)
        .build(DocumentReader::open(&fixture(), &config)?)?;
    assert_eq!(first, second);
    Ok(())
}
