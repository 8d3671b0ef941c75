use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use satzkorpus::config::CorpusConfig;
use satzkorpus::corpus::{CorpusBuilder, OutputFormat, write_corpus, write_csv};
use satzkorpus::input::DocumentReader;
use satzkorpus::segment::{RuleSegmenter, Segmenter};

fn tei_fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/kritik.xml")
}

#[test]
fn plain_text_to_csv_end_to_end() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("artikel.txt");
    fs::write(
        &input,
        "Die Revolution ist vertagt. Am 19. März wird weiter verhandelt.",
    )?;
    let output = dir.path().join("korpus.csv");

    let reader = DocumentReader::open(&input, &CorpusConfig::default())?;
    let records = CorpusBuilder::new(RuleSegmenter).build(reader)?;
    write_corpus(&output, OutputFormat::Csv, &records)?;

    let written = fs::read_to_string(&output)?;
    let mut lines = written.lines();
    assert_eq!(
        lines.next().ok_or("missing header")?,
        "sentence_id,text,start,end,section_type,page,line,paragraph,file"
    );
    assert_eq!(
        lines.next().ok_or("missing row")?,
        "0,Die Revolution ist vertagt.,0,27,text,,,,artikel.txt"
    );
    assert_eq!(
        lines.next().ok_or("missing row")?,
        "1,Am 19. März wird weiter verhandelt.,28,63,text,,,,artikel.txt"
    );
    assert_eq!(lines.next(), None);
    Ok(())
}

#[test]
fn tei_to_jsonl_end_to_end() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("korpus.jsonl");

    let reader = DocumentReader::open(&tei_fixture(), &CorpusConfig::default())?;
    let records = CorpusBuilder::new(RuleSegmenter).build(reader)?;
    write_corpus(&output, OutputFormat::Jsonl, &records)?;

    let written = fs::read_to_string(&output)?;
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), records.len());

    let first: serde_json::Value = serde_json::from_str(lines[0])?;
    assert_eq!(first["sentence_id"], 0);
    assert_eq!(first["section_type"], "text");
    assert_eq!(first["page"], "3");
    assert_eq!(first["file"], "kritik.xml");

    let last: serde_json::Value = serde_json::from_str(lines[lines.len() - 1])?;
    assert_eq!(last["section_type"], "footnote");
    Ok(())
}

#[test]
fn reruns_produce_byte_identical_output() -> Result<(), Box<dyn Error>> {
    let config = CorpusConfig::default();
    let mut first = Vec::new();
    let mut second = Vec::new();

    let records = CorpusBuilder::new(RuleSegmenter)
        .build(DocumentReader::open(&tei_fixture(), &config)?)?;
    write_csv(&mut first, &records)?;

    let records = CorpusBuilder::new(RuleSegmenter)
        .build(DocumentReader::open(&tei_fixture(), &config)?)?;
    write_csv(&mut second, &records)?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn blank_input_yields_an_empty_corpus() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("leer.txt");
    fs::write(&input, "   \n  ")?;
    let output = dir.path().join("korpus.csv");

    let reader = DocumentReader::open(&input, &CorpusConfig::default())?;
    let records = CorpusBuilder::new(RuleSegmenter).build(reader)?;
    assert!(records.is_empty());

    write_corpus(&output, OutputFormat::Csv, &records)?;
    // header only, no data rows
    let written = fs::read_to_string(&output)?;
    let mut lines = written.lines();
    assert_eq!(
        lines.next(),
        Some("sentence_id,text,start,end,section_type,page,line,paragraph,file")
    );
    assert_eq!(lines.next(), None);
    Ok(())
}

#[test]
fn configured_backend_names_resolve() {
    assert!(Segmenter::from_name("rules").is_some());
    assert!(Segmenter::from_name("unicode").is_some());
    assert!(Segmenter::from_name("stanza").is_none());
}
