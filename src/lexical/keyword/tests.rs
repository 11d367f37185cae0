use super::*;

const LINES: &[&str] = &["- Price: 2500 BAM", "- Location: Tuzla"];

const KNOWLEDGE: &str = "\
## Studijski programi
- Informatika i računarstvo
- Ekonomija i menadžment

## Cijena
- Cijena fakulteta je 2500KM godišnje

## Lokacija
- Adresa: Husinskih rudara, Tuzla
- Kontakt telefon: 035 123 456
";

#[test]
fn strict_price_query_returns_only_price_line() {
    let search = KeywordSearch::new(KeywordMode::Strict, 7);

    let hits = search.search_lines(LINES.iter().copied(), "price");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].text, "- Price: 2500 BAM");
    assert_eq!(hits[0].position, 0);
}

#[test]
fn scored_price_query_returns_only_price_line() {
    let search = KeywordSearch::default();

    let hits = search.search_lines(LINES.iter().copied(), "price");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].text, "- Price: 2500 BAM");
}

#[test]
fn strict_requires_every_token() {
    let search = KeywordSearch::new(KeywordMode::Strict, 7);

    assert_eq!(search.search(KNOWLEDGE, "ekonomija menadžment").len(), 1);
    assert!(search.search(KNOWLEDGE, "ekonomija tuzla").is_empty());
}

#[test]
fn strict_ignores_boost_terms() {
    let search = KeywordSearch::new(KeywordMode::Strict, 7);

    let hits = search.search(KNOWLEDGE, "koliko košta");

    assert!(hits.is_empty());
}

#[test]
fn scored_uses_boost_terms() {
    let search = KeywordSearch::default();

    let hits = search.search(KNOWLEDGE, "koliko košta studiranje");

    assert!(!hits.is_empty());
    assert_eq!(hits[0].text, "- Cijena fakulteta je 2500KM godišnje");
}

#[test]
fn diacritics_are_folded_on_both_sides() {
    let search = KeywordSearch::new(KeywordMode::Strict, 7);

    let hits = search.search(KNOWLEDGE, "racunarstvo");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].text, "- Informatika i računarstvo");
}

#[test]
fn exact_phrase_outranks_scattered_terms() {
    let lines = ["tuzla centar tuzla", "studij u centru tuzla", "centar tuzla"];
    let search = KeywordSearch::new(KeywordMode::Scored, 7).with_rules(BoostRules::none());

    let hits = search.search_lines(lines.iter().copied(), "centar tuzla");

    // "tuzla centar tuzla": 1 + 2 + bonus, "centar tuzla": 1 + 1 + bonus
    assert_eq!(hits[0].position, 0);
    assert_eq!(hits[0].score, 3.0 + EXACT_PHRASE_BONUS);
    assert_eq!(hits[1].position, 2);
    assert_eq!(hits[1].score, 2.0 + EXACT_PHRASE_BONUS);
    assert_eq!(hits[2].position, 1);
}

#[test]
fn ties_keep_line_order() {
    let lines = ["alpha one", "beta", "alpha two", "alpha three"];
    let search = KeywordSearch::new(KeywordMode::Scored, 2).with_rules(BoostRules::none());

    let hits = search.search_lines(lines.iter().copied(), "alpha");

    let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
    assert_eq!(positions, vec![0, 2]);
}

#[test]
fn max_results_caps_output() {
    let lines = vec!["tuzla"; 20];
    let search = KeywordSearch::new(KeywordMode::Scored, 7);

    assert_eq!(search.search_lines(lines.iter().copied(), "tuzla").len(), 7);
}

#[test]
fn stop_word_only_query_finds_nothing() {
    let search = KeywordSearch::default();

    assert!(search.search(KNOWLEDGE, "i u na").is_empty());
    assert!(search.search(KNOWLEDGE, "   ").is_empty());
}

#[test]
fn blank_lines_are_skipped() {
    let search = KeywordSearch::default();

    let hits = search.search("\n\n  tuzla  \n", "tuzla");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].text, "tuzla");
    assert_eq!(hits[0].position, 2);
}
