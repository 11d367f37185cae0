use super::*;

fn hit(text: &str, score: f32, position: usize) -> LexicalHit {
    LexicalHit {
        text: text.to_string(),
        score,
        position,
    }
}

#[test]
fn rank_hits_orders_by_score_then_position() {
    let mut hits = vec![
        hit("c", 1.0, 2),
        hit("a", 2.0, 5),
        hit("b", 2.0, 1),
        hit("d", 0.5, 0),
    ];

    rank_hits(&mut hits, 3);

    let texts: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
    assert_eq!(texts, vec!["b", "a", "c"]);
}

#[test]
fn corpus_serves_both_searches() {
    let document = "## Cijena\n- Cijena fakulteta je 2500KM\n\n## Lokacija\n- Tuzla";
    let corpus = LexicalCorpus::new(document.to_string(), &TfidfSearch::default());

    assert_eq!(corpus.tfidf().len(), 2);

    let keyword_hits = KeywordSearch::default().search(corpus.document(), "cijena");
    assert_eq!(keyword_hits[0].text, "- Cijena fakulteta je 2500KM");

    let tfidf_hits = TfidfSearch::default().search(corpus.tfidf(), "tuzla");
    assert_eq!(tfidf_hits.len(), 1);
    assert_eq!(tfidf_hits[0].position, 1);
}
