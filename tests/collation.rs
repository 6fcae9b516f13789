use anyhow::Result;

use collation_cex::collation::{
    collate,
    lemma::{LemmaUrn, DEFAULT_CHAPTER},
    sigla::Siglum,
    variant::{normalize_reference, Reading, WitnessId, WitnessState, OMISSION},
    Collation,
};

static FIXTURE: &str = include_str!("fixtures/collation.xml");

fn witness(siglum: &str) -> WitnessId {
    WitnessId::plain(Siglum::Resolved(siglum.to_owned()))
}

fn lemma_texts(collation: &Collation) -> Vec<(String, String)> {
    collation
        .lemmata
        .iter()
        .map(|lemma| (lemma.urn.to_string(), lemma.base_text.clone()))
        .collect()
}

fn reading<'a>(collation: &'a Collation, urn: &str, witness: &WitnessId) -> Option<&'a str> {
    collation
        .lemmata
        .iter()
        .find(|lemma| lemma.urn.to_string() == urn)
        .and_then(|lemma| collation.variants.reading(&lemma.urn, witness))
        .map(|reading| reading.as_str())
}

#[test]
fn test_anchors_split_lemmata() -> Result<()> {
    let collation = collate(
        r#"<TEI><text><body><milestone unit="chapter" n="1"/>a <anchor/> b <anchor/> c</body></text></TEI>"#,
    )?;

    assert_eq!(
        lemma_texts(&collation),
        vec![
            ("1.1".to_owned(), "a ".to_owned()),
            ("1.2".to_owned(), " b ".to_owned()),
            ("1.3".to_owned(), " c".to_owned()),
        ]
    );

    Ok(())
}

#[test]
fn test_lemma_index_resets_per_chapter() -> Result<()> {
    let collation = collate(
        r#"<TEI><text><body>
<milestone unit="chapter" n="1"/>a<anchor/>b<anchor/>
<milestone unit="section" n="x"/>c<anchor/>
<milestone unit="chapter" n="2"/>d<anchor/>e<anchor/></body></text></TEI>"#,
    )?;

    let urns: Vec<String> = collation
        .lemmata
        .iter()
        .map(|lemma| lemma.urn.to_string())
        .collect();
    assert_eq!(urns, vec!["1.1", "1.2", "1.3", "2.1", "2.2", "2.3"]);

    Ok(())
}

#[test]
fn test_text_capture() -> Result<()> {
    let collation = collate(
        r#"<TEI><teiHeader>title<anchor/></teiHeader><text><body>before chapter<anchor/>
<milestone unit="chapter" n="1"/>one
two<note>a note<anchor/></note> three<anchor/></body><back>appendix</back></text></TEI>"#,
    )?;

    // the anchor inside the note still closes a lemma
    assert_eq!(
        lemma_texts(&collation),
        vec![
            ("1.1".to_owned(), "one two".to_owned()),
            ("1.2".to_owned(), " three".to_owned()),
            ("1.3".to_owned(), "".to_owned()),
        ]
    );

    Ok(())
}

#[test]
fn test_lemmata_of_document() -> Result<()> {
    let collation = collate(FIXTURE)?;

    assert_eq!(
        lemma_texts(&collation),
        vec![
            ("3.1.1.1".to_owned(), " tatra pramāṇam".to_owned()),
            ("3.1.1.2".to_owned(), " iti sūtram".to_owned()),
            ("3.1.2.1".to_owned(), " śeṣaḥ  atha".to_owned()),
            ("3.1.2.2".to_owned(), " anyat".to_owned()),
            ("3.1.2.3".to_owned(), " ".to_owned()),
        ]
    );

    Ok(())
}

#[test]
fn test_direct_witness_readings() -> Result<()> {
    let collation = collate(
        r##"<TEI><teiHeader><listWit>
<witness sameAs="A"><abbr>A</abbr></witness>
<witness sameAs="B"><abbr>B</abbr></witness>
</listWit></teiHeader>
<text><body><milestone unit="chapter" n="1"/>foo<app type="a2"><rdg wit="#A #B">
foo
</rdg></app><anchor/></body></text></TEI>"##,
    )?;

    assert_eq!(reading(&collation, "1.1", &witness("A")), Some("foo"));
    assert_eq!(reading(&collation, "1.1", &witness("B")), Some("foo"));
    assert_eq!(collation.variants.witnesses().len(), 2);

    Ok(())
}

#[test]
fn test_readings_of_document() -> Result<()> {
    let collation = collate(FIXTURE)?;

    assert_eq!(reading(&collation, "3.1.1.1", &witness("C_1")), Some(OMISSION));
    assert_eq!(reading(&collation, "3.1.1.2", &witness("A")), Some("prameyam"));
    assert_eq!(reading(&collation, "3.1.1.2", &witness("B_pc")), Some("prameyam"));
    assert_eq!(reading(&collation, "3.1.1.2", &witness("C_1")), Some(OMISSION));
    assert_eq!(reading(&collation, "3.1.1.1", &witness("A")), None);

    Ok(())
}

#[test]
fn test_witness_detail_routing() -> Result<()> {
    let collation = collate(FIXTURE)?;
    let urn = LemmaUrn::new("3.1.2", 1);

    // vl in an a6 apparatus is a primary reading
    let a_vl = WitnessId::with_state(Siglum::Resolved("A".to_owned()), WitnessState::VariantLemma);
    assert_eq!(
        collation.variants.reading(&urn, &a_vl),
        Some(&Reading::Text("athā".to_owned()))
    );
    assert_eq!(a_vl.to_string(), "A_vl");

    // pc is only kept as a secondary reading
    let b_pc = WitnessId::with_state(
        Siglum::Resolved("B_pc".to_owned()),
        WitnessState::PostCorrection,
    );
    assert_eq!(collation.variants.reading(&urn, &b_pc), None);
    assert_eq!(
        collation.variants.secondary_reading(&urn, &b_pc),
        Some(&Reading::Text("tataḥ".to_owned()))
    );
    assert!(collation.variants.secondary_witnesses().contains(&b_pc));
    assert!(!collation.variants.witnesses().contains(&b_pc));

    // any other detail mentioning pc is a later correction
    let c_2pc = WitnessId::with_state(
        Siglum::Resolved("C_1".to_owned()),
        WitnessState::LaterCorrection,
    );
    assert_eq!(c_2pc.to_string(), "C_1_2pc");
    assert_eq!(
        collation.variants.reading(&urn, &c_2pc),
        Some(&Reading::Text("tataḥ".to_owned()))
    );

    let derived = collation.variants.derived_sigla();
    assert_eq!(derived.get("M1_vl"), Some(&a_vl));
    assert_eq!(derived.get("M2_pc"), Some(&b_pc));
    assert_eq!(derived.get("M3_2pc"), Some(&c_2pc));

    assert_eq!(collation.variants.witnesses().len(), 6);

    Ok(())
}

#[test]
fn test_variant_lemma_outside_a6_is_secondary() -> Result<()> {
    let collation = collate(
        r##"<TEI><teiHeader><listWit><witness sameAs="M1"><abbr>A</abbr></witness></listWit></teiHeader>
<text><body><milestone unit="chapter" n="1"/>x<app type="a2"><rdg xml:id="r1">y</rdg><witDetail target="r1" wit="#M1">vl</witDetail><witDetail target="r1" wit="#M1">ac</witDetail></app><anchor/></body></text></TEI>"##,
    )?;

    let urn = LemmaUrn::new("1", 1);
    let a_vl = WitnessId::with_state(Siglum::Resolved("A".to_owned()), WitnessState::VariantLemma);

    assert_eq!(collation.variants.reading(&urn, &a_vl), None);
    assert_eq!(
        collation.variants.secondary_reading(&urn, &a_vl),
        Some(&Reading::Text("y".to_owned()))
    );
    // an unrecognized detail keeps the plain siglum
    assert_eq!(
        collation.variants.reading(&urn, &witness("A")),
        Some(&Reading::Text("y".to_owned()))
    );

    Ok(())
}

#[test]
fn test_unresolved_witness_is_kept() -> Result<()> {
    let collation = collate(FIXTURE)?;

    let unresolved = WitnessId::plain(Siglum::Unresolved("M9".to_owned()));
    assert!(collation.variants.witnesses().contains(&unresolved));
    assert_eq!(reading(&collation, "3.1.2.2", &unresolved), Some("x"));
    assert_eq!(unresolved.to_string(), "unresolved_M9");

    Ok(())
}

#[test]
fn test_last_reading_wins() -> Result<()> {
    let collation = collate(
        r##"<TEI><teiHeader><listWit><witness sameAs="M1"><abbr>A</abbr></witness></listWit></teiHeader>
<text><body><milestone unit="chapter" n="1"/>x<app type="a2"><rdg wit="#M1">first</rdg></app><app type="a3"><rdg wit="#M1">second</rdg></app><anchor/></body></text></TEI>"##,
    )?;

    assert_eq!(reading(&collation, "1.1", &witness("A")), Some("second"));

    Ok(())
}

#[test]
fn test_apparatus_before_chapter() -> Result<()> {
    let collation = collate(
        r##"<TEI><text><body>preface<app type="a2"><rdg wit="#M1">x</rdg></app><anchor/>ignored</body></text></TEI>"##,
    )?;

    let urn = LemmaUrn::new(DEFAULT_CHAPTER, 1);
    let unresolved = WitnessId::plain(Siglum::Unresolved("M1".to_owned()));
    assert_eq!(
        collation.variants.reading(&urn, &unresolved),
        Some(&Reading::Text("x".to_owned()))
    );

    // no chapter milestone: nothing is captured, only the final flush remains
    assert_eq!(
        lemma_texts(&collation),
        vec![(format!("{}.1", DEFAULT_CHAPTER), "".to_owned())]
    );

    Ok(())
}

#[test]
fn test_omission_sentinel() {
    assert_eq!(Reading::from_variant_text(""), Reading::Omitted);
    assert_eq!(Reading::from_variant_text(" \n\t "), Reading::Omitted);
    assert_eq!(Reading::from_variant_text("\n").as_str(), "[[om.]]");
    assert_eq!(
        Reading::from_variant_text("\nfoo\n"),
        Reading::Text("foo".to_owned())
    );
    assert_eq!(
        Reading::from_variant_text(" foo bar"),
        Reading::Text(" foo bar".to_owned())
    );
}

#[test]
fn test_normalize_reference() {
    assert_eq!(normalize_reference("#M12"), "M12");
    assert_eq!(normalize_reference(" #M\n12 "), "M12");
}

#[test]
fn test_empty_document() {
    assert!(collate("  \n").is_err());
}

#[test]
fn test_malformed_apparatus_is_skipped() -> Result<()> {
    for app in [
        r##"<app type="a2"><rdg wit="#M1">x</lem></app>"##,
        r##"<app type="a2"><rdg wit="#M1">x</app>"##,
    ] {
        let xml = format!(
            r##"<TEI><text><body><milestone unit="chapter" n="1"/>a{}<anchor/> b<app type="a2"><rdg wit="#M2">y</rdg></app><anchor/> c</body></text></TEI>"##,
            app
        );
        let collation = collate(&xml)?;

        assert_eq!(
            lemma_texts(&collation),
            vec![
                ("1.1".to_owned(), "a".to_owned()),
                ("1.2".to_owned(), " b".to_owned()),
                ("1.3".to_owned(), " c".to_owned()),
            ],
            "{}",
            app
        );

        let m1 = WitnessId::plain(Siglum::Unresolved("M1".to_owned()));
        let m2 = WitnessId::plain(Siglum::Unresolved("M2".to_owned()));
        assert!(!collation.variants.witnesses().contains(&m1));
        assert_eq!(
            collation.variants.reading(&LemmaUrn::new("1", 2), &m2),
            Some(&Reading::Text("y".to_owned()))
        );
    }

    Ok(())
}

#[test]
fn test_malformed_witness_list_and_milestone_are_skipped() -> Result<()> {
    let collation = collate(
        r#"<TEI><teiHeader><listWit><witness sameAs="M1"><abbr>A</hi></witness></listWit></teiHeader>
<text><body><milestone unit="chapter" n="1"/>a<anchor/>b<milestone unit="chapter" n="2" broken/>c<anchor/>d</body></text></TEI>"#,
    )?;

    assert!(collation.sigla.is_empty());
    assert_eq!(
        lemma_texts(&collation),
        vec![
            ("1.1".to_owned(), "a".to_owned()),
            ("1.2".to_owned(), "bc".to_owned()),
            ("1.3".to_owned(), "d".to_owned()),
        ]
    );

    Ok(())
}

#[test]
fn test_syntax_error_keeps_trailing_lemma() -> Result<()> {
    let collation = collate(
        r#"<TEI><text><body><milestone unit="chapter" n="1"/>a<anchor/>c<broken"#,
    )?;

    assert_eq!(
        lemma_texts(&collation),
        vec![
            ("1.1".to_owned(), "a".to_owned()),
            ("1.2".to_owned(), "c".to_owned()),
        ]
    );

    Ok(())
}
