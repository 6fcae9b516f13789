use collation_cex::utility::encoding::decode_markup;

#[test]
fn test_decode_markup() {
    assert_eq!(decode_markup("<TEI>śeṣaḥ</TEI>".as_bytes()), "<TEI>śeṣaḥ</TEI>");

    // UTF-8 BOM is dropped
    assert_eq!(decode_markup(b"\xEF\xBB\xBF<TEI/>"), "<TEI/>");

    // UTF-16LE BOM switches the decoder
    let utf16: Vec<u8> = [0xFF, 0xFE]
        .into_iter()
        .chain("<a/>".encode_utf16().flat_map(|unit| unit.to_le_bytes()))
        .collect();
    assert_eq!(decode_markup(&utf16), "<a/>");

    assert_eq!(decode_markup(b"a\xFFb"), "a\u{FFFD}b");
}
