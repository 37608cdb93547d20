//! Value grammar coverage, exercised through object resolution.

mod common;

use common::{PdfBuilder, open, stream_object};
use pageport_core::{ObjectRef, Value};

fn doc_with_object(body: &str) -> pageport_core::PDFDocument<std::io::Cursor<Vec<u8>>> {
    let bytes = PdfBuilder::new()
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>")
        .object(3, "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 10 10] >>")
        .object(4, body)
        .build(1);
    open(bytes)
}

fn resolve_first(body: &str) -> Value {
    let mut doc = doc_with_object(body);
    let decl = doc.resolve_object(ObjectRef::new(4, 0)).unwrap();
    decl.values.into_iter().next().expect("object has a value")
}

#[test]
fn scalars_parse_to_their_variants() {
    let value = resolve_first(
        "<< /Int 7 /Neg -3 /Real -2.5 /Yes true /No false /Nothing null /Kind /Alpha >>",
    );
    let dict = value.as_dict().unwrap();
    assert_eq!(dict["Int"], Value::Int(7));
    assert_eq!(dict["Neg"], Value::Int(-3));
    assert_eq!(dict["Real"], Value::Real(-2.5));
    assert_eq!(dict["Yes"], Value::Bool(true));
    assert_eq!(dict["No"], Value::Bool(false));
    assert_eq!(dict["Nothing"], Value::Null);
    assert_eq!(dict["Kind"], Value::Name("Alpha".to_string()));
}

#[test]
fn literal_strings_keep_nested_parens_and_escapes() {
    let value = resolve_first("<< /A (lit(er)al) /B (a\\)b) >>");
    let dict = value.as_dict().unwrap();
    assert_eq!(dict["A"], Value::String(b"lit(er)al".to_vec()));
    assert_eq!(dict["B"], Value::String(b"a\\)b".to_vec()));
}

#[test]
fn hex_strings_stay_raw() {
    let value = resolve_first("<< /H <48656C6C6F> >>");
    let dict = value.as_dict().unwrap();
    assert_eq!(dict["H"], Value::Hex(b"48656C6C6F".to_vec()));
}

#[test]
fn arrays_nest_and_keep_order() {
    let value = resolve_first("<< /A [1 [2.5 (x)] /N] >>");
    let dict = value.as_dict().unwrap();
    let Value::Array(items) = &dict["A"] else {
        panic!("expected array, got {:?}", dict["A"]);
    };
    assert_eq!(items[0], Value::Int(1));
    assert_eq!(
        items[1],
        Value::Array(vec![Value::Real(2.5), Value::String(b"x".to_vec())])
    );
    assert_eq!(items[2], Value::Name("N".to_string()));
}

#[test]
fn reference_lookahead_consumes_exactly_three_tokens() {
    let value = resolve_first("<< /R 3 0 R /After 9 >>");
    let dict = value.as_dict().unwrap();
    assert_eq!(dict["R"], Value::Ref(ObjectRef::new(3, 0)));
    assert_eq!(dict["After"], Value::Int(9));
}

#[test]
fn adjacent_integers_are_not_a_reference() {
    let value = resolve_first("<< /Nums [1 2 3] >>");
    let dict = value.as_dict().unwrap();
    assert_eq!(
        dict["Nums"],
        Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
}

#[test]
fn dict_key_without_value_reads_as_null() {
    let value = resolve_first("<< /Type /Test /Broken >>");
    let dict = value.as_dict().unwrap();
    assert_eq!(dict["Broken"], Value::Null);
}

#[test]
fn unknown_keyword_is_preserved() {
    let value = resolve_first("wibble");
    assert_eq!(value, Value::Keyword(b"wibble".to_vec()));
}

#[test]
fn stream_reads_exactly_length_bytes() {
    let bytes = PdfBuilder::new()
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>")
        .object(3, "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 10 10] >>")
        .object_bytes(4, stream_object("", b"raw stream bytes"))
        .build(1);
    let mut doc = open(bytes);
    let decl = doc.resolve_object(ObjectRef::new(4, 0)).unwrap();
    let (dict, data) = decl.stream_pair().expect("dict plus stream body");
    assert_eq!(dict["Length"], Value::Int(16));
    assert_eq!(data.as_ref(), b"raw stream bytes");
}

#[test]
fn stream_length_may_be_an_indirect_reference() {
    let bytes = PdfBuilder::new()
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>")
        .object(3, "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 10 10] >>")
        .object_bytes(4, {
            let mut body = b"<< /Length 5 0 R >>\nstream\nindirectly sized".to_vec();
            body.extend_from_slice(b"\nendstream");
            body
        })
        .object(5, "16")
        .build(1);
    let mut doc = open(bytes);
    let decl = doc.resolve_object(ObjectRef::new(4, 0)).unwrap();
    let (_, data) = decl.stream_pair().expect("dict plus stream body");
    assert_eq!(data.as_ref(), b"indirectly sized");
}

#[test]
fn resolve_returns_direct_values_unchanged() {
    let mut doc = doc_with_object("<< /X 1 >>");
    let direct = Value::Int(5);
    assert_eq!(doc.resolve(&direct).unwrap(), Value::Int(5));
    let name = Value::Name("Foo".to_string());
    assert_eq!(doc.resolve(&name).unwrap(), name);
}
