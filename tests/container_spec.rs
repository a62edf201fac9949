mod common;

use common::{GEOMETRY, LayerSpec, NoteBuilder, PageSpec, build_notebook, uniform_layer};
use supernote_reader::note::format::block::BlockReader;
use supernote_reader::note::format::container;
use supernote_reader::{NoteError, Notebook, Orientation};

const INFO_TWO: &str = r##"[{"layerId"#0,"name"#"Main Layer","isBackgroundLayer"#false},{"layerId"#-1,"name"#"Background Layer","isBackgroundLayer"#true}]"##;

const INFO_FOUR: &str = concat!(
    r##"[{"layerId"#2,"name"#"Layer 2","isVisible"#true},"##,
    r##"{"layerId"#1,"name"#"Layer 1","isVisible"#true},"##,
    r##"{"layerId"#0,"name"#"Main Layer","isVisible"#true},"##,
    r##"{"layerId"#-1,"name"#"Background Layer","isVisible"#true}]"##,
);

fn layer(name: &'static str) -> LayerSpec {
    LayerSpec::new(name, uniform_layer(0x62, GEOMETRY))
}

fn open(bytes: Vec<u8>) -> Notebook {
    Notebook::from_bytes(bytes, GEOMETRY).expect("parse notebook")
}

#[test]
fn parses_preamble_header_and_footer() {
    let pages = [PageSpec::vertical(vec![layer("MAINLAYER"), layer("BGLAYER")]).with_info(INFO_TWO)];
    let notebook = open(build_notebook(&pages, &["alpha", "beta"], &["other.note"]));

    assert_eq!(notebook.file_type(), "note");
    assert_eq!(notebook.signature(), "SN_FILE_VER_20230015");
    assert_eq!(notebook.header().tags.get("FILE_TYPE"), Some("NOTE"));
    assert_eq!(notebook.footer().page_addresses.len(), 1);
    assert_eq!(notebook.keywords().len(), 2);
    assert_eq!(notebook.keywords()[1].get("KEYWORD"), Some("beta"));
    assert_eq!(notebook.links().len(), 1);
    assert_eq!(notebook.links()[0].get("LINKFILE"), Some("other.note"));
}

#[test]
fn keywords_and_links_default_to_empty() {
    let pages = [PageSpec::vertical(vec![layer("MAINLAYER"), layer("BGLAYER")])];
    let notebook = open(build_notebook(&pages, &[], &[]));
    assert!(notebook.keywords().is_empty());
    assert!(notebook.links().is_empty());
}

#[test]
fn footer_without_pages_yields_zero_pages() {
    let notebook = open(build_notebook(&[], &[], &[]));
    assert!(notebook.pages().is_empty());
    assert!(matches!(notebook.page(0), Err(NoteError::PageOutOfRange { index: 0, total: 0 })));
}

#[test]
fn layers_follow_discovery_order_and_skip_absent_ones() {
    let pages = [PageSpec::vertical(vec![layer("MAINLAYER"), layer("LAYER1"), layer("BGLAYER")])];
    let notebook = open(build_notebook(&pages, &[], &[]));

    let page = notebook.page(0).unwrap();
    let names: Vec<&str> = page.layers.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["MAINLAYER", "LAYER1", "BGLAYER"]);
    assert_eq!(page.total_layers(), 3);
    assert_eq!(page.layer_sequence.as_deref(), Some("MAINLAYER,LAYER1,BGLAYER"));
    assert_eq!(page.page_id.as_deref(), Some("P20240101000000000000"));
    assert!(page.layers[2].is_background());
    assert!(!page.layers[0].is_background());
    assert_eq!(page.layers[0].layer_type.as_deref(), Some("NOTE"));
    assert_eq!(page.layers[0].protocol.as_deref(), Some("RATTA_RLE"));
}

#[test]
fn layer_content_is_loaded_eagerly() {
    let bitmap = uniform_layer(0x61, GEOMETRY);
    let pages = [PageSpec::vertical(vec![LayerSpec::new("MAINLAYER", bitmap.clone()), layer("BGLAYER")])];
    let notebook = open(build_notebook(&pages, &[], &[]));
    assert_eq!(notebook.page(0).unwrap().layers[0].content, bitmap);
}

#[test]
fn orientation_codes() {
    let pages = [
        PageSpec::vertical(vec![layer("BGLAYER")]),
        PageSpec::vertical(vec![layer("BGLAYER")]).with_orientation("1000"),
    ];
    let notebook = open(build_notebook(&pages, &[], &[]));
    assert_eq!(notebook.pages()[0].orientation, Orientation::Vertical);
    assert!(notebook.pages()[1].is_horizontal());
}

#[test]
fn unknown_orientation_is_malformed() {
    let pages = [PageSpec::vertical(vec![layer("BGLAYER")]).with_orientation("1234")];
    let result = Notebook::from_bytes(build_notebook(&pages, &[], &[]), GEOMETRY);
    assert!(matches!(result, Err(NoteError::MalformedFile(_))));
}

#[test]
fn two_layers_get_positional_info_regardless_of_names() {
    let pages = [PageSpec::vertical(vec![layer("MAINLAYER"), layer("BGLAYER")]).with_info(INFO_TWO)];
    let notebook = open(build_notebook(&pages, &[], &[]));
    let page = notebook.page(0).unwrap();

    let first = page.layers[0].info.as_ref().expect("main layer info");
    let last = page.layers[1].info.as_ref().expect("background info");
    assert_eq!(first.name(), Some("Main Layer"));
    assert_eq!(first.fields.get("isBackgroundLayer"), Some("false"));
    assert_eq!(last.name(), Some("Background Layer"));
    assert!(!page.tags.contains_key("LAYERINFO"));
}

#[test]
fn interior_layers_match_by_normalized_name() {
    // LAYER3 has no record and must stay without info.
    let pages = [PageSpec::vertical(vec![
        layer("MAINLAYER"),
        layer("LAYER1"),
        layer("LAYER3"),
        layer("LAYER2"),
        layer("BGLAYER"),
    ])
    .with_info(INFO_FOUR)];
    let notebook = open(build_notebook(&pages, &[], &[]));
    let layers = &notebook.page(0).unwrap().layers;

    let info_name = |i: usize| layers[i].info.as_ref().and_then(|info| info.name().map(str::to_owned));
    assert_eq!(info_name(0).as_deref(), Some("Main Layer"));
    assert_eq!(info_name(1).as_deref(), Some("Layer 1"));
    assert_eq!(info_name(2), None);
    assert_eq!(info_name(3).as_deref(), Some("Layer 2"));
    assert_eq!(info_name(4).as_deref(), Some("Background Layer"));
}

#[test]
fn every_extracted_address_resolves() {
    let pages = [
        PageSpec::vertical(vec![layer("MAINLAYER"), layer("LAYER1"), layer("BGLAYER")]).with_info(INFO_FOUR),
        PageSpec::vertical(vec![layer("MAINLAYER"), layer("BGLAYER")]).with_info(INFO_TWO),
    ];
    let bytes = build_notebook(&pages, &["k"], &["l"]);
    let metadata = container::parse(&mut BlockReader::from_bytes(bytes.clone())).unwrap();

    let mut reader = BlockReader::from_bytes(bytes);
    reader.read_block(metadata.footer.header_address).unwrap();
    for page in &metadata.pages {
        reader.read_block(page.address).unwrap();
        for layer in &page.layers {
            reader.read_block(layer.address).unwrap();
            reader.read_block(layer.bitmap_address).unwrap();
        }
    }
}

#[test]
fn missing_header_address_is_reported() {
    let mut builder = NoteBuilder::new();
    let footer = builder.tagged(&[("PAGE1", "24".to_string())]);
    let bytes = builder.finish(footer);

    match Notebook::from_bytes(bytes, GEOMETRY) {
        Err(NoteError::MissingField { key, address }) => {
            assert_eq!(key, "FILE_FEATURE");
            assert_eq!(address, footer);
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn missing_layer_bitmap_is_reported() {
    let mut builder = NoteBuilder::new();
    let header = builder.tagged(&[("FILE_TYPE", "NOTE".to_string())]);
    let layer = builder.tagged(&[("LAYERNAME", "MAINLAYER".to_string())]);
    let page = builder.tagged(&[("MAINLAYER", layer.to_string()), ("ORIENTATION", "1090".to_string())]);
    let footer = builder.tagged(&[("FILE_FEATURE", header.to_string()), ("PAGE1", page.to_string())]);
    let bytes = builder.finish(footer);

    assert!(matches!(
        Notebook::from_bytes(bytes, GEOMETRY),
        Err(NoteError::MissingField { key: "LAYERBITMAP", address }) if address == layer
    ));
}

#[test]
fn page_address_out_of_bounds_is_reported() {
    let mut builder = NoteBuilder::new();
    let header = builder.tagged(&[("FILE_TYPE", "NOTE".to_string())]);
    let footer = builder.tagged(&[("FILE_FEATURE", header.to_string()), ("PAGE1", "999999".to_string())]);
    let bytes = builder.finish(footer);

    assert!(matches!(
        Notebook::from_bytes(bytes, GEOMETRY),
        Err(NoteError::InvalidAddress { address: 999999, .. })
    ));
}

#[test]
fn footer_address_out_of_bounds_is_reported() {
    let bytes = NoteBuilder::new().finish(1 << 20);
    assert!(matches!(
        Notebook::from_bytes(bytes, GEOMETRY),
        Err(NoteError::InvalidAddress { .. })
    ));
}

#[test]
fn short_or_unreadable_files_are_malformed() {
    assert!(matches!(
        Notebook::from_bytes(b"note".to_vec(), GEOMETRY),
        Err(NoteError::MalformedFile(_))
    ));

    let mut bytes = build_notebook(&[], &[], &[]);
    bytes[10] = 0xFF;
    assert!(matches!(
        Notebook::from_bytes(bytes, GEOMETRY),
        Err(NoteError::MalformedFile(_))
    ));
}

#[test]
fn repeated_page_keys_are_flattened() {
    let mut builder = NoteBuilder::new();
    let header = builder.tagged(&[("FILE_TYPE", "NOTE".to_string())]);
    let bitmap = builder.block(&uniform_layer(0x62, GEOMETRY));
    let layer = builder.tagged(&[("LAYERNAME", "BGLAYER".to_string()), ("LAYERBITMAP", bitmap.to_string())]);
    let first = builder.tagged(&[("BGLAYER", layer.to_string()), ("PAGEID", "first".to_string())]);
    let second = builder.tagged(&[("BGLAYER", layer.to_string()), ("PAGEID", "second".to_string())]);
    let footer = builder.tagged(&[
        ("FILE_FEATURE", header.to_string()),
        ("PAGE", first.to_string()),
        ("PAGE", second.to_string()),
    ]);
    let notebook = open(builder.finish(footer));

    let ids: Vec<Option<&str>> = notebook.pages().iter().map(|p| p.page_id.as_deref()).collect();
    assert_eq!(ids, vec![Some("first"), Some("second")]);
}
