//! Fixture PDFs built with lopdf.

#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// An image placed on a fixture page.
#[derive(Clone)]
pub enum FixtureImage {
    /// Unfiltered DeviceRGB samples of one color
    Rgb { width: u32, height: u32, color: [u8; 3] },
    /// Unfiltered 8-bit DeviceGray samples
    Gray { width: u32, height: u32, level: u8 },
    /// DCT-encoded JPEG
    Jpeg { width: u32, height: u32 },
    /// A filter the extractor does not decode
    Jpx,
    /// Unfiltered DeviceCMYK at 16 bpc declaring the given size, with a few bytes of data
    Oversized { width: i64, height: i64 },
    /// Another image drawn through a form XObject
    Form(Box<FixtureImage>),
}

/// One page: lines of text, then images.
#[derive(Clone, Default)]
pub struct FixturePage {
    pub lines: Vec<String>,
    pub images: Vec<FixtureImage>,
}

impl FixturePage {
    pub fn text(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            images: Vec::new(),
        }
    }

    pub fn with_image(mut self, image: FixtureImage) -> Self {
        self.images.push(image);
        self
    }
}

/// Serialize `pages` into a US Letter PDF.
pub fn build_pdf(pages: &[FixturePage]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let mut operations = Vec::new();
        let mut y = 750;
        for line in &page.lines {
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), y.into()]),
                Operation::new("Tj", vec![Object::string_literal(line.as_str())]),
                Operation::new("ET", vec![]),
            ]);
            y -= 20;
        }

        let mut xobjects = lopdf::Dictionary::new();
        for (i, image) in page.images.iter().enumerate() {
            let name = format!("Im{}", i + 1);
            let image_id = add_xobject(&mut doc, image);
            xobjects.set(name.as_bytes().to_vec(), image_id);
            operations.extend([
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![100.into(), 0.into(), 0.into(), 100.into(), 50.into(), (y - 120).into()],
                ),
                Operation::new("Do", vec![Object::Name(name.into_bytes())]),
                Operation::new("Q", vec![]),
            ]);
            y -= 120;
        }

        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            Content { operations }.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => xobjects,
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn add_xobject(doc: &mut Document, image: &FixtureImage) -> ObjectId {
    match image {
        FixtureImage::Form(inner) => {
            let inner_id = add_xobject(doc, inner);
            let operations = vec![
                Operation::new("q", vec![]),
                Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]),
                Operation::new("Q", vec![]),
            ];
            let dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 1.into(), 1.into()],
                "Resources" => dictionary! {
                    "XObject" => dictionary! { "Im1" => inner_id },
                },
            };
            doc.add_object(Stream::new(dict, Content { operations }.encode().unwrap()))
        }
        other => doc.add_object(image_stream(other)),
    }
}

fn image_stream(image: &FixtureImage) -> Stream {
    match *image {
        FixtureImage::Rgb {
            width,
            height,
            color,
        } => {
            let data: Vec<u8> = (0..width * height).flat_map(|_| color).collect();
            Stream::new(image_dict(width, height, "DeviceRGB"), data)
        }
        FixtureImage::Gray {
            width,
            height,
            level,
        } => {
            let data = vec![level; (width * height) as usize];
            Stream::new(image_dict(width, height, "DeviceGray"), data)
        }
        FixtureImage::Jpeg { width, height } => {
            let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
                image::Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
            }));
            let mut data = Vec::new();
            img.write_to(&mut Cursor::new(&mut data), ImageFormat::Jpeg)
                .unwrap();
            let mut dict = image_dict(width, height, "DeviceRGB");
            dict.set("Filter", "DCTDecode");
            Stream::new(dict, data)
        }
        FixtureImage::Oversized { width, height } => {
            let dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceCMYK",
                "BitsPerComponent" => 16,
            };
            Stream::new(dict, vec![0; 64])
        }
        FixtureImage::Form(_) => unreachable!("forms are added by add_xobject"),
        FixtureImage::Jpx => {
            let mut dict = image_dict(8, 8, "DeviceRGB");
            dict.set("Filter", "JPXDecode");
            Stream::new(dict, vec![0; 16])
        }
    }
}

fn image_dict(width: u32, height: u32, color_space: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
    }
}

/// Write `bytes` to `name` inside `dir` and return the path.
pub fn write_fixture(dir: &std::path::Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Page texts of a PDF, in page order.
pub fn page_texts(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .keys()
        .map(|&n| doc.extract_text(&[n]).unwrap_or_default())
        .collect()
}

thread_local! {
    static RECORDS: std::cell::RefCell<Vec<(log::Level, String)>> =
        const { std::cell::RefCell::new(Vec::new()) };
}

/// Collects records per thread, so parallel tests only see their own.
struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        RECORDS.with(|r| r.borrow_mut().push((record.level(), record.args().to_string())));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

/// Run `f` and return its result with the log records it emitted.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<(log::Level, String)>) {
    // Another test may have installed the logger already.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log::LevelFilter::Trace);
    RECORDS.with(|r| r.borrow_mut().clear());
    let result = f();
    let records = RECORDS.with(|r| r.take());
    (result, records)
}
