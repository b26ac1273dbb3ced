//! A minimal page-at-a-time PDF canvas on top of lopdf.
//!
//! Text is drawn in Helvetica with WinAnsi encoding; images are embedded as
//! Flate-compressed RGB XObjects, with a soft mask when they carry alpha.

use std::io::Write;

use chrono::{DateTime, Utc};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::imageops::FilterType;
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use unicode_normalization::UnicodeNormalization;

use super::layout::Placement;
use super::options::PageGeometry;
use crate::error::{Error, Result};

const FONT_NAME: &str = "F1";

/// Values for the document information dictionary.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub producer: String,
    pub created: Option<DateTime<Utc>>,
}

/// Accumulates pages of text and images, then serializes the document.
pub struct PdfCanvas {
    doc: Document,
    geometry: PageGeometry,
    pages_id: ObjectId,
    font_id: ObjectId,
    kids: Vec<Object>,
    operations: Vec<Operation>,
    xobjects: Dictionary,
    next_image: usize,
}

impl PdfCanvas {
    pub fn new(geometry: PageGeometry) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        Self {
            doc,
            geometry,
            pages_id,
            font_id,
            kids: Vec::new(),
            operations: Vec::new(),
            xobjects: Dictionary::new(),
            next_image: 0,
        }
    }

    /// Number of finished pages.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Whether anything has been drawn on the current page.
    pub fn has_marks(&self) -> bool {
        !self.operations.is_empty()
    }

    /// Draw one line of text with its baseline at (`x`, `y`).
    pub fn draw_string(&mut self, x: f32, y: f32, text: &str) {
        let encoded = encode_win_ansi(text);
        if encoded.is_empty() {
            return;
        }
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![FONT_NAME.into(), self.geometry.font_size.into()],
            ),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::String(encoded, StringFormat::Literal)]),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Resample `image` to the placed size and draw it.
    pub fn draw_image(&mut self, image: &DynamicImage, placement: Placement) -> Result<()> {
        let pixel_width = (placement.width.round() as u32).max(1);
        let pixel_height = (placement.height.round() as u32).max(1);
        let resized = image.resize_exact(pixel_width, pixel_height, FilterType::Lanczos3);

        let image_id = self.embed(&resized)?;
        let name = format!("Im{}", self.next_image);
        self.next_image += 1;
        self.xobjects.set(name.as_bytes().to_vec(), image_id);

        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    placement.width.into(),
                    0.into(),
                    0.into(),
                    placement.height.into(),
                    placement.x.into(),
                    placement.y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        Ok(())
    }

    fn embed(&mut self, image: &DynamicImage) -> Result<ObjectId> {
        let (width, height) = (image.width() as i64, image.height() as i64);

        let smask = if image.color().has_alpha() {
            let alpha: Vec<u8> = image.to_rgba8().pixels().map(|p| p.0[3]).collect();
            let dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            };
            Some(self.doc.add_object(Stream::new(dict, deflate(&alpha)?)))
        } else {
            None
        };

        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };
        if let Some(smask_id) = smask {
            dict.set("SMask", smask_id);
        }

        let rgb = image.to_rgb8();
        Ok(self.doc.add_object(Stream::new(dict, deflate(rgb.as_raw())?)))
    }

    /// Finish the current page and start a blank one.
    pub fn show_page(&mut self) -> Result<()> {
        let operations = std::mem::take(&mut self.operations);
        let content = Content { operations }
            .encode()
            .map_err(|e| Error::PdfWrite(e.to_string()))?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));

        let xobjects = std::mem::take(&mut self.xobjects);
        let mut resources = dictionary! {
            "Font" => dictionary! { FONT_NAME => self.font_id },
        };
        if !xobjects.is_empty() {
            resources.set("XObject", xobjects);
        }

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                self.geometry.width.into(),
                self.geometry.height.into(),
            ],
            "Contents" => content_id,
            "Resources" => resources,
        });
        self.kids.push(page_id.into());
        Ok(())
    }

    /// Flush a non-empty current page and serialize the document.
    pub fn finish(mut self, info: &DocumentInfo) -> Result<Vec<u8>> {
        if self.has_marks() {
            self.show_page()?;
        }

        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut info_dict = dictionary! {
            "Producer" => text_string(&info.producer),
        };
        if let Some(ref title) = info.title {
            info_dict.set("Title", text_string(title));
        }
        if let Some(created) = info.created {
            info_dict.set("CreationDate", Object::string_literal(pdf_date(&created)));
        }
        let info_id = self.doc.add_object(info_dict);
        self.doc.trailer.set("Info", info_id);

        let mut buf = Vec::new();
        self.doc
            .save_to(&mut buf)
            .map_err(|e| Error::PdfWrite(e.to_string()))?;
        Ok(buf)
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| Error::ImageEncode(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| Error::ImageEncode(e.to_string()))
}

/// Format a timestamp as a PDF date (`D:YYYYMMDDHHmmSSZ`).
pub fn pdf_date(dt: &DateTime<Utc>) -> String {
    dt.format("D:%Y%m%d%H%M%SZ").to_string()
}

/// A PDF text string: literal when ASCII, UTF-16BE with BOM otherwise.
fn text_string(s: &str) -> Object {
    if s.is_ascii() {
        Object::string_literal(s)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        bytes.extend(s.encode_utf16().flat_map(u16::to_be_bytes));
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

/// Encode text for a WinAnsi simple font. Unmappable characters become `?`,
/// tabs become spaces and other control characters are dropped.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.nfc()
        .filter_map(|c| match c {
            '\t' => Some(b' '),
            c if c.is_control() => None,
            c if (c as u32) < 0x80 => Some(c as u8),
            c if (0xA0..=0xFF).contains(&(c as u32)) => Some(c as u32 as u8),
            c => Some(win_ansi_high(c).unwrap_or(b'?')),
        })
        .collect()
}

/// Code points WinAnsiEncoding places in 0x80..=0x9F.
fn win_ansi_high(c: char) -> Option<u8> {
    let code = match c {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Hello (world)"), b"Hello (world)".to_vec());
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        // Decomposed e + combining acute composes to é first.
        assert_eq!(encode_win_ansi("cafe\u{301}"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("“ok”—€"), vec![0x93, b'o', b'k', 0x94, 0x97, 0x80]);
        assert_eq!(encode_win_ansi("日\tx\r"), vec![b'?', b' ', b'x']);
    }

    #[test]
    fn test_pdf_date() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 45).unwrap();
        assert_eq!(pdf_date(&dt), "D:20240115103045Z");
    }

    #[test]
    fn test_blank_canvas_has_no_pages() {
        let canvas = PdfCanvas::new(PageGeometry::letter());
        let bytes = canvas.finish(&DocumentInfo::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().is_empty());
    }

    #[test]
    fn test_alpha_image_gets_soft_mask() {
        let mut canvas = PdfCanvas::new(PageGeometry::letter());
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 128])));
        let placement = Placement {
            x: 10.0,
            y: 10.0,
            width: 4.0,
            height: 4.0,
        };
        canvas.draw_image(&image, placement).unwrap();
        canvas.show_page().unwrap();
        assert_eq!(canvas.page_count(), 1);

        let bytes = canvas.finish(&DocumentInfo::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let masked = doc.objects.values().filter_map(|o| o.as_stream().ok()).any(|s| {
            s.dict.get(b"SMask").is_ok()
        });
        assert!(masked);
    }
}
