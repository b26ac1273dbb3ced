//! PDF source abstraction.
//!
//! Isolates lopdf from the extraction walk: the extractor only needs page
//! enumeration, page text, and the image XObjects a page references.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use flate2::read::ZlibDecoder;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use super::decode::{ColorSpace, EmbeddedImage, SampleEncoding};
use crate::error::{Error, Result};

/// Nesting limit for form XObjects.
const MAX_FORM_DEPTH: u8 = 8;

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// An image XObject referenced from a page's resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef {
    pub id: (u32, u16),
}

/// Abstract interface for reading a PDF.
pub trait PdfSource {
    /// All pages as (page_number → PageId), ascending.
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Plain text of one page.
    fn page_text(&self, page_number: u32) -> Result<String>;

    /// Image XObjects drawn on a page, including those inside form XObjects,
    /// in resource order, without duplicates.
    fn page_images(&self, page: PageId) -> Result<Vec<ImageRef>>;

    /// Load an image XObject's samples and parameters.
    fn load_image(&self, image: ImageRef) -> Result<EmbeddedImage>;
}

/// [`PdfSource`] backed by `lopdf::Document`.
pub struct LopdfSource {
    doc: LopdfDocument,
}

impl LopdfSource {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path)?;
        Self::checked(doc)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Self::checked(doc)
    }

    fn checked(doc: LopdfDocument) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self { doc })
    }

    /// PDF version string from the header.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Follow a reference, or return the object itself.
    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        self.resolve(obj).and_then(|o| o.as_dict().ok())
    }

    /// The page's resource dictionary, inherited from the page tree if absent.
    fn page_resources(&self, page: PageId) -> Option<&Dictionary> {
        let mut node = self.doc.get_dictionary(page).ok()?;
        // Bounded walk: a malformed tree may loop through Parent.
        for _ in 0..64 {
            if let Some(res) = node.get(b"Resources").ok().and_then(|r| self.resolve_dict(r)) {
                return Some(res);
            }
            let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
            node = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    /// Gather image XObjects from `resources`, descending into form
    /// XObjects depth first. Each image and each form is visited once.
    fn collect_images(
        &self,
        resources: &Dictionary,
        depth: u8,
        refs: &mut Vec<ImageRef>,
        forms: &mut Vec<ObjectId>,
    ) {
        let Some(xobjects) = resources
            .get(b"XObject")
            .ok()
            .and_then(|x| self.resolve_dict(x))
        else {
            return;
        };

        for (_name, obj) in xobjects.iter() {
            let Ok(id) = obj.as_reference() else {
                continue;
            };
            let Some(stream) = self.doc.get_object(id).ok().and_then(|o| o.as_stream().ok())
            else {
                continue;
            };
            let subtype = stream.dict.get(b"Subtype").ok().and_then(|t| t.as_name().ok());

            match subtype {
                Some(b"Image") => {
                    if !refs.iter().any(|r| r.id == id) {
                        refs.push(ImageRef { id });
                    }
                }
                Some(b"Form") if depth < MAX_FORM_DEPTH && !forms.contains(&id) => {
                    forms.push(id);
                    if let Some(form_resources) = stream
                        .dict
                        .get(b"Resources")
                        .ok()
                        .and_then(|r| self.resolve_dict(r))
                    {
                        self.collect_images(form_resources, depth + 1, refs, forms);
                    }
                }
                _ => {}
            }
        }
    }

    fn color_space(&self, obj: &Object, depth: u8) -> ColorSpace {
        let Some(obj) = self.resolve(obj) else {
            return ColorSpace::Unsupported("unresolvable".to_string());
        };
        match obj {
            Object::Name(name) => color_space_by_name(name),
            Object::Array(arr) => self.color_space_array(arr, depth),
            _ => ColorSpace::Unsupported("malformed".to_string()),
        }
    }

    fn color_space_array(&self, arr: &[Object], depth: u8) -> ColorSpace {
        let family = arr
            .first()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_default();

        match family.as_str() {
            "ICCBased" => {
                let components = arr
                    .get(1)
                    .and_then(|o| self.resolve(o))
                    .and_then(|o| o.as_stream().ok())
                    .and_then(|s| s.dict.get(b"N").ok())
                    .and_then(|n| n.as_i64().ok());
                match components {
                    Some(1) => ColorSpace::Gray,
                    Some(3) => ColorSpace::Rgb,
                    Some(4) => ColorSpace::Cmyk,
                    other => ColorSpace::Unsupported(format!("ICCBased with N={:?}", other)),
                }
            }
            "Indexed" | "I" if depth == 0 && arr.len() >= 4 => {
                let base = self.color_space(&arr[1], depth + 1);
                let hival = arr[2].as_i64().unwrap_or(0).clamp(0, 255) as u8;
                let lookup = match self.resolve(&arr[3]) {
                    Some(Object::String(bytes, _)) => bytes.clone(),
                    Some(Object::Stream(s)) => stream_bytes(s).unwrap_or_default(),
                    _ => Vec::new(),
                };
                ColorSpace::Indexed {
                    base: Box::new(base),
                    hival,
                    lookup,
                }
            }
            "CalGray" => ColorSpace::Gray,
            "CalRGB" => ColorSpace::Rgb,
            other => ColorSpace::Unsupported(other.to_string()),
        }
    }
}

impl PdfSource for LopdfSource {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_text(&self, page_number: u32) -> Result<String> {
        self.doc
            .extract_text(&[page_number])
            .map_err(|e| Error::TextExtract(format!("Page {}: {}", page_number, e)))
    }

    fn page_images(&self, page: PageId) -> Result<Vec<ImageRef>> {
        let mut refs = Vec::new();
        if let Some(resources) = self.page_resources(page) {
            let mut forms = Vec::new();
            self.collect_images(resources, 0, &mut refs, &mut forms);
        }
        Ok(refs)
    }

    fn load_image(&self, image: ImageRef) -> Result<EmbeddedImage> {
        let stream = self
            .doc
            .get_object(image.id)
            .and_then(Object::as_stream)
            .map_err(|e| Error::ImageDecode(format!("object {:?}: {}", image.id, e)))?;
        let dict = &stream.dict;

        let int = |key: &[u8]| {
            dict.get(key)
                .ok()
                .and_then(|v| self.resolve(v))
                .and_then(|v| v.as_i64().ok())
        };
        let dimension = |key: &[u8]| {
            let value = int(key).unwrap_or(0);
            u32::try_from(value).map_err(|_| {
                Error::ImageDecode(format!(
                    "{} {} R: {} {} out of range",
                    image.id.0,
                    image.id.1,
                    String::from_utf8_lossy(key),
                    value
                ))
            })
        };
        let width = dimension(b"Width")?;
        let height = dimension(b"Height")?;
        let image_mask = dict
            .get(b"ImageMask")
            .ok()
            .and_then(|v| v.as_bool().ok())
            .unwrap_or(false);
        let bits_per_component = if image_mask {
            1
        } else {
            int(b"BitsPerComponent").unwrap_or(8).clamp(0, 255) as u8
        };
        let color_space = match dict.get(b"ColorSpace") {
            Ok(cs) => self.color_space(cs, 0),
            Err(_) => ColorSpace::Gray,
        };

        let filters = stream_filters(stream);
        let (encoding, data) = match filters.last().map(String::as_str) {
            Some("DCTDecode") | Some("DCT") => {
                let data = if filters.len() > 1 {
                    inflate(&stream.content)?
                } else {
                    stream.content.clone()
                };
                (SampleEncoding::Jpeg, data)
            }
            Some(f @ ("JPXDecode" | "JBIG2Decode" | "CCITTFaxDecode" | "CCF")) => {
                (SampleEncoding::Unsupported(f.to_string()), Vec::new())
            }
            _ => (SampleEncoding::Raw, stream_bytes(stream)?),
        };

        Ok(EmbeddedImage {
            name: format!("{} {} R", image.id.0, image.id.1),
            width,
            height,
            bits_per_component,
            color_space,
            image_mask,
            encoding,
            data,
        })
    }
}

fn color_space_by_name(name: &[u8]) -> ColorSpace {
    match name {
        b"DeviceGray" | b"G" | b"CalGray" => ColorSpace::Gray,
        b"DeviceRGB" | b"RGB" | b"CalRGB" => ColorSpace::Rgb,
        b"DeviceCMYK" | b"CMYK" => ColorSpace::Cmyk,
        other => ColorSpace::Unsupported(String::from_utf8_lossy(other).to_string()),
    }
}

/// Filter names of a stream, outermost first.
fn stream_filters(stream: &Stream) -> Vec<String> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(n)) => vec![String::from_utf8_lossy(n).to_string()],
        Ok(Object::Array(arr)) => arr
            .iter()
            .filter_map(|f| f.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .collect(),
        _ => Vec::new(),
    }
}

/// Stream content with all filters removed.
fn stream_bytes(stream: &Stream) -> Result<Vec<u8>> {
    if stream_filters(stream).is_empty() {
        return Ok(stream.content.clone());
    }
    stream
        .decompressed_content()
        .map_err(|e| Error::ImageDecode(format!("cannot unfilter stream: {}", e)))
}

fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| Error::ImageDecode(format!("FlateDecode: {}", e)))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_space_by_name() {
        assert_eq!(color_space_by_name(b"DeviceRGB"), ColorSpace::Rgb);
        assert_eq!(color_space_by_name(b"DeviceGray"), ColorSpace::Gray);
        assert_eq!(color_space_by_name(b"DeviceCMYK"), ColorSpace::Cmyk);
        assert!(matches!(
            color_space_by_name(b"Lab"),
            ColorSpace::Unsupported(_)
        ));
    }

    #[test]
    fn test_stream_filters() {
        let mut dict = Dictionary::new();
        dict.set(
            "Filter",
            Object::Array(vec![
                Object::Name(b"FlateDecode".to_vec()),
                Object::Name(b"DCTDecode".to_vec()),
            ]),
        );
        let stream = Stream::new(dict, Vec::new());
        assert_eq!(stream_filters(&stream), vec!["FlateDecode", "DCTDecode"]);

        let stream = Stream::new(Dictionary::new(), b"raw".to_vec());
        assert!(stream_filters(&stream).is_empty());
        assert_eq!(stream_bytes(&stream).unwrap(), b"raw".to_vec());
    }

    #[test]
    fn test_inflate() {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"samples").unwrap();
        let packed = enc.finish().unwrap();
        assert_eq!(inflate(&packed).unwrap(), b"samples".to_vec());
    }
}
