use std::{
    io::{self, Cursor, Write},
    sync::{atomic::{AtomicUsize, Ordering}, Arc, Mutex},
};

use async_trait::async_trait;
use tokio::sync::oneshot;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::previewable::{
    object_url::{MemoryObjectUrls, ObjectUrlError, ObjectUrls},
    source::ByteSource,
};

pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

/// Assembles a minimal xlsx workbook with the given sheets, in order.
pub fn xlsx(sheets: &[(&str, &[&[Cell]])]) -> Vec<u8> {
    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );
    let mut workbook = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut workbook_rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    let mut worksheets = Vec::new();

    for (i, (name, rows)) in sheets.iter().enumerate() {
        let n = i + 1;
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
        ));
        workbook.push_str(&format!(r#"<sheet name="{name}" sheetId="{n}" r:id="rId{n}"/>"#));
        workbook_rels.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#,
        ));
        worksheets.push((format!("xl/worksheets/sheet{n}.xml"), worksheet(rows)));
    }

    content_types.push_str("</Types>");
    workbook.push_str("</sheets></workbook>");
    workbook_rels.push_str("</Relationships>");

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut add = |path: &str, body: &str| {
        writer.start_file(path, options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    };
    add("[Content_Types].xml", &content_types);
    add("_rels/.rels", r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#);
    add("xl/workbook.xml", &workbook);
    add("xl/_rels/workbook.xml.rels", &workbook_rels);
    for (path, body) in &worksheets {
        add(path, body);
    }

    writer.finish().unwrap().into_inner()
}

fn worksheet(rows: &[&[Cell]]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", (b'A' + c as u8) as char, r + 1);
            match cell {
                Cell::Text(s) => xml.push_str(&format!(r#"<c r="{reference}" t="inlineStr"><is><t>{s}</t></is></c>"#)),
                Cell::Number(v) => xml.push_str(&format!(r#"<c r="{reference}"><v>{v}</v></c>"#)),
                Cell::Blank => {},
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// A valid 1x1 PNG.
pub fn png() -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 255]));
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();
    bytes
}

/// Counts how often it is read.
#[derive(Clone, Default)]
pub struct CountingSource {
    pub bytes: Vec<u8>,
    pub reads: Arc<AtomicUsize>,
}

#[async_trait]
impl ByteSource for CountingSource {
    async fn read(&self) -> io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.bytes.clone())
    }
}

/// Holds its read back until the paired [`oneshot::Sender`] fires.
pub struct GatedSource {
    bytes: Vec<u8>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl GatedSource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> (Self, oneshot::Sender<()>) {
        let (open, gate) = oneshot::channel();
        (GatedSource { bytes: bytes.into(), gate: Mutex::new(Some(gate)) }, open)
    }
}

#[async_trait]
impl ByteSource for GatedSource {
    async fn read(&self) -> io::Result<Vec<u8>> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.await.map_err(|_| io::Error::new(io::ErrorKind::Interrupted, "gate dropped"))?;
        }
        Ok(self.bytes.clone())
    }
}

/// Fails every read.
pub struct BrokenSource;

#[async_trait]
impl ByteSource for BrokenSource {
    async fn read(&self) -> io::Result<Vec<u8>> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
    }
}

/// Remembers the highest number of URLs that were ever live at once.
#[derive(Default)]
pub struct PeakObjectUrls {
    pub inner: MemoryObjectUrls,
    pub peak: AtomicUsize,
}

#[async_trait]
impl ObjectUrls for PeakObjectUrls {
    async fn create(&self, bytes: Vec<u8>, media_type: &str) -> Result<String, ObjectUrlError> {
        let url = self.inner.create(bytes, media_type).await?;
        self.peak.fetch_max(self.inner.live_count(), Ordering::SeqCst);
        Ok(url)
    }

    fn revoke(&self, url: &str) -> Result<(), ObjectUrlError> {
        self.inner.revoke(url)
    }

    fn live_count(&self) -> usize {
        self.inner.live_count()
    }
}
