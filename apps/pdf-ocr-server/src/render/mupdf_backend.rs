//! MuPDF-backed document rendering
//!
//! MuPDF's `fz_context` is not thread-safe, so a `MupdfDocument` is opened,
//! used and dropped on a single blocking thread (see
//! [`super::with_document`]). Nothing here is shared between requests.

use std::io::Cursor;
use std::path::Path;

use mupdf::{Colorspace, Document, Matrix, TextPageOptions};

use super::types::{Dpi, PageNumber};
use super::{DocumentHandle, DocumentRenderer, RenderError};

impl From<mupdf::Error> for RenderError {
    fn from(e: mupdf::Error) -> Self {
        RenderError::Render(e.to_string())
    }
}

/// Opens PDFs from disk with MuPDF
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfRenderer;

impl DocumentRenderer for MupdfRenderer {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentHandle>, RenderError> {
        let path_str = path.to_string_lossy();
        let doc = Document::open(&*path_str)
            .map_err(|e| RenderError::Open(format!("{}: {}", path.display(), e)))?;
        let page_count = doc.page_count()?;

        Ok(Box::new(MupdfDocument {
            doc,
            page_count: page_count.max(0) as usize,
        }))
    }
}

/// An open MuPDF document; closed when dropped
pub struct MupdfDocument {
    doc: Document,
    page_count: usize,
}

impl MupdfDocument {
    fn load_page(&self, page: PageNumber) -> Result<mupdf::Page, RenderError> {
        self.ensure_page(page)?;
        Ok(self.doc.load_page(page.index() as i32)?)
    }
}

impl DocumentHandle for MupdfDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_text(&self, page: PageNumber) -> Result<String, RenderError> {
        let page = self.load_page(page)?;
        let text_page = page.to_text_page(TextPageOptions::empty())?;
        let text = text_page.to_text()?;
        Ok(text.trim().to_string())
    }

    fn rasterize(&self, page: PageNumber, dpi: Dpi) -> Result<Vec<u8>, RenderError> {
        let page = self.load_page(page)?;

        let scale = dpi.scale();
        let matrix = Matrix::new_scale(scale, scale);

        // Opaque RGB; PNG keeps it lossless
        let colorspace = Colorspace::device_rgb();
        let pixmap = page.to_pixmap(&matrix, &colorspace, false, true)?;

        encode_png(&pixmap)
    }
}

/// Encode pixmap samples as PNG
fn encode_png(pixmap: &mupdf::Pixmap) -> Result<Vec<u8>, RenderError> {
    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let rgb = pack_rgb(pixmap.samples(), width, height, pixmap.n() as usize)?;

    let img = image::RgbImage::from_raw(width as u32, height as u32, rgb)
        .ok_or_else(|| RenderError::Image("Failed to create image buffer".to_string()))?;

    let mut output = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut output), image::ImageFormat::Png)
        .map_err(|e| RenderError::Image(e.to_string()))?;

    Ok(output)
}

/// Tightly packed RGB from `n`-component samples with any row padding
fn pack_rgb(samples: &[u8], width: usize, height: usize, n: usize) -> Result<Vec<u8>, RenderError> {
    if n < 3 {
        return Err(RenderError::Image(format!("Expected RGB samples, got {} components", n)));
    }

    let too_large = || RenderError::Image(format!("Pixmap {}x{} is too large", width, height));
    let row_len = width.checked_mul(n).ok_or_else(too_large)?;
    let packed_len = width
        .checked_mul(height)
        .and_then(|pixels| pixels.checked_mul(3))
        .ok_or_else(too_large)?;

    if height == 0 || row_len == 0 {
        return Ok(Vec::new());
    }

    // MuPDF stores `stride * height` bytes
    let stride = samples.len() / height;
    if stride < row_len {
        return Err(RenderError::Image(format!(
            "Pixmap holds {} bytes, expected at least {}",
            samples.len(),
            row_len.saturating_mul(height)
        )));
    }

    if n == 3 && stride == row_len {
        return Ok(samples[..packed_len].to_vec());
    }

    let mut rgb = Vec::with_capacity(packed_len);
    for row in samples.chunks_exact(stride).take(height) {
        for pixel in row[..row_len].chunks_exact(n) {
            rgb.extend_from_slice(&pixel[..3]);
        }
    }
    Ok(rgb)
}
