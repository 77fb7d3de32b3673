//! A4 albaran documents written with `pdf-writer`.
//!
//! Text uses the standard Helvetica faces with WinAnsi encoding, so no font
//! files are embedded. Tables break onto a new page when they reach the
//! bottom margin.

use chrono::{DateTime, Utc};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str};

use crate::domain::repository::PdfRenderer;
use crate::domain::types::{AlbaranDetails, UserProfile};
use crate::error::ApiError;
use crate::infra::signature::{FetchLimits, SignatureImage, SignatureSource, decode_image};

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 50.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const REGULAR: Name<'static> = Name(b"F1");
const BOLD: Name<'static> = Name(b"F2");
const SIGNATURE: Name<'static> = Name(b"Im1");

const SIGNATURE_MAX_WIDTH: f32 = 180.0;
const SIGNATURE_MAX_HEIGHT: f32 = 80.0;

/// Renders albaranes, fetching remote signature images over HTTP.
#[derive(Clone, Default)]
pub struct PdfWriterRenderer {
    pub http: reqwest::Client,
    pub limits: FetchLimits,
}

impl PdfRenderer for PdfWriterRenderer {
    async fn render(&self, details: &AlbaranDetails) -> Result<Vec<u8>, ApiError> {
        let signature = match &details.albaran.signature_image {
            Some(raw) => self.signature(raw).await,
            None => None,
        };
        Ok(render_document(details, signature.as_ref()))
    }
}

impl PdfWriterRenderer {
    async fn signature(&self, raw: &str) -> Option<SignatureImage> {
        let source = SignatureSource::classify(raw);
        let result = match source.load(&self.http, self.limits).await {
            Ok(bytes) => decode_image(&bytes),
            Err(e) => Err(e),
        };
        match result {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(error = ?e, "signature image unavailable, rendering without it");
                None
            }
        }
    }
}

/// Map text onto WinAnsi bytes. Characters outside it become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '\t' | '\n' | '\r' => b' ',
            _ => b'?',
        })
        .collect()
}

/// Shorten `text` to roughly fit `width` points at `size`.
fn fit(text: &str, width: f32, size: f32) -> String {
    // Helvetica averages about half an em per glyph.
    let max = ((width / (size * 0.5)) as usize).max(4);
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

/// Split `text` into lines of at most `max` characters on word boundaries.
fn wrap(text: &str, max: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > max {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}

fn date(dt: DateTime<Utc>) -> String {
    dt.format("%d/%m/%Y").to_string()
}

fn money(v: f64) -> String {
    format!("{v:.2} €")
}

fn full_name(user: &UserProfile) -> String {
    format!("{} {}", user.nombre, user.apellidos)
}

/// Page-by-page content with a top-down cursor.
struct Layout {
    pages: Vec<Content>,
    current: Content,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Content::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    /// Start a new page unless `height` more points fit on this one.
    fn reserve(&mut self, height: f32) {
        if self.y - height < MARGIN {
            let full = std::mem::replace(&mut self.current, Content::new());
            self.pages.push(full);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn text_at(&mut self, font: Name<'_>, size: f32, x: f32, text: &str) {
        self.current
            .begin_text()
            .set_font(font, size)
            .next_line(x, self.y)
            .show(Str(&win_ansi(text)))
            .end_text();
    }

    fn line(&mut self, font: Name<'_>, size: f32, text: &str) {
        self.reserve(size + 4.0);
        self.y -= size;
        self.text_at(font, size, MARGIN, text);
        self.y -= 4.0;
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn rule(&mut self) {
        self.reserve(6.0);
        self.y -= 3.0;
        self.current
            .set_line_width(0.5)
            .move_to(MARGIN, self.y)
            .line_to(PAGE_WIDTH - MARGIN, self.y)
            .stroke();
        self.y -= 3.0;
    }

    fn heading(&mut self, text: &str) {
        self.reserve(40.0);
        self.gap(8.0);
        self.line(BOLD, 12.0, text);
        self.rule();
    }

    fn field(&mut self, label: &str, value: &str) {
        self.line(REGULAR, 10.0, &format!("{label}: {value}"));
    }

    /// One table row; `columns` are `(x offset, width)` pairs.
    fn row(&mut self, font: Name<'_>, columns: &[(f32, f32)], cells: &[String]) {
        const SIZE: f32 = 9.0;
        self.reserve(SIZE + 5.0);
        self.y -= SIZE;
        for ((x, width), cell) in columns.iter().zip(cells) {
            self.text_at(font, SIZE, MARGIN + x, &fit(cell, *width, SIZE));
        }
        self.y -= 5.0;
    }

    fn image(&mut self, width: f32, height: f32) {
        self.reserve(height + 4.0);
        self.y -= height;
        self.current
            .save_state()
            .transform([width, 0.0, 0.0, height, MARGIN, self.y])
            .x_object(SIGNATURE)
            .restore_state();
        self.y -= 4.0;
    }

    fn finish(mut self) -> Vec<Content> {
        self.pages.push(self.current);
        self.pages
    }
}

const HOURS_COLUMNS: [(f32, f32); 4] = [(0.0, 150.0), (150.0, 50.0), (200.0, 220.0), (420.0, 75.0)];
const MATERIAL_COLUMNS: [(f32, f32); 4] =
    [(0.0, 215.0), (215.0, 70.0), (285.0, 105.0), (390.0, 105.0)];

fn layout(details: &AlbaranDetails, signature: Option<&SignatureImage>) -> Vec<Content> {
    let albaran = &details.albaran;
    let mut page = Layout::new();

    page.line(BOLD, 18.0, &format!("ALBARÁN {}", albaran.number));
    page.field("Fecha", &date(albaran.date));
    page.field("Estado", albaran.status.as_str());

    page.heading("Cliente");
    match &details.client {
        Some(c) => {
            page.field("Nombre", &format!("{} {}", c.nombre, c.apellidos));
            page.field("Email", &c.email);
            page.field("Teléfono", &c.telefono);
            page.field("NIF", &c.nif);
            page.field("Dirección", &c.direccion);
        }
        None => page.line(REGULAR, 10.0, "Cliente no disponible"),
    }

    page.heading("Proyecto");
    match &details.project {
        Some(p) => {
            page.field("Título", &p.titulo);
            for line in wrap(&p.descripcion, 90) {
                page.line(REGULAR, 10.0, &line);
            }
            page.field(
                "Fechas",
                &format!("{} - {}", date(p.fecha_inicio), date(p.fecha_fin)),
            );
            page.field("Estado", p.estado.as_str());
            page.field("Presupuesto", &money(p.presupuesto));
        }
        None => page.line(REGULAR, 10.0, "Proyecto no disponible"),
    }

    page.heading("Creado por");
    match &details.creator {
        Some(u) => {
            page.field("Nombre", &full_name(u));
            page.field("Email", &u.email);
        }
        None => page.field("Email", &albaran.created_by),
    }

    page.heading("Horas");
    if albaran.hours_entries.is_empty() {
        page.line(REGULAR, 10.0, "Sin horas registradas");
    } else {
        page.row(
            BOLD,
            &HOURS_COLUMNS,
            &["Usuario".into(), "Horas".into(), "Descripción".into(), "Fecha".into()],
        );
        for (i, entry) in albaran.hours_entries.iter().enumerate() {
            let who = details
                .entry_users
                .get(i)
                .and_then(|u| u.as_ref())
                .map_or_else(|| entry.user.clone(), full_name);
            page.row(
                REGULAR,
                &HOURS_COLUMNS,
                &[
                    who,
                    format!("{:.2}", entry.hours),
                    entry.description.clone(),
                    date(entry.date),
                ],
            );
        }
    }

    page.heading("Materiales");
    if albaran.material_entries.is_empty() {
        page.line(REGULAR, 10.0, "Sin materiales registrados");
    } else {
        page.row(
            BOLD,
            &MATERIAL_COLUMNS,
            &[
                "Material".into(),
                "Cantidad".into(),
                "Precio unitario".into(),
                "Total".into(),
            ],
        );
        for entry in &albaran.material_entries {
            page.row(
                REGULAR,
                &MATERIAL_COLUMNS,
                &[
                    entry.name.clone(),
                    format!("{:.2}", entry.quantity),
                    money(entry.unit_price),
                    money(entry.total_price),
                ],
            );
        }
    }

    page.heading("Totales");
    page.field("Total horas", &format!("{:.2}", albaran.total_hours));
    page.field("Total materiales", &money(albaran.total_materials));
    page.field("Importe total", &money(albaran.total_amount));

    if let Some(observations) = albaran.observations.as_deref().filter(|o| !o.is_empty()) {
        page.heading("Observaciones");
        for line in wrap(observations, 90) {
            page.line(REGULAR, 10.0, &line);
        }
    }

    page.heading("Firma");
    page.field("Firmado por", albaran.signed_by.as_deref().unwrap_or("-"));
    page.field(
        "Fecha de firma",
        &albaran.signature_date.map(date).unwrap_or_else(|| "-".into()),
    );
    if let Some(img) = signature {
        let scale = (SIGNATURE_MAX_WIDTH / img.width as f32)
            .min(SIGNATURE_MAX_HEIGHT / img.height as f32)
            .min(1.0);
        page.image(img.width as f32 * scale, img.height as f32 * scale);
    }

    page.finish()
}

/// Serialize the albaran into a complete PDF file.
pub fn render_document(details: &AlbaranDetails, signature: Option<&SignatureImage>) -> Vec<u8> {
    let pages = layout(details, signature);

    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let tree_id = alloc.bump();
    let regular_id = alloc.bump();
    let bold_id = alloc.bump();
    let image_id = alloc.bump();
    let page_ids: Vec<(Ref, Ref)> = pages.iter().map(|_| (alloc.bump(), alloc.bump())).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|(page, _)| *page))
        .count(page_ids.len() as i32);

    pdf.type1_font(regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    if let Some(img) = signature {
        let mut xobject = pdf.image_xobject(image_id, &img.data);
        xobject.filter(Filter::FlateDecode);
        xobject.width(img.width as i32);
        xobject.height(img.height as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
    }

    for (content, (page_id, content_id)) in pages.into_iter().zip(&page_ids) {
        let mut page = pdf.page(*page_id);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
        page.parent(tree_id);
        page.contents(*content_id);
        let mut resources = page.resources();
        resources
            .fonts()
            .pair(REGULAR, regular_id)
            .pair(BOLD, bold_id);
        if signature.is_some() {
            resources.x_objects().pair(SIGNATURE, image_id);
        }
        resources.finish();
        page.finish();
        pdf.stream(*content_id, &content.finish());
    }

    pdf.finish()
}
