//! Warranty certificate rendering.
//!
//! Fixed A4 layout drawn top-down with the built-in Helvetica faces, a
//! linear sequence of text calls with no templating. Mirrors the paper form
//! the shop hands out at the counter.

use anyhow::Result;
use chrono::NaiveDate;
use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rgb};

use oficina_warranty::WarrantyRecord;

const MARGIN_MM: f64 = 20.0;

/// Top-down text cursor over one page layer.
struct Writer {
    layer: PdfLayerReference,
    y: f64,
}

impl Writer {
    fn text(&mut self, x: f64, text: &str, size: f64, font: &IndirectFontRef, gap: f64) {
        self.layer
            .use_text(text, size as f32, Mm(x as f32), Mm(self.y as f32), font);
        self.y -= gap;
    }

    fn skip(&mut self, gap: f64) {
        self.y -= gap;
    }
}

pub fn render_certificate(warranty: &WarrantyRecord, today: NaiveDate) -> Result<Vec<u8>> {
    let (doc, page, layer) =
        PdfDocument::new("Termo de Garantia", Mm(210.0), Mm(297.0), "certificate");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut w = Writer {
        layer: doc.get_page(page).get_layer(layer),
        y: 272.0,
    };

    // Header
    w.text(56.0, "TERMO DE GARANTIA", 22.0, &bold, 8.0);
    w.text(
        62.0,
        "Oficina Duas Rodas - Manutenção de Motos",
        10.0,
        &regular,
        14.0,
    );

    // Customer
    w.text(MARGIN_MM, "INFORMAÇÕES DO CLIENTE", 11.0, &bold, 7.0);
    w.text(
        MARGIN_MM,
        &format!("Nome: {}", warranty.customer),
        10.0,
        &regular,
        6.0,
    );
    w.text(
        MARGIN_MM,
        &format!("Telefone: {}", warranty.phone.as_deref().unwrap_or("N/A")),
        10.0,
        &regular,
        12.0,
    );

    // Service
    w.text(MARGIN_MM, "SERVIÇO REALIZADO", 11.0, &bold, 7.0);
    w.text(
        MARGIN_MM,
        &format!("Tipo: {}", warranty.service_type),
        10.0,
        &regular,
        6.0,
    );
    w.text(
        MARGIN_MM,
        &format!(
            "Descrição: {}",
            warranty.description.as_deref().unwrap_or("Serviço geral")
        ),
        10.0,
        &regular,
        6.0,
    );
    w.text(
        MARGIN_MM,
        &format!("Valor: {}", format_reais(warranty.value_cents)),
        10.0,
        &regular,
        6.0,
    );
    w.text(
        MARGIN_MM,
        &format!("Data: {}", format_date(warranty.service_date)),
        10.0,
        &regular,
        12.0,
    );

    // Warranty period
    w.text(MARGIN_MM, "PERÍODO DE GARANTIA", 11.0, &bold, 7.0);
    w.text(
        MARGIN_MM,
        &format!("Duração: {} mês(es)", warranty.warranty_months),
        10.0,
        &regular,
        6.0,
    );
    w.text(
        MARGIN_MM,
        &format!("Início: {}", format_date(warranty.service_date)),
        10.0,
        &regular,
        6.0,
    );
    w.text(
        MARGIN_MM,
        &format!("Vencimento: {}", format_date(warranty.expiry)),
        10.0,
        &regular,
        8.0,
    );

    let (status, color) = if warranty.is_active(today) {
        ("ATIVA", Rgb::new(0.0, 0.6, 0.0, None))
    } else {
        ("VENCIDA", Rgb::new(0.8, 0.0, 0.0, None))
    };
    w.layer.set_fill_color(Color::Rgb(color));
    w.text(MARGIN_MM, &format!("STATUS: {status}"), 12.0, &bold, 12.0);
    w.layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));

    // Conditions
    w.text(MARGIN_MM, "CONDIÇÕES", 11.0, &bold, 7.0);
    for condition in [
        "1. Cobre defeitos de fabricação e mau funcionamento.",
        "2. Válida pelo período especificado a partir da data do serviço.",
        "3. Não cobre desgaste normal ou uso incorreto.",
        "4. Apresente este termo e a nota fiscal para acionar a garantia.",
        "5. Revisões podem ser exigidas para validação.",
        "6. A oficina reserva-se o direito de reparar ou reembolsar.",
    ] {
        w.text(MARGIN_MM, condition, 9.0, &regular, 5.5);
    }
    w.skip(8.0);

    // Footer
    w.text(
        MARGIN_MM,
        "Este documento é válido como comprovante de garantia.",
        8.0,
        &regular,
        5.0,
    );
    w.text(
        MARGIN_MM,
        &format!("Gerado em: {}", format_date(today)),
        8.0,
        &regular,
        5.0,
    );

    Ok(doc.save_to_bytes()?)
}

fn format_reais(cents: u64) -> String {
    format!("R$ {}.{:02}", cents / 100, cents % 100)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
