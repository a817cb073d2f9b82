//! Prompt Templates
//!
//! Built-in Spanish SEO prompts for each provider and flat placeholder
//! substitution from a [`ProductSnapshot`].
//!
//! Placeholders: `{title}`, `{description}`, `{ingredients}`, `{size}`,
//! `{imageUrl}`. Every occurrence is replaced; unknown `{...}` tokens are
//! left as they are. Substitution is a single left-to-right pass, so values
//! containing placeholder text are never expanded a second time.
//!
//! No placeholder of the template survives rendering. Values are inserted
//! verbatim, so a product title that itself reads `{size}` stays `{size}`
//! in the prompt.

use crate::ai::provider::{ProviderConfig, ProviderKind};
use crate::types::ProductSnapshot;

/// Placeholder tokens recognized in templates
pub const PLACEHOLDERS: [&str; 5] = [
    "{title}",
    "{description}",
    "{ingredients}",
    "{size}",
    "{imageUrl}",
];

const GEMINI_TEMPLATE: &str = r#"Eres un experto en SEO para fichas de producto de e-commerce (WooCommerce + Rank Math).
Devuelve SOLO un objeto JSON con EXACTAMENTE estas claves en este orden:
title, html_description, focus_keyword, seo_title, slug, seo_description, image_alt.
No añadas texto fuera del JSON ni bloques de código.

Reglas obligatorias:
Español neutro, acentos correctos.
Especifica la especie cuando sea evidente (usa "para perros" o "para gatos"; si no, "para mascotas").
Mantén CONSISTENCIA: usa la misma forma exacta de la focus_keyword (singular/plural, sin diminutivos) en todos los campos.
La focus_keyword debe aparecer exactamente igual en: title, seo_title, seo_description, slug y en el primer párrafo de html_description.
No inventes datos que no estén en título, descripción o imagen. No hagas afirmaciones médicas.
Si hay presentación/tamaño (p. ej., 100 g, 500 g) inclúyelo en title, html_description, focus_keyword, seo_title, slug y, cuando sea natural, en seo_description.
Evita marca a menos que esté en los datos.
No usar mayúsculas innecesarias, solo en nombres propios o inicio de frase.

Definiciones de cada campo:
title: orientado a conversión; inicia con la focus_keyword; incluye especie y presentación si aplica (ej.: "Hueso de calcio con pollo 100 g para perros").
html_description: usa HTML semántico con esta estructura:
<h2>{title}</h2>
<p>Resumen introductorio que incluya la focus_keyword exacta y sea atractivo para el comprador.</p>
<h3>Beneficios</h3><ul><li>…</li></ul>
<h3>Uso recomendado</h3><ul><li>…</li></ul>
<h3>Composición y presentación</h3><ul><li>…</li></ul>
<h3>Conservación</h3><ul><li>…</li></ul>
<p>Llamado a la acción final breve y persuasivo.</p>

Incluir la focus_keyword al menos una vez en el primer párrafo y otra en el cuerpo, sin sobreoptimizar.
focus_keyword: específica y natural; incluye "para perros" o "para gatos" cuando aplique (ej.: "hueso de calcio con pollo para perros").
seo_title: comienza EXACTAMENTE con la focus_keyword + " | Golfitos Petshop" (≤60 caracteres).
slug: minúsculas, sin tildes, con guiones; basado en la focus_keyword, incluye tamaño si aplica (ej.: "hueso-calcio-pollo-perros-100g").
seo_description: ≤160 caracteres; empieza con la focus_keyword, añade 1–2 beneficios clave y un CTA breve. Sin comillas ni emojis.
image_alt: ≤125 caracteres; describe el producto y especie; incluye tamaño/color/variante si consta o es visible; evita repeticiones innecesarias.

Datos del producto a optimizar:
Título: {title}
Descripción: {description}
Ingredientes/Medidas: {ingredients}
URL de la imagen: {imageUrl}"#;

const OPENAI_TEMPLATE: &str = r#"Eres un experto en SEO para fichas de producto de e-commerce (WooCommerce + Rank Math).
Devuelve únicamente un objeto JSON válido con EXACTAMENTE estas claves:
title, html_description, focus_keyword, seo_title, slug, seo_description, image_alt.

Reglas obligatorias:
- Español neutro con acentos correctos
- Especifica la especie cuando sea evidente ("para perros", "para gatos", o "para mascotas")
- Mantén CONSISTENCIA: usa la focus_keyword exacta en todos los campos
- La focus_keyword debe aparecer en: title, seo_title, seo_description, slug y html_description
- No inventes datos que no estén en el título, descripción o imagen
- Incluye presentación/tamaño si está disponible
- Evita marcas a menos que estén en los datos originales

Especificaciones por campo:
- title: optimizado para conversión, comienza con focus_keyword
- html_description: HTML semántico con estructura <h2>, <h3>, <p>, <ul>
- focus_keyword: específica y natural, incluye especie si aplica
- seo_title: focus_keyword + " | Golfitos Petshop" (máximo 60 caracteres)
- slug: minúsculas, sin tildes, con guiones, basado en focus_keyword
- seo_description: máximo 160 caracteres, comienza con focus_keyword, incluye CTA
- image_alt: máximo 125 caracteres, describe producto y especie

Datos del producto:
Título: {title}
Descripción: {description}
Ingredientes/Medidas: {ingredients}
URL de la imagen: {imageUrl}"#;

/// Built-in template for a provider
pub fn default_template(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Gemini => GEMINI_TEMPLATE,
        ProviderKind::OpenAi => OPENAI_TEMPLATE,
    }
}

/// Configured template when present and non-blank, otherwise the provider default
pub fn resolve_template(config: &ProviderConfig) -> &str {
    config
        .prompt_template
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| default_template(config.provider))
}

/// Substitute every placeholder with the matching snapshot field
pub fn render_prompt(template: &str, snapshot: &ProductSnapshot) -> String {
    let values: [&str; 5] = [
        &snapshot.title,
        &snapshot.description,
        &snapshot.ingredients,
        &snapshot.size,
        &snapshot.image_url,
    ];

    let mut output =
        String::with_capacity(template.len() + values.iter().map(|v| v.len()).sum::<usize>());
    let mut rest = template;

    while let Some(pos) = rest.find('{') {
        output.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        match PLACEHOLDERS
            .iter()
            .position(|placeholder| tail.starts_with(placeholder))
        {
            Some(index) => {
                output.push_str(values[index]);
                rest = &tail[PLACEHOLDERS[index].len()..];
            }
            None => {
                output.push('{');
                rest = &tail[1..];
            }
        }
    }
    output.push_str(rest);
    output
}
