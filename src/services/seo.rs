//! SEO services - robots.txt e sitemap.xml per i crawler

use crate::core::{AppError, AppState};
use crate::db::{Conditions, SelectOptions};
use crate::entities::Product;
use axum::{
    extract::State,
    http::{HeaderValue, header},
    response::IntoResponse,
};
use std::fmt::Write;
use std::sync::Arc;
use tracing::{debug, instrument};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[instrument(skip(state))]
pub async fn robots_txt(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
        robots_body(&state.host_url),
    )
}

#[instrument(skip(state))]
pub async fn sitemap_xml(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let (products, _) = state
        .products
        .select_many(&Conditions::new(), &SelectOptions::new())
        .await?;
    debug!("Building sitemap with {} products", products.len());

    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/xml"))],
        sitemap_body(&state.host_url, &products),
    ))
}

pub fn robots_body(host_url: &str) -> String {
    format!("User-agent: *\nAllow: *\n\nSitemap: {host_url}/sitemap.xml")
}

/// One `<url>` entry per product, linking its public page
pub fn sitemap_body(host_url: &str, products: &[Product]) -> String {
    let mut entries = String::new();
    for product in products {
        // writing into a String cannot fail
        let _ = write!(
            entries,
            "   <url>\n        <loc>{}</loc>\n        <lastmod>{}</lastmod>\n        <changefreq>monthly</changefreq>\n    </url>\n",
            escape_xml(&format!("{}/products/{}", host_url, product.slug)),
            product.last_modified().format("%Y-%m-%d"),
        );
    }
    format!("<urlset xmlns=\"{SITEMAP_NS}\">\n{entries}</urlset>")
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
