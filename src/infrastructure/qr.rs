//! Pairing QR presentation

use qrcode::render::unicode;
use qrcode::QrCode;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Default QR image service used in link mode
pub const QR_LINK_BASE: &str = "https://api.qrserver.com/v1/create-qr-code/?size=300x300";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QrMode {
    /// Log a link to a rendered QR image
    #[default]
    Link,
    /// Draw the QR code in the terminal
    Terminal,
}

/// Surfaces pairing QR payloads to the operator
#[derive(Debug, Clone)]
pub struct QrPresenter {
    mode: QrMode,
    link_base: String,
}

impl QrPresenter {
    pub fn new(mode: QrMode, link_base: impl Into<String>) -> Self {
        Self {
            mode,
            link_base: link_base.into(),
        }
    }

    /// Image link for a QR payload, with the payload URL-encoded as `data`
    ///
    /// An unparseable base falls back to [`QR_LINK_BASE`].
    pub fn link(&self, code: &str) -> String {
        let base = Url::parse(&self.link_base).or_else(|e| {
            tracing::warn!("Invalid QR link base {}: {}", self.link_base, e);
            Url::parse(QR_LINK_BASE)
        });

        match base {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("data", code);
                url.to_string()
            }
            Err(_) => code.to_string(),
        }
    }

    /// Unicode rendering of the QR payload
    pub fn render(code: &str) -> Option<String> {
        let qr = QrCode::new(code.as_bytes()).ok()?;
        Some(
            qr.render::<unicode::Dense1x2>()
                .dark_color(unicode::Dense1x2::Dark)
                .light_color(unicode::Dense1x2::Light)
                .build(),
        )
    }

    pub fn present(&self, code: &str) {
        if self.mode == QrMode::Terminal {
            if let Some(image) = Self::render(code) {
                println!("Scan this QR code to pair:\n{}", image);
                return;
            }
            tracing::warn!("Could not render QR in terminal, falling back to link");
        }
        tracing::info!("🔗 Scan the QR code using this link: {}", self.link(code));
    }
}

impl Default for QrPresenter {
    fn default() -> Self {
        Self::new(QrMode::Link, QR_LINK_BASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_encodes_payload() {
        let link = QrPresenter::default().link("2@abc+/=,x");
        assert_eq!(
            link,
            "https://api.qrserver.com/v1/create-qr-code/?size=300x300&data=2%40abc%2B%2F%3D%2Cx"
        );
    }

    #[test]
    fn test_invalid_base_still_encodes_payload() {
        let link = QrPresenter::new(QrMode::Link, "not a url").link("2@abc+/=,x");
        assert_eq!(link, QrPresenter::default().link("2@abc+/=,x"));
        assert!(link.ends_with("&data=2%40abc%2B%2F%3D%2Cx"));
    }

    #[test]
    fn test_render_produces_blocks() {
        let image = QrPresenter::render("2@abc").unwrap();
        assert!(image.lines().count() > 10);
    }
}
