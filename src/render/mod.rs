//! HTML page rendering.
//!
//! Handlers pass structured page data; markup lives entirely in the
//! template directory. Templates ending in `.html` are auto-escaped.

use crate::media::Thumbnail;
use crate::provider::OAuthResponse;
use minijinja::Environment;
use serde::Serialize;
use std::path::Path;

pub use minijinja::Error as TemplateError;

/// Page title shared by every page
pub const PAGE_TITLE: &str = "instawidget";

/// Loads named templates from a directory and renders them.
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new<P: AsRef<Path>>(template_dir: P) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(template_dir.as_ref().to_path_buf()));
        Self { env }
    }

    /// Render template `name` with `context`.
    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String, TemplateError> {
        self.env.get_template(name)?.render(context)
    }

    /// Authenticate prompt with a link to the provider's authorize page.
    pub fn prompt(&self, authorize_url: &str) -> Result<String, TemplateError> {
        self.render(
            "prompt.html",
            PromptPage {
                title: PAGE_TITLE,
                authorize_url,
            },
        )
    }

    /// Greeting shown after a successful code exchange.
    pub fn welcome(&self, response: &OAuthResponse) -> Result<String, TemplateError> {
        self.render(
            "welcome.html",
            WelcomePage {
                title: PAGE_TITLE,
                response,
            },
        )
    }

    pub fn gallery(&self, media: &[Thumbnail]) -> Result<String, TemplateError> {
        self.render(
            "gallery.html",
            GalleryPage {
                title: PAGE_TITLE,
                media,
            },
        )
    }

    /// Error page looked up as `<status>.html`.
    pub fn status_page(&self, status: u16) -> Result<String, TemplateError> {
        self.render(
            &format!("{}.html", status),
            StatusPage {
                title: PAGE_TITLE,
                status,
            },
        )
    }
}

#[derive(Serialize)]
struct PromptPage<'a> {
    title: &'a str,
    authorize_url: &'a str,
}

#[derive(Serialize)]
struct WelcomePage<'a> {
    title: &'a str,
    response: &'a OAuthResponse,
}

#[derive(Serialize)]
struct GalleryPage<'a> {
    title: &'a str,
    media: &'a [Thumbnail],
}

#[derive(Serialize)]
struct StatusPage<'a> {
    title: &'a str,
    status: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::envelope::decode_oauth_response;

    fn shipped_templates() -> TemplateRenderer {
        TemplateRenderer::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates"))
    }

    #[test]
    fn test_prompt_contains_escaped_link() {
        let html = shipped_templates()
            .prompt("https://api.instagram.com/oauth/authorize/?client_id=a&response_type=code")
            .unwrap();
        assert!(html.contains("client_id=a&amp;response_type=code"));
        assert!(html.contains("authenticate"));
    }

    #[test]
    fn test_welcome_greets_user() {
        let response =
            decode_oauth_response(br#"{"access_token":"tok1","user":{"id":"42","username":"alice"}}"#)
                .unwrap();
        let html = shipped_templates().welcome(&response).unwrap();
        assert!(html.contains("alice"));
        assert!(!html.contains("tok1"));
    }

    #[test]
    fn test_gallery_escapes_markup() {
        let media = vec![Thumbnail {
            link: "\"><script>".to_string(),
            image_url: String::new(),
        }];
        let html = shipped_templates().gallery(&media).unwrap();
        assert!(!html.contains("<script>"));
        assert_eq!(html.matches("<a ").count(), 1);
    }

    #[test]
    fn test_missing_status_template() {
        assert!(shipped_templates().status_page(404).is_ok());
        assert!(shipped_templates().status_page(418).is_err());
    }
}
