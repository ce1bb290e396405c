//! 401 responses for denied requests.
//!
//! Browsers (anything whose `Accept` mentions `text/html`) get a small page
//! with a sign-in button pointing back at the original URL. Everyone else gets
//! a fixed JSON body. The deny reason is never part of either.

use url::form_urlencoded;

use crate::context::RequestContext;
use crate::decision::DenyReason;

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

const UNAUTHORIZED_JSON: &str =
    r#"{"code":401,"error":"unauthorized","message":"unauthorized","data":null}"#;

/// A fully rendered denial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenialResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

/// Renders denials with the configured sign-in location.
#[derive(Debug, Clone)]
pub struct DenialRenderer {
    login_url: String,
    redirect_param: String,
}

impl DenialRenderer {
    pub fn new(login_url: impl Into<String>, redirect_param: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
            redirect_param: redirect_param.into(),
        }
    }

    /// Sign-in URL carrying the original request URL, query-escaped.
    ///
    /// With no login URL configured this is a bare query string, so the
    /// control resolves against the current page.
    pub fn login_redirect_url(&self, ctx: &RequestContext) -> String {
        let target: String = form_urlencoded::byte_serialize(ctx.original_url().as_bytes()).collect();
        format!("{}?{}={}", self.login_url, self.redirect_param, target)
    }

    pub fn render(&self, ctx: &RequestContext, reason: DenyReason) -> DenialResponse {
        log::debug!("Rendering denial for reason {}", reason);

        if ctx.wants_html() {
            DenialResponse {
                status: 401,
                content_type: HTML_CONTENT_TYPE,
                body: self.render_html(ctx),
            }
        } else {
            DenialResponse {
                status: 401,
                content_type: JSON_CONTENT_TYPE,
                body: UNAUTHORIZED_JSON.to_string(),
            }
        }
    }

    fn render_html(&self, ctx: &RequestContext) -> String {
        let mut page = String::with_capacity(PAGE_HEAD.len() + PAGE_TAIL.len() + 256);
        page.push_str(PAGE_HEAD);
        page.push_str("    <h1>Authentication required</h1>\n");
        page.push_str("    <p>We could not verify your identity. Please sign in and try again.</p>\n");
        if !ctx.trace_id.is_empty() {
            page.push_str("    <p class=\"trace-id\">");
            page.push_str(&escape_html(&ctx.trace_id));
            page.push_str("</p>\n");
        }
        page.push_str("    <a class=\"redirect-btn\" href=\"");
        page.push_str(&escape_html(&self.login_redirect_url(ctx)));
        page.push_str("\">Sign in</a>\n");
        page.push_str(PAGE_TAIL);
        page
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const PAGE_HEAD: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Authentication required</title>
    <style>
        :root {
            --bg-color: #f8f9fa;
            --text-primary: #374151;
            --text-secondary: #6b7280;
            --accent-color: #9ca3af;
            --font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
        }
        body {
            background-color: var(--bg-color);
            font-family: var(--font-family);
            display: flex;
            justify-content: center;
            align-items: center;
            min-height: 100vh;
            margin: 0;
            padding: 20px;
            box-sizing: border-box;
        }
        .container { max-width: 400px; width: 100%; text-align: center; }
        .icon-box { margin-bottom: 20px; }
        .icon-box svg { width: 48px; height: 48px; color: var(--accent-color); }
        h1 { color: var(--text-primary); font-size: 20px; margin: 0 0 12px 0; font-weight: 600; }
        p { color: var(--text-secondary); font-size: 14px; line-height: 1.6; margin: 0; }
        .trace-id { font-family: monospace; font-size: 12px; margin-top: 8px; }
        .redirect-btn {
            display: inline-block;
            margin-top: 24px;
            padding: 10px 24px;
            background-color: var(--text-primary);
            color: #fff;
            border-radius: 6px;
            font-size: 14px;
            text-decoration: none;
        }
        .redirect-btn:hover { background-color: var(--text-secondary); }
    </style>
</head>
<body>
<div class="container">
    <div class="icon-box">
        <svg xmlns="http://www.w3.org/2000/svg" fill="none" viewBox="0 0 24 24" stroke="currentColor">
            <path stroke-linecap="round" stroke-linejoin="round" stroke-width="1.5"
                  d="M16.5 10.5V6.75a4.5 4.5 0 10-9 0v3.75m-.75 11.25h10.5a2.25 2.25 0 002.25-2.25v-6.75a2.25 2.25 0 00-2.25-2.25H6.75a2.25 2.25 0 00-2.25 2.25v6.75a2.25 2.25 0 002.25 2.25z"/>
        </svg>
    </div>
"##;

const PAGE_TAIL: &str = "</div>\n</body>\n</html>\n";
